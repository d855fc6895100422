//! Submission pipeline: ports, orchestrator, post-success side effects.

pub mod ports;
pub mod service;
pub mod side_effects;
