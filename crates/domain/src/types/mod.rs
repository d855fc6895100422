//! Domain data types grouped by concern.

pub mod access;
pub mod gateway;
pub mod offline;
pub mod order;
pub mod submission;
