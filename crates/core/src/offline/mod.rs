//! Offline queue port. The worker that drains it lives in the
//! infrastructure crate.

pub mod ports;
