//! Background reconciliation of the device-local offline queue

mod worker;

pub use worker::{OrderSubmitter, SyncWorker, SyncWorkerConfig};
