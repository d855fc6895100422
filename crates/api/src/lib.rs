//! # OrderBridge Server
//!
//! HTTP boundary and composition root. Wires the SQLite repositories, the
//! ERP gateway and the submission orchestrator into an axum router, and
//! owns the offline sync worker lifecycle.

pub mod context;
pub mod error;
pub mod routes;

pub use context::AppContext;
pub use error::ApiError;
pub use routes::build_router;
