//! vitals-server
//!
//! HTTP front end for the vitals gateway: one read-only JSON endpoint that always
//! answers 200, with live data when the upstream cooperates and tagged synthetic
//! data when it does not.

pub mod config;
mod payload;
mod routes;

pub use config::{ServerConfig, ServerError, Upstream};
pub use payload::SnapshotPayload;
pub use routes::router;
