//! vitals-middleware
//!
//! Wrappers that sit between the orchestrator and the upstream:
//!
//! - [`SessionManager`] owns the single authenticated session, deduplicates
//!   concurrent logins and retries operations once after a session expiry.
//! - [`SnapshotCache`] serves snapshots from a time-bounded cache and converts
//!   every refresh failure into a synthetic (or stale) snapshot.

mod cache;
mod session;

pub use crate::cache::SnapshotCache;
pub use crate::session::{SessionManager, SessionStatus};
