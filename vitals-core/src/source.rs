use async_trait::async_trait;
use chrono::NaiveDate;

use crate::{Snapshot, VitalsError};

/// Anything that can produce a complete snapshot for a day.
///
/// The fetch orchestrator implements this; the cache layer wraps it. A source
/// never substitutes synthetic data itself: failure is reported as `Err` and the
/// wrapper decides what to serve instead.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Fetch a snapshot of `date`.
    async fn fetch_snapshot(&self, date: NaiveDate) -> Result<Snapshot, VitalsError>;
}
