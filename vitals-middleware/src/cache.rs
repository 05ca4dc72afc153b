use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{Local, NaiveDate};
use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use vitals_core::{FallbackGenerator, Snapshot, SnapshotSource, StalePolicy, VitalsError};

type RefreshFuture = Shared<BoxFuture<'static, Result<Arc<Snapshot>, VitalsError>>>;

struct CacheEntry {
    snapshot: Arc<Snapshot>,
    created_at: Instant,
    date: NaiveDate,
}

impl CacheEntry {
    fn is_fresh(&self, ttl: Duration, date: NaiveDate) -> bool {
        self.date == date && self.created_at.elapsed() < ttl
    }
}

struct Refresh {
    attempt: u64,
    date: NaiveDate,
    fetch: RefreshFuture,
}

/// Single-entry, time-bounded snapshot cache in front of a [`SnapshotSource`].
///
/// `get_snapshot` never fails: a failed refresh is answered with synthetic data
/// (or, under [`StalePolicy::ServeStale`], the previous real snapshot of the same
/// day) tagged with the failure. Only real snapshots are ever stored.
pub struct SnapshotCache {
    source: Arc<dyn SnapshotSource>,
    fallback: FallbackGenerator,
    ttl: Duration,
    policy: StalePolicy,
    entry: RwLock<Option<CacheEntry>>,
    refreshes: AtomicU64,
    inflight: Mutex<Option<Refresh>>,
}

impl SnapshotCache {
    /// Wrap `source`, serving entries younger than `ttl`. A zero TTL disables caching.
    #[must_use]
    pub fn new(source: Arc<dyn SnapshotSource>, fallback: FallbackGenerator, ttl: Duration) -> Self {
        Self {
            source,
            fallback,
            ttl,
            policy: StalePolicy::default(),
            entry: RwLock::new(None),
            refreshes: AtomicU64::new(0),
            inflight: Mutex::new(None),
        }
    }

    /// Choose what to serve when a refresh fails.
    #[must_use]
    pub const fn with_stale_policy(mut self, policy: StalePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Snapshot for today's local date.
    pub async fn get_snapshot(&self) -> Arc<Snapshot> {
        self.get_snapshot_for(Local::now().date_naive()).await
    }

    /// Snapshot for `date`, from the cache when fresh, otherwise refreshed.
    ///
    /// Concurrent misses for the same date join one in-flight refresh and all
    /// receive its outcome, success or failure; a failure is degraded per caller.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "vitals::cache::get_snapshot", skip(self), fields(source = self.source.name()))
    )]
    pub async fn get_snapshot_for(&self, date: NaiveDate) -> Arc<Snapshot> {
        if let Some(hit) = self.fresh(date).await {
            return hit;
        }

        let (attempt, fetch) = {
            let mut inflight = self.inflight.lock().await;
            if let Some(hit) = self.fresh(date).await {
                return hit;
            }
            match &*inflight {
                Some(r) if r.date == date => (r.attempt, r.fetch.clone()),
                _ => {
                    let attempt = self.refreshes.fetch_add(1, Ordering::SeqCst) + 1;
                    let source = Arc::clone(&self.source);
                    let fetch = async move { source.fetch_snapshot(date).await.map(Arc::new) }
                        .boxed()
                        .shared();
                    *inflight = Some(Refresh {
                        attempt,
                        date,
                        fetch: fetch.clone(),
                    });
                    (attempt, fetch)
                }
            }
        };

        let outcome = fetch.await;
        self.settle(attempt, date, &outcome).await;
        match outcome {
            Ok(snapshot) => snapshot,
            Err(e) => self.degrade(date, &e).await,
        }
    }

    /// Store a successful outcome and release the in-flight slot, once per refresh.
    ///
    /// The entry is written before the slot is cleared so a caller arriving in
    /// between finds either the slot or the fresh entry.
    async fn settle(&self, attempt: u64, date: NaiveDate, outcome: &Result<Arc<Snapshot>, VitalsError>) {
        let mut inflight = self.inflight.lock().await;
        if !matches!(&*inflight, Some(r) if r.attempt == attempt) {
            return;
        }
        if let Ok(snapshot) = outcome {
            *self.entry.write().await = Some(CacheEntry {
                snapshot: Arc::clone(snapshot),
                created_at: Instant::now(),
                date,
            });
        }
        *inflight = None;
    }

    /// Drop the cached entry; the next request refreshes.
    pub async fn clear(&self) {
        *self.entry.write().await = None;
    }

    async fn fresh(&self, date: NaiveDate) -> Option<Arc<Snapshot>> {
        self.entry
            .read()
            .await
            .as_ref()
            .filter(|e| e.is_fresh(self.ttl, date))
            .map(|e| Arc::clone(&e.snapshot))
    }

    async fn degrade(&self, date: NaiveDate, err: &VitalsError) -> Arc<Snapshot> {
        let diagnostic = err.to_string();
        match self.policy {
            StalePolicy::ServeStale => {
                if let Some(stale) = self.entry.read().await.as_ref().filter(|e| e.date == date) {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(error = %err, "refresh failed; serving stale snapshot");
                    return Arc::new(stale.snapshot.with_diagnostic(diagnostic));
                }
            }
            _ => {}
        }
        #[cfg(feature = "tracing")]
        tracing::warn!(error = %err, "refresh failed; serving synthetic snapshot");
        Arc::new(self.fallback.generate(diagnostic))
    }
}
