use std::sync::Arc;

use chrono::{Local, NaiveDate};
use vitals_core::{FallbackGenerator, Snapshot, VitalsError};
use vitals_middleware::SnapshotCache;

use crate::Vitals;

enum Mode {
    Live {
        vitals: Arc<Vitals>,
        cache: SnapshotCache,
    },
    Unconfigured {
        error: VitalsError,
        fallback: FallbackGenerator,
    },
}

/// Long-lived entry point that always has a snapshot to serve.
///
/// A live gateway answers from the cache layer in front of the orchestrator. An
/// unconfigured gateway (missing credentials or upstream) never touches the
/// network and answers every request with synthetic data carrying the
/// configuration error.
pub struct Gateway {
    mode: Mode,
}

impl Gateway {
    /// Serve `vitals` through a cache configured from its own settings.
    #[must_use]
    pub fn live(vitals: Vitals) -> Self {
        let vitals = Arc::new(vitals);
        let cache = Arc::clone(&vitals).into_cache();
        Self {
            mode: Mode::Live { vitals, cache },
        }
    }

    /// Serve synthetic snapshots explaining `error`.
    #[must_use]
    pub const fn unconfigured(error: VitalsError, fallback: FallbackGenerator) -> Self {
        Self {
            mode: Mode::Unconfigured { error, fallback },
        }
    }

    /// True when backed by a real upstream.
    pub const fn is_configured(&self) -> bool {
        matches!(self.mode, Mode::Live { .. })
    }

    /// Why the gateway is not configured, if it is not.
    pub const fn configuration_error(&self) -> Option<&VitalsError> {
        match &self.mode {
            Mode::Unconfigured { error, .. } => Some(error),
            Mode::Live { .. } => None,
        }
    }

    /// The orchestrator behind a live gateway.
    pub fn vitals(&self) -> Option<&Arc<Vitals>> {
        match &self.mode {
            Mode::Live { vitals, .. } => Some(vitals),
            Mode::Unconfigured { .. } => None,
        }
    }

    /// Snapshot of today's data. Never fails.
    pub async fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshot_for(Local::now().date_naive()).await
    }

    /// Snapshot of `date`. Never fails.
    pub async fn snapshot_for(&self, date: NaiveDate) -> Arc<Snapshot> {
        match &self.mode {
            Mode::Live { cache, .. } => cache.get_snapshot_for(date).await,
            Mode::Unconfigured { error, fallback } => Arc::new(fallback.generate(error.to_string())),
        }
    }
}
