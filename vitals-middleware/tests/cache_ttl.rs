use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use vitals_core::{
    FallbackConfig, FallbackGenerator, Metric, MetricSeries, Snapshot, SnapshotSource,
    StalePolicy, VitalsError,
};
use vitals_middleware::SnapshotCache;

const TTL: Duration = Duration::from_secs(600);

#[derive(Default)]
struct ScriptedSource {
    calls: AtomicUsize,
    fail: AtomicBool,
    delay: Option<Duration>,
}

#[async_trait]
impl SnapshotSource for ScriptedSource {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn fetch_snapshot(&self, _date: NaiveDate) -> Result<Snapshot, VitalsError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(d) = self.delay {
            tokio::time::sleep(d).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(VitalsError::metric_fetch("hr", "upstream unavailable"));
        }
        let mut series = BTreeMap::new();
        series.insert(
            Metric::HeartRate,
            Some(MetricSeries::from_pairs([(0, 70.0), (60_000, 71.0)])),
        );
        Ok(Snapshot::live(series, Vec::new()))
    }
}

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1).expect("valid date")
}

fn cache(source: &Arc<ScriptedSource>, ttl: Duration) -> SnapshotCache {
    let fallback = FallbackGenerator::new(FallbackConfig::default(), &Metric::ALL, Metric::HeartRate);
    SnapshotCache::new(Arc::clone(source) as Arc<dyn SnapshotSource>, fallback, ttl)
}

#[tokio::test(start_paused = true)]
async fn fresh_entry_is_served_without_upstream_calls() {
    let source = Arc::new(ScriptedSource::default());
    let c = cache(&source, TTL);

    let a = c.get_snapshot_for(day()).await;
    tokio::time::advance(Duration::from_secs(599)).await;
    let b = c.get_snapshot_for(day()).await;

    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn expired_entry_triggers_exactly_one_refresh() {
    let source = Arc::new(ScriptedSource::default());
    let c = cache(&source, TTL);

    let a = c.get_snapshot_for(day()).await;
    tokio::time::advance(TTL).await;
    let b = c.get_snapshot_for(day()).await;
    let again = c.get_snapshot_for(day()).await;

    assert!(!Arc::ptr_eq(&a, &b));
    assert!(Arc::ptr_eq(&b, &again));
    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn failure_serves_synthetic_and_is_not_cached() {
    let source = Arc::new(ScriptedSource::default());
    source.fail.store(true, Ordering::SeqCst);
    let c = cache(&source, TTL);

    let s = c.get_snapshot_for(day()).await;
    assert!(s.is_synthetic());
    assert!(s.diagnostic().is_some_and(|d| d.contains("upstream unavailable")));
    assert_eq!(s.series(Metric::HeartRate).map(MetricSeries::len), Some(50));

    source.fail.store(false, Ordering::SeqCst);
    let s = c.get_snapshot_for(day()).await;
    assert!(!s.is_synthetic());
    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn default_policy_ignores_stale_entry() {
    let source = Arc::new(ScriptedSource::default());
    let c = cache(&source, TTL);

    c.get_snapshot_for(day()).await;
    tokio::time::advance(TTL).await;
    source.fail.store(true, Ordering::SeqCst);

    assert!(c.get_snapshot_for(day()).await.is_synthetic());
}

#[tokio::test(start_paused = true)]
async fn serve_stale_returns_previous_real_data_with_diagnostic() {
    let source = Arc::new(ScriptedSource::default());
    let c = cache(&source, TTL).with_stale_policy(StalePolicy::ServeStale);

    let live = c.get_snapshot_for(day()).await;
    tokio::time::advance(TTL + Duration::from_secs(1)).await;
    source.fail.store(true, Ordering::SeqCst);

    let stale = c.get_snapshot_for(day()).await;
    assert!(!stale.is_synthetic());
    assert_eq!(stale.metrics(), live.metrics());
    assert!(stale.diagnostic().is_some_and(|d| d.contains("upstream unavailable")));

    // Not re-cached: the next request tries the upstream again.
    c.get_snapshot_for(day()).await;
    assert_eq!(source.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn serve_stale_without_entry_falls_back_to_synthetic() {
    let source = Arc::new(ScriptedSource::default());
    source.fail.store(true, Ordering::SeqCst);
    let c = cache(&source, TTL).with_stale_policy(StalePolicy::ServeStale);

    assert!(c.get_snapshot_for(day()).await.is_synthetic());
}

#[tokio::test(start_paused = true)]
async fn ttl_zero_disables_caching() {
    let source = Arc::new(ScriptedSource::default());
    let c = cache(&source, Duration::ZERO);

    c.get_snapshot_for(day()).await;
    c.get_snapshot_for(day()).await;
    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn new_day_is_a_miss() {
    let source = Arc::new(ScriptedSource::default());
    let c = cache(&source, TTL);

    c.get_snapshot_for(day()).await;
    c.get_snapshot_for(day().succ_opt().expect("next day")).await;
    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn concurrent_misses_share_one_refresh() {
    let source = Arc::new(ScriptedSource {
        delay: Some(Duration::from_millis(100)),
        ..ScriptedSource::default()
    });
    let c = cache(&source, TTL);

    let (a, b, d) = tokio::join!(
        c.get_snapshot_for(day()),
        c.get_snapshot_for(day()),
        c.get_snapshot_for(day())
    );
    assert!(Arc::ptr_eq(&a, &b) && Arc::ptr_eq(&b, &d));
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn concurrent_misses_share_one_failed_refresh() {
    let source = Arc::new(ScriptedSource {
        delay: Some(Duration::from_secs(10)),
        ..ScriptedSource::default()
    });
    source.fail.store(true, Ordering::SeqCst);
    let c = Arc::new(cache(&source, TTL));

    let started = tokio::time::Instant::now();
    let handles: Vec<_> = (0..5)
        .map(|_| {
            let c = Arc::clone(&c);
            tokio::spawn(async move {
                let snap = c.get_snapshot_for(day()).await;
                (snap, started.elapsed())
            })
        })
        .collect();

    for handle in handles {
        let (snap, waited) = handle.await.unwrap();
        assert!(snap.is_synthetic());
        assert!(snap.diagnostic().is_some_and(|d| d.contains("upstream unavailable")));
        assert!(waited <= Duration::from_secs(11), "waited {waited:?}");
    }
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);

    // The failure is not remembered: the next request goes upstream again.
    source.fail.store(false, Ordering::SeqCst);
    assert!(!c.get_snapshot_for(day()).await.is_synthetic());
    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn serve_stale_never_crosses_days() {
    let source = Arc::new(ScriptedSource::default());
    let c = cache(&source, TTL).with_stale_policy(StalePolicy::ServeStale);

    c.get_snapshot_for(day()).await;
    source.fail.store(true, Ordering::SeqCst);

    let next = c.get_snapshot_for(day().succ_opt().expect("next day")).await;
    assert!(next.is_synthetic());
    assert!(next.diagnostic().is_some_and(|d| d.contains("upstream unavailable")));
}

#[tokio::test(start_paused = true)]
async fn clear_forces_refresh() {
    let source = Arc::new(ScriptedSource::default());
    let c = cache(&source, TTL);

    c.get_snapshot_for(day()).await;
    c.clear().await;
    c.get_snapshot_for(day()).await;
    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
}
