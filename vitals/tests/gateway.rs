mod helpers;

use std::sync::Arc;
use std::time::Duration;

use helpers::*;
use vitals::{Metric, MetricSeries, StalePolicy, Vitals, VitalsError};
use vitals_mock::{DynamicMockConnector, MockBehavior};

#[tokio::test(start_paused = true)]
async fn within_ttl_no_upstream_calls() {
    let (mock, controller) = scripted().await;
    let gateway = builder(&mock).build_gateway();
    assert!(gateway.is_configured());

    let first = gateway.snapshot_for(day()).await;
    let calls = controller.upstream_calls().await;
    tokio::time::advance(Duration::from_secs(300)).await;
    let second = gateway.snapshot_for(day()).await;

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(controller.upstream_calls().await, calls);
}

#[tokio::test(start_paused = true)]
async fn after_ttl_exactly_one_fetch_sequence() {
    let (mock, controller) = scripted().await;
    let gateway = builder(&mock)
        .cache_ttl(Duration::from_secs(60))
        .build_gateway();

    gateway.snapshot_for(day()).await;
    tokio::time::advance(Duration::from_secs(61)).await;
    gateway.snapshot_for(day()).await;
    gateway.snapshot_for(day()).await;

    for metric in Metric::ALL {
        assert_eq!(controller.metric_calls(metric).await, 2);
    }
    assert_eq!(controller.login_calls().await, 1);
}

#[tokio::test]
async fn primary_failure_serves_tagged_synthetic_data() {
    let (mock, controller) = scripted().await;
    controller
        .set_metric_behavior(
            Metric::HeartRate,
            MockBehavior::Fail(VitalsError::connector("dyn", "HTTP 500")),
        )
        .await;
    let gateway = builder(&mock).build_gateway();

    let snap = gateway.snapshot_for(day()).await;
    assert!(snap.is_synthetic());
    assert!(snap.diagnostic().is_some_and(|d| !d.is_empty()));
    assert_eq!(snap.series(Metric::HeartRate).map(MetricSeries::len), Some(50));
}

#[tokio::test]
async fn secondary_failure_stays_live() {
    let (mock, controller) = scripted().await;
    controller
        .set_metric_behavior(
            Metric::Respiration,
            MockBehavior::Fail(VitalsError::connector("dyn", "HTTP 500")),
        )
        .await;
    let gateway = builder(&mock).build_gateway();

    let snap = gateway.snapshot_for(day()).await;
    assert!(!snap.is_synthetic());
    assert!(snap.series(Metric::Respiration).is_none());
}

#[tokio::test]
async fn missing_credentials_never_call_upstream() {
    let (mock, controller) = DynamicMockConnector::new_with_controller("dyn");
    let gateway = Vitals::builder()
        .with_connector(mock)
        .credentials_from_lookup(|_| None)
        .build_gateway();

    assert!(!gateway.is_configured());
    assert!(gateway.vitals().is_none());
    let snap = gateway.snapshot().await;
    assert!(snap.is_synthetic());
    assert!(snap.diagnostic().is_some_and(|d| d.contains("missing credentials")));
    assert_eq!(controller.upstream_calls().await, 0);
}

#[tokio::test]
async fn missing_connector_is_unconfigured() {
    let gateway = Vitals::builder().credentials(creds()).build_gateway();

    assert!(gateway.configuration_error().is_some_and(VitalsError::is_configuration));
    assert!(gateway.snapshot().await.is_synthetic());
}

#[tokio::test]
async fn nothing_configured_reports_credentials_and_upstream() {
    let gateway = Vitals::builder()
        .credentials_from_lookup(|_| None)
        .build_gateway();

    assert!(!gateway.is_configured());
    let snap = gateway.snapshot().await;
    assert!(snap.is_synthetic());
    let diagnostic = snap.diagnostic().unwrap_or_default();
    assert!(diagnostic.contains("missing credentials"), "{diagnostic}");
    assert!(diagnostic.contains("WELLNESS_ACCOUNT_ID"), "{diagnostic}");
    assert!(diagnostic.contains("no upstream connector"), "{diagnostic}");
}

#[tokio::test(start_paused = true)]
async fn serve_stale_keeps_real_data_through_an_outage() {
    let (mock, controller) = scripted().await;
    let gateway = builder(&mock)
        .cache_ttl(Duration::from_secs(60))
        .stale_policy(StalePolicy::ServeStale)
        .build_gateway();

    let live = gateway.snapshot_for(day()).await;
    tokio::time::advance(Duration::from_secs(120)).await;
    controller
        .set_metric_behavior(
            Metric::HeartRate,
            MockBehavior::Fail(VitalsError::connector("dyn", "HTTP 502")),
        )
        .await;

    let stale = gateway.snapshot_for(day()).await;
    assert!(!stale.is_synthetic());
    assert_eq!(stale.series(Metric::HeartRate), live.series(Metric::HeartRate));
    assert!(stale.diagnostic().is_some_and(|d| d.contains("HTTP 502")));
}
