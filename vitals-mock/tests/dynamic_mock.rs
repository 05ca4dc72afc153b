use std::time::Duration;

use chrono::NaiveDate;
use vitals_core::{Credentials, Metric, MetricSeries, VitalsError};
use vitals_mock::{DynamicMockConnector, MockBehavior};

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1).expect("valid date")
}

fn creds() -> Credentials {
    Credentials::new("user@example.com", "hunter2")
}

#[tokio::test]
async fn test_mock_metric_return() {
    let (mock, controller) = DynamicMockConnector::new_with_controller("P0");
    let series = MetricSeries::from_pairs([(0, 70.0), (60_000, 72.0)]);
    controller
        .set_metric_behavior(Metric::HeartRate, MockBehavior::Return(series.clone()))
        .await;

    let session = mock
        .as_session_provider()
        .expect("session provider")
        .login(&creds())
        .await
        .expect("login ok");
    let got = mock
        .as_metric_provider()
        .expect("metric provider")
        .metric(&session, Metric::HeartRate, day())
        .await
        .expect("metric ok");
    assert_eq!(got, series);
    assert_eq!(controller.login_calls().await, 1);
    assert_eq!(controller.metric_calls(Metric::HeartRate).await, 1);
}

#[tokio::test]
async fn test_mock_metric_fail() {
    let (mock, controller) = DynamicMockConnector::new_with_controller("P0");
    let err = VitalsError::connector("P0", "boom");
    controller
        .set_metric_behavior(Metric::Spo2, MockBehavior::Fail(err.clone()))
        .await;

    let session = mock
        .as_session_provider()
        .unwrap()
        .login(&creds())
        .await
        .unwrap();
    let got = mock
        .as_metric_provider()
        .unwrap()
        .metric(&session, Metric::Spo2, day())
        .await
        .expect_err("err");
    assert_eq!(got, err);
}

#[tokio::test]
async fn test_mock_revocation_expires_only_old_sessions() {
    let (mock, controller) = DynamicMockConnector::new_with_controller("P0");
    controller
        .set_metric_behavior(Metric::HeartRate, MockBehavior::Return(MetricSeries::default()))
        .await;
    let sp = mock.as_session_provider().unwrap();
    let mp = mock.as_metric_provider().unwrap();

    let old = sp.login(&creds()).await.unwrap();
    controller.revoke_sessions().await;
    let err = mp.metric(&old, Metric::HeartRate, day()).await.unwrap_err();
    assert!(err.is_session_expiry());

    let fresh = sp.login(&creds()).await.unwrap();
    assert!(mp.metric(&fresh, Metric::HeartRate, day()).await.is_ok());
}

#[tokio::test]
async fn test_mock_always_expire() {
    let (mock, controller) = DynamicMockConnector::new_with_controller("P0");
    controller.set_always_expire(true).await;
    let session = mock.as_session_provider().unwrap().login(&creds()).await.unwrap();
    let err = mock
        .as_metric_provider()
        .unwrap()
        .metric(&session, Metric::HeartRate, day())
        .await
        .unwrap_err();
    assert!(err.is_session_expiry());
}

#[tokio::test(start_paused = true)]
async fn test_mock_hang_never_resolves() {
    let (mock, controller) = DynamicMockConnector::new_with_controller("P0");
    controller.set_login_behavior(MockBehavior::Hang).await;
    let sp = mock.as_session_provider().unwrap();
    let res = tokio::time::timeout(Duration::from_secs(30), sp.login(&creds())).await;
    assert!(res.is_err(), "login should still be pending");
}

#[tokio::test]
async fn test_mock_unconfigured_metric_is_unsupported() {
    let (mock, controller) = DynamicMockConnector::new_with_controller("P0");
    let session = mock.as_session_provider().unwrap().login(&creds()).await.unwrap();
    let err = mock
        .as_metric_provider()
        .unwrap()
        .metric(&session, Metric::Respiration, day())
        .await
        .unwrap_err();
    assert!(matches!(err, VitalsError::Unsupported { .. }));

    controller.clear_all_behaviors().await;
    assert_eq!(controller.upstream_calls().await, 0);
}
