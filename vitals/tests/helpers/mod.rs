// Re-export helpers so tests can `use helpers::*;`
#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use vitals::{Credentials, Metric, MetricSeries, Vitals, VitalsBuilder, WellnessConnector};
use vitals_mock::{DynamicMockConnector, DynamicMockController, MockBehavior};

/// Day every scripted fetch asks for.
pub fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1).expect("valid date")
}

pub fn creds() -> Credentials {
    Credentials::new("user@example.com", "hunter2")
}

pub fn hr() -> MetricSeries {
    MetricSeries::from_pairs([(0, 70.0), (60_000, 72.0), (120_000, 75.0)])
}

pub fn spo2() -> MetricSeries {
    MetricSeries::from_pairs([(10_000, 97.0), (130_000, 96.5)])
}

pub fn resp() -> MetricSeries {
    MetricSeries::from_pairs([(5_000, 14.2), (65_000, 14.8), (125_000, 15.1)])
}

/// Dynamic mock with every metric returning its fixture.
pub async fn scripted() -> (Arc<dyn WellnessConnector>, DynamicMockController) {
    let (mock, controller) = DynamicMockConnector::new_with_controller("dyn");
    for (metric, series) in [
        (Metric::HeartRate, hr()),
        (Metric::Spo2, spo2()),
        (Metric::Respiration, resp()),
    ] {
        controller
            .set_metric_behavior(metric, MockBehavior::Return(series))
            .await;
    }
    (mock, controller)
}

pub fn builder(mock: &Arc<dyn WellnessConnector>) -> VitalsBuilder {
    Vitals::builder()
        .with_connector(Arc::clone(mock))
        .credentials(creds())
}
