use std::time::Duration;

use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use vitals_core::{FallbackConfig, FallbackGenerator, Metric, plausible_range};

#[test]
fn default_generator_ends_now_with_fifty_minute_spaced_points() {
    let g = FallbackGenerator::new(FallbackConfig::default(), &Metric::ALL, Metric::HeartRate);
    let before = chrono::Utc::now().timestamp_millis();
    let snap = g.generate("missing credentials");
    let after = chrono::Utc::now().timestamp_millis();

    assert!(snap.is_synthetic());
    let hr = snap.series(Metric::HeartRate).expect("heart rate series");
    assert_eq!(hr.len(), 50);
    assert!(hr.is_strictly_increasing());
    assert!(hr.points().windows(2).all(|w| w[1].ts_ms - w[0].ts_ms == 60_000));
    let last = hr.last().expect("non-empty").ts_ms;
    assert!(last >= before && last <= after, "last sample must be now");
    assert!(after - last <= 1_000);
}

proptest! {
    #[test]
    fn series_are_evenly_spaced_and_in_range(
        seed in any::<u64>(),
        points in 1usize..300,
        interval_s in 1u64..3_600,
        now in -1_000_000_000_000i64..4_000_000_000_000i64,
    ) {
        let cfg = FallbackConfig { points, interval: Duration::from_secs(interval_s) };
        let g = FallbackGenerator::new(cfg, &Metric::ALL, Metric::HeartRate);
        let snap = g.generate_with(now, &mut StdRng::seed_from_u64(seed), "diag");

        let step = i64::try_from(interval_s * 1_000).unwrap();
        for metric in Metric::ALL {
            let s = snap.series(metric).expect("every configured metric is generated");
            prop_assert_eq!(s.len(), points);
            prop_assert_eq!(s.last().map(|p| p.ts_ms), Some(now));
            prop_assert!(s.points().windows(2).all(|w| w[1].ts_ms - w[0].ts_ms == step));
            let (lo, hi) = plausible_range(metric);
            prop_assert!(s.points().iter().all(|p| p.value >= lo && p.value < hi));
        }
        prop_assert_eq!(snap.timeline().len(), points);
    }
}
