//! Property tests for metric extraction and scoring


use posture_telemetry::{
    constants::{HEAD_FORWARD_THRESHOLD, MAX_HEAD_FORWARD_RATIO, MAX_SHOULDER_TILT_DEGREES, SHOULDER_TILT_THRESHOLD},
    landmarks::{Landmark, LandmarkId, LandmarkSet},
    metrics::{extract, PostureMetrics, Rejection},
    scoring::score,
};
use proptest::prelude::*;
use test_helpers::upper_body;

#[test]
fn test_reference_scores() {
    let cases = [
        (0.10, 5.0, 100),
        (0.14, 5.0, 80),
        (0.10, 20.0, 80),
        (0.20, 45.0, 0),
    ];

    for (ratio, angle, expected) in cases {
        let metrics = PostureMetrics::new(ratio, angle);
        assert_eq!(
            score(&metrics).value(),
            expected,
            "ratio={ratio}, angle={angle}"
        );
    }
}

proptest! {
    #[test]
    fn prop_extracted_metrics_are_bounded(
        nx in -1e6f64..1e6, ny in -1e6f64..1e6,
        lx in -1e6f64..1e6, ly in -1e6f64..1e6,
        rx in -1e6f64..1e6, ry in -1e6f64..1e6,
    ) {
        let set = upper_body((nx, ny), (lx, ly), (rx, ry), 0.9);
        let metrics = extract(&set).unwrap();

        prop_assert!((0.0..=MAX_HEAD_FORWARD_RATIO).contains(&metrics.head_forward_ratio()));
        prop_assert!((-MAX_SHOULDER_TILT_DEGREES..=MAX_SHOULDER_TILT_DEGREES).contains(&metrics.shoulder_tilt_angle()));
    }

    #[test]
    fn prop_visible_landmarks_produce_metrics(visibility in 0.600_001f64..=1.0) {
        let set = upper_body((0.5, 0.3), (0.4, 0.5), (0.6, 0.5), visibility);
        prop_assert!(extract(&set).is_ok());
    }

    #[test]
    fn prop_one_hidden_landmark_rejects(visibility in 0.0f64..0.6, which in 0usize..3) {
        let mut vis = [0.9; 3];
        vis[which] = visibility;
        let set = LandmarkSet::new()
            .with(LandmarkId::Nose, Landmark::new(0.5, 0.3, vis[0]))
            .with(LandmarkId::LeftShoulder, Landmark::new(0.4, 0.5, vis[1]))
            .with(LandmarkId::RightShoulder, Landmark::new(0.6, 0.5, vis[2]));

        let is_low_visibility = matches!(extract(&set), Err(Rejection::LowVisibility { .. }));
        prop_assert!(is_low_visibility);
    }

    #[test]
    fn prop_score_always_in_range(ratio in -10.0f64..10.0, angle in -500.0f64..500.0) {
        let value = score(&PostureMetrics::new(ratio, angle)).value();
        prop_assert!(value <= 100);
    }

    #[test]
    fn prop_perfect_below_thresholds(
        ratio in 0.0f64..=HEAD_FORWARD_THRESHOLD,
        angle in -SHOULDER_TILT_THRESHOLD..=SHOULDER_TILT_THRESHOLD,
    ) {
        prop_assert_eq!(score(&PostureMetrics::new(ratio, angle)).value(), 100);
    }

    #[test]
    fn prop_score_non_increasing_in_lean(
        a in HEAD_FORWARD_THRESHOLD..=MAX_HEAD_FORWARD_RATIO,
        b in HEAD_FORWARD_THRESHOLD..=MAX_HEAD_FORWARD_RATIO,
        angle in -MAX_SHOULDER_TILT_DEGREES..=MAX_SHOULDER_TILT_DEGREES,
    ) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        let low_score = score(&PostureMetrics::new(low, angle));
        let high_score = score(&PostureMetrics::new(high, angle));
        prop_assert!(high_score <= low_score);
    }

    #[test]
    fn prop_score_non_increasing_in_tilt(
        a in SHOULDER_TILT_THRESHOLD..=MAX_SHOULDER_TILT_DEGREES,
        b in SHOULDER_TILT_THRESHOLD..=MAX_SHOULDER_TILT_DEGREES,
        negative in any::<bool>(),
        ratio in 0.0f64..=MAX_HEAD_FORWARD_RATIO,
    ) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        let sign = if negative { -1.0 } else { 1.0 };
        let low_score = score(&PostureMetrics::new(ratio, sign * low));
        let high_score = score(&PostureMetrics::new(ratio, sign * high));
        prop_assert!(high_score <= low_score);
    }
}
