//! Composite posture score.
//!
//! The score starts at 100 and loses points only for the excess of each metric
//! beyond its threshold:
//! - 10 points per 0.01 of forward lean above 0.12
//! - 2 points per degree of shoulder tilt above 10 degrees (either side)
//!
//! Each penalty is floored to whole points and the total is clamped to `[0, 100]`.

use crate::{
    constants::{
        HEAD_FORWARD_PENALTY, HEAD_FORWARD_THRESHOLD, MAX_SCORE, SHOULDER_TILT_PENALTY, SHOULDER_TILT_THRESHOLD,
    },
    metrics::PostureMetrics,
    utils::safe_cast::f64_to_u8_clamp,
};
use std::fmt;

/// Posture score in `[0, 100]`, higher is better
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PostureScore(u8);

impl PostureScore {
    /// Best possible score
    pub const PERFECT: Self = Self(MAX_SCORE);

    /// Numeric value of the score
    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for PostureScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<PostureScore> for u8 {
    fn from(score: PostureScore) -> Self {
        score.0
    }
}

/// Whole points lost to forward head lean
#[must_use]
pub fn head_forward_penalty(head_forward_ratio: f64) -> f64 {
    excess_penalty(head_forward_ratio, HEAD_FORWARD_THRESHOLD, HEAD_FORWARD_PENALTY)
}

/// Whole points lost to shoulder tilt
#[must_use]
pub fn shoulder_tilt_penalty(shoulder_tilt_angle: f64) -> f64 {
    excess_penalty(shoulder_tilt_angle.abs(), SHOULDER_TILT_THRESHOLD, SHOULDER_TILT_PENALTY)
}

fn excess_penalty(value: f64, threshold: f64, points_per_unit: f64) -> f64 {
    if value > threshold {
        ((value - threshold) * points_per_unit).floor()
    } else {
        0.0
    }
}

/// Score a set of posture metrics
#[must_use]
pub fn score(metrics: &PostureMetrics) -> PostureScore {
    let penalty =
        head_forward_penalty(metrics.head_forward_ratio()) + shoulder_tilt_penalty(metrics.shoulder_tilt_angle());

    PostureScore(f64_to_u8_clamp(f64::from(MAX_SCORE) - penalty, 0, MAX_SCORE))
}
