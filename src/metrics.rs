//! Metric extraction from body landmarks.
//!
//! Two 2D proxies are derived from the nose and both shoulders:
//! - forward head lean: horizontal offset of the nose from the shoulder midpoint
//! - shoulder tilt: slope angle of the line from the left to the right shoulder
//!
//! Both values are clamped, so downstream consumers only ever see bounded input.

use crate::{
    constants::{MAX_HEAD_FORWARD_RATIO, MAX_SHOULDER_TILT_DEGREES, VISIBILITY_THRESHOLD},
    landmarks::{Landmark, LandmarkId, LandmarkSet},
};
use thiserror::Error;

/// Landmarks the extractor reads, in validation order
pub const REQUIRED_LANDMARKS: [LandmarkId; 3] =
    [LandmarkId::Nose, LandmarkId::LeftShoulder, LandmarkId::RightShoulder];

/// Reason a landmark set was not turned into metrics
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Rejection {
    /// A required landmark is missing or not confidently detected
    #[error("landmark {landmark:?} visibility {visibility:.2} is not above {threshold:.2}")]
    LowVisibility {
        landmark: LandmarkId,
        visibility: f64,
        threshold: f64,
    },

    /// A required landmark carries a NaN or infinite coordinate
    #[error("landmark {landmark:?} has a non-finite coordinate")]
    NonFiniteCoordinates { landmark: LandmarkId },
}

/// Posture metrics of one sample, always within their documented ranges
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PostureMetrics {
    head_forward_ratio: f64,
    shoulder_tilt_angle: f64,
}

impl PostureMetrics {
    /// Build metrics from raw values, clamping each to its range.
    ///
    /// `head_forward_ratio` ends up in `[0, 0.2]`, `shoulder_tilt_angle` in
    /// `[-45, 45]` degrees. NaN inputs are mapped to the lower bound of the
    /// ratio and to a level shoulder line respectively.
    #[must_use]
    pub fn new(head_forward_ratio: f64, shoulder_tilt_angle: f64) -> Self {
        Self {
            head_forward_ratio: clamp_finite(head_forward_ratio, 0.0, 0.0, MAX_HEAD_FORWARD_RATIO),
            shoulder_tilt_angle: clamp_finite(
                shoulder_tilt_angle,
                0.0,
                -MAX_SHOULDER_TILT_DEGREES,
                MAX_SHOULDER_TILT_DEGREES,
            ),
        }
    }

    /// Horizontal nose offset from the shoulder midpoint, in `[0, 0.2]`
    #[must_use]
    pub fn head_forward_ratio(&self) -> f64 {
        self.head_forward_ratio
    }

    /// Shoulder line angle in degrees, in `[-45, 45]`
    #[must_use]
    pub fn shoulder_tilt_angle(&self) -> f64 {
        self.shoulder_tilt_angle
    }
}

fn clamp_finite(value: f64, nan_fallback: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        nan_fallback
    } else {
        value.clamp(min, max)
    }
}

/// Stateless metric extractor
#[derive(Debug, Clone, Copy)]
pub struct MetricExtractor {
    visibility_threshold: f64,
}

impl Default for MetricExtractor {
    fn default() -> Self {
        Self::new(VISIBILITY_THRESHOLD)
    }
}

impl MetricExtractor {
    /// Create an extractor that requires visibility strictly above `visibility_threshold`
    #[must_use]
    pub fn new(visibility_threshold: f64) -> Self {
        Self { visibility_threshold }
    }

    /// Visibility a required landmark must exceed
    #[must_use]
    pub fn visibility_threshold(&self) -> f64 {
        self.visibility_threshold
    }

    /// Compute posture metrics from a landmark set.
    ///
    /// # Errors
    ///
    /// Returns a [`Rejection`] if any of the nose or shoulders is missing,
    /// has visibility not above the threshold, or has non-finite coordinates.
    pub fn extract(&self, landmarks: &LandmarkSet) -> Result<PostureMetrics, Rejection> {
        let nose = self.required(landmarks, LandmarkId::Nose)?;
        let left_shoulder = self.required(landmarks, LandmarkId::LeftShoulder)?;
        let right_shoulder = self.required(landmarks, LandmarkId::RightShoulder)?;

        let shoulder_mid_x = (left_shoulder.x + right_shoulder.x) / 2.0;
        let head_forward_ratio = (nose.x - shoulder_mid_x).abs();

        let shoulder_tilt_angle = (right_shoulder.y - left_shoulder.y)
            .atan2(right_shoulder.x - left_shoulder.x)
            .to_degrees();

        Ok(PostureMetrics::new(head_forward_ratio, shoulder_tilt_angle))
    }

    #[allow(clippy::neg_cmp_op_on_partial_ord)] // NaN must fail the visibility check
    fn required<'a>(&self, landmarks: &'a LandmarkSet, id: LandmarkId) -> Result<&'a Landmark, Rejection> {
        let landmark = landmarks.get(id).ok_or(Rejection::LowVisibility {
            landmark: id,
            visibility: 0.0,
            threshold: self.visibility_threshold,
        })?;

        if !(landmark.visibility > self.visibility_threshold) {
            return Err(Rejection::LowVisibility {
                landmark: id,
                visibility: landmark.visibility,
                threshold: self.visibility_threshold,
            });
        }

        if !landmark.x.is_finite() || !landmark.y.is_finite() {
            return Err(Rejection::NonFiniteCoordinates { landmark: id });
        }

        Ok(landmark)
    }
}

/// Extract metrics with the default visibility threshold
///
/// # Errors
///
/// See [`MetricExtractor::extract`].
pub fn extract(landmarks: &LandmarkSet) -> Result<PostureMetrics, Rejection> {
    MetricExtractor::default().extract(landmarks)
}
