//! One sampling cycle: capture, detect, extract, score, report.
//!
//! Every stage returns a typed failure that ends the cycle early. Failures are
//! logged here and handed back to the caller, which is free to ignore them;
//! nothing in a [`CycleFailure`] is fatal.

use crate::{
    camera::{CaptureError, FrameSource},
    error::Error,
    landmarks::Detection,
    metrics::{MetricExtractor, PostureMetrics, Rejection},
    pose_detection::KeypointSource,
    scoring::{score, PostureScore},
    telemetry::{DeliveryError, Reporter},
};
use log::{error, info, warn};
use std::fmt;
use thiserror::Error;

/// Successful cycle result
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleReport {
    /// Metrics of the sample
    pub metrics: PostureMetrics,
    /// Score of the sample
    pub score: PostureScore,
}

/// Stage at which a cycle stopped
#[derive(Error, Debug)]
pub enum CycleFailure {
    /// No image could be captured
    #[error("capture failed: {0}")]
    Capture(#[source] CaptureError),

    /// The keypoint detector failed to run
    #[error("detector failed: {0}")]
    Detection(#[source] Error),

    /// The image contained no person
    #[error("no person detected, make sure you are in front of the camera")]
    NoSubject,

    /// A person was found but the required landmarks were unusable
    #[error("key body landmarks are not usable: {0}")]
    Rejected(#[source] Rejection),

    /// Metrics were computed but not delivered
    #[error("delivery failed: {0}")]
    Delivery(#[source] DeliveryError),
}

/// Coarse classification of a [`CycleFailure`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    Capture,
    Detection,
    NoSubject,
    LowVisibility,
    NonFiniteCoordinates,
    Delivery,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Capture => "capture",
            Self::Detection => "detection",
            Self::NoSubject => "no_subject",
            Self::LowVisibility => "low_visibility",
            Self::NonFiniteCoordinates => "non_finite_coordinates",
            Self::Delivery => "delivery",
        };
        f.write_str(label)
    }
}

impl CycleFailure {
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Capture(_) => FailureKind::Capture,
            Self::Detection(_) => FailureKind::Detection,
            Self::NoSubject => FailureKind::NoSubject,
            Self::Rejected(Rejection::LowVisibility { .. }) => FailureKind::LowVisibility,
            Self::Rejected(Rejection::NonFiniteCoordinates { .. }) => FailureKind::NonFiniteCoordinates,
            Self::Delivery(_) => FailureKind::Delivery,
        }
    }
}

/// Result of one cycle
pub type CycleOutcome = std::result::Result<CycleReport, CycleFailure>;

/// Collaborators of a sampling cycle
pub struct SampleCycle<S, K, R> {
    frames: S,
    detector: K,
    extractor: MetricExtractor,
    reporter: R,
}

impl<S, K, R> SampleCycle<S, K, R>
where
    S: FrameSource,
    K: KeypointSource<S::Frame>,
    R: Reporter,
{
    #[must_use]
    pub fn new(frames: S, detector: K, extractor: MetricExtractor, reporter: R) -> Self {
        Self {
            frames,
            detector,
            extractor,
            reporter,
        }
    }

    /// Run one cycle to completion or to its first failure, logging the result
    pub fn run(&mut self) -> CycleOutcome {
        info!("Starting posture analysis...");
        let outcome = self.execute();
        log_outcome(&outcome);
        outcome
    }

    fn execute(&mut self) -> CycleOutcome {
        let detection = {
            let frame = self.frames.acquire_frame().map_err(CycleFailure::Capture)?;
            self.detector.detect(&frame).map_err(CycleFailure::Detection)?
        };

        let landmarks = match detection {
            Detection::NoSubject => return Err(CycleFailure::NoSubject),
            Detection::Subject(landmarks) => landmarks,
        };

        let metrics = self.extractor.extract(&landmarks).map_err(CycleFailure::Rejected)?;
        let score = score(&metrics);

        info!(
            "Analysis result: HeadRatio={:.4}, ShoulderAngle={:.2}, Score={}",
            metrics.head_forward_ratio(),
            metrics.shoulder_tilt_angle(),
            score
        );

        self.reporter.report(&metrics, score).map_err(CycleFailure::Delivery)?;

        Ok(CycleReport { metrics, score })
    }
}

fn log_outcome(outcome: &CycleOutcome) {
    match outcome {
        Ok(_) => info!("Data sent to telemetry server successfully."),
        Err(failure @ (CycleFailure::Capture(_) | CycleFailure::Detection(_) | CycleFailure::Delivery(_))) => {
            error!("{}", failure);
        }
        Err(failure @ CycleFailure::NoSubject) => info!("{}", failure),
        Err(failure @ CycleFailure::Rejected(_)) => warn!("{}. Skipping this analysis.", failure),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::{Landmark, LandmarkId, LandmarkSet};

    struct StaticFrames(bool);

    impl FrameSource for StaticFrames {
        type Frame = ();

        fn acquire_frame(&mut self) -> Result<(), CaptureError> {
            if self.0 {
                Ok(())
            } else {
                Err(CaptureError::DeviceUnavailable(0))
            }
        }
    }

    struct FixedDetector(Detection);

    impl KeypointSource<()> for FixedDetector {
        fn detect(&mut self, _frame: &()) -> crate::Result<Detection> {
            Ok(self.0.clone())
        }
    }

    #[derive(Default)]
    struct RecordingReporter {
        sent: Vec<(PostureMetrics, PostureScore)>,
        fail_with: Option<u16>,
    }

    impl Reporter for RecordingReporter {
        fn report(&mut self, metrics: &PostureMetrics, score: PostureScore) -> Result<(), DeliveryError> {
            if let Some(status) = self.fail_with {
                return Err(DeliveryError::Status(status));
            }
            self.sent.push((*metrics, score));
            Ok(())
        }
    }

    fn subject(visibility: f64) -> Detection {
        Detection::Subject(
            LandmarkSet::new()
                .with(LandmarkId::Nose, Landmark::new(0.64, 0.3, visibility))
                .with(LandmarkId::LeftShoulder, Landmark::new(0.4, 0.5, visibility))
                .with(LandmarkId::RightShoulder, Landmark::new(0.6, 0.5, visibility)),
        )
    }

    fn cycle(
        camera_ok: bool,
        detection: Detection,
        reporter: RecordingReporter,
    ) -> SampleCycle<StaticFrames, FixedDetector, RecordingReporter> {
        SampleCycle::new(
            StaticFrames(camera_ok),
            FixedDetector(detection),
            MetricExtractor::default(),
            reporter,
        )
    }

    #[test]
    fn test_successful_cycle_reports_once() {
        let mut cycle = cycle(true, subject(0.9), RecordingReporter::default());
        let report = cycle.run().unwrap();

        assert_eq!(report.score.value(), 80);
        assert_eq!(cycle.reporter.sent.len(), 1);
        assert_eq!(cycle.reporter.sent[0].1, report.score);
    }

    #[test]
    fn test_failure_kinds_are_distinct() {
        let capture = cycle(false, subject(0.9), RecordingReporter::default()).run();
        let no_subject = cycle(true, Detection::NoSubject, RecordingReporter::default()).run();
        let low_visibility = cycle(true, subject(0.2), RecordingReporter::default()).run();
        let delivery = cycle(
            true,
            subject(0.9),
            RecordingReporter {
                fail_with: Some(500),
                ..RecordingReporter::default()
            },
        )
        .run();

        assert_eq!(capture.unwrap_err().kind(), FailureKind::Capture);
        assert_eq!(no_subject.unwrap_err().kind(), FailureKind::NoSubject);
        assert_eq!(low_visibility.unwrap_err().kind(), FailureKind::LowVisibility);
        assert_eq!(delivery.unwrap_err().kind(), FailureKind::Delivery);
    }

    #[test]
    fn test_rejected_cycle_does_not_report() {
        let mut cycle = cycle(true, subject(0.5), RecordingReporter::default());
        assert!(cycle.run().is_err());
        assert!(cycle.reporter.sent.is_empty());
    }

    #[test]
    fn test_failure_kind_labels() {
        assert_eq!(FailureKind::NoSubject.to_string(), "no_subject");
        assert_eq!(FailureKind::LowVisibility.to_string(), "low_visibility");
        assert_eq!(FailureKind::NonFiniteCoordinates.to_string(), "non_finite_coordinates");
    }

    #[test]
    fn test_non_finite_rejection_has_its_own_kind() {
        let detection = Detection::Subject(
            LandmarkSet::new()
                .with(LandmarkId::Nose, Landmark::new(f64::NAN, 0.3, 0.9))
                .with(LandmarkId::LeftShoulder, Landmark::new(0.4, 0.5, 0.9))
                .with(LandmarkId::RightShoulder, Landmark::new(0.6, 0.5, 0.9)),
        );
        let failure = cycle(true, detection, RecordingReporter::default()).run().unwrap_err();

        assert!(matches!(
            failure,
            CycleFailure::Rejected(Rejection::NonFiniteCoordinates { landmark: LandmarkId::Nose })
        ));
        assert_eq!(failure.kind(), FailureKind::NonFiniteCoordinates);
        assert_ne!(failure.kind(), FailureKind::LowVisibility);
    }
}
