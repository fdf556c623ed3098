//! Main application module for posture telemetry.

use crate::{
    camera::{CameraCapture, FrameSource},
    config::Config,
    cycle::{CycleOutcome, SampleCycle},
    error::Result,
    metrics::MetricExtractor,
    pose_detection::{KeypointSource, PoseLandmarkDetector},
    scheduler::{Clock, Scheduler, SystemClock},
    telemetry::{HttpReporter, Reporter},
};
use log::info;

/// Privacy notice shown at startup
#[must_use]
pub fn privacy_notice(interval_minutes: u64) -> String {
    format!(
        "This program analyzes your posture using the camera every {interval_minutes} minutes. \
         Only body landmark coordinates are processed. Raw images are never saved or uploaded."
    )
}

/// Main application struct
pub struct PostureApp<S = CameraCapture, K = PoseLandmarkDetector, R = HttpReporter> {
    config: Config,
    cycle: SampleCycle<S, K, R>,
}

impl PostureApp {
    /// Validate the configuration and build the camera, model and HTTP collaborators
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the model cannot be
    /// loaded or the HTTP client cannot be created.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        info!("Initializing posture telemetry application");

        let camera = CameraCapture::new(config.camera.index, config.camera.warmup_frames);
        let detector =
            PoseLandmarkDetector::new(&config.detector.model_path, config.detector.min_detection_confidence)?;
        let extractor = MetricExtractor::new(config.detector.visibility_threshold);
        let reporter = HttpReporter::new(
            config.telemetry.endpoint.clone(),
            config.telemetry.token.clone(),
            config.telemetry.timeout(),
        )?;

        Ok(Self {
            config,
            cycle: SampleCycle::new(camera, detector, extractor, reporter),
        })
    }
}

impl<S, K, R> PostureApp<S, K, R>
where
    S: FrameSource,
    K: KeypointSource<S::Frame>,
    R: Reporter,
{
    /// Validate the configuration and wrap an already assembled cycle
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::ConfigError`] if the configuration is invalid.
    pub fn from_parts(config: Config, cycle: SampleCycle<S, K, R>) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, cycle })
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Sample immediately, then on every interval until the process is terminated
    pub fn run(&mut self) {
        self.schedule(SystemClock::new(), |_| true);
    }

    /// Run `cycles` scheduled cycles on `clock` and return the last outcome
    ///
    /// The first cycle starts immediately, so `cycles == 1` never waits.
    pub fn run_cycles<C: Clock>(&mut self, clock: C, cycles: u64) -> Option<CycleOutcome> {
        self.schedule(clock, |done| done < cycles)
    }

    fn schedule<C, F>(&mut self, clock: C, keep_running: F) -> Option<CycleOutcome>
    where
        C: Clock,
        F: FnMut(u64) -> bool,
    {
        info!("{}", privacy_notice(self.config.schedule.interval_minutes));
        info!(
            "Task scheduler started. Analysis will run every {} minutes.",
            self.config.schedule.interval_minutes
        );

        let mut scheduler = Scheduler::new(
            clock,
            self.config.schedule.interval(),
            self.config.schedule.poll_interval(),
        );
        let cycle = &mut self.cycle;
        let mut last = None;
        scheduler.run(
            || {
                // Failures are logged by the cycle and never stop the schedule
                last = Some(cycle.run());
            },
            keep_running,
        );
        last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_privacy_notice_mentions_interval() {
        let notice = privacy_notice(40);
        assert!(notice.contains("every 40 minutes"));
        assert!(notice.contains("never saved or uploaded"));
    }

    #[test]
    fn test_new_rejects_unset_token_before_loading_model() {
        let mut config = Config::default();
        config.detector.model_path = "does/not/exist.onnx".into();

        match PostureApp::new(config) {
            Err(crate::Error::ConfigError(msg)) => assert!(msg.contains("token")),
            Err(e) => panic!("Expected ConfigError, got {e}"),
            Ok(_) => panic!("Expected ConfigError"),
        }
    }

    #[test]
    fn test_from_parts_validates_config() {
        use crate::{
            camera::CaptureError,
            landmarks::Detection,
            metrics::PostureMetrics,
            scoring::PostureScore,
            telemetry::DeliveryError,
        };

        struct NoFrames;
        impl FrameSource for NoFrames {
            type Frame = ();
            fn acquire_frame(&mut self) -> std::result::Result<(), CaptureError> {
                Err(CaptureError::EmptyFrame)
            }
        }

        struct NoDetections;
        impl KeypointSource<()> for NoDetections {
            fn detect(&mut self, _frame: &()) -> Result<Detection> {
                Ok(Detection::NoSubject)
            }
        }

        struct Discard;
        impl Reporter for Discard {
            fn report(&mut self, _: &PostureMetrics, _: PostureScore) -> std::result::Result<(), DeliveryError> {
                Ok(())
            }
        }

        let cycle = SampleCycle::new(NoFrames, NoDetections, MetricExtractor::default(), Discard);
        assert!(matches!(
            PostureApp::from_parts(Config::default(), cycle),
            Err(crate::Error::ConfigError(_))
        ));
    }
}
