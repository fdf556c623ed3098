//! Configuration management for the posture telemetry application

use crate::{
    constants::{
        DEFAULT_INTERVAL_MINUTES, DEFAULT_MIN_DETECTION_CONFIDENCE, DEFAULT_POLL_INTERVAL_SECS,
        DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_TELEMETRY_ENDPOINT, DEFAULT_WARMUP_FRAMES, PLACEHOLDER_TOKEN,
        VISIBILITY_THRESHOLD,
    },
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Telemetry endpoint configuration
    pub telemetry: TelemetryConfig,

    /// Sampling schedule configuration
    pub schedule: ScheduleConfig,

    /// Camera configuration
    pub camera: CameraConfig,

    /// Pose detector configuration
    pub detector: DetectorConfig,
}

/// Telemetry endpoint configuration
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Authentication token sent with every sample
    pub token: String,

    /// Endpoint URL
    pub endpoint: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Sampling schedule configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Minutes between samples
    pub interval_minutes: u64,

    /// Scheduler polling resolution in seconds
    pub poll_interval_secs: u64,
}

/// Camera configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Capture device index
    pub index: i32,

    /// Frames discarded before the sampled one
    pub warmup_frames: usize,
}

/// Pose detector configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Path to the pose landmark ONNX model
    pub model_path: PathBuf,

    /// Minimum pose presence probability (0.0-1.0)
    pub min_detection_confidence: f32,

    /// Visibility required on the nose and both shoulders (0.0-1.0)
    pub visibility_threshold: f64,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            endpoint: DEFAULT_TELEMETRY_ENDPOINT.to_string(),
            timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl fmt::Debug for TelemetryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelemetryConfig")
            .field("token", &if self.token_is_set() { "<redacted>" } else { "<unset>" })
            .field("endpoint", &self.endpoint)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl TelemetryConfig {
    /// Whether a real token has been configured
    #[must_use]
    pub fn token_is_set(&self) -> bool {
        let token = self.token.trim();
        !token.is_empty() && token != PLACEHOLDER_TOKEN
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_minutes: DEFAULT_INTERVAL_MINUTES,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
        }
    }
}

impl ScheduleConfig {
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes.saturating_mul(60))
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            index: 0,
            warmup_frames: DEFAULT_WARMUP_FRAMES,
        }
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("assets/pose_landmark.onnx"),
            min_detection_confidence: DEFAULT_MIN_DETECTION_CONFIDENCE,
            visibility_threshold: VISIBILITY_THRESHOLD,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)?;

        Ok(())
    }

    /// Validate configuration
    ///
    /// The model path is not checked here, loading the detector reports it.
    pub fn validate(&self) -> Result<()> {
        if !self.telemetry.token_is_set() {
            return Err(Error::ConfigError(
                "Telemetry token is not set, configure telemetry.token or pass --token".to_string(),
            ));
        }
        if self.telemetry.endpoint.trim().is_empty() {
            return Err(Error::ConfigError("Telemetry endpoint must not be empty".to_string()));
        }
        if self.telemetry.timeout_secs == 0 {
            return Err(Error::ConfigError("Request timeout must be greater than 0".to_string()));
        }

        if self.schedule.interval_minutes == 0 {
            return Err(Error::ConfigError("Sampling interval must be greater than 0".to_string()));
        }
        if self.schedule.poll_interval_secs == 0 {
            return Err(Error::ConfigError("Poll interval must be greater than 0".to_string()));
        }

        if !(0.0..=1.0).contains(&self.detector.min_detection_confidence) {
            return Err(Error::ConfigError(
                "Detection confidence must be between 0.0 and 1.0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.detector.visibility_threshold) {
            return Err(Error::ConfigError(
                "Visibility threshold must be between 0.0 and 1.0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Values given on the command line, applied over the file configuration
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub token: Option<String>,
    pub endpoint: Option<String>,
    pub interval_minutes: Option<u64>,
    pub camera_index: Option<i32>,
    pub model_path: Option<PathBuf>,
}

impl Overrides {
    /// Replace every field of `config` that has an override
    pub fn apply(&self, config: &mut Config) {
        if let Some(token) = &self.token {
            config.telemetry.token.clone_from(token);
        }
        if let Some(endpoint) = &self.endpoint {
            config.telemetry.endpoint.clone_from(endpoint);
        }
        if let Some(interval) = self.interval_minutes {
            config.schedule.interval_minutes = interval;
        }
        if let Some(index) = self.camera_index {
            config.camera.index = index;
        }
        if let Some(path) = &self.model_path {
            config.detector.model_path.clone_from(path);
        }
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Posture Telemetry Configuration

# Telemetry endpoint
telemetry:
  token: "YOUR_TELEMETRY_TOKEN"
  endpoint: "https://blynk.cloud/external/api/update"
  timeout_secs: 10

# Sampling schedule
schedule:
  interval_minutes: 40
  poll_interval_secs: 1

# Camera
camera:
  index: 0
  warmup_frames: 5

# Pose landmark detector
detector:
  model_path: "assets/pose_landmark.onnx"
  min_detection_confidence: 0.5
  visibility_threshold: 0.6
"#;
