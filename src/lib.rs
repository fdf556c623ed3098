//! Periodic posture sampling with telemetry delivery.
//!
//! Every sampling cycle:
//! 1. Captures one still frame from the webcam
//! 2. Detects body landmarks with a pose landmark `ONNX` model
//! 3. Derives forward head lean and shoulder tilt from the nose and shoulders
//! 4. Scores the posture on a 0-100 scale
//! 5. Pushes the three values to a telemetry endpoint
//!
//! Cycles run once at startup and then on a fixed interval. A failed cycle
//! is logged and skipped; the next tick runs as scheduled.
//!
//! # Examples
//!
//! ## Scoring landmarks
//!
//! ```
//! use posture_telemetry::{
//!     landmarks::{Landmark, LandmarkId, LandmarkSet},
//!     metrics::extract,
//!     scoring::score,
//! };
//!
//! let landmarks = LandmarkSet::new()
//!     .with(LandmarkId::Nose, Landmark::new(0.64, 0.30, 0.99))
//!     .with(LandmarkId::LeftShoulder, Landmark::new(0.40, 0.50, 0.98))
//!     .with(LandmarkId::RightShoulder, Landmark::new(0.60, 0.50, 0.97));
//!
//! let metrics = extract(&landmarks).unwrap();
//! assert_eq!(score(&metrics).value(), 80);
//! ```
//!
//! ## Running the full pipeline
//!
//! ```no_run
//! use posture_telemetry::{app::PostureApp, config::Config};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut config = Config::default();
//! config.telemetry.token = "my-token".to_string();
//!
//! let mut app = PostureApp::new(config)?;
//! app.run();
//! # Ok(())
//! # }
//! ```

/// Body landmark types
pub mod landmarks;

/// Forward lean and shoulder tilt extraction
pub mod metrics;

/// Composite posture score
pub mod scoring;

/// Telemetry delivery
pub mod telemetry;

/// Webcam frame acquisition
pub mod camera;

/// Pose landmark detection
pub mod pose_detection;

/// One capture-to-report sampling cycle
pub mod cycle;

/// Fixed-interval scheduling
pub mod scheduler;

/// Utility functions
pub mod utils;

/// Error types and result handling
pub mod error;

/// Main application module
pub mod app;

/// Constants used throughout the application
pub mod constants;

/// Configuration management
pub mod config;

pub use error::{Error, Result};
