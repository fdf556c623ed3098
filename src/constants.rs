//! Constants used throughout the application

/// Minimum visibility a required landmark must exceed to be trusted
pub const VISIBILITY_THRESHOLD: f64 = 0.6;

/// Upper bound of the forward head lean ratio
pub const MAX_HEAD_FORWARD_RATIO: f64 = 0.2;

/// Bound of the shoulder tilt angle in degrees (applied symmetrically)
pub const MAX_SHOULDER_TILT_DEGREES: f64 = 45.0;

/// Forward lean ratio above which the score is penalized
pub const HEAD_FORWARD_THRESHOLD: f64 = 0.12;

/// Points lost per unit of excess forward lean (10 points per 0.01)
pub const HEAD_FORWARD_PENALTY: f64 = 1000.0;

/// Absolute shoulder tilt in degrees above which the score is penalized
pub const SHOULDER_TILT_THRESHOLD: f64 = 10.0;

/// Points lost per degree of excess shoulder tilt
pub const SHOULDER_TILT_PENALTY: f64 = 2.0;

/// Score of a perfect posture
pub const MAX_SCORE: u8 = 100;

/// Default sampling interval in minutes
pub const DEFAULT_INTERVAL_MINUTES: u64 = 40;

/// Default resolution of the scheduler polling loop in seconds
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 1;

/// Default telemetry request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Default telemetry endpoint
pub const DEFAULT_TELEMETRY_ENDPOINT: &str = "https://blynk.cloud/external/api/update";

/// Token value shipped in the example configuration, treated as unset
pub const PLACEHOLDER_TOKEN: &str = "YOUR_TELEMETRY_TOKEN";

/// Frames discarded before the sampled one so exposure and focus settle
pub const DEFAULT_WARMUP_FRAMES: usize = 5;

/// Minimum pose presence probability for a subject to count as detected
pub const DEFAULT_MIN_DETECTION_CONFIDENCE: f32 = 0.5;

/// Number of landmarks in the BlazePose topology
pub const NUM_POSE_LANDMARKS: usize = 33;

/// Values per landmark in the landmark model output (x, y, z, visibility, presence)
pub const LANDMARK_STRIDE: usize = 5;

/// Default square input size of the landmark model
pub const DEFAULT_LANDMARK_INPUT_SIZE: i32 = 256;

/// Decimal places used for the ratio in telemetry
pub const RATIO_DECIMALS: usize = 4;

/// Decimal places used for the angle in telemetry
pub const ANGLE_DECIMALS: usize = 2;
