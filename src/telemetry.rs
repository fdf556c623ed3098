//! Telemetry delivery of posture samples.
//!
//! One sample is one GET request to the configured endpoint with the query
//! parameters `token`, `v0` (forward lean ratio, 4 decimals), `v1` (shoulder
//! tilt, 2 decimals) and `v2` (integer score). Only HTTP 200 counts as
//! delivered. Failed deliveries are not retried.

use crate::{
    constants::{ANGLE_DECIMALS, RATIO_DECIMALS},
    metrics::PostureMetrics,
    scoring::PostureScore,
    Result,
};
use log::debug;
use reqwest::{blocking::Client, StatusCode};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Reason a sample did not reach the telemetry server
#[derive(Error, Debug)]
pub enum DeliveryError {
    /// Connection, DNS or timeout failure
    #[error("could not reach telemetry server: {0}")]
    Transport(#[source] reqwest::Error),

    /// Server answered with something other than 200
    #[error("telemetry server returned status code {0}")]
    Status(u16),
}

impl DeliveryError {
    /// Whether the request ran out of time
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }
}

/// Query parameters of one telemetry sample
#[derive(Clone, PartialEq, Eq)]
pub struct TelemetryParams {
    token: String,
    head_forward_ratio: String,
    shoulder_tilt_angle: String,
    score: String,
}

impl TelemetryParams {
    #[must_use]
    pub fn new(token: &str, metrics: &PostureMetrics, score: PostureScore) -> Self {
        Self {
            token: token.to_string(),
            head_forward_ratio: format!("{:.*}", RATIO_DECIMALS, metrics.head_forward_ratio()),
            shoulder_tilt_angle: format!("{:.*}", ANGLE_DECIMALS, metrics.shoulder_tilt_angle()),
            score: score.to_string(),
        }
    }

    /// Forward lean ratio as sent (`v0`)
    #[must_use]
    pub fn head_forward_ratio(&self) -> &str {
        &self.head_forward_ratio
    }

    /// Shoulder tilt angle as sent (`v1`)
    #[must_use]
    pub fn shoulder_tilt_angle(&self) -> &str {
        &self.shoulder_tilt_angle
    }

    /// Score as sent (`v2`)
    #[must_use]
    pub fn score(&self) -> &str {
        &self.score
    }

    /// Query pairs in wire order
    #[must_use]
    pub fn query_pairs(&self) -> [(&'static str, &str); 4] {
        [
            ("token", self.token.as_str()),
            ("v0", self.head_forward_ratio.as_str()),
            ("v1", self.shoulder_tilt_angle.as_str()),
            ("v2", self.score.as_str()),
        ]
    }
}

impl fmt::Debug for TelemetryParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelemetryParams")
            .field("token", &"<redacted>")
            .field("v0", &self.head_forward_ratio)
            .field("v1", &self.shoulder_tilt_angle)
            .field("v2", &self.score)
            .finish()
    }
}

/// Destination of posture samples
pub trait Reporter {
    /// Deliver one sample, at most one attempt
    ///
    /// # Errors
    ///
    /// Returns a [`DeliveryError`] if the sample was not accepted.
    fn report(&mut self, metrics: &PostureMetrics, score: PostureScore) -> std::result::Result<(), DeliveryError>;
}

/// Reporter pushing samples over HTTP
pub struct HttpReporter {
    client: Client,
    endpoint: String,
    token: String,
}

impl HttpReporter {
    /// Create a reporter with a bounded request timeout
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            token: token.into(),
        })
    }

    /// Endpoint the samples are sent to
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn send(&self, params: &TelemetryParams) -> std::result::Result<(), DeliveryError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&params.query_pairs())
            .send()
            .map_err(DeliveryError::Transport)?;

        let status = response.status();
        debug!("Telemetry server answered {}", status);

        if status == StatusCode::OK {
            Ok(())
        } else {
            Err(DeliveryError::Status(status.as_u16()))
        }
    }
}

impl Reporter for HttpReporter {
    fn report(&mut self, metrics: &PostureMetrics, score: PostureScore) -> std::result::Result<(), DeliveryError> {
        let params = TelemetryParams::new(&self.token, metrics, score);
        self.send(&params)
    }
}
