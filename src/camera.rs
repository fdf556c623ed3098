//! Frame acquisition from a webcam.
//!
//! The device is opened for every sample and released before the frame is
//! returned, so no capture handle is held between ticks.

use crate::constants::DEFAULT_WARMUP_FRAMES;
use log::debug;
use opencv::{
    core::Mat,
    prelude::*,
    videoio::{self, VideoCapture},
};
use thiserror::Error;

/// Reason no frame could be acquired
#[derive(Error, Debug)]
pub enum CaptureError {
    /// The device could not be opened, possibly because another application holds it
    #[error("cannot open camera {0}, check if it is used by another application")]
    DeviceUnavailable(i32),

    /// The device opened but produced no image
    #[error("failed to capture image from camera")]
    EmptyFrame,

    /// The capture backend reported an error
    #[error("capture backend error: {0}")]
    Backend(#[from] opencv::Error),
}

/// Source of still images
pub trait FrameSource {
    /// Image type produced by this source
    type Frame;

    /// Acquire a single frame
    ///
    /// # Errors
    ///
    /// Returns a [`CaptureError`] if the device is unavailable or the read fails.
    fn acquire_frame(&mut self) -> Result<Self::Frame, CaptureError>;
}

/// Read `warmup` frames, discard them, then return the next one.
///
/// `read` yields `Ok(None)` for a frame the device failed to deliver. Failed
/// warm-up reads are ignored; only the final read decides the outcome.
///
/// # Errors
///
/// Returns [`CaptureError::EmptyFrame`] if the final read yields nothing, or
/// the first backend error encountered.
pub fn read_after_warmup<F, R>(mut read: R, warmup: usize) -> Result<F, CaptureError>
where
    R: FnMut() -> Result<Option<F>, CaptureError>,
{
    for _ in 0..warmup {
        let _ = read()?;
    }

    read()?.ok_or(CaptureError::EmptyFrame)
}

/// OpenCV webcam capture
#[derive(Debug, Clone)]
pub struct CameraCapture {
    index: i32,
    warmup_frames: usize,
}

impl CameraCapture {
    #[must_use]
    pub fn new(index: i32, warmup_frames: usize) -> Self {
        Self { index, warmup_frames }
    }

    /// Device index passed to the capture backend
    #[must_use]
    pub fn index(&self) -> i32 {
        self.index
    }
}

impl Default for CameraCapture {
    fn default() -> Self {
        Self::new(0, DEFAULT_WARMUP_FRAMES)
    }
}

impl FrameSource for CameraCapture {
    type Frame = Mat;

    fn acquire_frame(&mut self) -> Result<Mat, CaptureError> {
        debug!("Opening camera {}", self.index);
        let mut capture = VideoCapture::new(self.index, videoio::CAP_ANY)?;

        if !capture.is_opened()? {
            return Err(CaptureError::DeviceUnavailable(self.index));
        }

        let frame = read_after_warmup(
            || {
                let mut frame = Mat::default();
                if capture.read(&mut frame)? && !frame.empty() {
                    Ok(Some(frame))
                } else {
                    Ok(None)
                }
            },
            self.warmup_frames,
        );

        capture.release()?;
        frame
    }
}
