//! Body landmark detection.
//!
//! [`KeypointSource`] is the seam between the sampling pipeline and the pose
//! model. [`PoseLandmarkDetector`] implements it with a BlazePose-style
//! landmark model run through `ONNX` Runtime on the whole frame.

use crate::{
    constants::{DEFAULT_LANDMARK_INPUT_SIZE, DEFAULT_MIN_DETECTION_CONFIDENCE, LANDMARK_STRIDE, NUM_POSE_LANDMARKS},
    error::Error,
    landmarks::{Detection, Landmark, LandmarkId, LandmarkSet},
    utils::safe_cast::{dimension_to_usize, usize_to_i32},
    Result,
};
use ndarray::{Array4, CowArray};
use opencv::core::{Mat, Size, CV_32F};
use opencv::imgproc::{self, InterpolationFlags};
use opencv::prelude::*;
use ort::{Environment, Session, Value};
use std::path::Path;
use std::sync::Arc;

/// Anything that turns an image into body landmarks
pub trait KeypointSource<F> {
    /// Detect the landmarks of the most prominent person in `frame`
    ///
    /// # Errors
    ///
    /// Returns an error if the detector itself fails. A frame without a person
    /// is not an error, it yields [`Detection::NoSubject`].
    fn detect(&mut self, frame: &F) -> Result<Detection>;
}

#[inline]
fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Decode raw landmark model output.
///
/// `raw` holds `LANDMARK_STRIDE` values per landmark (x, y, z, visibility
/// logit, presence logit) with x and y in input pixels. `presence` is the
/// pose presence probability when the model reports one.
///
/// # Errors
///
/// Returns an error if `raw` is too short for the BlazePose topology or
/// `input_size` is not positive.
#[allow(clippy::cast_precision_loss)] // Input sizes are small
#[allow(clippy::neg_cmp_op_on_partial_ord)] // NaN presence counts as absent
pub fn decode_landmarks(
    raw: &[f32],
    presence: Option<f32>,
    input_size: i32,
    min_detection_confidence: f32,
) -> Result<Detection> {
    let expected = NUM_POSE_LANDMARKS * LANDMARK_STRIDE;
    if raw.len() < expected {
        return Err(Error::ModelOutputError(format!(
            "Expected at least {expected} landmark values, got {}",
            raw.len()
        )));
    }
    let size = dimension_to_usize(input_size)? as f32;

    if let Some(presence) = presence {
        if !(presence >= min_detection_confidence) {
            return Ok(Detection::NoSubject);
        }
    }

    let landmarks: LandmarkSet = raw
        .chunks_exact(LANDMARK_STRIDE)
        .take(NUM_POSE_LANDMARKS)
        .enumerate()
        .filter_map(|(i, values)| {
            let id = LandmarkId::from_index(i)?;
            let x = f64::from(values[0] / size);
            let y = f64::from(values[1] / size);
            let visibility = f64::from(sigmoid(values[3]));
            Some((id, Landmark::new(x, y, visibility)))
        })
        .collect();

    Ok(Detection::Subject(landmarks))
}

/// Pose landmark detector using `ONNX` Runtime
pub struct PoseLandmarkDetector {
    session: Session,
    input_size: i32,
    channels_last: bool,
    min_detection_confidence: f32,
}

impl PoseLandmarkDetector {
    /// Create a new detector from an `ONNX` model file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The ONNX model file cannot be loaded
    /// - The model has no inputs or no outputs
    /// - The ONNX runtime environment cannot be created
    pub fn new<P: AsRef<Path>>(model_path: P, min_detection_confidence: f32) -> Result<Self> {
        log::info!(
            "Initializing PoseLandmarkDetector with model: {}",
            model_path.as_ref().display()
        );
        let environment = Arc::new(
            Environment::builder()
                .with_name("pose_landmarks")
                .with_log_level(ort::LoggingLevel::Warning)
                .build()?,
        );

        let session = ort::SessionBuilder::new(&environment)?
            .with_optimization_level(ort::GraphOptimizationLevel::Level3)?
            .with_model_from_file(model_path)?;

        let input_shape = &session
            .inputs
            .first()
            .ok_or_else(|| Error::ModelInputError("Model has no inputs".to_string()))?
            .dimensions;

        if session.outputs.is_empty() {
            return Err(Error::ModelOutputError("Model has no outputs".to_string()));
        }

        // Converted BlazePose models are NHWC [1, 256, 256, 3], re-exported ones NCHW
        let (input_size, channels_last) = match input_shape.as_slice() {
            [_, Some(h), _, Some(3)] => (i32::try_from(*h).unwrap_or(DEFAULT_LANDMARK_INPUT_SIZE), true),
            [_, Some(3), Some(h), _] => (i32::try_from(*h).unwrap_or(DEFAULT_LANDMARK_INPUT_SIZE), false),
            _ => {
                log::warn!("Unrecognized input shape {:?}, assuming NHWC 256x256", input_shape);
                (DEFAULT_LANDMARK_INPUT_SIZE, true)
            }
        };

        Ok(Self {
            session,
            input_size,
            channels_last,
            min_detection_confidence,
        })
    }

    /// Create a detector with the default detection confidence
    ///
    /// # Errors
    ///
    /// See [`PoseLandmarkDetector::new`].
    pub fn with_defaults<P: AsRef<Path>>(model_path: P) -> Result<Self> {
        Self::new(model_path, DEFAULT_MIN_DETECTION_CONFIDENCE)
    }

    /// Square input size expected by the model
    #[must_use]
    pub fn input_size(&self) -> i32 {
        self.input_size
    }

    /// Resize, convert BGR to RGB and scale to [0, 1]
    #[allow(clippy::cast_sign_loss)] // Input size is validated positive
    fn preprocess(&self, image: &Mat) -> Result<Array4<f32>> {
        let size = dimension_to_usize(self.input_size)?;
        let channels = 3;

        let mut resized = Mat::default();
        imgproc::resize(
            image,
            &mut resized,
            Size::new(self.input_size, self.input_size),
            0.0,
            0.0,
            InterpolationFlags::INTER_LINEAR as i32,
        )?;

        let mut rgb_image = Mat::default();
        imgproc::cvt_color(&resized, &mut rgb_image, imgproc::COLOR_BGR2RGB, 0)?;

        let mut float_image = Mat::default();
        rgb_image.convert_to(&mut float_image, CV_32F, 1.0 / 255.0, 0.0)?;

        let mut data = vec![0.0f32; size * size * channels];
        for row in 0..size {
            for col in 0..size {
                let pixel = float_image.at_2d::<opencv::core::Vec3f>(usize_to_i32(row)?, usize_to_i32(col)?)?;
                for ch in 0..channels {
                    data[(row * size + col) * channels + ch] = pixel[ch];
                }
            }
        }

        let array = Array4::from_shape_vec((1, size, size, channels), data)
            .map_err(|e| Error::ModelDataFormatError(format!("Failed to create array: {e}")))?;

        if self.channels_last {
            Ok(array)
        } else {
            Ok(array.permuted_axes([0, 3, 1, 2]).as_standard_layout().to_owned())
        }
    }

    /// Run the model, returning the flat landmark tensor and the presence flag
    fn forward(&self, inputs: Array4<f32>) -> Result<(Vec<f32>, Option<f32>)> {
        let cow_array = CowArray::from(inputs.into_dyn());
        let input_tensor = Value::from_array(self.session.allocator(), &cow_array)?;

        let outputs = self.session.run(vec![input_tensor])?;
        let mut outputs = outputs.into_iter();

        let landmarks_output = outputs
            .next()
            .ok_or_else(|| Error::ModelOutputError("No output from model".to_string()))?;
        let landmarks_tensor = landmarks_output.try_extract::<f32>()?;
        let landmarks_view = landmarks_tensor.view();
        let landmarks = landmarks_view
            .as_slice()
            .ok_or_else(|| Error::ModelOutputError("Failed to get landmark data".to_string()))?
            .to_vec();

        let presence = match outputs.next() {
            Some(flag_output) => {
                let flag_tensor = flag_output.try_extract::<f32>()?;
                let flag_view = flag_tensor.view();
                flag_view.iter().next().copied()
            }
            None => None,
        };

        Ok((landmarks, presence))
    }
}

impl KeypointSource<Mat> for PoseLandmarkDetector {
    fn detect(&mut self, frame: &Mat) -> Result<Detection> {
        if frame.empty() {
            return Err(Error::InvalidInput("Empty frame".to_string()));
        }

        let inputs = self.preprocess(frame)?;
        let (raw, presence) = self.forward(inputs)?;
        decode_landmarks(&raw, presence, self.input_size, self.min_detection_confidence)
    }
}
