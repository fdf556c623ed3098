//! Body landmark types produced by a keypoint source.
//!
//! Positions are normalized to the image: `(0, 0)` is the top-left corner and
//! `(1, 1)` the bottom-right one. Visibility is the detector's confidence that
//! the reported position is reliable.

use crate::constants::NUM_POSE_LANDMARKS;
use std::collections::HashMap;

/// Identity of a body landmark, in BlazePose index order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LandmarkId {
    Nose,
    LeftEyeInner,
    LeftEye,
    LeftEyeOuter,
    RightEyeInner,
    RightEye,
    RightEyeOuter,
    LeftEar,
    RightEar,
    MouthLeft,
    MouthRight,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftPinky,
    RightPinky,
    LeftIndex,
    RightIndex,
    LeftThumb,
    RightThumb,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
    LeftHeel,
    RightHeel,
    LeftFootIndex,
    RightFootIndex,
}

impl LandmarkId {
    /// All landmark ids in model output order
    pub const ALL: [LandmarkId; NUM_POSE_LANDMARKS] = [
        Self::Nose,
        Self::LeftEyeInner,
        Self::LeftEye,
        Self::LeftEyeOuter,
        Self::RightEyeInner,
        Self::RightEye,
        Self::RightEyeOuter,
        Self::LeftEar,
        Self::RightEar,
        Self::MouthLeft,
        Self::MouthRight,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftPinky,
        Self::RightPinky,
        Self::LeftIndex,
        Self::RightIndex,
        Self::LeftThumb,
        Self::RightThumb,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
        Self::LeftHeel,
        Self::RightHeel,
        Self::LeftFootIndex,
        Self::RightFootIndex,
    ];

    /// Landmark at a model output index
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Model output index of this landmark
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// A single detected landmark
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landmark {
    /// Normalized horizontal position
    pub x: f64,
    /// Normalized vertical position
    pub y: f64,
    /// Detection confidence in [0, 1]
    pub visibility: f64,
}

impl Landmark {
    #[must_use]
    pub fn new(x: f64, y: f64, visibility: f64) -> Self {
        Self { x, y, visibility }
    }
}

/// Landmarks of one subject, keyed by identity
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LandmarkSet {
    points: HashMap<LandmarkId, Landmark>,
}

impl LandmarkSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a landmark
    pub fn insert(&mut self, id: LandmarkId, landmark: Landmark) {
        self.points.insert(id, landmark);
    }

    /// Builder-style insert
    #[must_use]
    pub fn with(mut self, id: LandmarkId, landmark: Landmark) -> Self {
        self.insert(id, landmark);
        self
    }

    #[must_use]
    pub fn get(&self, id: LandmarkId) -> Option<&Landmark> {
        self.points.get(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl FromIterator<(LandmarkId, Landmark)> for LandmarkSet {
    fn from_iter<I: IntoIterator<Item = (LandmarkId, Landmark)>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

/// Outcome of running a keypoint source on one image
#[derive(Debug, Clone, PartialEq)]
pub enum Detection {
    /// No person was found in the image
    NoSubject,
    /// Landmarks of the detected person
    Subject(LandmarkSet),
}
