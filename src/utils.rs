//! Utility functions shared by the capture, detection and scoring stages.

pub mod safe_cast;
