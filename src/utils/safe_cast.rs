//! Checked numeric conversions

use crate::{Error, Result};

/// Safely convert usize to i32 with overflow checking
///
/// # Errors
///
/// Returns an error if the value exceeds i32::MAX
pub fn usize_to_i32(value: usize) -> Result<i32> {
    value
        .try_into()
        .map_err(|_| Error::InvalidInput(format!("Value {value} too large to fit in i32")))
}

/// Safely convert a positive i32 dimension to usize
///
/// # Errors
///
/// Returns an error if the value is zero or negative
pub fn dimension_to_usize(value: i32) -> Result<usize> {
    if value <= 0 {
        return Err(Error::InvalidInput(format!("Dimension {value} must be positive")));
    }
    value
        .try_into()
        .map_err(|_| Error::InvalidInput(format!("Dimension {value} does not fit in usize")))
}

/// Clamp and convert f64 to u8, truncating toward zero
#[must_use]
#[allow(clippy::cast_possible_truncation)] // Clamping ensures safe truncation
#[allow(clippy::cast_sign_loss)] // Clamping to a u8 range removes the sign
pub fn f64_to_u8_clamp(value: f64, min: u8, max: u8) -> u8 {
    let (min, max) = if min <= max { (min, max) } else { (max, min) };

    if value.is_nan() {
        return min;
    }

    value.clamp(f64::from(min), f64::from(max)) as u8
}
