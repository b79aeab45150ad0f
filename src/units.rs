//! Conversions between raw counts, degrees, radians and RPM.
//!
//! The AS5600 maps one revolution onto [`ANGLE_MAX`] counts, so every
//! conversion is a constant factor.

use core::f32::consts::TAU;

/// Number of raw counts per revolution (12-bit: 0-4095, representing 0-360°)
pub const ANGLE_MAX: u16 = 0x0FFF + 1;

/// Largest valid raw angle
pub const RAW_MAX: u16 = ANGLE_MAX - 1;

pub const RAW_TO_DEGREES: f32 = 360.0 / ANGLE_MAX as f32;
pub const DEGREES_TO_RAW: f32 = ANGLE_MAX as f32 / 360.0;
pub const RAW_TO_RADIANS: f32 = TAU / ANGLE_MAX as f32;
pub const RADIANS_TO_RAW: f32 = ANGLE_MAX as f32 / TAU;
/// Converts a rate in counts per second to revolutions per minute
pub const RAW_TO_RPM: f32 = 60.0 / ANGLE_MAX as f32;

#[must_use]
pub fn raw_to_degrees(raw: u16) -> f32 {
    f32::from(raw) * RAW_TO_DEGREES
}

/// Convert degrees to the nearest raw count within one revolution
///
/// Any angle wraps into `[0, 360)`: 360° is 0 and -3° is 4062.
#[must_use]
pub fn degrees_to_raw(degrees: f32) -> u16 {
    to_nearest_count(degrees * DEGREES_TO_RAW)
}

#[must_use]
pub fn raw_to_radians(raw: u16) -> f32 {
    f32::from(raw) * RAW_TO_RADIANS
}

/// Convert radians to the nearest raw count within one revolution
///
/// Any angle wraps into `[0, 2π)`: 2π is 0 and -π/2 is 3072.
#[must_use]
pub fn radians_to_raw(radians: f32) -> u16 {
    to_nearest_count(radians * RADIANS_TO_RAW)
}

#[must_use]
pub fn degrees_to_radians(degrees: f32) -> f32 {
    degrees.to_radians()
}

#[must_use]
pub fn radians_to_degrees(radians: f32) -> f32 {
    radians.to_degrees()
}

/// Convert an angular rate in raw counts per second to RPM
#[must_use]
pub fn counts_per_second_to_rpm(counts_per_second: f32) -> f32 {
    counts_per_second * RAW_TO_RPM
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_nearest_count(counts: f32) -> u16 {
    // core has no f32::round; `as` truncates toward zero and saturates
    let nearest = if counts < 0.0 {
        -((0.5 - counts) as i64)
    } else {
        (counts + 0.5) as i64
    };
    nearest.rem_euclid(i64::from(ANGLE_MAX)) as u16
}
