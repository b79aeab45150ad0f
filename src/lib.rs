#![no_std]
#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]

mod calibration;
mod diagnostics;
mod driver;
mod error;
mod register;
mod source;
mod tracker;
pub mod units;

pub use calibration::{CalibrationConfig, calibrate};
pub use diagnostics::Diagnostics;
pub use driver::{As5600, DEFAULT_ADDRESS, MAX_ANGLE_BURNS};
pub use error::Error;
pub use register::{
    BurnCommand, ConfRegister, FastFilterThreshold, Hysteresis, OTP_LOAD_SEQUENCE, OutputStage,
    PowerMode, PwmFrequency, Register, SlowFilter, StatusRegister, filter_mode,
};
pub use source::RawAngleSource;
pub use tracker::{CorrectedAngle, PositionTracker, Quadrant, correct};
pub use units::{ANGLE_MAX, RAW_MAX};
