//! Multi-turn position tracking from a wrapping 12-bit angle.
//!
//! Each raw sample is shifted by the calibration offset into a
//! [`CorrectedAngle`], classified into a [`Quadrant`], and a turn is
//! counted whenever consecutive samples move between the fourth and first
//! quadrants.
//!
//! Turn counting is only reliable while the shaft rotates less than 90°
//! between two samples (ideally less than 45°). A larger step, such as
//! quadrant 1 straight to quadrant 3, can miss or invert a boundary
//! crossing without any error being reported.

use embedded_hal::delay::DelayNs;

use crate::{
    calibration::{self, CalibrationConfig},
    error::Error,
    source::RawAngleSource,
    units::{self, ANGLE_MAX, RAW_MAX},
};

/// One of four arcs of a revolution
///
/// ```text
///     4  |  1
///     ---+---
///     3  |  2
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Quadrant {
    /// [0°, 90°]
    First,
    /// (90°, 180°]
    Second,
    /// (180°, 270°]
    Third,
    /// (270°, 360°)
    Fourth,
}

impl Quadrant {
    /// Classify a corrected angle
    #[must_use]
    pub const fn of(angle: CorrectedAngle) -> Self {
        // 1024 counts = 90° exactly
        match angle.raw() {
            0..=1024 => Self::First,
            1025..=2048 => Self::Second,
            2049..=3072 => Self::Third,
            _ => Self::Fourth,
        }
    }
}

/// Angle within one revolution, relative to the calibrated zero
///
/// Held as a raw residue below 4096, so the value in degrees is always in
/// `[0, 360)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CorrectedAngle(u16);

impl CorrectedAngle {
    /// Corrected angle in raw counts (0-4095)
    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }

    #[must_use]
    pub fn degrees(self) -> f32 {
        units::raw_to_degrees(self.0)
    }

    #[must_use]
    pub fn radians(self) -> f32 {
        units::raw_to_radians(self.0)
    }

    #[must_use]
    pub const fn quadrant(self) -> Quadrant {
        Quadrant::of(self)
    }
}

/// Shift `raw` by `offset` modulo one revolution
///
/// # Errors
///
/// Returns [`Error::OutOfRangeSample`] if `raw` is above 4095 and
/// [`Error::InvalidArgument`] if `offset` is.
pub fn correct(raw: u16, offset: u16) -> Result<CorrectedAngle, Error> {
    if raw > RAW_MAX {
        return Err(Error::OutOfRangeSample(raw));
    }
    if offset > RAW_MAX {
        return Err(Error::InvalidArgument);
    }
    Ok(shift(raw, offset))
}

/// Both arguments already checked against [`RAW_MAX`]
const fn shift(raw: u16, offset: u16) -> CorrectedAngle {
    CorrectedAngle(raw.wrapping_sub(offset) % ANGLE_MAX)
}

/// Calibrated multi-turn position of one sensor
///
/// The tracker owns its state exclusively; sharing one between threads
/// needs a mutex around each step.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PositionTracker {
    offset: u16,
    turns: i32,
    /// Last accepted sample, `None` until the first step
    last: Option<CorrectedAngle>,
}

impl Default for PositionTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl PositionTracker {
    /// Create a tracker with a zero offset
    #[must_use]
    pub const fn new() -> Self {
        Self {
            offset: 0,
            turns: 0,
            last: None,
        }
    }

    /// Create a tracker with a previously determined offset
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `offset` is above 4095.
    pub const fn with_offset(offset: u16) -> Result<Self, Error> {
        if offset > RAW_MAX {
            return Err(Error::InvalidArgument);
        }
        Ok(Self {
            offset,
            turns: 0,
            last: None,
        })
    }

    /// Calibrate against `source` and install the resulting offset
    ///
    /// On success only the offset and the previous quadrant change: the
    /// next step starts quadrant tracking afresh against the new zero,
    /// and the turn count carries over. On failure the tracker is left
    /// exactly as it was.
    ///
    /// # Errors
    ///
    /// See [`calibration::calibrate`].
    pub fn calibrate<S, D>(
        &mut self,
        source: &mut S,
        delay: &mut D,
        config: CalibrationConfig,
    ) -> Result<u16, Error<S::Error>>
    where
        S: RawAngleSource + ?Sized,
        D: DelayNs + ?Sized,
    {
        let offset = calibration::calibrate(source, delay, config)?;
        self.offset = offset;
        self.last = None;
        Ok(offset)
    }

    /// Feed one raw sample and return the total angle in degrees
    ///
    /// Repeating the same sample leaves the result unchanged. The total is
    /// an `f64`, which resolves single counts at any turn count.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRangeSample`] if `raw` is above 4095; the
    /// previous state is retained.
    pub fn step(&mut self, raw: u16) -> Result<f64, Error> {
        let angle = self.accept(raw)?;
        Ok(self.advance(angle))
    }

    /// Read one sample from `source` and feed it to [`Self::step`]
    ///
    /// # Errors
    ///
    /// Returns [`Error::Communication`] if the read fails and
    /// [`Error::OutOfRangeSample`] if the value is above 4095. The tracker
    /// is unchanged in both cases.
    pub fn update<S>(&mut self, source: &mut S) -> Result<f64, Error<S::Error>>
    where
        S: RawAngleSource + ?Sized,
    {
        let raw = source.read_raw().map_err(Error::Communication)?;
        let angle = self.accept(raw)?;
        Ok(self.advance(angle))
    }

    /// Clear the turn count, keeping the offset and the last quadrant
    pub fn reset_turn_count(&mut self) {
        self.turns = 0;
    }

    /// Installed calibration offset in raw counts
    #[must_use]
    pub const fn offset(&self) -> u16 {
        self.offset
    }

    /// Signed number of full revolutions since the first step
    #[must_use]
    pub const fn turn_count(&self) -> i32 {
        self.turns
    }

    /// Corrected angle of the last accepted sample
    #[must_use]
    pub const fn angle(&self) -> Option<CorrectedAngle> {
        self.last
    }

    /// Total angle in degrees after the last accepted sample
    #[must_use]
    pub fn total_degrees(&self) -> Option<f64> {
        self.last.map(|angle| self.total_for(angle))
    }

    /// Total angle in radians after the last accepted sample
    #[must_use]
    pub fn total_radians(&self) -> Option<f64> {
        self.total_degrees().map(f64::to_radians)
    }

    /// Exact total angle in raw counts after the last accepted sample
    #[must_use]
    pub fn total_raw(&self) -> Option<i64> {
        self.last
            .map(|angle| i64::from(self.turns) * i64::from(ANGLE_MAX) + i64::from(angle.raw()))
    }

    fn accept<E>(&self, raw: u16) -> Result<CorrectedAngle, Error<E>> {
        if raw > RAW_MAX {
            #[cfg(feature = "defmt")]
            defmt::warn!("Rejected out of range sample: {}", raw);
            return Err(Error::OutOfRangeSample(raw));
        }
        Ok(shift(raw, self.offset))
    }

    fn advance(&mut self, angle: CorrectedAngle) -> f64 {
        let current = angle.quadrant();

        if let Some(previous) = self.last.map(CorrectedAngle::quadrant) {
            match (previous, current) {
                (Quadrant::Fourth, Quadrant::First) => {
                    self.turns = self.turns.saturating_add(1);
                    #[cfg(feature = "defmt")]
                    defmt::trace!("Forward crossing, turns: {}", self.turns);
                }
                (Quadrant::First, Quadrant::Fourth) => {
                    self.turns = self.turns.saturating_sub(1);
                    #[cfg(feature = "defmt")]
                    defmt::trace!("Backward crossing, turns: {}", self.turns);
                }
                // same quadrant, or a move within the revolution
                (Quadrant::First, Quadrant::First | Quadrant::Second | Quadrant::Third)
                | (Quadrant::Second | Quadrant::Third, _)
                | (Quadrant::Fourth, Quadrant::Second | Quadrant::Third | Quadrant::Fourth) => {}
            }
        }

        self.last = Some(angle);
        self.total_for(angle)
    }

    fn total_for(&self, angle: CorrectedAngle) -> f64 {
        f64::from(self.turns) * 360.0 + f64::from(angle.raw()) * 360.0 / f64::from(ANGLE_MAX)
    }
}
