//! Zero-offset calibration by averaging raw samples.

use embedded_hal::delay::DelayNs;

use crate::{error::Error, source::RawAngleSource, units::RAW_MAX};

/// How many samples to average and how far apart to take them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationConfig {
    /// Number of samples, must be non-zero
    pub samples: u32,
    /// Blocking delay after each sample, in microseconds
    pub interval_us: u32,
}

impl CalibrationConfig {
    /// 1000 samples, 1 ms apart
    pub const DEFAULT: Self = Self {
        samples: 1000,
        interval_us: 1000,
    };

    #[must_use]
    pub const fn new(samples: u32, interval_us: u32) -> Self {
        Self {
            samples,
            interval_us,
        }
    }
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Average `config.samples` raw readings into a zero offset
///
/// Nothing is installed anywhere; the caller decides what to do with the
/// result. The average truncates. A constant signal `V` yields exactly `V`.
///
/// # Errors
///
/// - [`Error::InvalidArgument`] if `config.samples` is zero, before any read
/// - [`Error::Communication`] if any read fails, aborting the whole run
/// - [`Error::OutOfRangeSample`] if any read is above 4095
pub fn calibrate<S, D>(
    source: &mut S,
    delay: &mut D,
    config: CalibrationConfig,
) -> Result<u16, Error<S::Error>>
where
    S: RawAngleSource + ?Sized,
    D: DelayNs + ?Sized,
{
    if config.samples == 0 {
        return Err(Error::InvalidArgument);
    }

    #[cfg(feature = "defmt")]
    defmt::debug!(
        "Calibrating offset over {} samples, {} us apart",
        config.samples,
        config.interval_us
    );

    // 4095 * u32::MAX fits comfortably
    let mut sum: u64 = 0;
    for _ in 0..config.samples {
        let raw = source.read_raw().map_err(Error::Communication)?;
        if raw > RAW_MAX {
            #[cfg(feature = "defmt")]
            defmt::warn!("Calibration aborted, sample out of range: {}", raw);
            return Err(Error::OutOfRangeSample(raw));
        }
        sum += u64::from(raw);
        delay.delay_us(config.interval_us);
    }

    let offset = sum / u64::from(config.samples);

    #[cfg(feature = "defmt")]
    defmt::debug!("Calibrated offset: {}", offset);

    // mean of values <= RAW_MAX
    #[allow(clippy::cast_possible_truncation)]
    Ok(offset as u16)
}
