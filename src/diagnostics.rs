//! Magnet diagnostics for AS5600

use crate::register::StatusRegister;

/// Snapshot of the `STATUS`, `AGC` and `MAGNITUDE` registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Diagnostics {
    status: u8,
    agc: u8,
    magnitude: u16,
}

impl Diagnostics {
    /// Create diagnostics from raw register values
    #[must_use]
    pub const fn new(status: u8, agc: u8, magnitude: u16) -> Self {
        Self {
            status,
            agc,
            magnitude,
        }
    }

    /// Decoded `STATUS` register
    #[must_use]
    pub fn status(&self) -> StatusRegister {
        StatusRegister(self.status)
    }

    /// MD: a magnet is present
    #[must_use]
    pub fn magnet_detected(&self) -> bool {
        self.status().md()
    }

    /// MH: magnetic field too strong
    ///
    /// The AGC has hit its minimum gain. Readings may still be usable but
    /// accuracy is degraded
    #[must_use]
    pub fn magnet_too_strong(&self) -> bool {
        self.status().mh()
    }

    /// ML: magnetic field too weak
    ///
    /// The AGC has hit its maximum gain. Readings may still be usable but
    /// accuracy is degraded
    #[must_use]
    pub fn magnet_too_weak(&self) -> bool {
        self.status().ml()
    }

    /// Get the Automatic Gain Control (AGC) value
    ///
    /// Range is 0-255 at 5 V supply and 0-128 at 3.3 V. Lower values mean
    /// a stronger field; aim for the middle of the range.
    #[must_use]
    pub const fn agc_value(&self) -> u8 {
        self.agc
    }

    /// CORDIC magnitude (12-bit)
    #[must_use]
    pub const fn magnitude(&self) -> u16 {
        self.magnitude
    }

    /// Check if data is valid
    ///
    /// Returns `true` if a magnet is detected and the field is within range
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.status().is_valid()
    }
}
