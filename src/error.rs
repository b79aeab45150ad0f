use core::convert::Infallible;

/// Error type for AS5600 and position tracking operations
///
/// `E` is the bus error. Operations that never touch the bus use the
/// default, [`Infallible`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E = Infallible> {
    /// Communication error with the sensor, including bus timeouts
    Communication(E),
    /// An argument was rejected before any bus access
    InvalidArgument,
    /// A raw angle above 4095 was supplied
    OutOfRangeSample(u16),
    /// No magnet detected, burning would store a meaningless position
    MagnetNotDetected,
    /// All permanent angle writes have been used
    BurnLimitReached,
}
