//! Blocking driver for the AS5600 magnetic position sensor

use embedded_hal::i2c::{Error as I2cError, ErrorKind, I2c};

use crate::{
    diagnostics::Diagnostics,
    error::Error,
    register::{
        self, BurnCommand, ConfRegister, FastFilterThreshold, OTP_LOAD_SEQUENCE, Register,
        SlowFilter, StatusRegister,
    },
    source::RawAngleSource,
    units::{self, RAW_MAX},
};

/// Fixed 7-bit I2C address of the AS5600
pub const DEFAULT_ADDRESS: u8 = 0x36;

/// ZPOS/MPOS can be burned at most this many times
pub const MAX_ANGLE_BURNS: u8 = 3;

const ZMCO_MASK: u8 = 0b11;

/// AS5600 driver instance
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct As5600<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C, E> As5600<I2C>
where
    I2C: I2c<Error = E>,
{
    /// Create a new AS5600 driver instance at [`DEFAULT_ADDRESS`]
    pub fn new(i2c: I2C) -> Self {
        Self::with_address(i2c, DEFAULT_ADDRESS)
    }

    /// Create a driver for a sensor behind an address translator
    pub fn with_address(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Release the I2C bus, consuming the driver
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// 7-bit I2C address this driver talks to
    #[must_use]
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Read `N` consecutive registers starting at `register`
    fn read_bytes<const N: usize>(&mut self, register: Register) -> Result<[u8; N], E> {
        let mut buf = [0u8; N];
        self.i2c
            .write_read(self.address, &[u8::from(register)], &mut buf)?;

        #[cfg(feature = "defmt")]
        defmt::trace!("Read register 0x{:02X}: {=[u8]}", u8::from(register), &buf[..]);

        Ok(buf)
    }

    fn read_u8(&mut self, register: Register) -> Result<u8, Error<E>> {
        let [value] = self
            .read_bytes::<1>(register)
            .map_err(Error::Communication)?;
        Ok(value)
    }

    fn read_u16(&mut self, register: Register) -> Result<u16, Error<E>> {
        self.read_bytes(register)
            .map(u16::from_be_bytes)
            .map_err(Error::Communication)
    }

    /// Read a 12-bit value, rejecting anything wider
    fn read_u12(&mut self, register: Register) -> Result<u16, Error<E>> {
        let value = self.read_u16(register)?;
        if value > RAW_MAX {
            #[cfg(feature = "defmt")]
            defmt::warn!(
                "Register 0x{:02X} out of range: 0x{:04X}",
                u8::from(register),
                value
            );
            return Err(Error::OutOfRangeSample(value));
        }
        Ok(value)
    }

    fn write_u8(&mut self, register: Register, value: u8) -> Result<(), Error<E>> {
        #[cfg(feature = "defmt")]
        defmt::debug!("Writing 0x{:02X} to register 0x{:02X}", value, u8::from(register));

        self.i2c
            .write(self.address, &[u8::from(register), value])
            .map_err(Error::Communication)
    }

    /// Write a 12-bit value as two single-byte writes, MSB first
    fn write_u12(&mut self, high: Register, low: Register, value: u16) -> Result<(), Error<E>> {
        if value > RAW_MAX {
            return Err(Error::InvalidArgument);
        }
        let [msb, lsb] = value.to_be_bytes();
        self.write_u8(high, msb)?;
        self.write_u8(low, lsb)
    }

    fn modify_u8<R>(
        &mut self,
        register: Register,
        f: impl FnOnce(&mut u8) -> R,
    ) -> Result<R, Error<E>> {
        let mut data = self.read_u8(register)?;

        let result = f(&mut data);

        self.write_u8(register, data)?;

        Ok(result)
    }

    /// Check whether the sensor acknowledges its address
    ///
    /// Returns `Ok(false)` if nothing acknowledges the address.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus fails for any other reason
    pub fn is_connected(&mut self) -> Result<bool, Error<E>>
    where
        E: I2cError,
    {
        match self.i2c.write(self.address, &[]) {
            Ok(()) => Ok(true),
            Err(e) if matches!(e.kind(), ErrorKind::NoAcknowledge(_)) => Ok(false),
            Err(e) => Err(Error::Communication(e)),
        }
    }

    /// Get the unscaled 12-bit angular position
    ///
    /// Value ranges from 0 to 4095 (0° to 359.912°), ignoring ZPOS, MPOS
    /// and MANG. Use [`units::ANGLE_MAX`] for conversion calculations
    ///
    /// # Errors
    ///
    /// Returns an error if I2C communication fails or the value exceeds 12 bits
    pub fn raw_angle(&mut self) -> Result<u16, Error<E>> {
        self.read_u12(Register::RawAngleH)
    }

    /// Get the 12-bit angle scaled to the programmed ZPOS..MPOS range
    ///
    /// # Errors
    ///
    /// Returns an error if I2C communication fails or the value exceeds 12 bits
    pub fn angle(&mut self) -> Result<u16, Error<E>> {
        self.read_u12(Register::AngleH)
    }

    /// Get the raw angular position in degrees
    ///
    /// # Errors
    ///
    /// Returns an error if I2C communication fails or the value exceeds 12 bits
    pub fn raw_angle_degrees(&mut self) -> Result<f32, Error<E>> {
        self.raw_angle().map(units::raw_to_degrees)
    }

    /// Get the start position (ZPOS) in raw counts
    ///
    /// # Errors
    ///
    /// Returns an error if I2C communication fails or the value exceeds 12 bits
    pub fn zero_position(&mut self) -> Result<u16, Error<E>> {
        self.read_u12(Register::ZPosH)
    }

    /// Set the start position (ZPOS) in raw counts
    ///
    /// This is volatile until [`Self::burn_angle`] is issued.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if `value` exceeds 12 bits; nothing is
    ///   written
    /// - [`Error::Communication`] if I2C communication fails
    pub fn set_zero_position(&mut self, value: u16) -> Result<(), Error<E>> {
        self.write_u12(Register::ZPosH, Register::ZPosL, value)
    }

    /// Get the stop position (MPOS) in raw counts
    ///
    /// # Errors
    ///
    /// Returns an error if I2C communication fails or the value exceeds 12 bits
    pub fn max_position(&mut self) -> Result<u16, Error<E>> {
        self.read_u12(Register::MPosH)
    }

    /// Set the stop position (MPOS) in raw counts
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if `value` exceeds 12 bits; nothing is
    ///   written
    /// - [`Error::Communication`] if I2C communication fails
    pub fn set_max_position(&mut self, value: u16) -> Result<(), Error<E>> {
        self.write_u12(Register::MPosH, Register::MPosL, value)
    }

    /// Get the angular range (MANG) in raw counts
    ///
    /// # Errors
    ///
    /// Returns an error if I2C communication fails or the value exceeds 12 bits
    pub fn max_angle(&mut self) -> Result<u16, Error<E>> {
        self.read_u12(Register::MAngH)
    }

    /// Set the angular range (MANG) in raw counts
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if `value` exceeds 12 bits; nothing is
    ///   written
    /// - [`Error::Communication`] if I2C communication fails
    pub fn set_max_angle(&mut self, value: u16) -> Result<(), Error<E>> {
        self.write_u12(Register::MAngH, Register::MAngL, value)
    }

    /// Read CONF
    ///
    /// # Errors
    ///
    /// Returns an error if I2C communication fails
    pub fn configuration(&mut self) -> Result<ConfRegister, Error<E>> {
        self.read_u16(Register::ConfH).map(ConfRegister)
    }

    /// Write CONF high and low in one transfer
    ///
    /// # Errors
    ///
    /// Returns an error if I2C communication fails
    pub fn set_configuration(&mut self, conf: ConfRegister) -> Result<(), Error<E>> {
        #[cfg(feature = "defmt")]
        defmt::debug!("Writing configuration 0x{:04X}", conf.0);

        self.i2c
            .write(
                self.address,
                &[u8::from(Register::ConfH), conf.high(), conf.low()],
            )
            .map_err(Error::Communication)
    }

    /// Replace the filter-mode bits of CONF high, keeping the watchdog bit
    ///
    /// # Errors
    ///
    /// Returns an error if I2C communication fails
    pub fn set_filter(
        &mut self,
        slow: SlowFilter,
        fast: FastFilterThreshold,
    ) -> Result<(), Error<E>> {
        let mode = register::filter_mode(slow, fast);
        self.modify_u8(Register::ConfH, |v: &mut u8| {
            *v = (*v & !register::FILTER_MASK) | mode;
        })
    }

    /// Read the magnet status
    ///
    /// # Errors
    ///
    /// Returns an error if I2C communication fails
    pub fn status(&mut self) -> Result<StatusRegister, Error<E>> {
        self.read_u8(Register::Status).map(StatusRegister)
    }

    /// # Errors
    ///
    /// Returns an error if I2C communication fails
    pub fn agc(&mut self) -> Result<u8, Error<E>> {
        self.read_u8(Register::Agc)
    }

    /// Get the 12-bit CORDIC magnitude
    ///
    /// # Errors
    ///
    /// Returns an error if I2C communication fails
    pub fn magnitude(&mut self) -> Result<u16, Error<E>> {
        self.read_u16(Register::MagnitudeH)
            .map(|magnitude| magnitude & RAW_MAX)
    }

    /// Get status, AGC and magnitude in one snapshot
    ///
    /// # Errors
    ///
    /// Returns an error if I2C communication fails
    pub fn diagnostics(&mut self) -> Result<Diagnostics, Error<E>> {
        let status = self.read_u8(Register::Status)?;
        let agc = self.agc()?;
        let magnitude = self.magnitude()?;
        Ok(Diagnostics::new(status, agc, magnitude))
    }

    /// Number of times ZPOS and MPOS have been burned (0-3)
    ///
    /// # Errors
    ///
    /// Returns an error if I2C communication fails
    pub fn burn_count(&mut self) -> Result<u8, Error<E>> {
        self.read_u8(Register::Zmco).map(|zmco| zmco & ZMCO_MASK)
    }

    /// Permanently store ZPOS and MPOS
    ///
    /// Irreversible, and possible only [`MAX_ANGLE_BURNS`] times per device.
    ///
    /// # Errors
    ///
    /// - [`Error::BurnLimitReached`] if ZMCO shows no burns left
    /// - [`Error::MagnetNotDetected`] if STATUS has MD cleared
    /// - [`Error::Communication`] if I2C communication fails
    pub fn burn_angle(&mut self) -> Result<(), Error<E>> {
        if self.burn_count()? >= MAX_ANGLE_BURNS {
            #[cfg(feature = "defmt")]
            defmt::warn!("Angle burn refused, no burns left");
            return Err(Error::BurnLimitReached);
        }
        self.burn(BurnCommand::Angle)
    }

    /// Permanently store MANG and CONF
    ///
    /// Irreversible, and possible only once per device.
    ///
    /// # Errors
    ///
    /// - [`Error::MagnetNotDetected`] if STATUS has MD cleared
    /// - [`Error::Communication`] if I2C communication fails
    pub fn burn_setting(&mut self) -> Result<(), Error<E>> {
        self.burn(BurnCommand::Setting)
    }

    fn burn(&mut self, command: BurnCommand) -> Result<(), Error<E>> {
        if !self.status()?.md() {
            #[cfg(feature = "defmt")]
            defmt::warn!("Burn refused, no magnet detected");
            return Err(Error::MagnetNotDetected);
        }
        self.write_u8(Register::Burn, command.into())
    }

    /// Reload the OTP content into the registers
    ///
    /// Issue after a burn, then read ZPOS/MPOS/CONF back to verify it.
    ///
    /// # Errors
    ///
    /// Returns an error if I2C communication fails; the sequence is not
    /// resumed
    pub fn load_otp(&mut self) -> Result<(), Error<E>> {
        for byte in OTP_LOAD_SEQUENCE {
            self.write_u8(Register::Burn, byte)?;
        }
        Ok(())
    }
}

impl<I2C, E> RawAngleSource for As5600<I2C>
where
    I2C: I2c<Error = E>,
{
    type Error = E;

    fn read_raw(&mut self) -> Result<u16, E> {
        self.read_bytes(Register::RawAngleH).map(u16::from_be_bytes)
    }
}
