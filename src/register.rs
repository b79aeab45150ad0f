//! Register addresses and layouts for the AS5600 sensor.

/// Register addresses for AS5600
///
/// Multi-byte values are big endian and read starting at the high
/// register; the address pointer auto-increments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
#[repr(u8)]
pub enum Register {
    /// Number of times ZPOS and MPOS have been permanently written
    Zmco = 0x00,
    /// Zero position, bits 11:8
    ZPosH = 0x01,
    /// Zero position, bits 7:0
    ZPosL = 0x02,
    /// Maximum position, bits 11:8
    MPosH = 0x03,
    /// Maximum position, bits 7:0
    MPosL = 0x04,
    /// Maximum angle, bits 11:8
    MAngH = 0x05,
    /// Maximum angle, bits 7:0
    MAngL = 0x06,
    /// Configuration, watchdog and filter bits
    ConfH = 0x07,
    /// Configuration, output and power bits
    ConfL = 0x08,

    /// Magnet status
    Status = 0x0B,
    /// Unscaled, unmodified angle, bits 11:8
    RawAngleH = 0x0C,
    /// Unscaled, unmodified angle, bits 7:0
    RawAngleL = 0x0D,
    /// Scaled output angle, bits 11:8
    AngleH = 0x0E,
    /// Scaled output angle, bits 7:0
    AngleL = 0x0F,

    /// Automatic gain control
    Agc = 0x1A,
    /// CORDIC magnitude, bits 11:8
    MagnitudeH = 0x1B,
    /// CORDIC magnitude, bits 7:0
    MagnitudeL = 0x1C,

    /// Permanent programming commands
    Burn = 0xFF,
}

impl From<Register> for u8 {
    fn from(reg: Register) -> u8 {
        reg as u8
    }
}

/// Commands accepted by the BURN register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum BurnCommand {
    /// Permanently store ZPOS and MPOS
    Angle = 0x80,
    /// Permanently store MANG and CONF
    Setting = 0x40,
}

impl From<BurnCommand> for u8 {
    fn from(cmd: BurnCommand) -> u8 {
        cmd as u8
    }
}

/// Bytes written one at a time to BURN to reload the OTP content into the
/// registers after a burn, so the stored values can be read back
pub const OTP_LOAD_SEQUENCE: [u8; 3] = [0x01, 0x11, 0x10];

bitfield::bitfield! {
    /// STATUS
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct StatusRegister(u8);
    impl Debug;
    /// Magnet was detected
    pub md, _: 5;
    /// AGC maximum gain overflow, magnet too weak
    pub ml, _: 4;
    /// AGC minimum gain overflow, magnet too strong
    pub mh, _: 3;
}

impl StatusRegister {
    /// Check if the magnetic field strength is within acceptable range
    #[must_use]
    #[inline(always)]
    pub fn magnetic_field_ok(&self) -> bool {
        !self.mh() && !self.ml()
    }

    /// Check if angle data can be trusted
    #[must_use]
    #[inline(always)]
    pub fn is_valid(&self) -> bool {
        self.md() && self.magnetic_field_ok()
    }
}

bitfield::bitfield! {
    /// CONF, read and written as CONF high (0x07) followed by CONF low (0x08)
    #[derive(Clone, Copy, PartialEq, Eq, Default)]
    pub struct ConfRegister(u16);
    impl Debug;
    u8;
    /// Watchdog
    pub wd, set_wd: 13;
    /// Fast filter threshold
    pub fth, set_fth: 12, 10;
    /// Slow filter
    pub sf, set_sf: 9, 8;
    /// PWM frequency
    pub pwmf, set_pwmf: 7, 6;
    /// Output stage
    pub outs, set_outs: 5, 4;
    /// Hysteresis
    pub hyst, set_hyst: 3, 2;
    /// Power mode
    pub pm, set_pm: 1, 0;
}

impl ConfRegister {
    /// Replace the power mode
    #[must_use]
    pub fn with_power_mode(mut self, mode: PowerMode) -> Self {
        self.set_pm(mode.into());
        self
    }

    /// Replace the hysteresis
    #[must_use]
    pub fn with_hysteresis(mut self, hysteresis: Hysteresis) -> Self {
        self.set_hyst(hysteresis.into());
        self
    }

    /// Replace the output stage
    #[must_use]
    pub fn with_output_stage(mut self, stage: OutputStage) -> Self {
        self.set_outs(stage.into());
        self
    }

    /// Replace the PWM frequency
    #[must_use]
    pub fn with_pwm_frequency(mut self, frequency: PwmFrequency) -> Self {
        self.set_pwmf(frequency.into());
        self
    }

    /// Replace both filter settings
    #[must_use]
    pub fn with_filter(mut self, slow: SlowFilter, fast: FastFilterThreshold) -> Self {
        self.set_sf(slow.into());
        self.set_fth(fast.into());
        self
    }

    /// Enable or disable the watchdog
    #[must_use]
    pub fn with_watchdog(mut self, enabled: bool) -> Self {
        self.set_wd(enabled);
        self
    }

    /// Value of the CONF high register
    #[must_use]
    pub fn high(&self) -> u8 {
        self.0.to_be_bytes()[0]
    }

    /// Value of the CONF low register
    #[must_use]
    pub fn low(&self) -> u8 {
        self.0.to_be_bytes()[1]
    }
}

/// Filter bits of CONF high, watchdog excluded
pub(crate) const FILTER_MASK: u8 = 0b1_1111;

/// Filter-mode byte as laid out in CONF high (watchdog cleared)
#[must_use]
pub fn filter_mode(slow: SlowFilter, fast: FastFilterThreshold) -> u8 {
    ConfRegister::default().with_filter(slow, fast).high()
}

macro_rules! conf_field {
    ($(#[$meta:meta])* $name:ident { $($(#[$vmeta:meta])* $variant:ident = $value:literal,)+ }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
        #[cfg_attr(feature = "defmt", derive(defmt::Format))]
        #[repr(u8)]
        pub enum $name {
            $($(#[$vmeta])* $variant = $value,)+
        }

        impl From<$name> for u8 {
            fn from(value: $name) -> u8 {
                value as u8
            }
        }
    };
}

conf_field! {
    /// Power mode (PM)
    PowerMode {
        /// Always on
        #[default]
        Nominal = 0b00,
        /// 5 ms polling
        LowPower1 = 0b01,
        /// 20 ms polling
        LowPower2 = 0b10,
        /// 100 ms polling
        LowPower3 = 0b11,
    }
}

conf_field! {
    /// Output hysteresis (HYST)
    Hysteresis {
        #[default]
        Off = 0b00,
        Lsb1 = 0b01,
        Lsb2 = 0b10,
        Lsb3 = 0b11,
    }
}

conf_field! {
    /// Output stage (OUTS)
    OutputStage {
        /// Analog, 0% to 100% of supply
        #[default]
        AnalogFullRange = 0b00,
        /// Analog, 10% to 90% of supply
        AnalogReducedRange = 0b01,
        /// Digital PWM
        DigitalPwm = 0b10,
    }
}

conf_field! {
    /// PWM output frequency (PWMF)
    PwmFrequency {
        #[default]
        Hz115 = 0b00,
        Hz230 = 0b01,
        Hz460 = 0b10,
        Hz920 = 0b11,
    }
}

conf_field! {
    /// Slow filter step response delay (SF)
    SlowFilter {
        #[default]
        X16 = 0b00,
        X8 = 0b01,
        X4 = 0b10,
        X2 = 0b11,
    }
}

conf_field! {
    /// Fast filter threshold (FTH)
    FastFilterThreshold {
        /// Fast filter disabled
        #[default]
        SlowFilterOnly = 0b000,
        Lsb6 = 0b001,
        Lsb7 = 0b010,
        Lsb9 = 0b011,
        Lsb18 = 0b100,
        Lsb21 = 0b101,
        Lsb24 = 0b110,
        Lsb10 = 0b111,
    }
}
