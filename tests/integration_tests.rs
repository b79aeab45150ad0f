//! Integration tests for the AS5600 driver using mocked I2C.

use as5600_tracker::{
    As5600, CalibrationConfig, ConfRegister, Error, FastFilterThreshold, Hysteresis, OutputStage,
    PositionTracker, PowerMode, PwmFrequency, RawAngleSource, SlowFilter, filter_mode,
};
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};
use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};

const ADDR: u8 = 0x36;

/// Helper for a register read starting at `register`.
fn read(register: u8, response: &[u8]) -> I2cTransaction {
    I2cTransaction::write_read(ADDR, vec![register], response.to_vec())
}

/// Helper for a single-byte register write.
fn write(register: u8, value: u8) -> I2cTransaction {
    I2cTransaction::write(ADDR, vec![register, value])
}

struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

#[test]
fn reads_raw_angle_register() {
    let expectations = [read(0x0C, &[0x0A, 0xBC])];

    let mut sensor = As5600::new(I2cMock::new(&expectations));

    assert_eq!(sensor.raw_angle().unwrap(), 0x0ABC);

    sensor.release().done();
}

#[test]
fn reads_scaled_angle_register() {
    let expectations = [read(0x0E, &[0x08, 0x00])];

    let mut sensor = As5600::new(I2cMock::new(&expectations));

    assert_eq!(sensor.angle().unwrap(), 0x0800);

    sensor.release().done();
}

#[test]
fn converts_raw_angle_to_degrees() {
    let expectations = [read(0x0C, &[0x04, 0x00])];

    let mut sensor = As5600::new(I2cMock::new(&expectations));

    assert_eq!(sensor.raw_angle_degrees().unwrap(), 90.0);

    sensor.release().done();
}

#[test]
fn rejects_raw_angle_wider_than_12_bits() {
    let expectations = [read(0x0C, &[0x10, 0x00])];

    let mut sensor = As5600::new(I2cMock::new(&expectations));

    assert_eq!(sensor.raw_angle(), Err(Error::OutOfRangeSample(0x1000)));

    sensor.release().done();
}

#[test]
fn propagates_bus_errors() {
    let expectations = [read(0x0C, &[0x00, 0x00]).with_error(ErrorKind::Other)];

    let mut sensor = As5600::new(I2cMock::new(&expectations));

    assert_eq!(
        sensor.raw_angle(),
        Err(Error::Communication(ErrorKind::Other))
    );

    sensor.release().done();
}

#[test]
fn uses_custom_address() {
    let expectations = [I2cTransaction::write_read(0x40, vec![0x0C], vec![0x00, 0x01])];

    let mut sensor = As5600::with_address(I2cMock::new(&expectations), 0x40);

    assert_eq!(sensor.address(), 0x40);
    assert_eq!(sensor.raw_angle().unwrap(), 1);

    sensor.release().done();
}

#[test]
fn reports_connection_state() {
    let expectations = [
        I2cTransaction::write(ADDR, vec![]),
        I2cTransaction::write(ADDR, vec![])
            .with_error(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)),
        I2cTransaction::write(ADDR, vec![]).with_error(ErrorKind::Bus),
    ];

    let mut sensor = As5600::new(I2cMock::new(&expectations));

    assert_eq!(sensor.is_connected(), Ok(true));
    assert_eq!(sensor.is_connected(), Ok(false));
    assert_eq!(
        sensor.is_connected(),
        Err(Error::Communication(ErrorKind::Bus))
    );

    sensor.release().done();
}

#[test]
fn writes_zero_position_msb_first() {
    let expectations = [write(0x01, 0x0A), write(0x02, 0xBC)];

    let mut sensor = As5600::new(I2cMock::new(&expectations));

    sensor.set_zero_position(0x0ABC).unwrap();

    sensor.release().done();
}

#[test]
fn writes_max_position_and_angle() {
    let expectations = [
        write(0x03, 0x0F),
        write(0x04, 0xFF),
        write(0x05, 0x04),
        write(0x06, 0x00),
    ];

    let mut sensor = As5600::new(I2cMock::new(&expectations));

    sensor.set_max_position(0x0FFF).unwrap();
    sensor.set_max_angle(0x0400).unwrap();

    sensor.release().done();
}

#[test]
fn rejects_positions_wider_than_12_bits_without_bus_access() {
    let mut sensor = As5600::new(I2cMock::new(&[]));

    assert_eq!(sensor.set_zero_position(0x1000), Err(Error::InvalidArgument));
    assert_eq!(sensor.set_max_position(0xFFFF), Err(Error::InvalidArgument));
    assert_eq!(sensor.set_max_angle(4096), Err(Error::InvalidArgument));

    sensor.release().done();
}

#[test]
fn reads_programmed_positions() {
    let expectations = [
        read(0x01, &[0x01, 0x23]),
        read(0x03, &[0x0E, 0x00]),
        read(0x05, &[0x08, 0x00]),
    ];

    let mut sensor = As5600::new(I2cMock::new(&expectations));

    assert_eq!(sensor.zero_position().unwrap(), 0x0123);
    assert_eq!(sensor.max_position().unwrap(), 0x0E00);
    assert_eq!(sensor.max_angle().unwrap(), 0x0800);

    sensor.release().done();
}

#[test]
fn rejects_programmed_positions_wider_than_12_bits() {
    let expectations = [
        read(0x01, &[0x10, 0x00]),
        read(0x03, &[0xFF, 0xFF]),
        read(0x05, &[0x20, 0x01]),
    ];

    let mut sensor = As5600::new(I2cMock::new(&expectations));

    assert_eq!(sensor.zero_position(), Err(Error::OutOfRangeSample(0x1000)));
    assert_eq!(sensor.max_position(), Err(Error::OutOfRangeSample(0xFFFF)));
    assert_eq!(sensor.max_angle(), Err(Error::OutOfRangeSample(0x2001)));

    sensor.release().done();
}

#[test]
fn reads_configuration() {
    let expectations = [read(0x07, &[0x3F, 0xE9])];

    let mut sensor = As5600::new(I2cMock::new(&expectations));

    let conf = sensor.configuration().unwrap();
    assert!(conf.wd());
    assert_eq!(conf.fth(), 0b111);
    assert_eq!(conf.sf(), 0b11);
    assert_eq!(conf.pwmf(), 0b11);
    assert_eq!(conf.outs(), 0b10);
    assert_eq!(conf.hyst(), 0b10);
    assert_eq!(conf.pm(), 0b01);

    sensor.release().done();
}

#[test]
fn writes_configuration_in_one_transfer() {
    let conf = ConfRegister::default()
        .with_power_mode(PowerMode::LowPower1)
        .with_hysteresis(Hysteresis::Lsb2)
        .with_output_stage(OutputStage::DigitalPwm)
        .with_pwm_frequency(PwmFrequency::Hz920)
        .with_filter(SlowFilter::X2, FastFilterThreshold::Lsb10)
        .with_watchdog(true);
    assert_eq!(conf.high(), 0x3F);
    assert_eq!(conf.low(), 0xE9);

    let expectations = [I2cTransaction::write(ADDR, vec![0x07, 0x3F, 0xE9])];

    let mut sensor = As5600::new(I2cMock::new(&expectations));

    sensor.set_configuration(conf).unwrap();

    sensor.release().done();
}

#[test]
fn filter_mode_byte_matches_conf_high_layout() {
    assert_eq!(filter_mode(SlowFilter::X8, FastFilterThreshold::SlowFilterOnly), 0x01);
    assert_eq!(filter_mode(SlowFilter::X16, FastFilterThreshold::Lsb6), 0b0_0100);
    assert_eq!(filter_mode(SlowFilter::X2, FastFilterThreshold::Lsb10), 0b1_1111);
}

#[test]
fn set_filter_keeps_watchdog_bit() {
    let expectations = [read(0x07, &[0b0011_1110]), write(0x07, 0b0010_0001)];

    let mut sensor = As5600::new(I2cMock::new(&expectations));

    sensor
        .set_filter(SlowFilter::X8, FastFilterThreshold::SlowFilterOnly)
        .unwrap();

    sensor.release().done();
}

#[test]
fn reads_status_register() {
    let expectations = [read(0x0B, &[0x28])];

    let mut sensor = As5600::new(I2cMock::new(&expectations));

    let status = sensor.status().unwrap();
    assert!(status.md());
    assert!(status.mh());
    assert!(!status.ml());
    assert!(!status.magnetic_field_ok());
    assert!(!status.is_valid());

    sensor.release().done();
}

#[test]
fn reads_diagnostics() {
    let expectations = [
        read(0x0B, &[0x20]),
        read(0x1A, &[0x40]),
        read(0x1B, &[0x05, 0xDC]),
    ];

    let mut sensor = As5600::new(I2cMock::new(&expectations));

    let diag = sensor.diagnostics().unwrap();
    assert!(diag.magnet_detected());
    assert!(!diag.magnet_too_strong());
    assert!(!diag.magnet_too_weak());
    assert_eq!(diag.agc_value(), 0x40);
    assert_eq!(diag.magnitude(), 0x05DC);
    assert!(diag.is_valid());

    sensor.release().done();
}

#[test]
fn reports_missing_magnet_in_diagnostics() {
    let expectations = [
        read(0x0B, &[0x00]),
        read(0x1A, &[0xFF]),
        read(0x1B, &[0x00, 0x00]),
    ];

    let mut sensor = As5600::new(I2cMock::new(&expectations));

    let diag = sensor.diagnostics().unwrap();
    assert!(!diag.magnet_detected());
    assert!(!diag.is_valid());

    sensor.release().done();
}

#[test]
fn burns_angle_when_allowed() {
    let expectations = [read(0x00, &[0x01]), read(0x0B, &[0x20]), write(0xFF, 0x80)];

    let mut sensor = As5600::new(I2cMock::new(&expectations));

    sensor.burn_angle().unwrap();

    sensor.release().done();
}

#[test]
fn refuses_angle_burn_when_limit_reached() {
    let expectations = [read(0x00, &[0x03])];

    let mut sensor = As5600::new(I2cMock::new(&expectations));

    assert_eq!(sensor.burn_angle(), Err(Error::BurnLimitReached));

    sensor.release().done();
}

#[test]
fn refuses_burn_without_magnet() {
    let expectations = [read(0x00, &[0x00]), read(0x0B, &[0x00]), read(0x0B, &[0x10])];

    let mut sensor = As5600::new(I2cMock::new(&expectations));

    assert_eq!(sensor.burn_angle(), Err(Error::MagnetNotDetected));
    assert_eq!(sensor.burn_setting(), Err(Error::MagnetNotDetected));

    sensor.release().done();
}

#[test]
fn burns_setting() {
    let expectations = [read(0x0B, &[0x20]), write(0xFF, 0x40)];

    let mut sensor = As5600::new(I2cMock::new(&expectations));

    sensor.burn_setting().unwrap();

    sensor.release().done();
}

#[test]
fn loads_otp_with_fixed_sequence() {
    let expectations = [write(0xFF, 0x01), write(0xFF, 0x11), write(0xFF, 0x10)];

    let mut sensor = As5600::new(I2cMock::new(&expectations));

    sensor.load_otp().unwrap();

    sensor.release().done();
}

#[test]
fn reads_burn_count() {
    let expectations = [read(0x00, &[0xFE])];

    let mut sensor = As5600::new(I2cMock::new(&expectations));

    assert_eq!(sensor.burn_count().unwrap(), 0b10);

    sensor.release().done();
}

#[test]
fn raw_angle_source_does_not_mask() {
    let expectations = [read(0x0C, &[0xF0, 0x01])];

    let mut sensor = As5600::new(I2cMock::new(&expectations));

    assert_eq!(sensor.read_raw(), Ok(0xF001));

    sensor.release().done();
}

#[test]
fn tracks_position_through_driver() {
    let mut expectations: Vec<_> = (0..4).map(|_| read(0x0C, &[0x01, 0x00])).collect();
    expectations.extend([
        read(0x0C, &[0x01, 0x00]),
        read(0x0C, &[0x00, 0x00]),
        read(0x0C, &[0x01, 0x00]),
    ]);

    let mut sensor = As5600::new(I2cMock::new(&expectations));
    let mut tracker = PositionTracker::new();

    let offset = tracker
        .calibrate(&mut sensor, &mut NoDelay, CalibrationConfig::new(4, 1000))
        .unwrap();
    assert_eq!(offset, 0x100);

    assert_eq!(tracker.update(&mut sensor).unwrap(), 0.0);
    // raw 0 sits 256 counts behind the zero: 337.5° one turn down
    assert_eq!(tracker.update(&mut sensor).unwrap(), -22.5);
    assert_eq!(tracker.turn_count(), -1);
    assert_eq!(tracker.update(&mut sensor).unwrap(), 0.0);
    assert_eq!(tracker.turn_count(), 0);

    sensor.release().done();
}

#[test]
fn failed_calibration_keeps_previous_offset() {
    let expectations = [
        read(0x0C, &[0x02, 0x00]),
        read(0x0C, &[0x00, 0x00]).with_error(ErrorKind::ArbitrationLoss),
    ];

    let mut sensor = As5600::new(I2cMock::new(&expectations));
    let mut tracker = PositionTracker::with_offset(100).unwrap();

    assert_eq!(
        tracker.calibrate(&mut sensor, &mut NoDelay, CalibrationConfig::new(10, 1000)),
        Err(Error::Communication(ErrorKind::ArbitrationLoss))
    );
    assert_eq!(tracker.offset(), 100);

    sensor.release().done();
}
