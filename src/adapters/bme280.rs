//! BME280 sensor adapter
//!
//! This adapter implements the SensorPort trait for the Bosch BME280
//! combined temperature/humidity/pressure sensor. Each sample triggers a
//! forced-mode conversion, so the sensor sleeps between readings.

use std::thread;
use std::time::Duration;

use chrono::{DateTime, Local};
use log::debug;

use crate::domain::calibration::{H_BLOCK_LEN, TP_BLOCK_LEN};
use crate::domain::{Bme280Calibration, RawSample, Reading};
use crate::ports::bus::RegisterBus;
use crate::ports::sensor::{SensorError, SensorPort};

/// Default I2C address (SDO pulled low)
pub const DEFAULT_ADDRESS: u8 = 0x76;

/// Value of the chip id register on a BME280
pub const CHIP_ID: u8 = 0x60;

const REG_CALIB_TP: u8 = 0x88;
const REG_CALIB_H1: u8 = 0xA1;
const REG_CHIP_ID: u8 = 0xD0;
const REG_CALIB_H: u8 = 0xE1;
const REG_CTRL_HUM: u8 = 0xF2;
const REG_STATUS: u8 = 0xF3;
const REG_CTRL_MEAS: u8 = 0xF4;
const REG_DATA: u8 = 0xF7;

const MODE_FORCED: u8 = 0b01;
const STATUS_MEASURING: u8 = 1 << 3;

/// Oversampling setting of one measurement channel
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Oversampling {
    X1 = 1,
    X2 = 2,
    X4 = 3,
    X8 = 4,
    X16 = 5,
}

impl Oversampling {
    /// Register field value
    const fn bits(self) -> u8 {
        self as u8
    }

    /// Number of ADC conversions per sample
    const fn factor(self) -> u32 {
        1 << (self as u32 - 1)
    }
}

/// Measurement settings for the BME280
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bme280Settings {
    pub temperature: Oversampling,
    pub pressure: Oversampling,
    pub humidity: Oversampling,
    /// How long to wait between triggering a conversion and reading it
    pub measurement_delay: Duration,
}

impl Bme280Settings {
    /// Oversampling x1 on every channel, the lowest-power weather preset
    pub const fn weather_monitoring() -> Self {
        let (t, p, h) = (Oversampling::X1, Oversampling::X1, Oversampling::X1);
        Self {
            temperature: t,
            pressure: p,
            humidity: h,
            measurement_delay: max_measurement_time(t, p, h),
        }
    }

    fn ctrl_meas(&self) -> u8 {
        (self.temperature.bits() << 5) | (self.pressure.bits() << 2) | MODE_FORCED
    }
}

impl Default for Bme280Settings {
    fn default() -> Self {
        Self::weather_monitoring()
    }
}

/// Datasheet maximum conversion time for the given oversampling, rounded up
/// to whole microseconds
pub const fn max_measurement_time(t: Oversampling, p: Oversampling, h: Oversampling) -> Duration {
    // 1.25 ms + 2.3 ms * osrs_t + (2.3 ms * osrs_p + 0.575 ms) + (2.3 ms * osrs_h + 0.575 ms)
    let micros = 1250 + 2300 * t.factor() + 2300 * p.factor() + 575 + 2300 * h.factor() + 575;
    Duration::from_micros(micros as u64)
}

/// BME280 adapter over any register bus
pub struct Bme280Sensor<B: RegisterBus> {
    bus: B,
    address: u8,
    settings: Bme280Settings,
}

impl<B: RegisterBus> Bme280Sensor<B> {
    /// Create a new BME280 adapter with default settings
    ///
    /// # Arguments
    ///
    /// * `bus` - bus the sensor is attached to
    /// * `address` - 7-bit I2C address (0x76 or 0x77)
    pub fn new(bus: B, address: u8) -> Self {
        Self::with_settings(bus, address, Bme280Settings::default())
    }

    /// Create with custom measurement settings
    pub fn with_settings(bus: B, address: u8, settings: Bme280Settings) -> Self {
        Self {
            bus,
            address,
            settings,
        }
    }

    /// Device address
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Release the underlying bus
    pub fn release(self) -> B {
        self.bus
    }

    fn read_block<const N: usize>(&mut self, register: u8) -> Result<[u8; N], SensorError> {
        let mut buf = [0u8; N];
        self.bus.read_registers(self.address, register, &mut buf)?;
        Ok(buf)
    }

    /// Trigger a forced-mode conversion and read back the raw counts
    fn measure(&mut self) -> Result<RawSample, SensorError> {
        // ctrl_hum only takes effect after the following ctrl_meas write
        self.bus
            .write_register(self.address, REG_CTRL_HUM, self.settings.humidity.bits())?;
        self.bus
            .write_register(self.address, REG_CTRL_MEAS, self.settings.ctrl_meas())?;

        if !self.settings.measurement_delay.is_zero() {
            thread::sleep(self.settings.measurement_delay);
        }

        let status = self.bus.read_register(self.address, REG_STATUS)?;
        if status & STATUS_MEASURING != 0 {
            return Err(SensorError::NotReady);
        }

        let raw = self.read_block::<8>(REG_DATA)?;
        Ok(RawSample::from_registers(&raw))
    }
}

impl<B: RegisterBus> SensorPort for Bme280Sensor<B> {
    type Calibration = Bme280Calibration;
    type Timestamp = DateTime<Local>;

    fn load_calibration(&mut self) -> Result<Bme280Calibration, SensorError> {
        let chip_id = self.bus.read_register(self.address, REG_CHIP_ID)?;
        if chip_id != CHIP_ID {
            return Err(SensorError::UnexpectedChipId {
                found: chip_id,
                expected: CHIP_ID,
            });
        }

        let tp = self.read_block::<TP_BLOCK_LEN>(REG_CALIB_TP)?;
        let h1 = self.bus.read_register(self.address, REG_CALIB_H1)?;
        let h = self.read_block::<H_BLOCK_LEN>(REG_CALIB_H)?;

        Ok(Bme280Calibration::from_registers(&tp, h1, &h))
    }

    fn sample(
        &mut self,
        calibration: &Bme280Calibration,
    ) -> Result<Reading<DateTime<Local>>, SensorError> {
        let raw = self.measure()?;
        let timestamp = Local::now();
        debug!("Raw sample: {:?}", raw);

        let c = calibration.compensate(raw);
        Ok(Reading::new(timestamp, c.temperature, c.humidity, c.pressure))
    }
}
