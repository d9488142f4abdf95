//! Sensor port - abstraction for reading sensor data
//!
//! This trait allows the sampling loop to read the sensor without knowing
//! the specific driver or bus behind it (BME280 over I2C, scripted fake, etc.)

use std::fmt;

use thiserror::Error;

use crate::domain::Reading;
use crate::ports::bus::BusError;

/// How the sampling loop should treat a failed sample
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    /// Persistent authorization/availability problem; never retried
    PermissionDenied,
    /// Expected to clear on an immediate retry
    Transient,
}

/// Error type for sensor operations
#[derive(Debug, Error)]
pub enum SensorError {
    /// Access to the sensor was revoked
    #[error("sensor access denied")]
    PermissionDenied(#[source] BusError),
    /// A bus transaction failed
    #[error("sensor bus transaction failed")]
    Bus(#[source] BusError),
    /// Something other than a BME280 answered at the configured address
    #[error("unexpected chip id 0x{found:02x} (expected 0x{expected:02x})")]
    UnexpectedChipId { found: u8, expected: u8 },
    /// The measurement was still running when the data registers were read
    #[error("measurement not ready")]
    NotReady,
}

impl SensorError {
    /// Classify this failure for the retry policy
    pub fn kind(&self) -> FailureKind {
        match self {
            SensorError::PermissionDenied(_) => FailureKind::PermissionDenied,
            SensorError::Bus(_) | SensorError::UnexpectedChipId { .. } | SensorError::NotReady => {
                FailureKind::Transient
            }
        }
    }
}

impl From<BusError> for SensorError {
    fn from(err: BusError) -> Self {
        match err {
            BusError::PermissionDenied(_) => SensorError::PermissionDenied(err),
            _ => SensorError::Bus(err),
        }
    }
}

/// Port for reading environmental data
///
/// Calibration is loaded once before sampling starts and handed back by
/// reference on every sample, so the port itself stays free of hidden
/// initialization state.
///
/// # Example Implementation
///
/// ```ignore
/// impl<B: RegisterBus> SensorPort for Bme280Sensor<B> {
///     type Calibration = Bme280Calibration;
///     type Timestamp = DateTime<Local>;
///
///     fn load_calibration(&mut self) -> Result<Bme280Calibration, SensorError> {
///         let tp = self.read_block::<24>(0x88)?;
///         ...
///     }
///
///     fn sample(
///         &mut self,
///         cal: &Bme280Calibration,
///     ) -> Result<Reading<DateTime<Local>>, SensorError> {
///         let raw = self.measure()?;
///         let c = cal.compensate(raw);
///         Ok(Reading::new(Local::now(), c.temperature, c.humidity, c.pressure))
///     }
/// }
/// ```
pub trait SensorPort {
    /// Device-specific constants, opaque to the sampling loop
    type Calibration: fmt::Debug;
    /// Timestamp attached to each reading
    type Timestamp: fmt::Display;

    /// Load the calibration constants from the device
    ///
    /// Called once before the loop starts; failure is fatal to the run.
    fn load_calibration(&mut self) -> Result<Self::Calibration, SensorError>;

    /// Take one reading
    fn sample(
        &mut self,
        calibration: &Self::Calibration,
    ) -> Result<Reading<Self::Timestamp>, SensorError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_bus_errors_keep_their_class() {
        let denied = SensorError::from(BusError::PermissionDenied(io::Error::from(
            io::ErrorKind::PermissionDenied,
        )));
        assert_eq!(denied.kind(), FailureKind::PermissionDenied);

        let nack = SensorError::from(BusError::Io(io::Error::from(io::ErrorKind::TimedOut)));
        assert_eq!(nack.kind(), FailureKind::Transient);

        let other = SensorError::from(BusError::Other("arbitration lost".into()));
        assert_eq!(other.kind(), FailureKind::Transient);
    }

    #[test]
    fn test_driver_errors_are_transient() {
        assert_eq!(SensorError::NotReady.kind(), FailureKind::Transient);
        let chip = SensorError::UnexpectedChipId { found: 0x58, expected: 0x60 };
        assert_eq!(chip.kind(), FailureKind::Transient);
        assert_eq!(chip.to_string(), "unexpected chip id 0x58 (expected 0x60)");
    }
}
