//! Run configuration
//!
//! Everything the sampling loop needs to know about one run, validated once
//! at construction so the loop never has to re-check it.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Highest 7-bit I2C address
pub const MAX_DEVICE_ADDRESS: u8 = 0x7F;

/// Default I2C bus on a Raspberry Pi
pub const DEFAULT_BUS_ID: u8 = 1;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("device address 0x{0:x} does not fit in 7 bits")]
    InvalidAddress(u16),
    #[error("sample interval must be a positive number of seconds, got {0}")]
    InvalidInterval(f64),
    #[error("missing required argument {0}")]
    MissingArgument(&'static str),
}

/// When and how often to sample
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Sample forever, sleeping `interval` after every stored reading
    Continuous { interval: Duration },
    /// Take exactly one reading, then stop
    OneShot,
}

impl Mode {
    /// Continuous mode from a number of seconds
    pub fn continuous(interval_secs: f64) -> Result<Self, ConfigError> {
        // written negated so NaN is rejected too
        if !(interval_secs > 0.0) {
            return Err(ConfigError::InvalidInterval(interval_secs));
        }
        let interval = Duration::try_from_secs_f64(interval_secs)
            .map_err(|_| ConfigError::InvalidInterval(interval_secs))?;
        if interval.is_zero() {
            return Err(ConfigError::InvalidInterval(interval_secs));
        }
        Ok(Mode::Continuous { interval })
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Continuous { interval } => write!(f, "every {} s", interval.as_secs_f64()),
            Mode::OneShot => f.write_str("one-shot"),
        }
    }
}

/// Validated parameters of one logger run
#[derive(Clone, Debug, PartialEq)]
pub struct Configuration {
    log_path: PathBuf,
    bus_id: u8,
    device_address: u8,
    mode: Mode,
}

impl Configuration {
    /// Validate and build a configuration
    ///
    /// `device_address` is taken wide so out-of-range CLI input is reported
    /// instead of silently truncated.
    pub fn new(
        log_path: impl Into<PathBuf>,
        bus_id: u8,
        device_address: u16,
        mode: Mode,
    ) -> Result<Self, ConfigError> {
        let device_address = u8::try_from(device_address)
            .ok()
            .filter(|a| *a <= MAX_DEVICE_ADDRESS)
            .ok_or(ConfigError::InvalidAddress(device_address))?;

        Ok(Self {
            log_path: log_path.into(),
            bus_id,
            device_address,
            mode,
        })
    }

    pub fn log_path(&self) -> &std::path::Path {
        &self.log_path
    }

    pub fn bus_id(&self) -> u8 {
        self.bus_id
    }

    pub fn device_address(&self) -> u8 {
        self.device_address
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_range() {
        assert!(Configuration::new("log.csv", 1, 0x7F, Mode::OneShot).is_ok());
        assert_eq!(
            Configuration::new("log.csv", 1, 0x80, Mode::OneShot),
            Err(ConfigError::InvalidAddress(0x80))
        );
        assert_eq!(
            Configuration::new("log.csv", 1, 0x176, Mode::OneShot),
            Err(ConfigError::InvalidAddress(0x176))
        );
    }

    #[test]
    fn test_interval_validation() {
        assert_eq!(
            Mode::continuous(15.0),
            Ok(Mode::Continuous { interval: Duration::from_secs(15) })
        );
        assert_eq!(
            Mode::continuous(0.25),
            Ok(Mode::Continuous { interval: Duration::from_millis(250) })
        );
        assert_eq!(Mode::continuous(0.0), Err(ConfigError::InvalidInterval(0.0)));
        assert_eq!(Mode::continuous(-1.0), Err(ConfigError::InvalidInterval(-1.0)));
        assert!(Mode::continuous(f64::NAN).is_err());
        assert!(Mode::continuous(f64::INFINITY).is_err());
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(Mode::continuous(15.0).unwrap().to_string(), "every 15 s");
        assert_eq!(Mode::OneShot.to_string(), "one-shot");
    }
}
