//! Top-level error type of a logger run

use thiserror::Error;

use crate::config::ConfigError;
use crate::ports::bus::BusError;
use crate::ports::sensor::SensorError;
use crate::ports::storage::StorageError;

/// Failures that end a run before or outside the sampling state machine
#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("invalid configuration")]
    Config(#[from] ConfigError),
    #[error("failed to open I2C bus {bus}")]
    BusOpen {
        bus: u8,
        #[source]
        source: BusError,
    },
    #[error("failed to load calibration parameters")]
    Calibration(#[source] SensorError),
    #[error("log file error")]
    Storage(#[from] StorageError),
}
