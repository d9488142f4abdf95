//! Adapters - concrete implementations of ports
//!
//! Adapters connect the sampling loop to the outside world by implementing
//! the port traits. Each adapter knows how to work with a specific
//! technology or hardware.
//!
//! # Available Adapters
//!
//! - **bme280**: Bosch BME280 driver over any RegisterBus
//! - **rppal_i2c**: Raspberry Pi `/dev/i2c-N` bus (feature `hardware`)
//! - **csv_log**: append-only CSV log file
//! - **thread_timer**: blocking thread sleep

pub mod bme280;
pub mod csv_log;
#[cfg(feature = "hardware")]
pub mod rppal_i2c;
pub mod thread_timer;

pub use self::bme280::{Bme280Sensor, Bme280Settings};
pub use csv_log::{CsvLogFile, CSV_HEADER};
#[cfg(feature = "hardware")]
pub use rppal_i2c::RppalBus;
pub use thread_timer::ThreadTimer;
