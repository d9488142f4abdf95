//! BME280 Logger Library
//!
//! This library provides a hexagonal architecture for a host-side sensor
//! logger: it samples a BME280 over I2C and appends every reading to a CSV
//! log, either forever at a fixed interval or exactly once.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Domain Layer                                 │
//! │  - Reading entity                                                │
//! │  - Bme280Calibration service                                     │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Ports (Traits)                               │
//! │  - RegisterBus: raw register access                              │
//! │  - SensorPort: load calibration, take readings                   │
//! │  - StoragePort: append readings to the log                       │
//! │  - TimerPort: wait between samples                               │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Adapters                                     │
//! │  - RppalBus: /dev/i2c-N on a Raspberry Pi                        │
//! │  - Bme280Sensor: forced-mode BME280 driver                       │
//! │  - CsvLogFile: append-only CSV file                              │
//! │  - ThreadTimer: blocking sleep                                   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `SamplingController` sits on top and owns one adapter per port for the
//! lifetime of a run.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod controller;
pub mod domain;
pub mod error;
pub mod ports;

pub use config::{ConfigError, Configuration, Mode};
pub use controller::{RetryBudget, RunSummary, SamplingController, State, Termination};
pub use domain::{Bme280Calibration, Reading};
pub use error::LoggerError;
pub use ports::{RegisterBus, SensorError, SensorPort, StorageError, StoragePort, TimerPort};

#[cfg(feature = "hardware")]
pub use adapters::RppalBus;
pub use adapters::{Bme280Sensor, CsvLogFile, ThreadTimer};
