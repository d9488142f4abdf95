//! Ports (interfaces) defining the boundaries of the application
//!
//! Ports are traits that define how the sampling loop interacts with
//! external systems. They allow the loop to remain independent of specific
//! implementations.
//!
//! # Hexagonal Architecture
//!
//! In hexagonal architecture, ports define the "holes" in the hexagon where
//! adapters plug in:
//!
//! - **RegisterBus**: How the driver reaches device registers (rppal I2C, fake)
//! - **SensorPort**: How we load calibration and take readings (BME280, fake)
//! - **StoragePort**: How we persist readings (CSV log file, fake)
//! - **TimerPort**: How we wait between samples (thread sleep, recording fake)

pub mod bus;
pub mod sensor;
pub mod storage;
pub mod timer;

pub use bus::{BusError, RegisterBus};
pub use sensor::{FailureKind, SensorError, SensorPort};
pub use storage::{HeaderStatus, StorageError, StoragePort};
pub use timer::TimerPort;
