//! Domain layer - pure business logic independent of infrastructure
//!
//! This module contains the core domain entities and services: the reading
//! that flows from sensor to log file, and the calibration service that
//! turns raw sensor counts into physical units.

pub mod calibration;
pub mod reading;

pub use calibration::{Bme280Calibration, Compensated, RawSample};
pub use reading::Reading;
