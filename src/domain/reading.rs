//! Sensor reading domain entity
//!
//! This module defines the core domain entity for environmental readings.
//! It has no knowledge of how readings are stored or where they came from.

/// An environmental reading from the domain perspective.
///
/// One timestamped measurement tuple taken from the sensor. The timestamp
/// type belongs to the sensor driver and is only ever rendered as text, so
/// the domain keeps it generic.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Reading<T> {
    /// When the sample was taken
    pub timestamp: T,
    /// Temperature in Celsius
    pub temperature: f64,
    /// Relative humidity in percent
    pub humidity: f64,
    /// Pressure in hectopascal
    pub pressure: f64,
}

impl<T> Reading<T> {
    /// Create a new reading
    pub const fn new(timestamp: T, temperature: f64, humidity: f64, pressure: f64) -> Self {
        Self {
            timestamp,
            temperature,
            humidity,
            pressure,
        }
    }
}
