//! Bus port - abstraction for register access on a shared I2C bus
//!
//! The sensor driver talks to the device only through this trait, so the
//! same driver runs against `/dev/i2c-N` on a Raspberry Pi or against an
//! in-memory register map in tests.

use std::io;

use thiserror::Error;

/// Error type for bus transactions
#[derive(Debug, Error)]
pub enum BusError {
    /// The process is not allowed to use the bus device
    #[error("access to the I2C bus was denied")]
    PermissionDenied(#[source] io::Error),
    /// Any other I/O failure (NACK, arbitration loss, timeout, unplugged device)
    #[error("I2C transaction failed")]
    Io(#[source] io::Error),
    /// Failure reported by the bus backend that carries no I/O error
    #[error("I2C bus error: {0}")]
    Other(String),
}

impl BusError {
    /// Classify an I/O error by its kind
    pub fn from_io(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => BusError::PermissionDenied(err),
            _ => BusError::Io(err),
        }
    }
}

/// Port for register-oriented bus transactions
///
/// Calls are strictly sequential: sensors of this class do not support
/// concurrent transactions on one bus handle.
pub trait RegisterBus {
    /// Read `buf.len()` consecutive registers starting at `register`
    fn read_registers(
        &mut self,
        address: u8,
        register: u8,
        buf: &mut [u8],
    ) -> Result<(), BusError>;

    /// Write a single register
    fn write_register(&mut self, address: u8, register: u8, value: u8) -> Result<(), BusError>;

    /// Read a single register
    fn read_register(&mut self, address: u8, register: u8) -> Result<u8, BusError> {
        let mut buf = [0u8; 1];
        self.read_registers(address, register, &mut buf)?;
        Ok(buf[0])
    }
}
