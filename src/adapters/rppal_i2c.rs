//! Raspberry Pi I2C bus adapter
//!
//! Implements RegisterBus on top of rppal's `/dev/i2c-N` access. The slave
//! address is selected lazily and cached, so repeated transactions with the
//! same device cost no extra ioctl.

use rppal::i2c::{Error as I2cError, I2c};

use crate::ports::bus::{BusError, RegisterBus};

/// Register bus backed by a Linux I2C character device
pub struct RppalBus {
    i2c: I2c,
    bus_id: u8,
    selected: Option<u8>,
}

impl RppalBus {
    /// Open `/dev/i2c-<bus_id>`
    pub fn open(bus_id: u8) -> Result<Self, BusError> {
        let i2c = I2c::with_bus(bus_id).map_err(map_error)?;
        Ok(Self {
            i2c,
            bus_id,
            selected: None,
        })
    }

    /// Bus number this handle was opened on
    pub fn bus_id(&self) -> u8 {
        self.bus_id
    }

    fn select(&mut self, address: u8) -> Result<(), BusError> {
        if self.selected != Some(address) {
            self.i2c
                .set_slave_address(u16::from(address))
                .map_err(map_error)?;
            self.selected = Some(address);
        }
        Ok(())
    }
}

fn map_error(err: I2cError) -> BusError {
    match err {
        I2cError::Io(e) => BusError::from_io(e),
        other => BusError::Other(other.to_string()),
    }
}

impl RegisterBus for RppalBus {
    fn read_registers(
        &mut self,
        address: u8,
        register: u8,
        buf: &mut [u8],
    ) -> Result<(), BusError> {
        self.select(address)?;
        self.i2c.write_read(&[register], buf).map_err(map_error)
    }

    fn write_register(&mut self, address: u8, register: u8, value: u8) -> Result<(), BusError> {
        self.select(address)?;
        let written = self.i2c.write(&[register, value]).map_err(map_error)?;
        if written != 2 {
            return Err(BusError::Other(format!(
                "short write to register 0x{register:02x} ({written} of 2 bytes)"
            )));
        }
        Ok(())
    }
}
