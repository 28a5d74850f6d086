//! I2C register transport.
//!
//! Bridges any `embedded-hal` 1.0 I2C bus and delay provider to the
//! [`BusTransport`] port the sensor driver consumes. On the ESP32 this wraps
//! `esp_idf_hal::i2c::I2cDriver` and `Ets`; on the host it wraps
//! `embedded-hal-mock`.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{Error as _, I2c};
use log::warn;

use crate::app::ports::BusTransport;
use crate::error::TransportError;

/// Largest register write (address byte + payload) sent in one transaction.
pub const MAX_WRITE_FRAME: usize = 32;

/// A sensor at `address` on `bus`.
pub struct I2cTransport<I2C, D> {
    bus: I2C,
    delay: D,
    address: u8,
}

impl<I2C, D> I2cTransport<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    pub fn new(bus: I2C, delay: D, address: u8) -> Self {
        Self {
            bus,
            delay,
            address,
        }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// Give the bus and delay back, e.g. to verify a mock.
    pub fn release(self) -> (I2C, D) {
        (self.bus, self.delay)
    }
}

impl<I2C, D> BusTransport for I2cTransport<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    fn read(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), TransportError> {
        self.bus.write_read(self.address, &[reg], buf).map_err(|e| {
            warn!(
                "I2C read of 0x{:02X} at 0x{:02X} failed: {:?}",
                reg,
                self.address,
                e.kind()
            );
            TransportError::Read(reg)
        })
    }

    fn write(&mut self, reg: u8, data: &[u8]) -> Result<(), TransportError> {
        let mut frame: heapless::Vec<u8, MAX_WRITE_FRAME> = heapless::Vec::new();
        if frame.push(reg).is_err() || frame.extend_from_slice(data).is_err() {
            return Err(TransportError::PayloadTooLong(data.len()));
        }

        self.bus.write(self.address, &frame).map_err(|e| {
            warn!(
                "I2C write of 0x{:02X} at 0x{:02X} failed: {:?}",
                reg,
                self.address,
                e.kind()
            );
            TransportError::Write(reg)
        })
    }

    fn delay_us(&mut self, period_us: u32) {
        self.delay.delay_us(period_us);
    }
}
