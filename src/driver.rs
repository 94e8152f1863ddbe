//! Low-level register protocol driver.
//!
//! Implements the I2C primitives the probe firmware expects: select a
//! register by writing its address, then read the payload one byte at a
//! time; write payloads together with the register address in a single
//! transaction. Float writes are followed by the firmware's commit delay.
//!
//! This module is crate-private; consumers interact with [`EcSalinity`]
//! in `probe.rs` instead.
//!
//! [`EcSalinity`]: crate::EcSalinity

use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;

use crate::config::DriverConfig;
use crate::error::EcError;
use crate::registers::{Command, Register};

/// Encode a float register payload (little-endian, device byte order).
pub(crate) fn encode_float(value: f32) -> [u8; 4] {
    value.to_le_bytes()
}

/// Decode a float register payload.
pub(crate) fn decode_float(bytes: [u8; 4]) -> f32 {
    f32::from_le_bytes(bytes)
}

/// Low-level register driver.
///
/// Owns the I2C peripheral and the delay provider, and knows the address the
/// device currently answers on.
pub(crate) struct RegisterDriver<I2C, D> {
    i2c: I2C,
    delay: D,
    config: DriverConfig,
}

impl<I2C, D> RegisterDriver<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    pub fn new(i2c: I2C, delay: D, config: DriverConfig) -> Self {
        Self { i2c, delay, config }
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn set_address(&mut self, address: u8) {
        self.config.address = address;
    }

    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    // -----------------------------------------------------------------------
    // Core protocol primitives
    // -----------------------------------------------------------------------

    /// Point the firmware's register pointer at `register`.
    async fn select(&mut self, register: Register) -> Result<(), EcError<I2C::Error>> {
        self.i2c.write(self.config.address, &[register.addr()]).await?;
        Ok(())
    }

    /// Suspend the calling sequence for `ms` milliseconds.
    pub async fn wait_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms).await;
    }

    // -----------------------------------------------------------------------
    // Typed read/write helpers
    // -----------------------------------------------------------------------

    /// Read a single-byte register.
    pub async fn read_byte(&mut self, register: Register) -> Result<u8, EcError<I2C::Error>> {
        self.select(register).await?;

        let mut buf = [0u8; 1];
        self.i2c.read(self.config.address, &mut buf).await?;
        Ok(buf[0])
    }

    /// Write a single-byte register.
    pub async fn write_byte(
        &mut self,
        register: Register,
        value: u8,
    ) -> Result<(), EcError<I2C::Error>> {
        self.i2c
            .write(self.config.address, &[register.addr(), value])
            .await?;
        Ok(())
    }

    /// Read a 4-byte float register.
    ///
    /// The firmware auto-increments its register pointer, so the payload is
    /// fetched as four 1-byte reads in address order and reassembled
    /// little-endian.
    pub async fn read_float(&mut self, register: Register) -> Result<f32, EcError<I2C::Error>> {
        self.select(register).await?;

        let mut bytes = [0u8; 4];
        for byte in bytes.iter_mut() {
            let mut buf = [0u8; 1];
            self.i2c.read(self.config.address, &mut buf).await?;
            *byte = buf[0];
        }

        Ok(decode_float(bytes))
    }

    /// Write a 4-byte float register, then wait for the firmware to commit it.
    ///
    /// Full write buffer: `[register, b0, b1, b2, b3]`.
    pub async fn write_float(
        &mut self,
        register: Register,
        value: f32,
    ) -> Result<(), EcError<I2C::Error>> {
        let mut buf = [0u8; 5];
        buf[0] = register.addr();
        buf[1..5].copy_from_slice(&encode_float(value));

        self.i2c.write(self.config.address, &buf).await?;

        // Any register access before the commit completes reads garbage.
        let settle = self.config.float_write_settle_ms;
        self.wait_ms(settle).await;

        Ok(())
    }

    /// Start a firmware task.
    pub async fn send_command(&mut self, command: Command) -> Result<(), EcError<I2C::Error>> {
        #[cfg(feature = "defmt")]
        defmt::trace!("EC probe {=u8:#x}: command {}", self.config.address, command);

        self.write_byte(Register::Task, command.into()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Event, FakeDelay, FakeI2c, SimDevice};
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn float_payload_round_trips(bits in any::<u32>()) {
            let value = f32::from_bits(bits);
            prop_assert_eq!(decode_float(encode_float(value)).to_bits(), bits);
        }
    }

    #[test]
    fn float_payload_is_little_endian() {
        assert_eq!(encode_float(1.0), [0x00, 0x00, 0x80, 0x3F]);
        assert_eq!(decode_float([0x00, 0x00, 0x20, 0x40]), 2.5);
    }

    fn driver(device: &SimDevice) -> RegisterDriver<FakeI2c, FakeDelay> {
        RegisterDriver::new(device.i2c(), device.delay(), DriverConfig::default())
    }

    #[tokio::test]
    async fn read_float_selects_then_reads_four_bytes() {
        let device = SimDevice::new();
        device.set_float(Register::K, 1.5);
        let mut driver = driver(&device);

        let k = driver.read_float(Register::K).await.unwrap();
        assert_eq!(k, 1.5);

        let bytes = 1.5f32.to_le_bytes();
        assert_eq!(
            device.events(),
            [
                Event::Write(0x3C, [9].to_vec()),
                Event::Read(0x3C, [bytes[0]].to_vec()),
                Event::Read(0x3C, [bytes[1]].to_vec()),
                Event::Read(0x3C, [bytes[2]].to_vec()),
                Event::Read(0x3C, [bytes[3]].to_vec()),
            ]
        );
    }

    #[tokio::test]
    async fn write_float_is_one_transaction_then_settles() {
        let device = SimDevice::new();
        let mut driver = driver(&device);

        driver.write_float(Register::TempCoefficient, 1.0).await.unwrap();

        let events = device.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], Event::Write(0x3C, [17, 0x00, 0x00, 0x80, 0x3F].to_vec()));
        assert!(matches!(events[1], Event::Delay { ms: 3, .. }));
        assert_eq!(device.float(Register::TempCoefficient), 1.0);
    }

    #[tokio::test]
    async fn byte_registers() {
        let device = SimDevice::new();
        device.set_byte(Register::Version, 0x1A);
        let mut driver = driver(&device);

        assert_eq!(driver.read_byte(Register::Version).await.unwrap(), 0x1A);

        driver.write_byte(Register::TempCompensation, 25).await.unwrap();
        assert_eq!(device.byte(Register::TempCompensation), 25);
    }

    #[tokio::test]
    async fn bus_errors_propagate() {
        let device = SimDevice::new();
        let mut driver = driver(&device);

        device.fail_after(2);
        let result = driver.read_float(Register::Millisiemens).await;
        assert!(matches!(result, Err(EcError::I2c(_))));
    }
}
