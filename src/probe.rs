//! High-level interface for the EC Salinity probe.
//!
//! [`EcSalinity`] wraps the low-level register driver with typed
//! configuration flags and device administration. Measurement and
//! calibration sequences live in `measurement.rs` and `calibration.rs` as
//! further `impl` blocks on the same type.

use embassy_time::Delay;
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;

use crate::config::DriverConfig;
use crate::driver::RegisterDriver;
use crate::error::EcError;
use crate::flags::{ConfigFlag, ConfigFlags};
use crate::registers::{Command, Register};

/// Version register value of a bus with nothing attached.
const NOT_CONNECTED: u8 = 0xFF;

/// High-level interface for one EC Salinity probe.
///
/// Every operation takes `&mut self`, so a handle runs at most one register
/// sequence at a time; a second command can never land inside another
/// command's settle window. To share a probe between tasks, wrap it in a
/// mutex (see `SharedEcSalinity` behind the `shared` feature) and hold the
/// lock for the whole sequence.
///
/// Dropping an operation's future part-way leaves the device in whatever
/// state the last completed transfer produced.
///
/// # Example
///
/// ```ignore
/// use ec_salinity_driver::{EcSalinity, DEFAULT_ADDRESS};
///
/// // `i2c` is any `embedded-hal-async` I2C implementation
/// let mut probe = EcSalinity::new(i2c, DEFAULT_ADDRESS);
///
/// let ec = probe.measure_ec().await?;
/// let temp = probe.measure_temperature().await?;
/// ```
pub struct EcSalinity<I2C, D = Delay> {
    pub(crate) driver: RegisterDriver<I2C, D>,
}

impl<I2C> EcSalinity<I2C, Delay>
where
    I2C: I2c,
{
    /// Create a probe handle using the Embassy timer for settle waits.
    ///
    /// # Arguments
    /// * `i2c`: I2C peripheral or shared-bus device
    /// * `address`: 7-bit I2C device address (factory default 0x3C)
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self::with_config(i2c, Delay, DriverConfig::at_address(address))
    }
}

impl<I2C, D> EcSalinity<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    /// Create a probe handle with an explicit delay provider and timings.
    pub fn with_config(i2c: I2C, delay: D, config: DriverConfig) -> Self {
        Self {
            driver: RegisterDriver::new(i2c, delay, config),
        }
    }

    /// The address this handle currently talks to.
    pub fn address(&self) -> u8 {
        self.driver.config().address
    }

    /// Consume the handle and give back the bus and delay provider.
    pub fn release(self) -> (I2C, D) {
        self.driver.release()
    }

    // -----------------------------------------------------------------------
    // Device information
    // -----------------------------------------------------------------------

    /// Read the hardware version byte.
    pub async fn version(&mut self) -> Result<u8, EcError<I2C::Error>> {
        self.driver.read_byte(Register::Version).await
    }

    /// Check whether a probe answers at this address.
    ///
    /// An idle bus reads back 0xFF. A failed transfer is still reported as
    /// an error rather than `false`.
    pub async fn is_connected(&mut self) -> Result<bool, EcError<I2C::Error>> {
        Ok(self.version().await? != NOT_CONNECTED)
    }

    /// Permanently change the probe's bus address and rebind this handle.
    ///
    /// If the new address is forgotten, the probe can only be found again
    /// with a bus scan.
    ///
    /// # Errors
    /// * [`EcError::InvalidState`] if `address` is 0 or wider than 7 bits;
    ///   nothing is written in that case
    /// * [`EcError::I2c`] on communication failure
    pub async fn set_i2c_address(&mut self, address: u8) -> Result<(), EcError<I2C::Error>> {
        if address == 0 || address > 0x7F {
            return Err(EcError::InvalidState);
        }

        self.driver.write_float(Register::Solution, address as f32).await?;
        self.driver.send_command(Command::SetI2cAddress).await?;
        self.driver.set_address(address);

        #[cfg(feature = "defmt")]
        defmt::info!("EC probe rebound to {=u8:#x}", address);

        Ok(())
    }

    // -----------------------------------------------------------------------
    // Configuration flags
    // -----------------------------------------------------------------------

    /// Read the whole configuration register.
    pub async fn config_flags(&mut self) -> Result<ConfigFlags, EcError<I2C::Error>> {
        let bits = self.driver.read_byte(Register::Config).await?;
        Ok(ConfigFlags::from_bits(bits))
    }

    /// Read one configuration flag.
    pub async fn flag(&mut self, flag: ConfigFlag) -> Result<bool, EcError<I2C::Error>> {
        Ok(self.config_flags().await?.contains(flag))
    }

    /// Set or clear one configuration flag.
    ///
    /// Read-modify-write: the other bits, reserved ones included, are written
    /// back unchanged.
    pub async fn set_flag(
        &mut self,
        flag: ConfigFlag,
        enabled: bool,
    ) -> Result<(), EcError<I2C::Error>> {
        let flags = self.config_flags().await?.with(flag, enabled);
        self.driver.write_byte(Register::Config, flags.bits()).await
    }

    pub async fn use_dual_point(&mut self, enabled: bool) -> Result<(), EcError<I2C::Error>> {
        self.set_flag(ConfigFlag::DualPointCalibration, enabled).await
    }

    pub async fn using_dual_point(&mut self) -> Result<bool, EcError<I2C::Error>> {
        self.flag(ConfigFlag::DualPointCalibration).await
    }

    pub async fn use_temperature_compensation(
        &mut self,
        enabled: bool,
    ) -> Result<(), EcError<I2C::Error>> {
        self.set_flag(ConfigFlag::TemperatureCompensation, enabled).await
    }

    pub async fn using_temperature_compensation(&mut self) -> Result<bool, EcError<I2C::Error>> {
        self.flag(ConfigFlag::TemperatureCompensation).await
    }

    // -----------------------------------------------------------------------
    // Temperature compensation
    // -----------------------------------------------------------------------

    /// Set the temperature used for compensation, in whole °C.
    ///
    /// 0xFF tells the firmware to use the measured temperature instead.
    pub async fn set_temp_constant(&mut self, celsius: u8) -> Result<(), EcError<I2C::Error>> {
        self.driver.write_byte(Register::TempCompensation, celsius).await
    }

    pub async fn temp_constant(&mut self) -> Result<u8, EcError<I2C::Error>> {
        self.driver.read_byte(Register::TempCompensation).await
    }
}
