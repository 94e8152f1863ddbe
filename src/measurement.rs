//! Temperature and conductivity measurements.
//!
//! The probe has no ready flag. A measurement is *armed* by writing its
//! command to the task register and becomes *ready* once the firmware's
//! fixed conversion time has passed; only then are the result registers
//! read. Because every measurement holds `&mut self` across the wait, a
//! caller cannot observe the result registers mid-conversion through this
//! handle.

use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;

use crate::error::EcError;
use crate::probe::EcSalinity;
use crate::registers::{
    Command, Register, PSU_TO_PPT_CONVERSION, TEMP_COEF_EC, TEMP_COEF_SALINITY,
    TEMP_DISCONNECTED_C,
};

/// A temperature reading.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Temperature {
    pub celsius: f32,
    pub fahrenheit: f32,
}

impl Temperature {
    pub fn from_celsius(celsius: f32) -> Self {
        Self {
            celsius,
            fahrenheit: celsius * 9.0 / 5.0 + 32.0,
        }
    }

    /// The firmware reports -127 °C when no thermometer is attached.
    pub fn is_probe_connected(&self) -> bool {
        self.celsius != TEMP_DISCONNECTED_C
    }
}

/// One conductivity reading and everything derived from it.
///
/// NaN from the device (e.g. an uncalibrated probe) propagates into every
/// derived field.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EcMeasurement {
    /// Conductivity in millisiemens.
    pub ms: f32,
    /// Conductivity in microsiemens.
    pub us: f32,
    /// Conductivity in siemens.
    pub s: f32,
    /// Parts per million, 500 scale.
    pub ppm_500: f32,
    /// Parts per million, 640 scale.
    pub ppm_640: f32,
    /// Parts per million, 700 scale.
    pub ppm_700: f32,
    /// Salinity in practical salinity units.
    pub salinity_psu: f32,
    /// Salinity in parts per thousand.
    pub salinity_ppt: f32,
    /// Salinity in parts per million.
    pub salinity_ppm: f32,
}

impl EcMeasurement {
    /// Derive every unit from the two raw result registers.
    pub fn from_raw(ms: f32, salinity_psu: f32) -> Self {
        let salinity_ppt = salinity_psu * PSU_TO_PPT_CONVERSION;

        Self {
            ms,
            us: ms * 1000.0,
            s: ms / 1000.0,
            ppm_500: ms * 500.0,
            ppm_640: ms * 640.0,
            ppm_700: ms * 700.0,
            salinity_psu,
            salinity_ppt,
            salinity_ppm: salinity_ppt * 1000.0 * PSU_TO_PPT_CONVERSION,
        }
    }
}

impl<I2C, D> EcSalinity<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    /// Arm a firmware task and wait until its result is ready.
    pub(crate) async fn run_task(
        &mut self,
        command: Command,
        settle_ms: u32,
    ) -> Result<(), EcError<I2C::Error>> {
        self.driver.send_command(command).await?;
        self.driver.wait_ms(settle_ms).await;
        Ok(())
    }

    /// Measure the probe's temperature.
    ///
    /// Takes about 750 ms.
    pub async fn measure_temperature(&mut self) -> Result<Temperature, EcError<I2C::Error>> {
        let settle = self.driver.config().temp_measurement_ms;
        self.run_task(Command::MeasureTemperature, settle).await?;

        let celsius = self.driver.read_float(Register::Temperature).await?;

        #[cfg(feature = "defmt")]
        if celsius == TEMP_DISCONNECTED_C {
            defmt::warn!("EC probe reports no thermometer");
        }

        Ok(Temperature::from_celsius(celsius))
    }

    /// Override the temperature the firmware uses for compensation, for
    /// setups without a thermometer.
    pub async fn set_temperature(&mut self, celsius: f32) -> Result<(), EcError<I2C::Error>> {
        self.driver.write_float(Register::Temperature, celsius).await
    }

    /// Measure conductivity using `temp_coefficient` for compensation.
    ///
    /// Takes about 250 ms plus one float write.
    pub async fn measure_conductivity(
        &mut self,
        temp_coefficient: f32,
    ) -> Result<EcMeasurement, EcError<I2C::Error>> {
        self.driver
            .write_float(Register::TempCoefficient, temp_coefficient)
            .await?;

        let settle = self.driver.config().ec_measurement_ms;
        self.run_task(Command::MeasureEc, settle).await?;

        let ms = self.driver.read_float(Register::Millisiemens).await?;
        let psu = self.driver.read_float(Register::SalinityPsu).await?;

        #[cfg(feature = "defmt")]
        defmt::debug!("EC probe: {} mS, {} PSU", ms, psu);

        Ok(EcMeasurement::from_raw(ms, psu))
    }

    /// Measure freshwater conductivity (coefficient 0.019).
    pub async fn measure_ec(&mut self) -> Result<EcMeasurement, EcError<I2C::Error>> {
        self.measure_conductivity(TEMP_COEF_EC).await
    }

    /// Measure seawater salinity (coefficient 0.021).
    pub async fn measure_salinity(&mut self) -> Result<EcMeasurement, EcError<I2C::Error>> {
        self.measure_conductivity(TEMP_COEF_SALINITY).await
    }
}
