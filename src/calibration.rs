//! Calibration sequences and stored calibration constants.
//!
//! Every sequence that writes operand registers runs with dual-point
//! calibration disabled so the firmware computes single-point values:
//!
//! 1. Capture the dual-point flag and clear it.
//! 2. Write the temperature coefficient and solution EC.
//! 3. Issue the command and wait the EC settle time.
//! 4. Read the result registers.
//! 5. Restore the captured flag.
//!
//! Step 5 runs only once step 4 has completed. A bus error anywhere in
//! steps 2–4 is returned as-is and the flag is left cleared.

use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;

use crate::error::EcError;
use crate::probe::EcSalinity;
use crate::registers::{Command, Register, CALIBRATION_REGISTERS};

/// One calibration point: the solution's reference EC and what the probe read.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationPoint {
    pub reference: f32,
    pub reading: f32,
}

/// Both dual-point calibration points, unrounded.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DualPointCalibration {
    pub low: CalibrationPoint,
    pub high: CalibrationPoint,
}

impl DualPointCalibration {
    /// Returns `true` if any register still holds the NaN "unset" marker.
    pub fn is_unset(&self) -> bool {
        self.low.reference.is_nan()
            || self.low.reading.is_nan()
            || self.high.reference.is_nan()
            || self.high.reading.is_nan()
    }
}

/// Round to two decimal places, halves away from zero.
///
/// Computed in `f32`, so raw 1.005 (stored as 1.00499999…) scales to exactly
/// 100.5 and rounds to 1.01. NaN and infinities are returned unchanged.
pub fn round_hundredths(value: f32) -> f32 {
    // Every f32 of this magnitude is already an integer.
    const INTEGRAL: f32 = 8_388_608.0;

    let scaled = value * 100.0;
    if scaled.is_nan() || scaled >= INTEGRAL || scaled <= -INTEGRAL {
        return value;
    }

    let truncated = scaled as i32;
    let fraction = scaled - truncated as f32;
    let rounded = if fraction >= 0.5 {
        truncated + 1
    } else if fraction <= -0.5 {
        truncated - 1
    } else {
        truncated
    };

    rounded as f32 / 100.0
}

impl<I2C, D> EcSalinity<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    /// Steps 1–3 of a single-point sequence. Returns the captured flag.
    async fn start_single_point(
        &mut self,
        command: Command,
        solution_ec: f32,
        temp_coefficient: f32,
    ) -> Result<bool, EcError<I2C::Error>> {
        let dual_point = self.using_dual_point().await?;
        self.use_dual_point(false).await?;

        self.driver
            .write_float(Register::TempCoefficient, temp_coefficient)
            .await?;
        self.driver.write_float(Register::Solution, solution_ec).await?;

        let settle = self.driver.config().ec_measurement_ms;
        self.run_task(command, settle).await?;

        Ok(dual_point)
    }

    async fn read_point(
        &mut self,
        reference: Register,
        reading: Register,
    ) -> Result<CalibrationPoint, EcError<I2C::Error>> {
        let reading = self.driver.read_float(reading).await?;
        let reference = self.driver.read_float(reference).await?;
        Ok(CalibrationPoint { reference, reading })
    }

    // -----------------------------------------------------------------------
    // Calibration sequences
    // -----------------------------------------------------------------------

    /// Single-point calibration against a solution of `solution_ec` mS.
    ///
    /// Returns the offset the firmware stored.
    pub async fn calibrate_probe(
        &mut self,
        solution_ec: f32,
        temp_coefficient: f32,
    ) -> Result<f32, EcError<I2C::Error>> {
        let dual_point = self
            .start_single_point(Command::CalibrateProbe, solution_ec, temp_coefficient)
            .await?;
        let offset = self.driver.read_float(Register::CalibrateOffset).await?;
        self.use_dual_point(dual_point).await?;

        #[cfg(feature = "defmt")]
        defmt::debug!("EC probe: single-point offset {}", offset);

        Ok(offset)
    }

    /// Record the low dual-point calibration point.
    pub async fn calibrate_low(
        &mut self,
        solution_ec: f32,
        temp_coefficient: f32,
    ) -> Result<CalibrationPoint, EcError<I2C::Error>> {
        let dual_point = self
            .start_single_point(Command::CalibrateLow, solution_ec, temp_coefficient)
            .await?;
        let point = self
            .read_point(Register::CalibrateRefLow, Register::CalibrateReadLow)
            .await?;
        self.use_dual_point(dual_point).await?;

        #[cfg(feature = "defmt")]
        defmt::debug!("EC probe: low point {}", point);

        Ok(point)
    }

    /// Record the high dual-point calibration point.
    pub async fn calibrate_high(
        &mut self,
        solution_ec: f32,
        temp_coefficient: f32,
    ) -> Result<CalibrationPoint, EcError<I2C::Error>> {
        let dual_point = self
            .start_single_point(Command::CalibrateHigh, solution_ec, temp_coefficient)
            .await?;
        let point = self
            .read_point(Register::CalibrateRefHigh, Register::CalibrateReadHigh)
            .await?;
        self.use_dual_point(dual_point).await?;

        #[cfg(feature = "defmt")]
        defmt::debug!("EC probe: high point {}", point);

        Ok(point)
    }

    /// Compute the cell constant K from a solution of `solution_ec` mS.
    pub async fn calculate_cell_constant(
        &mut self,
        solution_ec: f32,
        temp_coefficient: f32,
    ) -> Result<f32, EcError<I2C::Error>> {
        let dual_point = self
            .start_single_point(Command::CalculateK, solution_ec, temp_coefficient)
            .await?;
        let k = self.driver.read_float(Register::K).await?;
        self.use_dual_point(dual_point).await?;
        Ok(k)
    }

    /// Record the reading of the probe held in air.
    ///
    /// No operands are written, so the dual-point flag is left alone.
    pub async fn calibrate_dry(&mut self) -> Result<f32, EcError<I2C::Error>> {
        let settle = self.driver.config().ec_measurement_ms;
        self.run_task(Command::CalibrateDry, settle).await?;
        self.driver.read_float(Register::Dry).await
    }

    /// Store both dual-point calibration points directly.
    pub async fn set_dual_point_calibration(
        &mut self,
        ref_low: f32,
        ref_high: f32,
        read_low: f32,
        read_high: f32,
    ) -> Result<(), EcError<I2C::Error>> {
        self.driver.write_float(Register::CalibrateRefLow, ref_low).await?;
        self.driver.write_float(Register::CalibrateRefHigh, ref_high).await?;
        self.driver.write_float(Register::CalibrateReadLow, read_low).await?;
        self.driver.write_float(Register::CalibrateReadHigh, read_high).await
    }

    pub async fn set_k(&mut self, k: f32) -> Result<(), EcError<I2C::Error>> {
        self.driver.write_float(Register::K, k).await
    }

    pub async fn set_calibrate_offset(&mut self, offset: f32) -> Result<(), EcError<I2C::Error>> {
        self.driver.write_float(Register::CalibrateOffset, offset).await
    }

    /// Return the probe to its factory calibration state.
    ///
    /// Every calibration register is set to NaN, the temperature constant to
    /// 0, and both configuration flags are cleared.
    pub async fn reset(&mut self) -> Result<(), EcError<I2C::Error>> {
        for register in CALIBRATION_REGISTERS {
            self.driver.write_float(register, f32::NAN).await?;
        }
        self.set_temp_constant(0).await?;
        self.use_dual_point(false).await?;
        self.use_temperature_compensation(false).await?;

        #[cfg(feature = "defmt")]
        defmt::info!("EC probe calibration reset");

        Ok(())
    }

    // -----------------------------------------------------------------------
    // Stored constants
    // -----------------------------------------------------------------------

    /// Both dual-point calibration points as stored, without rounding.
    pub async fn dual_point_calibration(
        &mut self,
    ) -> Result<DualPointCalibration, EcError<I2C::Error>> {
        let low = self
            .read_point(Register::CalibrateRefLow, Register::CalibrateReadLow)
            .await?;
        let high = self
            .read_point(Register::CalibrateRefHigh, Register::CalibrateReadHigh)
            .await?;
        Ok(DualPointCalibration { low, high })
    }

    async fn read_rounded(&mut self, register: Register) -> Result<f32, EcError<I2C::Error>> {
        Ok(round_hundredths(self.driver.read_float(register).await?))
    }

    /// Cell constant, rounded to two decimals. NaN if never calibrated.
    pub async fn k(&mut self) -> Result<f32, EcError<I2C::Error>> {
        self.read_rounded(Register::K).await
    }

    /// Dry reading, rounded to two decimals.
    pub async fn calibrate_dry_reading(&mut self) -> Result<f32, EcError<I2C::Error>> {
        self.read_rounded(Register::Dry).await
    }

    /// Single-point offset, rounded to two decimals.
    pub async fn calibrate_offset(&mut self) -> Result<f32, EcError<I2C::Error>> {
        self.read_rounded(Register::CalibrateOffset).await
    }

    /// High reference, rounded to two decimals.
    pub async fn calibrate_high_reference(&mut self) -> Result<f32, EcError<I2C::Error>> {
        self.read_rounded(Register::CalibrateRefHigh).await
    }

    /// Low reference, rounded to two decimals.
    pub async fn calibrate_low_reference(&mut self) -> Result<f32, EcError<I2C::Error>> {
        self.read_rounded(Register::CalibrateRefLow).await
    }

    /// High reading, rounded to two decimals.
    pub async fn calibrate_high_reading(&mut self) -> Result<f32, EcError<I2C::Error>> {
        self.read_rounded(Register::CalibrateReadHigh).await
    }

    /// Low reading, rounded to two decimals.
    pub async fn calibrate_low_reading(&mut self) -> Result<f32, EcError<I2C::Error>> {
        self.read_rounded(Register::CalibrateReadLow).await
    }
}
