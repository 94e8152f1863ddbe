//! Register map, command codes and timing constants for the EC Salinity probe.
//!
//! The probe firmware exposes a flat, single-byte register address space.
//! Measurement results and calibration constants are 4-byte little-endian
//! IEEE-754 floats occupying four consecutive addresses; the version,
//! temperature-constant, config and task registers are single bytes.

// ---------------------------------------------------------------------------
// Registers
// ---------------------------------------------------------------------------

/// Width of a register's payload.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Width {
    /// Single unsigned byte.
    Byte,
    /// 4-byte little-endian `f32`.
    Float,
}

impl Width {
    /// Number of bytes transferred for this width.
    pub const fn len(self) -> usize {
        match self {
            Width::Byte => 1,
            Width::Float => 4,
        }
    }
}

/// Every register the driver addresses.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Register {
    /// Hardware version (byte).
    Version,
    /// Conductivity in millisiemens.
    Millisiemens,
    /// Temperature in °C.
    Temperature,
    /// Cell constant K.
    K,
    /// Calibration solution EC, also used as the operand for address changes.
    Solution,
    /// Temperature coefficient used by the next EC measurement.
    TempCoefficient,
    /// Dual-point high reference.
    CalibrateRefHigh,
    /// Dual-point low reference.
    CalibrateRefLow,
    /// Dual-point high reading.
    CalibrateReadHigh,
    /// Dual-point low reading.
    CalibrateReadLow,
    /// Single-point calibration offset.
    CalibrateOffset,
    /// Salinity in PSU.
    SalinityPsu,
    /// Dry-probe reading.
    Dry,
    /// Temperature compensation constant (byte, 0xFF = use measured temperature).
    TempCompensation,
    /// Configuration bits, see [`ConfigFlags`](crate::ConfigFlags).
    Config,
    /// Command register; writing a [`Command`] starts a firmware task.
    Task,
}

impl Register {
    /// Register address on the bus.
    pub const fn addr(self) -> u8 {
        match self {
            Register::Version => 0,
            Register::Millisiemens => 1,
            Register::Temperature => 5,
            Register::K => 9,
            Register::Solution => 13,
            Register::TempCoefficient => 17,
            Register::CalibrateRefHigh => 21,
            Register::CalibrateRefLow => 25,
            Register::CalibrateReadHigh => 29,
            Register::CalibrateReadLow => 33,
            Register::CalibrateOffset => 37,
            Register::SalinityPsu => 41,
            Register::Dry => 45,
            Register::TempCompensation => 49,
            Register::Config => 50,
            Register::Task => 51,
        }
    }

    /// Payload width.
    pub const fn width(self) -> Width {
        match self {
            Register::Version | Register::TempCompensation | Register::Config | Register::Task => {
                Width::Byte
            }
            _ => Width::Float,
        }
    }
}

/// Calibration registers cleared to NaN by [`EcSalinity::reset`](crate::EcSalinity::reset),
/// in write order.
pub const CALIBRATION_REGISTERS: [Register; 7] = [
    Register::K,
    Register::CalibrateOffset,
    Register::CalibrateRefHigh,
    Register::CalibrateRefLow,
    Register::CalibrateReadHigh,
    Register::CalibrateReadLow,
    Register::Dry,
];

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Task codes written to [`Register::Task`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Command {
    MeasureEc = 80,
    MeasureTemperature = 40,
    /// Single-point calibration; result lands in the offset register.
    CalibrateProbe = 20,
    CalibrateLow = 10,
    CalibrateHigh = 8,
    CalculateK = 2,
    /// Adopt the address held in [`Register::Solution`].
    SetI2cAddress = 1,
    CalibrateDry = 82,
}

impl From<Command> for u8 {
    fn from(command: Command) -> u8 {
        command as u8
    }
}

// ---------------------------------------------------------------------------
// Protocol constants
// ---------------------------------------------------------------------------

/// Default I2C address of the probe.
pub const DEFAULT_ADDRESS: u8 = 0x3C;

/// Settle time after an EC measurement or calibration command, in ms.
pub const EC_MEASUREMENT_TIME_MS: u32 = 250;

/// Settle time after a temperature measurement command, in ms.
pub const TEMP_MEASUREMENT_TIME_MS: u32 = 750;

/// Settle time after any float register write, in ms.
pub const FLOAT_WRITE_SETTLE_MS: u32 = 3;

/// Bit index of the dual-point calibration flag in [`Register::Config`].
pub const DUAL_POINT_CONFIG_BIT: u8 = 0;

/// Bit index of the temperature compensation flag in [`Register::Config`].
pub const TEMP_COMPENSATION_CONFIG_BIT: u8 = 1;

/// Temperature coefficient for freshwater EC measurements.
pub const TEMP_COEF_EC: f32 = 0.019;

/// Temperature coefficient for seawater salinity measurements.
pub const TEMP_COEF_SALINITY: f32 = 0.021;

/// Practical salinity units to parts per thousand.
pub const PSU_TO_PPT_CONVERSION: f32 = 1.004715;

/// Temperature the firmware reports when no thermometer is attached.
pub const TEMP_DISCONNECTED_C: f32 = -127.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_registers_do_not_overlap() {
        let floats = [
            Register::Millisiemens,
            Register::Temperature,
            Register::K,
            Register::Solution,
            Register::TempCoefficient,
            Register::CalibrateRefHigh,
            Register::CalibrateRefLow,
            Register::CalibrateReadHigh,
            Register::CalibrateReadLow,
            Register::CalibrateOffset,
            Register::SalinityPsu,
            Register::Dry,
        ];

        for pair in floats.windows(2) {
            assert_eq!(pair[0].width(), Width::Float);
            assert!(pair[0].addr() + 4 <= pair[1].addr(), "{:?} overlaps {:?}", pair[0], pair[1]);
        }
        assert!(Register::Dry.addr() + 4 <= Register::TempCompensation.addr());
    }

    #[test]
    fn byte_registers() {
        assert_eq!(Register::Version.width().len(), 1);
        assert_eq!(Register::Config.addr(), 50);
        assert_eq!(Register::Task.addr(), 51);
        assert_eq!(Register::TempCompensation.width(), Width::Byte);
    }

    #[test]
    fn command_codes() {
        assert_eq!(u8::from(Command::MeasureEc), 80);
        assert_eq!(u8::from(Command::MeasureTemperature), 40);
        assert_eq!(u8::from(Command::CalibrateDry), 82);
        assert_eq!(u8::from(Command::SetI2cAddress), 1);
    }
}
