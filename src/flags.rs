//! Typed view of the probe's configuration byte.
//!
//! Bit 0 enables dual-point calibration, bit 1 enables temperature
//! compensation. The remaining bits are reserved by the firmware and must be
//! written back exactly as they were read.

use crate::registers::{DUAL_POINT_CONFIG_BIT, TEMP_COMPENSATION_CONFIG_BIT};

/// A named bit in [`Register::Config`](crate::Register::Config).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigFlag {
    /// Correct readings against the stored low/high calibration points.
    DualPointCalibration,
    /// Compensate EC readings for temperature.
    TemperatureCompensation,
}

impl ConfigFlag {
    const fn mask(self) -> u8 {
        match self {
            ConfigFlag::DualPointCalibration => 1 << DUAL_POINT_CONFIG_BIT,
            ConfigFlag::TemperatureCompensation => 1 << TEMP_COMPENSATION_CONFIG_BIT,
        }
    }
}

/// Raw contents of the configuration register, reserved bits included.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConfigFlags(u8);

impl ConfigFlags {
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Returns `true` if `flag` is set.
    pub const fn contains(self, flag: ConfigFlag) -> bool {
        self.0 & flag.mask() != 0
    }

    /// Returns a copy with only `flag` changed.
    #[must_use]
    pub const fn with(self, flag: ConfigFlag, enabled: bool) -> Self {
        let cleared = self.0 & !flag.mask();
        if enabled {
            Self(cleared | flag.mask())
        } else {
            Self(cleared)
        }
    }

    pub const fn dual_point_calibration(self) -> bool {
        self.contains(ConfigFlag::DualPointCalibration)
    }

    pub const fn temperature_compensation(self) -> bool {
        self.contains(ConfigFlag::TemperatureCompensation)
    }
}

impl From<u8> for ConfigFlags {
    fn from(bits: u8) -> Self {
        Self(bits)
    }
}

impl From<ConfigFlags> for u8 {
    fn from(flags: ConfigFlags) -> u8 {
        flags.0
    }
}
