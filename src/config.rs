//! Driver configuration.

use crate::registers::{
    DEFAULT_ADDRESS, EC_MEASUREMENT_TIME_MS, FLOAT_WRITE_SETTLE_MS, TEMP_MEASUREMENT_TIME_MS,
};

/// Bus address and settle timings for one probe.
///
/// The probe has no ready signal, so each settle time must be at least the
/// firmware's real conversion time. [`DriverConfig::default()`] reproduces
/// the documented firmware timings at the factory address.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DriverConfig {
    /// 7-bit I2C address. Default: 0x3C.
    pub address: u8,
    /// Wait after an EC measurement or calibration command. Default: 250 ms.
    pub ec_measurement_ms: u32,
    /// Wait after a temperature measurement command. Default: 750 ms.
    pub temp_measurement_ms: u32,
    /// Wait after every float register write. Default: 3 ms.
    pub float_write_settle_ms: u32,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS,
            ec_measurement_ms: EC_MEASUREMENT_TIME_MS,
            temp_measurement_ms: TEMP_MEASUREMENT_TIME_MS,
            float_write_settle_ms: FLOAT_WRITE_SETTLE_MS,
        }
    }
}

impl DriverConfig {
    /// Default timings at a non-default address.
    pub fn at_address(address: u8) -> Self {
        Self {
            address,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_firmware_timings() {
        let config = DriverConfig::default();
        assert_eq!(config.address, 0x3C);
        assert_eq!(config.ec_measurement_ms, 250);
        assert_eq!(config.temp_measurement_ms, 750);
        assert_eq!(config.float_write_settle_ms, 3);
    }

    #[test]
    fn at_address_keeps_timings() {
        let config = DriverConfig::at_address(0x3D);
        assert_eq!(config.address, 0x3D);
        assert_eq!(config.ec_measurement_ms, 250);
    }
}
