//! Async driver for the uFire EC Salinity probe.
//!
//! This crate provides an Embassy-compatible async I2C driver for the uFire
//! isolated EC Salinity probe interface. The firmware exposes a flat register
//! map: commands are written to a task register, the driver waits a fixed
//! conversion time, and results are read back as little-endian floats.
//!
//! # Architecture
//!
//! - **`driver`** (crate-private): register protocol primitives: byte and
//!   float transfers, command issue, settle waits.
//! - **[`EcSalinity`]** (public): measurements, calibration sequences,
//!   configuration flags and device administration.
//!
//! # Quick start
//!
//! ```ignore
//! use ec_salinity_driver::{EcSalinity, DEFAULT_ADDRESS};
//!
//! // Construct with any `embedded-hal-async` I2C implementation
//! let mut probe = EcSalinity::new(i2c, DEFAULT_ADDRESS);
//!
//! probe.use_temperature_compensation(true).await?;
//! let ec = probe.measure_ec().await?;
//! let temp = probe.measure_temperature().await?;
//! ```
//!
//! # Features
//!
//! - **`defmt`**: structured logging via [`defmt`] and `defmt::Format`
//!   implementations on the public types.
//! - **`shared`**: [`SharedEcSalinity`], a mutex-guarded handle for probes
//!   used from more than one task.

#![cfg_attr(not(test), no_std)]

mod calibration;
mod config;
mod driver;
mod error;
mod flags;
mod measurement;
mod probe;
mod registers;
#[cfg(feature = "shared")]
mod shared;

#[cfg(test)]
mod testing;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use calibration::{round_hundredths, CalibrationPoint, DualPointCalibration};
pub use config::DriverConfig;
pub use error::EcError;
pub use flags::{ConfigFlag, ConfigFlags};
pub use measurement::{EcMeasurement, Temperature};
pub use probe::EcSalinity;
pub use registers::{
    Command, Register, Width, CALIBRATION_REGISTERS, DEFAULT_ADDRESS, TEMP_COEF_EC,
    TEMP_COEF_SALINITY,
};
#[cfg(feature = "shared")]
pub use shared::SharedEcSalinity;
