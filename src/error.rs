//! Error types for the EC Salinity driver.

use core::fmt;

/// Errors that can occur when communicating with the probe.
///
/// There is no read validation: a glitched transfer decodes to a wrong value
/// rather than an error, and NaN read back from a calibration register is the
/// firmware's "never calibrated" marker, not a failure.
#[derive(Debug)]
pub enum EcError<E> {
    /// Underlying I2C bus error. Not retried.
    I2c(E),

    /// The operation would leave the handle unable to address the device,
    /// e.g. a new bus address outside the 7-bit range.
    InvalidState,
}

// Allow ergonomic `?` propagation from raw I2C errors.
impl<E> From<E> for EcError<E> {
    fn from(error: E) -> Self {
        EcError::I2c(error)
    }
}

impl<E: fmt::Debug> fmt::Display for EcError<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EcError::I2c(e) => write!(f, "I2C error: {:?}", e),
            EcError::InvalidState => write!(f, "Invalid device state"),
        }
    }
}

#[cfg(feature = "defmt")]
impl<E: defmt::Format> defmt::Format for EcError<E> {
    fn format(&self, f: defmt::Formatter) {
        match self {
            EcError::I2c(e) => defmt::write!(f, "I2C error: {}", e),
            EcError::InvalidState => defmt::write!(f, "Invalid device state"),
        }
    }
}
