//! Mutex-guarded probe handle for multi-task firmware.
//!
//! Bus-level sharing (e.g. `I2cDevice` from embassy-embedded-hal) only
//! serialises single transfers. A measurement or calibration is a sequence
//! of transfers around a settle wait, so two tasks driving the same probe
//! must also serialise whole sequences. Lock the handle for the full
//! operation:
//!
//! ```ignore
//! static PROBE: StaticCell<SharedEcSalinity<CriticalSectionRawMutex, ProbeI2c>> =
//!     StaticCell::new();
//!
//! let probe = PROBE.init(Mutex::new(EcSalinity::new(i2c_probe, DEFAULT_ADDRESS)));
//!
//! // In a task:
//! let ec = probe.lock().await.measure_ec().await?;
//! ```

use embassy_sync::mutex::Mutex;
use embassy_time::Delay;

use crate::probe::EcSalinity;

/// An [`EcSalinity`] behind an `embassy-sync` mutex.
///
/// `M` is the raw mutex flavour, usually `CriticalSectionRawMutex` when
/// tasks run on different executors or interrupt priorities and
/// `NoopRawMutex` within one executor.
pub type SharedEcSalinity<M, I2C, D = Delay> = Mutex<M, EcSalinity<I2C, D>>;
