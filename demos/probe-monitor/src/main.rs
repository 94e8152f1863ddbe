//! probe-monitor
//!
//! Periodic EC and temperature logging for the Raspberry Pi Pico 2 with a
//! uFire EC Salinity probe on I2C0.
//!
//! 1. At boot the probe's version is checked and temperature compensation
//!    is enabled.
//! 2. The sampler task locks the shared probe, measures temperature and
//!    conductivity, and logs both via defmt.
//! 3. The status task periodically reads back the stored calibration so a
//!    probe that was never calibrated shows up in the log.
//!
//! # Wiring
//!
//! | Signal    | Pico 2 Pin |
//! |-----------|------------|
//! | I2C0 SDA  | GP20       |
//! | I2C0 SCL  | GP21       |

#![no_std]
#![no_main]

use defmt::*;
use embassy_embedded_hal::shared_bus::asynch::i2c::I2cDevice;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::block::ImageDef;
use embassy_rp::i2c::{self, I2c};
use embassy_rp::peripherals::I2C0;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::{Duration, Timer};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use ec_salinity_driver::{EcSalinity, SharedEcSalinity, DEFAULT_ADDRESS};

// ---------------------------------------------------------------------------
// Boot block and interrupt binding
// ---------------------------------------------------------------------------

/// Tell the RP2350 Boot ROM about our application.
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = embassy_rp::block::ImageDef::secure_exe();

bind_interrupts!(struct Irqs {
    I2C0_IRQ => i2c::InterruptHandler<I2C0>;
});

// ---------------------------------------------------------------------------
// Static storage
// ---------------------------------------------------------------------------

/// Shared I2C0 bus. Other sensors can join it with their own I2cDevice.
static I2C_BUS: StaticCell<Mutex<CriticalSectionRawMutex, I2c<'static, I2C0, i2c::Async>>> =
    StaticCell::new();

/// The probe, locked for whole measurement and calibration sequences.
static PROBE: StaticCell<SharedEcSalinity<CriticalSectionRawMutex, ProbeI2c>> =
    StaticCell::new();

type ProbeI2c = I2cDevice<'static, CriticalSectionRawMutex, I2c<'static, I2C0, i2c::Async>>;

type Probe = SharedEcSalinity<CriticalSectionRawMutex, ProbeI2c>;

const SAMPLE_PERIOD: Duration = Duration::from_secs(5);
const STATUS_PERIOD: Duration = Duration::from_secs(60);

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

#[embassy_executor::task]
async fn sampler_task(probe: &'static Probe) {
    info!("Sampler task started");

    loop {
        // Both measurements under one lock so the status task cannot slip a
        // register sequence in between.
        let result = {
            let mut probe = probe.lock().await;
            match probe.measure_temperature().await {
                Ok(temp) => probe.measure_ec().await.map(|ec| (temp, ec)),
                Err(e) => Err(e),
            }
        };

        match result {
            Ok((temp, ec)) => {
                if !temp.is_probe_connected() {
                    warn!("No thermometer attached");
                }
                info!(
                    "{} C, {} mS, {} uS, {} PSU",
                    temp.celsius, ec.ms, ec.us, ec.salinity_psu
                );
            }
            Err(e) => error!("Measurement failed: {}", e),
        }

        Timer::after(SAMPLE_PERIOD).await;
    }
}

#[embassy_executor::task]
async fn status_task(probe: &'static Probe) {
    loop {
        Timer::after(STATUS_PERIOD).await;

        let mut probe = probe.lock().await;
        match probe.k().await {
            Ok(k) if k.is_nan() => warn!("Probe has no cell constant; calibrate it"),
            Ok(k) => info!("Cell constant K = {}", k),
            Err(e) => error!("Status read failed: {}", e),
        }
        match probe.dual_point_calibration().await {
            Ok(points) if !points.is_unset() => debug!("Dual-point calibration: {}", points),
            Ok(_) => {}
            Err(e) => error!("Status read failed: {}", e),
        }
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Default::default());
    info!("probe-monitor starting");

    let i2c = I2c::new_async(
        p.I2C0,
        p.PIN_21, // SCL
        p.PIN_20, // SDA
        Irqs,
        i2c::Config::default(),
    );
    let i2c_bus = I2C_BUS.init(Mutex::new(i2c));

    let mut ec_probe = EcSalinity::new(I2cDevice::new(i2c_bus), DEFAULT_ADDRESS);

    match ec_probe.version().await {
        Ok(0xFF) => warn!("No EC probe at {=u8:#x}", DEFAULT_ADDRESS),
        Ok(version) => info!("EC probe version {=u8:#x}", version),
        Err(e) => error!("EC probe not responding: {}", e),
    }

    if let Err(e) = ec_probe.use_temperature_compensation(true).await {
        warn!("Could not enable temperature compensation: {}", e);
    }

    let probe = PROBE.init(Mutex::new(ec_probe));

    spawner.spawn(sampler_task(probe).unwrap());
    spawner.spawn(status_task(probe).unwrap());

    info!("All tasks spawned");
}
