//! On-target sensor self-test.
//!
//! Runs the built-in self-test and a forced-mode sampling scenario against
//! the real sensor, each with a heap leak check, and prints the samples as
//! CSV. Exits after reporting; flash the main firmware afterwards.
#![deny(unused_must_use)]

use anyhow::{Result, bail};
use esp_idf_hal::delay::Ets;
use esp_idf_hal::gpio::AnyIOPin;
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::units::Hertz;
use log::{error, info};

use bme68x_bsec2::adapters::i2c::I2cTransport;
use bme68x_bsec2::adapters::time::MonotonicClock;
use bme68x_bsec2::config::ComponentConfig;
use bme68x_bsec2::diagnostics::SystemHeap;
use bme68x_bsec2::drivers::bme69x::Bme69xDriver;
use bme68x_bsec2::pins;
use bme68x_bsec2::selftest::{CSV_HEADER, DEFAULT_SAMPLE_COUNT, SelfTestHarness};

fn main() -> Result<()> {
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    let config = ComponentConfig::default();
    info!("BME69X TEST");
    info!("I2C address 0x{:02X}", config.i2c_address);
    info!("I2C SDA GPIO {}", pins::I2C_SDA_GPIO);
    info!("I2C SCL GPIO {}", pins::I2C_SCL_GPIO);

    let peripherals = Peripherals::take()?;
    // SAFETY: board pins from `pins`, not claimed anywhere else.
    let (sda, scl) = unsafe {
        (
            AnyIOPin::new(pins::I2C_SDA_GPIO),
            AnyIOPin::new(pins::I2C_SCL_GPIO),
        )
    };
    let i2c_config = I2cConfig::new().baudrate(Hertz(pins::I2C_FREQ_HZ));
    let bus = I2cDriver::new(peripherals.i2c0, sda, scl, &i2c_config)?;
    let mut driver = Bme69xDriver::new(I2cTransport::new(bus, Ets, config.i2c_address));

    let harness = SelfTestHarness::new(SystemHeap);
    let clock = MonotonicClock::new();
    let mut failures = 0u32;

    match harness.run_self_test(&mut driver) {
        Ok(report) => info!("PASS: {} (heap {:?})", report.name, report.heap),
        Err(e) => {
            error!("FAIL: self_test: {}", e);
            failures += 1;
        }
    }

    info!("{}", CSV_HEADER);
    match harness.run_forced_mode(&mut driver, &config, DEFAULT_SAMPLE_COUNT, &clock, |row| {
        info!("{}", row);
    }) {
        Ok(report) => info!(
            "PASS: {} ({} samples, heap {:?})",
            report.name, report.samples, report.heap
        ),
        Err(e) => {
            error!("FAIL: forced_mode: {}", e);
            failures += 1;
        }
    }

    if failures > 0 {
        bail!("{} scenario(s) failed", failures);
    }
    info!("All scenarios passed");
    Ok(())
}
