//! Air-quality firmware: main entry point.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                   Adapters (outer ring)                   │
//! │                                                           │
//! │  I2cTransport ─▶ Bme69xDriver     Bsec      MonotonicClock│
//! │  (BusTransport)  (SensorDriver)   (Fusion)  (Clock)       │
//! │  LogTelemetrySink × 7             LogEventSink            │
//! │                                                           │
//! │  ──────────────── Port Trait Boundary ────────────────    │
//! │                                                           │
//! │  ┌─────────────────────────────────────────────────────┐  │
//! │  │        UpdateOrchestrator (setup · update)          │  │
//! │  └─────────────────────────────────────────────────────┘  │
//! └───────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_hal::delay::{Ets, FreeRtos};
use esp_idf_hal::gpio::AnyIOPin;
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::units::Hertz;
use log::{info, warn};

use bme68x_bsec2::adapters::i2c::I2cTransport;
use bme68x_bsec2::adapters::log_sink::{LogEventSink, LogTelemetrySink};
use bme68x_bsec2::adapters::time::MonotonicClock;
use bme68x_bsec2::app::bindings::{SensorBindings, TelemetryRole};
use bme68x_bsec2::app::service::{ComponentState, UpdateOrchestrator};
use bme68x_bsec2::config::ComponentConfig;
use bme68x_bsec2::drivers::bme69x::Bme69xDriver;
use bme68x_bsec2::drivers::bsec::Bsec;
use bme68x_bsec2::pins;

/// Optional JSON configuration baked in at build time.
const CONFIG_JSON: Option<&str> = option_env!("COMPONENT_CONFIG_JSON");

fn load_config() -> ComponentConfig {
    match CONFIG_JSON.map(ComponentConfig::from_json) {
        Some(Ok(cfg)) => cfg,
        Some(Err(e)) => {
            warn!("Invalid COMPONENT_CONFIG_JSON ({}), using defaults", e);
            ComponentConfig::default()
        }
        None => ComponentConfig::default(),
    }
}

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  bme68x-bsec2 v{}                  ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let config = load_config();
    info!(
        "Config: model={} addr=0x{:02X} interval={}ms rate={:?}",
        config.model, config.i2c_address, config.update_interval_ms, config.sample_rate
    );

    // ── 3. I2C bus ────────────────────────────────────────────
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
    let transport = I2cTransport::new(bus, Ets, config.i2c_address);

    // ── 4. Component ──────────────────────────────────────────
    let mut bindings = SensorBindings::new();
    for role in TelemetryRole::ALL {
        bindings.bind(role, Box::new(LogTelemetrySink::new(role)));
    }

    let interval_ms = config.update_interval_ms;
    let mut component = UpdateOrchestrator::new(
        Bme69xDriver::new(transport),
        Bsec::new(),
        MonotonicClock::new(),
        config,
        bindings,
    );
    let mut events = LogEventSink::new();

    // ── 5. Poll loop ──────────────────────────────────────────
    loop {
        if component.state() == ComponentState::Uninitialized {
            // Retried every interval; a sensor plugged in late comes up.
            if component.setup(&mut events).is_err() {
                FreeRtos::delay_ms(interval_ms);
                continue;
            }
        }

        // Failures are counted and logged by the component itself.
        let _ = component.update(&mut events);
        FreeRtos::delay_ms(interval_ms);
    }
}
