//! Update orchestrator: the component core.
//!
//! [`UpdateOrchestrator`] owns the sensor driver, the fusion engine, a clock,
//! and the sink bindings. Each `update()` runs one sample → publish → fuse →
//! publish cycle to completion on the caller's thread.
//!
//! ```text
//!  SensorDriver ──▶ ┌──────────────────────┐ ──▶ raw sinks (T, RH, P, gas)
//!                   │  UpdateOrchestrator  │
//!  FusionEngine ◀──▶│  setup · update      │ ──▶ fused sinks (IAQ, CO2e, bVOCe)
//!                   └──────────────────────┘ ──▶ EventSink
//! ```

use log::{debug, error, info, warn};

use crate::config::{ComponentConfig, SensorModel};
use crate::diagnostics::UpdateStats;
use crate::error::{Error, Result, SetupError};
use crate::sensors::fusion::build_inputs;
use crate::sensors::{FusionOutputs, OperatingMode, OutputKind, Reading};

use super::bindings::{SensorBindings, TelemetryRole};
use super::events::{AppEvent, TelemetryData};
use super::ports::{Clock, EventSink, FusionEngine, SensorDriver};

/// Lifecycle of the component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentState {
    /// Before a successful `setup()`, or after `shutdown()`.
    Uninitialized,
    Ready,
}

/// Result of one completed tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A reading was taken; `raw` and `fused` count delivered publishes.
    Published { raw: u8, fused: u8 },
    /// The driver succeeded but reported no new fields.
    NoNewData,
}

pub struct UpdateOrchestrator<D, F, C> {
    driver: D,
    fusion: F,
    clock: C,
    config: ComponentConfig,
    bindings: SensorBindings,
    state: ComponentState,
    stats: UpdateStats,
    /// Last fusion timestamp handed out; inputs never go backwards.
    last_timestamp_us: u64,
    outputs: FusionOutputs,
}

impl<D, F, C> UpdateOrchestrator<D, F, C>
where
    D: SensorDriver,
    F: FusionEngine,
    C: Clock,
{
    /// Assemble the component. Nothing touches hardware until [`setup`](Self::setup).
    pub fn new(
        driver: D,
        fusion: F,
        clock: C,
        config: ComponentConfig,
        bindings: SensorBindings,
    ) -> Self {
        Self {
            driver,
            fusion,
            clock,
            config,
            bindings,
            state: ComponentState::Uninitialized,
            stats: UpdateStats::new(),
            last_timestamp_us: 0,
            outputs: FusionOutputs::new(),
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Initialise the driver and fusion engine and apply the configured
    /// sensor profile.
    pub fn setup(&mut self, events: &mut impl EventSink) -> core::result::Result<(), SetupError> {
        info!(
            "Initializing {} at 0x{:02X}",
            self.config.model, self.config.i2c_address
        );
        match self.bring_up() {
            Ok(()) => {
                self.state = ComponentState::Ready;
                info!(
                    "{} ready ({} sink(s) bound, polling every {} ms)",
                    self.config.model,
                    self.bindings.bound_count(),
                    self.config.update_interval_ms
                );
                events.emit(&AppEvent::Ready(self.config.model));
                Ok(())
            }
            Err(e) => {
                self.state = ComponentState::Uninitialized;
                error!("{} setup failed: {}", self.config.model, e);
                events.emit(&AppEvent::SetupFailed(e));
                Err(e)
            }
        }
    }

    fn bring_up(&mut self) -> core::result::Result<(), SetupError> {
        self.driver.init().map_err(SetupError::HardwareNotFound)?;
        self.driver
            .set_config(&self.config.sensor)
            .map_err(SetupError::ConfigurationRejected)?;
        self.driver
            .set_heater_config(OperatingMode::Forced, &self.config.heater)
            .map_err(SetupError::ConfigurationRejected)?;

        info!("Initializing fusion engine");
        self.fusion.init().map_err(SetupError::FusionRejected)?;

        let mut wanted: heapless::Vec<OutputKind, 3> = heapless::Vec::new();
        for role in TelemetryRole::FUSED {
            if let Some(kind) = role.output_kind().filter(|_| self.bindings.is_bound(role)) {
                let _ = wanted.push(kind);
            }
        }
        if !wanted.is_empty() {
            self.fusion
                .subscribe(&wanted, self.config.sample_rate)
                .map_err(SetupError::FusionRejected)?;
        }
        Ok(())
    }

    /// Release the driver and return to [`ComponentState::Uninitialized`].
    pub fn shutdown(&mut self) -> core::result::Result<(), crate::error::DriverError> {
        self.state = ComponentState::Uninitialized;
        self.driver.deinit()
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one sample → publish → fuse → publish cycle.
    ///
    /// Any driver or fusion failure abandons the rest of the tick; it is
    /// counted in [`stats`](Self::stats), logged, and emitted as
    /// [`AppEvent::TickAborted`].
    pub fn update(&mut self, events: &mut impl EventSink) -> Result<TickOutcome> {
        match self.run_tick(events) {
            Ok(TickOutcome::NoNewData) => {
                self.stats.record_no_data();
                debug!("No new data this tick");
                events.emit(&AppEvent::NoNewData);
                Ok(TickOutcome::NoNewData)
            }
            Ok(outcome) => {
                let streak = self.stats.record_published();
                if streak > 0 {
                    info!("Sensor recovered after {} failed tick(s)", streak);
                    events.emit(&AppEvent::Recovered { after: streak });
                }
                Ok(outcome)
            }
            Err(e) => {
                let consecutive = self.stats.record_abort(e);
                warn!("Tick aborted: {} ({} in a row)", e, consecutive);
                events.emit(&AppEvent::TickAborted {
                    error: e,
                    consecutive,
                });
                Err(e)
            }
        }
    }

    fn run_tick(&mut self, events: &mut impl EventSink) -> Result<TickOutcome> {
        if self.state != ComponentState::Ready {
            return Err(Error::NotReady);
        }

        let reading = self.sample()?;
        if !reading.has_data() {
            return Ok(TickOutcome::NoNewData);
        }

        let raw = self.publish_raw(&reading);
        events.emit(&AppEvent::Sampled(TelemetryData {
            temperature_c: reading.temperature,
            humidity_pct: reading.humidity,
            pressure_hpa: reading.pressure_hpa(),
            gas_resistance_ohm: reading.gas_resistance,
            status: reading.status,
        }));

        let timestamp_us = self.next_timestamp();
        let inputs = build_inputs(&reading, timestamp_us);
        self.fusion.step(&inputs, &mut self.outputs)?;
        let fused = self.publish_fused();

        Ok(TickOutcome::Published { raw, fused })
    }

    /// Trigger a forced measurement, wait for it, and read it out.
    fn sample(&mut self) -> Result<Reading> {
        let mode = OperatingMode::Forced;
        self.driver.set_operating_mode(mode)?;
        let meas_us = self.driver.measurement_duration_us(mode, &self.config.sensor);
        let settle_us = self.config.heater.settling_delay_us(meas_us);
        self.driver.delay_us(settle_us);
        Ok(self.driver.get_data(mode)?)
    }

    fn publish_raw(&mut self, reading: &Reading) -> u8 {
        let fields = [
            (TelemetryRole::Temperature, reading.temperature),
            (TelemetryRole::Humidity, reading.humidity),
            (TelemetryRole::Pressure, reading.pressure_hpa()),
            (TelemetryRole::GasResistance, reading.gas_resistance),
        ];
        let mut delivered = 0;
        for (role, value) in fields {
            if self.bindings.publish(role, value) {
                delivered += 1;
            }
        }
        delivered
    }

    fn publish_fused(&mut self) -> u8 {
        let mut seen: heapless::Vec<TelemetryRole, 3> = heapless::Vec::new();
        let mut delivered = 0;
        for out in &self.outputs {
            let Some(role) = TelemetryRole::for_output(out.kind) else {
                debug!("Dropping fusion output {:?} = {}", out.kind, out.value);
                continue;
            };
            if seen.contains(&role) {
                continue;
            }
            let _ = seen.push(role);
            if self.bindings.publish(role, out.value) {
                debug!("{} = {} (accuracy {})", role, out.value, out.accuracy);
                delivered += 1;
            }
        }
        delivered
    }

    fn next_timestamp(&mut self) -> u64 {
        let now = self.clock.now_us().max(self.last_timestamp_us);
        self.last_timestamp_us = now;
        now
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> ComponentState {
        self.state
    }

    pub fn stats(&self) -> &UpdateStats {
        &self.stats
    }

    pub fn model(&self) -> SensorModel {
        self.config.model
    }

    pub fn config(&self) -> &ComponentConfig {
        &self.config
    }

    /// Rebind sinks. Fused-output subscriptions follow the bindings at
    /// `setup()` time, so bind before calling it.
    pub fn bindings_mut(&mut self) -> &mut SensorBindings {
        &mut self.bindings
    }

    /// Timestamp handed to the fusion engine on the most recent tick.
    pub fn last_timestamp_us(&self) -> u64 {
        self.last_timestamp_us
    }
}
