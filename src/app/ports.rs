//! Port traits at the boundary between the update cycle and the outside world.
//!
//! ```text
//!   BusTransport ──▶ SensorDriver ──┐
//!                                   ├──▶ UpdateOrchestrator ──▶ TelemetrySink × 7
//!                   FusionEngine ───┘            │
//!                   Clock ───────────────────────┘──────────▶ EventSink
//! ```
//!
//! The vendor driver and fusion library sit behind [`SensorDriver`] and
//! [`FusionEngine`]; the orchestrator consumes them via generics, so the
//! update cycle is testable with scripted mocks on the host.

use crate::error::{DriverError, FusionError, TransportError};
use crate::sensors::{
    FusionInput, FusionOutputs, HeaterConfig, OperatingMode, OutputKind, Reading, SampleRate,
    SensorSettings,
};

use super::events::AppEvent;

// ───────────────────────────────────────────────────────────────
// Bus transport (consumed by the sensor driver)
// ───────────────────────────────────────────────────────────────

/// Register-level access to the sensor plus the settling-delay primitive.
pub trait BusTransport {
    /// Burst-read `buf.len()` bytes starting at `reg`.
    fn read(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), TransportError>;

    /// Write `data` starting at `reg`.
    fn write(&mut self, reg: u8, data: &[u8]) -> Result<(), TransportError>;

    /// Block for at least `period_us` microseconds.
    fn delay_us(&mut self, period_us: u32);
}

// ───────────────────────────────────────────────────────────────
// Sensor driver (vendor library)
// ───────────────────────────────────────────────────────────────

/// The vendor sensor driver, bound to a [`BusTransport`] at construction.
pub trait SensorDriver {
    /// Bind the transport, read the chip id and calibration data.
    fn init(&mut self) -> Result<(), DriverError>;

    fn set_config(&mut self, settings: &SensorSettings) -> Result<(), DriverError>;

    fn set_heater_config(
        &mut self,
        mode: OperatingMode,
        heater: &HeaterConfig,
    ) -> Result<(), DriverError>;

    fn set_operating_mode(&mut self, mode: OperatingMode) -> Result<(), DriverError>;

    /// TPH conversion time for `settings`, excluding the heater phase.
    fn measurement_duration_us(&mut self, mode: OperatingMode, settings: &SensorSettings) -> u32;

    /// Read out the latest measurement. `n_fields == 0` means no new data.
    fn get_data(&mut self, mode: OperatingMode) -> Result<Reading, DriverError>;

    fn self_test(&mut self) -> Result<(), DriverError>;

    /// Soft-reset the sensor and release the driver handle.
    fn deinit(&mut self) -> Result<(), DriverError>;

    /// Forward to the bound transport's delay primitive.
    fn delay_us(&mut self, period_us: u32);
}

// ───────────────────────────────────────────────────────────────
// Fusion engine (vendor library)
// ───────────────────────────────────────────────────────────────

/// The closed-source fusion library.
pub trait FusionEngine {
    fn init(&mut self) -> Result<(), FusionError>;

    /// Request `outputs` at `rate`. Outputs never subscribed are never produced.
    fn subscribe(&mut self, outputs: &[OutputKind], rate: SampleRate) -> Result<(), FusionError>;

    /// Feed one tick of inputs. `outputs` is cleared and refilled with
    /// whatever the engine decided is due this tick (possibly nothing).
    fn step(&mut self, inputs: &[FusionInput], outputs: &mut FusionOutputs)
    -> Result<(), FusionError>;
}

// ───────────────────────────────────────────────────────────────
// Telemetry sink (driven adapter: component → host framework)
// ───────────────────────────────────────────────────────────────

/// A host-provided publish target for one numeric quantity.
pub trait TelemetrySink {
    fn publish(&mut self, value: f32);
}

// ───────────────────────────────────────────────────────────────
// Clock
// ───────────────────────────────────────────────────────────────

/// Monotonic microsecond clock used to stamp fusion inputs.
pub trait Clock {
    fn now_us(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Event sink (driven adapter: component → logging / diagnostics)
// ───────────────────────────────────────────────────────────────

/// The orchestrator emits structured [`AppEvent`]s through this port.
pub trait EventSink {
    fn emit(&mut self, event: &AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Heap probe (self-test leak check)
// ───────────────────────────────────────────────────────────────

/// Heap capability classes sampled around each self-test scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeapClass {
    /// Byte-addressable memory.
    Byte8,
    /// Word-addressable memory.
    Word32,
}

pub trait HeapProbe {
    /// Free bytes currently available in `class`.
    fn free_bytes(&self, class: HeapClass) -> usize;
}
