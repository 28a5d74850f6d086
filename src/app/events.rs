//! Outbound component events.
//!
//! The [`UpdateOrchestrator`](super::service::UpdateOrchestrator) emits these
//! through the [`EventSink`](super::ports::EventSink) port. Adapters on the
//! other side decide what to do with them: log to serial or bump a host
//! diagnostic sensor.

use crate::config::SensorModel;
use crate::error::{Error, SetupError};
use crate::sensors::ReadingStatus;

#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Setup completed; the component is polling.
    Ready(SensorModel),

    /// Setup failed; the component stays uninitialised.
    SetupFailed(SetupError),

    /// A reading was taken and its raw fields published.
    Sampled(TelemetryData),

    /// The driver answered but had no new measurement.
    NoNewData,

    /// A tick was abandoned before completing.
    TickAborted { error: Error, consecutive: u32 },

    /// A tick succeeded after `after` consecutive aborts.
    Recovered { after: u32 },
}

/// Raw values of one reading, in published units.
#[derive(Debug, Clone, Copy)]
pub struct TelemetryData {
    pub temperature_c: f32,
    pub humidity_pct: f32,
    pub pressure_hpa: f32,
    pub gas_resistance_ohm: f32,
    pub status: ReadingStatus,
}
