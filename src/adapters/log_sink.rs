//! Log-based sink adapters.
//!
//! [`LogEventSink`] writes structured component events to the ESP-IDF
//! logger (UART / USB-CDC in production). [`LogTelemetrySink`] does the
//! same for one published quantity, so a bare board shows every value on
//! the console without a host framework attached.

use log::{info, warn};

use crate::app::bindings::TelemetryRole;
use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, TelemetrySink};

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Ready(model) => {
                info!("READY | model={}", model);
            }
            AppEvent::SetupFailed(e) => {
                warn!("SETUP | failed: {}", e);
            }
            AppEvent::Sampled(t) => {
                info!(
                    "SAMPLE | T={:.2}\u{00b0}C | RH={:.2}% | P={:.2}hPa | gas={:.0}\u{03a9} | \
                     status=0b{:08b}",
                    t.temperature_c,
                    t.humidity_pct,
                    t.pressure_hpa,
                    t.gas_resistance_ohm,
                    t.status.bits(),
                );
            }
            AppEvent::NoNewData => {
                info!("SAMPLE | no new data");
            }
            AppEvent::TickAborted { error, consecutive } => {
                warn!("ABORT | {} | streak={}", error, consecutive);
            }
            AppEvent::Recovered { after } => {
                info!("RECOVER | after {} failed tick(s)", after);
            }
        }
    }
}

/// Logs each published value of one role.
#[derive(Debug, Clone, Copy)]
pub struct LogTelemetrySink {
    role: TelemetryRole,
}

impl LogTelemetrySink {
    pub fn new(role: TelemetryRole) -> Self {
        Self { role }
    }

    pub fn role(&self) -> TelemetryRole {
        self.role
    }
}

impl TelemetrySink for LogTelemetrySink {
    fn publish(&mut self, value: f32) {
        info!("TELEM | {}={:.2}{}", self.role, value, self.role.unit());
    }
}
