//! Optional telemetry sink per published quantity.
//!
//! The host binds zero or more sinks before `setup()`. Publishing to a role
//! with no sink is a no-op, so the update cycle never has to check.

use core::fmt;

use crate::sensors::OutputKind;

use super::ports::TelemetrySink;

/// Quantity a sink is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TelemetryRole {
    Temperature,
    Humidity,
    Pressure,
    GasResistance,
    Iaq,
    Co2Equivalent,
    BreathVocEquivalent,
}

const ROLE_COUNT: usize = 7;

impl TelemetryRole {
    pub const ALL: [Self; ROLE_COUNT] = [
        Self::Temperature,
        Self::Humidity,
        Self::Pressure,
        Self::GasResistance,
        Self::Iaq,
        Self::Co2Equivalent,
        Self::BreathVocEquivalent,
    ];

    /// Roles fed by the fusion engine rather than the raw reading.
    pub const FUSED: [Self; 3] = [Self::Iaq, Self::Co2Equivalent, Self::BreathVocEquivalent];

    /// Display name of the role, as shown in telemetry logs.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::Humidity => "humidity",
            Self::Pressure => "pressure",
            Self::GasResistance => "gas_resistance",
            Self::Iaq => "iaq",
            Self::Co2Equivalent => "co2_equivalent",
            Self::BreathVocEquivalent => "breath_voc_equivalent",
        }
    }

    /// Unit suffix for log output.
    pub const fn unit(self) -> &'static str {
        match self {
            Self::Temperature => "°C",
            Self::Humidity => "%",
            Self::Pressure => "hPa",
            Self::GasResistance => "Ω",
            Self::Iaq => "",
            Self::Co2Equivalent | Self::BreathVocEquivalent => "ppm",
        }
    }

    /// The sink role a fusion output is published under, if any.
    pub const fn for_output(kind: OutputKind) -> Option<Self> {
        match kind {
            OutputKind::Iaq => Some(Self::Iaq),
            OutputKind::Co2Equivalent => Some(Self::Co2Equivalent),
            OutputKind::BreathVocEquivalent => Some(Self::BreathVocEquivalent),
            _ => None,
        }
    }

    /// The fusion output feeding this role, for fused roles.
    pub const fn output_kind(self) -> Option<OutputKind> {
        match self {
            Self::Iaq => Some(OutputKind::Iaq),
            Self::Co2Equivalent => Some(OutputKind::Co2Equivalent),
            Self::BreathVocEquivalent => Some(OutputKind::BreathVocEquivalent),
            _ => None,
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for TelemetryRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One optional sink slot per [`TelemetryRole`].
#[derive(Default)]
pub struct SensorBindings {
    slots: [Option<Box<dyn TelemetrySink>>; ROLE_COUNT],
}

impl SensorBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `sink` to `role`, returning the sink it replaces.
    pub fn bind(
        &mut self,
        role: TelemetryRole,
        sink: Box<dyn TelemetrySink>,
    ) -> Option<Box<dyn TelemetrySink>> {
        self.slots[role.index()].replace(sink)
    }

    /// Builder form of [`bind`](Self::bind).
    #[must_use]
    pub fn with(mut self, role: TelemetryRole, sink: impl TelemetrySink + 'static) -> Self {
        self.slots[role.index()] = Some(Box::new(sink));
        self
    }

    pub fn unbind(&mut self, role: TelemetryRole) -> Option<Box<dyn TelemetrySink>> {
        self.slots[role.index()].take()
    }

    pub fn is_bound(&self, role: TelemetryRole) -> bool {
        self.slots[role.index()].is_some()
    }

    /// Number of roles with a sink.
    pub fn bound_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Publish `value` to the role's sink. Returns `false` if none is bound.
    pub fn publish(&mut self, role: TelemetryRole, value: f32) -> bool {
        match self.slots[role.index()].as_mut() {
            Some(sink) => {
                sink.publish(value);
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for SensorBindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        for role in TelemetryRole::ALL {
            if self.is_bound(role) {
                list.entry(&role.key());
            }
        }
        list.finish()
    }
}
