//! Fusion-engine signal types and the per-tick input frame.
//!
//! The engine consumes time-stamped physical inputs and emits derived
//! virtual signals. Ids below are the library's sensor ids; they only
//! matter at the FFI boundary but live here so the mapping is testable
//! on the host.

use serde::{Deserialize, Serialize};

use super::reading::Reading;

/// Upper bound on outputs returned by one `step()` call.
pub const MAX_FUSION_OUTPUTS: usize = 30;

/// Number of inputs built per tick.
pub const FUSION_INPUTS_PER_TICK: usize = 3;

pub type FusionOutputs = heapless::Vec<FusionOutput, MAX_FUSION_OUTPUTS>;

/// Physical input signals fed into the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Temperature,
    Humidity,
    GasResistor,
}

impl InputKind {
    pub const fn id(self) -> u8 {
        match self {
            Self::Humidity => 4,
            Self::Temperature => 6,
            Self::GasResistor => 7,
        }
    }
}

/// Virtual signals the engine can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Iaq,
    StaticIaq,
    Co2Equivalent,
    BreathVocEquivalent,
    StabilizationStatus,
    RunInStatus,
    CompensatedTemperature,
    CompensatedHumidity,
    GasPercentage,
    /// An id this crate has no name for.
    Other(u8),
}

impl OutputKind {
    pub const fn from_id(id: u8) -> Self {
        match id {
            1 => Self::Iaq,
            2 => Self::StaticIaq,
            3 => Self::Co2Equivalent,
            4 => Self::BreathVocEquivalent,
            12 => Self::StabilizationStatus,
            13 => Self::RunInStatus,
            14 => Self::CompensatedTemperature,
            15 => Self::CompensatedHumidity,
            21 => Self::GasPercentage,
            other => Self::Other(other),
        }
    }

    pub const fn id(self) -> u8 {
        match self {
            Self::Iaq => 1,
            Self::StaticIaq => 2,
            Self::Co2Equivalent => 3,
            Self::BreathVocEquivalent => 4,
            Self::StabilizationStatus => 12,
            Self::RunInStatus => 13,
            Self::CompensatedTemperature => 14,
            Self::CompensatedHumidity => 15,
            Self::GasPercentage => 21,
            Self::Other(id) => id,
        }
    }
}

/// Rate at which the engine expects new inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SampleRate {
    /// One sample per second.
    Continuous,
    /// One sample every 3 s.
    #[default]
    LowPower,
    /// One sample every 300 s.
    UltraLowPower,
}

impl SampleRate {
    pub fn hz(self) -> f32 {
        match self {
            Self::Continuous => 1.0,
            Self::LowPower => 0.333_333,
            Self::UltraLowPower => 0.003_333_3,
        }
    }

    /// Polling interval that matches this rate.
    pub const fn interval_ms(self) -> u32 {
        match self {
            Self::Continuous => 1_000,
            Self::LowPower => 3_000,
            Self::UltraLowPower => 300_000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusionInput {
    pub kind: InputKind,
    pub value: f32,
    /// Microseconds since an arbitrary epoch; never decreases across ticks.
    pub timestamp_us: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusionOutput {
    pub kind: OutputKind,
    pub value: f32,
    /// Calibration accuracy reported by the engine (0–3).
    pub accuracy: u8,
}

/// Build the tick's inputs from one reading, all sharing `timestamp_us`.
pub fn build_inputs(reading: &Reading, timestamp_us: u64) -> [FusionInput; FUSION_INPUTS_PER_TICK] {
    [
        FusionInput {
            kind: InputKind::Temperature,
            value: reading.temperature,
            timestamp_us,
        },
        FusionInput {
            kind: InputKind::Humidity,
            value: reading.humidity,
            timestamp_us,
        },
        FusionInput {
            kind: InputKind::GasResistor,
            value: reading.gas_resistance,
            timestamp_us,
        },
    ]
}
