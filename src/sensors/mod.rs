//! Sensor-side data model: decoded readings, driver settings, and the
//! fusion-engine signal types built from them each tick.

pub mod fusion;
pub mod reading;
pub mod settings;

pub use fusion::{
    FusionInput, FusionOutput, FusionOutputs, InputKind, OutputKind, SampleRate,
    MAX_FUSION_OUTPUTS,
};
pub use reading::{Reading, ReadingStatus};
pub use settings::{FilterSize, HeaterConfig, OperatingMode, Oversampling, SensorSettings};
