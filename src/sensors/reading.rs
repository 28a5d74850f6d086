//! One decoded measurement from the gas sensor.

use bitflags::bitflags;

bitflags! {
    /// Status byte reported with every field of sensor data.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ReadingStatus: u8 {
        /// The field holds a measurement not yet read out.
        const NEW_DATA = 0x80;
        /// The gas conversion completed and `gas_resistance` is meaningful.
        const GAS_VALID = 0x20;
        /// The hot plate reached its target temperature in time.
        const HEAT_STABLE = 0x10;

        const _ = !0;
    }
}

/// Compensated values for one forced-mode measurement.
///
/// `n_fields == 0` means the driver call succeeded but the sensor had
/// nothing new to report; the numeric fields are then meaningless.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Reading {
    /// Degrees Celsius.
    pub temperature: f32,
    /// Pascal.
    pub pressure: f32,
    /// Relative humidity, percent.
    pub humidity: f32,
    /// Ohm.
    pub gas_resistance: f32,
    pub status: ReadingStatus,
    pub n_fields: u8,
}

impl Reading {
    /// A successful driver call that produced no fields.
    pub const fn empty() -> Self {
        Self {
            temperature: 0.0,
            pressure: 0.0,
            humidity: 0.0,
            gas_resistance: 0.0,
            status: ReadingStatus::empty(),
            n_fields: 0,
        }
    }

    pub const fn has_data(&self) -> bool {
        self.n_fields > 0
    }

    /// Pressure in hectopascal, the unit published to telemetry.
    pub fn pressure_hpa(&self) -> f32 {
        self.pressure / 100.0
    }
}
