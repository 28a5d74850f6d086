//! Oversampling, filter, heater, and operating-mode settings.
//!
//! Enum discriminants are the register codes the vendor driver expects, so
//! the FFI layer can pass them through with `as u8`.

use serde::{Deserialize, Serialize};

/// Oversampling ratio for one measurement channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum Oversampling {
    /// Channel skipped.
    None = 0,
    X1 = 1,
    X2 = 2,
    X4 = 3,
    X8 = 4,
    X16 = 5,
}

/// IIR filter coefficient applied to temperature and pressure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum FilterSize {
    Off = 0,
    Size1 = 1,
    Size3 = 2,
    Size7 = 3,
    Size15 = 4,
    Size31 = 5,
    Size63 = 6,
    Size127 = 7,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OperatingMode {
    Sleep = 0,
    /// One measurement on demand, then back to sleep.
    Forced = 1,
    Parallel = 2,
    Sequential = 3,
}

/// Oversampling and filter settings applied once at setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorSettings {
    pub os_temperature: Oversampling,
    pub os_pressure: Oversampling,
    pub os_humidity: Oversampling,
    pub filter: FilterSize,
}

impl Default for SensorSettings {
    fn default() -> Self {
        Self {
            os_temperature: Oversampling::X16,
            os_pressure: Oversampling::X16,
            os_humidity: Oversampling::X16,
            filter: FilterSize::Off,
        }
    }
}

/// Gas hot-plate settings for forced mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaterConfig {
    pub enabled: bool,
    /// Target hot-plate temperature (°C).
    pub temperature_c: u16,
    /// Time the plate is held at temperature (ms).
    pub duration_ms: u16,
}

impl Default for HeaterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            temperature_c: 300,
            duration_ms: 100,
        }
    }
}

impl HeaterConfig {
    /// Minimum wait between triggering a forced measurement and reading it.
    ///
    /// `measurement_us` is the TPH conversion time reported by the driver;
    /// the heater phase is added on top when enabled.
    pub fn settling_delay_us(&self, measurement_us: u32) -> u32 {
        let heater_us = if self.enabled {
            u32::from(self.duration_ms) * 1000
        } else {
            0
        };
        measurement_us.saturating_add(heater_us)
    }
}
