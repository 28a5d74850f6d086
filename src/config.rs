//! Component configuration.
//!
//! Everything the host sets once before `setup()`: which sensor variant is
//! attached, where it sits on the bus, how often to poll, and the
//! oversampling/heater profile. Values arrive as JSON (generated from the
//! device YAML) and are validated before use.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::sensors::{HeaterConfig, SampleRate, SensorSettings};

/// Bus address with SDO pulled low.
pub const I2C_ADDR_LOW: u8 = 0x76;
/// Bus address with SDO pulled high (board default).
pub const I2C_ADDR_HIGH: u8 = 0x77;

/// Physical sensor variant. Tag only; the adapter does not branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SensorModel {
    #[default]
    Bme680,
    Bme688,
    Bme690,
}

impl SensorModel {
    /// Select the variant from its part name.
    ///
    /// Unrecognised names fall back to [`SensorModel::Bme680`], the least
    /// specific variant.
    pub fn from_name(name: &str) -> Self {
        match name {
            "BME690" => Self::Bme690,
            "BME688" => Self::Bme688,
            _ => Self::Bme680,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Bme680 => "BME680",
            Self::Bme688 => "BME688",
            Self::Bme690 => "BME690",
        }
    }
}

impl fmt::Display for SensorModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<String> for SensorModel {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

impl From<SensorModel> for String {
    fn from(model: SensorModel) -> Self {
        model.name().into()
    }
}

/// Static component configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ConfigFile")]
pub struct ComponentConfig {
    pub model: SensorModel,
    /// 7-bit I2C address of the sensor.
    pub i2c_address: u8,
    /// Host polling interval (milliseconds). Follows `sample_rate` when
    /// absent from the JSON.
    pub update_interval_ms: u32,
    /// Rate the fusion engine is subscribed at.
    pub sample_rate: SampleRate,
    pub sensor: SensorSettings,
    pub heater: HeaterConfig,
}

impl Default for ComponentConfig {
    fn default() -> Self {
        Self {
            model: SensorModel::default(),
            i2c_address: I2C_ADDR_HIGH,
            update_interval_ms: SampleRate::default().interval_ms(),
            sample_rate: SampleRate::default(),
            sensor: SensorSettings::default(),
            heater: HeaterConfig::default(),
        }
    }
}

/// On-disk shape of [`ComponentConfig`]; every field is optional.
#[derive(Deserialize)]
#[serde(default)]
struct ConfigFile {
    model: SensorModel,
    i2c_address: u8,
    update_interval_ms: Option<u32>,
    sample_rate: SampleRate,
    sensor: SensorSettings,
    heater: HeaterConfig,
}

impl Default for ConfigFile {
    fn default() -> Self {
        let c = ComponentConfig::default();
        Self {
            model: c.model,
            i2c_address: c.i2c_address,
            update_interval_ms: None,
            sample_rate: c.sample_rate,
            sensor: c.sensor,
            heater: c.heater,
        }
    }
}

impl From<ConfigFile> for ComponentConfig {
    fn from(f: ConfigFile) -> Self {
        Self {
            model: f.model,
            i2c_address: f.i2c_address,
            update_interval_ms: f
                .update_interval_ms
                .unwrap_or_else(|| f.sample_rate.interval_ms()),
            sample_rate: f.sample_rate,
            sensor: f.sensor,
            heater: f.heater,
        }
    }
}

impl ComponentConfig {
    /// Parse and validate a JSON configuration. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let cfg: Self =
            serde_json::from_str(json).map_err(|_| Error::Config("malformed JSON"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Range-check every field. Invalid values are rejected, not clamped.
    pub fn validate(&self) -> Result<()> {
        if self.i2c_address != I2C_ADDR_LOW && self.i2c_address != I2C_ADDR_HIGH {
            return Err(Error::Config("i2c_address must be 0x76 or 0x77"));
        }
        if !(1_000..=3_600_000).contains(&self.update_interval_ms) {
            return Err(Error::Config(
                "update_interval_ms must be 1000–3600000",
            ));
        }
        // Polling ahead of the subscribed rate feeds the fusion engine early.
        if self.update_interval_ms < self.sample_rate.interval_ms() {
            return Err(Error::Config(
                "update_interval_ms is shorter than the sample_rate period",
            ));
        }
        if self.heater.enabled {
            if !(200..=400).contains(&self.heater.temperature_c) {
                return Err(Error::Config("heater.temperature_c must be 200–400"));
            }
            if !(1..=4032).contains(&self.heater.duration_ms) {
                return Err(Error::Config("heater.duration_ms must be 1–4032"));
            }
        }
        Ok(())
    }
}
