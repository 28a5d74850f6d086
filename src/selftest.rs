//! Hardware self-test harness.
//!
//! Two scenarios run against a [`SensorDriver`]: the driver's built-in
//! self-test, and a forced-mode sampling loop that prints CSV rows. Each
//! scenario is bracketed by heap snapshots and fails if either capability
//! class shrank by more than [`MEMORY_LEAK_THRESHOLD`] bytes. The driver is
//! de-initialised on every exit path.

use core::fmt;

use log::{info, warn};

use crate::app::ports::{Clock, HeapClass, HeapProbe, SensorDriver};
use crate::config::ComponentConfig;
use crate::diagnostics::{HeapDelta, HeapSnapshot, MEMORY_LEAK_THRESHOLD};
use crate::error::DriverError;
use crate::sensors::OperatingMode;

/// Samples collected by the forced-mode scenario unless told otherwise.
pub const DEFAULT_SAMPLE_COUNT: u16 = 10;

/// Forced-mode attempts allowed per requested sample before giving up.
pub const ATTEMPTS_PER_SAMPLE: u32 = 4;

/// Column header matching [`SampleRow`]'s `Display` output.
pub const CSV_HEADER: &str = "Sample, TimeStamp(ms), Temperature(deg C), Pressure(Pa), \
                              Humidity(%), Gas resistance(ohm), Status";

// ---------------------------------------------------------------------------
// Errors & reports
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarnessError {
    /// A driver call failed; `step` names the call.
    Driver {
        step: &'static str,
        error: DriverError,
    },
    /// Free heap in `class` shrank by more than the threshold.
    Leak { class: HeapClass, delta: isize },
    /// The sensor never produced enough readings within the attempt budget.
    NoData { collected: u16, attempts: u32 },
}

impl fmt::Display for HarnessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Driver { step, error } => write!(f, "{step} failed: {error}"),
            Self::Leak { class, delta } => {
                let name = match class {
                    HeapClass::Byte8 => "8BIT",
                    HeapClass::Word32 => "32BIT",
                };
                write!(f, "memory leak in MALLOC_CAP_{name} (delta {delta})")
            }
            Self::NoData {
                collected,
                attempts,
            } => write!(f, "only {collected} sample(s) after {attempts} attempt(s)"),
        }
    }
}

/// Outcome of a passing scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScenarioReport {
    pub name: &'static str,
    /// Rows produced (0 for the self-test scenario).
    pub samples: u16,
    pub heap: HeapDelta,
}

/// One forced-mode reading in the vendor test app's CSV layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleRow {
    /// 1-based sample index.
    pub sample: u16,
    pub time_ms: u64,
    pub temperature: f32,
    pub pressure: f32,
    pub humidity: f32,
    pub gas_resistance: f32,
    pub status: u8,
}

impl fmt::Display for SampleRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}, {:.2}, {:.2}, {:.2}, {:.2}, 0x{:x}",
            self.sample,
            self.time_ms,
            self.temperature,
            self.pressure,
            self.humidity,
            self.gas_resistance,
            self.status
        )
    }
}

fn step(name: &'static str, result: Result<(), DriverError>) -> Result<(), HarnessError> {
    result.map_err(|error| {
        warn!("selftest: {} failed: {}", name, error);
        HarnessError::Driver { step: name, error }
    })
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

pub struct SelfTestHarness<P> {
    probe: P,
    threshold: isize,
}

impl<P: HeapProbe> SelfTestHarness<P> {
    pub fn new(probe: P) -> Self {
        Self::with_threshold(probe, MEMORY_LEAK_THRESHOLD)
    }

    pub fn with_threshold(probe: P, threshold: isize) -> Self {
        Self { probe, threshold }
    }

    pub fn probe(&self) -> &P {
        &self.probe
    }

    /// Scenario A: initialise the sensor and run its built-in self-test.
    pub fn run_self_test<D: SensorDriver>(
        &self,
        driver: &mut D,
    ) -> Result<ScenarioReport, HarnessError> {
        self.scenario("self_test", driver, |d| {
            step("init", d.init())?;
            step("selftest_check", d.self_test())?;
            Ok(0)
        })
    }

    /// Scenario B: collect `sample_count` forced-mode readings.
    ///
    /// Each reading with data is handed to `on_sample`. Ticks that report no
    /// new data are retried, up to [`ATTEMPTS_PER_SAMPLE`] per sample.
    pub fn run_forced_mode<D, C>(
        &self,
        driver: &mut D,
        config: &ComponentConfig,
        sample_count: u16,
        clock: &C,
        mut on_sample: impl FnMut(&SampleRow),
    ) -> Result<ScenarioReport, HarnessError>
    where
        D: SensorDriver,
        C: Clock,
    {
        self.scenario("forced_mode", driver, |d| {
            let mode = OperatingMode::Forced;
            step("init", d.init())?;
            step("set_conf", d.set_config(&config.sensor))?;
            step("set_heatr_conf", d.set_heater_config(mode, &config.heater))?;

            let budget = u32::from(sample_count) * ATTEMPTS_PER_SAMPLE;
            let mut collected: u16 = 0;
            let mut attempts: u32 = 0;
            while collected < sample_count {
                if attempts == budget {
                    return Err(HarnessError::NoData {
                        collected,
                        attempts,
                    });
                }
                attempts += 1;

                step("set_op_mode", d.set_operating_mode(mode))?;
                let meas_us = d.measurement_duration_us(mode, &config.sensor);
                d.delay_us(config.heater.settling_delay_us(meas_us));
                let time_ms = clock.now_us() / 1_000;

                let reading = d.get_data(mode).map_err(|error| {
                    warn!("selftest: get_data failed: {}", error);
                    HarnessError::Driver {
                        step: "get_data",
                        error,
                    }
                })?;
                if !reading.has_data() {
                    continue;
                }

                collected += 1;
                on_sample(&SampleRow {
                    sample: collected,
                    time_ms,
                    temperature: reading.temperature,
                    pressure: reading.pressure,
                    humidity: reading.humidity,
                    gas_resistance: reading.gas_resistance,
                    status: reading.status.bits(),
                });
            }
            Ok(collected)
        })
    }

    /// Run `body` between two heap snapshots and de-initialise the driver.
    ///
    /// Failure precedence: the body's own error, then `deinit`, then the
    /// leak check.
    fn scenario<D: SensorDriver>(
        &self,
        name: &'static str,
        driver: &mut D,
        body: impl FnOnce(&mut D) -> Result<u16, HarnessError>,
    ) -> Result<ScenarioReport, HarnessError> {
        info!("START: {}", name);
        let before = HeapSnapshot::take(&self.probe);

        let outcome = body(driver);
        let released = step("deinit", driver.deinit());

        let after = HeapSnapshot::take(&self.probe);
        let heap = before.delta(&after);
        info!(
            "{}: heap delta 8bit={} 32bit={}",
            name, heap.delta_8bit, heap.delta_32bit
        );

        let samples = outcome?;
        released?;
        if let Some((class, delta)) = heap.leaked(self.threshold) {
            let err = HarnessError::Leak { class, delta };
            warn!("{}: {}", name, err);
            return Err(err);
        }

        info!("DONE: {}", name);
        Ok(ScenarioReport {
            name,
            samples,
            heap,
        })
    }
}
