//! Mock vendor libraries and sinks for integration tests.
//!
//! Every mock is a cheap handle over shared state, so a test keeps a clone
//! after handing the mock itself to the orchestrator and asserts on the full
//! call history afterwards.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use bme68x_bsec2::app::bindings::{SensorBindings, TelemetryRole};
use bme68x_bsec2::app::events::AppEvent;
use bme68x_bsec2::app::ports::{
    Clock, EventSink, FusionEngine, HeapClass, HeapProbe, SensorDriver, TelemetrySink,
};
use bme68x_bsec2::error::{DriverError, FusionError};
use bme68x_bsec2::sensors::{
    FusionInput, FusionOutput, FusionOutputs, HeaterConfig, OperatingMode, OutputKind, Reading,
    ReadingStatus, SampleRate, SensorSettings,
};

/// TPH conversion time the mock driver reports (µs).
pub const MOCK_MEAS_DUR_US: u32 = 12_000;

/// `{22.5 °C, 101325 Pa, 45 %, 12000 Ω}` with one field.
pub fn reference_reading() -> Reading {
    Reading {
        temperature: 22.5,
        pressure: 101_325.0,
        humidity: 45.0,
        gas_resistance: 12_000.0,
        status: ReadingStatus::empty(),
        n_fields: 1,
    }
}

// ── Sensor driver ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum DriverCall {
    Init,
    SetConfig(SensorSettings),
    SetHeater(OperatingMode, HeaterConfig),
    SetMode(OperatingMode),
    MeasDur(OperatingMode),
    Delay(u32),
    GetData(OperatingMode),
    SelfTest,
    Deinit,
}

#[derive(Default)]
pub struct DriverState {
    pub calls: Vec<DriverCall>,
    /// Served in order by `get_data`; empty queue yields `Reading::empty()`.
    pub readings: VecDeque<Result<Reading, DriverError>>,
    pub fail_init: Option<DriverError>,
    pub fail_config: Option<DriverError>,
    pub fail_heater: Option<DriverError>,
    pub fail_mode: Option<DriverError>,
    pub fail_self_test: Option<DriverError>,
    pub fail_deinit: Option<DriverError>,
}

#[derive(Clone, Default)]
pub struct MockDriver(Rc<RefCell<DriverState>>);

#[allow(dead_code)]
impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue readings for successive `get_data` calls.
    pub fn with_readings(readings: impl IntoIterator<Item = Result<Reading, DriverError>>) -> Self {
        let d = Self::new();
        d.state().readings.extend(readings);
        d
    }

    pub fn state(&self) -> std::cell::RefMut<'_, DriverState> {
        self.0.borrow_mut()
    }

    pub fn calls(&self) -> Vec<DriverCall> {
        self.0.borrow().calls.clone()
    }

    pub fn count(&self, call: &DriverCall) -> usize {
        self.0.borrow().calls.iter().filter(|c| *c == call).count()
    }

    fn record(&self, call: DriverCall) {
        self.0.borrow_mut().calls.push(call);
    }
}

fn fail(err: Option<DriverError>) -> Result<(), DriverError> {
    err.map_or(Ok(()), Err)
}

impl SensorDriver for MockDriver {
    fn init(&mut self) -> Result<(), DriverError> {
        self.record(DriverCall::Init);
        fail(self.0.borrow().fail_init)
    }

    fn set_config(&mut self, settings: &SensorSettings) -> Result<(), DriverError> {
        self.record(DriverCall::SetConfig(*settings));
        fail(self.0.borrow().fail_config)
    }

    fn set_heater_config(
        &mut self,
        mode: OperatingMode,
        heater: &HeaterConfig,
    ) -> Result<(), DriverError> {
        self.record(DriverCall::SetHeater(mode, *heater));
        fail(self.0.borrow().fail_heater)
    }

    fn set_operating_mode(&mut self, mode: OperatingMode) -> Result<(), DriverError> {
        self.record(DriverCall::SetMode(mode));
        fail(self.0.borrow().fail_mode)
    }

    fn measurement_duration_us(&mut self, mode: OperatingMode, _: &SensorSettings) -> u32 {
        self.record(DriverCall::MeasDur(mode));
        MOCK_MEAS_DUR_US
    }

    fn get_data(&mut self, mode: OperatingMode) -> Result<Reading, DriverError> {
        self.record(DriverCall::GetData(mode));
        self.0
            .borrow_mut()
            .readings
            .pop_front()
            .unwrap_or(Ok(Reading::empty()))
    }

    fn self_test(&mut self) -> Result<(), DriverError> {
        self.record(DriverCall::SelfTest);
        fail(self.0.borrow().fail_self_test)
    }

    fn deinit(&mut self) -> Result<(), DriverError> {
        self.record(DriverCall::Deinit);
        fail(self.0.borrow().fail_deinit)
    }

    fn delay_us(&mut self, period_us: u32) {
        self.record(DriverCall::Delay(period_us));
    }
}

// ── Fusion engine ─────────────────────────────────────────────

#[derive(Default)]
pub struct FusionState {
    pub inits: u32,
    pub subscriptions: Vec<(Vec<OutputKind>, SampleRate)>,
    /// Inputs of every `step` call, in order.
    pub steps: Vec<Vec<FusionInput>>,
    /// Served in order by `step`; empty queue yields no outputs.
    pub outputs: VecDeque<Vec<FusionOutput>>,
    pub fail_init: Option<FusionError>,
    pub fail_subscribe: Option<FusionError>,
    pub fail_step: Option<FusionError>,
}

#[derive(Clone, Default)]
pub struct MockFusion(Rc<RefCell<FusionState>>);

#[allow(dead_code)]
impl MockFusion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> std::cell::RefMut<'_, FusionState> {
        self.0.borrow_mut()
    }

    pub fn queue(&self, outputs: Vec<FusionOutput>) {
        self.0.borrow_mut().outputs.push_back(outputs);
    }

    pub fn step_count(&self) -> usize {
        self.0.borrow().steps.len()
    }
}

impl FusionEngine for MockFusion {
    fn init(&mut self) -> Result<(), FusionError> {
        let mut s = self.0.borrow_mut();
        s.inits += 1;
        s.fail_init.map_or(Ok(()), Err)
    }

    fn subscribe(&mut self, outputs: &[OutputKind], rate: SampleRate) -> Result<(), FusionError> {
        let mut s = self.0.borrow_mut();
        s.subscriptions.push((outputs.to_vec(), rate));
        s.fail_subscribe.map_or(Ok(()), Err)
    }

    fn step(&mut self, inputs: &[FusionInput], outputs: &mut FusionOutputs) -> Result<(), FusionError> {
        let mut s = self.0.borrow_mut();
        s.steps.push(inputs.to_vec());
        outputs.clear();
        if let Some(e) = s.fail_step {
            return Err(e);
        }
        for out in s.outputs.pop_front().unwrap_or_default() {
            outputs.push(out).expect("mock output overflow");
        }
        Ok(())
    }
}

pub fn output(kind: OutputKind, value: f32) -> FusionOutput {
    FusionOutput {
        kind,
        value,
        accuracy: 3,
    }
}

// ── Clock ─────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct ManualClock(Rc<Cell<u64>>);

#[allow(dead_code)]
impl ManualClock {
    pub fn at(us: u64) -> Self {
        Self(Rc::new(Cell::new(us)))
    }

    pub fn set(&self, us: u64) {
        self.0.set(us);
    }

    pub fn advance(&self, us: u64) {
        self.0.set(self.0.get() + us);
    }
}

impl Clock for ManualClock {
    fn now_us(&self) -> u64 {
        self.0.get()
    }
}

// ── Telemetry sinks ───────────────────────────────────────────

#[derive(Clone, Default)]
pub struct RecordingSink(Rc<RefCell<Vec<f32>>>);

impl RecordingSink {
    pub fn values(&self) -> Vec<f32> {
        self.0.borrow().clone()
    }
}

impl TelemetrySink for RecordingSink {
    fn publish(&mut self, value: f32) {
        self.0.borrow_mut().push(value);
    }
}

/// Recording sinks for a set of roles, plus the bindings that feed them.
#[derive(Default)]
pub struct Sinks(HashMap<TelemetryRole, RecordingSink>);

#[allow(dead_code)]
impl Sinks {
    /// Bind a recording sink to each of `roles`.
    pub fn bind(roles: &[TelemetryRole]) -> (SensorBindings, Self) {
        let mut bindings = SensorBindings::new();
        let mut sinks = Self::default();
        for &role in roles {
            let sink = RecordingSink::default();
            bindings.bind(role, Box::new(sink.clone()));
            sinks.0.insert(role, sink);
        }
        (bindings, sinks)
    }

    pub fn all() -> (SensorBindings, Self) {
        Self::bind(&TelemetryRole::ALL)
    }

    pub fn values(&self, role: TelemetryRole) -> Vec<f32> {
        self.0.get(&role).map(RecordingSink::values).unwrap_or_default()
    }

    /// Publishes received across every sink.
    pub fn total(&self) -> usize {
        self.0.values().map(|s| s.values().len()).sum()
    }
}

// ── Event log ─────────────────────────────────────────────────

#[derive(Default)]
pub struct EventLog {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn last(&self) -> Option<&AppEvent> {
        self.events.last()
    }
}

impl EventSink for EventLog {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Heap probe ────────────────────────────────────────────────

/// Serves scripted free-heap values in read order, then repeats the last.
pub struct MockHeap {
    reads: RefCell<VecDeque<usize>>,
    last: Cell<usize>,
}

#[allow(dead_code)]
impl MockHeap {
    const BASE_8BIT: usize = 200_000;
    const BASE_32BIT: usize = 250_000;

    /// Before/after snapshots that differ by the given signed deltas.
    pub fn with_deltas(delta_8bit: isize, delta_32bit: isize) -> Self {
        let after_8 = Self::BASE_8BIT.saturating_add_signed(delta_8bit);
        let after_32 = Self::BASE_32BIT.saturating_add_signed(delta_32bit);
        Self {
            reads: RefCell::new(VecDeque::from([
                Self::BASE_8BIT,
                Self::BASE_32BIT,
                after_8,
                after_32,
            ])),
            last: Cell::new(after_32),
        }
    }

    pub fn stable() -> Self {
        Self::with_deltas(0, 0)
    }
}

impl HeapProbe for MockHeap {
    fn free_bytes(&self, _class: HeapClass) -> usize {
        match self.reads.borrow_mut().pop_front() {
            Some(v) => {
                self.last.set(v);
                v
            }
            None => self.last.get(),
        }
    }
}
