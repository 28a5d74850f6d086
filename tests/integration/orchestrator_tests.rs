//! Integration tests for the sample → publish → fuse → publish cycle.
//!
//! The orchestrator runs against scripted driver/fusion mocks; every sink is
//! a recording handle so each test asserts exactly what reached telemetry.

use bme68x_bsec2::app::bindings::{SensorBindings, TelemetryRole};
use bme68x_bsec2::app::events::AppEvent;
use bme68x_bsec2::app::service::{ComponentState, TickOutcome, UpdateOrchestrator};
use bme68x_bsec2::config::{ComponentConfig, SensorModel};
use bme68x_bsec2::error::{DriverError, Error, FusionError, SetupError};
use bme68x_bsec2::sensors::{InputKind, OperatingMode, OutputKind, Reading, SampleRate};

use crate::mock_hw::{
    DriverCall, EventLog, MOCK_MEAS_DUR_US, ManualClock, MockDriver, MockFusion, Sinks, output,
    reference_reading,
};

type Component = UpdateOrchestrator<MockDriver, MockFusion, ManualClock>;

struct Rig {
    component: Component,
    driver: MockDriver,
    fusion: MockFusion,
    clock: ManualClock,
    sinks: Sinks,
    events: EventLog,
}

fn rig_with(driver: MockDriver, bindings: SensorBindings, sinks: Sinks) -> Rig {
    let fusion = MockFusion::new();
    let clock = ManualClock::at(1_000_000);
    let component = UpdateOrchestrator::new(
        driver.clone(),
        fusion.clone(),
        clock.clone(),
        ComponentConfig::default(),
        bindings,
    );
    Rig {
        component,
        driver,
        fusion,
        clock,
        sinks,
        events: EventLog::new(),
    }
}

/// All seven sinks bound, setup already done.
fn ready_rig(driver: MockDriver) -> Rig {
    let (bindings, sinks) = Sinks::all();
    let mut rig = rig_with(driver, bindings, sinks);
    rig.component.setup(&mut rig.events).expect("setup");
    rig
}

// ── Raw publishing ────────────────────────────────────────────

#[test]
fn reference_reading_reaches_raw_sinks() {
    let mut rig = ready_rig(MockDriver::with_readings([Ok(reference_reading())]));

    let outcome = rig.component.update(&mut rig.events).unwrap();

    assert_eq!(outcome, TickOutcome::Published { raw: 4, fused: 0 });
    assert_eq!(rig.sinks.values(TelemetryRole::Temperature), vec![22.5]);
    assert_eq!(rig.sinks.values(TelemetryRole::Pressure), vec![1013.25]);
    assert_eq!(rig.sinks.values(TelemetryRole::Humidity), vec![45.0]);
    assert_eq!(rig.sinks.values(TelemetryRole::GasResistance), vec![12_000.0]);
    assert_eq!(rig.component.stats().published, 1);
}

#[test]
fn unbound_sinks_are_skipped() {
    let (bindings, sinks) = Sinks::bind(&[TelemetryRole::Temperature]);
    let mut rig = rig_with(
        MockDriver::with_readings([Ok(reference_reading())]),
        bindings,
        sinks,
    );
    rig.component.setup(&mut rig.events).unwrap();

    let outcome = rig.component.update(&mut rig.events).unwrap();

    assert_eq!(outcome, TickOutcome::Published { raw: 1, fused: 0 });
    assert_eq!(rig.sinks.total(), 1);
}

#[test]
fn no_sinks_bound_still_completes_tick() {
    let mut rig = rig_with(
        MockDriver::with_readings([Ok(reference_reading())]),
        SensorBindings::new(),
        Sinks::default(),
    );
    rig.component.setup(&mut rig.events).unwrap();

    let outcome = rig.component.update(&mut rig.events).unwrap();

    assert_eq!(outcome, TickOutcome::Published { raw: 0, fused: 0 });
    assert_eq!(rig.fusion.step_count(), 1);
}

// ── Driver failures & empty readings ──────────────────────────

#[test]
fn get_data_failure_publishes_nothing() {
    let mut rig = ready_rig(MockDriver::with_readings([Err(
        DriverError::CommunicationFailed,
    )]));

    let err = rig.component.update(&mut rig.events).unwrap_err();

    assert_eq!(err, Error::Driver(DriverError::CommunicationFailed));
    assert_eq!(rig.sinks.total(), 0);
    assert_eq!(rig.fusion.step_count(), 0);
    let stats = rig.component.stats();
    assert_eq!(stats.aborted, 1);
    assert_eq!(stats.transport_failures, 1);
    assert_eq!(stats.last_error, Some(err));
    assert!(matches!(
        rig.events.last(),
        Some(AppEvent::TickAborted { consecutive: 1, .. })
    ));
}

#[test]
fn trigger_failure_aborts_before_reading() {
    let mut rig = ready_rig(MockDriver::with_readings([Ok(reference_reading())]));
    rig.driver.state().fail_mode = Some(DriverError::Vendor(-9));

    let err = rig.component.update(&mut rig.events).unwrap_err();

    assert_eq!(err, Error::Driver(DriverError::Vendor(-9)));
    assert_eq!(rig.driver.count(&DriverCall::GetData(OperatingMode::Forced)), 0);
    assert_eq!(rig.sinks.total(), 0);
    assert_eq!(rig.component.stats().driver_failures, 1);
}

#[test]
fn empty_reading_skips_publish_and_fusion() {
    let mut rig = ready_rig(MockDriver::with_readings([Ok(Reading::empty())]));

    let outcome = rig.component.update(&mut rig.events).unwrap();

    assert_eq!(outcome, TickOutcome::NoNewData);
    assert_eq!(rig.sinks.total(), 0);
    assert_eq!(rig.fusion.step_count(), 0);
    let stats = rig.component.stats();
    assert_eq!(stats.no_data, 1);
    assert_eq!(stats.aborted, 0);
    assert!(matches!(rig.events.last(), Some(AppEvent::NoNewData)));
}

#[test]
fn forced_measurement_waits_settling_delay() {
    let mut rig = ready_rig(MockDriver::with_readings([Ok(reference_reading())]));
    let setup_calls = rig.driver.calls().len();

    rig.component.update(&mut rig.events).unwrap();

    let heater_us = u32::from(rig.component.config().heater.duration_ms) * 1000;
    assert_eq!(
        rig.driver.calls()[setup_calls..],
        [
            DriverCall::SetMode(OperatingMode::Forced),
            DriverCall::MeasDur(OperatingMode::Forced),
            DriverCall::Delay(MOCK_MEAS_DUR_US + heater_us),
            DriverCall::GetData(OperatingMode::Forced),
        ]
    );
}

// ── Fusion ────────────────────────────────────────────────────

#[test]
fn fusion_inputs_share_one_timestamp() {
    let mut rig = ready_rig(MockDriver::with_readings([Ok(reference_reading())]));
    rig.clock.set(7_500_000);

    rig.component.update(&mut rig.events).unwrap();

    let steps = rig.fusion.state().steps.clone();
    assert_eq!(steps.len(), 1);
    let inputs = &steps[0];
    assert_eq!(inputs.len(), 3);
    assert!(inputs.iter().all(|i| i.timestamp_us == 7_500_000));
    let kinds: Vec<_> = inputs.iter().map(|i| (i.kind, i.value)).collect();
    assert!(kinds.contains(&(InputKind::Temperature, 22.5)));
    assert!(kinds.contains(&(InputKind::Humidity, 45.0)));
    assert!(kinds.contains(&(InputKind::GasResistor, 12_000.0)));
}

#[test]
fn timestamps_never_decrease_across_ticks() {
    let mut rig = ready_rig(MockDriver::with_readings(
        (0..3).map(|_| Ok(reference_reading())),
    ));

    rig.clock.set(5_000_000);
    rig.component.update(&mut rig.events).unwrap();
    rig.clock.set(4_000_000);
    rig.component.update(&mut rig.events).unwrap();
    rig.clock.set(9_000_000);
    rig.component.update(&mut rig.events).unwrap();

    let stamps: Vec<u64> = rig
        .fusion
        .state()
        .steps
        .iter()
        .map(|s| s[0].timestamp_us)
        .collect();
    assert_eq!(stamps, vec![5_000_000, 5_000_000, 9_000_000]);
}

#[test]
fn fused_outputs_publish_once_per_sink() {
    let mut rig = ready_rig(MockDriver::with_readings([Ok(reference_reading())]));
    rig.fusion.queue(vec![
        output(OutputKind::Iaq, 50.0),
        output(OutputKind::StaticIaq, 40.0),
        output(OutputKind::Iaq, 60.0),
        output(OutputKind::Co2Equivalent, 600.0),
        output(OutputKind::Other(99), 1.0),
    ]);

    let outcome = rig.component.update(&mut rig.events).unwrap();

    assert_eq!(outcome, TickOutcome::Published { raw: 4, fused: 2 });
    assert_eq!(rig.sinks.values(TelemetryRole::Iaq), vec![50.0]);
    assert_eq!(rig.sinks.values(TelemetryRole::Co2Equivalent), vec![600.0]);
    assert!(rig.sinks.values(TelemetryRole::BreathVocEquivalent).is_empty());
}

#[test]
fn unmatched_outputs_have_no_effect() {
    let mut rig = ready_rig(MockDriver::with_readings([Ok(reference_reading())]));
    rig.fusion.queue(vec![
        output(OutputKind::StabilizationStatus, 1.0),
        output(OutputKind::RunInStatus, 0.0),
        output(OutputKind::GasPercentage, 33.0),
    ]);

    let outcome = rig.component.update(&mut rig.events).unwrap();

    assert_eq!(outcome, TickOutcome::Published { raw: 4, fused: 0 });
    assert_eq!(rig.sinks.total(), 4);
}

#[test]
fn recognised_output_without_sink_is_dropped() {
    let (bindings, sinks) =
        Sinks::bind(&[TelemetryRole::Temperature, TelemetryRole::Co2Equivalent]);
    let mut rig = rig_with(
        MockDriver::with_readings([Ok(reference_reading())]),
        bindings,
        sinks,
    );
    rig.component.setup(&mut rig.events).unwrap();
    rig.fusion.queue(vec![
        output(OutputKind::Iaq, 50.0),
        output(OutputKind::Co2Equivalent, 600.0),
    ]);

    let outcome = rig.component.update(&mut rig.events).unwrap();

    assert_eq!(outcome, TickOutcome::Published { raw: 1, fused: 1 });
    assert!(rig.sinks.values(TelemetryRole::Iaq).is_empty());
    assert_eq!(rig.sinks.values(TelemetryRole::Co2Equivalent), vec![600.0]);
    assert_eq!(rig.sinks.total(), 2);
}

#[test]
fn fusion_failure_after_raw_publish_aborts_tick() {
    let mut rig = ready_rig(MockDriver::with_readings([Ok(reference_reading())]));
    rig.fusion.state().fail_step = Some(FusionError::ValueLimits);

    let err = rig.component.update(&mut rig.events).unwrap_err();

    assert_eq!(err, Error::Fusion(FusionError::ValueLimits));
    // Raw values went out before the engine ran.
    assert_eq!(rig.sinks.values(TelemetryRole::Temperature), vec![22.5]);
    assert!(rig.sinks.values(TelemetryRole::Iaq).is_empty());
    assert_eq!(rig.component.stats().fusion_failures, 1);
}

#[test]
fn subscribes_only_bound_fused_roles() {
    let (bindings, sinks) = Sinks::bind(&[TelemetryRole::Temperature, TelemetryRole::Iaq]);
    let mut rig = rig_with(MockDriver::new(), bindings, sinks);

    rig.component.setup(&mut rig.events).unwrap();

    let subs = rig.fusion.state().subscriptions.clone();
    assert_eq!(subs, vec![(vec![OutputKind::Iaq], SampleRate::LowPower)]);
}

#[test]
fn no_fused_sinks_means_no_subscription() {
    let (bindings, sinks) = Sinks::bind(&[TelemetryRole::Pressure]);
    let mut rig = rig_with(MockDriver::new(), bindings, sinks);

    rig.component.setup(&mut rig.events).unwrap();

    assert_eq!(rig.fusion.state().inits, 1);
    assert!(rig.fusion.state().subscriptions.is_empty());
}

// ── Setup ─────────────────────────────────────────────────────

#[test]
fn setup_applies_settings_then_starts_fusion() {
    let (bindings, sinks) = Sinks::all();
    let mut rig = rig_with(MockDriver::new(), bindings, sinks);

    rig.component.setup(&mut rig.events).unwrap();

    let cfg = rig.component.config().clone();
    assert_eq!(
        rig.driver.calls(),
        vec![
            DriverCall::Init,
            DriverCall::SetConfig(cfg.sensor),
            DriverCall::SetHeater(OperatingMode::Forced, cfg.heater),
        ]
    );
    assert_eq!(rig.component.state(), ComponentState::Ready);
    assert!(matches!(
        rig.events.last(),
        Some(AppEvent::Ready(SensorModel::Bme680))
    ));
}

#[test]
fn init_failure_is_hardware_not_found() {
    let (bindings, sinks) = Sinks::all();
    let mut rig = rig_with(MockDriver::new(), bindings, sinks);
    rig.driver.state().fail_init = Some(DriverError::DeviceNotFound);

    let err = rig.component.setup(&mut rig.events).unwrap_err();

    assert_eq!(err, SetupError::HardwareNotFound(DriverError::DeviceNotFound));
    assert_eq!(rig.component.state(), ComponentState::Uninitialized);
    assert_eq!(rig.fusion.state().inits, 0);
    assert!(matches!(rig.events.last(), Some(AppEvent::SetupFailed(_))));
}

#[test]
fn config_failure_is_configuration_rejected() {
    let (bindings, sinks) = Sinks::all();
    let mut rig = rig_with(MockDriver::new(), bindings, sinks);
    rig.driver.state().fail_heater = Some(DriverError::InvalidLength);

    let err = rig.component.setup(&mut rig.events).unwrap_err();

    assert_eq!(
        err,
        SetupError::ConfigurationRejected(DriverError::InvalidLength)
    );
    assert_eq!(rig.component.state(), ComponentState::Uninitialized);
}

#[test]
fn fusion_init_failure_is_fusion_rejected() {
    let (bindings, sinks) = Sinks::all();
    let mut rig = rig_with(MockDriver::new(), bindings, sinks);
    rig.fusion.state().fail_subscribe = Some(FusionError::Rejected(-10));

    let err = rig.component.setup(&mut rig.events).unwrap_err();

    assert_eq!(err, SetupError::FusionRejected(FusionError::Rejected(-10)));
}

#[test]
fn update_after_failed_setup_is_not_ready() {
    let (bindings, sinks) = Sinks::all();
    let mut rig = rig_with(
        MockDriver::with_readings([Ok(reference_reading())]),
        bindings,
        sinks,
    );
    rig.driver.state().fail_init = Some(DriverError::CommunicationFailed);
    let _ = rig.component.setup(&mut rig.events);

    let err = rig.component.update(&mut rig.events).unwrap_err();

    assert_eq!(err, Error::NotReady);
    assert_eq!(rig.sinks.total(), 0);
    assert_eq!(rig.driver.count(&DriverCall::GetData(OperatingMode::Forced)), 0);
    let stats = rig.component.stats();
    assert_eq!(stats.lifecycle_failures, 1);
    assert_eq!(stats.driver_failures, 0);
}

// ── Recovery & lifecycle ──────────────────────────────────────

#[test]
fn recovery_is_reported_after_failure_streak() {
    let mut rig = ready_rig(MockDriver::with_readings([
        Err(DriverError::CommunicationFailed),
        Err(DriverError::CommunicationFailed),
        Ok(Reading::empty()),
        Ok(reference_reading()),
    ]));

    for _ in 0..4 {
        let _ = rig.component.update(&mut rig.events);
    }

    let stats = rig.component.stats();
    assert_eq!(stats.ticks, 4);
    assert_eq!(stats.aborted, 2);
    assert_eq!(stats.consecutive_failures, 0);
    assert_eq!(
        rig.events
            .count(|e| matches!(e, AppEvent::Recovered { after: 2 })),
        1
    );
}

#[test]
fn shutdown_deinits_driver() {
    let mut rig = ready_rig(MockDriver::new());

    rig.component.shutdown().unwrap();

    assert_eq!(rig.driver.count(&DriverCall::Deinit), 1);
    assert_eq!(rig.component.state(), ComponentState::Uninitialized);
    assert_eq!(rig.component.update(&mut rig.events), Err(Error::NotReady));
}

#[test]
fn model_comes_from_config_string() {
    let cfg = ComponentConfig::from_json(r#"{"model":"BME690"}"#).unwrap();
    let component = UpdateOrchestrator::new(
        MockDriver::new(),
        MockFusion::new(),
        ManualClock::default(),
        cfg,
        SensorBindings::new(),
    );
    assert_eq!(component.model(), SensorModel::Bme690);

    let cfg = ComponentConfig::from_json(r#"{"model":"BME999"}"#).unwrap();
    assert_eq!(cfg.model, SensorModel::Bme680);
}
