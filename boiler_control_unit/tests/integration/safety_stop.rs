//! Integration test: emergency stop.
//!
//! Every way into EmergencyStop, and that nothing leads out of it.

use boiler_common::control_unit::constants::Constants;
use boiler_common::control_unit::messages::{ToProgram, ToProgramKind, ToUnits};
use boiler_common::control_unit::mode::Mode;
use boiler_control_unit::controller::ControlUnit;
use boiler_control_unit::safety::thresholds::{DANGER_HIGH_FACTOR, DANGER_LOW_FACTOR};

use super::support::{assert_mode_last, degraded, normal, plant, rescue, with};

// ── Helpers ──

fn in_every_mode() -> Vec<ControlUnit> {
    vec![
        ControlUnit::new(Constants::default()),
        normal(),
        degraded(),
        rescue(),
    ]
}

fn normal_cycle_at(level: f64) -> (ControlUnit, Vec<ToUnits>) {
    let mut cu = normal();
    let out = cu.process_messages(&plant(level, 5.0)).unwrap();
    (cu, out)
}

// ── Tests ──

#[test]
fn emergency_stop_from_every_mode() {
    for mut cu in in_every_mode() {
        let from = cu.mode();
        cu.emergency_stop();
        assert_eq!(cu.mode(), Mode::EmergencyStop, "from {from}");
        let out = cu.process_messages(&[]).unwrap();
        assert_eq!(out, vec![ToUnits::Mode(Mode::EmergencyStop)], "from {from}");
    }
}

#[test]
fn nothing_leads_out_of_emergency_stop() {
    let mut cu = degraded();
    cu.emergency_stop();
    for to in Mode::ALL {
        cu.switch_mode(to).unwrap();
        assert_eq!(cu.mode(), Mode::EmergencyStop, "switch to {to}");
    }

    let attempts = [
        with(ToProgram::SteamBoilerWaiting, 500.0, 0.0),
        with(ToProgram::PhysicalUnitsReady, 500.0, 0.0),
        with(ToProgram::SteamRepaired, 500.0, 5.0),
        with(ToProgram::SteamOutcomeFailureAcknowledgement, 500.0, 5.0),
        plant(500.0, 5.0),
    ];
    for incoming in &attempts {
        let out = cu.process_messages(incoming).unwrap();
        assert_eq!(out, vec![ToUnits::Mode(Mode::EmergencyStop)], "{incoming:?}");
    }
    assert!(!cu.is_expecting(ToProgramKind::SteamOutcomeFailureAcknowledgement));
}

#[test]
fn stopped_cycles_are_identical() {
    let mut cu = rescue();
    cu.emergency_stop();
    let first = cu.process_messages(&[]).unwrap();
    let second = cu.process_messages(&[]).unwrap();
    assert_eq!(first, second);
}

#[test]
fn stop_streak_halts_an_operating_plant() {
    let mut cu = normal();
    for _ in 0..2 {
        cu.process_messages(&with(ToProgram::Stop, 500.0, 5.0)).unwrap();
        assert_eq!(cu.mode(), Mode::Normal);
    }
    let out = cu
        .process_messages(&with(ToProgram::Stop, 500.0, 5.0))
        .unwrap();
    assert_eq!(out, vec![ToUnits::Mode(Mode::EmergencyStop)]);
}

#[test]
fn interrupted_stop_streak_starts_over() {
    let mut cu = normal();
    cu.process_messages(&with(ToProgram::Stop, 500.0, 5.0)).unwrap();
    cu.process_messages(&with(ToProgram::Stop, 500.0, 5.0)).unwrap();
    cu.process_messages(&plant(500.0, 5.0)).unwrap();
    cu.process_messages(&with(ToProgram::Stop, 500.0, 5.0)).unwrap();
    cu.process_messages(&with(ToProgram::Stop, 500.0, 5.0)).unwrap();
    assert_eq!(cu.mode(), Mode::Normal);
}

#[test]
fn several_stops_in_one_cycle_count_once() {
    let mut cu = normal();
    let mut incoming = plant(500.0, 5.0);
    incoming.extend([ToProgram::Stop, ToProgram::Stop, ToProgram::Stop]);
    cu.process_messages(&incoming).unwrap();
    assert_eq!(cu.mode(), Mode::Normal);
}

#[test]
fn level_in_danger_halts() {
    let boiler = Constants::default().boiler;
    for level in [
        boiler.capacity,
        DANGER_HIGH_FACTOR * boiler.max_limit + 0.01,
        DANGER_LOW_FACTOR * boiler.min_limit - 0.01,
        0.0,
    ] {
        let (cu, out) = normal_cycle_at(level);
        assert_eq!(cu.mode(), Mode::EmergencyStop, "level {level}");
        assert_eq!(out, vec![ToUnits::Mode(Mode::EmergencyStop)]);
    }
}

#[test]
fn danger_bounds_themselves_are_regulated() {
    let boiler = Constants::default().boiler;

    let (_, out) = normal_cycle_at(DANGER_HIGH_FACTOR * boiler.max_limit);
    assert_eq!(out, vec![ToUnits::ClosePump(1), ToUnits::Mode(Mode::Normal)]);

    let (_, out) = normal_cycle_at(DANGER_LOW_FACTOR * boiler.min_limit);
    assert_eq!(out, vec![ToUnits::OpenPump(1), ToUnits::Mode(Mode::Normal)]);
}

#[test]
fn normal_window_bounds_need_no_pump_command() {
    let boiler = Constants::default().boiler;
    for level in [boiler.min_normal, boiler.max_normal] {
        let (_, out) = normal_cycle_at(level);
        assert_eq!(out, vec![ToUnits::Mode(Mode::Normal)], "level {level}");
    }
}

#[test]
fn danger_halts_degraded_operation() {
    let mut cu = degraded();
    let out = cu.process_messages(&plant(880.0, 5.0)).unwrap();
    assert_eq!(out, vec![ToUnits::Mode(Mode::EmergencyStop)]);
}

#[test]
fn failure_degrades_before_the_danger_guard() {
    let mut cu = normal();
    let out = cu.process_messages(&plant(120.0, 40.0)).unwrap();
    assert_eq!(
        out,
        vec![
            ToUnits::SteamFailureDetection,
            ToUnits::Mode(Mode::Degraded)
        ]
    );

    // Degraded applies the guard on the next cycle.
    let out = cu.process_messages(&plant(120.0, 5.0)).unwrap();
    assert_eq!(cu.mode(), Mode::EmergencyStop);
    assert_mode_last(&out, Mode::EmergencyStop);
}
