//! Integration test: failure detection and repair.
//!
//! Detections are sent until acknowledged, repairs are acknowledged, and the
//! controller moves between Normal, Degraded and Rescue as flags rise and
//! clear.

use boiler_common::control_unit::assumptions::{FailureAssumptions, PhysicalUnit};
use boiler_common::control_unit::messages::{
    PumpControlState, PumpState, ToProgram, ToProgramKind, ToUnits,
};
use boiler_common::control_unit::mode::Mode;

use super::support::{assert_mode_last, degraded, normal, plant, rescue, with};

// ── Helpers ──

fn pump_report(n: u8, state: PumpState, flow: PumpControlState) -> Vec<ToProgram> {
    let mut msgs = plant(500.0, 5.0);
    msgs.push(ToProgram::PumpState { n, state });
    msgs.push(ToProgram::PumpControlState { n, state: flow });
    msgs
}

// ── Steam ──

#[test]
fn steam_failure_round_trip() {
    let mut cu = degraded();
    assert!(cu.assumptions().contains(FailureAssumptions::STEAM));
    assert!(cu.is_expecting(ToProgramKind::SteamOutcomeFailureAcknowledgement));

    // Unacknowledged: sent again, mode kept even with sane readings.
    for _ in 0..2 {
        let out = cu.process_messages(&plant(500.0, 5.0)).unwrap();
        assert_eq!(
            out,
            vec![
                ToUnits::SteamFailureDetection,
                ToUnits::Mode(Mode::Degraded)
            ]
        );
    }

    let out = cu
        .process_messages(&with(ToProgram::SteamOutcomeFailureAcknowledgement, 500.0, 5.0))
        .unwrap();
    assert_eq!(out, vec![ToUnits::Mode(Mode::Degraded)]);
    assert_eq!(cu.pending_detections().count(), 0);
    assert!(!cu.is_expecting(ToProgramKind::SteamOutcomeFailureAcknowledgement));

    let out = cu
        .process_messages(&with(ToProgram::SteamRepaired, 500.0, 5.0))
        .unwrap();
    assert_eq!(
        out,
        vec![
            ToUnits::SteamRepairedAcknowledgement,
            ToUnits::Mode(Mode::Normal)
        ]
    );
    assert!(cu.assumptions().all_trusted());

    let out = cu.process_messages(&plant(500.0, 5.0)).unwrap();
    assert_eq!(out, vec![ToUnits::Mode(Mode::Normal)]);
}

#[test]
fn missing_steam_reading_is_a_failure() {
    let mut cu = normal();
    let out = cu
        .process_messages(&[ToProgram::Level { liters: 500.0 }])
        .unwrap();
    assert_eq!(
        out,
        vec![
            ToUnits::SteamFailureDetection,
            ToUnits::Mode(Mode::Degraded)
        ]
    );
}

#[test]
fn repair_before_acknowledgement_stops_the_resend() {
    let mut cu = degraded();
    let out = cu
        .process_messages(&with(ToProgram::SteamRepaired, 500.0, 5.0))
        .unwrap();
    assert_eq!(
        out,
        vec![
            ToUnits::SteamFailureDetection,
            ToUnits::SteamRepairedAcknowledgement,
            ToUnits::Mode(Mode::Normal)
        ]
    );
    assert_eq!(cu.pending_detections().count(), 0);

    let out = cu.process_messages(&plant(500.0, 5.0)).unwrap();
    assert_eq!(out, vec![ToUnits::Mode(Mode::Normal)]);
}

// ── Level ──

#[test]
fn level_beyond_capacity_enters_rescue() {
    let mut cu = rescue();
    assert!(cu.assumptions().contains(FailureAssumptions::LEVEL));
    assert_eq!(
        cu.pending_detections().collect::<Vec<_>>(),
        vec![PhysicalUnit::Level]
    );

    let out = cu
        .process_messages(&with(ToProgram::LevelFailureAcknowledgement, 500.0, 5.0))
        .unwrap();
    assert_eq!(out, vec![ToUnits::Mode(Mode::Rescue)]);

    // Sane level alone does not end Rescue; the repair notice does.
    let out = cu.process_messages(&plant(500.0, 5.0)).unwrap();
    assert_eq!(out, vec![ToUnits::Mode(Mode::Rescue)]);

    let out = cu
        .process_messages(&with(ToProgram::LevelRepaired, 500.0, 5.0))
        .unwrap();
    assert_eq!(
        out,
        vec![
            ToUnits::LevelRepairedAcknowledgement,
            ToUnits::Mode(Mode::Normal)
        ]
    );
}

#[test]
fn negative_level_enters_rescue() {
    let mut cu = normal();
    let out = cu.process_messages(&plant(-0.5, 5.0)).unwrap();
    assert_eq!(
        out,
        vec![ToUnits::LevelFailureDetection, ToUnits::Mode(Mode::Rescue)]
    );
}

#[test]
fn degraded_loses_the_level() {
    let mut cu = degraded();
    let out = cu
        .process_messages(&[ToProgram::Steam { liters_per_sec: 5.0 }])
        .unwrap();
    assert_eq!(
        out,
        vec![
            ToUnits::SteamFailureDetection,
            ToUnits::LevelFailureDetection,
            ToUnits::Mode(Mode::Rescue)
        ]
    );
    assert!(cu.is_expecting(ToProgramKind::SteamOutcomeFailureAcknowledgement));
    assert!(cu.is_expecting(ToProgramKind::LevelFailureAcknowledgement));
}

#[test]
fn rescue_with_open_steam_failure_leaves_to_degraded() {
    let mut cu = rescue();
    let mut incoming = vec![ToProgram::LevelFailureAcknowledgement];
    incoming.push(ToProgram::Level { liters: 500.0 });
    let out = cu.process_messages(&incoming).unwrap();
    assert_eq!(
        out,
        vec![ToUnits::SteamFailureDetection, ToUnits::Mode(Mode::Rescue)]
    );

    let out = cu
        .process_messages(&with(ToProgram::LevelRepaired, 500.0, 5.0))
        .unwrap();
    // Resent once although both the resend and the Degraded entry ask.
    assert_eq!(
        out,
        vec![
            ToUnits::SteamFailureDetection,
            ToUnits::LevelRepairedAcknowledgement,
            ToUnits::Mode(Mode::Degraded)
        ]
    );
    assert!(cu.is_expecting(ToProgramKind::SteamOutcomeFailureAcknowledgement));
}

#[test]
fn repaired_level_that_reads_wrong_is_reported_again() {
    let mut cu = rescue();
    let out = cu
        .process_messages(&with(ToProgram::LevelRepaired, 1200.0, 5.0))
        .unwrap();
    assert_eq!(
        out,
        vec![
            ToUnits::LevelFailureDetection,
            ToUnits::LevelRepairedAcknowledgement,
            ToUnits::Mode(Mode::Rescue)
        ]
    );
    assert!(cu.assumptions().contains(FailureAssumptions::LEVEL));
}

// ── Pumps ──

#[test]
fn pump_ignoring_its_command_degrades() {
    // Pump 1 was closed during start-up.
    let mut cu = normal();
    let out = cu
        .process_messages(&pump_report(1, PumpState::Open, PumpControlState::Flowing))
        .unwrap();
    assert_eq!(
        out,
        vec![
            ToUnits::PumpFailureDetection(1),
            ToUnits::Mode(Mode::Degraded)
        ]
    );

    let out = cu
        .process_messages(&with(ToProgram::PumpFailureAcknowledgement(1), 500.0, 5.0))
        .unwrap();
    assert_eq!(out, vec![ToUnits::Mode(Mode::Degraded)]);

    let out = cu
        .process_messages(&with(ToProgram::PumpRepaired(1), 500.0, 5.0))
        .unwrap();
    assert_eq!(
        out,
        vec![
            ToUnits::PumpRepairedAcknowledgement(1),
            ToUnits::Mode(Mode::Normal)
        ]
    );
}

#[test]
fn pump_control_contradicting_its_pump_degrades() {
    let mut cu = normal();
    let out = cu
        .process_messages(&pump_report(1, PumpState::Closed, PumpControlState::Flowing))
        .unwrap();
    assert_eq!(
        out,
        vec![
            ToUnits::PumpControlFailureDetection(1),
            ToUnits::Mode(Mode::Degraded)
        ]
    );
    assert!(cu.assumptions().contains(FailureAssumptions::PUMP_CONTROL));
    assert!(!cu.assumptions().contains(FailureAssumptions::PUMP));
}

#[test]
fn consistent_pump_reports_keep_normal() {
    let mut cu = normal();
    let out = cu
        .process_messages(&pump_report(1, PumpState::Closed, PumpControlState::NotFlowing))
        .unwrap();
    assert_mode_last(&out, Mode::Normal);
    assert_eq!(out.len(), 1);
}

#[test]
fn degraded_still_detects_new_failures() {
    let mut cu = degraded();
    let mut incoming = pump_report(1, PumpState::Closed, PumpControlState::Flowing);
    incoming.push(ToProgram::SteamOutcomeFailureAcknowledgement);
    let out = cu.process_messages(&incoming).unwrap();
    assert_eq!(
        out,
        vec![
            ToUnits::PumpControlFailureDetection(1),
            ToUnits::Mode(Mode::Degraded)
        ]
    );
}

#[test]
fn repair_of_another_pump_control_keeps_the_failure() {
    let mut cu = normal();
    let out = cu
        .process_messages(&pump_report(2, PumpState::Open, PumpControlState::NotFlowing))
        .unwrap();
    assert_eq!(
        out,
        vec![
            ToUnits::PumpControlFailureDetection(2),
            ToUnits::Mode(Mode::Degraded)
        ]
    );

    let out = cu
        .process_messages(&with(ToProgram::PumpControlRepaired(3), 500.0, 5.0))
        .unwrap();
    assert_eq!(
        out,
        vec![
            ToUnits::PumpControlFailureDetection(2),
            ToUnits::PumpControlRepairedAcknowledgement(3),
            ToUnits::Mode(Mode::Degraded)
        ]
    );
    assert!(cu.assumptions().contains(FailureAssumptions::PUMP_CONTROL));
    assert!(cu.is_expecting(ToProgramKind::PumpControlFailureAcknowledgement));
    assert_eq!(
        cu.pending_detections().collect::<Vec<_>>(),
        vec![PhysicalUnit::PumpControl(2)]
    );

    let out = cu
        .process_messages(&with(ToProgram::PumpControlRepaired(2), 500.0, 5.0))
        .unwrap();
    assert_eq!(
        out,
        vec![
            ToUnits::PumpControlFailureDetection(2),
            ToUnits::PumpControlRepairedAcknowledgement(2),
            ToUnits::Mode(Mode::Normal)
        ]
    );
    assert_eq!(cu.pending_detections().count(), 0);
    assert!(!cu.is_expecting(ToProgramKind::PumpControlFailureAcknowledgement));
}

#[test]
fn acknowledged_pump_failure_survives_a_foreign_repair() {
    let mut cu = normal();
    cu.process_messages(&pump_report(1, PumpState::Open, PumpControlState::Flowing))
        .unwrap();
    cu.process_messages(&with(ToProgram::PumpFailureAcknowledgement(1), 500.0, 5.0))
        .unwrap();
    assert_eq!(cu.pending_detections().count(), 0);

    let out = cu
        .process_messages(&with(ToProgram::PumpRepaired(2), 500.0, 5.0))
        .unwrap();
    assert_eq!(
        out,
        vec![
            ToUnits::PumpRepairedAcknowledgement(2),
            ToUnits::Mode(Mode::Degraded)
        ]
    );
    assert!(cu.assumptions().contains(FailureAssumptions::PUMP));
}
