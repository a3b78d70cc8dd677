//! Shared plant scripts.

use boiler_common::control_unit::constants::Constants;
use boiler_common::control_unit::messages::{ToProgram, ToUnits};
use boiler_common::control_unit::mode::Mode;
use boiler_control_unit::controller::ControlUnit;

/// Level and steam readings of one cycle.
pub fn plant(level: f64, steam: f64) -> Vec<ToProgram> {
    vec![
        ToProgram::Level { liters: level },
        ToProgram::Steam {
            liters_per_sec: steam,
        },
    ]
}

/// `first` followed by the plant readings.
pub fn with(first: ToProgram, level: f64, steam: f64) -> Vec<ToProgram> {
    let mut msgs = vec![first];
    msgs.extend(plant(level, steam));
    msgs
}

/// Controller that went through start-up and is in Normal (after 2 cycles).
pub fn normal() -> ControlUnit {
    let mut cu = ControlUnit::new(Constants::default());
    let out = cu
        .process_messages(&with(ToProgram::SteamBoilerWaiting, 500.0, 0.0))
        .unwrap();
    assert_eq!(
        out,
        vec![
            ToUnits::ClosePump(1),
            ToUnits::ProgramReady,
            ToUnits::Mode(Mode::Initialization)
        ]
    );
    let out = cu
        .process_messages(&with(ToProgram::PhysicalUnitsReady, 500.0, 0.0))
        .unwrap();
    assert_eq!(out, vec![ToUnits::Mode(Mode::Normal)]);
    cu
}

/// Controller in Degraded because the steam sensor over-reported.
pub fn degraded() -> ControlUnit {
    let mut cu = normal();
    let out = cu.process_messages(&plant(500.0, 30.0)).unwrap();
    assert_eq!(
        out,
        vec![
            ToUnits::SteamFailureDetection,
            ToUnits::Mode(Mode::Degraded)
        ]
    );
    cu
}

/// Controller in Rescue because the level went past capacity.
pub fn rescue() -> ControlUnit {
    let mut cu = normal();
    let out = cu.process_messages(&plant(1001.0, 5.0)).unwrap();
    assert_eq!(
        out,
        vec![
            ToUnits::LevelFailureDetection,
            ToUnits::Mode(Mode::Rescue)
        ]
    );
    cu
}

/// Exactly one mode broadcast, and it is the last command.
pub fn assert_mode_last(out: &[ToUnits], mode: Mode) {
    let broadcasts = out
        .iter()
        .filter(|m| matches!(m, ToUnits::Mode(_)))
        .count();
    assert_eq!(broadcasts, 1, "{out:?}");
    assert_eq!(out.last(), Some(&ToUnits::Mode(mode)), "{out:?}");
}
