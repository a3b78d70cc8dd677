//! Integration test: cycle driver.
//!
//! Scripted units behind [`PhysicalUnits`], deadline checkpoints and the
//! paced loop.

use std::collections::VecDeque;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use boiler_common::control_unit::constants::Constants;
use boiler_common::control_unit::messages::{ToProgram, ToUnits};
use boiler_common::control_unit::mode::Mode;
use boiler_control_unit::controller::ControlUnit;
use boiler_control_unit::cycle::{Checkpoint, CycleError, CycleRunner, PhysicalUnits};

use super::support::{plant, with};

// ── Helpers ──

/// Units that replay one batch of messages per cycle and record what they
/// were told. Once the script runs out they go quiet.
#[derive(Default)]
struct ScriptedUnits {
    script: VecDeque<Vec<ToProgram>>,
    applied: Vec<Vec<ToUnits>>,
    read_delay: Duration,
}

impl ScriptedUnits {
    fn new(script: Vec<Vec<ToProgram>>) -> Self {
        Self {
            script: script.into(),
            ..Self::default()
        }
    }

    fn slow(read_delay: Duration) -> Self {
        Self {
            read_delay,
            ..Self::default()
        }
    }
}

impl PhysicalUnits for ScriptedUnits {
    fn read_messages(&mut self) -> Vec<ToProgram> {
        if !self.read_delay.is_zero() {
            std::thread::sleep(self.read_delay);
        }
        self.script.pop_front().unwrap_or_default()
    }

    fn apply(&mut self, commands: &[ToUnits]) {
        self.applied.push(commands.to_vec());
    }
}

fn runner(units: ScriptedUnits, budget: Duration) -> CycleRunner<ScriptedUnits> {
    CycleRunner::new(ControlUnit::new(Constants::default()), units, budget)
}

// ── Tests ──

#[test]
fn drives_the_plant_into_normal() {
    let units = ScriptedUnits::new(vec![
        with(ToProgram::SteamBoilerWaiting, 500.0, 0.0),
        with(ToProgram::PhysicalUnitsReady, 500.0, 0.0),
        plant(500.0, 5.0),
    ]);
    let mut r = runner(units, Duration::from_secs(1));
    for _ in 0..3 {
        r.run_cycle().unwrap();
    }

    assert_eq!(r.controller().mode(), Mode::Normal);
    assert_eq!(r.stats().cycle_count, 3);
    assert_eq!(r.stats().overruns, 0);
    assert_eq!(
        r.units().applied,
        vec![
            vec![
                ToUnits::ClosePump(1),
                ToUnits::ProgramReady,
                ToUnits::Mode(Mode::Initialization)
            ],
            vec![ToUnits::Mode(Mode::Normal)],
            vec![ToUnits::Mode(Mode::Normal)],
        ]
    );
}

#[test]
fn late_read_skips_compute_and_apply() {
    let mut r = runner(
        ScriptedUnits::slow(Duration::from_millis(20)),
        Duration::from_millis(2),
    );
    let err = r.run_cycle().unwrap_err();
    assert!(matches!(
        err,
        CycleError::Overrun {
            checkpoint: Checkpoint::Read,
            ..
        }
    ));
    assert!(r.units().applied.is_empty());
    assert_eq!(r.controller().cycle(), 0);
    assert_eq!(r.stats().overruns, 1);
    assert_eq!(r.stats().cycle_count, 1);
}

#[test]
fn run_stops_after_max_cycles() {
    let mut r = runner(ScriptedUnits::default(), Duration::from_millis(50));
    let running = AtomicBool::new(true);
    r.run(&running, Some(4)).unwrap();
    assert_eq!(r.stats().cycle_count, 4);
    assert_eq!(r.units().applied.len(), 4);
    assert_eq!(r.controller().mode(), Mode::Initialization);
}

#[test]
fn overruns_are_survived_by_default() {
    let mut r = runner(
        ScriptedUnits::slow(Duration::from_millis(10)),
        Duration::from_millis(1),
    );
    let running = AtomicBool::new(true);
    r.run(&running, Some(2)).unwrap();
    assert_eq!(r.stats().cycle_count, 2);
    assert_eq!(r.stats().overruns, 2);
}

#[test]
fn overrun_aborts_when_asked() {
    let mut r = runner(
        ScriptedUnits::slow(Duration::from_millis(10)),
        Duration::from_millis(1),
    )
    .abort_on_overrun(true);
    let running = AtomicBool::new(true);
    let err = r.run(&running, Some(5)).unwrap_err();
    assert!(matches!(err, CycleError::Overrun { .. }));
    assert_eq!(r.stats().cycle_count, 1);
}

#[test]
fn stop_requests_reach_the_controller() {
    let units = ScriptedUnits::new(vec![vec![ToProgram::Stop]; 3]);
    let mut r = runner(units, Duration::from_millis(50));
    let running = AtomicBool::new(true);
    r.run(&running, Some(3)).unwrap();
    assert_eq!(r.controller().mode(), Mode::EmergencyStop);
    assert_eq!(
        r.units().applied.last(),
        Some(&vec![ToUnits::Mode(Mode::EmergencyStop)])
    );
}

#[test]
fn external_stop_through_the_runner() {
    let mut r = runner(ScriptedUnits::default(), Duration::from_millis(250));
    assert_eq!(r.budget(), Duration::from_millis(250));

    r.units_mut()
        .script
        .push_back(with(ToProgram::SteamBoilerWaiting, 800.0, 0.0));
    r.run_cycle().unwrap();
    assert!(r.controller().valve_open());
    assert_eq!(r.controller().readings().level, Some(800.0));

    r.controller_mut().emergency_stop();
    r.run_cycle().unwrap();
    assert_eq!(
        r.units().applied.last(),
        Some(&vec![ToUnits::Mode(Mode::EmergencyStop)])
    );
}
