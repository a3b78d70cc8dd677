//! Failure detection.
//!
//! Compares one cycle's readings with the plant constants and with the pump
//! commands the controller issued earlier. The level sensor is not checked
//! here: what a bad level means depends on the mode.

use boiler_common::consts::MAX_PUMPS;
use boiler_common::control_unit::assumptions::PhysicalUnit;
use boiler_common::control_unit::constants::Constants;
use boiler_common::control_unit::messages::{PumpState, UnitId};
use heapless::Vec;

use super::thresholds::is_valid_steam;
use crate::readings::Readings;

/// Upper bound of units flagged in one cycle: every pump, every pump
/// controller and the steam sensor.
pub const MAX_DETECTIONS: usize = 2 * MAX_PUMPS + 1;

/// Last command sent to one pump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PumpCommand {
    pub state: PumpState,
    /// Cycle in which the command went out.
    pub cycle: u64,
}

/// Last command per pump, indexed by `n - 1`.
pub type PumpCommands = [Option<PumpCommand>; MAX_PUMPS];

/// Units that misbehave this cycle, steam first, then pumps, then pump
/// controllers.
pub fn detect_failures(
    readings: &Readings,
    constants: &Constants,
    commands: &PumpCommands,
    cycle: u64,
) -> Vec<PhysicalUnit, MAX_DETECTIONS> {
    let mut failed = Vec::new();

    let steam_ok = readings
        .steam
        .is_some_and(|s| is_valid_steam(&constants.steam, s));
    if !steam_ok {
        flag(&mut failed, PhysicalUnit::Steam);
    }

    for &(n, state) in readings.pump_states.iter() {
        if let Some(cmd) = command_for(commands, n) {
            if cmd.cycle < cycle && cmd.state != state {
                flag(&mut failed, PhysicalUnit::Pump(n));
            }
        }
    }

    for &(n, flow) in readings.pump_control_states.iter() {
        if let Some(pump) = readings.pump_state(n) {
            if pump.is_open() != flow.is_flowing() {
                flag(&mut failed, PhysicalUnit::PumpControl(n));
            }
        }
    }

    failed
}

/// Readings hold at most `MAX_PUMPS` entries per pump table, so the list
/// cannot overflow.
fn flag(failed: &mut Vec<PhysicalUnit, MAX_DETECTIONS>, unit: PhysicalUnit) {
    let pushed = failed.push(unit);
    debug_assert!(pushed.is_ok(), "detection list full at {unit}");
}

fn command_for(commands: &PumpCommands, n: UnitId) -> Option<PumpCommand> {
    let idx = usize::from(n).checked_sub(1)?;
    commands.get(idx).copied().flatten()
}
