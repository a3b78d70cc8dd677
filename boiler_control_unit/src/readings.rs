//! Per-cycle snapshot of what the physical units reported.
//!
//! Rebuilt from scratch every cycle. Pump and pump-control states are kept
//! in bounded vectors, one entry per pump, in arrival order. A second report
//! for the same pump (or a second level/steam reading) overwrites the first.

use boiler_common::consts::MAX_PUMPS;
use boiler_common::control_unit::messages::{
    PumpControlState, PumpState, ToProgram, ToProgramKind, UnitId,
};
use heapless::Vec;
use thiserror::Error;

/// A reading the controller cannot make sense of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ReadingAnomaly {
    #[error("`{kind}` names pump {n}, plant has {count}")]
    InvalidUnit {
        kind: ToProgramKind,
        n: UnitId,
        count: u8,
    },
}

/// Readings of one cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Readings {
    pub pump_states: Vec<(UnitId, PumpState), MAX_PUMPS>,
    pub pump_control_states: Vec<(UnitId, PumpControlState), MAX_PUMPS>,
    /// Water level [l].
    pub level: Option<f64>,
    /// Steam output [l/s].
    pub steam: Option<f64>,
    /// At least one `stop` arrived.
    pub stop_requested: bool,
}

impl Readings {
    /// Build the snapshot from one cycle's messages.
    ///
    /// Every message naming a pump is checked against `pump_count`, not only
    /// the state reports.
    pub fn absorb(incoming: &[ToProgram], pump_count: u8) -> Result<Self, ReadingAnomaly> {
        let mut readings = Self::default();
        for msg in incoming {
            if let Some(n) = unit_of(msg) {
                if n == 0 || n > pump_count {
                    return Err(ReadingAnomaly::InvalidUnit {
                        kind: msg.kind(),
                        n,
                        count: pump_count,
                    });
                }
            }
            match *msg {
                ToProgram::PumpState { n, state } => {
                    upsert(&mut readings.pump_states, n, state, msg.kind(), pump_count)?;
                }
                ToProgram::PumpControlState { n, state } => {
                    upsert(
                        &mut readings.pump_control_states,
                        n,
                        state,
                        msg.kind(),
                        pump_count,
                    )?;
                }
                ToProgram::Level { liters } => readings.level = Some(liters),
                ToProgram::Steam { liters_per_sec } => readings.steam = Some(liters_per_sec),
                ToProgram::Stop => readings.stop_requested = true,
                _ => {}
            }
        }
        Ok(readings)
    }

    pub fn pump_state(&self, n: UnitId) -> Option<PumpState> {
        lookup(&self.pump_states, n)
    }

    pub fn pump_control_state(&self, n: UnitId) -> Option<PumpControlState> {
        lookup(&self.pump_control_states, n)
    }
}

fn unit_of(msg: &ToProgram) -> Option<UnitId> {
    match *msg {
        ToProgram::PumpState { n, .. }
        | ToProgram::PumpControlState { n, .. }
        | ToProgram::PumpRepaired(n)
        | ToProgram::PumpControlRepaired(n)
        | ToProgram::PumpFailureAcknowledgement(n)
        | ToProgram::PumpControlFailureAcknowledgement(n) => Some(n),
        _ => None,
    }
}

fn upsert<S: Copy>(
    slots: &mut Vec<(UnitId, S), MAX_PUMPS>,
    n: UnitId,
    state: S,
    kind: ToProgramKind,
    count: u8,
) -> Result<(), ReadingAnomaly> {
    if let Some(slot) = slots.iter_mut().find(|(id, _)| *id == n) {
        slot.1 = state;
        return Ok(());
    }
    slots
        .push((n, state))
        .map_err(|_| ReadingAnomaly::InvalidUnit { kind, n, count })
}

fn lookup<S: Copy>(slots: &[(UnitId, S)], n: UnitId) -> Option<S> {
    slots.iter().find(|(id, _)| *id == n).map(|(_, s)| *s)
}
