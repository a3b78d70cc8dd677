//! Message alphabets exchanged with the physical units.
//!
//! Two disjoint families: [`ToUnits`] (control unit → units) and
//! [`ToProgram`] (units → control unit). Protocol identity is the message
//! *kind*, the payload-free discriminant returned by `kind()`; the
//! acknowledgement table is expressed on the kinds.
//!
//! | Command                          | Acknowledged by                          |
//! |----------------------------------|------------------------------------------|
//! | `program_ready`                  | `physical_units_ready`                   |
//! | `pump_failure_detection`         | `pump_failure_acknowledgement`           |
//! | `pump_control_failure_detection` | `pump_control_failure_acknowledgement`   |
//! | `level_failure_detection`        | `level_failure_acknowledgement`          |
//! | `steam_failure_detection`        | `steam_outcome_failure_acknowledgement`  |
//! | `pump_repaired` (incoming)       | `pump_repaired_acknowledgement`          |
//! | `pump_control_repaired` (in)     | `pump_control_repaired_acknowledgement`  |
//! | `level_repaired` (incoming)      | `level_repaired_acknowledgement`         |
//! | `steam_repaired` (incoming)      | `steam_repaired_acknowledgement`         |

use serde::{Deserialize, Serialize};
use static_assertions::const_assert_eq;
use std::fmt;

use super::mode::Mode;

/// Pump / pump controller identifier (1-based).
pub type UnitId = u8;

/// Reported state of a pump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PumpState {
    Open,
    Closed,
}

impl PumpState {
    #[inline]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }
}

/// Reported state of a pump controller (water flow through the pump).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PumpControlState {
    Flowing,
    NotFlowing,
}

impl PumpControlState {
    #[inline]
    pub const fn is_flowing(self) -> bool {
        matches!(self, Self::Flowing)
    }
}

// ─── Control unit → physical units ─────────────────────────────────

/// Message sent by the control unit to the physical units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToUnits {
    Mode(Mode),
    ProgramReady,
    Valve,
    OpenPump(UnitId),
    ClosePump(UnitId),
    PumpFailureDetection(UnitId),
    PumpControlFailureDetection(UnitId),
    LevelFailureDetection,
    SteamFailureDetection,
    PumpRepairedAcknowledgement(UnitId),
    PumpControlRepairedAcknowledgement(UnitId),
    LevelRepairedAcknowledgement,
    SteamRepairedAcknowledgement,
}

/// Discriminant of [`ToUnits`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum ToUnitsKind {
    Mode = 0,
    ProgramReady = 1,
    Valve = 2,
    OpenPump = 3,
    ClosePump = 4,
    PumpFailureDetection = 5,
    PumpControlFailureDetection = 6,
    LevelFailureDetection = 7,
    SteamFailureDetection = 8,
    PumpRepairedAcknowledgement = 9,
    PumpControlRepairedAcknowledgement = 10,
    LevelRepairedAcknowledgement = 11,
    SteamRepairedAcknowledgement = 12,
}

impl ToUnitsKind {
    /// Number of outgoing kinds.
    pub const COUNT: usize = 13;

    pub const ALL: [Self; Self::COUNT] = [
        Self::Mode,
        Self::ProgramReady,
        Self::Valve,
        Self::OpenPump,
        Self::ClosePump,
        Self::PumpFailureDetection,
        Self::PumpControlFailureDetection,
        Self::LevelFailureDetection,
        Self::SteamFailureDetection,
        Self::PumpRepairedAcknowledgement,
        Self::PumpControlRepairedAcknowledgement,
        Self::LevelRepairedAcknowledgement,
        Self::SteamRepairedAcknowledgement,
    ];

    /// Incoming kind that acknowledges this command, if any.
    pub const fn acknowledgement(self) -> Option<ToProgramKind> {
        match self {
            Self::ProgramReady => Some(ToProgramKind::PhysicalUnitsReady),
            Self::PumpFailureDetection => Some(ToProgramKind::PumpFailureAcknowledgement),
            Self::PumpControlFailureDetection => {
                Some(ToProgramKind::PumpControlFailureAcknowledgement)
            }
            Self::LevelFailureDetection => Some(ToProgramKind::LevelFailureAcknowledgement),
            Self::SteamFailureDetection => {
                Some(ToProgramKind::SteamOutcomeFailureAcknowledgement)
            }
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Mode => "mode",
            Self::ProgramReady => "program_ready",
            Self::Valve => "valve",
            Self::OpenPump => "open_pump",
            Self::ClosePump => "close_pump",
            Self::PumpFailureDetection => "pump_failure_detection",
            Self::PumpControlFailureDetection => "pump_control_failure_detection",
            Self::LevelFailureDetection => "level_failure_detection",
            Self::SteamFailureDetection => "steam_failure_detection",
            Self::PumpRepairedAcknowledgement => "pump_repaired_acknowledgement",
            Self::PumpControlRepairedAcknowledgement => "pump_control_repaired_acknowledgement",
            Self::LevelRepairedAcknowledgement => "level_repaired_acknowledgement",
            Self::SteamRepairedAcknowledgement => "steam_repaired_acknowledgement",
        }
    }
}

impl fmt::Display for ToUnitsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl ToUnits {
    pub const fn kind(&self) -> ToUnitsKind {
        match self {
            Self::Mode(_) => ToUnitsKind::Mode,
            Self::ProgramReady => ToUnitsKind::ProgramReady,
            Self::Valve => ToUnitsKind::Valve,
            Self::OpenPump(_) => ToUnitsKind::OpenPump,
            Self::ClosePump(_) => ToUnitsKind::ClosePump,
            Self::PumpFailureDetection(_) => ToUnitsKind::PumpFailureDetection,
            Self::PumpControlFailureDetection(_) => ToUnitsKind::PumpControlFailureDetection,
            Self::LevelFailureDetection => ToUnitsKind::LevelFailureDetection,
            Self::SteamFailureDetection => ToUnitsKind::SteamFailureDetection,
            Self::PumpRepairedAcknowledgement(_) => ToUnitsKind::PumpRepairedAcknowledgement,
            Self::PumpControlRepairedAcknowledgement(_) => {
                ToUnitsKind::PumpControlRepairedAcknowledgement
            }
            Self::LevelRepairedAcknowledgement => ToUnitsKind::LevelRepairedAcknowledgement,
            Self::SteamRepairedAcknowledgement => ToUnitsKind::SteamRepairedAcknowledgement,
        }
    }
}

impl fmt::Display for ToUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.kind().name();
        match self {
            Self::Mode(mode) => write!(f, "{name}({mode})"),
            Self::OpenPump(n)
            | Self::ClosePump(n)
            | Self::PumpFailureDetection(n)
            | Self::PumpControlFailureDetection(n)
            | Self::PumpRepairedAcknowledgement(n)
            | Self::PumpControlRepairedAcknowledgement(n) => write!(f, "{name}({n})"),
            _ => f.write_str(name),
        }
    }
}

// ─── Physical units → control unit ─────────────────────────────────

/// Message sent by the physical units to the control unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToProgram {
    Stop,
    SteamBoilerWaiting,
    PhysicalUnitsReady,
    PumpState { n: UnitId, state: PumpState },
    PumpControlState { n: UnitId, state: PumpControlState },
    Level { liters: f64 },
    Steam { liters_per_sec: f64 },
    PumpRepaired(UnitId),
    PumpControlRepaired(UnitId),
    LevelRepaired,
    SteamRepaired,
    PumpFailureAcknowledgement(UnitId),
    PumpControlFailureAcknowledgement(UnitId),
    LevelFailureAcknowledgement,
    SteamOutcomeFailureAcknowledgement,
}

/// Discriminant of [`ToProgram`]; also the key of the expectation registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum ToProgramKind {
    Stop = 0,
    SteamBoilerWaiting = 1,
    PhysicalUnitsReady = 2,
    PumpState = 3,
    PumpControlState = 4,
    Level = 5,
    Steam = 6,
    PumpRepaired = 7,
    PumpControlRepaired = 8,
    LevelRepaired = 9,
    SteamRepaired = 10,
    PumpFailureAcknowledgement = 11,
    PumpControlFailureAcknowledgement = 12,
    LevelFailureAcknowledgement = 13,
    SteamOutcomeFailureAcknowledgement = 14,
}

impl ToProgramKind {
    /// Number of incoming kinds.
    pub const COUNT: usize = 15;

    pub const ALL: [Self; Self::COUNT] = [
        Self::Stop,
        Self::SteamBoilerWaiting,
        Self::PhysicalUnitsReady,
        Self::PumpState,
        Self::PumpControlState,
        Self::Level,
        Self::Steam,
        Self::PumpRepaired,
        Self::PumpControlRepaired,
        Self::LevelRepaired,
        Self::SteamRepaired,
        Self::PumpFailureAcknowledgement,
        Self::PumpControlFailureAcknowledgement,
        Self::LevelFailureAcknowledgement,
        Self::SteamOutcomeFailureAcknowledgement,
    ];

    /// Dense index in `0..COUNT`.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Outgoing kind the control unit answers this notice with, if any.
    pub const fn acknowledgement(self) -> Option<ToUnitsKind> {
        match self {
            Self::PumpRepaired => Some(ToUnitsKind::PumpRepairedAcknowledgement),
            Self::PumpControlRepaired => Some(ToUnitsKind::PumpControlRepairedAcknowledgement),
            Self::LevelRepaired => Some(ToUnitsKind::LevelRepairedAcknowledgement),
            Self::SteamRepaired => Some(ToUnitsKind::SteamRepairedAcknowledgement),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Stop => "stop",
            Self::SteamBoilerWaiting => "steam_boiler_waiting",
            Self::PhysicalUnitsReady => "physical_units_ready",
            Self::PumpState => "pump_state",
            Self::PumpControlState => "pump_control_state",
            Self::Level => "level",
            Self::Steam => "steam",
            Self::PumpRepaired => "pump_repaired",
            Self::PumpControlRepaired => "pump_control_repaired",
            Self::LevelRepaired => "level_repaired",
            Self::SteamRepaired => "steam_repaired",
            Self::PumpFailureAcknowledgement => "pump_failure_acknowledgement",
            Self::PumpControlFailureAcknowledgement => "pump_control_failure_acknowledgement",
            Self::LevelFailureAcknowledgement => "level_failure_acknowledgement",
            Self::SteamOutcomeFailureAcknowledgement => "steam_outcome_failure_acknowledgement",
        }
    }
}

impl fmt::Display for ToProgramKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl ToProgram {
    pub const fn kind(&self) -> ToProgramKind {
        match self {
            Self::Stop => ToProgramKind::Stop,
            Self::SteamBoilerWaiting => ToProgramKind::SteamBoilerWaiting,
            Self::PhysicalUnitsReady => ToProgramKind::PhysicalUnitsReady,
            Self::PumpState { .. } => ToProgramKind::PumpState,
            Self::PumpControlState { .. } => ToProgramKind::PumpControlState,
            Self::Level { .. } => ToProgramKind::Level,
            Self::Steam { .. } => ToProgramKind::Steam,
            Self::PumpRepaired(_) => ToProgramKind::PumpRepaired,
            Self::PumpControlRepaired(_) => ToProgramKind::PumpControlRepaired,
            Self::LevelRepaired => ToProgramKind::LevelRepaired,
            Self::SteamRepaired => ToProgramKind::SteamRepaired,
            Self::PumpFailureAcknowledgement(_) => ToProgramKind::PumpFailureAcknowledgement,
            Self::PumpControlFailureAcknowledgement(_) => {
                ToProgramKind::PumpControlFailureAcknowledgement
            }
            Self::LevelFailureAcknowledgement => ToProgramKind::LevelFailureAcknowledgement,
            Self::SteamOutcomeFailureAcknowledgement => {
                ToProgramKind::SteamOutcomeFailureAcknowledgement
            }
        }
    }

    /// Build the acknowledgement the control unit owes for a repaired notice.
    pub const fn repaired_acknowledgement(&self) -> Option<ToUnits> {
        match *self {
            Self::PumpRepaired(n) => Some(ToUnits::PumpRepairedAcknowledgement(n)),
            Self::PumpControlRepaired(n) => Some(ToUnits::PumpControlRepairedAcknowledgement(n)),
            Self::LevelRepaired => Some(ToUnits::LevelRepairedAcknowledgement),
            Self::SteamRepaired => Some(ToUnits::SteamRepairedAcknowledgement),
            _ => None,
        }
    }
}

impl fmt::Display for ToProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.kind().name();
        match self {
            Self::PumpState { n, state } => {
                let state = if state.is_open() { "open" } else { "closed" };
                write!(f, "{name}({n}, {state})")
            }
            Self::PumpControlState { n, state } => {
                let state = if state.is_flowing() { "flowing" } else { "not_flowing" };
                write!(f, "{name}({n}, {state})")
            }
            Self::Level { liters } => write!(f, "{name}({liters} l)"),
            Self::Steam { liters_per_sec } => write!(f, "{name}({liters_per_sec} l/s)"),
            Self::PumpRepaired(n)
            | Self::PumpControlRepaired(n)
            | Self::PumpFailureAcknowledgement(n)
            | Self::PumpControlFailureAcknowledgement(n) => write!(f, "{name}({n})"),
            _ => f.write_str(name),
        }
    }
}

const_assert_eq!(ToUnitsKind::ALL.len(), ToUnitsKind::COUNT);
const_assert_eq!(ToProgramKind::ALL.len(), ToProgramKind::COUNT);
const_assert_eq!(
    ToProgramKind::SteamOutcomeFailureAcknowledgement as usize + 1,
    ToProgramKind::COUNT
);
