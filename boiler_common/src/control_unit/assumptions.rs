//! Failure assumptions about the physical units.
//!
//! The controller keeps one flag per unit class. A flag is raised when a
//! failure is detected and lowered when the unit reports its repair.

use bitflags::bitflags;
use std::fmt;

use super::messages::{ToProgram, ToUnits, UnitId};

bitflags! {
    /// Unit classes currently assumed broken.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FailureAssumptions: u8 {
        /// At least one pump behaves unlike its last command.
        const PUMP         = 0x01;
        /// At least one pump controller contradicts its pump.
        const PUMP_CONTROL = 0x02;
        /// Level sensor missing or out of range. Forces Rescue.
        const LEVEL        = 0x04;
        /// Steam sensor missing or out of range.
        const STEAM        = 0x08;
    }
}

impl FailureAssumptions {
    /// Number of unit classes.
    pub const CLASSES: usize = 4;

    /// Returns true if no unit is assumed broken.
    #[inline]
    pub const fn all_trusted(&self) -> bool {
        self.is_empty()
    }
}

impl Default for FailureAssumptions {
    fn default() -> Self {
        Self::empty()
    }
}

/// A concrete physical unit that can fail and be repaired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhysicalUnit {
    Pump(UnitId),
    PumpControl(UnitId),
    Level,
    Steam,
}

impl PhysicalUnit {
    /// Assumption flag of the unit's class.
    pub const fn flag(self) -> FailureAssumptions {
        match self {
            Self::Pump(_) => FailureAssumptions::PUMP,
            Self::PumpControl(_) => FailureAssumptions::PUMP_CONTROL,
            Self::Level => FailureAssumptions::LEVEL,
            Self::Steam => FailureAssumptions::STEAM,
        }
    }

    /// Dense per-class index in `0..FailureAssumptions::CLASSES`.
    pub const fn slot(self) -> usize {
        match self {
            Self::Pump(_) => 0,
            Self::PumpControl(_) => 1,
            Self::Level => 2,
            Self::Steam => 3,
        }
    }

    /// Detection notice sent to the units.
    pub const fn failure_detection(self) -> ToUnits {
        match self {
            Self::Pump(n) => ToUnits::PumpFailureDetection(n),
            Self::PumpControl(n) => ToUnits::PumpControlFailureDetection(n),
            Self::Level => ToUnits::LevelFailureDetection,
            Self::Steam => ToUnits::SteamFailureDetection,
        }
    }

    /// Unit named by a `*_repaired` notice.
    pub const fn repaired_by(msg: &ToProgram) -> Option<Self> {
        match *msg {
            ToProgram::PumpRepaired(n) => Some(Self::Pump(n)),
            ToProgram::PumpControlRepaired(n) => Some(Self::PumpControl(n)),
            ToProgram::LevelRepaired => Some(Self::Level),
            ToProgram::SteamRepaired => Some(Self::Steam),
            _ => None,
        }
    }

    /// Unit named by a `*_failure_acknowledgement`.
    pub const fn acknowledged_by(msg: &ToProgram) -> Option<Self> {
        match *msg {
            ToProgram::PumpFailureAcknowledgement(n) => Some(Self::Pump(n)),
            ToProgram::PumpControlFailureAcknowledgement(n) => Some(Self::PumpControl(n)),
            ToProgram::LevelFailureAcknowledgement => Some(Self::Level),
            ToProgram::SteamOutcomeFailureAcknowledgement => Some(Self::Steam),
            _ => None,
        }
    }
}

impl fmt::Display for PhysicalUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pump(n) => write!(f, "pump {n}"),
            Self::PumpControl(n) => write!(f, "pump control {n}"),
            Self::Level => f.write_str("level sensor"),
            Self::Steam => f.write_str("steam sensor"),
        }
    }
}
