//! Actions postponed until the end of the message scan.
//!
//! Handlers running during the scan must not switch mode, because a switch
//! clears the expectation registry that is being scanned. They queue a
//! [`PendingAction`] instead; the controller drains the queue once the scan
//! is complete.

use std::collections::VecDeque;
use std::fmt;

use boiler_common::control_unit::assumptions::PhysicalUnit;
use boiler_common::control_unit::messages::{ToProgramKind, UnitId};
use boiler_common::control_unit::mode::Mode;

/// Why the controller shuts the plant down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltCause {
    /// A registered kind arrived more than once in one cycle.
    Duplicate(ToProgramKind),
    /// A message arrived that nothing was waiting for.
    Unsolicited(ToProgramKind),
    /// A message named a pump the plant does not have.
    InvalidUnit { kind: ToProgramKind, n: UnitId },
    /// `stop` received on too many consecutive cycles.
    StopRequested,
    /// Steam or level outside what start-up tolerates.
    StartupReadings,
    /// Level close to a physical limit.
    LevelDanger,
}

impl fmt::Display for HaltCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Duplicate(kind) => write!(f, "duplicate `{kind}` in one cycle"),
            Self::Unsolicited(kind) => write!(f, "unsolicited `{kind}`"),
            Self::InvalidUnit { kind, n } => write!(f, "`{kind}` names unknown pump {n}"),
            Self::StopRequested => f.write_str("stop requested by the units"),
            Self::StartupReadings => f.write_str("start-up readings out of tolerance"),
            Self::LevelDanger => f.write_str("water level in danger zone"),
        }
    }
}

/// Work item run after the message scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAction {
    /// `steam_boiler_waiting` arrived; start filling.
    CheckBoilerWaiting,
    /// `physical_units_ready` arrived; leave initialization.
    EnterOperation,
    /// The units acknowledged a failure detection.
    FailureAcknowledged(PhysicalUnit),
    /// Evaluate the given mode's rules against this cycle's readings.
    Supervise(Mode),
    /// Shut down.
    Halt(HaltCause),
}

/// FIFO of [`PendingAction`]s.
///
/// Actions queued while draining run in the same drain, after the ones
/// already waiting.
#[derive(Debug, Default)]
pub struct DeferredQueue {
    actions: VecDeque<PendingAction>,
}

impl DeferredQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an action behind everything already waiting.
    #[inline]
    pub fn run_last(&mut self, action: PendingAction) {
        self.actions.push_back(action);
    }

    /// Next action to run.
    #[inline]
    pub fn pop(&mut self) -> Option<PendingAction> {
        self.actions.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}
