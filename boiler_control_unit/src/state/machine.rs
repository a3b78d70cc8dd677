//! Operating mode transitions.
//!
//! Initialization → Normal | Degraded → Rescue, with EmergencyStop reachable
//! from everywhere and left never. The controller asks this table before it
//! switches; a rejected transition leaves the mode unchanged.

use boiler_common::control_unit::mode::Mode;

/// Result of a mode transition attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionResult {
    /// Transition succeeded, new mode.
    Ok(Mode),
    /// Transition rejected, reason.
    Rejected(&'static str),
}

/// Holder of the current mode.
#[derive(Debug, Clone, Default)]
pub struct ModeStateMachine {
    mode: Mode,
}

impl ModeStateMachine {
    /// Start in Initialization.
    pub const fn new() -> Self {
        Self {
            mode: Mode::Initialization,
        }
    }

    #[inline]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Attempt to switch to `to`.
    pub fn transition(&mut self, to: Mode) -> TransitionResult {
        use Mode::*;

        let allowed = match (self.mode, to) {
            (_, EmergencyStop) => true,
            (EmergencyStop, _) => false,
            (Initialization, Normal | Degraded) => true,
            (Normal, Degraded | Rescue) => true,
            (Degraded, Normal | Rescue) => true,
            (Rescue, Normal | Degraded) => true,
            _ => false,
        };

        if !allowed {
            return TransitionResult::Rejected(invalid_transition_reason(self.mode, to));
        }
        self.mode = to;
        TransitionResult::Ok(to)
    }

    /// Force EmergencyStop regardless of the current mode.
    #[inline]
    pub fn force_emergency_stop(&mut self) {
        self.mode = Mode::EmergencyStop;
    }
}

fn invalid_transition_reason(from: Mode, to: Mode) -> &'static str {
    use Mode::*;
    match (from, to) {
        (EmergencyStop, _) => "EmergencyStop: no transition allowed",
        (_, Initialization) => "Initialization cannot be re-entered",
        (Initialization, Rescue) => "Initialization: only Normal or Degraded allowed",
        _ => "already in requested mode",
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
