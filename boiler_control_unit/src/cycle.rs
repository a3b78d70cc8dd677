//! Cycle driver: read → compute → apply.
//!
//! Calls the controller once per cycle period. The deadline is checked at
//! three checkpoints; past it, the rest of the cycle is skipped and
//! [`CycleError::Overrun`] reports where the time ran out. The controller
//! holds no resources, so a skipped apply leaves nothing half done.
//!
//! ## Pacing
//! `std::thread::sleep` for the remainder of the period after each cycle.
//! A cycle that overran starts the next one immediately.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use boiler_common::control_unit::messages::{ToProgram, ToUnits};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::controller::ControlUnit;
use crate::error::ControlError;

// ─── Physical Units ─────────────────────────────────────────────────

/// The plant side of the exchange.
pub trait PhysicalUnits {
    /// Messages the units sent since the last call.
    fn read_messages(&mut self) -> Vec<ToProgram>;

    /// Deliver one cycle's commands.
    fn apply(&mut self, commands: &[ToUnits]);
}

/// Units that never answer and ignore every command.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisconnectedUnits;

impl PhysicalUnits for DisconnectedUnits {
    fn read_messages(&mut self) -> Vec<ToProgram> {
        Vec::new()
    }

    fn apply(&mut self, _commands: &[ToUnits]) {}
}

// ─── Cycle Statistics ───────────────────────────────────────────────

/// Per-cycle timing statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleStats {
    /// Total cycles executed.
    pub cycle_count: u64,
    /// Last cycle duration [ns].
    pub last_cycle_ns: u64,
    /// Minimum cycle duration [ns].
    pub min_cycle_ns: u64,
    /// Maximum cycle duration [ns].
    pub max_cycle_ns: u64,
    /// Running sum for average computation.
    pub sum_cycle_ns: u128,
    /// Number of overruns detected.
    pub overruns: u64,
}

impl Default for CycleStats {
    fn default() -> Self {
        Self::new()
    }
}

impl CycleStats {
    /// Create a new zeroed stats instance.
    pub const fn new() -> Self {
        Self {
            cycle_count: 0,
            last_cycle_ns: 0,
            min_cycle_ns: u64::MAX,
            max_cycle_ns: 0,
            sum_cycle_ns: 0,
            overruns: 0,
        }
    }

    /// Record a cycle duration.
    #[inline]
    pub fn record(&mut self, duration: Duration) {
        let ns = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        self.cycle_count += 1;
        self.last_cycle_ns = ns;
        self.min_cycle_ns = self.min_cycle_ns.min(ns);
        self.max_cycle_ns = self.max_cycle_ns.max(ns);
        self.sum_cycle_ns += u128::from(ns);
    }

    /// Average cycle time [ns] (returns 0 if no cycles).
    #[inline]
    pub fn avg_cycle_ns(&self) -> u64 {
        if self.cycle_count == 0 {
            0
        } else {
            (self.sum_cycle_ns / u128::from(self.cycle_count)) as u64
        }
    }
}

// ─── Errors ─────────────────────────────────────────────────────────

/// Point in the cycle where the deadline is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checkpoint {
    Read,
    Compute,
    Apply,
}

impl fmt::Display for Checkpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Read => "read",
            Self::Compute => "compute",
            Self::Apply => "apply",
        })
    }
}

#[derive(Debug, Error)]
pub enum CycleError {
    /// Deadline passed at `checkpoint`.
    #[error("cycle overrun at {checkpoint}: {elapsed:?} > {budget:?} budget")]
    Overrun {
        checkpoint: Checkpoint,
        elapsed: Duration,
        budget: Duration,
    },

    #[error("controller error: {0}")]
    Control(#[from] ControlError),
}

// ─── Cycle Runner ───────────────────────────────────────────────────

/// Owns the controller and the units and drives them cycle by cycle.
pub struct CycleRunner<U: PhysicalUnits> {
    controller: ControlUnit,
    units: U,
    stats: CycleStats,
    budget: Duration,
    abort_on_overrun: bool,
}

impl<U: PhysicalUnits> CycleRunner<U> {
    /// `budget` is both the deadline of one cycle and the pacing period.
    pub fn new(controller: ControlUnit, units: U, budget: Duration) -> Self {
        Self {
            controller,
            units,
            stats: CycleStats::new(),
            budget,
            abort_on_overrun: false,
        }
    }

    /// Return from [`run`](Self::run) on the first overrun.
    pub fn abort_on_overrun(mut self, abort: bool) -> Self {
        self.abort_on_overrun = abort;
        self
    }

    pub fn controller(&self) -> &ControlUnit {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut ControlUnit {
        &mut self.controller
    }

    pub fn units(&self) -> &U {
        &self.units
    }

    pub fn units_mut(&mut self) -> &mut U {
        &mut self.units
    }

    pub fn stats(&self) -> &CycleStats {
        &self.stats
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Run a single cycle.
    ///
    /// # Errors
    /// [`CycleError::Overrun`] when a checkpoint is passed late, or the
    /// controller's error.
    pub fn run_cycle(&mut self) -> Result<(), CycleError> {
        let start = Instant::now();
        let result = self.cycle_body(start);
        self.stats.record(start.elapsed());
        if matches!(result, Err(CycleError::Overrun { .. })) {
            self.stats.overruns += 1;
        }
        result
    }

    /// Cycle until `running` is cleared or `max_cycles` cycles ran.
    ///
    /// # Errors
    /// Controller errors always end the loop; overruns only with
    /// `abort_on_overrun`.
    pub fn run(
        &mut self,
        running: &AtomicBool,
        max_cycles: Option<u64>,
    ) -> Result<(), CycleError> {
        info!(budget = ?self.budget, "entering cycle loop");
        let mut ran = 0u64;
        while running.load(Ordering::SeqCst) {
            if max_cycles.is_some_and(|max| ran >= max) {
                break;
            }
            let start = Instant::now();
            match self.run_cycle() {
                Ok(()) => {}
                Err(e @ CycleError::Overrun { .. }) if !self.abort_on_overrun => {
                    warn!("{e}");
                }
                Err(e) => return Err(e),
            }
            ran += 1;

            if let Some(remaining) = self.budget.checked_sub(start.elapsed()) {
                std::thread::sleep(remaining);
            }
        }
        info!(
            cycles = self.stats.cycle_count,
            overruns = self.stats.overruns,
            avg_ns = self.stats.avg_cycle_ns(),
            max_ns = self.stats.max_cycle_ns,
            mode = %self.controller.mode(),
            "cycle loop stopped"
        );
        Ok(())
    }

    fn cycle_body(&mut self, start: Instant) -> Result<(), CycleError> {
        // ═══ READ ═══
        let incoming = self.units.read_messages();
        self.checkpoint(Checkpoint::Read, start)?;

        // ═══ COMPUTE ═══
        let outgoing = self.controller.process_messages(&incoming)?;
        self.checkpoint(Checkpoint::Compute, start)?;

        // ═══ APPLY ═══
        self.units.apply(&outgoing);
        self.checkpoint(Checkpoint::Apply, start)?;

        debug!(
            incoming = incoming.len(),
            outgoing = outgoing.len(),
            "cycle applied"
        );
        Ok(())
    }

    fn checkpoint(&self, checkpoint: Checkpoint, start: Instant) -> Result<(), CycleError> {
        let elapsed = start.elapsed();
        if elapsed > self.budget {
            return Err(CycleError::Overrun {
                checkpoint,
                elapsed,
                budget: self.budget,
            });
        }
        Ok(())
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
