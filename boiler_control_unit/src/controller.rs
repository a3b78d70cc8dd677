//! The steam-boiler control unit.
//!
//! [`ControlUnit::process_messages`] runs one cycle:
//!
//! 1. Absorb the readings carried by the incoming messages. A message that
//!    names a pump the plant does not have stops the plant at once.
//! 2. Match the messages against the expectation registry. Reactions to
//!    arrived kinds are queued, resends of unacknowledged commands go out.
//! 3. Screen what nothing was waiting for: unsolicited start-up messages
//!    halt the plant, `*_repaired` notices are acknowledged, and `stop`
//!    is counted.
//! 4. Queue supervision of the current mode, then drain the deferred queue.
//! 5. Broadcast the mode, last.
//!
//! Mode switches clear the registry and run the entry routine of the new
//! mode at once. Failure detections that were not acknowledged yet are sent
//! again on every entry into an operating mode.

use boiler_common::consts::{MAX_PUMPS, STOP_CYCLES_DEFAULT};
use boiler_common::control_unit::assumptions::{FailureAssumptions, PhysicalUnit};
use boiler_common::control_unit::constants::Constants;
use boiler_common::control_unit::messages::{
    PumpState, ToProgram, ToProgramKind, ToUnits, UnitId,
};
use boiler_common::control_unit::mode::Mode;
use tracing::{debug, error, info, warn};

use crate::deferred::{DeferredQueue, HaltCause, PendingAction};
use crate::error::ControlError;
use crate::protocol::UnitLink;
use crate::readings::{ReadingAnomaly, Readings};
use crate::safety::detection::{PumpCommand, PumpCommands, detect_failures};
use crate::safety::thresholds::{self, Window};
use crate::state::machine::{ModeStateMachine, TransitionResult};

/// Progress of the start-up sequence inside Initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StartupPhase {
    /// Waiting for `steam_boiler_waiting`.
    #[default]
    AwaitingBoiler,
    /// Bringing the level into the normal window.
    Filling,
    /// `program_ready` sent, waiting for `physical_units_ready`.
    AwaitingUnitsReady,
    /// Initialization left.
    Done,
}

/// Controller state. Owns no I/O; everything goes in and out through
/// [`process_messages`](Self::process_messages).
#[derive(Debug)]
pub struct ControlUnit {
    constants: Constants,
    stop_cycles: u32,
    machine: ModeStateMachine,
    link: UnitLink,
    deferred: DeferredQueue,
    readings: Readings,
    assumptions: FailureAssumptions,
    /// Unit that raised each class flag.
    failed: [Option<PhysicalUnit>; FailureAssumptions::CLASSES],
    /// Detections not acknowledged yet, one per unit class.
    pending: [Option<PhysicalUnit>; FailureAssumptions::CLASSES],
    pump_commands: PumpCommands,
    phase: StartupPhase,
    valve_open: bool,
    cycle: u64,
    stop_streak: u32,
    /// A mode switch happened in the current cycle.
    switched: bool,
}

impl ControlUnit {
    /// New controller in Initialization, waiting for the boiler.
    pub fn new(constants: Constants) -> Self {
        let mut cu = Self {
            constants,
            stop_cycles: STOP_CYCLES_DEFAULT,
            machine: ModeStateMachine::new(),
            link: UnitLink::new(),
            deferred: DeferredQueue::new(),
            readings: Readings::default(),
            assumptions: FailureAssumptions::empty(),
            failed: [None; FailureAssumptions::CLASSES],
            pending: [None; FailureAssumptions::CLASSES],
            pump_commands: [None; MAX_PUMPS],
            phase: StartupPhase::AwaitingBoiler,
            valve_open: false,
            cycle: 0,
            stop_streak: 0,
            switched: false,
        };
        cu.enter_initialization();
        cu
    }

    /// Consecutive `stop` cycles that force an emergency stop (at least 1).
    pub fn with_stop_cycles(mut self, cycles: u32) -> Self {
        self.stop_cycles = cycles.max(1);
        self
    }

    // ─── Accessors ──────────────────────────────────────────────────

    #[inline]
    pub fn mode(&self) -> Mode {
        self.machine.mode()
    }

    pub fn constants(&self) -> &Constants {
        &self.constants
    }

    pub fn assumptions(&self) -> FailureAssumptions {
        self.assumptions
    }

    /// Detections sent but not acknowledged yet.
    pub fn pending_detections(&self) -> impl Iterator<Item = PhysicalUnit> + '_ {
        self.pending.iter().flatten().copied()
    }

    pub fn startup_phase(&self) -> StartupPhase {
        self.phase
    }

    pub fn valve_open(&self) -> bool {
        self.valve_open
    }

    /// Readings of the last cycle.
    pub fn readings(&self) -> &Readings {
        &self.readings
    }

    /// Number of cycles processed.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Whether an expectation for `kind` is registered.
    pub fn is_expecting(&self, kind: ToProgramKind) -> bool {
        self.link.is_expecting(kind)
    }

    // ─── Cycle ──────────────────────────────────────────────────────

    /// Run one control cycle and return the commands for the units.
    ///
    /// The last command is always the mode broadcast.
    ///
    /// # Errors
    ///
    /// [`ControlError`] if a deferred action hit a programming error. The
    /// deferred queue is fully drained before the first error is returned.
    pub fn process_messages(
        &mut self,
        incoming: &[ToProgram],
    ) -> Result<Vec<ToUnits>, ControlError> {
        self.cycle += 1;
        self.switched = false;
        self.link.begin_cycle();
        debug!(
            cycle = self.cycle,
            mode = %self.mode(),
            incoming = incoming.len(),
            "cycle start"
        );

        self.readings = match Readings::absorb(incoming, self.constants.pump.count) {
            Ok(readings) => readings,
            Err(anomaly) => {
                debug!(%anomaly, "readings rejected");
                let ReadingAnomaly::InvalidUnit { kind, n, .. } = anomaly;
                // Nothing else in this cycle is trusted.
                self.halt(HaltCause::InvalidUnit { kind, n });
                Readings::default()
            }
        };

        let scan = self.link.dispatch(incoming);
        for kind in scan.duplicates {
            self.deferred
                .run_last(PendingAction::Halt(HaltCause::Duplicate(kind)));
        }
        for action in scan.present {
            self.deferred.run_last(action);
        }
        for msg in scan.resend {
            debug!(%msg, "resending unacknowledged command");
            self.link.send(msg).now();
        }

        if !self.mode().is_terminal() {
            self.screen(&scan.unmatched);
            self.count_stop();
        }

        self.deferred.run_last(PendingAction::Supervise(self.mode()));
        self.run_deferred()?;

        self.link.send(ToUnits::Mode(self.mode())).now();
        let outgoing = self.link.take_outbox();
        debug!(cycle = self.cycle, outgoing = outgoing.len(), "cycle done");
        Ok(outgoing)
    }

    /// Force EmergencyStop now, from any mode.
    pub fn emergency_stop(&mut self) {
        let from = self.mode();
        if from.is_terminal() {
            return;
        }
        error!(%from, "EMERGENCY STOP");
        self.machine.force_emergency_stop();
        self.switched = true;
        self.link.clear_expectations();
    }

    /// Switch to `to` and run its entry routine.
    ///
    /// A transition the mode table rejects is logged and ignored.
    pub fn switch_mode(&mut self, to: Mode) -> Result<(), ControlError> {
        let from = self.mode();
        match self.machine.transition(to) {
            TransitionResult::Rejected(reason) => {
                warn!(%from, %to, reason, "mode transition rejected");
                Ok(())
            }
            TransitionResult::Ok(mode) => {
                info!(%from, to = %mode, "mode transition");
                self.switched = true;
                self.link.clear_expectations();
                self.enter(mode)
            }
        }
    }

    // ─── Message screening ──────────────────────────────────────────

    fn screen(&mut self, unmatched: &[ToProgram]) {
        for msg in unmatched {
            match msg.kind() {
                kind @ (ToProgramKind::SteamBoilerWaiting | ToProgramKind::PhysicalUnitsReady) => {
                    self.deferred
                        .run_last(PendingAction::Halt(HaltCause::Unsolicited(kind)));
                }
                _ => {
                    if let Some(unit) = PhysicalUnit::repaired_by(msg) {
                        self.repaired(unit, msg);
                    } else if let Some(unit) = PhysicalUnit::acknowledged_by(msg) {
                        debug!(%unit, "acknowledgement without pending detection");
                    }
                }
            }
        }
    }

    fn count_stop(&mut self) {
        if !self.readings.stop_requested {
            self.stop_streak = 0;
            return;
        }
        self.stop_streak += 1;
        debug!(streak = self.stop_streak, limit = self.stop_cycles, "stop received");
        if self.stop_streak >= self.stop_cycles {
            self.deferred
                .run_last(PendingAction::Halt(HaltCause::StopRequested));
        }
    }

    /// Acknowledge a repair notice. The class flag only clears when the
    /// notice names the unit that raised it.
    fn repaired(&mut self, unit: PhysicalUnit, notice: &ToProgram) {
        if let Some(ack) = notice.repaired_acknowledgement() {
            self.link.send(ack).now();
        }
        if self.failed[unit.slot()] != Some(unit) {
            debug!(%unit, flagged = ?self.failed[unit.slot()], "repair of a unit not flagged");
            return;
        }
        self.assumptions.remove(unit.flag());
        self.failed[unit.slot()] = None;
        self.pending[unit.slot()] = None;
        if let Some(kind) = unit.failure_detection().kind().acknowledgement() {
            self.link.forget(kind);
        }
        info!(%unit, "unit repaired");
    }

    // ─── Deferred actions ───────────────────────────────────────────

    fn run_deferred(&mut self) -> Result<(), ControlError> {
        let mut first_error = None;
        while let Some(action) = self.deferred.pop() {
            if let Err(e) = self.execute(action) {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn execute(&mut self, action: PendingAction) -> Result<(), ControlError> {
        if self.mode().is_terminal() && !matches!(action, PendingAction::Halt(_)) {
            debug!(?action, "skipped in emergency stop");
            return Ok(());
        }
        match action {
            PendingAction::CheckBoilerWaiting => {
                self.check_boiler_waiting();
                Ok(())
            }
            PendingAction::EnterOperation => self.enter_operation(),
            PendingAction::FailureAcknowledged(unit) => {
                self.failure_acknowledged(unit);
                Ok(())
            }
            PendingAction::Supervise(mode) => self.supervise(mode),
            PendingAction::Halt(cause) => {
                self.halt(cause);
                Ok(())
            }
        }
    }

    fn check_boiler_waiting(&mut self) {
        if self.phase != StartupPhase::AwaitingBoiler {
            self.halt(HaltCause::Unsolicited(ToProgramKind::SteamBoilerWaiting));
            return;
        }
        info!("steam boiler waiting");
        self.phase = StartupPhase::Filling;
    }

    fn enter_operation(&mut self) -> Result<(), ControlError> {
        info!("physical units ready");
        self.phase = StartupPhase::Done;
        let target = if self.assumptions.all_trusted() {
            Mode::Normal
        } else {
            Mode::Degraded
        };
        self.switch_mode(target)
    }

    fn failure_acknowledged(&mut self, unit: PhysicalUnit) {
        info!(%unit, "failure detection acknowledged");
        let slot = &mut self.pending[unit.slot()];
        if *slot == Some(unit) {
            *slot = None;
        }
    }

    fn halt(&mut self, cause: HaltCause) {
        if self.mode().is_terminal() {
            debug!(%cause, "already stopped");
            return;
        }
        warn!(%cause, "halting plant");
        self.emergency_stop();
    }

    // ─── Mode entry ─────────────────────────────────────────────────

    fn enter(&mut self, mode: Mode) -> Result<(), ControlError> {
        match mode {
            Mode::Initialization => {
                self.enter_initialization();
                Ok(())
            }
            Mode::Normal | Mode::Degraded | Mode::Rescue => self.rearm_detections(),
            Mode::EmergencyStop => Ok(()),
        }
    }

    fn enter_initialization(&mut self) {
        self.phase = StartupPhase::AwaitingBoiler;
        self.valve_open = false;
        self.link
            .expect(ToProgramKind::SteamBoilerWaiting)
            .eventually(PendingAction::CheckBoilerWaiting);
    }

    fn rearm_detections(&mut self) -> Result<(), ControlError> {
        let pending = self.pending;
        for unit in pending.into_iter().flatten() {
            self.arm_detection(unit)?;
        }
        Ok(())
    }

    fn arm_detection(&mut self, unit: PhysicalUnit) -> Result<(), ControlError> {
        self.link
            .send(unit.failure_detection())
            .until_ack(PendingAction::FailureAcknowledged(unit))
    }

    // ─── Supervision ────────────────────────────────────────────────

    fn supervise(&mut self, mode: Mode) -> Result<(), ControlError> {
        if self.switched || self.mode() != mode {
            debug!(%mode, "supervision skipped, mode changed this cycle");
            return Ok(());
        }
        match mode {
            Mode::Initialization => self.supervise_initialization(),
            Mode::Normal => self.supervise_normal(),
            Mode::Degraded => self.supervise_degraded(),
            Mode::Rescue => self.supervise_rescue(),
            Mode::EmergencyStop => Ok(()),
        }
    }

    fn supervise_initialization(&mut self) -> Result<(), ControlError> {
        if self.phase != StartupPhase::Filling {
            return Ok(());
        }
        let boiler = self.constants.boiler;

        if self.readings.steam != Some(0.0) {
            debug!(steam = ?self.readings.steam, "steam output while boiler waiting");
            self.halt(HaltCause::StartupReadings);
            return Ok(());
        }
        let Some(level) = thresholds::valid_level(&boiler, self.readings.level) else {
            debug!(level = ?self.readings.level, "level unusable at start-up");
            self.halt(HaltCause::StartupReadings);
            return Ok(());
        };

        match thresholds::window(&boiler, level) {
            Window::Above => {
                if !self.valve_open {
                    self.toggle_valve();
                }
            }
            Window::Below => {
                if self.valve_open {
                    self.toggle_valve();
                }
                self.command_pump(1, PumpState::Open);
            }
            Window::Within => {
                if self.valve_open {
                    self.toggle_valve();
                }
                self.command_pump(1, PumpState::Closed);
                self.link
                    .send(ToUnits::ProgramReady)
                    .until_ack(PendingAction::EnterOperation)?;
                self.phase = StartupPhase::AwaitingUnitsReady;
                info!(level, "level in normal window, program ready");
            }
        }
        Ok(())
    }

    fn supervise_normal(&mut self) -> Result<(), ControlError> {
        let boiler = self.constants.boiler;
        let Some(level) = thresholds::valid_level(&boiler, self.readings.level) else {
            self.report_failure(PhysicalUnit::Level)?;
            return self.switch_mode(Mode::Rescue);
        };

        self.detect()?;
        if !self.assumptions.all_trusted() {
            return self.switch_mode(Mode::Degraded);
        }
        if thresholds::in_danger(&boiler, level) {
            self.halt(HaltCause::LevelDanger);
            return Ok(());
        }

        match thresholds::window(&boiler, level) {
            Window::Below => self.command_pump(1, PumpState::Open),
            Window::Above => self.command_pump(1, PumpState::Closed),
            Window::Within => {}
        }
        Ok(())
    }

    fn supervise_degraded(&mut self) -> Result<(), ControlError> {
        let boiler = self.constants.boiler;
        let Some(level) = thresholds::valid_level(&boiler, self.readings.level) else {
            self.report_failure(PhysicalUnit::Level)?;
            return self.switch_mode(Mode::Rescue);
        };

        self.detect()?;
        if thresholds::in_danger(&boiler, level) {
            self.halt(HaltCause::LevelDanger);
            return Ok(());
        }
        if self.assumptions.all_trusted() {
            return self.switch_mode(Mode::Normal);
        }
        Ok(())
    }

    fn supervise_rescue(&mut self) -> Result<(), ControlError> {
        self.detect()?;
        if self.assumptions.contains(FailureAssumptions::LEVEL) {
            return Ok(());
        }
        if thresholds::valid_level(&self.constants.boiler, self.readings.level).is_none() {
            return self.report_failure(PhysicalUnit::Level);
        }
        let target = if self.assumptions.all_trusted() {
            Mode::Normal
        } else {
            Mode::Degraded
        };
        self.switch_mode(target)
    }

    fn detect(&mut self) -> Result<(), ControlError> {
        let failed = detect_failures(
            &self.readings,
            &self.constants,
            &self.pump_commands,
            self.cycle,
        );
        for unit in failed {
            self.report_failure(unit)?;
        }
        Ok(())
    }

    /// Raise the unit's assumption flag. Outside Normal the detection is
    /// sent right away; from Normal the mode switch that follows sends it.
    fn report_failure(&mut self, unit: PhysicalUnit) -> Result<(), ControlError> {
        if self.assumptions.contains(unit.flag()) {
            return Ok(());
        }
        warn!(%unit, mode = %self.mode(), "failure detected");
        self.assumptions.insert(unit.flag());
        self.failed[unit.slot()] = Some(unit);
        self.pending[unit.slot()] = Some(unit);
        if matches!(self.mode(), Mode::Degraded | Mode::Rescue) {
            self.arm_detection(unit)?;
        }
        Ok(())
    }

    // ─── Actuators ──────────────────────────────────────────────────

    fn toggle_valve(&mut self) {
        self.link.send(ToUnits::Valve).now();
        self.valve_open = !self.valve_open;
    }

    fn command_pump(&mut self, n: UnitId, state: PumpState) {
        let msg = match state {
            PumpState::Open => ToUnits::OpenPump(n),
            PumpState::Closed => ToUnits::ClosePump(n),
        };
        self.link.send(msg).now();
        let cycle = self.cycle;
        if let Some(slot) = usize::from(n)
            .checked_sub(1)
            .and_then(|i| self.pump_commands.get_mut(i))
        {
            *slot = Some(PumpCommand { state, cycle });
        }
    }
}
