//! Message exchange with the physical units.
//!
//! The channel is cycle based and lossy: a command may go unanswered, an
//! answer may arrive late or twice. [`UnitLink`] bundles the two halves the
//! controller needs to cope with that: the outbox of the current cycle and
//! the registry of incoming kinds it is waiting for.

pub mod expect;
pub mod send;

use boiler_common::control_unit::messages::{ToProgram, ToProgramKind, ToUnits};

pub use expect::{
    Expect, Expectation, ExpectationRegistry, OnMissing, OnPresent, Response, Scan,
};
pub use send::{Outbox, SendCommand};

/// Outbox and expectation registry of one controller.
#[derive(Debug, Default)]
pub struct UnitLink {
    outbox: Outbox,
    expectations: ExpectationRegistry,
}

impl UnitLink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start sending `msg`; finish with `now()` or `until_ack(..)`.
    pub fn send(&mut self, msg: ToUnits) -> SendCommand<'_> {
        SendCommand {
            outbox: &mut self.outbox,
            expectations: &mut self.expectations,
            msg,
        }
    }

    /// Start waiting for `kind`; finish with `eventually(..)` or `always(..)`.
    pub fn expect(&mut self, kind: ToProgramKind) -> Expect<'_> {
        self.expectations.expect(kind)
    }

    /// Stop waiting for `kind`.
    pub fn forget(&mut self, kind: ToProgramKind) {
        self.expectations.remove(kind);
    }

    pub fn is_expecting(&self, kind: ToProgramKind) -> bool {
        self.expectations.contains(kind)
    }

    pub fn expectations(&self) -> &ExpectationRegistry {
        &self.expectations
    }

    pub fn clear_expectations(&mut self) {
        self.expectations.clear();
    }

    /// Match this cycle's messages against the registry.
    pub fn dispatch(&mut self, incoming: &[ToProgram]) -> Scan {
        self.expectations.dispatch(incoming)
    }

    pub fn outbox(&self) -> &Outbox {
        &self.outbox
    }

    /// Forget what was sent last cycle.
    pub fn begin_cycle(&mut self) {
        self.outbox.clear();
    }

    /// Hand over this cycle's commands.
    pub fn take_outbox(&mut self) -> Vec<ToUnits> {
        self.outbox.take()
    }
}
