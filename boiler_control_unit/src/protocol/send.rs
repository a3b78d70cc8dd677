//! Outgoing commands.
//!
//! [`Outbox`] collects what the controller sends during one cycle.
//! [`SendCommand`] is the builder returned by `UnitLink::send`: either the
//! command goes out once (`now`) or it is repeated every cycle until the
//! units acknowledge it (`until_ack`).

use boiler_common::control_unit::messages::ToUnits;
use tracing::{debug, error};

use super::expect::{ExpectationRegistry, OnMissing, OnPresent};
use crate::deferred::PendingAction;
use crate::error::ControlError;

/// Ordered, duplicate-free list of commands for the current cycle.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Outbox {
    messages: Vec<ToUnits>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `msg` unless the identical command is already queued.
    ///
    /// Returns whether the command was appended.
    pub fn push(&mut self, msg: ToUnits) -> bool {
        if self.messages.contains(&msg) {
            debug!(%msg, "command already queued this cycle");
            return false;
        }
        self.messages.push(msg);
        true
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn as_slice(&self) -> &[ToUnits] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Hand over the cycle's commands, leaving the outbox empty.
    pub fn take(&mut self) -> Vec<ToUnits> {
        std::mem::take(&mut self.messages)
    }
}

/// Send builder.
#[must_use = "a command is only sent by `now` or `until_ack`"]
pub struct SendCommand<'a> {
    pub(super) outbox: &'a mut Outbox,
    pub(super) expectations: &'a mut ExpectationRegistry,
    pub(super) msg: ToUnits,
}

impl SendCommand<'_> {
    /// Fire and forget.
    pub fn now(self) {
        self.outbox.push(self.msg);
    }

    /// Send now and again every cycle until the acknowledgement arrives,
    /// then queue `on_ack`.
    ///
    /// # Errors
    ///
    /// [`ControlError::NoAcknowledgement`] if the command kind is never
    /// acknowledged. Nothing is sent in that case.
    pub fn until_ack(self, on_ack: PendingAction) -> Result<(), ControlError> {
        let kind = self.msg.kind();
        let Some(ack) = kind.acknowledgement() else {
            error!(command = %self.msg, "send until acknowledged without acknowledgement");
            return Err(ControlError::NoAcknowledgement(kind));
        };
        self.outbox.push(self.msg);
        self.expectations
            .expect(ack)
            .always(OnMissing::resend(self.msg), OnPresent::once(on_ack));
        Ok(())
    }
}
