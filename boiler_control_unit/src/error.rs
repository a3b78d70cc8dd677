//! Controller error type.
//!
//! Protocol anomalies and threshold violations are not errors: they are
//! handled inside the cycle by switching mode. What remains are programming
//! errors that must reach the caller.

use boiler_common::control_unit::messages::ToUnitsKind;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ControlError {
    /// `until_ack` was used with a command that is never acknowledged.
    #[error("command `{0}` has no acknowledgement and cannot be sent until acknowledged")]
    NoAcknowledgement(ToUnitsKind),
}
