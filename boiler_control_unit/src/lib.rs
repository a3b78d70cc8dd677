//! # Boiler Control Unit Library
//!
//! Cyclic controller for a steam-boiler plant. Once per control cycle it
//! takes the messages sent by the physical units (pumps, pump controllers,
//! level and steam sensors), decides on an operating mode and returns the
//! commands to send back.
//!
//! ## Building Blocks
//!
//! 1. **Protocol**: send, send-until-acknowledged and the expectation
//!    registry correlating incoming message kinds with reactions
//! 2. **Deferred queue**: actions postponed until the message scan is done
//! 3. **Mode state machine**: Initialization, Normal, Degraded, Rescue and
//!    the absorbing EmergencyStop
//! 4. **Safety**: level thresholds and failure detection
//! 5. **Cycle driver**: read → compute → apply with deadline checkpoints
//!
//! The controller holds no I/O resources. One call of
//! [`controller::ControlUnit::process_messages`] is one atomic cycle.

pub mod config;
pub mod controller;
pub mod cycle;
pub mod deferred;
pub mod error;
pub mod protocol;
pub mod readings;
pub mod safety;
pub mod state;
