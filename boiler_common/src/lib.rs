//! Boiler Common Library
//!
//! Shared types for the steam-boiler control workspace: the two message
//! alphabets exchanged with the physical units, plant constants, failure
//! assumptions and TOML configuration loading.
//!
//! # Module Structure
//!
//! - [`control_unit`] - Messages, modes, constants and failure flags
//! - [`config`] - Configuration loading traits and types
//! - [`consts`] - System-wide numeric limits and defaults
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use boiler_common::prelude::*;
//!
//! let msg = ToUnits::ProgramReady;
//! assert_eq!(msg.kind().acknowledgement(), Some(ToProgramKind::PhysicalUnitsReady));
//! ```

pub mod config;
pub mod consts;
pub mod control_unit;
pub mod prelude;
