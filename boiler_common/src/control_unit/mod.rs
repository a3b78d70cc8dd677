//! Control Unit shared types.
//!
//! Everything exchanged between the control unit and the physical units, or
//! read by both sides, lives here: operating modes, the two message
//! alphabets with their acknowledgement table, plant constants and the
//! failure assumptions the controller keeps about each unit.

pub mod assumptions;
pub mod constants;
pub mod messages;
pub mod mode;
