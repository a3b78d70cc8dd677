//! Water-level and steam classification.
//!
//! Valid level: closed interval `[0, capacity]`. Normal window: closed
//! interval `[min_normal, max_normal]`. Danger: strictly above
//! `0.95 × max_limit` or strictly below `1.5 × min_limit`.

use boiler_common::control_unit::constants::{BoilerConstants, SteamConstants};

/// Fraction of `max_limit` above which the level is dangerous.
pub const DANGER_HIGH_FACTOR: f64 = 0.95;

/// Multiple of `min_limit` below which the level is dangerous.
pub const DANGER_LOW_FACTOR: f64 = 1.5;

/// Position of a level relative to the normal window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    Below,
    Within,
    Above,
}

/// Level a working sensor can report.
#[inline]
pub fn is_valid_level(boiler: &BoilerConstants, level: f64) -> bool {
    (0.0..=boiler.capacity).contains(&level)
}

/// `level` if present and valid.
#[inline]
pub fn valid_level(boiler: &BoilerConstants, level: Option<f64>) -> Option<f64> {
    level.filter(|l| is_valid_level(boiler, *l))
}

#[inline]
pub fn in_danger(boiler: &BoilerConstants, level: f64) -> bool {
    level > DANGER_HIGH_FACTOR * boiler.max_limit || level < DANGER_LOW_FACTOR * boiler.min_limit
}

pub fn window(boiler: &BoilerConstants, level: f64) -> Window {
    if level < boiler.min_normal {
        Window::Below
    } else if level > boiler.max_normal {
        Window::Above
    } else {
        Window::Within
    }
}

/// Steam output a working sensor can report.
#[inline]
pub fn is_valid_steam(steam: &SteamConstants, output: f64) -> bool {
    (0.0..=steam.max_throughput).contains(&output)
}
