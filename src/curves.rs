/*
 * This file is part of ecfan.
 *
 * Copyright (C) 2025 ecfan contributors
 *
 * ecfan is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * ecfan is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with ecfan. If not, see <https://www.gnu.org/licenses/>.
 */

//! Per-mode speed target curves
//!
//! Every curve rounds to a whole percent before clamping, so targets are
//! always integers and the actuator can converge on them exactly.

use crate::config::Tuning;
use crate::constants::curve::{
    CRITICAL_OFFSET, CRITICAL_SLOPE, HIGH_OFFSET, HIGH_SLOPE, LOW_CUBIC_DIVISOR,
};
use crate::constants::speed::MAX_FAN_SPEED;
use crate::state::Mode;

/// Quiet curve. Anything at or below `min_fan_speed` stops the fan.
pub fn low_speed(temp: f64, tuning: &Tuning) -> f64 {
    let raw = (temp.powi(3) / LOW_CUBIC_DIVISOR).round().min(tuning.med_fan_speed);
    if raw <= tuning.min_fan_speed {
        0.0
    } else {
        raw
    }
}

pub fn high_speed(temp: f64, tuning: &Tuning) -> f64 {
    (temp * HIGH_SLOPE - HIGH_OFFSET)
        .round()
        .max(tuning.med_fan_speed)
        .min(MAX_FAN_SPEED)
}

pub fn critical_speed(temp: f64, tuning: &Tuning) -> f64 {
    (temp * CRITICAL_SLOPE - CRITICAL_OFFSET)
        .round()
        .max(tuning.med_fan_speed)
        .min(MAX_FAN_SPEED)
}

/// Speed target for `temp` under the curve of `mode`
pub fn target_for(mode: Mode, temp: f64, tuning: &Tuning) -> f64 {
    match mode {
        Mode::Low => low_speed(temp, tuning),
        Mode::High => high_speed(temp, tuning),
        Mode::Critical => critical_speed(temp, tuning),
    }
}
