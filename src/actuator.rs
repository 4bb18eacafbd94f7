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

//! Rate-limited speed actuator
//!
//! Moves `curr_speed` toward `speed_target` by at most one rate step per fast
//! tick. Spin-down in High and Critical mode uses the slower
//! `high_mode_reduction_rate` so the fan does not give up cooling too early.

use crate::config::Tuning;
use crate::state::{ControllerState, Mode};

/// Maximum step per tick for the given mode
pub fn change_rate(mode: Mode, tuning: &Tuning) -> f64 {
    match mode {
        Mode::Critical => tuning.critical_change_rate,
        Mode::Low | Mode::High => tuning.normal_change_rate,
    }
}

/// Advance the actuator by one tick. Returns true when `curr_speed` changed
/// and has to be written out.
pub fn step(state: &mut ControllerState, tuning: &Tuning) -> bool {
    let rate = change_rate(state.mode, tuning);
    let gap = state.speed_target - state.curr_speed;

    if gap.abs() > rate {
        if gap > 0.0 {
            state.curr_speed += gap.min(rate);
        } else {
            let down = match state.mode {
                Mode::Low => rate,
                Mode::High | Mode::Critical => tuning.high_mode_reduction_rate,
            };
            state.curr_speed -= (-gap).min(down);
        }
        true
    } else if !state.speed_satisfied {
        state.curr_speed = state.speed_target;
        state.speed_satisfied = true;
        true
    } else {
        false
    }
}
