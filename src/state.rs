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

//! Controller state shared by the thermal state machine and the actuator

use std::fmt;
use std::time::Instant;

/// Thermal regime of the CPU
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Low,
    High,
    Critical,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Low => "low",
            Mode::High => "high",
            Mode::Critical => "critical",
        };
        f.write_str(name)
    }
}

/// Everything the control loop remembers between ticks
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerState {
    pub mode: Mode,
    /// Latest sample, °C
    pub curr_temp: f64,
    /// Temperature at the last delta-triggered re-evaluation, °C
    pub old_temp: f64,
    /// Start of the sustained-high window while probing Low -> High
    pub high_temp_timer: Option<Instant>,
    /// Desired speed, percent
    pub speed_target: f64,
    /// Commanded speed, percent
    pub curr_speed: f64,
    pub speed_satisfied: bool,
    /// Last value written to the speed register
    pub last_written: Option<u8>,
    /// Mirrors the EC manual-control flag
    pub manual_control: bool,
}

impl ControllerState {
    pub fn new() -> Self {
        Self {
            mode: Mode::Low,
            curr_temp: 0.0,
            old_temp: 0.0,
            high_temp_timer: None,
            speed_target: 0.0,
            curr_speed: 0.0,
            speed_satisfied: false,
            last_written: None,
            manual_control: false,
        }
    }

    /// Change the speed target. The actuator has to converge again whenever
    /// the value actually moves.
    pub fn set_target(&mut self, target: f64) {
        if target != self.speed_target {
            self.speed_target = target;
            self.speed_satisfied = false;
        }
    }
}

impl Default for ControllerState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = ControllerState::new();
        assert_eq!(state.mode, Mode::Low);
        assert_eq!(state.speed_target, 0.0);
        assert_eq!(state.curr_speed, 0.0);
        assert!(state.high_temp_timer.is_none());
        assert!(state.last_written.is_none());
        assert!(!state.speed_satisfied);
    }

    #[test]
    fn test_set_target_clears_satisfied_only_on_change() {
        let mut state = ControllerState::new();
        state.speed_satisfied = true;
        state.set_target(0.0);
        assert!(state.speed_satisfied);

        state.set_target(35.0);
        assert_eq!(state.speed_target, 35.0);
        assert!(!state.speed_satisfied);
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(Mode::Low.to_string(), "low");
        assert_eq!(Mode::High.to_string(), "high");
        assert_eq!(Mode::Critical.to_string(), "critical");
    }
}
