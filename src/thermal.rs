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

//! Thermal mode state machine
//!
//! Runs once per slow tick. Classifies the fresh sample into a [`Mode`] and
//! updates the speed target:
//!
//! - **Low**: quiet cubic curve, re-evaluated only when the temperature moved
//!   by more than `temp_threshold` since the last re-evaluation. Crossing
//!   `high_temp` bumps the target to medium speed and starts a timer; the mode
//!   is promoted to High only if the load is still there after
//!   `sustained_load_time`.
//! - **High**: linear curve with the same hysteresis gate. Drops back to Low
//!   below `high_temp - temp_threshold`, escalates above `crit_temp`.
//! - **Critical**: steeper curve, re-evaluated on every tick.
//!
//! Independently of the mode, a sample at or above `dangerous_temp` forces the
//! commanded speed to 100% on the spot.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::config::Tuning;
use crate::constants::speed::MAX_FAN_SPEED;
use crate::curves;
use crate::state::{ControllerState, Mode};

/// Outcome of one thermal evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    /// Dangerous temperature: `curr_speed` was forced to 100 and must be
    /// written immediately
    Dangerous,
    /// Normal evaluation; the target may or may not have moved
    Normal,
}

pub fn evaluate(state: &mut ControllerState, tuning: &Tuning, temp: f64, now: Instant) -> Evaluation {
    state.curr_temp = temp;

    if temp >= tuning.dangerous_temp {
        warn!("Dangerous CPU temperature {:.1}°C, maxing out fan", temp);
        state.curr_speed = MAX_FAN_SPEED;
        state.speed_satisfied = false;
        return Evaluation::Dangerous;
    }

    if let Some(started) = state.high_temp_timer {
        if temp < tuning.high_temp {
            debug!("Load dropped to {:.1}°C, cancelling sustained load timer", temp);
            state.high_temp_timer = None;
        } else if now.saturating_duration_since(started) > tuning.sustained_load_time() {
            switch_mode(state, Mode::High);
            state.high_temp_timer = None;
            update_target(state, tuning);
        }
    }

    let delta = temp - state.old_temp;
    match state.mode {
        Mode::Low => {
            if temp > tuning.high_temp && state.high_temp_timer.is_none() {
                debug!("High temperature {:.1}°C, starting sustained load timer", temp);
                state.high_temp_timer = Some(now);
                state.set_target(tuning.med_fan_speed);
                return Evaluation::Normal;
            }
            if delta.abs() > tuning.temp_threshold {
                state.old_temp = temp;
                update_target(state, tuning);
            }
        }
        Mode::High => {
            if temp < tuning.high_temp - tuning.temp_threshold {
                // The next Low tick's delta check picks the new target
                switch_mode(state, Mode::Low);
            } else if temp > tuning.crit_temp {
                switch_mode(state, Mode::Critical);
            } else if delta.abs() > tuning.temp_threshold {
                state.old_temp = temp;
                update_target(state, tuning);
            }
        }
        Mode::Critical => {
            if temp < tuning.crit_temp - tuning.temp_threshold {
                switch_mode(state, Mode::High);
            } else {
                update_target(state, tuning);
            }
        }
    }

    Evaluation::Normal
}

fn switch_mode(state: &mut ControllerState, mode: Mode) {
    info!("Switching to {} temperature mode at {:.1}°C", mode, state.curr_temp);
    state.mode = mode;
}

fn update_target(state: &mut ControllerState, tuning: &Tuning) {
    let target = curves::target_for(state.mode, state.curr_temp, tuning);
    if target != state.speed_target {
        debug!("Speed target {}% -> {}% ({} mode)", state.speed_target, target, state.mode);
    }
    state.set_target(target);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn test_dangerous_override_ignores_mode_and_rate() {
        let tuning = Tuning::default();
        for mode in [Mode::Low, Mode::High, Mode::Critical] {
            let mut state = ControllerState::new();
            state.mode = mode;
            state.curr_speed = 12.0;
            state.speed_target = 40.0;
            let out = evaluate(&mut state, &tuning, 94.0, Instant::now());
            assert_eq!(out, Evaluation::Dangerous);
            assert_eq!(state.curr_speed, 100.0);
            assert_eq!(state.mode, mode);
            assert_eq!(state.speed_target, 40.0);
        }
    }

    #[test]
    fn test_dangerous_override_skips_timer_logic() {
        let tuning = Tuning::default();
        let t0 = Instant::now();
        let mut state = ControllerState::new();
        state.high_temp_timer = Some(t0);
        evaluate(&mut state, &tuning, 99.0, t0 + secs(60));
        assert_eq!(state.mode, Mode::Low);
        assert_eq!(state.high_temp_timer, Some(t0));
    }

    #[test]
    fn test_low_mode_first_sample_sets_target() {
        let tuning = Tuning::default();
        let mut state = ControllerState::new();
        state.set_target(10.0);
        evaluate(&mut state, &tuning, 30.0, Instant::now());
        assert_eq!(state.old_temp, 30.0);
        assert_eq!(state.speed_target, 0.0);
    }

    #[test]
    fn test_hysteresis_holds_target_within_band() {
        let tuning = Tuning::default();
        let t0 = Instant::now();
        let mut state = ControllerState::new();
        evaluate(&mut state, &tuning, 50.0, t0);
        let (mode, target, old) = (state.mode, state.speed_target, state.old_temp);

        let samples = [53.9, 46.1, 54.0, 46.0, 50.5, 49.2, 52.0];
        for (i, temp) in samples.iter().enumerate() {
            evaluate(&mut state, &tuning, *temp, t0 + secs(i as u64 + 1));
            assert_eq!(state.mode, mode);
            assert_eq!(state.speed_target, target);
            assert_eq!(state.old_temp, old);
        }
    }

    #[test]
    fn test_low_delta_beyond_threshold_recomputes() {
        let tuning = Tuning::default();
        let mut state = ControllerState::new();
        state.old_temp = 63.0;
        evaluate(&mut state, &tuning, 70.0, Instant::now());
        assert_eq!(state.old_temp, 70.0);
        assert_eq!(state.speed_target, 29.0);
        assert!(state.high_temp_timer.is_none());
    }

    #[test]
    fn test_crossing_high_temp_starts_timer_and_bumps_target() {
        let tuning = Tuning::default();
        let t0 = Instant::now();
        let mut state = ControllerState::new();
        evaluate(&mut state, &tuning, 30.0, t0);

        evaluate(&mut state, &tuning, 72.0, t0 + secs(1));
        assert_eq!(state.high_temp_timer, Some(t0 + secs(1)));
        assert_eq!(state.speed_target, 35.0);
        // delta check skipped on the tick that starts the timer
        assert_eq!(state.old_temp, 30.0);
        assert_eq!(state.mode, Mode::Low);
    }

    #[test]
    fn test_sustained_load_promotes_to_high() {
        let tuning = Tuning::default();
        let t0 = Instant::now();
        let mut state = ControllerState::new();
        state.old_temp = 71.0;

        evaluate(&mut state, &tuning, 71.0, t0);
        assert!(state.high_temp_timer.is_some());
        for s in 1..=14 {
            evaluate(&mut state, &tuning, 71.0, t0 + secs(s));
            assert_eq!(state.mode, Mode::Low, "promoted early at {s}s");
        }

        evaluate(&mut state, &tuning, 71.0, t0 + secs(15));
        assert_eq!(state.mode, Mode::High);
        assert!(state.high_temp_timer.is_none());
        // 71 * 2.7 - 157 = 34.7, floored to medium speed
        assert_eq!(state.speed_target, 35.0);
    }

    #[test]
    fn test_short_load_cancels_timer() {
        let tuning = Tuning::default();
        let t0 = Instant::now();
        let mut state = ControllerState::new();
        state.old_temp = 71.0;

        evaluate(&mut state, &tuning, 71.0, t0);
        evaluate(&mut state, &tuning, 71.0, t0 + secs(13));
        assert!(state.high_temp_timer.is_some());

        evaluate(&mut state, &tuning, 69.0, t0 + secs(14));
        assert!(state.high_temp_timer.is_none());
        assert_eq!(state.mode, Mode::Low);

        // A later spike starts a fresh window instead of promoting
        evaluate(&mut state, &tuning, 72.0, t0 + secs(30));
        assert_eq!(state.mode, Mode::Low);
        assert_eq!(state.high_temp_timer, Some(t0 + secs(30)));
    }

    #[test]
    fn test_high_demotes_without_recompute() {
        let tuning = Tuning::default();
        let mut state = ControllerState::new();
        state.mode = Mode::High;
        state.old_temp = 75.0;
        state.set_target(46.0);

        evaluate(&mut state, &tuning, 65.9, Instant::now());
        assert_eq!(state.mode, Mode::Low);
        assert_eq!(state.speed_target, 46.0);
        assert_eq!(state.old_temp, 75.0);

        // next Low tick: delta 75 -> 60 exceeds the band
        evaluate(&mut state, &tuning, 60.0, Instant::now());
        assert_eq!(state.speed_target, 0.0);
    }

    #[test]
    fn test_high_inside_band_keeps_mode() {
        let tuning = Tuning::default();
        let mut state = ControllerState::new();
        state.mode = Mode::High;
        state.old_temp = 70.0;
        state.set_target(35.0);

        // 66 is not below 70 - 4
        evaluate(&mut state, &tuning, 66.0, Instant::now());
        assert_eq!(state.mode, Mode::High);
        assert_eq!(state.speed_target, 35.0);
    }

    #[test]
    fn test_high_escalates_to_critical_without_recompute() {
        let tuning = Tuning::default();
        let mut state = ControllerState::new();
        state.mode = Mode::High;
        state.old_temp = 72.0;
        state.set_target(37.0);

        evaluate(&mut state, &tuning, 86.0, Instant::now());
        assert_eq!(state.mode, Mode::Critical);
        assert_eq!(state.speed_target, 37.0);
    }

    #[test]
    fn test_critical_recomputes_every_tick() {
        let tuning = Tuning::default();
        let mut state = ControllerState::new();
        state.mode = Mode::Critical;
        state.old_temp = 90.0;

        evaluate(&mut state, &tuning, 90.0, Instant::now());
        assert_eq!(state.speed_target, 89.0);
        evaluate(&mut state, &tuning, 90.5, Instant::now());
        // 90.5 * 2.9 - 172 = 90.45
        assert_eq!(state.speed_target, 90.0);
        // old_temp is not tracked in Critical mode
        assert_eq!(state.old_temp, 90.0);
    }

    #[test]
    fn test_critical_demotes_below_band() {
        let tuning = Tuning::default();
        let mut state = ControllerState::new();
        state.mode = Mode::Critical;
        state.set_target(89.0);

        evaluate(&mut state, &tuning, 81.0, Instant::now());
        assert_eq!(state.mode, Mode::Critical);
        evaluate(&mut state, &tuning, 80.0, Instant::now());
        assert_eq!(state.mode, Mode::High);
        assert_eq!(state.speed_target, 63.0);
    }
}
