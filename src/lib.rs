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

//! ecfan - fan speed controller for laptop embedded controllers
//!
//! Reads the CPU temperature, derives a speed target from a hysteretic
//! Low/High/Critical mode state machine and ramps the fan toward it through a
//! byte register of the embedded controller.

pub mod actuator;
pub mod cli;
pub mod config;
pub mod constants;
pub mod controller;
pub mod curves;
pub mod ec;
pub mod logging;
pub mod sensor;
pub mod state;
pub mod thermal;

pub use ecfan_error::{EcfanError, Result};

#[cfg(test)]
pub mod test_utils;
