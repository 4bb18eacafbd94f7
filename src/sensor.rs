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

use std::fs;
use std::path::{Path, PathBuf};

use ecfan_error::{EcfanError, Result};

use crate::constants::thermal::MILLIDEGREES_PER_DEGREE;

/// Source of CPU temperature samples in degrees Celsius
pub trait TemperatureSource {
    fn read_celsius(&mut self) -> Result<f64>;
}

/// hwmon `tempN_input` style file holding millidegrees as text
#[derive(Debug, Clone)]
pub struct SysfsTemperature {
    path: PathBuf,
}

impl SysfsTemperature {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TemperatureSource for SysfsTemperature {
    fn read_celsius(&mut self) -> Result<f64> {
        let raw = fs::read_to_string(&self.path).map_err(|e| EcfanError::TemperatureRead {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        parse_millidegrees(&raw).ok_or_else(|| EcfanError::TemperatureRead {
            path: self.path.clone(),
            reason: format!("not a millidegree value: {:?}", raw.trim()),
        })
    }
}

fn parse_millidegrees(raw: &str) -> Option<f64> {
    let mc = raw.trim().parse::<i64>().ok()?;
    Some(mc as f64 / MILLIDEGREES_PER_DEGREE)
}
