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

//! Embedded controller register access
//!
//! The EC is exposed as a byte-addressable file (`/dev/ec` via the `ec_sys`
//! or `acpi_ec` drivers). Every access opens the device, performs one
//! positioned single-byte read or write and closes it again.

use std::fs::{File, OpenOptions};
use std::os::unix::fs::FileExt;
use std::path::{Path, PathBuf};

use ecfan_error::{EcfanError, Result};

use crate::config::Config;
use crate::constants::speed::MAX_FAN_SPEED;

/// Byte-addressed register file. Any failure is fatal to the controller.
#[cfg_attr(test, mockall::automock)]
pub trait EcRegisters {
    fn read(&mut self, addr: u64) -> Result<u8>;
    fn write(&mut self, addr: u64, value: u8) -> Result<()>;
}

/// Register file backed by a device node or a plain file
#[derive(Debug, Clone)]
pub struct EcDevice {
    path: PathBuf,
}

impl EcDevice {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Result<File> {
        OpenOptions::new()
            .read(true)
            .write(true)
            .open(&self.path)
            .map_err(|source| EcfanError::RegisterOpen {
                path: self.path.clone(),
                source,
            })
    }
}

impl EcRegisters for EcDevice {
    fn read(&mut self, addr: u64) -> Result<u8> {
        let file = self.open()?;
        let mut buf = [0u8; 1];
        // read_exact_at turns a short read into UnexpectedEof
        file.read_exact_at(&mut buf, addr)
            .map_err(|source| EcfanError::RegisterRead {
                path: self.path.clone(),
                addr,
                source,
            })?;
        Ok(buf[0])
    }

    fn write(&mut self, addr: u64, value: u8) -> Result<()> {
        let file = self.open()?;
        file.write_all_at(&[value], addr)
            .map_err(|source| EcfanError::RegisterWrite {
                path: self.path.clone(),
                addr,
                value,
                source,
            })
    }
}

/// Linear maps between fan speed percent and raw register values
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedMapping {
    pub ec_min: u8,
    pub ec_max: u8,
    pub read_min: u8,
    pub read_max: u8,
}

impl SpeedMapping {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            ec_min: cfg.ec_min,
            ec_max: cfg.ec_max,
            read_min: cfg.read_min,
            read_max: cfg.read_max,
        }
    }

    /// Register value for a speed percentage, truncated toward the lower step
    pub fn to_register(&self, speed_pct: f64) -> u8 {
        let min = f64::from(self.ec_min);
        let max = f64::from(self.ec_max);
        let raw = (speed_pct / MAX_FAN_SPEED * (max - min) + min).floor();
        raw.clamp(0.0, f64::from(u8::MAX)) as u8
    }

    /// Speed percentage reported by the readback register
    pub fn readback_percent(&self, raw: u8) -> f64 {
        let min = f64::from(self.read_min);
        let max = f64::from(self.read_max);
        if max <= min {
            return 0.0;
        }
        ((f64::from(raw) - min) / (max - min) * MAX_FAN_SPEED).clamp(0.0, MAX_FAN_SPEED)
    }
}

impl Default for SpeedMapping {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}
