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

//! Command Line Interface
//!
//! Every hardware flag overrides the matching field of the loaded config.

use std::path::PathBuf;

use clap::{Args, Parser};

use crate::config::Config;

#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "ecfan")]
#[command(version)]
#[command(about = "Embedded controller fan speed daemon")]
#[command(after_help = "ENVIRONMENT VARIABLES:
    ECFAN_LOG=debug        Log filter (trace, debug, info, warn, error)

FILES:
    /etc/ecfan/config.json     Daemon configuration, used when present")]
pub struct Cli {
    /// Config file (default /etc/ecfan/config.json if present)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: Overrides,
}

/// Values given on the command line, applied on top of the config file
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    /// CPU temperature input in millidegrees
    #[arg(long, value_name = "PATH")]
    pub thermal_zone: Option<PathBuf>,

    /// EC register device
    #[arg(long, value_name = "PATH")]
    pub ec_path: Option<PathBuf>,

    /// Fan speed control register
    #[arg(long, value_name = "N")]
    pub ec_addr: Option<u64>,

    /// Manual control enable register
    #[arg(long, value_name = "N")]
    pub manual_addr: Option<u64>,

    /// Current fan speed register
    #[arg(long, value_name = "N")]
    pub read_addr: Option<u64>,

    /// Register value at 0%
    #[arg(long, value_name = "N")]
    pub ec_min: Option<u8>,

    /// Register value at 100%
    #[arg(long, value_name = "N")]
    pub ec_max: Option<u8>,

    /// Lowest readback value
    #[arg(long, value_name = "N")]
    pub read_min: Option<u8>,

    /// Highest readback value
    #[arg(long, value_name = "N")]
    pub read_max: Option<u8>,

    /// Debug output (speed writes, readback, timer events)
    #[arg(long)]
    pub debug: bool,
}

impl Overrides {
    pub fn apply(&self, cfg: &mut Config) {
        if let Some(p) = &self.thermal_zone {
            cfg.thermal_zone = p.clone();
        }
        if let Some(p) = &self.ec_path {
            cfg.ec_path = p.clone();
        }
        if let Some(v) = self.ec_addr {
            cfg.ec_addr = v;
        }
        if let Some(v) = self.manual_addr {
            cfg.manual_addr = v;
        }
        if let Some(v) = self.read_addr {
            cfg.read_addr = v;
        }
        if let Some(v) = self.ec_min {
            cfg.ec_min = v;
        }
        if let Some(v) = self.ec_max {
            cfg.ec_max = v;
        }
        if let Some(v) = self.read_min {
            cfg.read_min = v;
        }
        if let Some(v) = self.read_max {
            cfg.read_max = v;
        }
        // a config file can enable debug, the flag only turns it on
        if self.debug {
            cfg.debug = true;
        }
    }
}

pub fn version() -> String {
    format!("ecfan {}", env!("CARGO_PKG_VERSION"))
}
