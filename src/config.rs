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
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ecfan_error::{EcfanError, Result};
use serde::{Deserialize, Serialize};

use crate::constants::{paths, register, speed, thermal, timing};

/// Thresholds and rates of the thermal state machine and the actuator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Tuning {
    pub high_temp: f64,
    pub crit_temp: f64,
    pub dangerous_temp: f64,
    pub temp_threshold: f64,
    pub sustained_load_secs: u64,
    pub min_fan_speed: f64,
    pub med_fan_speed: f64,
    pub normal_change_rate: f64,
    pub critical_change_rate: f64,
    pub high_mode_reduction_rate: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            high_temp: thermal::HIGH_TEMP,
            crit_temp: thermal::CRIT_TEMP,
            dangerous_temp: thermal::DANGEROUS_TEMP,
            temp_threshold: thermal::TEMP_THRESHOLD,
            sustained_load_secs: thermal::SUSTAINED_LOAD_SECS,
            min_fan_speed: speed::MIN_FAN_SPEED,
            med_fan_speed: speed::MED_FAN_SPEED,
            normal_change_rate: speed::NORMAL_CHANGE_RATE,
            critical_change_rate: speed::CRITICAL_CHANGE_RATE,
            high_mode_reduction_rate: speed::HIGH_MODE_REDUCTION_RATE,
        }
    }
}

impl Tuning {
    pub fn sustained_load_time(&self) -> Duration {
        Duration::from_secs(self.sustained_load_secs)
    }
}

/// Full daemon configuration. Every field has a default, so an empty JSON
/// object is a valid config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Temperature input, millidegrees Celsius as text
    pub thermal_zone: PathBuf,
    /// EC register file
    pub ec_path: PathBuf,
    pub ec_addr: u64,
    pub manual_addr: u64,
    pub read_addr: u64,
    pub ec_min: u8,
    pub ec_max: u8,
    /// Readback bounds, only used to report the firmware's view of the fan
    pub read_min: u8,
    pub read_max: u8,
    pub debug: bool,
    pub tuning: Tuning,
    pub fast_interval_ms: u64,
    pub slow_every: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            thermal_zone: PathBuf::from(paths::THERMAL_ZONE),
            ec_path: PathBuf::from(paths::EC_DEVICE),
            ec_addr: register::EC_ADDR,
            manual_addr: register::MANUAL_ADDR,
            read_addr: register::READ_ADDR,
            ec_min: register::EC_MIN,
            ec_max: register::EC_MAX,
            read_min: register::READ_MIN,
            read_max: register::READ_MAX,
            debug: false,
            tuning: Tuning::default(),
            fast_interval_ms: timing::FAST_INTERVAL_MS,
            slow_every: timing::SLOW_EVERY,
        }
    }
}

impl Config {
    pub fn fast_interval(&self) -> Duration {
        Duration::from_millis(self.fast_interval_ms)
    }
}

pub fn config_path() -> PathBuf {
    Path::new(paths::CONFIG_DIR).join(paths::CONFIG_FILE)
}

/// Load the configuration.
///
/// An explicit path must exist. Without one, `/etc/ecfan/config.json` is used
/// when present and built-in defaults otherwise. The result is validated and
/// comes back with the file it was read from, `None` for the defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<(Config, Option<PathBuf>)> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => config_path(),
    };

    let data = match fs::read_to_string(&path) {
        Ok(data) => data,
        Err(e) if explicit.is_none() && e.kind() == io::ErrorKind::NotFound => {
            return Ok((Config::default(), None));
        }
        Err(source) => return Err(EcfanError::FileRead { path, source }),
    };

    let cfg = parse_config(&data)?;
    Ok((cfg, Some(path)))
}

pub fn parse_config(data: &str) -> Result<Config> {
    let cfg: Config = serde_json::from_str(data)?;
    validate_config(&cfg)?;
    Ok(cfg)
}

pub fn validate_config(cfg: &Config) -> Result<()> {
    if cfg.thermal_zone.as_os_str().is_empty() {
        return Err(EcfanError::invalid_config("thermal_zone", "path is empty"));
    }
    if cfg.ec_path.as_os_str().is_empty() {
        return Err(EcfanError::invalid_config("ec_path", "path is empty"));
    }
    if cfg.ec_min >= cfg.ec_max {
        return Err(EcfanError::invalid_config("ec_max", "must be greater than ec_min"));
    }
    if cfg.read_min >= cfg.read_max {
        return Err(EcfanError::invalid_config("read_max", "must be greater than read_min"));
    }
    if cfg.ec_addr == cfg.manual_addr || cfg.ec_addr == cfg.read_addr || cfg.manual_addr == cfg.read_addr {
        return Err(EcfanError::invalid_config("ec_addr", "register addresses must be distinct"));
    }
    if cfg.fast_interval_ms == 0 {
        return Err(EcfanError::invalid_config("fast_interval_ms", "must be > 0"));
    }
    // The actuator has to tick strictly more often than the thermal evaluation
    if cfg.slow_every < 2 {
        return Err(EcfanError::invalid_config("slow_every", "must be >= 2"));
    }
    validate_tuning(&cfg.tuning)
}

fn validate_tuning(t: &Tuning) -> Result<()> {
    let finite = [
        ("high_temp", t.high_temp),
        ("crit_temp", t.crit_temp),
        ("dangerous_temp", t.dangerous_temp),
        ("temp_threshold", t.temp_threshold),
        ("min_fan_speed", t.min_fan_speed),
        ("med_fan_speed", t.med_fan_speed),
        ("normal_change_rate", t.normal_change_rate),
        ("critical_change_rate", t.critical_change_rate),
        ("high_mode_reduction_rate", t.high_mode_reduction_rate),
    ];
    for (field, value) in finite {
        if !value.is_finite() {
            return Err(EcfanError::invalid_config(field, "must be a finite number"));
        }
    }

    if !(t.high_temp < t.crit_temp && t.crit_temp < t.dangerous_temp) {
        return Err(EcfanError::invalid_config(
            "tuning",
            "expected high_temp < crit_temp < dangerous_temp",
        ));
    }
    if t.temp_threshold <= 0.0 {
        return Err(EcfanError::invalid_config("temp_threshold", "must be > 0"));
    }
    if t.normal_change_rate <= 0.0 || t.critical_change_rate <= 0.0 || t.high_mode_reduction_rate <= 0.0 {
        return Err(EcfanError::invalid_config("tuning", "speed change rates must be > 0"));
    }
    if !(0.0..=t.med_fan_speed).contains(&t.min_fan_speed) || t.med_fan_speed > speed::MAX_FAN_SPEED {
        return Err(EcfanError::invalid_config(
            "tuning",
            "expected 0 <= min_fan_speed <= med_fan_speed <= 100",
        ));
    }
    Ok(())
}
