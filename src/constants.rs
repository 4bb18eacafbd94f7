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

//! Constants and default values for ecfan
//!
//! Every default the controller ships with lives here. `Config` and `Tuning`
//! take their `Default` values from these modules.

/// Filesystem locations
pub mod paths {
    /// CPU package temperature on the reference laptop
    pub const THERMAL_ZONE: &str = "/sys/class/hwmon/hwmon5/temp2_input";

    /// Character device exposing the EC register file
    pub const EC_DEVICE: &str = "/dev/ec";

    /// Configuration directory
    pub const CONFIG_DIR: &str = "/etc/ecfan";

    /// Configuration file inside `CONFIG_DIR`
    pub const CONFIG_FILE: &str = "config.json";

    /// Present when systemd-journald is accepting log records
    pub const JOURNALD_SOCKET: &str = "/run/systemd/journal/socket";
}

/// EC register layout
pub mod register {
    /// Fan speed control register
    pub const EC_ADDR: u64 = 25;
    /// Manual control enable register (0 = firmware, 1 = manual)
    pub const MANUAL_ADDR: u64 = 21;
    /// Current fan speed readback register
    pub const READ_ADDR: u64 = 17;

    /// Register value written at 0% speed
    pub const EC_MIN: u8 = 0;
    /// Register value written at 100% speed
    pub const EC_MAX: u8 = 48;

    /// Lowest value the readback register reports
    pub const READ_MIN: u8 = 14;
    /// Highest value the readback register reports
    pub const READ_MAX: u8 = 54;

    pub const MANUAL_DISABLED: u8 = 0;
    pub const MANUAL_ENABLED: u8 = 1;
}

/// Thermal mode thresholds, in degrees Celsius
pub mod thermal {
    /// Above this the controller starts probing for sustained load
    pub const HIGH_TEMP: f64 = 70.0;
    /// Above this High mode escalates to Critical
    pub const CRIT_TEMP: f64 = 85.0;
    /// At or above this the fan is forced to full speed
    pub const DANGEROUS_TEMP: f64 = 94.0;
    /// Hysteresis band and minimum delta that triggers a re-evaluation
    pub const TEMP_THRESHOLD: f64 = 4.0;
    /// Seconds above `HIGH_TEMP` before Low is promoted to High
    pub const SUSTAINED_LOAD_SECS: u64 = 14;

    /// Sensors report millidegrees
    pub const MILLIDEGREES_PER_DEGREE: f64 = 1000.0;
}

/// Fan speed targets and ramp rates, in percent
pub mod speed {
    pub const MIN_FAN_SPEED: f64 = 28.0;
    pub const MED_FAN_SPEED: f64 = 35.0;
    pub const MAX_FAN_SPEED: f64 = 100.0;

    /// Per fast tick, outside Critical mode
    pub const NORMAL_CHANGE_RATE: f64 = 1.0;
    /// Per fast tick, in Critical mode
    pub const CRITICAL_CHANGE_RATE: f64 = 4.0;
    /// Per fast tick spin-down while in High or Critical mode
    pub const HIGH_MODE_REDUCTION_RATE: f64 = 1.0;
}

/// Coefficients of the per-mode target curves
pub mod curve {
    /// Low mode: `t^3 / LOW_CUBIC_DIVISOR`
    pub const LOW_CUBIC_DIVISOR: f64 = 11842.0;

    /// High mode: `t * HIGH_SLOPE - HIGH_OFFSET`
    pub const HIGH_SLOPE: f64 = 2.7;
    pub const HIGH_OFFSET: f64 = 157.0;

    /// Critical mode: `t * CRITICAL_SLOPE - CRITICAL_OFFSET`
    pub const CRITICAL_SLOPE: f64 = 2.9;
    pub const CRITICAL_OFFSET: f64 = 172.0;
}

/// Scheduler cadence
pub mod timing {
    /// Interval between actuator ticks
    pub const FAST_INTERVAL_MS: u64 = 200;

    /// Thermal evaluation runs once every this many actuator ticks
    pub const SLOW_EVERY: u32 = 5;
}

/// Logging
pub mod logging {
    /// Environment variable holding the tracing filter
    pub const LOG_ENV: &str = "ECFAN_LOG";
    pub const DEFAULT_LEVEL: &str = "info";
    pub const DEBUG_LEVEL: &str = "debug";
}
