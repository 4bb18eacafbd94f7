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

//! Tracing setup for the daemon
//!
//! Logs go to the systemd journal when it is available and to stdout
//! otherwise.

use std::fmt;
use std::path::Path;

use crate::constants::{logging, paths};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    Journald,
    Stdout,
}

impl fmt::Display for LogTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogTarget::Journald => f.write_str("systemd journal"),
            LogTarget::Stdout => f.write_str("stdout"),
        }
    }
}

/// Filter directive: `ECFAN_LOG` when set, else `debug` or `info`
pub fn log_filter(debug: bool) -> String {
    match std::env::var(logging::LOG_ENV) {
        Ok(v) if !v.trim().is_empty() => v,
        _ if debug => logging::DEBUG_LEVEL.to_string(),
        _ => logging::DEFAULT_LEVEL.to_string(),
    }
}

/// Install the global subscriber. Call once, before anything logs.
pub fn init_logging(debug: bool) -> LogTarget {
    let filter = log_filter(debug);

    if Path::new(paths::JOURNALD_SOCKET).exists() {
        match tracing_journald::layer() {
            Ok(journald_layer) => {
                use tracing_subscriber::prelude::*;
                tracing_subscriber::registry()
                    .with(journald_layer)
                    .with(tracing_subscriber::EnvFilter::new(&filter))
                    .init();
                return LogTarget::Journald;
            }
            Err(e) => {
                eprintln!("Failed to create journald layer: {}, falling back to stdout", e);
            }
        }
    }

    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_env_filter(&filter)
        .init();
    LogTarget::Stdout
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_log_filter_defaults() {
        std::env::remove_var(logging::LOG_ENV);
        assert_eq!(log_filter(false), "info");
        assert_eq!(log_filter(true), "debug");
    }

    #[test]
    #[serial]
    fn test_log_filter_env_wins() {
        std::env::set_var(logging::LOG_ENV, "ecfan=trace");
        assert_eq!(log_filter(false), "ecfan=trace");
        assert_eq!(log_filter(true), "ecfan=trace");
        std::env::remove_var(logging::LOG_ENV);
    }

    #[test]
    #[serial]
    fn test_log_filter_ignores_blank_env() {
        std::env::set_var(logging::LOG_ENV, "  ");
        assert_eq!(log_filter(false), "info");
        std::env::remove_var(logging::LOG_ENV);
    }

    #[test]
    fn test_log_target_display() {
        assert_eq!(LogTarget::Journald.to_string(), "systemd journal");
        assert_eq!(LogTarget::Stdout.to_string(), "stdout");
    }
}
