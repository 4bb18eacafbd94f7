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

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info, warn};

use ecfan::cli::{self, Cli};
use ecfan::config::{load_config, validate_config};
use ecfan::controller::Controller;
use ecfan::ec::EcDevice;
use ecfan::logging;
use ecfan::sensor::SysfsTemperature;
use ecfan::EcfanError;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version come back as errors that do not use stderr
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    if let Err(err) = run(cli) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let (mut config, source) = load_config(cli.config.as_deref()).context("loading configuration")?;
    cli.overrides.apply(&mut config);
    validate_config(&config).context("validating command line overrides")?;

    let target = logging::init_logging(config.debug);
    info!("STARTUP: {} starting", cli::version());
    info!("STARTUP: Logging to {}", target);
    match &source {
        Some(path) => info!("STARTUP: Config loaded from {}", path.display()),
        None => info!("STARTUP: No config file, using built-in defaults"),
    }
    if config.debug {
        info!("Debug output enabled");
    }

    let ec = EcDevice::new(config.ec_path.clone());
    let sensor = SysfsTemperature::new(config.thermal_zone.clone());
    info!(
        "STARTUP: Temperature from {}, EC device {} (speed register {}, manual register {})",
        sensor.path().display(),
        ec.path().display(),
        config.ec_addr,
        config.manual_addr
    );

    verify_privileges()?;

    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = shutdown.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        info!("SIGNAL: Received SIGINT/SIGTERM - initiating shutdown");
        flag.store(true, Ordering::SeqCst);
    }) {
        warn!("Failed to set signal handler: {}. Shutdown via signals will not hand control back.", e);
    }

    let mut controller = Controller::new(config, ec, sensor);
    if let Err(e) = controller.run(&shutdown) {
        if e.is_hardware() && !controller.state().manual_control {
            error!("SHUTDOWN: Stopped on hardware failure, fan control handed back to firmware");
        }
        return Err(e.into());
    }

    info!("SHUTDOWN: Fan control handed back to firmware");
    Ok(())
}

/// Register access needs root
fn verify_privileges() -> ecfan::Result<()> {
    // SAFETY: geteuid is always safe - it just returns the effective user ID of the process.
    let euid = unsafe { libc::geteuid() };
    if euid != 0 {
        return Err(EcfanError::PermissionDenied(
            "ecfan must run as root (euid=0) to access the embedded controller".into(),
        ));
    }
    Ok(())
}
