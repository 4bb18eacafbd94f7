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

//! Control scheduler
//!
//! Owns the controller state and both hardware collaborators. A single loop
//! runs the actuator every `fast_interval` and, every `slow_every` iterations,
//! verifies the EC manual-control flag and evaluates the temperature first.
//!
//! Whatever ends the loop (shutdown request or fatal error) the fan is handed
//! back to firmware exactly once before [`Controller::run`] returns.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Instant;

use ecfan_error::Result;
use tracing::{debug, error, info, warn};

use crate::actuator;
use crate::config::Config;
use crate::constants::register::{MANUAL_DISABLED, MANUAL_ENABLED};
use crate::ec::{EcRegisters, SpeedMapping};
use crate::sensor::TemperatureSource;
use crate::state::{ControllerState, Mode};
use crate::thermal::{self, Evaluation};

pub struct Controller<E: EcRegisters, T: TemperatureSource> {
    config: Config,
    mapping: SpeedMapping,
    ec: E,
    sensor: T,
    state: ControllerState,
    handed_over: bool,
}

impl<E: EcRegisters, T: TemperatureSource> Controller<E, T> {
    pub fn new(config: Config, ec: E, sensor: T) -> Self {
        let mapping = SpeedMapping::from_config(&config);
        Self {
            config,
            mapping,
            ec,
            sensor,
            state: ControllerState::new(),
            handed_over: false,
        }
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn ec(&self) -> &E {
        &self.ec
    }

    pub fn is_handed_over(&self) -> bool {
        self.handed_over
    }

    /// Run until `shutdown` is set or a fatal error occurs, then hand fan
    /// control back to firmware.
    pub fn run(&mut self, shutdown: &AtomicBool) -> Result<()> {
        let result = self.run_loop(shutdown);
        if let Err(e) = &result {
            error!("Fatal error in control loop: {}", e);
        }
        self.hand_over();
        result
    }

    fn run_loop(&mut self, shutdown: &AtomicBool) -> Result<()> {
        let interval = self.config.fast_interval();
        let slow_every = self.config.slow_every;
        info!(
            "Control loop started (actuator every {:?}, thermal evaluation every {} ticks)",
            interval, slow_every
        );

        // Forces a slow tick on the first iteration so manual control is
        // enabled before anything else happens
        let mut since_slow = slow_every;
        let mut next = Instant::now();

        while !shutdown.load(Ordering::SeqCst) {
            if since_slow >= slow_every {
                since_slow = 0;
                self.slow_tick(Instant::now())?;
            }
            self.fast_tick()?;
            since_slow += 1;

            next += interval;
            let now = Instant::now();
            if next > now {
                thread::sleep(next - now);
            } else {
                // Running behind; don't burst to catch up
                next = now;
            }
        }

        info!("Shutdown requested, leaving control loop");
        Ok(())
    }

    /// Manual-control verification followed by thermal evaluation
    pub fn slow_tick(&mut self, now: Instant) -> Result<()> {
        self.check_manual_control()?;
        if self.config.debug {
            self.log_readback()?;
        }

        let temp = self.sensor.read_celsius()?;
        match thermal::evaluate(&mut self.state, &self.config.tuning, temp, now) {
            Evaluation::Dangerous => self.write_speed(),
            Evaluation::Normal => Ok(()),
        }
    }

    /// One actuator step
    pub fn fast_tick(&mut self) -> Result<()> {
        if actuator::step(&mut self.state, &self.config.tuning) {
            if self.state.speed_satisfied {
                debug!("Speed satisfied at {}%", self.state.curr_speed);
            }
            self.write_speed()?;
        }
        Ok(())
    }

    /// Re-assert manual control if the firmware holds it. Taking control
    /// resets the controller to a quiet, known state.
    pub fn check_manual_control(&mut self) -> Result<()> {
        let flag = self.ec.read(self.config.manual_addr)?;
        if flag != MANUAL_DISABLED {
            self.state.manual_control = true;
            return Ok(());
        }

        if self.state.manual_control {
            warn!("Firmware took back fan control, resetting controller");
        } else {
            info!("Activating manual fan control");
        }
        self.state.set_target(0.0);
        self.state.mode = Mode::Low;
        self.state.high_temp_timer = None;
        self.enable_manual_control()?;
        self.force_write_speed()
    }

    fn enable_manual_control(&mut self) -> Result<()> {
        self.ec.write(self.config.manual_addr, MANUAL_ENABLED)?;
        self.state.manual_control = true;
        Ok(())
    }

    /// Give fan control back to firmware. Only the first call touches the
    /// register; a failure is logged and not retried.
    pub fn hand_over(&mut self) {
        if self.handed_over {
            return;
        }
        self.handed_over = true;

        info!("Handing fan control over to firmware");
        match self.ec.write(self.config.manual_addr, MANUAL_DISABLED) {
            Ok(()) => self.state.manual_control = false,
            Err(e) => warn!("Failed to hand fan control back to firmware: {}", e),
        }
    }

    /// Write `curr_speed` unless the register already holds its value
    pub fn write_speed(&mut self) -> Result<()> {
        let value = self.mapping.to_register(self.state.curr_speed);
        if self.state.last_written == Some(value) {
            return Ok(());
        }
        self.write_register(value)
    }

    fn force_write_speed(&mut self) -> Result<()> {
        let value = self.mapping.to_register(self.state.curr_speed);
        self.write_register(value)
    }

    fn write_register(&mut self, value: u8) -> Result<()> {
        self.ec.write(self.config.ec_addr, value)?;
        self.state.last_written = Some(value);
        debug!("Speed: {}%, wrote EC value {}", self.state.curr_speed, value);
        Ok(())
    }

    fn log_readback(&mut self) -> Result<()> {
        let raw = self.ec.read(self.config.read_addr)?;
        debug!(
            "Firmware reports fan at {:.0}% (raw {}), commanded {}% in {} mode at {:.1}°C",
            self.mapping.readback_percent(raw),
            raw,
            self.state.curr_speed,
            self.state.mode,
            self.state.curr_temp
        );
        Ok(())
    }
}
