/*
 * Test utilities and fake hardware for ecfan
 *
 * In-memory stand-ins for the EC register file and the temperature sensor,
 * shared by the unit tests of the controller modules.
 */

use std::collections::VecDeque;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ecfan_error::{EcfanError, Result};

use crate::config::Config;
use crate::ec::EcRegisters;
use crate::sensor::TemperatureSource;

/// Default config with a cadence fast enough for loop tests
pub fn test_config() -> Config {
    Config {
        ec_path: PathBuf::from("/tmp/ecfan-test-ec"),
        thermal_zone: PathBuf::from("/tmp/ecfan-test-temp"),
        fast_interval_ms: 1,
        slow_every: 2,
        ..Config::default()
    }
}

/// 256-byte register file that records every access
#[derive(Debug, Clone)]
pub struct MemoryRegisters {
    regs: [u8; 256],
    pub reads: Vec<u64>,
    pub writes: Vec<(u64, u8)>,
}

impl MemoryRegisters {
    pub fn new() -> Self {
        Self {
            regs: [0; 256],
            reads: Vec::new(),
            writes: Vec::new(),
        }
    }

    /// Poke a register without recording it, as the firmware would
    pub fn set(&mut self, addr: u64, value: u8) {
        self.regs[addr as usize] = value;
    }

    pub fn get(&self, addr: u64) -> u8 {
        self.regs[addr as usize]
    }

    pub fn writes_to(&self, addr: u64) -> Vec<u8> {
        self.writes
            .iter()
            .filter(|(a, _)| *a == addr)
            .map(|(_, v)| *v)
            .collect()
    }
}

impl EcRegisters for MemoryRegisters {
    fn read(&mut self, addr: u64) -> Result<u8> {
        self.reads.push(addr);
        self.regs
            .get(addr as usize)
            .copied()
            .ok_or_else(|| EcfanError::RegisterRead {
                path: PathBuf::from("memory"),
                addr,
                source: io::Error::from(io::ErrorKind::UnexpectedEof),
            })
    }

    fn write(&mut self, addr: u64, value: u8) -> Result<()> {
        let slot = self.regs.get_mut(addr as usize).ok_or_else(|| EcfanError::RegisterWrite {
            path: PathBuf::from("memory"),
            addr,
            value,
            source: io::Error::from(io::ErrorKind::WriteZero),
        })?;
        *slot = value;
        self.writes.push((addr, value));
        Ok(())
    }
}

/// Replays a fixed list of samples, then repeats the last one. Optionally
/// requests shutdown once the script runs out.
#[derive(Debug, Default)]
pub struct ScriptedTemperature {
    samples: VecDeque<f64>,
    last: f64,
    shutdown: Option<Arc<AtomicBool>>,
}

impl ScriptedTemperature {
    pub fn new(samples: &[f64]) -> Self {
        Self {
            samples: samples.iter().copied().collect(),
            last: 0.0,
            shutdown: None,
        }
    }

    pub fn with_shutdown(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown = Some(flag);
        self
    }
}

impl TemperatureSource for ScriptedTemperature {
    fn read_celsius(&mut self) -> Result<f64> {
        match self.samples.pop_front() {
            Some(sample) => self.last = sample,
            None => {
                if let Some(flag) = &self.shutdown {
                    flag.store(true, Ordering::SeqCst);
                }
            }
        }
        Ok(self.last)
    }
}

/// Sensor whose file has disappeared
pub struct FailingTemperature;

impl TemperatureSource for FailingTemperature {
    fn read_celsius(&mut self) -> Result<f64> {
        Err(EcfanError::TemperatureRead {
            path: PathBuf::from("/sys/class/hwmon/hwmon5/temp2_input"),
            reason: "No such file or directory".into(),
        })
    }
}
