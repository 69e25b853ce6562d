#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas for the calibration tool.
//!
//! `Config` and its sections are deserialized from TOML and validated
//! before being mapped onto the core's runtime types. Every section has
//! defaults, so an empty document is a complete configuration.

use serde::Deserialize;

/// Sweep geometry section.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct GeometryCfg {
    /// Sensor resolution as a bit width; the domain size is `1 << bits`.
    pub resolution_bits: u8,
    /// Mechanical full steps per revolution.
    pub steps: i32,
    /// Sub-steps per mechanical step.
    pub microsteps: i32,
    /// Raw readings averaged into one measurement.
    pub read_count: usize,
}

impl Default for GeometryCfg {
    fn default() -> Self {
        Self {
            resolution_bits: 14,
            steps: 200,
            microsteps: 256,
            read_count: 16,
        }
    }
}

impl GeometryCfg {
    pub fn resolution(&self) -> i32 {
        1i32 << self.resolution_bits
    }

    pub fn pulses(&self) -> i64 {
        i64::from(self.steps) * i64::from(self.microsteps)
    }
}

/// Phase-drive section.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct DriveSection {
    /// Commutation current during the sweep, in milliamps.
    pub cal_current_ma: u16,
}

impl Default for DriveSection {
    fn default() -> Self {
        Self { cal_current_ma: 800 }
    }
}

/// Simulated-rig section, consumed by the CLI's host rig.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct SimSection {
    pub distortion_amplitude: i32,
    pub phase_offset: i32,
    pub reverse_polarity: bool,
    pub noise: bool,
    pub seed: u64,
    pub backlash_pulses: i32,
}

impl Default for SimSection {
    fn default() -> Self {
        Self {
            distortion_amplitude: 400,
            phase_offset: 3000,
            reverse_polarity: false,
            noise: true,
            seed: 0x5EED,
            backlash_pulses: 12,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub geometry: GeometryCfg,
    pub drive: DriveSection,
    pub sim: SimSection,
    pub logging: Logging,
}

pub fn load_toml(text: &str) -> eyre::Result<Config> {
    let cfg: Config = toml::from_str(text)?;
    Ok(cfg)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        let g = &self.geometry;
        if !(3..=15).contains(&g.resolution_bits) {
            eyre::bail!("resolution_bits must be in 3..=15");
        }
        if g.steps < 4 || g.steps % 2 != 0 {
            eyre::bail!("steps must be even and >= 4");
        }
        if g.microsteps < 2 || g.microsteps % 2 != 0 {
            eyre::bail!("microsteps must be even and >= 2");
        }
        if g.read_count == 0 {
            eyre::bail!("read_count must be >= 1");
        }
        if i64::from(g.resolution()) < 2 * i64::from(g.steps) {
            eyre::bail!("resolution must be at least twice the step count");
        }
        if g.pulses() > 65536 {
            eyre::bail!("pulses per revolution must fit 16-bit table entries");
        }
        if self.drive.cal_current_ma == 0 {
            eyre::bail!("cal_current_ma must be > 0");
        }
        if self.sim.distortion_amplitude < 0 {
            eyre::bail!("distortion_amplitude must be >= 0");
        }
        // The sweep's reverse gap must be able to take up the modeled play.
        if i64::from(self.sim.backlash_pulses) >= 20 * i64::from(g.microsteps) {
            eyre::bail!("backlash_pulses exceeds the backlash take-up gap");
        }
        if let Some(rotation) = &self.logging.rotation {
            match rotation.as_str() {
                "never" | "daily" | "hourly" => {}
                _ => eyre::bail!("rotation must be one of never|daily|hourly"),
            }
        }
        Ok(())
    }
}
