//! Runtime configuration for the calibration core.
//!
//! These are the validated structs the state machine runs on. They are
//! separate from the TOML-deserialized schemas in `encal_config`.

use crate::error::BuildError;

/// Sweep geometry: the sensor domain and the motor step grid.
#[derive(Debug, Clone)]
pub struct Geometry {
    /// Sensor domain size; a power of two. Raw values are `[0, resolution)`.
    pub resolution: i32,
    /// Mechanical full steps sampled per revolution.
    pub steps: i32,
    /// Sub-steps per mechanical step; the sampling grid.
    pub microsteps: i32,
    /// Raw readings averaged into one measurement.
    pub read_count: usize,
}

impl Geometry {
    /// Pulses per revolution (`steps * microsteps`).
    pub fn pulses(&self) -> i32 {
        self.steps * self.microsteps
    }

    /// Boundary samples collected per sweep direction. One more than the
    /// step count because sampling begins mid-step.
    pub fn boundaries(&self) -> usize {
        self.steps as usize + 1
    }

    pub(crate) fn validate(&self) -> Result<(), BuildError> {
        if self.resolution < 8 || !(self.resolution as u32).is_power_of_two() {
            return Err(BuildError::InvalidConfig(
                "resolution must be a power of two >= 8",
            ));
        }
        if self.resolution > 32768 {
            return Err(BuildError::InvalidConfig(
                "resolution must fit 16-bit raw readings",
            ));
        }
        if self.steps < 4 || self.steps % 2 != 0 {
            return Err(BuildError::InvalidConfig("steps must be even and >= 4"));
        }
        if self.microsteps < 2 || self.microsteps % 2 != 0 {
            return Err(BuildError::InvalidConfig(
                "microsteps must be even and >= 2",
            ));
        }
        if self.read_count == 0 {
            return Err(BuildError::InvalidConfig("read_count must be >= 1"));
        }
        if self.resolution / self.steps < 2 {
            return Err(BuildError::InvalidConfig(
                "resolution must be at least twice the step count",
            ));
        }
        if self.pulses() > 65536 {
            return Err(BuildError::InvalidConfig(
                "pulses per revolution must fit 16-bit table entries",
            ));
        }
        Ok(())
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            resolution: 1 << 14,
            steps: 200,
            microsteps: 256,
            read_count: 16,
        }
    }
}

/// Phase-drive parameters used during the sweep.
#[derive(Debug, Clone)]
pub struct DriveCfg {
    /// Commutation current magnitude while sweeping, in milliamps.
    pub cal_current_ma: u16,
}

impl Default for DriveCfg {
    fn default() -> Self {
        Self { cal_current_ma: 800 }
    }
}
