//! Simulated mechanism: a sensor/driver pair over shared state.
//!
//! The driver moves a modeled rotor (with backlash play) toward each
//! commanded position; the sensor maps the rotor angle through a distorted
//! magnet characteristic back to raw counts. Splitting one mechanism into
//! the two capability handles keeps them on the same rotor.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::error::HwError;
use encal_traits::{AngleSensor, PhaseDriver};

/// Tunable imperfections of the simulated rig.
#[derive(Debug, Clone)]
pub struct SimCfg {
    /// Peak of the smooth once-per-revolution distortion, in raw counts.
    /// Must stay small enough that adjacent full-step samples keep their
    /// spacing inside the verifier's tolerance band.
    pub distortion_amplitude: i32,
    /// Fixed rotor-to-magnet offset, in raw counts.
    pub phase_offset: i32,
    /// Count downward with increasing rotor angle.
    pub reverse_polarity: bool,
    /// Add deterministic +/-1 count reading noise.
    pub noise: bool,
    pub seed: u64,
    /// Play between commanded and rotor position, in pulses; a direction
    /// reversal travels twice this before the rotor follows.
    pub backlash_pulses: i32,
    /// Fail sensor reads after this many successful ones.
    pub fail_after: Option<u64>,
}

impl Default for SimCfg {
    fn default() -> Self {
        Self {
            distortion_amplitude: 400,
            phase_offset: 3000,
            reverse_polarity: false,
            noise: true,
            seed: 0x5EED,
            backlash_pulses: 12,
            fail_after: None,
        }
    }
}

#[derive(Debug)]
struct MechState {
    commanded: i32,
    rotor: i32,
}

/// One simulated rig; split it into the sensor and driver handles.
pub struct SimulatedMechanism;

impl SimulatedMechanism {
    pub fn split(cfg: SimCfg, resolution: i32, pulses: i32) -> (SimSensor, SimDriver) {
        let state = Rc::new(RefCell::new(MechState {
            commanded: 0,
            rotor: 0,
        }));
        let sensor = SimSensor {
            state: Rc::clone(&state),
            cfg: cfg.clone(),
            resolution,
            pulses,
            rng: Cell::new(cfg.seed),
            reads: Cell::new(0),
        };
        let driver = SimDriver {
            state,
            backlash_pulses: cfg.backlash_pulses,
        };
        (sensor, driver)
    }
}

/// Simulated magnetic angle sensor.
pub struct SimSensor {
    state: Rc<RefCell<MechState>>,
    cfg: SimCfg,
    resolution: i32,
    pulses: i32,
    rng: Cell<u64>,
    reads: Cell<u64>,
}

impl SimSensor {
    fn noise_step(&self) -> i32 {
        let next = self
            .rng
            .get()
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.rng.set(next);
        ((next >> 33) % 3) as i32 - 1
    }
}

impl AngleSensor for SimSensor {
    fn read(&mut self) -> Result<u16, Box<dyn std::error::Error + Send + Sync>> {
        if let Some(limit) = self.cfg.fail_after {
            if self.reads.get() >= limit {
                return Err(Box::new(HwError::Sensor("sensor stopped responding".into())));
            }
        }
        self.reads.set(self.reads.get() + 1);

        let rotor = self.state.borrow().rotor;
        let p = rotor.rem_euclid(self.pulses);
        let ideal = (i64::from(p) * i64::from(self.resolution) / i64::from(self.pulses)) as i32;

        let turns = p as f32 / self.pulses as f32;
        let wobble =
            self.cfg.distortion_amplitude as f32 * (core::f32::consts::TAU * turns).sin();

        let mut raw = ideal + self.cfg.phase_offset + wobble.round() as i32;
        if self.cfg.noise {
            raw += self.noise_step();
        }
        if self.cfg.reverse_polarity {
            raw = -raw;
        }
        Ok(raw.rem_euclid(self.resolution) as u16)
    }
}

/// Simulated open-loop phase driver.
pub struct SimDriver {
    state: Rc<RefCell<MechState>>,
    backlash_pulses: i32,
}

impl SimDriver {
    /// Last commanded pulse position.
    pub fn commanded(&self) -> i32 {
        self.state.borrow().commanded
    }

    /// Current rotor pulse position, backlash included.
    pub fn rotor(&self) -> i32 {
        self.state.borrow().rotor
    }
}

impl PhaseDriver for SimDriver {
    fn set_current_vector(
        &mut self,
        position: i32,
        current_ma: u16,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut st = self.state.borrow_mut();
        st.commanded = position;
        // Without current there is no torque to drag the rotor along.
        if current_ma > 0 {
            let play = self.backlash_pulses;
            if position - st.rotor > play {
                st.rotor = position - play;
            } else if st.rotor - position > play {
                st.rotor = position + play;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_cfg() -> SimCfg {
        SimCfg {
            distortion_amplitude: 0,
            phase_offset: 0,
            reverse_polarity: false,
            noise: false,
            seed: 1,
            backlash_pulses: 0,
            fail_after: None,
        }
    }

    #[test]
    fn ideal_rig_reads_a_linear_ramp() {
        let (mut sensor, mut driver) = SimulatedMechanism::split(quiet_cfg(), 16384, 51200);
        for pulse in [0, 256, 512, 51200] {
            driver.set_current_vector(pulse, 800).unwrap();
            let expected = ((pulse % 51200) as i64 * 16384 / 51200) as u16;
            assert_eq!(sensor.read().unwrap(), expected);
        }
    }

    #[test]
    fn backlash_makes_the_rotor_lag_by_the_play() {
        let cfg = SimCfg {
            backlash_pulses: 10,
            ..quiet_cfg()
        };
        let (_sensor, mut driver) = SimulatedMechanism::split(cfg, 16384, 51200);
        driver.set_current_vector(1000, 800).unwrap();
        assert_eq!(driver.rotor(), 990);
        // Reversing eats the play twice before the rotor moves.
        driver.set_current_vector(995, 800).unwrap();
        assert_eq!(driver.rotor(), 990);
        driver.set_current_vector(900, 800).unwrap();
        assert_eq!(driver.rotor(), 910);
    }

    #[test]
    fn zero_current_leaves_the_rotor_in_place() {
        let (_sensor, mut driver) = SimulatedMechanism::split(quiet_cfg(), 16384, 51200);
        driver.set_current_vector(5000, 0).unwrap();
        assert_eq!(driver.rotor(), 0);
        assert_eq!(driver.commanded(), 5000);
    }

    #[test]
    fn reversed_polarity_counts_down() {
        let cfg = SimCfg {
            reverse_polarity: true,
            ..quiet_cfg()
        };
        let (mut sensor, mut driver) = SimulatedMechanism::split(cfg, 16384, 51200);
        driver.set_current_vector(256, 800).unwrap();
        let fwd = sensor.read().unwrap();
        driver.set_current_vector(512, 800).unwrap();
        let next = sensor.read().unwrap();
        assert!(next < fwd);
    }

    #[test]
    fn scripted_sensor_failure_surfaces_as_an_error() {
        let cfg = SimCfg {
            fail_after: Some(2),
            ..quiet_cfg()
        };
        let (mut sensor, _driver) = SimulatedMechanism::split(cfg, 16384, 51200);
        assert!(sensor.read().is_ok());
        assert!(sensor.read().is_ok());
        assert!(sensor.read().is_err());
    }
}
