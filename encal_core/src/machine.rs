//! Open-loop sweep state machine.
//!
//! A periodic tick advances the sweep exactly one step while the run-enable
//! flag is set. Every active state commands the phase driver with
//! `(target, calibration current)` as its only side effect; sampling happens
//! at microstep boundaries, where the target holds still until the sample
//! window fills.

use crate::config::{DriveCfg, Geometry};
use crate::error::{self, Result};
use crate::sampler::SampleWindow;
use crate::session::{CalState, SweepSession};
use crate::status::TickStatus;
use encal_traits::{AngleSensor, CorrectionTable, PhaseDriver};
use eyre::WrapErr;

/// Coarse ramp step per tick while positioning (pulses).
pub(crate) const COARSE_STEP: i32 = 2;
/// Fine sweep step per tick while sampling (pulses).
pub(crate) const FINE_STEP: i32 = 1;
/// Backlash take-up distance before reverse sampling, in microstep grids.
pub(crate) const GAP_DIVISIONS: i32 = 20;

/// The calibration engine: sweep state machine plus the solve pass.
///
/// Owns its collaborators and its session so tests can run isolated
/// instances side by side.
pub struct Calibrator<S, D, T> {
    pub(crate) sensor: S,
    pub(crate) driver: D,
    pub(crate) table: T,
    pub(crate) geometry: Geometry,
    pub(crate) drive: DriveCfg,
    pub(crate) session: SweepSession,
    pub(crate) window: SampleWindow,
}

impl<S: AngleSensor, D: PhaseDriver, T: CorrectionTable> Calibrator<S, D, T> {
    /// Arm a fresh run; the next tick begins the sweep from Idle.
    pub fn start(&mut self) {
        self.session.reset();
        self.window.reset();
        self.session.start = true;
        tracing::info!("calibration armed");
    }

    /// Halt progress at the next tick and release the motor. Partial
    /// sample data stays in place and is overwritten by the next run.
    pub fn cancel(&mut self) -> Result<()> {
        self.session.start = false;
        tracing::warn!(state = ?self.session.state, "calibration cancelled");
        self.command(self.session.target, 0)
            .wrap_err("releasing motor after cancel")
    }

    /// True once the sweep is parked and the solve pass may run.
    pub fn parked(&self) -> bool {
        self.session.state == CalState::Solve
    }

    pub fn session(&self) -> &SweepSession {
        &self.session
    }

    /// Mutable session access for staging isolated test instances; the
    /// session is the run's entire context, so doctoring it is the
    /// supported way to exercise the solve pass in isolation.
    pub fn session_mut(&mut self) -> &mut SweepSession {
        &mut self.session
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn table(&self) -> &T {
        &self.table
    }

    /// Advance the sweep by exactly one step. A no-op while disarmed.
    pub fn tick(&mut self) -> Result<TickStatus> {
        if !self.session.start {
            return Ok(TickStatus::Idle);
        }
        match self.session.state {
            CalState::Idle => self.tick_idle()?,
            CalState::FwdReady => self.tick_fwd_ready()?,
            CalState::FwdStart => self.tick_fwd_start()?,
            CalState::BwdReturn => self.tick_bwd_return()?,
            CalState::BwdGap => self.tick_bwd_gap()?,
            CalState::BwdStart => self.tick_bwd_start()?,
            CalState::Solve => {
                self.command(0, 0)?;
                return Ok(TickStatus::Parked);
            }
        }
        Ok(TickStatus::Sweeping)
    }

    fn tick_idle(&mut self) -> Result<()> {
        // Keep the motor released until the ramp begins.
        self.command(self.session.target, 0)?;
        self.session.state = CalState::FwdReady;
        self.session.target = self.geometry.pulses();
        tracing::debug!(target = self.session.target, "sweep: forward ramp");
        Ok(())
    }

    fn tick_fwd_ready(&mut self) -> Result<()> {
        let stop = self.geometry.pulses() * 2;
        self.command(self.session.target, self.drive.cal_current_ma)?;
        self.session.target += COARSE_STEP;
        if self.session.target != stop {
            return Ok(());
        }
        self.session.state = CalState::FwdStart;
        self.session.target = self.geometry.pulses();
        tracing::debug!("sweep: forward sampling");
        Ok(())
    }

    fn tick_fwd_start(&mut self) -> Result<()> {
        let stop = self.geometry.pulses() * 2;
        if self.session.target % self.geometry.microsteps == 0 {
            let raw = self.read_sensor()?;
            if let Some(avg) = self.window.push(raw) {
                let idx = self.session.avg_cnt as usize;
                debug_assert!(idx < self.session.forward.len());
                self.session.forward[idx] = avg;
                self.session.avg_cnt += 1;
                // Step off the boundary so the sweep resumes next tick.
                self.session.target += FINE_STEP;
            }
        } else {
            self.session.target += FINE_STEP;
        }
        self.command(self.session.target, self.drive.cal_current_ma)?;
        if self.session.target <= stop {
            return Ok(());
        }
        self.session.state = CalState::BwdReturn;
        tracing::debug!(samples = self.session.avg_cnt, "sweep: overshoot return");
        Ok(())
    }

    fn tick_bwd_return(&mut self) -> Result<()> {
        let stop = self.geometry.pulses() * 2 + self.geometry.microsteps * GAP_DIVISIONS;
        self.session.target += FINE_STEP;
        self.command(self.session.target, self.drive.cal_current_ma)?;
        if self.session.target != stop {
            return Ok(());
        }
        self.session.state = CalState::BwdGap;
        tracing::debug!("sweep: backlash take-up");
        Ok(())
    }

    fn tick_bwd_gap(&mut self) -> Result<()> {
        let stop = self.geometry.pulses() * 2;
        self.session.target -= FINE_STEP;
        self.command(self.session.target, self.drive.cal_current_ma)?;
        if self.session.target != stop {
            return Ok(());
        }
        self.session.state = CalState::BwdStart;
        self.session.avg_cnt = self.geometry.steps;
        tracing::debug!("sweep: backward sampling");
        Ok(())
    }

    fn tick_bwd_start(&mut self) -> Result<()> {
        let stop = self.geometry.pulses();
        if self.session.target % self.geometry.microsteps == 0 {
            let raw = self.read_sensor()?;
            if let Some(avg) = self.window.push(raw) {
                let idx = self.session.avg_cnt as usize;
                debug_assert!(idx < self.session.backward.len());
                self.session.backward[idx] = avg;
                self.session.avg_cnt -= 1;
                self.session.target -= FINE_STEP;
            }
        } else {
            self.session.target -= FINE_STEP;
        }
        self.command(self.session.target, self.drive.cal_current_ma)?;
        if self.session.target >= stop {
            return Ok(());
        }
        self.session.state = CalState::Solve;
        tracing::debug!("sweep: parked for solve");
        Ok(())
    }

    pub(crate) fn command(&mut self, position: i32, current_ma: u16) -> Result<()> {
        self.driver
            .set_current_vector(position, current_ma)
            .map_err(|e| eyre::Report::new(error::map_hw_error(&*e)))
            .wrap_err("commanding phase vector")
    }

    fn read_sensor(&mut self) -> Result<u16> {
        self.sensor
            .read()
            .map_err(|e| eyre::Report::new(error::map_hw_error(&*e)))
            .wrap_err("reading angle sensor")
    }
}
