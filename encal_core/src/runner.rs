//! One-shot run loop interleaving the two cooperative rates.
//!
//! The high-rate tick drives the sweep; the low-rate solve pass runs
//! exactly once when the machine parks. Single-threaded by design: the two
//! never race because the machine stops commanding nonzero current once
//! parked, and only the solve pass touches the stored table.

use std::time::Duration;

use crate::error::{AbortReason, DriveError, Result};
use crate::machine::{Calibrator, GAP_DIVISIONS};
use crate::solve::SolveReport;
use crate::status::TickStatus;
use crate::util;
use encal_traits::{AngleSensor, Clock, CorrectionTable, MonotonicClock, PhaseDriver};

/// Pacing for the high-rate tick loop.
#[derive(Debug, Clone, Copy)]
pub enum TickPacing {
    /// Run ticks back-to-back (simulation, tests).
    FreeRunning,
    /// Sleep between ticks to approximate the given rate.
    Paced(u32),
}

/// Final report of one calibration run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Terminal data error, if the run failed validation or the build.
    pub error: Option<crate::error::CalError>,
    /// Entries persisted by the build pass.
    pub entries: u32,
    /// Ticks consumed by the sweep.
    pub ticks: u64,
    pub elapsed_ms: u64,
    /// The caller must reinitialize its view of the table before use.
    pub restart_required: bool,
}

impl RunReport {
    pub fn ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Upper bound on sweep ticks for one run, derived from the commanded
/// trajectory with a 2x margin. A sweep that exceeds it is stuck.
pub fn tick_budget(geometry: &crate::config::Geometry) -> u64 {
    let pulses = geometry.pulses() as u64;
    let sampling = geometry.boundaries() as u64 * geometry.read_count as u64;
    let gap = (GAP_DIVISIONS * geometry.microsteps) as u64;
    // Ramp + two sampled revolutions + two gap legs, plus slack.
    let trajectory = pulses / 2 + 2 * (pulses + sampling) + 2 * gap + 4;
    trajectory * 2
}

/// Drive one full calibration run to its report.
///
/// `cancel_check` is polled each tick; returning true clears the
/// run-enable flag and aborts. The solve pass may block on storage, which
/// happens once, off the tick path.
pub fn run<S, D, T>(
    calibrator: &mut Calibrator<S, D, T>,
    pacing: TickPacing,
    cancel_check: Option<&dyn Fn() -> bool>,
) -> Result<RunReport>
where
    S: AngleSensor,
    D: PhaseDriver,
    T: CorrectionTable,
{
    let clock = MonotonicClock::new();
    let epoch = clock.now();
    let budget = tick_budget(calibrator.geometry());
    let period = match pacing {
        TickPacing::FreeRunning => None,
        TickPacing::Paced(hz) => Some(Duration::from_micros(util::period_us(hz))),
    };

    calibrator.start();
    tracing::info!(budget, "calibration run started");

    let mut ticks: u64 = 0;
    loop {
        if let Some(check) = cancel_check {
            if check() {
                let _ = calibrator.cancel();
                return Err(eyre::Report::new(DriveError::Abort(AbortReason::Cancelled)));
            }
        }
        if ticks >= budget {
            let _ = calibrator.cancel();
            tracing::error!(ticks, "sweep exceeded its tick budget");
            return Err(eyre::Report::new(DriveError::Abort(AbortReason::TickBudget)));
        }

        match calibrator.tick()? {
            TickStatus::Sweeping => {}
            TickStatus::Parked => break,
            // The flag was cleared out from under the loop.
            TickStatus::Idle => {
                return Err(eyre::Report::new(DriveError::Abort(AbortReason::Cancelled)));
            }
        }
        ticks += 1;
        if let Some(p) = period {
            clock.sleep(p);
        }
    }

    let report: SolveReport = calibrator.solve()?;
    let elapsed_ms = clock.ms_since(epoch);
    tracing::info!(
        ticks,
        elapsed_ms,
        ok = report.ok(),
        entries = report.entries,
        "calibration run finished"
    );

    Ok(RunReport {
        error: report.error,
        entries: report.entries,
        ticks,
        elapsed_ms,
        restart_required: report.restart_required,
    })
}
