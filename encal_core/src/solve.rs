//! Interpolation and persistence of the correction table.

use crate::cyclic;
use crate::error::{self, CalError, DriveError, Result};
use crate::machine::Calibrator;
use crate::session::CalState;
use crate::verify;
use encal_traits::{AngleSensor, CorrectionTable, PhaseDriver};
use eyre::WrapErr;

/// Report of one completed solve pass.
#[derive(Debug, Clone)]
pub struct SolveReport {
    /// Terminal data error, if validation or the build failed.
    pub error: Option<CalError>,
    /// Entries written before the bracket closed.
    pub entries: u32,
    /// The embedding loop must reinitialize before anything reads the
    /// table again.
    pub restart_required: bool,
}

impl SolveReport {
    pub fn ok(&self) -> bool {
        self.error.is_none()
    }
}

impl<S: AngleSensor, D: PhaseDriver, T: CorrectionTable> Calibrator<S, D, T> {
    /// Verify the sweep and, when it holds up, build and persist the
    /// correction table. Gated on the parked state; exactly one
    /// erase + begin..end bracket is issued per attempt.
    ///
    /// Every outcome disarms the machine and resets it to Idle; the caller
    /// must treat the run as finished either way.
    pub fn solve(&mut self) -> Result<SolveReport> {
        if self.session.state != CalState::Solve {
            return Err(eyre::Report::new(DriveError::State(
                "solve requires a parked sweep",
            )));
        }

        self.session.errid = None;
        self.session.result_num = 0;

        match verify::verify(&mut self.session, &self.geometry) {
            Err(err) => {
                // The stored table is untouched here; only a build attempt
                // may erase it.
                self.session.errid = Some(err);
            }
            Ok(()) => {
                tracing::debug!(
                    dir = self.session.dir,
                    wrap_interval = self.session.rcd_x,
                    wrap_offset = self.session.rcd_y,
                    "sweep validated"
                );
                if let Err(e) = self.build_table() {
                    self.finish();
                    return Err(e);
                }
            }
        }

        let report = SolveReport {
            error: self.session.errid.clone(),
            entries: self.session.result_num,
            restart_required: true,
        };
        match &report.error {
            None => tracing::info!(entries = report.entries, "correction table committed"),
            Some(err) => tracing::error!(error = %err, "calibration failed; table left invalid"),
        }
        self.finish();
        Ok(report)
    }

    /// Walk the N+1 intervals from the recorded wrap point in the detected
    /// direction, expanding each mechanical step into its share of
    /// linearly interpolated entries, appended in ascending raw-sensor
    /// order.
    fn build_table(&mut self) -> Result<()> {
        let res = self.geometry.resolution;
        let steps = self.geometry.steps;
        let div = self.geometry.microsteps;
        let pulses = self.geometry.pulses();
        let dir = self.session.dir;
        let rcd_x = self.session.rcd_x;
        let rcd_y = self.session.rcd_y;

        self.table
            .erase()
            .map_err(|e| eyre::Report::new(error::map_store_error(&*e)))
            .wrap_err("erasing table region")?;
        self.table
            .begin_write()
            .map_err(|e| eyre::Report::new(error::map_store_error(&*e)))
            .wrap_err("opening table write")?;

        let mut chunk: Vec<u16> = Vec::with_capacity(div as usize);
        let mut written: u32 = 0;

        if dir {
            for step_x in rcd_x..=rcd_x + steps {
                let val = cyclic::subtract(
                    i32::from(self.session.forward[cyclic::modulo(step_x + 1, steps) as usize]),
                    i32::from(self.session.forward[cyclic::modulo(step_x, steps) as usize]),
                    res,
                );
                // The write order begins mid-interval at the wrap offset
                // and closes exactly one full circle.
                let (lo, hi) = if step_x == rcd_x {
                    (rcd_y, val)
                } else if step_x == rcd_x + steps {
                    (0, rcd_y)
                } else {
                    (0, val)
                };
                chunk.clear();
                for step_y in lo..hi {
                    let entry = cyclic::modulo(div * step_x + div * step_y / val, pulses);
                    chunk.push(entry as u16);
                }
                self.table
                    .write_entries(&chunk)
                    .map_err(|e| eyre::Report::new(error::map_store_error(&*e)))
                    .wrap_err("writing table entries")?;
                written += chunk.len() as u32;
            }
        } else {
            for step_x in (rcd_x..=rcd_x + steps).rev() {
                let val = cyclic::subtract(
                    i32::from(self.session.forward[cyclic::modulo(step_x, steps) as usize]),
                    i32::from(self.session.forward[cyclic::modulo(step_x + 1, steps) as usize]),
                    res,
                );
                let (lo, hi) = if step_x == rcd_x + steps {
                    (rcd_y, val)
                } else if step_x == rcd_x {
                    (0, rcd_y)
                } else {
                    (0, val)
                };
                chunk.clear();
                for step_y in lo..hi {
                    let entry = cyclic::modulo(div * (step_x + 1) - div * step_y / val, pulses);
                    chunk.push(entry as u16);
                }
                self.table
                    .write_entries(&chunk)
                    .map_err(|e| eyre::Report::new(error::map_store_error(&*e)))
                    .wrap_err("writing table entries")?;
                written += chunk.len() as u32;
            }
        }

        self.table
            .end_write()
            .map_err(|e| eyre::Report::new(error::map_store_error(&*e)))
            .wrap_err("closing table write")?;
        self.session.result_num = written;

        if written != res as u32 {
            self.session.errid = Some(CalError::Quantity { written });
        }
        if self.session.errid.is_some() {
            // Leave the region in the erased pattern so the boot scan sees
            // it invalid.
            self.table
                .erase()
                .map_err(|e| eyre::Report::new(error::map_store_error(&*e)))
                .wrap_err("invalidating table after failed build")?;
        }
        Ok(())
    }

    /// Disarm and park back at Idle. The error and entry count survive in
    /// the session for post-run inspection.
    fn finish(&mut self) {
        self.session.start = false;
        self.session.state = CalState::Idle;
        self.window.reset();
    }
}
