//! Post-sweep validation and wrap-point location.
//!
//! Runs only after the sweep is parked. The stages execute in order and the
//! first failure aborts the pass: merge, direction, continuity, wrap scan.
//! This is what stands between a bad sweep (wrong polarity, slipped steps,
//! noise, partial revolutions) and a silently corrupt table.

use crate::config::Geometry;
use crate::cyclic;
use crate::error::CalError;
use crate::session::SweepSession;

/// Validate the merged sweep data and record the wrap point in the
/// session. Normally invoked through `Calibrator::solve`.
pub fn verify(session: &mut SweepSession, geometry: &Geometry) -> Result<(), CalError> {
    merge(session, geometry);
    detect_direction(session, geometry)?;
    check_continuity(session, geometry)?;
    locate_wrap(session, geometry)
}

/// Fold the backward sweep into `forward` via the cyclic midpoint. The two
/// directions disagree by a constant backlash bias, which the midpoint
/// cancels.
fn merge(session: &mut SweepSession, geometry: &Geometry) {
    let res = geometry.resolution;
    for i in 0..=geometry.steps as usize {
        let merged = cyclic::average2(
            i32::from(session.forward[i]),
            i32::from(session.backward[i]),
            res,
        );
        session.forward[i] = merged as u16;
    }
}

/// Fix the sweep direction from the first and last-but-one samples.
fn detect_direction(session: &mut SweepSession, geometry: &Geometry) -> Result<(), CalError> {
    let data = &session.forward;
    let head_tail = cyclic::subtract(
        i32::from(data[0]),
        i32::from(data[geometry.steps as usize - 1]),
        geometry.resolution,
    );
    if head_tail == 0 {
        return Err(CalError::AvgDir { index: None });
    }
    session.dir = head_tail > 0;
    Ok(())
}

/// Check that adjacent samples are spaced within tolerance of the ideal
/// interval and agree with the detected direction.
fn check_continuity(session: &SweepSession, geometry: &Geometry) -> Result<(), CalError> {
    let res = geometry.resolution;
    // Integer division first: the tolerance is (R/N)*3/2, not R*3/(2N).
    let ideal = res / geometry.steps;
    let data = &session.forward;

    for i in 1..geometry.steps as usize {
        let diff = cyclic::subtract(i32::from(data[i]), i32::from(data[i - 1]), res);

        if diff.abs() > ideal * 3 / 2 {
            return Err(CalError::AvgContinuity { index: i as u16 });
        }
        if diff.abs() < ideal / 2 {
            return Err(CalError::AvgContinuity { index: i as u16 });
        }
        if diff == 0 {
            return Err(CalError::AvgDir { index: Some(i as u16) });
        }
        if diff > 0 && !session.dir {
            return Err(CalError::AvgDir { index: Some(i as u16) });
        }
        if diff < 0 && session.dir {
            return Err(CalError::AvgDir { index: Some(i as u16) });
        }
    }
    Ok(())
}

/// Scan all N circular interval pairs for raw sign changes inconsistent
/// with the sweep direction. Exactly one such interval must exist: the
/// point where the sensor wraps past the end of its domain.
fn locate_wrap(session: &mut SweepSession, geometry: &Geometry) -> Result<(), CalError> {
    let res = geometry.resolution;
    let steps = geometry.steps;
    let data = &session.forward;
    let at = |i: i32| i32::from(data[cyclic::modulo(i, steps) as usize]);

    let mut crossings = 0u32;
    let mut rcd_x = 0i32;
    let mut rcd_y = 0i32;
    if session.dir {
        for i in 0..steps {
            if at(i + 1) - at(i) < 0 {
                crossings += 1;
                rcd_x = i;
                // Offset anchored at the interval's leading sample; the
                // lead is i here and i + 1 in the reverse branch, matching
                // the reversed fill order.
                rcd_y = (res - 1) - at(i);
            }
        }
    } else {
        for i in 0..steps {
            if at(i + 1) - at(i) > 0 {
                crossings += 1;
                rcd_x = i;
                rcd_y = (res - 1) - at(i + 1);
            }
        }
    }

    if crossings != 1 {
        return Err(CalError::PhaseStep { crossings });
    }
    session.rcd_x = rcd_x;
    session.rcd_y = rcd_y;
    Ok(())
}
