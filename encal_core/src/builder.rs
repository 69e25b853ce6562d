//! Calibrator construction.
//!
//! Two entry points, mirroring the two dispatch styles:
//! - `CalibratorBuilder`: chainable, type-state checked, boxes the
//!   capabilities behind trait objects.
//! - `build_calibrator`: direct generic constructor for static dispatch.

use std::marker::PhantomData;

use crate::config::{DriveCfg, Geometry};
use crate::error::{BuildError, Result};
use crate::machine::Calibrator;
use crate::sampler::SampleWindow;
use crate::session::SweepSession;
use encal_traits::{AngleSensor, CorrectionTable, PhaseDriver};

/// Boxed calibrator produced by the builder.
pub type BoxedCalibrator =
    Calibrator<Box<dyn AngleSensor>, Box<dyn PhaseDriver>, Box<dyn CorrectionTable>>;

// Type-state markers for the builder
pub struct Missing;
pub struct Set;

/// Builder for a boxed `Calibrator`. The type parameters track whether the
/// sensor, driver, and table have been provided; `build` is only available
/// once all three are set, while `try_build` reports what is missing.
pub struct CalibratorBuilder<S, D, T> {
    sensor: Option<Box<dyn AngleSensor>>,
    driver: Option<Box<dyn PhaseDriver>>,
    table: Option<Box<dyn CorrectionTable>>,
    geometry: Geometry,
    drive: DriveCfg,
    _s: PhantomData<S>,
    _d: PhantomData<D>,
    _t: PhantomData<T>,
}

impl Default for CalibratorBuilder<Missing, Missing, Missing> {
    fn default() -> Self {
        Self {
            sensor: None,
            driver: None,
            table: None,
            geometry: Geometry::default(),
            drive: DriveCfg::default(),
            _s: PhantomData,
            _d: PhantomData,
            _t: PhantomData,
        }
    }
}

impl CalibratorBuilder<Missing, Missing, Missing> {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Chainable setters that do not affect type-state
impl<S, D, T> CalibratorBuilder<S, D, T> {
    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = geometry;
        self
    }

    pub fn with_drive(mut self, drive: DriveCfg) -> Self {
        self.drive = drive;
        self
    }

    /// Fallible build available in any type-state; reports the first
    /// missing capability.
    pub fn try_build(self) -> Result<BoxedCalibrator> {
        let CalibratorBuilder {
            sensor,
            driver,
            table,
            geometry,
            drive,
            _s: _,
            _d: _,
            _t: _,
        } = self;

        let sensor = sensor.ok_or_else(|| eyre::Report::new(BuildError::MissingSensor))?;
        let driver = driver.ok_or_else(|| eyre::Report::new(BuildError::MissingDriver))?;
        let table = table.ok_or_else(|| eyre::Report::new(BuildError::MissingTable))?;

        build_calibrator(sensor, driver, table, geometry, drive)
    }
}

// Setters that advance type-state when providing mandatory capabilities
impl<D, T> CalibratorBuilder<Missing, D, T> {
    pub fn with_sensor(self, sensor: impl AngleSensor + 'static) -> CalibratorBuilder<Set, D, T> {
        let CalibratorBuilder {
            sensor: _,
            driver,
            table,
            geometry,
            drive,
            _s: _,
            _d: _,
            _t: _,
        } = self;
        CalibratorBuilder {
            sensor: Some(Box::new(sensor)),
            driver,
            table,
            geometry,
            drive,
            _s: PhantomData,
            _d: PhantomData,
            _t: PhantomData,
        }
    }
}

impl<S, T> CalibratorBuilder<S, Missing, T> {
    pub fn with_driver(self, driver: impl PhaseDriver + 'static) -> CalibratorBuilder<S, Set, T> {
        let CalibratorBuilder {
            sensor,
            driver: _,
            table,
            geometry,
            drive,
            _s: _,
            _d: _,
            _t: _,
        } = self;
        CalibratorBuilder {
            sensor,
            driver: Some(Box::new(driver)),
            table,
            geometry,
            drive,
            _s: PhantomData,
            _d: PhantomData,
            _t: PhantomData,
        }
    }
}

impl<S, D> CalibratorBuilder<S, D, Missing> {
    pub fn with_table(self, table: impl CorrectionTable + 'static) -> CalibratorBuilder<S, D, Set> {
        let CalibratorBuilder {
            sensor,
            driver,
            table: _,
            geometry,
            drive,
            _s: _,
            _d: _,
            _t: _,
        } = self;
        CalibratorBuilder {
            sensor,
            driver,
            table: Some(Box::new(table)),
            geometry,
            drive,
            _s: PhantomData,
            _d: PhantomData,
            _t: PhantomData,
        }
    }
}

impl CalibratorBuilder<Set, Set, Set> {
    /// Validate and build. Only available once sensor, driver, and table
    /// are all provided.
    pub fn build(self) -> Result<BoxedCalibrator> {
        self.try_build()
    }
}

/// Build a statically-dispatched calibrator from concrete capabilities.
pub fn build_calibrator<S, D, T>(
    sensor: S,
    driver: D,
    table: T,
    geometry: Geometry,
    drive: DriveCfg,
) -> Result<Calibrator<S, D, T>>
where
    S: AngleSensor + 'static,
    D: PhaseDriver + 'static,
    T: CorrectionTable + 'static,
{
    geometry.validate().map_err(eyre::Report::new)?;
    if drive.cal_current_ma == 0 {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "cal_current_ma must be > 0",
        )));
    }

    let session = SweepSession::new(geometry.boundaries());
    let window = SampleWindow::new(geometry.read_count, geometry.resolution);

    Ok(Calibrator {
        sensor,
        driver,
        table,
        geometry,
        drive,
        session,
        window,
    })
}
