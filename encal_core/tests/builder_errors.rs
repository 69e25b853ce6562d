use encal_core::mocks::NoopTable;
use encal_core::{BuildError, CalibratorBuilder, DriveCfg, Geometry, build_calibrator};
use encal_traits::{AngleSensor, PhaseDriver};

struct StillSensor;
impl AngleSensor for StillSensor {
    fn read(&mut self) -> Result<u16, Box<dyn std::error::Error + Send + Sync>> {
        Ok(0)
    }
}

struct SinkDriver;
impl PhaseDriver for SinkDriver {
    fn set_current_vector(
        &mut self,
        _position: i32,
        _current_ma: u16,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(())
    }
}

#[test]
fn missing_capabilities_are_reported_in_order() {
    let err = CalibratorBuilder::new().try_build().unwrap_err();
    assert!(matches!(
        err.downcast_ref::<BuildError>(),
        Some(BuildError::MissingSensor)
    ));

    let err = CalibratorBuilder::new()
        .with_sensor(StillSensor)
        .try_build()
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<BuildError>(),
        Some(BuildError::MissingDriver)
    ));

    let err = CalibratorBuilder::new()
        .with_sensor(StillSensor)
        .with_driver(SinkDriver)
        .try_build()
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<BuildError>(),
        Some(BuildError::MissingTable)
    ));
}

#[test]
fn complete_builder_produces_a_working_calibrator() {
    let cal = CalibratorBuilder::new()
        .with_sensor(StillSensor)
        .with_driver(SinkDriver)
        .with_table(NoopTable)
        .with_geometry(Geometry {
            resolution: 16,
            steps: 4,
            microsteps: 4,
            read_count: 2,
        })
        .with_drive(DriveCfg { cal_current_ma: 500 })
        .build()
        .unwrap();
    assert!(!cal.parked());
    assert!(!cal.session().start);
}

#[test]
fn invalid_geometry_is_rejected() {
    let err = build_calibrator(
        StillSensor,
        SinkDriver,
        NoopTable,
        Geometry {
            resolution: 20000,
            ..Geometry::default()
        },
        DriveCfg::default(),
    )
    .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<BuildError>(),
        Some(BuildError::InvalidConfig(_))
    ));
}

#[test]
fn zero_calibration_current_is_rejected() {
    let err = build_calibrator(
        StillSensor,
        SinkDriver,
        NoopTable,
        Geometry::default(),
        DriveCfg { cal_current_ma: 0 },
    )
    .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<BuildError>(),
        Some(BuildError::InvalidConfig(_))
    ));
}
