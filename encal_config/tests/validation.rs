use encal_config::load_toml;
use rstest::rstest;

#[test]
fn empty_document_is_a_complete_default_config() {
    let cfg = load_toml("").expect("parse TOML");
    cfg.validate().expect("defaults must validate");
    assert_eq!(cfg.geometry.resolution(), 16384);
    assert_eq!(cfg.geometry.pulses(), 51200);
    assert_eq!(cfg.drive.cal_current_ma, 800);
}

#[test]
fn toy_geometry_round_trips() {
    let toml = r#"
[geometry]
resolution_bits = 4
steps = 4
microsteps = 4
read_count = 2

[sim]
noise = false
distortion_amplitude = 0
backlash_pulses = 0
"#;
    let cfg = load_toml(toml).expect("parse TOML");
    cfg.validate().expect("toy geometry should pass");
    assert_eq!(cfg.geometry.resolution(), 16);
    assert_eq!(cfg.geometry.pulses(), 16);
}

#[rstest]
#[case("[geometry]\nresolution_bits = 16", "resolution_bits")]
#[case("[geometry]\nsteps = 3", "steps")]
#[case("[geometry]\nsteps = 199", "steps")]
#[case("[geometry]\nmicrosteps = 3", "microsteps")]
#[case("[geometry]\nread_count = 0", "read_count")]
#[case("[drive]\ncal_current_ma = 0", "cal_current_ma")]
#[case("[sim]\ndistortion_amplitude = -1", "distortion_amplitude")]
#[case("[sim]\nbacklash_pulses = 6000", "backlash_pulses")]
#[case("[logging]\nrotation = \"weekly\"", "rotation")]
fn invalid_fields_are_rejected_with_their_name(#[case] toml: &str, #[case] field: &str) {
    let cfg = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should reject");
    assert!(
        format!("{err}").contains(field),
        "error {err} should mention {field}"
    );
}

#[test]
fn too_coarse_sensor_for_the_step_count_is_rejected() {
    let toml = r#"
[geometry]
resolution_bits = 8
steps = 200
microsteps = 2
read_count = 1
"#;
    let cfg = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should reject");
    assert!(format!("{err}").contains("twice the step count"));
}

#[test]
fn unknown_rotation_values_are_rejected_but_known_ones_pass() {
    for rotation in ["never", "daily", "hourly"] {
        let toml = format!("[logging]\nrotation = \"{rotation}\"");
        let cfg = load_toml(&toml).expect("parse TOML");
        cfg.validate().expect("known rotation should pass");
    }
}
