#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Encoder calibration core (hardware-agnostic).
//!
//! Converts raw magnetic-angle readings, nonlinear and non-uniformly
//! spaced, into a per-raw-value correction table that linearizes sensor
//! output across one revolution. All hardware interactions go through the
//! `encal_traits` capability interfaces.
//!
//! ## Architecture
//!
//! - **Cyclic math**: modulus-aware average/subtract/mod (`cyclic` module)
//! - **Sampling**: K-reading averaging window (`sampler` module)
//! - **Sweep**: open-loop two-revolution state machine (`machine` module)
//! - **Validation**: merge, direction, continuity, wrap scan (`verify`)
//! - **Build**: interpolation and persistence (`solve` module)
//! - **Run loop**: the two cooperative rates in one loop (`runner`)
//!
//! All arithmetic is integer; raw angles are `u16`, positions `i32`.

// Module declarations
pub mod builder;
pub mod config;
pub mod cyclic;
pub mod error;
pub mod machine;
pub mod mocks;
pub mod runner;
pub mod sampler;
pub mod session;
pub mod solve;
pub mod status;
pub mod util;
pub mod verify;

pub use builder::{BoxedCalibrator, CalibratorBuilder, Missing, Set, build_calibrator};
pub use config::{DriveCfg, Geometry};
pub use error::{AbortReason, BuildError, CalError, DriveError, Report, Result};
pub use machine::Calibrator;
pub use runner::{RunReport, TickPacing, run, tick_budget};
pub use sampler::SampleWindow;
pub use session::{CalState, SweepSession};
pub use solve::SolveReport;
pub use status::TickStatus;
