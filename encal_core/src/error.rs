use thiserror::Error;

/// Data-validation failures of a calibration run.
///
/// All variants are terminal: the run ends, the stored table is left or
/// reset to invalid, and re-triggering a full run is the only recovery.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CalError {
    #[error("ambiguous or contradictory sweep direction")]
    AvgDir { index: Option<u16> },
    #[error("sample spacing out of tolerance at interval {index}")]
    AvgContinuity { index: u16 },
    #[error("found {crossings} wrap-point candidates, expected exactly 1")]
    PhaseStep { crossings: u32 },
    #[error("table entry count {written} does not match the sensor resolution")]
    Quantity { written: u32 },
}

/// Faults raised by the collaborating hardware or by the run loop itself.
#[derive(Debug, Error, Clone)]
pub enum DriveError {
    #[error("hardware error: {0}")]
    Hardware(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("run aborted: {0}")]
    Abort(AbortReason),
    #[error("invalid state: {0}")]
    State(&'static str),
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    #[error("cancelled")]
    Cancelled,
    #[error("tick budget exhausted")]
    TickBudget,
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing angle sensor")]
    MissingSensor,
    #[error("missing phase driver")]
    MissingDriver,
    #[error("missing correction table")]
    MissingTable,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;

/// Map a boxed sensor/driver error to a typed `DriveError`.
pub(crate) fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> DriveError {
    #[cfg(feature = "hardware-errors")]
    if let Some(hw) = e.downcast_ref::<encal_hardware::HwError>() {
        return match hw {
            encal_hardware::HwError::Transaction(_) | encal_hardware::HwError::Overflow { .. } => {
                DriveError::Storage(hw.to_string())
            }
            other => DriveError::Hardware(other.to_string()),
        };
    }
    DriveError::Hardware(e.to_string())
}

/// Map a boxed table error to a typed `DriveError`.
pub(crate) fn map_store_error(e: &(dyn std::error::Error + 'static)) -> DriveError {
    DriveError::Storage(e.to_string())
}
