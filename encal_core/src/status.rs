//! Tick status reported by the sweep state machine.

/// Outcome of one tick of the calibration sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickStatus {
    /// Run-enable is clear; nothing was commanded.
    Idle,
    /// Sweep in progress; tick again.
    Sweeping,
    /// Parked in the terminal state with zero current; the solve pass may
    /// run.
    Parked,
}
