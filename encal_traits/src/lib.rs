pub mod clock;

pub use clock::{Clock, MonotonicClock};

/// Magnetic angle sensor polled during the calibration sweep.
///
/// Readings are raw counts in `[0, resolution)`; parity checking and retry
/// belong to the implementation, not the caller.
pub trait AngleSensor {
    fn read(&mut self) -> Result<u16, Box<dyn std::error::Error + Send + Sync>>;
}

/// Open-loop phase-current commutation.
pub trait PhaseDriver {
    /// Command the phase currents toward `position` (signed pulse units)
    /// with the given magnitude in milliamps. Zero magnitude releases the
    /// motor.
    fn set_current_vector(
        &mut self,
        position: i32,
        current_ma: u16,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Block-oriented nonvolatile store for the correction table.
///
/// Exactly one erase + begin..end bracket per build attempt. Entries are
/// appended sequentially between `begin_write` and `end_write`; nothing may
/// read the region while a bracket is open.
pub trait CorrectionTable {
    fn erase(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    fn begin_write(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    fn write_entries(
        &mut self,
        entries: &[u16],
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    fn end_write(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

impl<S: AngleSensor + ?Sized> AngleSensor for Box<S> {
    fn read(&mut self) -> Result<u16, Box<dyn std::error::Error + Send + Sync>> {
        (**self).read()
    }
}

impl<D: PhaseDriver + ?Sized> PhaseDriver for Box<D> {
    fn set_current_vector(
        &mut self,
        position: i32,
        current_ma: u16,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).set_current_vector(position, current_ma)
    }
}

impl<T: CorrectionTable + ?Sized> CorrectionTable for Box<T> {
    fn erase(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).erase()
    }
    fn begin_write(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).begin_write()
    }
    fn write_entries(
        &mut self,
        entries: &[u16],
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).write_entries(entries)
    }
    fn end_write(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).end_write()
    }
}
