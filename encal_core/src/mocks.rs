//! Test and helper mocks for encal_core

/// A table sink that honors the write bracket and discards every entry;
/// useful when a run's persistence is irrelevant.
pub struct NoopTable;

impl encal_traits::CorrectionTable for NoopTable {
    fn erase(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(())
    }
    fn begin_write(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(())
    }
    fn write_entries(
        &mut self,
        _entries: &[u16],
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(())
    }
    fn end_write(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(())
    }
}
