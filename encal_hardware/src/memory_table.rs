//! Flash-like in-memory correction table.
//!
//! Mirrors the block-storage discipline of the real part: erase sets every
//! cell to the erased bit pattern, and writes only land inside one
//! begin..end bracket, appended sequentially.

use crate::error::HwError;
use encal_traits::CorrectionTable;

/// Bit pattern of an erased 16-bit flash cell.
pub const ERASED: u16 = 0xFFFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteState {
    Sealed,
    Open,
}

/// R-entry store with flash semantics.
#[derive(Debug)]
pub struct MemoryTable {
    cells: Vec<u16>,
    cursor: usize,
    state: WriteState,
}

impl MemoryTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            cells: vec![ERASED; capacity],
            cursor: 0,
            state: WriteState::Sealed,
        }
    }

    /// Boot-time validity scan: any erased cell marks the whole table
    /// invalid, as does an unsealed bracket.
    pub fn is_valid(&self) -> bool {
        self.state == WriteState::Sealed && self.cells.iter().all(|&c| c != ERASED)
    }

    /// Snapshot of the stored entries, erased cells included.
    pub fn entries(&self) -> &[u16] {
        &self.cells
    }
}

impl CorrectionTable for MemoryTable {
    fn erase(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if self.state == WriteState::Open {
            return Err(Box::new(HwError::Transaction(
                "erase inside an open bracket",
            )));
        }
        self.cells.fill(ERASED);
        self.cursor = 0;
        tracing::debug!(capacity = self.cells.len(), "table region erased");
        Ok(())
    }

    fn begin_write(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if self.state == WriteState::Open {
            return Err(Box::new(HwError::Transaction("bracket already open")));
        }
        self.state = WriteState::Open;
        self.cursor = 0;
        Ok(())
    }

    fn write_entries(
        &mut self,
        entries: &[u16],
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if self.state != WriteState::Open {
            return Err(Box::new(HwError::Transaction("write outside a bracket")));
        }
        let end = self.cursor + entries.len();
        if end > self.cells.len() {
            return Err(Box::new(HwError::Overflow {
                written: end,
                capacity: self.cells.len(),
            }));
        }
        self.cells[self.cursor..end].copy_from_slice(entries);
        self.cursor = end;
        Ok(())
    }

    fn end_write(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if self.state != WriteState::Open {
            return Err(Box::new(HwError::Transaction("no bracket to close")));
        }
        self.state = WriteState::Sealed;
        tracing::debug!(written = self.cursor, "table write sealed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_table_reads_as_invalid() {
        let table = MemoryTable::new(8);
        assert!(!table.is_valid());
        assert!(table.entries().iter().all(|&c| c == ERASED));
    }

    #[test]
    fn full_bracket_produces_a_valid_table() {
        let mut table = MemoryTable::new(4);
        table.erase().unwrap();
        table.begin_write().unwrap();
        table.write_entries(&[1, 2]).unwrap();
        table.write_entries(&[3, 4]).unwrap();
        table.end_write().unwrap();
        assert!(table.is_valid());
        assert_eq!(table.entries(), &[1, 2, 3, 4]);
    }

    #[test]
    fn partial_fill_stays_invalid() {
        let mut table = MemoryTable::new(4);
        table.erase().unwrap();
        table.begin_write().unwrap();
        table.write_entries(&[9]).unwrap();
        table.end_write().unwrap();
        assert!(!table.is_valid());
    }

    #[test]
    fn writes_outside_a_bracket_are_rejected() {
        let mut table = MemoryTable::new(4);
        assert!(table.write_entries(&[1]).is_err());
        table.begin_write().unwrap();
        assert!(table.begin_write().is_err());
        assert!(table.erase().is_err());
        table.end_write().unwrap();
        assert!(table.end_write().is_err());
    }

    #[test]
    fn overflowing_the_region_is_rejected() {
        let mut table = MemoryTable::new(2);
        table.begin_write().unwrap();
        assert!(table.write_entries(&[1, 2, 3]).is_err());
    }
}
