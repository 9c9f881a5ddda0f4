//! The sheet store trait and the in-memory backend.

use parking_lot::RwLock;
use std::collections::BTreeMap;

use crate::{StoreError, Table};

/// Access to a spreadsheet made of named sheets.
///
/// Implementations are blocking. Every call goes to the backing
/// spreadsheet; nothing is cached between calls.
pub trait SheetStore: Send + Sync {
    /// Short backend label for logs and the health endpoint.
    fn name(&self) -> &str;

    /// Read a whole sheet. A missing sheet is [`StoreError::SheetNotFound`].
    fn read(&self, sheet: &str) -> Result<Table, StoreError>;

    /// Replace a whole sheet, creating it if needed.
    fn write(&self, sheet: &str, table: &Table) -> Result<(), StoreError>;

    /// Append rows to a sheet, creating it with `headers` if needed.
    fn append(&self, sheet: &str, headers: &[&str], rows: &[Vec<String>])
        -> Result<(), StoreError>;

    /// Read a sheet, treating a missing sheet as empty with `headers`.
    fn read_or_empty(&self, sheet: &str, headers: &[&str]) -> Result<Table, StoreError> {
        match self.read(sheet) {
            Ok(table) => Ok(table),
            Err(StoreError::SheetNotFound(_)) => Ok(Table::new(headers.iter().copied())),
            Err(e) => Err(e),
        }
    }
}

impl<S: SheetStore + ?Sized> SheetStore for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn read(&self, sheet: &str) -> Result<Table, StoreError> {
        (**self).read(sheet)
    }

    fn write(&self, sheet: &str, table: &Table) -> Result<(), StoreError> {
        (**self).write(sheet, table)
    }

    fn append(
        &self,
        sheet: &str,
        headers: &[&str],
        rows: &[Vec<String>],
    ) -> Result<(), StoreError> {
        (**self).append(sheet, headers, rows)
    }
}

/// Sheets held in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    sheets: RwLock<BTreeMap<String, Table>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-filled with sheets.
    #[must_use]
    pub fn with_sheets(sheets: impl IntoIterator<Item = (String, Table)>) -> Self {
        Self {
            sheets: RwLock::new(sheets.into_iter().collect()),
        }
    }

    /// Names of all sheets.
    #[must_use]
    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.read().keys().cloned().collect()
    }
}

impl SheetStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn read(&self, sheet: &str) -> Result<Table, StoreError> {
        self.sheets
            .read()
            .get(sheet)
            .cloned()
            .ok_or_else(|| StoreError::SheetNotFound(sheet.to_string()))
    }

    fn write(&self, sheet: &str, table: &Table) -> Result<(), StoreError> {
        self.sheets.write().insert(sheet.to_string(), table.clone());
        Ok(())
    }

    fn append(
        &self,
        sheet: &str,
        headers: &[&str],
        rows: &[Vec<String>],
    ) -> Result<(), StoreError> {
        let mut sheets = self.sheets.write();
        let table = sheets
            .entry(sheet.to_string())
            .or_insert_with(|| Table::new(headers.iter().copied()));
        for row in rows {
            table.push_row(row.clone());
        }
        Ok(())
    }
}
