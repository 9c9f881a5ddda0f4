//! A spreadsheet kept as a directory of CSV files.
//!
//! Each sheet is `<dir>/<sheet>.csv` with the header on the first line.
//! Writes go to a temporary file in the same directory which is then
//! renamed over the sheet, so a reader never sees a half-written file.

use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{SheetStore, StoreError, Table};

/// Sheets stored as CSV files in one directory.
#[derive(Debug, Clone)]
pub struct CsvStore {
    dir: PathBuf,
}

impl CsvStore {
    /// Use `dir` as the spreadsheet. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The backing directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, sheet: &str) -> Result<PathBuf, StoreError> {
        let name = sheet.trim();
        if name.is_empty() || name.starts_with('.') || name.contains(['/', '\\', '\0']) {
            return Err(StoreError::InvalidSheetName(sheet.to_string()));
        }
        Ok(self.dir.join(format!("{name}.csv")))
    }

    fn read_path(path: &Path) -> Result<Table, StoreError> {
        let csv_err = |source| StoreError::Csv {
            path: path.to_path_buf(),
            source,
        };
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)
            .map_err(csv_err)?;

        let mut values = Vec::new();
        for result in reader.records() {
            let record = result.map_err(csv_err)?;
            values.push(record.iter().map(str::to_string).collect());
        }
        Ok(Table::from_values(values))
    }

    fn write_path(&self, path: &Path, table: &Table) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let tmp = path.with_extension("csv.tmp");
        let result = Self::write_tmp(&tmp, table).and_then(|()| {
            fs::rename(&tmp, path).map_err(|source| StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        });
        if result.is_err() {
            // The sheet itself is untouched; only the partial copy goes.
            let _ = fs::remove_file(&tmp);
        }
        result
    }

    fn write_tmp(tmp: &Path, table: &Table) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: tmp.to_path_buf(),
            source,
        };
        let csv_err = |source| StoreError::Csv {
            path: tmp.to_path_buf(),
            source,
        };
        let file = File::create(tmp).map_err(io_err)?;
        let mut writer = csv::Writer::from_writer(file);
        writer.write_record(&table.headers).map_err(csv_err)?;
        for row in &table.rows {
            writer.write_record(row).map_err(csv_err)?;
        }
        writer.flush().map_err(io_err)
    }
}

impl SheetStore for CsvStore {
    fn name(&self) -> &str {
        "csv"
    }

    fn read(&self, sheet: &str) -> Result<Table, StoreError> {
        let path = self.path(sheet)?;
        match fs::metadata(&path) {
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::SheetNotFound(sheet.to_string()));
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        }
        let table = Self::read_path(&path)?;
        debug!(sheet, rows = table.len(), "read csv sheet");
        Ok(table)
    }

    fn write(&self, sheet: &str, table: &Table) -> Result<(), StoreError> {
        let path = self.path(sheet)?;
        self.write_path(&path, table)?;
        debug!(sheet, rows = table.len(), "wrote csv sheet");
        Ok(())
    }

    fn append(
        &self,
        sheet: &str,
        headers: &[&str],
        rows: &[Vec<String>],
    ) -> Result<(), StoreError> {
        let mut table = self.read_or_empty(sheet, headers)?;
        if table.headers.is_empty() {
            table = Table::new(headers.iter().copied());
        }
        for row in rows {
            table.push_row(row.clone());
        }
        self.write(sheet, &table)
    }
}
