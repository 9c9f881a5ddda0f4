//! Tabular sheet values.
//!
//! A [`Table`] is what every backend reads and writes: a header row and
//! string cells. Column lookup is by header text, trimmed and
//! case-insensitive, so a sheet edited by hand still maps onto the record
//! types as long as the headers are recognizable.

use serde::{Deserialize, Serialize};

use crate::RowError;

/// Header row plus data rows of one sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Column headers.
    pub headers: Vec<String>,
    /// Data rows, each at most as wide as `headers`.
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Create an empty table with the given headers.
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Build a table from raw values where the first row is the header.
    ///
    /// An empty value list gives an empty table with no headers.
    #[must_use]
    pub fn from_values(mut values: Vec<Vec<String>>) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let headers = values.remove(0);
        let mut table = Self::new(headers);
        for row in values {
            table.push_row(row);
        }
        table
    }

    /// The header row followed by all data rows.
    #[must_use]
    pub fn to_values(&self) -> Vec<Vec<String>> {
        let mut values = Vec::with_capacity(self.rows.len() + 1);
        values.push(self.headers.clone());
        values.extend(self.rows.iter().cloned());
        values
    }

    /// Index of a column by header text.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    }

    /// Append a data row, padding or truncating it to the header width.
    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    /// Add any of `headers` not already present, at the end.
    pub fn ensure_columns(&mut self, headers: &[&str]) {
        for header in headers {
            if self.column(header).is_none() {
                self.headers.push((*header).to_string());
            }
        }
        let width = self.headers.len();
        for row in &mut self.rows {
            row.resize(width, String::new());
        }
    }

    /// Number of data rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if there are no data rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// View of the data row at `index` (0-based, header excluded).
    #[must_use]
    pub fn record(&self, index: usize) -> Option<Record<'_>> {
        self.rows.get(index).map(|row| Record {
            table: self,
            row,
            number: index + 2,
        })
    }

    /// Iterate over non-blank rows.
    pub fn records(&self) -> impl Iterator<Item = Record<'_>> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.iter().any(|cell| !cell.trim().is_empty()))
            .map(move |(i, row)| Record {
                table: self,
                row,
                // +1 for the header, +1 for 1-based numbering
                number: i + 2,
            })
    }
}

/// A view of one data row.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    table: &'a Table,
    row: &'a [String],
    number: usize,
}

impl<'a> Record<'a> {
    /// The 1-based row number in the sheet, counting the header row.
    #[must_use]
    pub const fn number(&self) -> usize {
        self.number
    }

    /// Trimmed cell text, or `None` for a blank or absent cell.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&'a str> {
        let idx = self.table.column(column)?;
        let cell = self.row.get(idx)?.trim();
        (!cell.is_empty()).then_some(cell)
    }

    /// Trimmed cell text, failing if blank.
    pub fn require(&self, column: &str) -> Result<&'a str, RowError> {
        self.get(column)
            .ok_or_else(|| RowError::Missing(column.to_lowercase()))
    }

    /// Parse an optional cell with `parse`.
    pub fn parse_opt<T>(
        &self,
        column: &str,
        parse: impl Fn(&str) -> Option<T>,
        expected: &str,
    ) -> Result<Option<T>, RowError> {
        match self.get(column) {
            None => Ok(None),
            Some(text) => parse(text)
                .map(Some)
                .ok_or_else(|| RowError::invalid(column.to_lowercase(), text, expected)),
        }
    }

    /// Parse a required cell with `parse`.
    pub fn parse_req<T>(
        &self,
        column: &str,
        parse: impl Fn(&str) -> Option<T>,
        expected: &str,
    ) -> Result<T, RowError> {
        self.parse_opt(column, parse, expected)?
            .ok_or_else(|| RowError::Missing(column.to_lowercase()))
    }
}
