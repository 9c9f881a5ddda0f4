//! Error types for sheet access.

use std::path::PathBuf;
use thiserror::Error;

/// Errors talking to the spreadsheet.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The named sheet does not exist.
    #[error("sheet not found: {0}")]
    SheetNotFound(String),

    /// IO error on a local sheet file.
    #[error("failed to access {path}: {source}")]
    Io {
        /// The file that failed.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A CSV sheet file could not be read or written.
    #[error("csv error in {path}: {source}")]
    Csv {
        /// The file that failed.
        path: PathBuf,
        /// The underlying CSV error.
        #[source]
        source: csv::Error,
    },

    /// The spreadsheet API answered with an error status.
    #[error("spreadsheet API returned {status} for {sheet}: {message}")]
    Http {
        /// Sheet being accessed.
        sheet: String,
        /// HTTP status code.
        status: u16,
        /// Error message from the API.
        message: String,
    },

    /// The spreadsheet API could not be reached.
    #[error("spreadsheet API request failed for {sheet}: {message}")]
    Transport {
        /// Sheet being accessed.
        sheet: String,
        /// Transport error.
        message: String,
    },

    /// A sheet is missing a column the record type needs.
    #[error("sheet {sheet} has no column {column}")]
    MissingColumn {
        /// Sheet name.
        sheet: String,
        /// Missing column header.
        column: String,
    },

    /// The sheet name cannot be used by this backend.
    #[error("invalid sheet name: {0}")]
    InvalidSheetName(String),
}

/// A row that could not be turned into a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    /// A required cell is empty.
    #[error("missing {0}")]
    Missing(String),

    /// A cell could not be parsed.
    #[error("invalid {column} '{value}': {reason}")]
    Invalid {
        /// Column header.
        column: String,
        /// Raw cell text.
        value: String,
        /// What was expected.
        reason: String,
    },
}

impl RowError {
    /// Build an [`RowError::Invalid`].
    pub fn invalid(
        column: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Invalid {
            column: column.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}
