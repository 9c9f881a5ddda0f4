//! Choosing and building the sheet store.

use std::fmt;
use std::path::PathBuf;

use clap::ValueEnum;
use opsledger_sheets::{
    http_store::DEFAULT_API_BASE, CsvStore, MemoryStore, SheetStore, SheetsApiStore,
};
use thiserror::Error;

/// Which backend holds the spreadsheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum StoreKind {
    /// In-process, lost on exit.
    Memory,
    /// A directory of CSV files.
    #[default]
    Csv,
    /// A Google Sheets spreadsheet.
    Sheets,
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::Csv => write!(f, "csv"),
            Self::Sheets => write!(f, "sheets"),
        }
    }
}

/// Invalid store settings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A setting the chosen backend needs was not given.
    #[error("--{flag} is required with --store {kind}")]
    Missing {
        /// Flag name without dashes.
        flag: &'static str,
        /// The selected backend.
        kind: StoreKind,
    },
}

/// Store settings collected from the command line and environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Backend to use.
    pub kind: StoreKind,
    /// Directory for the CSV backend.
    pub data_dir: PathBuf,
    /// Spreadsheet id for the Sheets backend.
    pub spreadsheet_id: Option<String>,
    /// Sheets API base URL.
    pub api_base: String,
    /// OAuth bearer token for the Sheets backend.
    pub token: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            kind: StoreKind::default(),
            data_dir: PathBuf::from("data"),
            spreadsheet_id: None,
            api_base: DEFAULT_API_BASE.to_string(),
            token: None,
        }
    }
}

fn non_empty(value: Option<&String>) -> Option<&String> {
    value.filter(|v| !v.trim().is_empty())
}

impl StoreConfig {
    /// Check the settings and build the store.
    pub fn build(&self) -> Result<Box<dyn SheetStore>, ConfigError> {
        match self.kind {
            StoreKind::Memory => Ok(Box::new(MemoryStore::new())),
            StoreKind::Csv => Ok(Box::new(CsvStore::new(&self.data_dir))),
            StoreKind::Sheets => {
                let missing = |flag| ConfigError::Missing {
                    flag,
                    kind: self.kind,
                };
                let id = non_empty(self.spreadsheet_id.as_ref())
                    .ok_or_else(|| missing("spreadsheet-id"))?;
                let token = non_empty(self.token.as_ref()).ok_or_else(|| missing("token"))?;
                Ok(Box::new(SheetsApiStore::new(
                    self.api_base.clone(),
                    id.clone(),
                    Some(token.clone()),
                )))
            }
        }
    }

    /// Where the data lives, for the startup log line.
    #[must_use]
    pub fn describe(&self) -> String {
        match self.kind {
            StoreKind::Memory => "in-memory spreadsheet".to_string(),
            StoreKind::Csv => format!("CSV sheets in {}", self.data_dir.display()),
            StoreKind::Sheets => format!(
                "spreadsheet {} at {}",
                self.spreadsheet_id.as_deref().unwrap_or("?"),
                self.api_base
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_csv() {
        let config = StoreConfig::default();
        assert_eq!(config.build().unwrap().name(), "csv");
        assert_eq!(config.describe(), "CSV sheets in data");
    }

    #[test]
    fn test_memory_store() {
        let config = StoreConfig {
            kind: StoreKind::Memory,
            ..StoreConfig::default()
        };
        assert_eq!(config.build().unwrap().name(), "memory");
    }

    #[test]
    fn test_sheets_requires_id_and_token() {
        let mut config = StoreConfig {
            kind: StoreKind::Sheets,
            ..StoreConfig::default()
        };
        assert_eq!(
            config.build().err(),
            Some(ConfigError::Missing {
                flag: "spreadsheet-id",
                kind: StoreKind::Sheets
            })
        );

        config.spreadsheet_id = Some("abc".into());
        config.token = Some("  ".into());
        assert_eq!(
            config.build().err().map(|e| e.to_string()),
            Some("--token is required with --store sheets".to_string())
        );

        config.token = Some("secret".into());
        assert_eq!(config.build().unwrap().name(), "sheets");
    }
}
