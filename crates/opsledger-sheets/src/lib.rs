//! Spreadsheet system of record for opsledger
//!
//! Every piece of business data lives in a spreadsheet: one sheet per kind
//! of record, a header row, one record per row. This crate hides where the
//! spreadsheet actually is behind the [`SheetStore`] trait and maps rows to
//! the typed records of `opsledger-core`.
//!
//! # Backends
//!
//! - [`MemoryStore`] - in-process, for tests and demos
//! - [`CsvStore`] - a directory with one `<sheet>.csv` file per sheet
//! - [`SheetsApiStore`] - a Google Sheets spreadsheet over the values API
//!
//! # Example
//!
//! ```
//! use opsledger_sheets::{records, MemoryStore};
//! use opsledger_core::Item;
//! use rust_decimal_macros::dec;
//!
//! let store = MemoryStore::new();
//! records::append(&store, &[Item::new("6001", "Chipsy Salt 40g", dec!(100))])?;
//!
//! let loaded = records::load::<Item>(&store)?;
//! assert_eq!(loaded.records.len(), 1);
//! assert!(loaded.warnings.is_empty());
//! # Ok::<(), opsledger_sheets::StoreError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cell;
pub mod csv_store;
pub mod error;
pub mod http_store;
pub mod records;
pub mod store;
pub mod table;

pub use csv_store::CsvStore;
pub use error::{RowError, StoreError};
pub use http_store::SheetsApiStore;
pub use records::{Loaded, SheetRecord};
pub use store::{MemoryStore, SheetStore};
pub use table::{Record, Table};
