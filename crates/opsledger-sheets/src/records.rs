//! Typed rows.
//!
//! [`SheetRecord`] ties a core type to its sheet: the sheet name, the
//! canonical header row, and the conversion in both directions. Reading is
//! forgiving. A row that cannot be parsed is skipped and reported as a
//! warning instead of failing the whole sheet, since one bad hand edit
//! should not take the dashboard down.

use opsledger_core::{
    CashEntry, CashKind, Delivery, Invoice, Item, LegacyKind, Location, Lpo, OvertimeEntry, Slot,
    SlotKind, Transfer, DEFAULT_MULTIPLIER,
};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, warn};

use crate::cell::{
    format_bool, format_date, format_datetime, format_decimal, format_opt, format_time,
    parse_bool, parse_date, parse_datetime, parse_decimal, parse_time,
};
use crate::{Record, RowError, SheetStore, StoreError, Table};

const DECIMAL: &str = "a number";
const DATE: &str = "a date";
const TIME: &str = "a time";

/// A type stored one-per-row in a sheet.
pub trait SheetRecord: Sized {
    /// Sheet (tab) name.
    const SHEET: &'static str;
    /// Canonical header row, in column order.
    const HEADERS: &'static [&'static str];
    /// Columns a sheet must have for any row to load.
    const REQUIRED: &'static [&'static str];

    /// Parse one row.
    fn from_record(record: &Record<'_>) -> Result<Self, RowError>;

    /// Render as a row in [`Self::HEADERS`] order.
    fn to_row(&self) -> Vec<String>;

    /// The identifying cell (ID, barcode, invoice number).
    fn key(&self) -> &str;
}

/// Records read from a sheet, plus one warning per skipped row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Loaded<T> {
    /// Rows that parsed.
    pub records: Vec<T>,
    /// `Row N: reason` for each row that did not.
    pub warnings: Vec<String>,
}

impl<T> Default for Loaded<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

/// Parse every row of a table.
pub fn parse_table<T: SheetRecord>(table: &Table) -> Result<Loaded<T>, StoreError> {
    let mut loaded = Loaded::default();
    if table.is_empty() {
        return Ok(loaded);
    }
    for column in T::REQUIRED {
        if table.column(column).is_none() {
            return Err(StoreError::MissingColumn {
                sheet: T::SHEET.to_string(),
                column: (*column).to_string(),
            });
        }
    }

    for record in table.records() {
        match T::from_record(&record) {
            Ok(value) => loaded.records.push(value),
            Err(e) => {
                let warning = format!("Row {}: {e}", record.number());
                warn!(sheet = T::SHEET, "{warning}");
                loaded.warnings.push(warning);
            }
        }
    }
    Ok(loaded)
}

/// Load every record of type `T`. A missing sheet loads as empty.
pub fn load<T: SheetRecord>(store: &dyn SheetStore) -> Result<Loaded<T>, StoreError> {
    let table = store.read_or_empty(T::SHEET, T::HEADERS)?;
    let loaded = parse_table(&table)?;
    debug!(
        sheet = T::SHEET,
        records = loaded.records.len(),
        warnings = loaded.warnings.len(),
        "loaded sheet"
    );
    Ok(loaded)
}

/// Append records at the end of their sheet.
pub fn append<T: SheetRecord>(store: &dyn SheetStore, records: &[T]) -> Result<(), StoreError> {
    if records.is_empty() {
        return Ok(());
    }
    let rows: Vec<Vec<String>> = records.iter().map(SheetRecord::to_row).collect();
    store.append(T::SHEET, T::HEADERS, &rows)
}

/// Replace the whole sheet with `records` under the canonical headers.
pub fn save_all<T: SheetRecord>(store: &dyn SheetStore, records: &[T]) -> Result<(), StoreError> {
    let mut table = Table::new(T::HEADERS.iter().copied());
    for record in records {
        table.push_row(record.to_row());
    }
    store.write(T::SHEET, &table)
}

fn same_key(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

/// Overwrite the row whose key matches each of `records`, in place.
///
/// Only the first row with a given key is rewritten; later rows repeating
/// that key are left as they are. The key column is the first canonical
/// header. Columns the sheet has
/// beyond the canonical ones, and rows that do not parse, are left alone.
/// Returns how many rows were rewritten.
pub fn update<T: SheetRecord>(store: &dyn SheetStore, records: &[T]) -> Result<usize, StoreError> {
    let mut table = store.read(T::SHEET)?;
    table.ensure_columns(T::HEADERS);
    let key_col = table.column(T::HEADERS[0]).ok_or_else(|| StoreError::MissingColumn {
        sheet: T::SHEET.to_string(),
        column: T::HEADERS[0].to_string(),
    })?;
    let columns: Vec<Option<usize>> = T::HEADERS.iter().map(|h| table.column(h)).collect();

    let mut written = vec![false; records.len()];
    let mut updated = 0;
    for row in &mut table.rows {
        let Some(pos) = row.get(key_col).and_then(|cell| {
            records
                .iter()
                .zip(&written)
                .position(|(r, done)| !done && same_key(r.key(), cell))
        }) else {
            continue;
        };
        written[pos] = true;
        for (value, col) in records[pos].to_row().into_iter().zip(&columns) {
            if let Some(col) = col {
                row[*col] = value;
            }
        }
        updated += 1;
    }

    if updated > 0 {
        store.write(T::SHEET, &table)?;
    }
    debug!(sheet = T::SHEET, updated, "updated rows");
    Ok(updated)
}

/// Remove every row whose key matches `key`. Returns whether any did.
pub fn delete<T: SheetRecord>(store: &dyn SheetStore, key: &str) -> Result<bool, StoreError> {
    let mut table = match store.read(T::SHEET) {
        Ok(table) => table,
        Err(StoreError::SheetNotFound(_)) => return Ok(false),
        Err(e) => return Err(e),
    };
    let Some(key_col) = table.column(T::HEADERS[0]) else {
        return Ok(false);
    };
    let before = table.rows.len();
    table
        .rows
        .retain(|row| !row.get(key_col).is_some_and(|cell| same_key(cell, key)));
    if table.rows.len() == before {
        return Ok(false);
    }
    store.write(T::SHEET, &table)?;
    Ok(true)
}

/// Find a record by key.
pub fn find<'a, T: SheetRecord>(records: &'a [T], key: &str) -> Option<&'a T> {
    records.iter().find(|r| same_key(r.key(), key))
}

/// One past the largest numeric key, or 1 when there is none.
pub fn next_id<T: SheetRecord>(records: &[T]) -> u64 {
    records
        .iter()
        .filter_map(|r| r.key().trim().parse::<u64>().ok())
        .max()
        .map_or(1, |max| max + 1)
}

fn text(record: &Record<'_>, column: &str) -> Option<String> {
    record.get(column).map(str::to_string)
}

fn decimal_or_zero(record: &Record<'_>, column: &str) -> Result<Decimal, RowError> {
    Ok(record
        .parse_opt(column, parse_decimal, DECIMAL)?
        .unwrap_or_default())
}

fn text_cell(value: Option<&String>) -> String {
    value.cloned().unwrap_or_default()
}

impl SheetRecord for Item {
    const SHEET: &'static str = "Items";
    const HEADERS: &'static [&'static str] = &[
        "Barcode",
        "Name",
        "Category",
        "Unit",
        "Opening Quantity",
        "Quantity",
        "Reorder Level",
    ];
    const REQUIRED: &'static [&'static str] = &["Barcode"];

    fn from_record(record: &Record<'_>) -> Result<Self, RowError> {
        let opening = record.parse_opt("Opening Quantity", parse_decimal, DECIMAL)?;
        let quantity = record.parse_opt("Quantity", parse_decimal, DECIMAL)?;
        let barcode = record.require("Barcode")?;
        Ok(Self {
            barcode: barcode.to_string(),
            name: record.get("Name").unwrap_or(barcode).to_string(),
            category: text(record, "Category"),
            unit: text(record, "Unit"),
            // Older sheets only have the running quantity.
            opening_quantity: opening.or(quantity).unwrap_or_default(),
            quantity: quantity.or(opening).unwrap_or_default(),
            reorder_level: record.parse_opt("Reorder Level", parse_decimal, DECIMAL)?,
        })
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            self.barcode.clone(),
            self.name.clone(),
            text_cell(self.category.as_ref()),
            text_cell(self.unit.as_ref()),
            format_decimal(self.opening_quantity),
            format_decimal(self.quantity),
            format_opt(self.reorder_level, format_decimal),
        ]
    }

    fn key(&self) -> &str {
        &self.barcode
    }
}

impl SheetRecord for Transfer {
    const SHEET: &'static str = "Transfers";
    const HEADERS: &'static [&'static str] = &[
        "ID",
        "Date",
        "Barcode",
        "Type",
        "From",
        "To",
        "Quantity",
        "Description",
    ];
    const REQUIRED: &'static [&'static str] = &["Date", "Barcode", "Quantity"];

    fn from_record(record: &Record<'_>) -> Result<Self, RowError> {
        let id = record
            .get("ID")
            .map_or_else(|| format!("row-{}", record.number()), str::to_string);
        let date = record.parse_req("Date", parse_datetime, DATE)?;
        let barcode = record.require("Barcode")?;
        let quantity = record.parse_req("Quantity", parse_decimal, DECIMAL)?;

        let mut transfer = Self::new(id, date, barcode, quantity);
        // Anything other than IN/OUT in the legacy column is ignored.
        transfer.legacy = record
            .get("Type")
            .and_then(|t| t.parse::<LegacyKind>().ok());
        transfer.from = record.get("From").and_then(Location::parse);
        transfer.to = record.get("To").and_then(Location::parse);
        transfer.description = text(record, "Description");
        Ok(transfer)
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            format_datetime(self.date),
            self.barcode.clone(),
            format_opt(self.legacy, |k| k.to_string()),
            format_opt(self.from.as_ref(), ToString::to_string),
            format_opt(self.to.as_ref(), ToString::to_string),
            format_decimal(self.quantity),
            text_cell(self.description.as_ref()),
        ]
    }

    fn key(&self) -> &str {
        &self.id
    }
}

impl SheetRecord for Invoice {
    const SHEET: &'static str = "Invoices";
    const HEADERS: &'static [&'static str] = &[
        "Invoice No",
        "Customer",
        "Date",
        "Due Date",
        "Amount",
        "Paid",
        "Notes",
    ];
    const REQUIRED: &'static [&'static str] = &["Invoice No", "Customer", "Amount"];

    fn from_record(record: &Record<'_>) -> Result<Self, RowError> {
        Ok(Self {
            number: record.require("Invoice No")?.to_string(),
            customer: record.require("Customer")?.to_string(),
            date: record.parse_req("Date", parse_date, DATE)?,
            due_date: record.parse_opt("Due Date", parse_date, DATE)?,
            amount: record.parse_req("Amount", parse_decimal, DECIMAL)?,
            paid: decimal_or_zero(record, "Paid")?,
            notes: text(record, "Notes"),
        })
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            self.number.clone(),
            self.customer.clone(),
            format_date(self.date),
            format_opt(self.due_date, format_date),
            format_decimal(self.amount),
            format_decimal(self.paid),
            text_cell(self.notes.as_ref()),
        ]
    }

    fn key(&self) -> &str {
        &self.number
    }
}

impl SheetRecord for CashEntry {
    const SHEET: &'static str = "PettyCash";
    const HEADERS: &'static [&'static str] = &[
        "ID",
        "Date",
        "Description",
        "Category",
        "Type",
        "Amount",
        "Recorded By",
    ];
    const REQUIRED: &'static [&'static str] = &["ID", "Date", "Amount"];

    fn from_record(record: &Record<'_>) -> Result<Self, RowError> {
        let kind = match record.get("Type") {
            // Untyped rows are expenses, the common case.
            None => CashKind::Out,
            Some(t) => t
                .parse()
                .map_err(|_| RowError::invalid("type", t, "In or Out"))?,
        };
        Ok(Self {
            id: record.require("ID")?.to_string(),
            date: record.parse_req("Date", parse_date, DATE)?,
            description: record.get("Description").unwrap_or_default().to_string(),
            category: text(record, "Category"),
            kind,
            amount: record.parse_req("Amount", parse_decimal, DECIMAL)?.abs(),
            recorded_by: text(record, "Recorded By"),
        })
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            format_date(self.date),
            self.description.clone(),
            text_cell(self.category.as_ref()),
            self.kind.to_string(),
            format_decimal(self.amount),
            text_cell(self.recorded_by.as_ref()),
        ]
    }

    fn key(&self) -> &str {
        &self.id
    }
}

impl SheetRecord for OvertimeEntry {
    const SHEET: &'static str = "Overtime";
    const HEADERS: &'static [&'static str] = &[
        "ID",
        "Employee",
        "Date",
        "Start",
        "End",
        "Hourly Rate",
        "Multiplier",
        "Notes",
    ];
    const REQUIRED: &'static [&'static str] = &["ID", "Employee", "Start", "End"];

    fn from_record(record: &Record<'_>) -> Result<Self, RowError> {
        let entry = Self {
            id: record.require("ID")?.to_string(),
            employee: record.require("Employee")?.to_string(),
            date: record.parse_req("Date", parse_date, DATE)?,
            start: record.parse_req("Start", parse_time, TIME)?,
            end: record.parse_req("End", parse_time, TIME)?,
            hourly_rate: decimal_or_zero(record, "Hourly Rate")?,
            multiplier: record
                .parse_opt("Multiplier", parse_decimal, DECIMAL)?
                .unwrap_or(DEFAULT_MULTIPLIER),
            notes: text(record, "Notes"),
        };
        if entry.checked_pay().is_none() {
            return Err(RowError::invalid(
                "Hourly Rate",
                record.get("Hourly Rate").unwrap_or_default(),
                "rate is too large to compute pay",
            ));
        }
        Ok(entry)
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.employee.clone(),
            format_date(self.date),
            format_time(self.start),
            format_time(self.end),
            format_decimal(self.hourly_rate),
            format_decimal(self.multiplier),
            text_cell(self.notes.as_ref()),
        ]
    }

    fn key(&self) -> &str {
        &self.id
    }
}

impl SheetRecord for Lpo {
    const SHEET: &'static str = "LPOs";
    const HEADERS: &'static [&'static str] = &[
        "LPO No",
        "Customer",
        "Date",
        "Due Date",
        "Description",
        "Ordered Quantity",
        "Cancelled",
    ];
    const REQUIRED: &'static [&'static str] = &["LPO No", "Ordered Quantity"];

    fn from_record(record: &Record<'_>) -> Result<Self, RowError> {
        Ok(Self {
            number: record.require("LPO No")?.to_string(),
            customer: record.get("Customer").unwrap_or_default().to_string(),
            date: record.parse_req("Date", parse_date, DATE)?,
            due_date: record.parse_opt("Due Date", parse_date, DATE)?,
            description: text(record, "Description"),
            ordered: record.parse_req("Ordered Quantity", parse_decimal, DECIMAL)?,
            cancelled: record
                .parse_opt("Cancelled", parse_bool, "yes or no")?
                .unwrap_or(false),
        })
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            self.number.clone(),
            self.customer.clone(),
            format_date(self.date),
            format_opt(self.due_date, format_date),
            text_cell(self.description.as_ref()),
            format_decimal(self.ordered),
            format_bool(self.cancelled),
        ]
    }

    fn key(&self) -> &str {
        &self.number
    }
}

impl SheetRecord for Delivery {
    const SHEET: &'static str = "Deliveries";
    const HEADERS: &'static [&'static str] = &[
        "ID",
        "LPO No",
        "Date",
        "Quantity",
        "Delivery Note",
        "Driver",
    ];
    const REQUIRED: &'static [&'static str] = &["LPO No", "Quantity"];

    fn from_record(record: &Record<'_>) -> Result<Self, RowError> {
        Ok(Self {
            id: record
                .get("ID")
                .map_or_else(|| format!("row-{}", record.number()), str::to_string),
            lpo_number: record.require("LPO No")?.to_string(),
            date: record.parse_req("Date", parse_date, DATE)?,
            quantity: record.parse_req("Quantity", parse_decimal, DECIMAL)?,
            note_number: text(record, "Delivery Note"),
            driver: text(record, "Driver"),
        })
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.lpo_number.clone(),
            format_date(self.date),
            format_decimal(self.quantity),
            text_cell(self.note_number.as_ref()),
            text_cell(self.driver.as_ref()),
        ]
    }

    fn key(&self) -> &str {
        &self.id
    }
}

impl SheetRecord for Slot {
    const SHEET: &'static str = "Schedule";
    const HEADERS: &'static [&'static str] = &[
        "ID",
        "Date",
        "Dock",
        "Start",
        "End",
        "Kind",
        "Vehicle",
        "Reference",
    ];
    const REQUIRED: &'static [&'static str] = &["ID", "Date", "Start", "End"];

    fn from_record(record: &Record<'_>) -> Result<Self, RowError> {
        let kind = match record.get("Kind") {
            None => SlotKind::default(),
            Some(k) => k
                .parse()
                .map_err(|_| RowError::invalid("kind", k, "Loading, Unloading or Other"))?,
        };
        Ok(Self {
            id: record.require("ID")?.to_string(),
            date: record.parse_req("Date", parse_date, DATE)?,
            dock: record.require("Dock")?.to_string(),
            start: record.parse_req("Start", parse_time, TIME)?,
            end: record.parse_req("End", parse_time, TIME)?,
            kind,
            vehicle: text(record, "Vehicle"),
            reference: text(record, "Reference"),
        })
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            format_date(self.date),
            self.dock.clone(),
            format_time(self.start),
            format_time(self.end),
            self.kind.to_string(),
            text_cell(self.vehicle.as_ref()),
            text_cell(self.reference.as_ref()),
        ]
    }

    fn key(&self) -> &str {
        &self.id
    }
}
