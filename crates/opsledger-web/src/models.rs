//! Request and response payloads.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use opsledger_core::{
    CashKind, CashLine, InvoiceLine, LegacyKind, OvertimeEntry, SlotKind, StockReport, Transfer,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Request payload for adding an inventory item.
#[derive(Deserialize, Debug)]
pub struct NewItem {
    /// Item barcode, unique across the sheet.
    pub barcode: String,
    /// Display name.
    pub name: String,
    /// Optional category.
    pub category: Option<String>,
    /// Optional unit of measure.
    pub unit: Option<String>,
    /// Starting quantity for replay.
    #[serde(default)]
    pub opening_quantity: Decimal,
    /// Optional reorder threshold.
    pub reorder_level: Option<Decimal>,
}

/// Request payload for recording a transfer.
#[derive(Deserialize, Debug)]
pub struct NewTransfer {
    /// When the transfer happened. Defaults to now.
    pub date: Option<NaiveDateTime>,
    /// Item barcode.
    pub barcode: String,
    /// Legacy `IN`/`OUT` tag.
    #[serde(rename = "type")]
    pub legacy: Option<LegacyKind>,
    /// Source location text.
    pub from: Option<String>,
    /// Destination location text.
    pub to: Option<String>,
    /// Quantity moved.
    pub quantity: Decimal,
    /// Free-text description.
    pub description: Option<String>,
}

/// Request payload for a bulk invoice reconciliation.
#[derive(Deserialize, Debug)]
pub struct ReconcileRequest {
    /// Invoice number written into the transfer descriptions.
    pub invoice_number: String,
    /// Customer the goods went to.
    pub customer: String,
    /// Timestamp of the generated transfers. Defaults to now.
    pub date: Option<NaiveDateTime>,
    /// Invoiced quantities per barcode.
    pub lines: Vec<InvoiceLine>,
}

/// Request payload for adding an invoice.
#[derive(Deserialize, Debug)]
pub struct NewInvoice {
    /// Invoice number, unique across the sheet.
    pub number: String,
    /// Customer name.
    pub customer: String,
    /// Invoice date.
    pub date: NaiveDate,
    /// Explicit due date.
    pub due_date: Option<NaiveDate>,
    /// Invoiced amount.
    pub amount: Decimal,
    /// Amount already paid.
    #[serde(default)]
    pub paid: Decimal,
    /// Free-text notes.
    pub notes: Option<String>,
}

/// Request payload for recording a payment against an invoice.
#[derive(Deserialize, Debug)]
pub struct PaymentRequest {
    /// Amount received.
    pub amount: Decimal,
}

/// Request payload for a petty cash entry.
#[derive(Deserialize, Debug)]
pub struct NewCashEntry {
    /// Entry date.
    pub date: NaiveDate,
    /// What the money was for.
    pub description: String,
    /// Expense category.
    pub category: Option<String>,
    /// `in` for a top-up, `out` for an expense.
    pub kind: CashKind,
    /// Positive amount.
    pub amount: Decimal,
    /// Who recorded the entry.
    pub recorded_by: Option<String>,
}

/// Request payload for an overtime shift.
#[derive(Deserialize, Debug)]
pub struct NewOvertime {
    /// Employee name.
    pub employee: String,
    /// Shift date.
    pub date: NaiveDate,
    /// Shift start.
    pub start: NaiveTime,
    /// Shift end. Earlier than `start` means the shift ran past midnight.
    pub end: NaiveTime,
    /// Base hourly rate.
    pub hourly_rate: Decimal,
    /// Overtime multiplier, 1.5 when absent.
    pub multiplier: Option<Decimal>,
    /// Free-text notes.
    pub notes: Option<String>,
}

/// Request payload for adding an LPO.
#[derive(Deserialize, Debug)]
pub struct NewLpo {
    /// LPO number, unique across the sheet.
    pub number: String,
    /// Customer who issued the order.
    pub customer: String,
    /// Order date.
    pub date: NaiveDate,
    /// Delivery deadline.
    pub due_date: Option<NaiveDate>,
    /// What was ordered.
    pub description: Option<String>,
    /// Ordered quantity.
    pub ordered: Decimal,
}

/// Request payload for recording a delivery against an LPO.
#[derive(Deserialize, Debug)]
pub struct NewDelivery {
    /// The LPO delivered against.
    pub lpo_number: String,
    /// Delivery date.
    pub date: NaiveDate,
    /// Delivered quantity.
    pub quantity: Decimal,
    /// Delivery note number.
    pub note_number: Option<String>,
    /// Driver name.
    pub driver: Option<String>,
}

/// Request payload for booking a dock slot.
#[derive(Deserialize, Debug)]
pub struct NewSlot {
    /// Booking date.
    pub date: NaiveDate,
    /// Dock name.
    pub dock: String,
    /// Start time.
    pub start: NaiveTime,
    /// End time, after `start`.
    pub end: NaiveTime,
    /// What the dock is booked for.
    #[serde(default)]
    pub kind: SlotKind,
    /// Vehicle plate.
    pub vehicle: Option<String>,
    /// LPO, invoice or delivery note reference.
    pub reference: Option<String>,
}

/// `?as_of=YYYY-MM-DD`, defaulting to today.
#[derive(Deserialize, Debug, Default)]
pub struct AsOfQuery {
    /// Report date.
    pub as_of: Option<NaiveDate>,
}

/// `?month=YYYY-MM`.
#[derive(Deserialize, Debug, Default)]
pub struct MonthQuery {
    /// Month filter.
    pub month: Option<String>,
}

/// `?date=YYYY-MM-DD`.
#[derive(Deserialize, Debug, Default)]
pub struct DateQuery {
    /// Day filter.
    pub date: Option<NaiveDate>,
}

/// `?opening=` for the petty cash ledger.
#[derive(Deserialize, Debug, Default)]
pub struct OpeningQuery {
    /// Balance before the first entry.
    pub opening: Option<Decimal>,
}

/// Any report plus the warnings from loading its sheets.
#[derive(Serialize, Debug)]
pub struct WithWarnings<T> {
    /// The report.
    #[serde(flatten)]
    pub report: T,
    /// `Row N: ...` messages for rows that were skipped.
    pub warnings: Vec<String>,
}

/// Result of writing replayed quantities back to the item sheet.
#[derive(Serialize, Debug)]
pub struct RecalculateResponse {
    /// Number of item rows rewritten.
    pub updated: usize,
    /// The replay the quantities came from.
    pub report: StockReport,
    /// Load warnings.
    pub warnings: Vec<String>,
}

/// Transfers created by a reconciliation.
#[derive(Serialize, Debug)]
pub struct ReconcileResponse {
    /// The appended transfers.
    pub transfers: Vec<Transfer>,
}

/// The petty cash book with running balances.
#[derive(Serialize, Debug)]
pub struct CashLedger {
    /// Balance before the first entry.
    pub opening: Decimal,
    /// Entries in date order with the balance after each.
    pub lines: Vec<CashLine>,
    /// Balance after the last entry.
    pub balance: Decimal,
    /// Load warnings.
    pub warnings: Vec<String>,
}

/// An overtime shift with its computed hours and pay.
#[derive(Serialize, Debug)]
pub struct OvertimeLine {
    /// The recorded shift.
    #[serde(flatten)]
    pub entry: OvertimeEntry,
    /// Shift length in hours.
    pub hours: Decimal,
    /// Overtime pay for the shift.
    pub pay: Decimal,
}

impl From<OvertimeEntry> for OvertimeLine {
    fn from(entry: OvertimeEntry) -> Self {
        Self {
            hours: entry.hours(),
            pay: entry.pay(),
            entry,
        }
    }
}

/// Headline numbers for the dashboard landing page.
#[derive(Serialize, Debug, PartialEq, Eq)]
pub struct Dashboard {
    /// Report date.
    pub as_of: NaiveDate,
    /// Number of inventory items.
    pub items: usize,
    /// Items at or below their reorder level.
    pub low_stock: usize,
    /// Items with negative replayed stock.
    pub negative_stock: usize,
    /// Total unpaid invoice balance.
    pub outstanding_debt: Decimal,
    /// Unpaid balance that is past due.
    pub overdue_debt: Decimal,
    /// Petty cash in hand.
    pub petty_cash_balance: Decimal,
    /// LPOs not yet fully delivered.
    pub open_lpos: usize,
    /// Dock bookings today.
    pub slots_today: usize,
    /// Overlapping dock bookings.
    pub schedule_conflicts: usize,
    /// Rows skipped across all sheets.
    pub warnings: usize,
}
