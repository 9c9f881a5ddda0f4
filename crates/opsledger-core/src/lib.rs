//! Core types for opsledger
//!
//! This crate holds the business logic behind the operations dashboard. It
//! never touches the spreadsheet; callers load rows, hand them in here, and
//! write the results back.
//!
//! - [`Location`] - Where stock moves between (warehouse, customer, supplier, person)
//! - [`Transfer`] - A single stock movement, legacy or current encoding
//! - [`StockLedger`] - Replays transfers into on-hand quantities with reconciliation buffering
//! - [`Invoice`] / [`analyze_debts`] - Outstanding balances and aging
//! - [`CashEntry`] - Petty cash in/out with running balance
//! - [`OvertimeEntry`] - Overtime shifts and pay
//! - [`Lpo`] / [`Delivery`] - Purchase order delivery tracking
//! - [`Slot`] - Loading dock bookings and conflicts
//!
//! # Example
//!
//! ```
//! use opsledger_core::{replay, Item, Location, Transfer};
//! use rust_decimal_macros::dec;
//! use chrono::NaiveDate;
//!
//! let at = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(9, 0, 0).unwrap();
//! let items = vec![Item::new("6001", "Chipsy Salt 40g", dec!(100))];
//! let transfers = vec![
//!     Transfer::new("1", at, "6001", dec!(30))
//!         .with_from(Location::MainWarehouse)
//!         .with_to(Location::Person("Ahmed".into())),
//! ];
//!
//! let report = replay(&items, &transfers);
//! assert_eq!(report.levels[0].on_hand, dec!(70));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod delivery;
pub mod invoice;
pub mod location;
pub mod overtime;
pub mod petty_cash;
pub mod schedule;
pub mod stock;
pub mod transfer;

pub use delivery::{track, Delivery, DeliveryReport, Lpo, LpoProgress, LpoStatus};
pub use invoice::{
    analyze_debts, AgingBucket, AgingBuckets, CustomerDebt, DebtReport, Invoice, InvoiceError,
    InvoiceStatus, DEFAULT_PAYMENT_TERMS_DAYS,
};
pub use location::Location;
pub use overtime::{EmployeeOvertime, OvertimeEntry, OvertimeSummary, DEFAULT_MULTIPLIER};
pub use petty_cash::{CashEntry, CashKind, CashLine, CashSummary};
pub use schedule::{Conflict, ScheduleError, Slot, SlotKind};
pub use stock::{
    low_stock, reconciliation_transfers, replay, InvoiceLine, Item, SkipReason, SkippedTransfer,
    StockLedger, StockLevel, StockReport,
};
pub use transfer::{LegacyKind, Movement, Transfer, RECONCILIATION_MARKER};

// Re-export commonly used external types
pub use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
pub use rust_decimal::Decimal;

/// A calendar month, used to filter monthly summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
    /// Calendar year.
    pub year: i32,
    /// Month number, 1-12.
    pub month: u32,
}

impl Month {
    /// Create a month, returning `None` when `month` is outside 1-12.
    #[must_use]
    pub const fn new(year: i32, month: u32) -> Option<Self> {
        if month >= 1 && month <= 12 {
            Some(Self { year, month })
        } else {
            None
        }
    }

    /// The month a date falls in.
    #[must_use]
    pub fn of(date: NaiveDate) -> Self {
        use chrono::Datelike;
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Check whether a date falls in this month.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        Self::of(date) == *self
    }
}

impl std::fmt::Display for Month {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl std::str::FromStr for Month {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| format!("invalid month '{s}', expected YYYY-MM"))?;
        let year: i32 = year
            .parse()
            .map_err(|_| format!("invalid year in month '{s}'"))?;
        let month: u32 = month
            .parse()
            .map_err(|_| format!("invalid month number in '{s}'"))?;
        Self::new(year, month).ok_or_else(|| format!("month out of range in '{s}'"))
    }
}

/// Compare two names the way the sheets are keyed: trimmed, case-insensitive.
pub(crate) fn same_name(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_parse_and_display() {
        let month: Month = "2024-03".parse().unwrap();
        assert_eq!(month, Month::new(2024, 3).unwrap());
        assert_eq!(month.to_string(), "2024-03");
    }

    #[test]
    fn test_month_rejects_out_of_range() {
        assert!("2024-13".parse::<Month>().is_err());
        assert!("2024".parse::<Month>().is_err());
        assert!(Month::new(2024, 0).is_none());
    }

    #[test]
    fn test_month_contains() {
        let month = Month::new(2024, 2).unwrap();
        assert!(month.contains(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()));
        assert!(!month.contains(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()));
    }

    #[test]
    fn test_same_name() {
        assert!(same_name(" Acme Ltd ", "acme ltd"));
        assert!(!same_name("Acme", "Acme Ltd"));
    }
}
