//! Debt and invoice analysis.
//!
//! Outstanding balances are grouped per customer and aged by how many days
//! they are past due.

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Payment terms applied when an invoice has no due date.
pub const DEFAULT_PAYMENT_TERMS_DAYS: i64 = 30;

/// Errors from invoice updates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvoiceError {
    /// Payment amount was zero or negative.
    #[error("payment must be positive, got {0}")]
    NonPositivePayment(Decimal),
    /// Payment exceeds what is still owed.
    #[error("payment of {payment} exceeds outstanding balance {outstanding} on invoice {number}")]
    Overpayment {
        /// Invoice number.
        number: String,
        /// Attempted payment.
        payment: Decimal,
        /// Balance before the payment.
        outstanding: Decimal,
    },
}

/// A customer invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    /// Invoice number, unique per sheet.
    pub number: String,
    /// Customer name.
    pub customer: String,
    /// Issue date.
    pub date: NaiveDate,
    /// Due date, if agreed.
    pub due_date: Option<NaiveDate>,
    /// Invoiced total.
    pub amount: Decimal,
    /// Amount received so far.
    pub paid: Decimal,
    /// Free text notes.
    pub notes: Option<String>,
}

/// Payment state of an invoice on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Nothing outstanding.
    Paid,
    /// Partly paid, not past due.
    Partial,
    /// Nothing paid, not past due.
    Unpaid,
    /// Money outstanding after the due date.
    Overdue,
}

/// Aging bucket of an outstanding balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgingBucket {
    /// Not yet due.
    #[serde(rename = "current")]
    Current,
    /// 1 to 30 days past due.
    #[serde(rename = "1-30")]
    Days1To30,
    /// 31 to 60 days past due.
    #[serde(rename = "31-60")]
    Days31To60,
    /// 61 to 90 days past due.
    #[serde(rename = "61-90")]
    Days61To90,
    /// More than 90 days past due.
    #[serde(rename = "90+")]
    Over90,
}

impl AgingBucket {
    /// Bucket for a number of days past due (zero or negative is current).
    #[must_use]
    pub const fn for_days(days_past_due: i64) -> Self {
        match days_past_due {
            i64::MIN..=0 => Self::Current,
            1..=30 => Self::Days1To30,
            31..=60 => Self::Days31To60,
            61..=90 => Self::Days61To90,
            _ => Self::Over90,
        }
    }
}

/// Outstanding amounts split by aging bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgingBuckets {
    /// Not yet due.
    pub current: Decimal,
    /// 1-30 days past due.
    #[serde(rename = "1-30")]
    pub days_1_30: Decimal,
    /// 31-60 days past due.
    #[serde(rename = "31-60")]
    pub days_31_60: Decimal,
    /// 61-90 days past due.
    #[serde(rename = "61-90")]
    pub days_61_90: Decimal,
    /// Over 90 days past due.
    #[serde(rename = "90+")]
    pub over_90: Decimal,
}

impl AgingBuckets {
    /// Add an amount to a bucket.
    pub fn add(&mut self, bucket: AgingBucket, amount: Decimal) {
        let slot = match bucket {
            AgingBucket::Current => &mut self.current,
            AgingBucket::Days1To30 => &mut self.days_1_30,
            AgingBucket::Days31To60 => &mut self.days_31_60,
            AgingBucket::Days61To90 => &mut self.days_61_90,
            AgingBucket::Over90 => &mut self.over_90,
        };
        *slot = slot.saturating_add(amount);
    }

    /// Sum of all buckets.
    #[must_use]
    pub fn total(&self) -> Decimal {
        [
            self.current,
            self.days_1_30,
            self.days_31_60,
            self.days_61_90,
            self.over_90,
        ]
        .into_iter()
        .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    /// Amount past due (everything but `current`).
    #[must_use]
    pub fn overdue(&self) -> Decimal {
        [self.days_1_30, self.days_31_60, self.days_61_90, self.over_90]
            .into_iter()
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    fn merge(&mut self, other: &Self) {
        self.add(AgingBucket::Current, other.current);
        self.add(AgingBucket::Days1To30, other.days_1_30);
        self.add(AgingBucket::Days31To60, other.days_31_60);
        self.add(AgingBucket::Days61To90, other.days_61_90);
        self.add(AgingBucket::Over90, other.over_90);
    }
}

impl Invoice {
    /// Create an unpaid invoice.
    pub fn new(
        number: impl Into<String>,
        customer: impl Into<String>,
        date: NaiveDate,
        amount: Decimal,
    ) -> Self {
        Self {
            number: number.into(),
            customer: customer.into(),
            date,
            due_date: None,
            amount,
            paid: Decimal::ZERO,
            notes: None,
        }
    }

    /// Set the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due: NaiveDate) -> Self {
        self.due_date = Some(due);
        self
    }

    /// Set the amount paid.
    #[must_use]
    pub const fn with_paid(mut self, paid: Decimal) -> Self {
        self.paid = paid;
        self
    }

    /// Amount still owed, never below zero.
    #[must_use]
    pub fn balance(&self) -> Decimal {
        self.amount.saturating_sub(self.paid).max(Decimal::ZERO)
    }

    /// Due date, falling back to the default payment terms.
    ///
    /// An invoice dated too close to the end of the calendar to add the
    /// terms is due on its own date.
    #[must_use]
    pub fn effective_due_date(&self) -> NaiveDate {
        self.due_date.unwrap_or_else(|| {
            self.date
                .checked_add_signed(Duration::days(DEFAULT_PAYMENT_TERMS_DAYS))
                .unwrap_or(self.date)
        })
    }

    /// Days past due on `as_of` (negative while not yet due).
    #[must_use]
    pub fn days_past_due(&self, as_of: NaiveDate) -> i64 {
        (as_of - self.effective_due_date()).num_days()
    }

    /// Payment state on `as_of`.
    #[must_use]
    pub fn status(&self, as_of: NaiveDate) -> InvoiceStatus {
        if self.balance().is_zero() {
            InvoiceStatus::Paid
        } else if self.days_past_due(as_of) > 0 {
            InvoiceStatus::Overdue
        } else if self.paid > Decimal::ZERO {
            InvoiceStatus::Partial
        } else {
            InvoiceStatus::Unpaid
        }
    }

    /// Record a payment against this invoice.
    pub fn record_payment(&mut self, amount: Decimal) -> Result<(), InvoiceError> {
        if amount <= Decimal::ZERO {
            return Err(InvoiceError::NonPositivePayment(amount));
        }
        let outstanding = self.balance();
        if amount > outstanding {
            return Err(InvoiceError::Overpayment {
                number: self.number.clone(),
                payment: amount,
                outstanding,
            });
        }
        self.paid += amount;
        Ok(())
    }
}

/// Debt owed by one customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDebt {
    /// Customer name as first seen.
    pub customer: String,
    /// Number of invoices with money outstanding.
    pub open_invoices: usize,
    /// Total invoiced across all invoices.
    pub invoiced: Decimal,
    /// Total paid across all invoices.
    pub paid: Decimal,
    /// Total outstanding.
    pub outstanding: Decimal,
    /// Earliest due date among open invoices.
    pub oldest_due: Option<NaiveDate>,
    /// Outstanding split by age.
    pub aging: AgingBuckets,
}

/// Aged debt across all customers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebtReport {
    /// Date the aging was computed for.
    pub as_of: Option<NaiveDate>,
    /// Customers with money outstanding, largest first.
    pub customers: Vec<CustomerDebt>,
    /// Aging totals across customers.
    pub totals: AgingBuckets,
    /// Total invoiced.
    pub total_invoiced: Decimal,
    /// Total paid.
    pub total_paid: Decimal,
    /// Total outstanding.
    pub total_outstanding: Decimal,
}

/// Group outstanding invoices by customer and age them as of a date.
///
/// Customer names are matched trimmed and case-insensitively. Customers with
/// nothing outstanding are left out of `customers` but still count in the
/// invoiced and paid totals.
#[must_use]
pub fn analyze_debts(invoices: &[Invoice], as_of: NaiveDate) -> DebtReport {
    let mut by_customer: BTreeMap<String, CustomerDebt> = BTreeMap::new();

    for invoice in invoices {
        let key = invoice.customer.trim().to_lowercase();
        let debt = by_customer.entry(key).or_insert_with(|| CustomerDebt {
            customer: invoice.customer.trim().to_string(),
            open_invoices: 0,
            invoiced: Decimal::ZERO,
            paid: Decimal::ZERO,
            outstanding: Decimal::ZERO,
            oldest_due: None,
            aging: AgingBuckets::default(),
        });

        debt.invoiced = debt.invoiced.saturating_add(invoice.amount);
        debt.paid = debt.paid.saturating_add(invoice.paid);

        let balance = invoice.balance();
        if balance.is_zero() {
            continue;
        }
        let due = invoice.effective_due_date();
        debt.open_invoices += 1;
        debt.outstanding = debt.outstanding.saturating_add(balance);
        debt.oldest_due = Some(debt.oldest_due.map_or(due, |d| d.min(due)));
        debt.aging
            .add(AgingBucket::for_days(invoice.days_past_due(as_of)), balance);
    }

    let mut report = DebtReport {
        as_of: Some(as_of),
        ..DebtReport::default()
    };
    for debt in by_customer.into_values() {
        report.total_invoiced = report.total_invoiced.saturating_add(debt.invoiced);
        report.total_paid = report.total_paid.saturating_add(debt.paid);
        report.total_outstanding = report.total_outstanding.saturating_add(debt.outstanding);
        report.totals.merge(&debt.aging);
        if !debt.outstanding.is_zero() {
            report.customers.push(debt);
        }
    }

    report.customers.sort_by(|a, b| {
        b.outstanding
            .cmp(&a.outstanding)
            .then_with(|| a.customer.cmp(&b.customer))
    });
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_balance_never_negative() {
        let inv = Invoice::new("1", "Metro", date(2024, 1, 1), dec!(100)).with_paid(dec!(120));
        assert_eq!(inv.balance(), dec!(0));
        assert_eq!(inv.status(date(2024, 6, 1)), InvoiceStatus::Paid);
    }

    #[test]
    fn test_effective_due_date_defaults_to_terms() {
        let inv = Invoice::new("1", "Metro", date(2024, 1, 1), dec!(100));
        assert_eq!(inv.effective_due_date(), date(2024, 1, 31));
        let inv = inv.with_due_date(date(2024, 1, 10));
        assert_eq!(inv.effective_due_date(), date(2024, 1, 10));
    }

    #[test]
    fn test_due_date_at_end_of_calendar() {
        let last = NaiveDate::MAX;
        let inv = Invoice::new("1", "Metro", last, dec!(100));
        assert_eq!(inv.effective_due_date(), last);
        assert!(inv.days_past_due(date(2024, 1, 1)) < 0);

        let report = analyze_debts(&[inv], date(2024, 1, 1));
        assert_eq!(report.total_outstanding, dec!(100));
        assert_eq!(report.totals.current, dec!(100));
    }

    #[test]
    fn test_totals_saturate_instead_of_overflowing() {
        let invoices = vec![
            Invoice::new("1", "Metro", date(2024, 1, 1), Decimal::MAX),
            Invoice::new("2", "Metro", date(2024, 1, 1), Decimal::MAX),
        ];
        let report = analyze_debts(&invoices, date(2024, 1, 15));
        assert_eq!(report.total_outstanding, Decimal::MAX);
        assert_eq!(report.customers[0].open_invoices, 2);
    }

    #[test]
    fn test_status() {
        let inv = Invoice::new("1", "Metro", date(2024, 1, 1), dec!(100))
            .with_due_date(date(2024, 1, 31));
        assert_eq!(inv.status(date(2024, 1, 31)), InvoiceStatus::Unpaid);
        assert_eq!(inv.status(date(2024, 2, 1)), InvoiceStatus::Overdue);
        let partial = inv.with_paid(dec!(40));
        assert_eq!(partial.status(date(2024, 1, 15)), InvoiceStatus::Partial);
    }

    #[test]
    fn test_aging_bucket_boundaries() {
        assert_eq!(AgingBucket::for_days(-5), AgingBucket::Current);
        assert_eq!(AgingBucket::for_days(0), AgingBucket::Current);
        assert_eq!(AgingBucket::for_days(1), AgingBucket::Days1To30);
        assert_eq!(AgingBucket::for_days(30), AgingBucket::Days1To30);
        assert_eq!(AgingBucket::for_days(31), AgingBucket::Days31To60);
        assert_eq!(AgingBucket::for_days(90), AgingBucket::Days61To90);
        assert_eq!(AgingBucket::for_days(91), AgingBucket::Over90);
    }

    #[test]
    fn test_record_payment() {
        let mut inv = Invoice::new("INV-1", "Metro", date(2024, 1, 1), dec!(100));
        inv.record_payment(dec!(60)).unwrap();
        assert_eq!(inv.balance(), dec!(40));

        assert_eq!(
            inv.record_payment(dec!(0)),
            Err(InvoiceError::NonPositivePayment(dec!(0)))
        );
        assert!(matches!(
            inv.record_payment(dec!(50)),
            Err(InvoiceError::Overpayment { outstanding, .. }) if outstanding == dec!(40)
        ));
        inv.record_payment(dec!(40)).unwrap();
        assert_eq!(inv.balance(), dec!(0));
    }

    #[test]
    fn test_analyze_debts_groups_and_ages() {
        let as_of = date(2024, 4, 30);
        let invoices = vec![
            Invoice::new("1", "Metro", date(2024, 1, 1), dec!(500))
                .with_due_date(date(2024, 1, 15)),
            Invoice::new("2", " metro ", date(2024, 4, 1), dec!(300))
                .with_due_date(date(2024, 4, 20))
                .with_paid(dec!(100)),
            Invoice::new("3", "Kiosk 7", date(2024, 4, 25), dec!(80)),
            Invoice::new("4", "Spinneys", date(2024, 2, 1), dec!(900)).with_paid(dec!(900)),
        ];

        let report = analyze_debts(&invoices, as_of);
        assert_eq!(report.customers.len(), 2);

        let metro = &report.customers[0];
        assert_eq!(metro.customer, "Metro");
        assert_eq!(metro.open_invoices, 2);
        assert_eq!(metro.outstanding, dec!(700));
        assert_eq!(metro.oldest_due, Some(date(2024, 1, 15)));
        // 106 days past due
        assert_eq!(metro.aging.over_90, dec!(500));
        // 10 days past due
        assert_eq!(metro.aging.days_1_30, dec!(200));

        let kiosk = &report.customers[1];
        assert_eq!(kiosk.aging.current, dec!(80));

        assert_eq!(report.total_invoiced, dec!(1780));
        assert_eq!(report.total_paid, dec!(1000));
        assert_eq!(report.total_outstanding, dec!(780));
        assert_eq!(report.totals.total(), dec!(780));
        assert_eq!(report.totals.overdue(), dec!(700));
    }

    #[test]
    fn test_analyze_debts_empty() {
        let report = analyze_debts(&[], date(2024, 1, 1));
        assert!(report.customers.is_empty());
        assert_eq!(report.total_outstanding, dec!(0));
    }
}
