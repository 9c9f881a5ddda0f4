//! Payroll overtime.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::Month;

/// Pay multiplier used when the sheet leaves it empty.
pub const DEFAULT_MULTIPLIER: Decimal = Decimal::from_parts(15, 0, 0, false, 1);

const MINUTES_PER_DAY: i64 = 24 * 60;

/// One overtime shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimeEntry {
    /// Row identifier.
    pub id: String,
    /// Employee name.
    pub employee: String,
    /// Day the shift started.
    pub date: NaiveDate,
    /// Clock-in time.
    pub start: NaiveTime,
    /// Clock-out time. Earlier than `start` means the shift ran past midnight.
    pub end: NaiveTime,
    /// Base hourly rate.
    pub hourly_rate: Decimal,
    /// Overtime multiplier on the base rate.
    pub multiplier: Decimal,
    /// Free text notes.
    pub notes: Option<String>,
}

impl OvertimeEntry {
    /// Length of the shift in minutes.
    #[must_use]
    pub fn minutes(&self) -> i64 {
        let minutes = (self.end - self.start).num_minutes();
        if minutes <= 0 {
            minutes + MINUTES_PER_DAY
        } else {
            minutes
        }
    }

    /// Hours worked, rounded to two decimal places.
    #[must_use]
    pub fn hours(&self) -> Decimal {
        (Decimal::from(self.minutes()) / Decimal::from(60)).round_dp(2)
    }

    /// Overtime pay for the shift, rounded to two decimal places.
    /// `None` when the rate is too large to compute it.
    #[must_use]
    pub fn checked_pay(&self) -> Option<Decimal> {
        let hours = Decimal::from(self.minutes()) / Decimal::from(60);
        let pay = hours
            .checked_mul(self.hourly_rate)?
            .checked_mul(self.multiplier)?;
        Some(pay.round_dp(2))
    }

    /// Overtime pay for the shift, rounded to two decimal places.
    ///
    /// Saturates at [`Decimal::MAX`]; use [`Self::checked_pay`] to reject
    /// such entries.
    #[must_use]
    pub fn pay(&self) -> Decimal {
        self.checked_pay().unwrap_or(Decimal::MAX)
    }
}

/// Overtime totals for one employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeOvertime {
    /// Employee name.
    pub employee: String,
    /// Number of shifts.
    pub shifts: usize,
    /// Total hours.
    pub hours: Decimal,
    /// Total pay.
    pub pay: Decimal,
}

/// Overtime totals across employees.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimeSummary {
    /// Month the summary is restricted to, if any.
    pub month: Option<String>,
    /// Per employee, sorted by name.
    pub employees: Vec<EmployeeOvertime>,
    /// Hours across all employees.
    pub total_hours: Decimal,
    /// Pay across all employees.
    pub total_pay: Decimal,
}

/// Summarize shifts per employee, optionally restricted to one month.
///
/// Employee names are grouped trimmed and case-insensitively; the first
/// spelling seen is reported.
#[must_use]
pub fn summarize(entries: &[OvertimeEntry], month: Option<Month>) -> OvertimeSummary {
    let mut by_employee: BTreeMap<String, EmployeeOvertime> = BTreeMap::new();

    for entry in entries
        .iter()
        .filter(|e| month.map_or(true, |m| m.contains(e.date)))
    {
        let totals = by_employee
            .entry(entry.employee.trim().to_lowercase())
            .or_insert_with(|| EmployeeOvertime {
                employee: entry.employee.trim().to_string(),
                shifts: 0,
                hours: Decimal::ZERO,
                pay: Decimal::ZERO,
            });
        totals.shifts += 1;
        totals.hours = totals.hours.saturating_add(entry.hours());
        totals.pay = totals.pay.saturating_add(entry.pay());
    }

    let employees: Vec<EmployeeOvertime> = by_employee.into_values().collect();
    OvertimeSummary {
        month: month.map(|m| m.to_string()),
        total_hours: employees
            .iter()
            .map(|e| e.hours)
            .fold(Decimal::ZERO, Decimal::saturating_add),
        total_pay: employees
            .iter()
            .map(|e| e.pay)
            .fold(Decimal::ZERO, Decimal::saturating_add),
        employees,
    }
}
