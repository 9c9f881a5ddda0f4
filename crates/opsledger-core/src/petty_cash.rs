//! Petty cash book.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::Month;

/// Direction of a petty cash movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CashKind {
    /// Cash added to the box (top-up).
    In,
    /// Cash paid out.
    Out,
}

impl FromStr for CashKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "in" | "top-up" | "topup" | "deposit" => Ok(Self::In),
            "out" | "expense" | "withdrawal" => Ok(Self::Out),
            _ => Err(format!("unknown petty cash type: {s}")),
        }
    }
}

impl fmt::Display for CashKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::In => write!(f, "In"),
            Self::Out => write!(f, "Out"),
        }
    }
}

/// One line of the petty cash book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashEntry {
    /// Row identifier.
    pub id: String,
    /// Date of the movement.
    pub date: NaiveDate,
    /// What the money was for.
    pub description: String,
    /// Expense category (fuel, stationery, ...).
    pub category: Option<String>,
    /// In or out.
    pub kind: CashKind,
    /// Positive amount.
    pub amount: Decimal,
    /// Who recorded it.
    pub recorded_by: Option<String>,
}

impl CashEntry {
    /// The entry's effect on the cash balance.
    #[must_use]
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            CashKind::In => self.amount,
            CashKind::Out => -self.amount,
        }
    }
}

/// An entry with the balance after it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashLine {
    /// The entry.
    #[serde(flatten)]
    pub entry: CashEntry,
    /// Balance after this entry.
    pub balance: Decimal,
}

/// Compute the running balance in date order, starting from `opening`.
#[must_use]
pub fn running_balance(entries: &[CashEntry], opening: Decimal) -> Vec<CashLine> {
    let mut ordered: Vec<&CashEntry> = entries.iter().collect();
    ordered.sort_by_key(|e| e.date);

    let mut balance = opening;
    ordered
        .into_iter()
        .map(|entry| {
            balance = balance.saturating_add(entry.signed_amount());
            CashLine {
                entry: entry.clone(),
                balance,
            }
        })
        .collect()
}

/// Totals over a set of entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashSummary {
    /// Month the summary is restricted to, if any.
    pub month: Option<String>,
    /// Total topped up.
    pub total_in: Decimal,
    /// Total paid out.
    pub total_out: Decimal,
    /// `total_in - total_out`.
    pub net: Decimal,
    /// Outflows per category. Uncategorized spending is under "Uncategorized".
    pub by_category: BTreeMap<String, Decimal>,
    /// Net movement per month (`YYYY-MM`).
    pub by_month: BTreeMap<String, Decimal>,
}

/// Summarize entries, optionally restricted to one month.
#[must_use]
pub fn summarize(entries: &[CashEntry], month: Option<Month>) -> CashSummary {
    let mut summary = CashSummary {
        month: month.map(|m| m.to_string()),
        ..CashSummary::default()
    };

    for entry in entries
        .iter()
        .filter(|e| month.map_or(true, |m| m.contains(e.date)))
    {
        match entry.kind {
            CashKind::In => {
                summary.total_in = summary.total_in.saturating_add(entry.amount);
            }
            CashKind::Out => {
                summary.total_out = summary.total_out.saturating_add(entry.amount);
                let category = entry
                    .category
                    .as_deref()
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .unwrap_or("Uncategorized");
                let spent = summary
                    .by_category
                    .entry(category.to_string())
                    .or_default();
                *spent = spent.saturating_add(entry.amount);
            }
        }
        let net = summary
            .by_month
            .entry(Month::of(entry.date).to_string())
            .or_default();
        *net = net.saturating_add(entry.signed_amount());
    }

    summary.net = summary.total_in.saturating_sub(summary.total_out);
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn entry(id: &str, day: (i32, u32, u32), kind: CashKind, amount: Decimal) -> CashEntry {
        CashEntry {
            id: id.to_string(),
            date: NaiveDate::from_ymd_opt(day.0, day.1, day.2).unwrap(),
            description: format!("entry {id}"),
            category: None,
            kind,
            amount,
            recorded_by: None,
        }
    }

    #[test]
    fn test_cash_kind_parse() {
        assert_eq!("IN".parse::<CashKind>(), Ok(CashKind::In));
        assert_eq!("Expense".parse::<CashKind>(), Ok(CashKind::Out));
        assert!("transfer".parse::<CashKind>().is_err());
    }

    #[test]
    fn test_running_balance_sorted_by_date() {
        let entries = vec![
            entry("2", (2024, 3, 5), CashKind::Out, dec!(120)),
            entry("1", (2024, 3, 1), CashKind::In, dec!(1000)),
            entry("3", (2024, 3, 9), CashKind::Out, dec!(30.50)),
        ];
        let lines = running_balance(&entries, dec!(50));
        let ids: Vec<&str> = lines.iter().map(|l| l.entry.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert_eq!(lines[0].balance, dec!(1050));
        assert_eq!(lines[2].balance, dec!(899.50));
    }

    #[test]
    fn test_summarize_by_category_and_month() {
        let mut fuel = entry("2", (2024, 3, 5), CashKind::Out, dec!(200));
        fuel.category = Some("Fuel".into());
        let mut more_fuel = entry("3", (2024, 4, 2), CashKind::Out, dec!(150));
        more_fuel.category = Some("Fuel".into());
        let entries = vec![
            entry("1", (2024, 3, 1), CashKind::In, dec!(1000)),
            fuel,
            more_fuel,
            entry("4", (2024, 4, 3), CashKind::Out, dec!(25)),
        ];

        let all = summarize(&entries, None);
        assert_eq!(all.total_in, dec!(1000));
        assert_eq!(all.total_out, dec!(375));
        assert_eq!(all.net, dec!(625));
        assert_eq!(all.by_category["Fuel"], dec!(350));
        assert_eq!(all.by_category["Uncategorized"], dec!(25));
        assert_eq!(all.by_month["2024-03"], dec!(800));
        assert_eq!(all.by_month["2024-04"], dec!(-175));

        let april = summarize(&entries, Month::new(2024, 4));
        assert_eq!(april.month.as_deref(), Some("2024-04"));
        assert_eq!(april.total_in, dec!(0));
        assert_eq!(april.total_out, dec!(175));
        assert_eq!(april.by_month.len(), 1);
    }
}
