//! Delivery tracking against local purchase orders (LPOs).

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A purchase order received from a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lpo {
    /// LPO number, unique per sheet.
    pub number: String,
    /// Ordering customer.
    pub customer: String,
    /// Order date.
    pub date: NaiveDate,
    /// Requested delivery date.
    pub due_date: Option<NaiveDate>,
    /// What was ordered.
    pub description: Option<String>,
    /// Ordered quantity.
    pub ordered: Decimal,
    /// Cancelled orders are tracked but never overdue.
    pub cancelled: bool,
}

/// A delivery made against an LPO.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    /// Row identifier.
    pub id: String,
    /// LPO the delivery belongs to.
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

/// Fulfilment state of an LPO.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LpoStatus {
    /// Order cancelled.
    Cancelled,
    /// Nothing delivered yet.
    Pending,
    /// Some delivered, not yet due.
    Partial,
    /// Outstanding quantity after the due date.
    Overdue,
    /// Delivered in full.
    Delivered,
    /// More delivered than ordered.
    OverDelivered,
}

/// Progress of one LPO.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LpoProgress {
    /// The order.
    pub lpo: Lpo,
    /// Delivered so far.
    pub delivered: Decimal,
    /// Still to deliver, never below zero.
    pub outstanding: Decimal,
    /// Number of deliveries.
    pub deliveries: usize,
    /// Most recent delivery date.
    pub last_delivery: Option<NaiveDate>,
    /// Fulfilment state.
    pub status: LpoStatus,
}

impl LpoProgress {
    /// Whether the order still needs deliveries.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(
            self.status,
            LpoStatus::Pending | LpoStatus::Partial | LpoStatus::Overdue
        )
    }
}

/// Delivery progress across all LPOs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReport {
    /// One line per LPO, by order date then number.
    pub lines: Vec<LpoProgress>,
    /// Deliveries whose LPO number matches no order.
    pub orphans: Vec<Delivery>,
}

impl DeliveryReport {
    /// Number of orders still needing deliveries.
    #[must_use]
    pub fn open_count(&self) -> usize {
        self.lines.iter().filter(|l| l.is_open()).count()
    }
}

fn status(lpo: &Lpo, delivered: Decimal, as_of: NaiveDate) -> LpoStatus {
    if lpo.cancelled {
        LpoStatus::Cancelled
    } else if delivered > lpo.ordered {
        LpoStatus::OverDelivered
    } else if delivered == lpo.ordered {
        LpoStatus::Delivered
    } else if lpo.due_date.is_some_and(|due| as_of > due) {
        LpoStatus::Overdue
    } else if delivered > Decimal::ZERO {
        LpoStatus::Partial
    } else {
        LpoStatus::Pending
    }
}

/// Match deliveries to LPOs and compute each order's status on `as_of`.
///
/// LPO numbers are matched trimmed and case-insensitively. When the sheet
/// repeats an LPO number, deliveries count toward the first one.
#[must_use]
pub fn track(lpos: &[Lpo], deliveries: &[Delivery], as_of: NaiveDate) -> DeliveryReport {
    let mut index: HashMap<String, usize> = HashMap::new();
    for (i, lpo) in lpos.iter().enumerate() {
        index.entry(lpo.number.trim().to_lowercase()).or_insert(i);
    }

    let mut delivered = vec![Decimal::ZERO; lpos.len()];
    let mut counts = vec![0usize; lpos.len()];
    let mut last: Vec<Option<NaiveDate>> = vec![None; lpos.len()];
    let mut orphans = Vec::new();

    for delivery in deliveries {
        match index.get(&delivery.lpo_number.trim().to_lowercase()) {
            Some(&i) => {
                delivered[i] = delivered[i].saturating_add(delivery.quantity);
                counts[i] += 1;
                last[i] = Some(last[i].map_or(delivery.date, |d| d.max(delivery.date)));
            }
            None => orphans.push(delivery.clone()),
        }
    }

    let mut lines: Vec<LpoProgress> = lpos
        .iter()
        .enumerate()
        .map(|(i, lpo)| LpoProgress {
            lpo: lpo.clone(),
            delivered: delivered[i],
            outstanding: lpo.ordered.saturating_sub(delivered[i]).max(Decimal::ZERO),
            deliveries: counts[i],
            last_delivery: last[i],
            status: status(lpo, delivered[i], as_of),
        })
        .collect();
    lines.sort_by(|a, b| {
        a.lpo
            .date
            .cmp(&b.lpo.date)
            .then_with(|| a.lpo.number.cmp(&b.lpo.number))
    });

    DeliveryReport { lines, orphans }
}
