//! Inventory ledger replay.
//!
//! On-hand stock is never trusted from the items sheet. It is recomputed by
//! starting every item at its opening quantity and folding the transfer log
//! over it in time order.
//!
//! Sales made by a person (salesman, driver) are logged as person to
//! customer transfers. Later, when the customer's invoice is entered in bulk,
//! the same goods are deducted from the main warehouse a second time by a
//! reconciliation transfer. The ledger keeps a per-barcode buffer of person
//! sales and lets reconciliation deductions consume that buffer first, so
//! the goods only leave main stock once.
//!
//! # Example
//!
//! ```
//! use opsledger_core::{Item, Location, StockLedger, Transfer, RECONCILIATION_MARKER};
//! use rust_decimal_macros::dec;
//! use chrono::NaiveDate;
//!
//! let day = |d| NaiveDate::from_ymd_opt(2024, 5, d).unwrap().and_hms_opt(8, 0, 0).unwrap();
//! let omar = Location::Person("Omar".into());
//! let shop = Location::Customer("Kiosk 7".into());
//!
//! let mut ledger = StockLedger::new(&[Item::new("6001", "Chipsy Salt 40g", dec!(100))]);
//! // Omar takes 20 out and sells 12 of them.
//! ledger.apply(&Transfer::new("1", day(1), "6001", dec!(20))
//!     .with_from(Location::MainWarehouse).with_to(omar.clone())).unwrap();
//! ledger.apply(&Transfer::new("2", day(2), "6001", dec!(12))
//!     .with_from(omar).with_to(shop.clone())).unwrap();
//! // The invoice for those 12 arrives as a reconciliation deduction.
//! ledger.apply(&Transfer::new("3", day(3), "6001", dec!(12))
//!     .with_from(Location::MainWarehouse).with_to(shop)
//!     .with_description(RECONCILIATION_MARKER)).unwrap();
//!
//! let report = ledger.finish();
//! assert_eq!(report.levels[0].on_hand, dec!(80));
//! assert_eq!(report.levels[0].absorbed, dec!(12));
//! ```

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::{same_name, Location, Movement, Transfer, RECONCILIATION_MARKER};

/// An inventory item as stored in the items sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Unique barcode.
    pub barcode: String,
    /// Display name.
    pub name: String,
    /// Optional product category.
    pub category: Option<String>,
    /// Unit of measure (carton, piece, ...).
    pub unit: Option<String>,
    /// Quantity on hand before the first transfer.
    pub opening_quantity: Decimal,
    /// Last computed on-hand quantity.
    pub quantity: Decimal,
    /// Threshold at or below which the item is flagged as low stock.
    pub reorder_level: Option<Decimal>,
}

impl Item {
    /// Create an item whose current quantity equals its opening quantity.
    pub fn new(barcode: impl Into<String>, name: impl Into<String>, opening: Decimal) -> Self {
        Self {
            barcode: barcode.into(),
            name: name.into(),
            category: None,
            unit: None,
            opening_quantity: opening,
            quantity: opening,
            reorder_level: None,
        }
    }

    /// Set the reorder level.
    #[must_use]
    pub const fn with_reorder_level(mut self, level: Decimal) -> Self {
        self.reorder_level = Some(level);
        self
    }

    /// Set the category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// Why a transfer did not take part in the replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The barcode is not in the items sheet.
    UnknownBarcode,
    /// Zero or negative quantity.
    NonPositiveQuantity,
    /// Applying the transfer would overflow a running total.
    Overflow,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownBarcode => write!(f, "unknown barcode"),
            Self::NonPositiveQuantity => write!(f, "quantity must be positive"),
            Self::Overflow => write!(f, "quantity overflows the running total"),
        }
    }
}

/// A transfer left out of the replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedTransfer {
    /// Transfer id.
    pub id: String,
    /// Barcode as written on the transfer.
    pub barcode: String,
    /// Why it was skipped.
    pub reason: SkipReason,
}

/// Replayed stock of one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLevel {
    /// Item barcode.
    pub barcode: String,
    /// Item name.
    pub name: String,
    /// Opening quantity the replay started from.
    pub opening: Decimal,
    /// Total received into the main warehouse.
    pub inbound: Decimal,
    /// Total actually deducted from the main warehouse.
    pub outbound: Decimal,
    /// Reconciliation deductions absorbed by earlier person sales.
    pub absorbed: Decimal,
    /// Final on-hand quantity. May be negative if the log over-issues.
    pub on_hand: Decimal,
    /// Reorder level copied from the item.
    pub reorder_level: Option<Decimal>,
    /// Whether `on_hand` is at or below the reorder level.
    pub low_stock: bool,
}

impl StockLevel {
    fn opening(item: &Item) -> Self {
        Self {
            barcode: item.barcode.trim().to_string(),
            name: item.name.clone(),
            opening: item.opening_quantity,
            inbound: Decimal::ZERO,
            outbound: Decimal::ZERO,
            absorbed: Decimal::ZERO,
            on_hand: item.opening_quantity,
            reorder_level: item.reorder_level,
            low_stock: false,
        }
    }
}

/// Result of a full replay.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockReport {
    /// One level per item, in item order.
    pub levels: Vec<StockLevel>,
    /// Transfers left out of the replay.
    pub skipped: Vec<SkippedTransfer>,
    /// Person sales not yet matched by a reconciliation, per barcode.
    pub buffered: BTreeMap<String, Decimal>,
    /// Stock currently held by each person, per barcode.
    pub holdings: BTreeMap<String, BTreeMap<String, Decimal>>,
    /// Number of transfers applied.
    pub applied: usize,
}

impl StockReport {
    /// Look up the level of a barcode, trimmed and case-insensitively.
    #[must_use]
    pub fn level(&self, barcode: &str) -> Option<&StockLevel> {
        self.levels.iter().find(|l| same_name(&l.barcode, barcode))
    }
}

/// Incremental form of the replay.
///
/// Transfers must be applied in chronological order; [`replay`] sorts them
/// before folding.
#[derive(Debug, Clone, Default)]
pub struct StockLedger {
    levels: Vec<StockLevel>,
    index: HashMap<String, usize>,
    buffer: HashMap<String, Decimal>,
    holdings: BTreeMap<String, BTreeMap<String, Decimal>>,
    skipped: Vec<SkippedTransfer>,
    applied: usize,
}

impl StockLedger {
    /// Start a ledger at the opening quantity of every item.
    ///
    /// Barcodes match trimmed and case-insensitively. A repeated barcode
    /// keeps its first item.
    #[must_use]
    pub fn new(items: &[Item]) -> Self {
        let mut ledger = Self::default();
        for item in items {
            let key = barcode_key(&item.barcode);
            if ledger.index.contains_key(&key) {
                tracing::warn!(
                    "Duplicate barcode {} in items, keeping first",
                    item.barcode.trim()
                );
                continue;
            }
            ledger.index.insert(key, ledger.levels.len());
            ledger.levels.push(StockLevel::opening(item));
        }
        ledger
    }

    /// Apply one transfer.
    ///
    /// Returns how the transfer moved main stock, or why it was skipped.
    /// Skips are also recorded in the final report. A skipped transfer
    /// leaves the ledger unchanged.
    pub fn apply(&mut self, transfer: &Transfer) -> Result<Movement, SkipReason> {
        let Some(&idx) = self.index.get(&barcode_key(&transfer.barcode)) else {
            return Err(self.skip(transfer, SkipReason::UnknownBarcode));
        };
        if transfer.quantity <= Decimal::ZERO {
            return Err(self.skip(transfer, SkipReason::NonPositiveQuantity));
        }

        let movement = transfer.movement();
        let Some(step) = self.step(idx, transfer, movement) else {
            return Err(self.skip(transfer, SkipReason::Overflow));
        };

        let barcode = step.level.barcode.clone();
        self.levels[idx] = step.level;
        self.buffer.insert(barcode.clone(), step.buffered);
        for (person, quantity) in step.holdings {
            *self.holding(&person, &barcode) = quantity;
        }

        self.applied += 1;
        Ok(movement)
    }

    /// Compute the effect of a transfer without committing it.
    /// `None` when a total would overflow.
    fn step(&self, idx: usize, transfer: &Transfer, movement: Movement) -> Option<Step> {
        let quantity = transfer.quantity;
        let mut level = self.levels[idx].clone();
        let mut buffered = self.buffer.get(&level.barcode).copied().unwrap_or_default();

        match movement {
            Movement::Inbound => {
                level.inbound = level.inbound.checked_add(quantity)?;
                level.on_hand = level.on_hand.checked_add(quantity)?;
            }
            Movement::Outbound if transfer.is_reconciliation() => {
                let absorbed = quantity.min(buffered);
                buffered -= absorbed;
                let remainder = quantity - absorbed;
                level.absorbed = level.absorbed.checked_add(absorbed)?;
                level.outbound = level.outbound.checked_add(remainder)?;
                level.on_hand = level.on_hand.checked_sub(remainder)?;
            }
            Movement::Outbound => {
                level.outbound = level.outbound.checked_add(quantity)?;
                level.on_hand = level.on_hand.checked_sub(quantity)?;
            }
            Movement::Internal => {}
        }

        if transfer.is_person_sale() {
            buffered = buffered.checked_add(quantity)?;
        }

        let mut holdings: Vec<(String, Decimal)> = Vec::new();
        if let Some(Location::Person(name)) = &transfer.to {
            let held = self.held(name, &level.barcode).checked_add(quantity)?;
            holdings.push((name.clone(), held));
        }
        if let Some(Location::Person(name)) = &transfer.from {
            let current = holdings
                .iter()
                .find(|(person, _)| person == name)
                .map_or_else(|| self.held(name, &level.barcode), |(_, qty)| *qty);
            holdings.push((name.clone(), current.checked_sub(quantity)?));
        }

        Some(Step {
            level,
            buffered,
            holdings,
        })
    }

    /// Quantity of a barcode currently waiting in the reconciliation buffer.
    #[must_use]
    pub fn buffered(&self, barcode: &str) -> Decimal {
        self.index
            .get(&barcode_key(barcode))
            .and_then(|&i| self.buffer.get(&self.levels[i].barcode))
            .copied()
            .unwrap_or_default()
    }

    /// Current on-hand quantity of a barcode.
    #[must_use]
    pub fn on_hand(&self, barcode: &str) -> Option<Decimal> {
        self.index
            .get(&barcode_key(barcode))
            .map(|&i| self.levels[i].on_hand)
    }

    /// Finish the replay and build the report.
    #[must_use]
    pub fn finish(self) -> StockReport {
        let mut levels = self.levels;
        for level in &mut levels {
            level.low_stock = level.reorder_level.is_some_and(|r| level.on_hand <= r);
        }

        let buffered = self
            .buffer
            .into_iter()
            .filter(|(_, qty)| !qty.is_zero())
            .collect();

        let holdings = self
            .holdings
            .into_iter()
            .filter_map(|(person, items)| {
                let items: BTreeMap<_, _> =
                    items.into_iter().filter(|(_, qty)| !qty.is_zero()).collect();
                (!items.is_empty()).then_some((person, items))
            })
            .collect();

        StockReport {
            levels,
            skipped: self.skipped,
            buffered,
            holdings,
            applied: self.applied,
        }
    }

    fn skip(&mut self, transfer: &Transfer, reason: SkipReason) -> SkipReason {
        tracing::warn!(
            "Skipping transfer {} ({}): {}",
            transfer.id,
            transfer.barcode,
            reason
        );
        self.skipped.push(SkippedTransfer {
            id: transfer.id.clone(),
            barcode: transfer.barcode.clone(),
            reason,
        });
        reason
    }

    fn held(&self, person: &str, barcode: &str) -> Decimal {
        self.holdings
            .get(person)
            .and_then(|items| items.get(barcode))
            .copied()
            .unwrap_or_default()
    }

    fn holding(&mut self, person: &str, barcode: &str) -> &mut Decimal {
        self.holdings
            .entry(person.to_string())
            .or_default()
            .entry(barcode.to_string())
            .or_default()
    }
}

/// The pending result of applying one transfer.
struct Step {
    level: StockLevel,
    buffered: Decimal,
    holdings: Vec<(String, Decimal)>,
}

fn barcode_key(barcode: &str) -> String {
    barcode.trim().to_ascii_lowercase()
}

/// Replay all transfers over the items in chronological order.
///
/// The sort is stable, so transfers with equal timestamps keep their sheet
/// order.
#[must_use]
pub fn replay(items: &[Item], transfers: &[Transfer]) -> StockReport {
    let mut ordered: Vec<&Transfer> = transfers.iter().collect();
    ordered.sort_by_key(|t| t.date);

    let mut ledger = StockLedger::new(items);
    for transfer in ordered {
        // Skips are recorded by the ledger itself.
        let _ = ledger.apply(transfer);
    }
    let report = ledger.finish();

    tracing::debug!(
        "Replayed {} transfers over {} items ({} skipped)",
        report.applied,
        report.levels.len(),
        report.skipped.len()
    );
    report
}

/// Levels at or below their reorder level.
#[must_use]
pub fn low_stock(levels: &[StockLevel]) -> Vec<&StockLevel> {
    levels.iter().filter(|l| l.low_stock).collect()
}

/// One line of an invoice being reconciled against stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceLine {
    /// Item barcode.
    pub barcode: String,
    /// Invoiced quantity.
    pub quantity: Decimal,
}

/// Build the main warehouse deductions for a bulk-entered invoice.
///
/// Each non-empty line becomes an outbound transfer to the customer tagged
/// with [`RECONCILIATION_MARKER`]. Ids are numbered from `first_id`.
#[must_use]
pub fn reconciliation_transfers(
    invoice_number: &str,
    customer: &str,
    lines: &[InvoiceLine],
    at: NaiveDateTime,
    first_id: u64,
) -> Vec<Transfer> {
    let description = format!("{RECONCILIATION_MARKER} {}", invoice_number.trim());
    lines
        .iter()
        .filter(|line| line.quantity > Decimal::ZERO)
        .zip(first_id..)
        .map(|(line, id)| {
            Transfer::new(id.to_string(), at, line.barcode.trim(), line.quantity)
                .with_from(Location::MainWarehouse)
                .with_to(Location::Customer(customer.trim().to_string()))
                .with_description(description.clone())
        })
        .collect()
}
