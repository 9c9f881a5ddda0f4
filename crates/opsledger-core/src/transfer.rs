//! Stock transfer records.
//!
//! The transfer sheet has carried two encodings over its lifetime. Old rows
//! have a `Type` column of `IN` or `OUT` and no endpoints; newer rows leave
//! `Type` empty and name a source and destination. [`Transfer::movement`]
//! folds both into a single in/out decision relative to the main warehouse.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Location;

/// Description marker of transfers created by bulk invoice reconciliation.
pub const RECONCILIATION_MARKER: &str = "Invoice Reconciliation";

/// Legacy `Type` column values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LegacyKind {
    /// Stock received into the main warehouse.
    In,
    /// Stock issued from the main warehouse.
    Out,
}

impl FromStr for LegacyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "IN" => Ok(Self::In),
            "OUT" => Ok(Self::Out),
            _ => Err(format!("unknown transfer type: {s}")),
        }
    }
}

impl fmt::Display for LegacyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::In => write!(f, "IN"),
            Self::Out => write!(f, "OUT"),
        }
    }
}

/// Effect of a transfer on main warehouse stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Movement {
    /// Adds to main stock.
    Inbound,
    /// Deducts from main stock.
    Outbound,
    /// Does not touch main stock (person to customer, warehouse to itself).
    Internal,
}

/// A single stock movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    /// Row identifier.
    pub id: String,
    /// When the movement happened.
    pub date: NaiveDateTime,
    /// Barcode of the moved item.
    pub barcode: String,
    /// Legacy `IN`/`OUT` tag, if the row uses the old encoding.
    pub legacy: Option<LegacyKind>,
    /// Source location.
    pub from: Option<Location>,
    /// Destination location.
    pub to: Option<Location>,
    /// Units moved. Always positive for a valid transfer.
    pub quantity: Decimal,
    /// Free text description.
    pub description: Option<String>,
}

impl Transfer {
    /// Create a transfer with no endpoints.
    pub fn new(
        id: impl Into<String>,
        date: NaiveDateTime,
        barcode: impl Into<String>,
        quantity: Decimal,
    ) -> Self {
        Self {
            id: id.into(),
            date,
            barcode: barcode.into(),
            legacy: None,
            from: None,
            to: None,
            quantity,
            description: None,
        }
    }

    /// Set the source location.
    #[must_use]
    pub fn with_from(mut self, from: Location) -> Self {
        self.from = Some(from);
        self
    }

    /// Set the destination location.
    #[must_use]
    pub fn with_to(mut self, to: Location) -> Self {
        self.to = Some(to);
        self
    }

    /// Set the legacy type tag.
    #[must_use]
    pub const fn with_legacy(mut self, kind: LegacyKind) -> Self {
        self.legacy = Some(kind);
        self
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Classify this transfer relative to the main warehouse.
    ///
    /// A legacy tag always wins over the endpoints. A transfer from the
    /// warehouse to itself is internal.
    #[must_use]
    pub fn movement(&self) -> Movement {
        match self.legacy {
            Some(LegacyKind::In) => return Movement::Inbound,
            Some(LegacyKind::Out) => return Movement::Outbound,
            None => {}
        }

        let into_main = self.to.as_ref().is_some_and(Location::is_main);
        let out_of_main = self.from.as_ref().is_some_and(Location::is_main);
        match (into_main, out_of_main) {
            (true, false) => Movement::Inbound,
            (false, true) => Movement::Outbound,
            _ => Movement::Internal,
        }
    }

    /// Check if this transfer was created by invoice reconciliation.
    #[must_use]
    pub fn is_reconciliation(&self) -> bool {
        self.description.as_deref().is_some_and(|d| {
            d.to_ascii_lowercase()
                .contains(&RECONCILIATION_MARKER.to_ascii_lowercase())
        })
    }

    /// Check if this records a person selling to a customer.
    #[must_use]
    pub fn is_person_sale(&self) -> bool {
        self.from.as_ref().is_some_and(Location::is_person)
            && self.to.as_ref().is_some_and(Location::is_customer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn at(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    fn person(name: &str) -> Location {
        Location::Person(name.to_string())
    }

    fn customer(name: &str) -> Location {
        Location::Customer(name.to_string())
    }

    #[test]
    fn test_legacy_kind_parse() {
        assert_eq!("in".parse::<LegacyKind>(), Ok(LegacyKind::In));
        assert_eq!(" OUT ".parse::<LegacyKind>(), Ok(LegacyKind::Out));
        assert!("MOVE".parse::<LegacyKind>().is_err());
    }

    #[test]
    fn test_movement_from_endpoints() {
        let inbound = Transfer::new("1", at(1), "A", dec!(5))
            .with_from(Location::Supplier("PepsiCo".into()))
            .with_to(Location::MainWarehouse);
        assert_eq!(inbound.movement(), Movement::Inbound);

        let outbound = Transfer::new("2", at(1), "A", dec!(5))
            .with_from(Location::MainWarehouse)
            .with_to(person("Omar"));
        assert_eq!(outbound.movement(), Movement::Outbound);

        let internal = Transfer::new("3", at(1), "A", dec!(5))
            .with_from(person("Omar"))
            .with_to(customer("Spinneys"));
        assert_eq!(internal.movement(), Movement::Internal);
    }

    #[test]
    fn test_movement_main_to_main_is_internal() {
        let t = Transfer::new("1", at(1), "A", dec!(5))
            .with_from(Location::MainWarehouse)
            .with_to(Location::MainWarehouse);
        assert_eq!(t.movement(), Movement::Internal);
    }

    #[test]
    fn test_legacy_tag_wins_over_endpoints() {
        let t = Transfer::new("1", at(1), "A", dec!(5))
            .with_legacy(LegacyKind::Out)
            .with_to(Location::MainWarehouse);
        assert_eq!(t.movement(), Movement::Outbound);

        let t = Transfer::new("2", at(1), "A", dec!(5)).with_legacy(LegacyKind::In);
        assert_eq!(t.movement(), Movement::Inbound);
    }

    #[test]
    fn test_is_reconciliation_case_insensitive() {
        let t = Transfer::new("1", at(1), "A", dec!(5))
            .with_description("invoice reconciliation INV-0042");
        assert!(t.is_reconciliation());

        let t = Transfer::new("2", at(1), "A", dec!(5)).with_description("Weekly restock");
        assert!(!t.is_reconciliation());
        assert!(!Transfer::new("3", at(1), "A", dec!(5)).is_reconciliation());
    }

    #[test]
    fn test_is_person_sale() {
        let sale = Transfer::new("1", at(1), "A", dec!(5))
            .with_from(person("Omar"))
            .with_to(customer("Spinneys"));
        assert!(sale.is_person_sale());

        let direct = Transfer::new("2", at(1), "A", dec!(5))
            .with_from(Location::MainWarehouse)
            .with_to(customer("Spinneys"));
        assert!(!direct.is_person_sale());
    }
}
