//! Transfer endpoints.
//!
//! The `From`/`To` columns of the transfer sheet hold free text. A
//! [`Location`] is the parsed form: the main warehouse, a customer, a
//! supplier, or anybody else. Anybody else is a "person" - a salesman or
//! driver who carries stock between the warehouse and customers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical display name of the main warehouse.
pub const MAIN_WAREHOUSE: &str = "Main Warehouse";

const WAREHOUSE_ALIASES: &[&str] = &["main warehouse", "main", "warehouse"];
const CUSTOMER_PREFIX: &str = "customer:";
const SUPPLIER_PREFIX: &str = "supplier:";

/// Where a transfer starts or ends.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum Location {
    /// The main warehouse. Only movements in or out of it change on-hand stock.
    MainWarehouse,
    /// A customer the goods were sold to.
    Customer(String),
    /// A supplier goods were received from.
    Supplier(String),
    /// An intermediary holding stock on behalf of the business.
    Person(String),
}

impl Location {
    /// Parse a sheet cell. Empty or whitespace-only text has no location.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let lower = text.to_ascii_lowercase();
        if WAREHOUSE_ALIASES.contains(&lower.as_str()) {
            return Some(Self::MainWarehouse);
        }
        if lower.starts_with(CUSTOMER_PREFIX) {
            return Some(Self::Customer(
                text[CUSTOMER_PREFIX.len()..].trim().to_string(),
            ));
        }
        if lower.starts_with(SUPPLIER_PREFIX) {
            return Some(Self::Supplier(
                text[SUPPLIER_PREFIX.len()..].trim().to_string(),
            ));
        }
        Some(Self::Person(text.to_string()))
    }

    /// Check if this is the main warehouse.
    #[must_use]
    pub const fn is_main(&self) -> bool {
        matches!(self, Self::MainWarehouse)
    }

    /// Check if this is a customer.
    #[must_use]
    pub const fn is_customer(&self) -> bool {
        matches!(self, Self::Customer(_))
    }

    /// Check if this is an intermediary person.
    #[must_use]
    pub const fn is_person(&self) -> bool {
        matches!(self, Self::Person(_))
    }

    /// The name of the customer, supplier or person. `None` for the warehouse.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::MainWarehouse => None,
            Self::Customer(name) | Self::Supplier(name) | Self::Person(name) => Some(name),
        }
    }
}

impl FromStr for Location {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| "empty location".to_string())
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MainWarehouse => write!(f, "{MAIN_WAREHOUSE}"),
            Self::Customer(name) => write!(f, "Customer: {name}"),
            Self::Supplier(name) => write!(f, "Supplier: {name}"),
            Self::Person(name) => write!(f, "{name}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_warehouse_aliases() {
        assert_eq!(Location::parse("Main Warehouse"), Some(Location::MainWarehouse));
        assert_eq!(Location::parse("  MAIN  "), Some(Location::MainWarehouse));
        assert_eq!(Location::parse("warehouse"), Some(Location::MainWarehouse));
    }

    #[test]
    fn test_parse_prefixed() {
        assert_eq!(
            Location::parse("Customer: Carrefour Maadi"),
            Some(Location::Customer("Carrefour Maadi".to_string()))
        );
        assert_eq!(
            Location::parse("supplier:PepsiCo"),
            Some(Location::Supplier("PepsiCo".to_string()))
        );
    }

    #[test]
    fn test_parse_person_and_empty() {
        assert_eq!(
            Location::parse("Mahmoud"),
            Some(Location::Person("Mahmoud".to_string()))
        );
        assert_eq!(Location::parse("   "), None);
        assert!("".parse::<Location>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        for text in ["Main Warehouse", "Customer: Spinneys", "Supplier: PepsiCo", "Omar"] {
            let loc = Location::parse(text).unwrap();
            assert_eq!(loc.to_string(), text);
        }
    }

    #[test]
    fn test_predicates() {
        let person = Location::Person("Omar".into());
        assert!(person.is_person());
        assert!(!person.is_customer());
        assert_eq!(person.name(), Some("Omar"));
        assert!(Location::MainWarehouse.is_main());
        assert_eq!(Location::MainWarehouse.name(), None);
    }
}
