//! End-to-end reconciliation scenarios over a mixed-encoding transfer log.
//!
//! The log below mirrors what the transfer sheet looks like after the switch
//! from `IN`/`OUT` rows to named endpoints: the first weeks are legacy rows,
//! later weeks carry sources and destinations, and month-end invoices are
//! entered in bulk as reconciliation deductions.

use chrono::{NaiveDate, NaiveDateTime};
use opsledger_core::{
    reconciliation_transfers, replay, InvoiceLine, Item, LegacyKind, Location, Transfer,
};
use rust_decimal_macros::dec;

fn at(month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, month, day)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap()
}

fn person(name: &str) -> Location {
    Location::Person(name.to_string())
}

fn customer(name: &str) -> Location {
    Location::Customer(name.to_string())
}

#[test]
fn mixed_log_with_month_end_invoice() {
    let items = vec![
        Item::new("6223001", "Chipsy Salt 40g", dec!(200)).with_reorder_level(dec!(50)),
        Item::new("6223002", "Chipsy Cheese 40g", dec!(120)),
    ];

    let mut log = vec![
        // Legacy era
        Transfer::new("1", at(1, 3), "6223001", dec!(100)).with_legacy(LegacyKind::In),
        Transfer::new("2", at(1, 9), "6223001", dec!(40)).with_legacy(LegacyKind::Out),
        Transfer::new("3", at(1, 9), "6223002", dec!(20)).with_legacy(LegacyKind::Out),
        // Named endpoints: van stock issued to a salesman
        Transfer::new("4", at(2, 1), "6223001", dec!(60))
            .with_from(Location::MainWarehouse)
            .with_to(person("Hassan")),
        Transfer::new("5", at(2, 1), "6223002", dec!(30))
            .with_from(Location::MainWarehouse)
            .with_to(person("Hassan")),
        // Hassan sells from the van
        Transfer::new("6", at(2, 4), "6223001", dec!(25))
            .with_from(person("Hassan"))
            .with_to(customer("Kiosk 7")),
        Transfer::new("7", at(2, 6), "6223002", dec!(10))
            .with_from(person("Hassan"))
            .with_to(customer("Kiosk 7")),
        // Unknown barcode typed by hand
        Transfer::new("8", at(2, 7), "622300X", dec!(5))
            .with_from(Location::MainWarehouse)
            .with_to(customer("Kiosk 7")),
    ];

    // Month-end invoice for Kiosk 7 covers the van sales plus a direct order.
    let lines = vec![
        InvoiceLine {
            barcode: "6223001".into(),
            quantity: dec!(35),
        },
        InvoiceLine {
            barcode: "6223002".into(),
            quantity: dec!(10),
        },
    ];
    log.extend(reconciliation_transfers(
        "INV-2024-031",
        "Kiosk 7",
        &lines,
        at(2, 29),
        9,
    ));

    let report = replay(&items, &log);

    let salt = report.level("6223001").unwrap();
    // 200 + 100 - 40 - 60 - (35 - 25)
    assert_eq!(salt.on_hand, dec!(190));
    assert_eq!(salt.absorbed, dec!(25));
    assert!(!salt.low_stock);

    let cheese = report.level("6223002").unwrap();
    // 120 - 20 - 30 - (10 - 10)
    assert_eq!(cheese.on_hand, dec!(70));
    assert_eq!(cheese.absorbed, dec!(10));

    assert!(report.buffered.is_empty());
    assert_eq!(report.holdings["Hassan"]["6223001"], dec!(35));
    assert_eq!(report.holdings["Hassan"]["6223002"], dec!(20));

    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].id, "8");
    assert_eq!(report.applied, log.len() - 1);
}

#[test]
fn reconciliation_before_sale_is_not_absorbed() {
    // The invoice was entered before the van sale was logged. Replay is
    // chronological, so nothing is buffered yet and main stock takes the hit.
    let items = vec![Item::new("A", "Chipsy Salt", dec!(100))];
    let log = vec![
        Transfer::new("1", at(3, 1), "A", dec!(10))
            .with_from(Location::MainWarehouse)
            .with_to(customer("Metro"))
            .with_description("Invoice Reconciliation INV-1"),
        Transfer::new("2", at(3, 2), "A", dec!(10))
            .with_from(person("Omar"))
            .with_to(customer("Metro")),
    ];

    let report = replay(&items, &log);
    assert_eq!(report.levels[0].on_hand, dec!(90));
    assert_eq!(report.levels[0].absorbed, dec!(0));
    assert_eq!(report.buffered["A"], dec!(10));
}

#[test]
fn several_invoices_drain_buffer_in_order() {
    let items = vec![Item::new("A", "Chipsy Salt", dec!(100))];
    let mut log = vec![Transfer::new("1", at(4, 1), "A", dec!(15))
        .with_from(person("Omar"))
        .with_to(customer("Metro"))];
    let line = |qty| {
        vec![InvoiceLine {
            barcode: "A".into(),
            quantity: qty,
        }]
    };
    log.extend(reconciliation_transfers("INV-1", "Metro", &line(dec!(10)), at(4, 2), 2));
    log.extend(reconciliation_transfers("INV-2", "Metro", &line(dec!(10)), at(4, 3), 3));

    let report = replay(&items, &log);
    // First invoice fully absorbed, second absorbs the remaining 5.
    assert_eq!(report.levels[0].absorbed, dec!(15));
    assert_eq!(report.levels[0].on_hand, dec!(95));
    assert!(report.buffered.is_empty());
}
