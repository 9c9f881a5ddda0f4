//! End-to-end tests against a directory of hand-written CSV sheets.

use opsledger_core::{replay, Invoice, Item, Transfer};
use opsledger_sheets::{records, CsvStore, SheetStore};
use rust_decimal_macros::dec;
use std::fs;

fn workbook() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("Items.csv"),
        "Barcode,Name,Opening Quantity,Quantity,Reorder Level\n\
         6001,Chipsy Salt 40g,100,100,20\n\
         6002,Chipsy Chili 40g,50,50,\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("Transfers.csv"),
        "ID,Date,Barcode,Type,From,To,Quantity,Description\n\
         1,2024-03-01 08:00,6001,OUT,,,10,legacy issue\n\
         2,2024-03-02 09:00,6001,,Main Warehouse,Ahmed,30,\n\
         3,2024-03-02 15:00,6001,,Ahmed,Customer: Metro,30,\n\
         4,2024-03-03 10:00,6001,,Main Warehouse,Customer: Metro,30,Invoice Reconciliation INV-7\n\
         5,2024-03-03 11:00,9999,IN,,,5,\n\
         6,not a date,6002,IN,,,5,\n",
    )
    .unwrap();
    dir
}

#[test]
fn test_stock_from_csv_workbook() {
    let dir = workbook();
    let store = CsvStore::new(dir.path());

    let items = records::load::<Item>(&store).unwrap();
    let transfers = records::load::<Transfer>(&store).unwrap();
    assert_eq!(items.records.len(), 2);
    assert_eq!(transfers.records.len(), 5);
    assert_eq!(transfers.warnings.len(), 1);
    assert!(transfers.warnings[0].starts_with("Row 7:"));

    let report = replay(&items.records, &transfers.records);
    // 100 - 10 (legacy) - 30 (to Ahmed); the reconciliation is fully absorbed.
    assert_eq!(report.level("6001").unwrap().on_hand, dec!(60));
    assert_eq!(report.level("6002").unwrap().on_hand, dec!(50));
    assert_eq!(report.skipped.len(), 1);
}

#[test]
fn test_recalculated_quantities_written_back() {
    let dir = workbook();
    let store = CsvStore::new(dir.path());

    let mut items = records::load::<Item>(&store).unwrap().records;
    let transfers = records::load::<Transfer>(&store).unwrap().records;
    let report = replay(&items, &transfers);
    for item in &mut items {
        if let Some(level) = report.level(&item.barcode) {
            item.quantity = level.on_hand;
        }
    }
    records::save_all(&store, &items).unwrap();

    let reloaded = records::load::<Item>(&store).unwrap().records;
    assert_eq!(reloaded[0].opening_quantity, dec!(100));
    assert_eq!(reloaded[0].quantity, dec!(60));
    assert_eq!(reloaded[0].reorder_level, Some(dec!(20)));
    let raw = fs::read_to_string(dir.path().join("Items.csv")).unwrap();
    assert!(raw.starts_with("Barcode,Name,Category,Unit,Opening Quantity,Quantity,Reorder Level"));
}

#[test]
fn test_append_to_new_sheet_in_empty_directory() {
    let dir = tempfile::tempdir().unwrap();
    let store = CsvStore::new(dir.path().join("fresh"));
    let date = chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();

    records::append(&store, &[Invoice::new("INV-1", "Metro", date, dec!(250))]).unwrap();
    records::append(&store, &[Invoice::new("INV-2", "Carrefour", date, dec!(90))]).unwrap();

    let invoices = records::load::<Invoice>(&store).unwrap().records;
    let numbers: Vec<&str> = invoices.iter().map(|i| i.number.as_str()).collect();
    assert_eq!(numbers, vec!["INV-1", "INV-2"]);
    assert_eq!(store.read("Invoices").unwrap().headers.len(), 7);
}
