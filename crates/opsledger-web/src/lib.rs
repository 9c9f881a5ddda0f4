//! JSON API server for the opsledger operations dashboard.
//!
//! [`router`] builds the axum [`Router`] over an [`AppState`] holding the
//! sheet store. The `opsledger-web` binary adds configuration, logging and
//! the listener.
//!
//! # Example
//!
//! ```
//! use opsledger_sheets::MemoryStore;
//! use opsledger_web::{router, AppState};
//!
//! let app = router(AppState::new(Box::new(MemoryStore::new())));
//! # let _ = app;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;

use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub use config::{ConfigError, StoreConfig, StoreKind};
pub use error::ApiError;
pub use handlers::AppState;

use handlers::{dashboard, deliveries, inventory, invoices, overtime, petty_cash, schedule};

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/dashboard", get(dashboard::dashboard))
        .route(
            "/api/inventory/items",
            get(inventory::list_items).post(inventory::create_item),
        )
        .route(
            "/api/inventory/transfers",
            get(inventory::list_transfers).post(inventory::create_transfer),
        )
        .route("/api/inventory/stock", get(inventory::stock))
        .route("/api/inventory/recalculate", post(inventory::recalculate))
        .route("/api/inventory/reconcile", post(inventory::reconcile))
        .route(
            "/api/invoices",
            get(invoices::list_invoices).post(invoices::create_invoice),
        )
        .route(
            "/api/invoices/:number/payments",
            post(invoices::record_payment),
        )
        .route("/api/debts", get(invoices::debts))
        .route(
            "/api/petty-cash",
            get(petty_cash::ledger).post(petty_cash::create_entry),
        )
        .route("/api/petty-cash/summary", get(petty_cash::summary))
        .route("/api/petty-cash/:id", delete(petty_cash::delete_entry))
        .route(
            "/api/overtime",
            get(overtime::list_entries).post(overtime::create_entry),
        )
        .route("/api/overtime/summary", get(overtime::summary))
        .route("/api/overtime/:id", delete(overtime::delete_entry))
        .route(
            "/api/lpos",
            get(deliveries::list_lpos).post(deliveries::create_lpo),
        )
        .route("/api/lpos/tracking", get(deliveries::tracking))
        .route(
            "/api/deliveries",
            get(deliveries::list_deliveries).post(deliveries::create_delivery),
        )
        .route(
            "/api/schedule",
            get(schedule::list_slots).post(schedule::create_slot),
        )
        .route("/api/schedule/conflicts", get(schedule::conflicts))
        .route("/api/schedule/:id", delete(schedule::delete_slot))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
