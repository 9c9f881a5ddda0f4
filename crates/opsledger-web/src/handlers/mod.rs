//! Route handlers.
//!
//! Every handler reads the sheets it needs, works in memory and writes
//! back. Store calls block, so they run on the blocking pool through
//! [`with_store`]. Handlers that read and then write the same sheet hold
//! [`AppState::write_lock`] for the whole exchange.

pub mod dashboard;
pub mod deliveries;
pub mod inventory;
pub mod invoices;
pub mod overtime;
pub mod petty_cash;
pub mod schedule;

use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::{Local, NaiveDate, NaiveDateTime};
use opsledger_core::Month;
use opsledger_sheets::SheetStore;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tokio::sync::Mutex;

use crate::ApiError;

/// Shared application state
pub struct AppState {
    /// The spreadsheet every request reads and writes.
    pub store: Arc<dyn SheetStore>,
    /// Mutex to serialize read-modify-write requests
    pub write_lock: Mutex<()>,
}

impl AppState {
    /// Wrap a store for sharing between handlers.
    pub fn new(store: Box<dyn SheetStore>) -> Arc<Self> {
        Arc::new(Self {
            store: Arc::from(store),
            write_lock: Mutex::new(()),
        })
    }
}

/// Run blocking store work on the blocking thread pool.
pub(crate) async fn with_store<T, F>(state: &AppState, work: F) -> Result<T, ApiError>
where
    F: FnOnce(&dyn SheetStore) -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    let store = Arc::clone(&state.store);
    tokio::task::spawn_blocking(move || work(store.as_ref())).await?
}

pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub(crate) fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Trimmed text that must not be empty.
pub(crate) fn required(field: &str, value: &str) -> Result<String, ApiError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ApiError::BadRequest(format!("{field} is required")));
    }
    if value.contains(['\n', '\r']) {
        return Err(ApiError::BadRequest(format!("{field} must be a single line")));
    }
    Ok(value.to_string())
}

/// Trimmed text, with blank treated as absent.
pub(crate) fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn positive(field: &str, value: Decimal) -> Result<Decimal, ApiError> {
    if value <= Decimal::ZERO {
        return Err(ApiError::BadRequest(format!("{field} must be positive")));
    }
    Ok(value)
}

pub(crate) fn non_negative(field: &str, value: Decimal) -> Result<Decimal, ApiError> {
    if value < Decimal::ZERO {
        return Err(ApiError::BadRequest(format!("{field} must not be negative")));
    }
    Ok(value)
}

/// Parse an optional `YYYY-MM` query parameter.
pub(crate) fn parse_month(month: Option<&str>) -> Result<Option<Month>, ApiError> {
    month
        .filter(|m| !m.trim().is_empty())
        .map(|m| m.parse::<Month>().map_err(ApiError::BadRequest))
        .transpose()
}

/// Handler for the liveness probe.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({ "status": "ok", "store": state.store.name() }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_required_and_optional() {
        assert_eq!(required("name", "  Salt ").unwrap(), "Salt");
        assert!(required("name", "   ").is_err());
        assert!(required("name", "a\nb").is_err());
        assert_eq!(optional(Some("  ".into())), None);
        assert_eq!(optional(Some(" x ".into())), Some("x".into()));
    }

    #[test]
    fn test_amount_checks() {
        assert!(positive("amount", dec!(0)).is_err());
        assert_eq!(positive("amount", dec!(2.5)).unwrap(), dec!(2.5));
        assert!(non_negative("paid", dec!(-1)).is_err());
        assert_eq!(non_negative("paid", dec!(0)).unwrap(), dec!(0));
    }

    #[test]
    fn test_parse_month() {
        assert_eq!(parse_month(None).unwrap(), None);
        assert_eq!(parse_month(Some("")).unwrap(), None);
        assert_eq!(parse_month(Some("2024-03")).unwrap(), Month::new(2024, 3));
        assert!(matches!(
            parse_month(Some("March")),
            Err(ApiError::BadRequest(_))
        ));
    }
}
