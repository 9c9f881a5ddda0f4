use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use opsledger_core::{analyze_debts, DebtReport, Invoice};
use opsledger_sheets::{records, Loaded};
use tracing::info;

use super::{non_negative, optional, positive, required, today, with_store, AppState};
use crate::models::{AsOfQuery, NewInvoice, PaymentRequest, WithWarnings};
use crate::ApiError;

/// Handler to list invoices.
pub async fn list_invoices(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Loaded<Invoice>>, ApiError> {
    let invoices = with_store(&state, |store| Ok(records::load::<Invoice>(store)?)).await?;
    Ok(Json(invoices))
}

/// Handler to add an invoice.
pub async fn create_invoice(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewInvoice>,
) -> Result<(StatusCode, Json<Invoice>), ApiError> {
    let amount = positive("amount", payload.amount)?;
    let paid = non_negative("paid", payload.paid)?;
    if paid > amount {
        return Err(ApiError::BadRequest(format!(
            "paid {paid} exceeds invoice amount {amount}"
        )));
    }
    if payload.due_date.is_some_and(|due| due < payload.date) {
        return Err(ApiError::BadRequest(
            "due_date is before the invoice date".to_string(),
        ));
    }
    let mut invoice = Invoice::new(
        required("number", &payload.number)?,
        required("customer", &payload.customer)?,
        payload.date,
        amount,
    )
    .with_paid(paid);
    invoice.due_date = payload.due_date;
    invoice.notes = optional(payload.notes);

    let _write_guard = state.write_lock.lock().await;
    let invoice = with_store(&state, move |store| {
        let existing = records::load::<Invoice>(store)?.records;
        if records::find(&existing, &invoice.number).is_some() {
            return Err(ApiError::Conflict(format!(
                "invoice {} already exists",
                invoice.number
            )));
        }
        records::append(store, std::slice::from_ref(&invoice))?;
        Ok(invoice)
    })
    .await?;

    info!(number = %invoice.number, customer = %invoice.customer, amount = %invoice.amount, "added invoice");
    Ok((StatusCode::CREATED, Json(invoice)))
}

/// Handler to record a payment against an invoice.
pub async fn record_payment(
    State(state): State<Arc<AppState>>,
    Path(number): Path<String>,
    Json(payload): Json<PaymentRequest>,
) -> Result<Json<Invoice>, ApiError> {
    let amount = payload.amount;

    let _write_guard = state.write_lock.lock().await;
    let invoice = with_store(&state, move |store| {
        let invoices = records::load::<Invoice>(store)?.records;
        let mut invoice = records::find(&invoices, &number)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("invoice {number} not found")))?;
        invoice.record_payment(amount)?;
        records::update(store, std::slice::from_ref(&invoice))?;
        Ok(invoice)
    })
    .await?;

    info!(number = %invoice.number, %amount, balance = %invoice.balance(), "recorded payment");
    Ok(Json(invoice))
}

/// Handler for the debt aging report.
pub async fn debts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AsOfQuery>,
) -> Result<Json<WithWarnings<DebtReport>>, ApiError> {
    let as_of = query.as_of.unwrap_or_else(today);
    let loaded = with_store(&state, |store| Ok(records::load::<Invoice>(store)?)).await?;
    Ok(Json(WithWarnings {
        report: analyze_debts(&loaded.records, as_of),
        warnings: loaded.warnings,
    }))
}
