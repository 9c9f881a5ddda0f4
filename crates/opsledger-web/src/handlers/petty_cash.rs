use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use opsledger_core::{petty_cash, CashEntry, CashSummary};
use opsledger_sheets::records;
use tracing::info;

use super::{optional, parse_month, positive, required, with_store, AppState};
use crate::models::{CashLedger, MonthQuery, NewCashEntry, OpeningQuery, WithWarnings};
use crate::ApiError;

/// Handler for the petty cash book with running balances.
pub async fn ledger(
    State(state): State<Arc<AppState>>,
    Query(query): Query<OpeningQuery>,
) -> Result<Json<CashLedger>, ApiError> {
    let opening = query.opening.unwrap_or_default();
    let loaded = with_store(&state, |store| Ok(records::load::<CashEntry>(store)?)).await?;
    let lines = petty_cash::running_balance(&loaded.records, opening);
    let balance = lines.last().map_or(opening, |line| line.balance);
    Ok(Json(CashLedger {
        opening,
        lines,
        balance,
        warnings: loaded.warnings,
    }))
}

/// Handler to add a petty cash entry.
pub async fn create_entry(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewCashEntry>,
) -> Result<(StatusCode, Json<CashEntry>), ApiError> {
    let description = required("description", &payload.description)?;
    let amount = positive("amount", payload.amount)?;
    let category = optional(payload.category);
    let recorded_by = optional(payload.recorded_by);

    let _write_guard = state.write_lock.lock().await;
    let entry = with_store(&state, move |store| {
        let existing = records::load::<CashEntry>(store)?.records;
        let entry = CashEntry {
            id: records::next_id(&existing).to_string(),
            date: payload.date,
            description,
            category,
            kind: payload.kind,
            amount,
            recorded_by,
        };
        records::append(store, std::slice::from_ref(&entry))?;
        Ok(entry)
    })
    .await?;

    info!(id = %entry.id, kind = %entry.kind, amount = %entry.amount, "added petty cash entry");
    Ok((StatusCode::CREATED, Json(entry)))
}

/// Handler to remove a petty cash entry.
pub async fn delete_entry(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let _write_guard = state.write_lock.lock().await;
    let key = id.clone();
    let removed = with_store(&state, move |store| {
        Ok(records::delete::<CashEntry>(store, &key)?)
    })
    .await?;
    if !removed {
        return Err(ApiError::NotFound(format!("petty cash entry {id} not found")));
    }
    info!(%id, "deleted petty cash entry");
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for the petty cash summary, optionally for one month.
pub async fn summary(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<WithWarnings<CashSummary>>, ApiError> {
    let month = parse_month(query.month.as_deref())?;
    let loaded = with_store(&state, |store| Ok(records::load::<CashEntry>(store)?)).await?;
    Ok(Json(WithWarnings {
        report: petty_cash::summarize(&loaded.records, month),
        warnings: loaded.warnings,
    }))
}
