use std::collections::HashSet;
use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use opsledger_core::{
    reconciliation_transfers, replay, Item, Location, StockReport, Transfer,
};
use opsledger_sheets::{records, Loaded};
use tracing::info;

use super::{non_negative, now, optional, positive, required, with_store, AppState};
use crate::models::{
    NewItem, NewTransfer, RecalculateResponse, ReconcileRequest, ReconcileResponse, WithWarnings,
};
use crate::ApiError;

/// Handler to list inventory items.
pub async fn list_items(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Loaded<Item>>, ApiError> {
    let items = with_store(&state, |store| Ok(records::load::<Item>(store)?)).await?;
    Ok(Json(items))
}

/// Handler to add an inventory item.
pub async fn create_item(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewItem>,
) -> Result<(StatusCode, Json<Item>), ApiError> {
    let mut item = Item::new(
        required("barcode", &payload.barcode)?,
        required("name", &payload.name)?,
        non_negative("opening_quantity", payload.opening_quantity)?,
    );
    item.category = optional(payload.category);
    item.unit = optional(payload.unit);
    item.reorder_level = payload
        .reorder_level
        .map(|level| non_negative("reorder_level", level))
        .transpose()?;

    let _write_guard = state.write_lock.lock().await;
    let item = with_store(&state, move |store| {
        let existing = records::load::<Item>(store)?.records;
        if records::find(&existing, &item.barcode).is_some() {
            return Err(ApiError::Conflict(format!(
                "item with barcode {} already exists",
                item.barcode
            )));
        }
        records::append(store, std::slice::from_ref(&item))?;
        Ok(item)
    })
    .await?;

    info!(barcode = %item.barcode, name = %item.name, "added item");
    Ok((StatusCode::CREATED, Json(item)))
}

/// Handler to list recorded transfers.
pub async fn list_transfers(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Loaded<Transfer>>, ApiError> {
    let transfers = with_store(&state, |store| Ok(records::load::<Transfer>(store)?)).await?;
    Ok(Json(transfers))
}

/// Handler to record a transfer.
pub async fn create_transfer(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewTransfer>,
) -> Result<(StatusCode, Json<Transfer>), ApiError> {
    let barcode = required("barcode", &payload.barcode)?;
    let quantity = positive("quantity", payload.quantity)?;
    let from = payload.from.as_deref().and_then(Location::parse);
    let to = payload.to.as_deref().and_then(Location::parse);
    if payload.legacy.is_none() && from.is_none() && to.is_none() {
        return Err(ApiError::BadRequest(
            "transfer needs a type or a from/to location".to_string(),
        ));
    }
    let date = payload.date.unwrap_or_else(now);
    let description = optional(payload.description);
    let legacy = payload.legacy;

    let _write_guard = state.write_lock.lock().await;
    let transfer = with_store(&state, move |store| {
        let items = records::load::<Item>(store)?.records;
        let barcode = records::find(&items, &barcode)
            .map(|item| item.barcode.trim().to_string())
            .ok_or_else(|| ApiError::BadRequest(format!("unknown barcode {barcode}")))?;
        let existing = records::load::<Transfer>(store)?.records;

        let mut transfer = Transfer::new(
            records::next_id(&existing).to_string(),
            date,
            barcode,
            quantity,
        );
        transfer.legacy = legacy;
        transfer.from = from;
        transfer.to = to;
        transfer.description = description;
        records::append(store, std::slice::from_ref(&transfer))?;
        Ok(transfer)
    })
    .await?;

    info!(
        id = %transfer.id,
        barcode = %transfer.barcode,
        quantity = %transfer.quantity,
        movement = ?transfer.movement(),
        "recorded transfer"
    );
    Ok((StatusCode::CREATED, Json(transfer)))
}

fn load_and_replay(
    store: &dyn opsledger_sheets::SheetStore,
) -> Result<(Vec<Item>, StockReport, Vec<String>), ApiError> {
    let items = records::load::<Item>(store)?;
    let transfers = records::load::<Transfer>(store)?;
    let report = replay(&items.records, &transfers.records);
    let mut warnings = items.warnings;
    warnings.extend(transfers.warnings);
    Ok((items.records, report, warnings))
}

/// Handler for the replayed stock report.
pub async fn stock(
    State(state): State<Arc<AppState>>,
) -> Result<Json<WithWarnings<StockReport>>, ApiError> {
    let (_, report, warnings) = with_store(&state, load_and_replay).await?;
    Ok(Json(WithWarnings { report, warnings }))
}

/// Handler to replay transfers and write the results to the item sheet.
pub async fn recalculate(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RecalculateResponse>, ApiError> {
    let _write_guard = state.write_lock.lock().await;
    let response = with_store(&state, |store| {
        let (mut items, report, warnings) = load_and_replay(store)?;
        let mut seen = HashSet::new();
        let mut changed = Vec::new();
        for item in &mut items {
            // Repeated barcodes were left out of the replay.
            if !seen.insert(item.barcode.trim().to_ascii_lowercase()) {
                continue;
            }
            if let Some(level) = report.level(&item.barcode) {
                if item.quantity != level.on_hand {
                    item.quantity = level.on_hand;
                    changed.push(item.clone());
                }
            }
        }
        let updated = if changed.is_empty() {
            0
        } else {
            records::update(store, &changed)?
        };
        Ok(RecalculateResponse {
            updated,
            report,
            warnings,
        })
    })
    .await?;

    info!(updated = response.updated, "recalculated stock quantities");
    Ok(Json(response))
}

/// Handler to book the main-stock side of a bulk-entered invoice.
pub async fn reconcile(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ReconcileRequest>,
) -> Result<(StatusCode, Json<ReconcileResponse>), ApiError> {
    let invoice_number = required("invoice_number", &payload.invoice_number)?;
    let customer = required("customer", &payload.customer)?;
    if payload.lines.is_empty() {
        return Err(ApiError::BadRequest("invoice has no lines".to_string()));
    }
    for line in &payload.lines {
        required("barcode", &line.barcode)?;
        non_negative("quantity", line.quantity)?;
    }
    let at = payload.date.unwrap_or_else(now);
    let mut lines = payload.lines;

    let _write_guard = state.write_lock.lock().await;
    let transfers = with_store(&state, move |store| {
        let items = records::load::<Item>(store)?.records;
        let mut unknown: Vec<String> = Vec::new();
        for line in &mut lines {
            match records::find(&items, &line.barcode) {
                Some(item) => line.barcode = item.barcode.trim().to_string(),
                None => unknown.push(line.barcode.trim().to_string()),
            }
        }
        if !unknown.is_empty() {
            return Err(ApiError::BadRequest(format!(
                "unknown barcode(s): {}",
                unknown.join(", ")
            )));
        }

        let existing = records::load::<Transfer>(store)?.records;
        let transfers = reconciliation_transfers(
            &invoice_number,
            &customer,
            &lines,
            at,
            records::next_id(&existing),
        );
        if transfers.is_empty() {
            return Err(ApiError::BadRequest(
                "invoice has no positive quantities".to_string(),
            ));
        }
        records::append(store, &transfers)?;
        Ok(transfers)
    })
    .await?;

    info!(count = transfers.len(), "appended reconciliation transfers");
    Ok((StatusCode::CREATED, Json(ReconcileResponse { transfers })))
}
