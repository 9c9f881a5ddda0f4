use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use opsledger_core::{schedule, Conflict, Slot};
use opsledger_sheets::{records, Loaded};
use tracing::info;

use super::{optional, required, with_store, AppState};
use crate::models::{DateQuery, NewSlot};
use crate::ApiError;

/// Handler to list dock bookings, or one day's plan with `?date=`.
pub async fn list_slots(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DateQuery>,
) -> Result<Json<Loaded<Slot>>, ApiError> {
    let loaded = with_store(&state, |store| Ok(records::load::<Slot>(store)?)).await?;
    let records = match query.date {
        Some(date) => schedule::day_plan(&loaded.records, date)
            .into_iter()
            .cloned()
            .collect(),
        None => loaded.records,
    };
    Ok(Json(Loaded {
        records,
        warnings: loaded.warnings,
    }))
}

/// Handler to book a dock slot. Overlapping bookings are rejected.
pub async fn create_slot(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewSlot>,
) -> Result<(StatusCode, Json<Slot>), ApiError> {
    let mut slot = Slot {
        id: String::new(),
        date: payload.date,
        dock: required("dock", &payload.dock)?,
        start: payload.start,
        end: payload.end,
        kind: payload.kind,
        vehicle: optional(payload.vehicle),
        reference: optional(payload.reference),
    };
    slot.validate()?;

    let _write_guard = state.write_lock.lock().await;
    let slot = with_store(&state, move |store| {
        let existing = records::load::<Slot>(store)?.records;
        slot.id = records::next_id(&existing).to_string();

        let clashes = schedule::conflicts_with(&slot, &existing);
        if !clashes.is_empty() {
            let ids: Vec<&str> = clashes.iter().map(|s| s.id.as_str()).collect();
            return Err(ApiError::Conflict(format!(
                "{} is already booked on {} between {} and {} (slot {})",
                slot.dock,
                slot.date,
                slot.start.format("%H:%M"),
                slot.end.format("%H:%M"),
                ids.join(", ")
            )));
        }
        records::append(store, std::slice::from_ref(&slot))?;
        Ok(slot)
    })
    .await?;

    info!(id = %slot.id, dock = %slot.dock, date = %slot.date, "booked dock slot");
    Ok((StatusCode::CREATED, Json(slot)))
}

/// Handler to cancel a dock booking.
pub async fn delete_slot(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let _write_guard = state.write_lock.lock().await;
    let key = id.clone();
    let removed = with_store(&state, move |store| Ok(records::delete::<Slot>(store, &key)?)).await?;
    if !removed {
        return Err(ApiError::NotFound(format!("slot {id} not found")));
    }
    info!(%id, "deleted dock slot");
    Ok(StatusCode::NO_CONTENT)
}

/// Handler listing every pair of overlapping bookings.
pub async fn conflicts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Loaded<Conflict>>, ApiError> {
    let loaded = with_store(&state, |store| Ok(records::load::<Slot>(store)?)).await?;
    Ok(Json(Loaded {
        records: schedule::conflicts(&loaded.records),
        warnings: loaded.warnings,
    }))
}
