use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use opsledger_core::{overtime, OvertimeEntry, OvertimeSummary, DEFAULT_MULTIPLIER};
use opsledger_sheets::{records, Loaded};
use tracing::info;

use super::{non_negative, optional, parse_month, positive, required, with_store, AppState};
use crate::models::{MonthQuery, NewOvertime, OvertimeLine, WithWarnings};
use crate::ApiError;

/// Handler to list overtime shifts with their hours and pay.
pub async fn list_entries(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Loaded<OvertimeLine>>, ApiError> {
    let loaded = with_store(&state, |store| Ok(records::load::<OvertimeEntry>(store)?)).await?;
    Ok(Json(Loaded {
        records: loaded.records.into_iter().map(OvertimeLine::from).collect(),
        warnings: loaded.warnings,
    }))
}

/// Handler to record an overtime shift.
pub async fn create_entry(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewOvertime>,
) -> Result<(StatusCode, Json<OvertimeLine>), ApiError> {
    let employee = required("employee", &payload.employee)?;
    let hourly_rate = non_negative("hourly_rate", payload.hourly_rate)?;
    let multiplier = positive("multiplier", payload.multiplier.unwrap_or(DEFAULT_MULTIPLIER))?;
    if payload.start == payload.end {
        return Err(ApiError::BadRequest(
            "shift start and end are the same".to_string(),
        ));
    }
    let notes = optional(payload.notes);

    let _write_guard = state.write_lock.lock().await;
    let entry = with_store(&state, move |store| {
        let existing = records::load::<OvertimeEntry>(store)?.records;
        let entry = OvertimeEntry {
            id: records::next_id(&existing).to_string(),
            employee,
            date: payload.date,
            start: payload.start,
            end: payload.end,
            hourly_rate,
            multiplier,
            notes,
        };
        if entry.checked_pay().is_none() {
            return Err(ApiError::BadRequest(
                "hourly_rate is too large to compute pay".to_string(),
            ));
        }
        records::append(store, std::slice::from_ref(&entry))?;
        Ok(entry)
    })
    .await?;

    let line = OvertimeLine::from(entry);
    info!(id = %line.entry.id, employee = %line.entry.employee, hours = %line.hours, "recorded overtime");
    Ok((StatusCode::CREATED, Json(line)))
}

/// Handler to remove an overtime shift.
pub async fn delete_entry(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let _write_guard = state.write_lock.lock().await;
    let key = id.clone();
    let removed = with_store(&state, move |store| {
        Ok(records::delete::<OvertimeEntry>(store, &key)?)
    })
    .await?;
    if !removed {
        return Err(ApiError::NotFound(format!("overtime entry {id} not found")));
    }
    info!(%id, "deleted overtime entry");
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for overtime totals per employee, optionally for one month.
pub async fn summary(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<WithWarnings<OvertimeSummary>>, ApiError> {
    let month = parse_month(query.month.as_deref())?;
    let loaded = with_store(&state, |store| Ok(records::load::<OvertimeEntry>(store)?)).await?;
    Ok(Json(WithWarnings {
        report: overtime::summarize(&loaded.records, month),
        warnings: loaded.warnings,
    }))
}
