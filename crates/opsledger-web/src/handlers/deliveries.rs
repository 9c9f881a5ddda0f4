use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use opsledger_core::{track, Delivery, DeliveryReport, Lpo};
use opsledger_sheets::{records, Loaded};
use tracing::info;

use super::{optional, positive, required, today, with_store, AppState};
use crate::models::{AsOfQuery, NewDelivery, NewLpo, WithWarnings};
use crate::ApiError;

/// Handler to list LPOs.
pub async fn list_lpos(State(state): State<Arc<AppState>>) -> Result<Json<Loaded<Lpo>>, ApiError> {
    let lpos = with_store(&state, |store| Ok(records::load::<Lpo>(store)?)).await?;
    Ok(Json(lpos))
}

/// Handler to add an LPO.
pub async fn create_lpo(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewLpo>,
) -> Result<(StatusCode, Json<Lpo>), ApiError> {
    let lpo = Lpo {
        number: required("number", &payload.number)?,
        customer: required("customer", &payload.customer)?,
        date: payload.date,
        due_date: payload.due_date,
        description: optional(payload.description),
        ordered: positive("ordered", payload.ordered)?,
        cancelled: false,
    };

    let _write_guard = state.write_lock.lock().await;
    let lpo = with_store(&state, move |store| {
        let existing = records::load::<Lpo>(store)?.records;
        if records::find(&existing, &lpo.number).is_some() {
            return Err(ApiError::Conflict(format!("LPO {} already exists", lpo.number)));
        }
        records::append(store, std::slice::from_ref(&lpo))?;
        Ok(lpo)
    })
    .await?;

    info!(number = %lpo.number, customer = %lpo.customer, ordered = %lpo.ordered, "added LPO");
    Ok((StatusCode::CREATED, Json(lpo)))
}

/// Handler for delivery progress against every LPO.
pub async fn tracking(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AsOfQuery>,
) -> Result<Json<WithWarnings<DeliveryReport>>, ApiError> {
    let as_of = query.as_of.unwrap_or_else(today);
    let (lpos, deliveries) = with_store(&state, |store| {
        Ok((
            records::load::<Lpo>(store)?,
            records::load::<Delivery>(store)?,
        ))
    })
    .await?;

    let mut warnings = lpos.warnings;
    warnings.extend(deliveries.warnings);
    Ok(Json(WithWarnings {
        report: track(&lpos.records, &deliveries.records, as_of),
        warnings,
    }))
}

/// Handler to list deliveries.
pub async fn list_deliveries(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Loaded<Delivery>>, ApiError> {
    let deliveries = with_store(&state, |store| Ok(records::load::<Delivery>(store)?)).await?;
    Ok(Json(deliveries))
}

/// Handler to record a delivery against an LPO.
pub async fn create_delivery(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewDelivery>,
) -> Result<(StatusCode, Json<Delivery>), ApiError> {
    let lpo_number = required("lpo_number", &payload.lpo_number)?;
    let quantity = positive("quantity", payload.quantity)?;
    let note_number = optional(payload.note_number);
    let driver = optional(payload.driver);

    let _write_guard = state.write_lock.lock().await;
    let delivery = with_store(&state, move |store| {
        let lpos = records::load::<Lpo>(store)?.records;
        let lpo = records::find(&lpos, &lpo_number)
            .ok_or_else(|| ApiError::NotFound(format!("LPO {lpo_number} not found")))?;
        if lpo.cancelled {
            return Err(ApiError::Conflict(format!("LPO {} is cancelled", lpo.number)));
        }

        let existing = records::load::<Delivery>(store)?.records;
        let delivery = Delivery {
            id: records::next_id(&existing).to_string(),
            lpo_number: lpo.number.clone(),
            date: payload.date,
            quantity,
            note_number,
            driver,
        };
        records::append(store, std::slice::from_ref(&delivery))?;
        Ok(delivery)
    })
    .await?;

    info!(id = %delivery.id, lpo = %delivery.lpo_number, quantity = %delivery.quantity, "recorded delivery");
    Ok((StatusCode::CREATED, Json(delivery)))
}
