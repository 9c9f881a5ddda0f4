use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use opsledger_core::{
    analyze_debts, low_stock, petty_cash, replay, schedule, track, CashEntry, Delivery, Invoice,
    Item, Lpo, Slot, Transfer,
};
use opsledger_sheets::records;
use rust_decimal::Decimal;
use tracing::debug;

use super::{today, with_store, AppState};
use crate::models::{AsOfQuery, Dashboard};
use crate::ApiError;

/// Handler for the headline numbers shown on the landing page.
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AsOfQuery>,
) -> Result<Json<Dashboard>, ApiError> {
    let as_of = query.as_of.unwrap_or_else(today);
    let dashboard = with_store(&state, move |store| {
        let items = records::load::<Item>(store)?;
        let transfers = records::load::<Transfer>(store)?;
        let invoices = records::load::<Invoice>(store)?;
        let cash = records::load::<CashEntry>(store)?;
        let lpos = records::load::<Lpo>(store)?;
        let deliveries = records::load::<Delivery>(store)?;
        let slots = records::load::<Slot>(store)?;

        let stock = replay(&items.records, &transfers.records);
        let debts = analyze_debts(&invoices.records, as_of);
        let cash_balance = petty_cash::running_balance(&cash.records, Decimal::ZERO)
            .last()
            .map_or(Decimal::ZERO, |line| line.balance);
        let lpo_report = track(&lpos.records, &deliveries.records, as_of);

        let warnings = items.warnings.len()
            + transfers.warnings.len()
            + invoices.warnings.len()
            + cash.warnings.len()
            + lpos.warnings.len()
            + deliveries.warnings.len()
            + slots.warnings.len();

        Ok(Dashboard {
            as_of,
            items: items.records.len(),
            low_stock: low_stock(&stock.levels).len(),
            negative_stock: stock
                .levels
                .iter()
                .filter(|l| l.on_hand < Decimal::ZERO)
                .count(),
            outstanding_debt: debts.total_outstanding,
            overdue_debt: debts.totals.overdue(),
            petty_cash_balance: cash_balance,
            open_lpos: lpo_report.open_count(),
            slots_today: schedule::day_plan(&slots.records, as_of).len(),
            schedule_conflicts: schedule::conflicts(&slots.records).len(),
            warnings,
        })
    })
    .await?;

    debug!(?dashboard, "built dashboard");
    Ok(Json(dashboard))
}
