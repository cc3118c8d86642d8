use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde_json::{json, Value};

use crate::auth::require_admin;
use crate::error::AppResult;
use crate::repository::residents as repo;
use crate::services::billing;
use crate::state::AppState;

pub fn router() -> axum::Router<AppState> {
    axum::Router::new().route(
        "/reports/dashboard",
        axum::routing::get(dashboard_summary),
    )
}

/// Aggregate figures for the admin dashboard: headcount, occupancy against
/// the configured capacity, money collected and outstanding, and the
/// per-resident dues breakdown.
async fn dashboard_summary(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<Value>> {
    require_admin(&state.sessions, &headers).await?;

    let pool = state.require_db()?;
    let residents = repo::list_residents(pool, 500).await?;

    let max_capacity = state.config.max_capacity.max(1);
    let occupancy_rate = residents.len() as f64 / f64::from(max_capacity) * 100.0;

    let mut dues = residents
        .iter()
        .filter(|resident| billing::has_dues(resident))
        .map(|resident| {
            json!({
                "id": resident.id,
                "name": resident.name,
                "room": resident.room,
                "pendingTotal": billing::total_pending(resident),
            })
        })
        .collect::<Vec<_>>();
    dues.sort_by(|a, b| {
        let a_pending = a["pendingTotal"].as_f64().unwrap_or(0.0);
        let b_pending = b["pendingTotal"].as_f64().unwrap_or(0.0);
        b_pending.total_cmp(&a_pending)
    });

    Ok(Json(json!({
        "totalResidents": residents.len(),
        "maxCapacity": max_capacity,
        "roomsAvailable": i64::from(max_capacity) - residents.len() as i64,
        "occupancyRate": (occupancy_rate * 10.0).round() / 10.0,
        "totalPending": billing::total_pending_across(&residents),
        "totalCollected": billing::total_collected_across(&residents),
        "residentsWithDues": dues.len(),
        "dues": dues,
    })))
}
