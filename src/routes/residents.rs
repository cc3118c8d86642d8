use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde_json::{json, Map, Value};

use crate::auth::require_admin;
use crate::error::{AppError, AppResult};
use crate::models::{Bill, Resident};
use crate::repository::residents as repo;
use crate::schemas::{
    clamp_limit, validate_input, CreateResidentInput, ResidentPath, ResidentsQuery,
    UpdateResidentInput, UpsertBillInput,
};
use crate::services::billing;
use crate::state::AppState;

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route(
            "/residents",
            axum::routing::get(list_residents).post(create_resident),
        )
        .route(
            "/residents/{resident_id}",
            axum::routing::get(get_resident)
                .put(update_resident)
                .delete(delete_resident),
        )
        .route(
            "/residents/{resident_id}/bills",
            axum::routing::post(upsert_bill),
        )
}

/// List residents with their bill histories. Public, as the login screen
/// needs the list before any session exists.
async fn list_residents(
    State(state): State<AppState>,
    Query(query): Query<ResidentsQuery>,
) -> AppResult<Json<Value>> {
    let pool = state.require_db()?;
    let residents = repo::list_residents(pool, clamp_limit(query.limit)).await?;
    Ok(Json(Value::Array(
        residents.iter().map(resident_view).collect(),
    )))
}

async fn get_resident(
    State(state): State<AppState>,
    Path(path): Path<ResidentPath>,
) -> AppResult<Json<Value>> {
    let pool = state.require_db()?;
    let resident = repo::get_resident(pool, path.resident_id).await?;
    Ok(Json(resident_view(&resident)))
}

async fn create_resident(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateResidentInput>,
) -> AppResult<impl IntoResponse> {
    require_admin(&state.sessions, &headers).await?;
    validate_input(&payload)?;

    let pool = state.require_db()?;
    let join_date = Utc::now().date_naive().to_string();
    let resident = repo::create_resident(pool, &payload, &join_date).await?;

    tracing::info!(resident = %resident.id, room = %resident.room, "Resident created");
    Ok((
        axum::http::StatusCode::CREATED,
        Json(resident_view(&resident)),
    ))
}

async fn update_resident(
    State(state): State<AppState>,
    Path(path): Path<ResidentPath>,
    headers: HeaderMap,
    Json(payload): Json<UpdateResidentInput>,
) -> AppResult<Json<Value>> {
    require_admin(&state.sessions, &headers).await?;
    if payload.is_empty() {
        return Err(AppError::BadRequest("No fields to update.".to_string()));
    }

    let pool = state.require_db()?;
    let resident = repo::update_resident(pool, path.resident_id, &payload).await?;
    Ok(Json(resident_view(&resident)))
}

async fn delete_resident(
    State(state): State<AppState>,
    Path(path): Path<ResidentPath>,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    require_admin(&state.sessions, &headers).await?;

    let pool = state.require_db()?;
    repo::delete_resident(pool, path.resident_id).await?;

    tracing::info!(resident = %path.resident_id, "Resident deleted (bills cascade)");
    Ok(axum::http::StatusCode::NO_CONTENT)
}

/// Create or update the bill for (resident, month, year) and return the
/// refreshed resident.
async fn upsert_bill(
    State(state): State<AppState>,
    Path(path): Path<ResidentPath>,
    headers: HeaderMap,
    Json(payload): Json<UpsertBillInput>,
) -> AppResult<Json<Value>> {
    require_admin(&state.sessions, &headers).await?;
    validate_input(&payload)?;

    let mut bill = payload.into_bill();
    let total = billing::bill_total(&bill);
    if bill.paid_amount > total {
        return Err(AppError::UnprocessableEntity(format!(
            "Paid amount ({}) cannot exceed the bill total ({total}).",
            bill.paid_amount
        )));
    }

    // Payment date follows the first recorded payment
    if bill.paid_amount > 0.0 {
        if bill.paid_date.is_none() {
            bill.paid_date = Some(Utc::now().date_naive().to_string());
        }
    } else {
        bill.paid_date = None;
    }

    let pool = state.require_db()?;
    // 404 before writing anything for an unknown resident
    repo::get_resident(pool, path.resident_id).await?;
    repo::upsert_bill(pool, path.resident_id, &bill).await?;

    let resident = repo::get_resident(pool, path.resident_id).await?;
    tracing::info!(
        resident = %resident.id,
        bill = %bill.key(),
        status = %billing::payment_status(&bill),
        "Bill recorded"
    );
    Ok(Json(resident_view(&resident)))
}

pub(crate) fn resident_view(resident: &Resident) -> Value {
    let mut object = match serde_json::to_value(resident) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };
    object.insert(
        "bills".to_string(),
        Value::Array(resident.bills.iter().map(bill_view).collect()),
    );
    object.insert(
        "pendingTotal".to_string(),
        json!(billing::total_pending(resident)),
    );
    Value::Object(object)
}

fn bill_view(bill: &Bill) -> Value {
    let mut object = match serde_json::to_value(bill) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };
    object.insert("total".to_string(), json!(billing::bill_total(bill)));
    object.insert(
        "pendingAmount".to_string(),
        json!(billing::pending_amount(bill)),
    );
    object.insert(
        "status".to_string(),
        json!(billing::payment_status(bill).as_str()),
    );
    Value::Object(object)
}

#[cfg(test)]
mod tests {
    use super::resident_view;
    use crate::models::{Bill, Resident};
    use serde_json::Value;
    use uuid::Uuid;

    #[test]
    fn views_carry_derived_billing_fields() {
        let resident = Resident {
            id: Uuid::new_v4(),
            name: "Priya Sharma".to_string(),
            room: "102".to_string(),
            phone: "9876543211".to_string(),
            email: Some("priya@example.com".to_string()),
            join_date: "2024-02-15".to_string(),
            bills: vec![Bill {
                month: "November".to_string(),
                year: 2024,
                rent: 5000.0,
                electricity: 650.0,
                food: 3500.0,
                other: 0.0,
                paid_amount: 4000.0,
                due_date: "2024-11-05".to_string(),
                paid_date: Some("2024-11-02".to_string()),
            }],
        };

        let view = resident_view(&resident);
        assert_eq!(view["pendingTotal"], Value::from(5150.0));

        let bill = &view["bills"][0];
        assert_eq!(bill["total"], Value::from(9150.0));
        assert_eq!(bill["pendingAmount"], Value::from(5150.0));
        assert_eq!(bill["status"], Value::from("partial"));
        assert_eq!(bill["paidAmount"], Value::from(4000.0));
    }
}
