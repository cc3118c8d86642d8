use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::{json, Value};

use crate::auth::{
    require_session, session_token_from_headers, verify_admin_credentials, Role, Session,
};
use crate::error::{AppError, AppResult};
use crate::repository::residents::get_resident;
use crate::schemas::{validate_input, AdminLoginInput, ResidentLoginInput};
use crate::state::AppState;

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/auth/login", axum::routing::post(admin_login))
        .route(
            "/auth/resident-login",
            axum::routing::post(resident_login),
        )
        .route("/auth/logout", axum::routing::post(logout))
        .route("/me", axum::routing::get(me))
}

/// Admin login against the configured credential pair.
async fn admin_login(
    State(state): State<AppState>,
    Json(payload): Json<AdminLoginInput>,
) -> AppResult<Json<Value>> {
    validate_input(&payload)?;

    if !verify_admin_credentials(&state.config, &payload.username, &payload.password) {
        return Err(AppError::Unauthorized(
            "Incorrect username or password.".to_string(),
        ));
    }

    let session = Session {
        user_id: state.config.admin_username.clone(),
        role: Role::Admin,
        name: state.config.admin_name.clone(),
        room: None,
    };
    let token = state.sessions.issue(session.clone()).await;

    tracing::info!(user = %session.user_id, "Admin logged in");
    Ok(Json(json!({
        "token": token,
        "user": session_view(&session),
    })))
}

/// Resident login: the resident picks their own record from the public
/// list, so the only check is that the id exists.
async fn resident_login(
    State(state): State<AppState>,
    Json(payload): Json<ResidentLoginInput>,
) -> AppResult<Json<Value>> {
    let pool = state.require_db()?;
    let resident = get_resident(pool, payload.resident_id).await?;

    let session = Session {
        user_id: resident.id.to_string(),
        role: Role::Resident,
        name: resident.name.clone(),
        room: Some(resident.room.clone()),
    };
    let token = state.sessions.issue(session.clone()).await;

    tracing::info!(resident = %resident.id, "Resident logged in");
    Ok(Json(json!({
        "token": token,
        "user": session_view(&session),
    })))
}

async fn logout(State(state): State<AppState>, headers: HeaderMap) -> AppResult<impl IntoResponse> {
    let raw_token = session_token_from_headers(&headers)?;
    state.sessions.revoke(raw_token).await;
    Ok((
        axum::http::StatusCode::OK,
        Json(json!({ "message": "Logged out." })),
    ))
}

async fn me(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Json<Value>> {
    let session = require_session(&state.sessions, &headers).await?;
    Ok(Json(session_view(&session)))
}

fn session_view(session: &Session) -> Value {
    json!({
        "id": session.user_id,
        "role": session.role.as_str(),
        "name": session.name,
        "room": session.room,
    })
}
