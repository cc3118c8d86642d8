use axum::routing::get;
use axum::Router;

use crate::state::AppState;

pub mod auth;
pub mod health;
pub mod reports;
pub mod residents;

pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .merge(auth::router())
        .merge(residents::router())
        .merge(reports::router())
}
