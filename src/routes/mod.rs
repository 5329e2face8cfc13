use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};

use crate::{errors::Result, state::AppState};

pub mod admin_panel;
pub mod auth_route;
pub mod donation_route;
pub mod request_route;

pub async fn root_route() -> Json<Value> {
    Json(json!({
        "message": "Surplus Share API is running",
        "status": "success",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn status_route(State(state): State<AppState>) -> Result<(StatusCode, Json<Value>)> {
    sqlx::query("SELECT 1").execute(&state.db).await?;
    Ok((
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "surplus-share",
            "database": "connected",
        })),
    ))
}
