use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::{get, post},
};
use serde::Serialize;

use crate::{
    errors::Result,
    middleware::{UserId, auth_jwt_middleware},
    models::{
        report::{AdminStats, DonationReport},
        user::UserProfile,
    },
    state::AppState,
    utils::permission_context::create_context,
};

/// `/api/admin`
pub fn admin_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/stats", get(admin_stats))
        .route("/users/pending", get(pending_users))
        .route("/users/{id}/approve", post(approve_user))
        .route("/reports/donations", get(donation_report))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_jwt_middleware,
        ))
        .with_state(state)
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminStatsResponse {
    stats: AdminStats,
    success: bool,
}

pub async fn admin_stats(
    State(state): State<AppState>,
    UserId(id): UserId,
) -> Result<(StatusCode, Json<AdminStatsResponse>)> {
    let actor = create_context(&state.db, id).await?;
    let stats = state.ledger.admin_stats(&actor).await?;
    Ok((
        StatusCode::OK,
        Json(AdminStatsResponse {
            stats,
            success: true,
        }),
    ))
}

pub async fn pending_users(
    State(state): State<AppState>,
    UserId(id): UserId,
) -> Result<(StatusCode, Json<Vec<UserProfile>>)> {
    let actor = create_context(&state.db, id).await?;
    let users = state.ledger.pending_users(&actor).await?;
    Ok((
        StatusCode::OK,
        Json(users.iter().map(UserProfile::from).collect()),
    ))
}

#[derive(Debug, Clone, Serialize)]
pub struct ApproveUserResponse {
    message: String,
    user: UserProfile,
    success: bool,
}

pub async fn approve_user(
    State(state): State<AppState>,
    UserId(id): UserId,
    Path(user_id): Path<i64>,
) -> Result<(StatusCode, Json<ApproveUserResponse>)> {
    let actor = create_context(&state.db, id).await?;
    let user = state.ledger.approve_user(&actor, user_id).await?;
    Ok((
        StatusCode::OK,
        Json(ApproveUserResponse {
            message: "User approved successfully".to_string(),
            user: UserProfile::from(&user),
            success: true,
        }),
    ))
}

#[derive(Debug, Clone, Serialize)]
pub struct DonationReportResponse {
    report: DonationReport,
    success: bool,
}

pub async fn donation_report(
    State(state): State<AppState>,
    UserId(id): UserId,
) -> Result<(StatusCode, Json<DonationReportResponse>)> {
    let actor = create_context(&state.db, id).await?;
    let report = state.ledger.donation_report(&actor).await?;
    Ok((
        StatusCode::OK,
        Json(DonationReportResponse {
            report,
            success: true,
        }),
    ))
}
