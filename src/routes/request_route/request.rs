use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    errors::Result,
    middleware::UserId,
    models::request::{DonationRequest, RequestView},
    state::AppState,
    utils::{permission_context::create_context, validated_form::ValidatedJson},
};

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateRequestBody {
    #[serde(default)]
    #[validate(length(max = 1000))]
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateRequestResponse {
    message: String,
    id: i64,
    success: bool,
}

pub async fn create_request(
    State(state): State<AppState>,
    UserId(id): UserId,
    Path(donation_id): Path<i64>,
    body: Option<ValidatedJson<CreateRequestBody>>,
) -> Result<(StatusCode, Json<CreateRequestResponse>)> {
    let actor = create_context(&state.db, id).await?;
    let body = body.map(|ValidatedJson(body)| body).unwrap_or_default();

    let request = state
        .ledger
        .create_request(&actor, donation_id, body.message)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateRequestResponse {
            message: "Request submitted successfully".to_string(),
            id: request.id,
            success: true,
        }),
    ))
}

pub async fn list_requests(
    State(state): State<AppState>,
    UserId(id): UserId,
) -> Result<(StatusCode, Json<Vec<RequestView>>)> {
    let actor = create_context(&state.db, id).await?;
    let requests = state.ledger.list_requests(&actor).await?;
    Ok((StatusCode::OK, Json(requests)))
}

pub async fn get_request(
    State(state): State<AppState>,
    UserId(id): UserId,
    Path(request_id): Path<i64>,
) -> Result<(StatusCode, Json<RequestView>)> {
    let actor = create_context(&state.db, id).await?;
    let request = state.ledger.get_request(&actor, request_id).await?;
    Ok((StatusCode::OK, Json(request)))
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateStatusBody {
    #[validate(length(min = 1))]
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateStatusResponse {
    message: String,
    request: DonationRequest,
    success: bool,
}

pub async fn update_request_status(
    State(state): State<AppState>,
    UserId(id): UserId,
    Path(request_id): Path<i64>,
    ValidatedJson(body): ValidatedJson<UpdateStatusBody>,
) -> Result<(StatusCode, Json<UpdateStatusResponse>)> {
    let actor = create_context(&state.db, id).await?;
    let request = state
        .ledger
        .update_request_status(&actor, request_id, &body.status)
        .await?;

    Ok((
        StatusCode::OK,
        Json(UpdateStatusResponse {
            message: format!("Request {}", request.status),
            request,
            success: true,
        }),
    ))
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteRequestResponse {
    message: String,
    success: bool,
}

pub async fn delete_request(
    State(state): State<AppState>,
    UserId(id): UserId,
    Path(request_id): Path<i64>,
) -> Result<(StatusCode, Json<DeleteRequestResponse>)> {
    let actor = create_context(&state.db, id).await?;
    state.ledger.delete_request(&actor, request_id).await?;

    Ok((
        StatusCode::OK,
        Json(DeleteRequestResponse {
            message: "Request deleted successfully".to_string(),
            success: true,
        }),
    ))
}
