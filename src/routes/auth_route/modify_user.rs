use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    db::users::update_profile as store_profile,
    errors::Result,
    middleware::UserId,
    models::{report::UserStats, user::{ProfileChanges, UserProfile}},
    routes::auth_route::user::non_empty,
    state::AppState,
    utils::{
        permission_context::create_context, validated_form::ValidatedJson,
        validator::validate_phone,
    },
};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(max = 120))]
    pub organization_name: Option<String>,
    #[validate(custom(function = "validate_phone"))]
    pub contact_number: Option<String>,
    #[validate(length(max = 255))]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateProfileResponse {
    message: String,
    user: UserProfile,
    success: bool,
}

pub async fn update_profile(
    State(state): State<AppState>,
    UserId(id): UserId,
    ValidatedJson(input): ValidatedJson<UpdateProfileRequest>,
) -> Result<(StatusCode, Json<UpdateProfileResponse>)> {
    let actor = create_context(&state.db, id).await?;
    let user = store_profile(
        &state.db,
        actor.user.id,
        ProfileChanges {
            organization_name: non_empty(input.organization_name),
            contact_number: non_empty(input.contact_number),
            address: non_empty(input.address),
        },
    )
    .await?;

    Ok((
        StatusCode::OK,
        Json(UpdateProfileResponse {
            message: "Profile updated successfully".to_string(),
            user: UserProfile::from(&user),
            success: true,
        }),
    ))
}

#[derive(Debug, Clone, Serialize)]
pub struct UserStatsResponse {
    stats: UserStats,
    success: bool,
}

pub async fn user_stats(
    State(state): State<AppState>,
    UserId(id): UserId,
) -> Result<(StatusCode, Json<UserStatsResponse>)> {
    let actor = create_context(&state.db, id).await?;
    let stats = state.ledger.user_stats(&actor).await?;
    Ok((
        StatusCode::OK,
        Json(UserStatsResponse {
            stats,
            success: true,
        }),
    ))
}
