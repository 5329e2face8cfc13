use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    db::users::{find_by_email, insert_user},
    errors::{Error, Result},
    middleware::UserId,
    models::{
        role::Role,
        user::{NewUser, UserProfile, UserSummary},
    },
    state::AppState,
    utils::{
        jwt::{Claims, encode_jwt},
        permission_context::create_context,
        pwd::{hash, verify_login},
        validated_form::ValidatedJson,
        validator::{validate_password, validate_phone, validate_username},
    },
};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignUpFormRequest {
    #[validate(custom(function = "validate_username"))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(custom(function = "validate_password"))]
    pub password: String,
    pub role: Role,
    #[validate(length(max = 120))]
    pub organization_name: Option<String>,
    #[validate(custom(function = "validate_phone"))]
    pub contact_number: Option<String>,
    #[validate(length(max = 255))]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignUpFormResponse {
    message: String,
    success: bool,
}

pub async fn sign_up(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<SignUpFormRequest>,
) -> Result<(StatusCode, Json<SignUpFormResponse>)> {
    let password_hash = hash(input.password.as_bytes())?;

    let user = insert_user(
        &state.db,
        NewUser {
            username: input.username.trim().to_string(),
            email: input.email.trim().to_lowercase(),
            password_hash,
            role: input.role,
            organization_name: non_empty(input.organization_name),
            contact_number: non_empty(input.contact_number),
            address: non_empty(input.address),
        },
    )
    .await?;

    tracing::info!(user_id = user.id, name = user.display_name(), role = %user.role, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(SignUpFormResponse {
            message: "User registered successfully".to_string(),
            success: true,
        }),
    ))
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignInFormRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignInFormResponse {
    access_token: String,
    user: UserSummary,
}

pub async fn sign_in(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<SignInFormRequest>,
) -> Result<(StatusCode, Json<SignInFormResponse>)> {
    let user = find_by_email(&state.db, &input.email.trim().to_lowercase())
        .await?
        .ok_or(Error::InvalidLoginDetails)?;
    verify_login(input.password.as_bytes(), &user.password_hash)?;

    let claims = Claims::new(user.id, user.role, state.config.jwt_ttl_hours);
    let access_token = encode_jwt(&claims, &state.config.jwt_secret)?;

    tracing::info!(user_id = user.id, "user signed in");
    Ok((
        StatusCode::OK,
        Json(SignInFormResponse {
            access_token,
            user: UserSummary::from(&user),
        }),
    ))
}

pub async fn profile(
    State(state): State<AppState>,
    UserId(id): UserId,
) -> Result<(StatusCode, Json<UserProfile>)> {
    let actor = create_context(&state.db, id).await?;
    Ok((StatusCode::OK, Json(UserProfile::from(&actor.user))))
}

pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
