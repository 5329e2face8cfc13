use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::consts::auth_const::BEARER_SCHEME;
use crate::errors::{Error, Result as RResult};
use crate::state::AppState;
use crate::utils::jwt::decode_jwt;

#[derive(Debug, Clone, Copy)]
pub struct UserId(pub i64);

pub async fn auth_jwt_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<impl IntoResponse, Response> {
    let request = authenticate(&state, request)?;

    Ok(next.run(request).await)
}

fn authenticate<B>(state: &AppState, request: axum::http::Request<B>) -> Result<axum::http::Request<B>, Response> {
    let (mut parts, body) = request.into_parts();
    let user_id = check_auth_parts(&parts, &state.config.jwt_secret)
        .map_err(IntoResponse::into_response)?;

    parts.extensions.insert(user_id);

    Ok(axum::http::Request::from_parts(parts, body))
}

fn check_auth_parts(parts: &Parts, secret: &str) -> RResult<UserId> {
    let header_value = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or(Error::MissingToken)?
        .to_str()
        .map_err(|_| Error::InvalidToken)?;

    let mut parts = header_value.trim().splitn(2, ' ');

    let scheme = parts.next().ok_or(Error::MissingToken)?;
    let token = parts.next().map(str::trim).ok_or(Error::MissingToken)?;

    if scheme != BEARER_SCHEME {
        tracing::warn!("Invalid auth scheme: {scheme}");
        return Err(Error::InvalidScheme);
    }

    decode_jwt(token, secret).map(|data| UserId(data.claims.sub))
}

impl<S> FromRequestParts<S> for UserId
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> RResult<Self> {
        parts
            .extensions
            .get::<UserId>()
            .copied()
            .ok_or(Error::MissingToken)
    }
}
