use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::{
    middleware::auth_jwt_middleware,
    routes::{
        donation_route::donation::{create_donation, get_donation, list_donations},
        request_route::request::create_request,
    },
    state::AppState,
};

pub mod donation;
pub mod payload;

/// `/api/donations`
pub fn donation_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", post(create_donation).get(list_donations))
        .route("/{id}", get(get_donation))
        .route("/{id}/request", post(create_request))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_jwt_middleware,
        ))
        .with_state(state)
}
