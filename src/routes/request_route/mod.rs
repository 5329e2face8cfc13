use axum::{
    Router, middleware,
    routing::{get, put},
};

use crate::{
    middleware::auth_jwt_middleware,
    routes::request_route::request::{
        delete_request, get_request, list_requests, update_request_status,
    },
    state::AppState,
};

pub mod request;

/// `/api/requests`
pub fn request_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(list_requests))
        .route("/{id}", get(get_request).delete(delete_request))
        .route("/{id}/status", put(update_request_status))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_jwt_middleware,
        ))
        .with_state(state)
}
