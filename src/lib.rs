use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::get,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    config::Config,
    routes::{
        admin_panel::admin_router,
        auth_route::{auth_router, users_router},
        donation_route::donation_router,
        request_route::request_router,
        root_route, status_route,
    },
    state::AppState,
};

pub mod config;
pub mod consts;
pub mod db;
pub mod errors;
pub mod ledger;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
pub mod utils;

/// Builds the whole HTTP surface once; nothing is mounted after this returns.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/", get(root_route))
        .route("/status", get(status_route))
        .nest("/api/auth", auth_router(state.clone()))
        .nest("/api/users", users_router(state.clone()))
        .nest("/api/donations", donation_router(state.clone()))
        .nest("/api/requests", request_router(state.clone()))
        .nest("/api/admin", admin_router(state.clone()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin `{origin}`");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}
