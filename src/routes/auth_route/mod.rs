use std::{sync::Arc, time::Duration};
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor,
};

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::{
    config::Config,
    middleware::auth_jwt_middleware,
    routes::auth_route::{
        modify_user::{update_profile, user_stats},
        user::{profile, sign_in, sign_up},
    },
    state::AppState,
};

pub mod modify_user;
pub mod user;

/// `/api/auth`: registration and login are open (and rate limited), profile needs a bearer token.
pub fn auth_router(state: AppState) -> Router<AppState> {
    let unprotected = Router::new()
        .route("/register", post(sign_up))
        .route("/login", post(sign_in));

    let protected = Router::new()
        .route("/profile", get(profile))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_jwt_middleware,
        ));

    Router::new()
        .merge(rate_limited(unprotected, &state.config))
        .merge(protected)
        .with_state(state)
}

/// `/api/users`
pub fn users_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/profile", put(update_profile))
        .route("/stats", get(user_stats))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_jwt_middleware,
        ))
        .with_state(state)
}

fn rate_limited(router: Router<AppState>, config: &Config) -> Router<AppState> {
    if config.auth_rate_limit_burst == 0 {
        tracing::info!("auth rate limiting disabled");
        return router;
    }

    let Some(governor_conf) = GovernorConfigBuilder::default()
        .period(Duration::from_secs(config.auth_rate_limit_period_secs.max(1)))
        .burst_size(config.auth_rate_limit_burst)
        .key_extractor(SmartIpKeyExtractor)
        .finish()
    else {
        tracing::warn!("invalid rate limit settings, auth routes are not limited");
        return router;
    };
    let governor_conf = Arc::new(governor_conf);

    let governor_limiter = governor_conf.limiter().clone();
    let interval = Duration::from_secs(60);
    // a separate background task to clean up
    std::thread::spawn(move || {
        loop {
            std::thread::sleep(interval);
            tracing::info!("rate limiting storage size: {}", governor_limiter.len());
            governor_limiter.retain_recent();
        }
    });

    router.layer(GovernorLayer::new(governor_conf))
}
