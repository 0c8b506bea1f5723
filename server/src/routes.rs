use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::log_requests::log_request_middleware;
use crate::rate_limit::RateLimiter;
use crate::{auth, players, stats, AppState};

async fn ping() -> &'static str {
    "pong"
}

fn cors_policy() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

pub fn build_router(state: AppState, rate_limiter: Option<RateLimiter>) -> Router {
    let mut api_routes = Router::new()
        .route("/api/create-account", post(auth::create_account))
        .route("/api/signin", post(auth::signin))
        .route(
            "/api/game-stats",
            post(stats::record_game_result).get(stats::missing_username),
        )
        .route("/api/game-stats/", get(stats::missing_username))
        .route("/api/game-stats/:username", get(stats::get_game_stats))
        .route("/api/combine/user", get(stats::missing_username))
        .route("/api/combine/user/", get(stats::missing_username))
        .route("/api/combine/user/:username", get(players::get_combined_user));

    if let Some(rate_limiter) = rate_limiter {
        api_routes = api_routes.layer(rate_limiter);
    }

    Router::new()
        .route("/ping", get(ping))
        .merge(api_routes)
        .layer(middleware::from_fn(log_request_middleware))
        .layer(cors_policy())
        .with_state(state)
}
