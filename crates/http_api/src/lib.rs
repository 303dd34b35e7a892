mod errors;
mod handlers;
mod middleware;
mod state;

use axum::{Router, middleware as axum_middleware, routing::get};

pub use errors::HttpError;
pub use state::HttpState;

pub fn router(state: HttpState) -> Router<()> {
    let api = Router::new()
        .route("/usage", get(handlers::usage))
        .route("/history", get(handlers::history))
        .route("/forecast", get(handlers::forecast))
        .route("/calibration", get(handlers::calibration))
        .route("/refresh", get(handlers::refresh))
        .route("/status", get(handlers::status))
        .route_layer(axum_middleware::from_fn(middleware::require_loopback_origin));

    Router::new().nest("/api", api).with_state(state)
}
