use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::{handlers, AppState};

pub fn create_router(state: AppState) -> Router {
    // Known paths hit with the wrong method get the same 404 as unknown paths.
    Router::new()
        .route("/health", get(handlers::health).fallback(handlers::not_found))
        .route("/price", get(handlers::get_price).fallback(handlers::not_found))
        .route("/price/update", post(handlers::force_update).fallback(handlers::not_found))
        .route("/config", get(handlers::get_config).fallback(handlers::not_found))
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
