use axum::{extract::State, http::StatusCode, response::Json};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::warn;

use super::AppState;
use crate::market_data::price_cache::now_ms;
use crate::market_data::types::PricedSnapshot;

pub const AVAILABLE_ROUTES: [&str; 4] = ["/health", "/price", "/price/update", "/config"];
pub const NO_PRICE_YET: &str = "No price data available. Service may be starting up.";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: u64,
    pub binance_api: &'static str,
}

#[derive(Debug, Serialize)]
pub struct PriceResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<PricedSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: u64,
}

impl PriceResponse {
    fn ok(data: PricedSnapshot) -> Self {
        Self { success: true, data: Some(data), error: None, timestamp: now_ms() }
    }

    fn failed(error: String) -> Self {
        Self { success: false, data: None, error: Some(error), timestamp: now_ms() }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigResponse {
    pub port: u16,
    pub update_interval_ms: u64,
    #[serde(with = "rust_decimal::serde::float")]
    pub service_commission: Decimal,
    pub binance_api_url: String,
    pub last_update_time: u64,
    pub is_price_fresh: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotFoundResponse {
    pub error: &'static str,
    pub available_routes: [&'static str; 4],
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let reachable = state.cache.source().probe().await;
    let (code, status, binance_api) = if reachable {
        (StatusCode::OK, "healthy", "connected")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy", "disconnected")
    };
    (code, Json(HealthResponse { status, timestamp: now_ms(), binance_api }))
}

pub async fn get_price(State(state): State<AppState>) -> (StatusCode, Json<PriceResponse>) {
    match state.cache.current() {
        Some(snap) => (StatusCode::OK, Json(PriceResponse::ok((*snap).clone()))),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(PriceResponse::failed(NO_PRICE_YET.to_string())),
        ),
    }
}

pub async fn force_update(State(state): State<AppState>) -> (StatusCode, Json<PriceResponse>) {
    match state.cache.refresh().await {
        Ok(snap) => (StatusCode::OK, Json(PriceResponse::ok((*snap).clone()))),
        Err(e) => {
            warn!(kind = e.kind().as_str(), error = %e, "Forced price update failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(PriceResponse::failed(e.to_string())))
        }
    }
}

pub async fn get_config(State(state): State<AppState>) -> Json<ConfigResponse> {
    let cfg = &state.config;
    Json(ConfigResponse {
        port: cfg.port,
        update_interval_ms: cfg.update_interval_ms,
        service_commission: cfg.service_commission,
        binance_api_url: cfg.binance_api_url.clone(),
        last_update_time: state.cache.last_update_time(),
        is_price_fresh: state.cache.is_fresh(now_ms()),
    })
}

pub async fn not_found() -> (StatusCode, Json<NotFoundResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(NotFoundResponse { error: "Route not found", available_routes: AVAILABLE_ROUTES }),
    )
}
