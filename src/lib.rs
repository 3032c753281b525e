//! Republishes an exchange's best bid/ask for one symbol with a commission
//! markup applied, refreshed in the background and served over HTTP.
//!
//! - `market_data`: upstream fetcher, commission transform, snapshot cache, poller
//! - `api`: axum routes over the cache
//! - `config`: environment-driven settings and their validation
//! - `telemetry`: tracing and metrics setup

pub mod api;
pub mod config;
pub mod market_data;
pub mod telemetry;
