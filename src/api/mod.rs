// HTTP surface over the price cache
use std::sync::Arc;

use crate::config::ServiceConfig;
use crate::market_data::PriceCache;

pub mod handlers;
pub mod routes;

pub use routes::create_router;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServiceConfig>,
    pub cache: Arc<PriceCache>,
}

impl AppState {
    pub fn new(config: Arc<ServiceConfig>, cache: Arc<PriceCache>) -> Self {
        Self { config, cache }
    }
}
