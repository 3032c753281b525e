use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::RwLock;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::{debug, instrument};

use crate::market_data::adapters::QuoteSource;
use crate::market_data::normaliser::Normaliser;
use crate::market_data::types::{PricedSnapshot, RefreshError};

pub const FRESHNESS_WINDOW_MS: u64 = 15_000;

pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Owns the one cached snapshot. Refreshes replace it whole; readers get a
/// shared handle to an immutable value and never wait on the network.
pub struct PriceCache {
    source: Arc<dyn QuoteSource>,
    normaliser: Normaliser,
    slot: RwLock<Option<Arc<PricedSnapshot>>>,
}

impl PriceCache {
    pub fn new(source: Arc<dyn QuoteSource>, commission: Decimal) -> Self {
        Self { source, normaliser: Normaliser::new(commission), slot: RwLock::new(None) }
    }

    pub fn source(&self) -> &Arc<dyn QuoteSource> {
        &self.source
    }

    pub fn commission(&self) -> Decimal {
        self.normaliser.commission
    }

    /// Fetch, transform and install a new snapshot. On any error the
    /// previous snapshot stays in place.
    #[instrument(level = "debug", skip(self))]
    pub async fn refresh(&self) -> Result<Arc<PricedSnapshot>, RefreshError> {
        let outcome = self.fetch_and_price().await;
        let label = match &outcome {
            Ok(_) => "ok",
            Err(e) => e.kind().as_str(),
        };
        metrics::counter!("bbo_refresh_total", "outcome" => label).increment(1);

        let snapshot = Arc::new(outcome?);
        *self.slot.write() = Some(Arc::clone(&snapshot));

        if let Some(mid) = snapshot.mid_price.to_f64() {
            metrics::gauge!("bbo_mid_price").set(mid);
        }
        debug!(mid = %snapshot.mid_price, ts = snapshot.timestamp, "installed new snapshot");
        Ok(snapshot)
    }

    async fn fetch_and_price(&self) -> Result<PricedSnapshot, RefreshError> {
        let raw = self.source.fetch_quote().await?;
        let priced = self.normaliser.apply(&raw)?;
        Ok(PricedSnapshot {
            symbol: priced.symbol,
            bid_price: priced.bid,
            ask_price: priced.ask,
            mid_price: priced.mid,
            timestamp: now_ms(),
        })
    }

    pub fn current(&self) -> Option<Arc<PricedSnapshot>> {
        self.slot.read().clone()
    }

    /// Capture time of the cached snapshot, 0 if there is none.
    pub fn last_update_time(&self) -> u64 {
        self.slot.read().as_ref().map(|s| s.timestamp).unwrap_or(0)
    }

    pub fn is_fresh(&self, now_ms: u64) -> bool {
        match self.slot.read().as_ref() {
            Some(snap) => now_ms.saturating_sub(snap.timestamp) < FRESHNESS_WINDOW_MS,
            None => false,
        }
    }
}
