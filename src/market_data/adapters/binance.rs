// Binance REST adapter: best bid/ask for a single symbol plus a liveness ping

use std::time::Duration;

use tracing::{debug, instrument};

use super::binance_types::BookTicker;
use super::{FetchError, NetworkFailure, QuoteSource, RawQuote};

pub const DEFAULT_SYMBOL: &str = "BTCUSDT";
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

pub struct BinanceClient {
    pub base_url: String, // e.g. "https://api.binance.com"
    pub symbol: String,   // e.g. "BTCUSDT"
    fetch_timeout: Duration,
    probe_timeout: Duration,
    client: reqwest::Client,
}

impl BinanceClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            symbol: DEFAULT_SYMBOL.to_string(),
            fetch_timeout: FETCH_TIMEOUT,
            probe_timeout: PROBE_TIMEOUT,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_symbol(mut self, symbol: &str) -> Self {
        self.symbol = symbol.to_string();
        self
    }

    pub fn with_timeouts(mut self, fetch: Duration, probe: Duration) -> Self {
        self.fetch_timeout = fetch;
        self.probe_timeout = probe;
        self
    }

    fn ticker_url(&self) -> String {
        format!("{}/api/v3/ticker/bookTicker", self.base_url)
    }

    fn ping_url(&self) -> String {
        format!("{}/api/v3/ping", self.base_url)
    }

    // Anything that went wrong before a status line arrived, or while the body was streaming.
    fn transport_error(&self, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Network(NetworkFailure::Timeout(self.fetch_timeout))
        } else {
            FetchError::Network(NetworkFailure::Unreachable(e.to_string()))
        }
    }
}

#[async_trait::async_trait]
impl QuoteSource for BinanceClient {
    #[instrument(skip(self), fields(symbol = %self.symbol))]
    async fn fetch_quote(&self) -> Result<RawQuote, FetchError> {
        let res = self
            .client
            .get(self.ticker_url())
            .query(&[("symbol", self.symbol.as_str())])
            .timeout(self.fetch_timeout)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = res.status();
        if !status.is_success() {
            return Err(FetchError::Upstream {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
            });
        }

        let body = res.bytes().await.map_err(|e| self.transport_error(e))?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(FetchError::Protocol("empty response from upstream".into()));
        }

        let ticker: BookTicker = serde_json::from_slice(&body)
            .map_err(|e| FetchError::Protocol(format!("malformed ticker body: {}", e)))?;
        debug!(bid = %ticker.bid_price, ask = %ticker.ask_price, "fetched book ticker");
        Ok(ticker.into())
    }

    async fn probe(&self) -> bool {
        match self.client.get(self.ping_url()).timeout(self.probe_timeout).send().await {
            Ok(res) => res.status().is_success(),
            Err(e) => {
                debug!(error = %e, "upstream ping failed");
                false
            }
        }
    }
}
