// Shared trait + error taxonomy for upstream quote sources

use std::time::Duration;

use thiserror::Error;

/// Best bid/ask as the upstream sent it. Prices are still text and have not
/// been validated; the normaliser owns that step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawQuote {
    pub symbol: String,
    pub bid_price: String,
    pub ask_price: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkFailure {
    Timeout(Duration),
    Unreachable(String),
}

impl std::fmt::Display for NetworkFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetworkFailure::Timeout(after) => write!(f, "request timed out after {}ms", after.as_millis()),
            NetworkFailure::Unreachable(msg) => write!(f, "unable to reach upstream: {}", msg),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// No response was received.
    #[error("Network error: {0}")]
    Network(NetworkFailure),

    /// Upstream answered with a non-success status.
    #[error("Upstream API error: {status} - {reason}")]
    Upstream { status: u16, reason: String },

    /// Upstream answered 2xx but the body was empty or not a ticker.
    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl FetchError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Network(NetworkFailure::Timeout(_)))
    }
}

#[async_trait::async_trait]
pub trait QuoteSource: Send + Sync {
    /// One request for the configured symbol. No retries.
    async fn fetch_quote(&self) -> Result<RawQuote, FetchError>;

    /// Reachability check. Never fails; any error collapses to `false`.
    async fn probe(&self) -> bool;
}

pub mod binance;
pub mod binance_types;

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted source: pops one outcome per fetch, repeating the last one
    /// once the script runs out.
    pub struct ScriptedSource {
        script: Mutex<VecDeque<Result<RawQuote, FetchError>>>,
        last: Mutex<Option<Result<RawQuote, FetchError>>>,
        pub calls: AtomicUsize,
    }

    impl ScriptedSource {
        pub fn new(script: Vec<Result<RawQuote, FetchError>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                last: Mutex::new(None),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    pub fn quote(bid: &str, ask: &str) -> RawQuote {
        RawQuote { symbol: "BTCUSDT".into(), bid_price: bid.into(), ask_price: ask.into() }
    }

    #[async_trait::async_trait]
    impl QuoteSource for ScriptedSource {
        async fn fetch_quote(&self) -> Result<RawQuote, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self.script.lock().pop_front();
            let mut last = self.last.lock();
            match next {
                Some(outcome) => {
                    *last = Some(outcome.clone());
                    outcome
                }
                None => last
                    .clone()
                    .unwrap_or_else(|| Err(FetchError::Protocol("script exhausted".into()))),
            }
        }

        async fn probe(&self) -> bool {
            true
        }
    }
}
