use rust_decimal::Decimal;
use thiserror::Error;

use crate::market_data::adapters::FetchError;

/// The single cached, commission-adjusted quote.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricedSnapshot {
    pub symbol: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub bid_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub ask_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub mid_price: Decimal,
    pub timestamp: u64, // ms since epoch, taken when the transform completed
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Upstream,
    Protocol,
    InvalidData,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Network => "network",
            ErrorKind::Upstream => "upstream",
            ErrorKind::Protocol => "protocol",
            ErrorKind::InvalidData => "invalid_data",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Invalid price data received from upstream: {field} = {value:?}")]
    InvalidData { field: &'static str, value: String },
}

impl RefreshError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RefreshError::Fetch(FetchError::Network(_)) => ErrorKind::Network,
            RefreshError::Fetch(FetchError::Upstream { .. }) => ErrorKind::Upstream,
            RefreshError::Fetch(FetchError::Protocol(_)) => ErrorKind::Protocol,
            RefreshError::InvalidData { .. } => ErrorKind::InvalidData,
        }
    }
}
