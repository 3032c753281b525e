// Convert wire strings into commission-adjusted prices.
// Exact decimal arithmetic, rounded once per output field.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::market_data::adapters::RawQuote;
use crate::market_data::types::RefreshError;

pub const PRICE_DECIMALS: u32 = 8;

/// Prices after the commission transform, before a timestamp is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedQuote {
    pub symbol: String,
    pub bid: Decimal,
    pub ask: Decimal,
    pub mid: Decimal,
}

pub struct Normaliser {
    pub commission: Decimal, // fraction in [0, 1], e.g. 0.0001 => 1bp
}

/// Round half away from zero to `PRICE_DECIMALS` places.
pub fn round_price(px: Decimal) -> Decimal {
    px.round_dp_with_strategy(PRICE_DECIMALS, RoundingStrategy::MidpointAwayFromZero)
}

// from_str alone also takes "1e3", "5_000", "+1" and "1."
fn is_plain_decimal(s: &str) -> bool {
    let (int, frac) = match s.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (s, None),
    };
    let digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
    digits(int) && frac.map_or(true, digits)
}

impl Normaliser {
    pub fn new(commission: Decimal) -> Self {
        Self { commission }
    }

    /// Strict parse: `digits` or `digits.digits`, nothing else.
    pub fn parse_price(field: &'static str, s: &str) -> Result<Decimal, RefreshError> {
        let invalid = || RefreshError::InvalidData { field, value: s.to_string() };
        if !is_plain_decimal(s) {
            return Err(invalid());
        }
        Decimal::from_str(s).map_err(|_| invalid())
    }

    pub fn apply(&self, raw: &RawQuote) -> Result<PricedQuote, RefreshError> {
        let bid_raw = Self::parse_price("bidPrice", &raw.bid_price)?;
        let ask_raw = Self::parse_price("askPrice", &raw.ask_price)?;

        // bid is pushed down, ask is pushed up
        let bid = bid_raw
            .checked_mul(Decimal::ONE - self.commission)
            .ok_or_else(|| RefreshError::InvalidData { field: "bidPrice", value: raw.bid_price.clone() })?;
        let ask = ask_raw
            .checked_mul(Decimal::ONE + self.commission)
            .ok_or_else(|| RefreshError::InvalidData { field: "askPrice", value: raw.ask_price.clone() })?;
        let mid = bid
            .checked_add(ask)
            .and_then(|sum| sum.checked_div(Decimal::TWO))
            .ok_or_else(|| RefreshError::InvalidData {
                field: "midPrice",
                value: format!("({} + {}) / 2", raw.bid_price, raw.ask_price),
            })?;

        Ok(PricedQuote {
            symbol: raw.symbol.clone(),
            bid: round_price(bid),
            ask: round_price(ask),
            mid: round_price(mid),
        })
    }
}
