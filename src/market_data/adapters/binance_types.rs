// Source: GET /api/v3/ticker/bookTicker?symbol=<SYMBOL>
use super::RawQuote;

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookTicker {
    pub symbol: String,
    pub bid_price: String, // price string, e.g. "50000.01000000"
    pub bid_qty: String,
    pub ask_price: String,
    pub ask_qty: String,
}

impl From<BookTicker> for RawQuote {
    fn from(t: BookTicker) -> Self {
        RawQuote { symbol: t.symbol, bid_price: t.bid_price, ask_price: t.ask_price }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_book_ticker() {
        let body = r#"{"symbol":"BTCUSDT","bidPrice":"50000.00000000","bidQty":"1.20000000","askPrice":"50010.00000000","askQty":"0.50000000"}"#;
        let ticker: BookTicker = serde_json::from_str(body).unwrap();
        assert_eq!(ticker.bid_qty, "1.20000000");

        let quote = RawQuote::from(ticker);
        assert_eq!(quote.symbol, "BTCUSDT");
        assert_eq!(quote.bid_price, "50000.00000000");
        assert_eq!(quote.ask_price, "50010.00000000");
    }

    #[test]
    fn test_missing_field_is_rejected() {
        let body = r#"{"symbol":"BTCUSDT","bidPrice":"1"}"#;
        assert!(serde_json::from_str::<BookTicker>(body).is_err());
    }
}
