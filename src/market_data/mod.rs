// Market data module entrypoint
pub mod adapters;     // upstream fetchers (e.g. Binance)
pub mod normaliser;   // converts strings -> commission-adjusted decimals
pub mod poller;       // background refresh loop
pub mod price_cache;  // single-slot snapshot cache
pub mod types;

pub use adapters::{FetchError, NetworkFailure, QuoteSource, RawQuote};
pub use poller::{PollerHandle, PricePoller};
pub use price_cache::PriceCache;
pub use types::{ErrorKind, PricedSnapshot, RefreshError};
