use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use config::{Config, Environment};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_PORT: i64 = 3000;
pub const DEFAULT_UPDATE_INTERVAL_MS: i64 = 10_000;
pub const DEFAULT_SERVICE_COMMISSION: &str = "0.0001";
pub const DEFAULT_BINANCE_API_URL: &str = "https://api.binance.com";
pub const DEFAULT_METRICS_PORT: i64 = 9000;
pub const MIN_UPDATE_INTERVAL_MS: i64 = 1000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("PORT must be between 1 and 65535 (got {0})")]
    InvalidPort(i64),

    #[error("UPDATE_INTERVAL_MS must be at least 1000ms (got {0})")]
    IntervalTooShort(i64),

    #[error("SERVICE_COMMISSION must be a decimal number (got {0:?})")]
    InvalidCommission(String),

    #[error("SERVICE_COMMISSION must be between 0 and 1 (got {0})")]
    CommissionOutOfRange(Decimal),

    #[error("BINANCE_API_URL is required")]
    MissingUpstreamUrl,

    #[error("METRICS_PORT must be between 1 and 65535 (got {0})")]
    InvalidMetricsPort(i64),

    #[error("failed to read env file {path}: {source}")]
    EnvFile { path: String, source: dotenvy::Error },

    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

/// Raw values as read from the environment, before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub port: i64,
    pub update_interval_ms: i64,
    pub service_commission: String,
    pub binance_api_url: String,
    pub metrics_port: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            update_interval_ms: DEFAULT_UPDATE_INTERVAL_MS,
            service_commission: DEFAULT_SERVICE_COMMISSION.to_string(),
            binance_api_url: DEFAULT_BINANCE_API_URL.to_string(),
            metrics_port: DEFAULT_METRICS_PORT,
        }
    }
}

impl Settings {
    /// Defaults overlaid with `PORT`, `UPDATE_INTERVAL_MS`, `SERVICE_COMMISSION`,
    /// `BINANCE_API_URL` and `METRICS_PORT` from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(Environment::default())
    }

    /// Same as `from_env` but reads from the given map instead of the process.
    pub fn from_map(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::load(Environment::default().source(Some(vars)))
    }

    fn load(env: Environment) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("port", DEFAULT_PORT)?
            .set_default("update_interval_ms", DEFAULT_UPDATE_INTERVAL_MS)?
            .set_default("service_commission", DEFAULT_SERVICE_COMMISSION)?
            .set_default("binance_api_url", DEFAULT_BINANCE_API_URL)?
            .set_default("metrics_port", DEFAULT_METRICS_PORT)?
            .add_source(env)
            .build()?;
        Ok(s.try_deserialize()?)
    }
}

/// Validated, immutable process-wide configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub port: u16,
    pub update_interval_ms: u64,
    pub service_commission: Decimal,
    pub binance_api_url: String,
    pub metrics_port: u16,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::try_from(Settings::from_env()?)
    }
}

fn parse_commission(raw: &str) -> Result<Decimal, ConfigError> {
    let s = raw.trim();
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .map_err(|_| ConfigError::InvalidCommission(raw.to_string()))
}

fn parse_port(port: i64, err: fn(i64) -> ConfigError) -> Result<u16, ConfigError> {
    match u16::try_from(port) {
        Ok(p) if p >= 1 => Ok(p),
        _ => Err(err(port)),
    }
}

impl TryFrom<Settings> for ServiceConfig {
    type Error = ConfigError;

    fn try_from(s: Settings) -> Result<Self, Self::Error> {
        let port = parse_port(s.port, ConfigError::InvalidPort)?;

        if s.update_interval_ms < MIN_UPDATE_INTERVAL_MS {
            return Err(ConfigError::IntervalTooShort(s.update_interval_ms));
        }

        let service_commission = parse_commission(&s.service_commission)?;
        if service_commission < Decimal::ZERO || service_commission > Decimal::ONE {
            return Err(ConfigError::CommissionOutOfRange(service_commission));
        }

        let binance_api_url = s.binance_api_url.trim().trim_end_matches('/').to_string();
        if binance_api_url.is_empty() {
            return Err(ConfigError::MissingUpstreamUrl);
        }

        let metrics_port = parse_port(s.metrics_port, ConfigError::InvalidMetricsPort)?;

        Ok(Self {
            port,
            update_interval_ms: s.update_interval_ms as u64,
            service_commission,
            binance_api_url,
            metrics_port,
        })
    }
}

/// Load `.env` style variables into the process environment. An explicit
/// path must exist; the implicit `.env` is optional.
pub fn load_env_file(path: Option<&Path>) -> Result<(), ConfigError> {
    match path {
        Some(p) => dotenvy::from_path(p)
            .map_err(|source| ConfigError::EnvFile { path: p.display().to_string(), source }),
        None => {
            dotenvy::dotenv().ok();
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_defaults() {
        let cfg = ServiceConfig::try_from(Settings::from_map(HashMap::new()).unwrap()).unwrap();
        assert_eq!(cfg.port, 3000);
        assert_eq!(cfg.update_interval_ms, 10_000);
        assert_eq!(cfg.service_commission, Decimal::from_str("0.0001").unwrap());
        assert_eq!(cfg.binance_api_url, "https://api.binance.com");
        assert_eq!(cfg.metrics_port, 9000);
    }

    #[test]
    fn test_reads_environment_keys() {
        let settings = Settings::from_map(vars(&[
            ("PORT", "8080"),
            ("UPDATE_INTERVAL_MS", "2500"),
            ("SERVICE_COMMISSION", "0.002"),
            ("BINANCE_API_URL", "http://localhost:9999/"),
        ]))
        .unwrap();
        let cfg = ServiceConfig::try_from(settings).unwrap();

        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.update_interval_ms, 2500);
        assert_eq!(cfg.service_commission, Decimal::from_str("0.002").unwrap());
        assert_eq!(cfg.binance_api_url, "http://localhost:9999");
    }

    #[test]
    fn test_each_violation_has_its_own_error() {
        let base = Settings::default();

        let err = ServiceConfig::try_from(Settings { port: 0, ..base.clone() }).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPort(0)));

        let err = ServiceConfig::try_from(Settings { port: 70_000, ..base.clone() }).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPort(70_000)));
        assert_eq!(err.to_string(), "PORT must be between 1 and 65535 (got 70000)");

        let err = ServiceConfig::try_from(Settings { update_interval_ms: 500, ..base.clone() }).unwrap_err();
        assert!(matches!(err, ConfigError::IntervalTooShort(500)));

        let err = ServiceConfig::try_from(Settings { service_commission: "1.5".into(), ..base.clone() }).unwrap_err();
        assert!(matches!(err, ConfigError::CommissionOutOfRange(_)));
        assert_eq!(err.to_string(), "SERVICE_COMMISSION must be between 0 and 1 (got 1.5)");

        let err = ServiceConfig::try_from(Settings { service_commission: "-0.1".into(), ..base.clone() }).unwrap_err();
        assert!(matches!(err, ConfigError::CommissionOutOfRange(_)));

        let err = ServiceConfig::try_from(Settings { service_commission: "lots".into(), ..base.clone() }).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidCommission(_)));

        let err = ServiceConfig::try_from(Settings { binance_api_url: "".into(), ..base.clone() }).unwrap_err();
        assert!(matches!(err, ConfigError::MissingUpstreamUrl));
        assert_eq!(err.to_string(), "BINANCE_API_URL is required");
    }

    #[test]
    fn test_boundaries_are_accepted() {
        let base = Settings::default();
        for settings in [
            Settings { port: 1, ..base.clone() },
            Settings { port: 65_535, ..base.clone() },
            Settings { update_interval_ms: 1000, ..base.clone() },
            Settings { service_commission: "0".into(), ..base.clone() },
            Settings { service_commission: "1".into(), ..base.clone() },
            Settings { service_commission: "1e-4".into(), ..base.clone() },
        ] {
            assert!(ServiceConfig::try_from(settings.clone()).is_ok(), "{:?}", settings);
        }
    }

    #[test]
    fn test_non_numeric_port_fails_to_load() {
        let err = Settings::from_map(vars(&[("PORT", "http")])).unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
    }

    #[test]
    fn test_explicit_env_file_must_exist() {
        let err = load_env_file(Some(Path::new("/definitely/not/here.env"))).unwrap_err();
        assert!(matches!(err, ConfigError::EnvFile { .. }));
    }
}
