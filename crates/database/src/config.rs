//! Runtime configuration.

use crate::error::{Error, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;

/// Price above which a part counts as expensive in the quantified customer query.
pub const DEFAULT_PRICE_THRESHOLD: Decimal = Decimal::ONE_HUNDRED;

/// Warehouse that expensive parts must exclusively ship from.
pub const DEFAULT_RESTRICTED_WAREHOUSE: i64 = 5;

/// City used by the city-filtered shipment query when none is given.
pub const DEFAULT_CITY: &str = "Казань";

/// Store URL used when `SHIPDB_URL` is unset.
pub const DEFAULT_STORE_URL: &str = "memory://shipments_db";

/// Application configuration.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Connection string of the store, `memory://<name>`.
    pub store_url: String,
    pub expensive_price_threshold: Decimal,
    pub restricted_warehouse: i64,
    pub default_city: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_url: DEFAULT_STORE_URL.to_string(),
            expensive_price_threshold: DEFAULT_PRICE_THRESHOLD,
            restricted_warehouse: DEFAULT_RESTRICTED_WAREHOUSE,
            default_city: DEFAULT_CITY.to_string(),
        }
    }
}

impl Config {
    /// Loads the configuration from `SHIPDB_*` environment variables, falling
    /// back to the defaults for unset ones.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads the configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(url) = lookup("SHIPDB_URL").filter(|v| !v.is_empty()) {
            config.store_url = url;
        }
        if let Some(raw) = lookup("SHIPDB_PRICE_THRESHOLD") {
            config.expensive_price_threshold = parse_var("SHIPDB_PRICE_THRESHOLD", &raw)?;
        }
        if let Some(raw) = lookup("SHIPDB_RESTRICTED_WAREHOUSE") {
            config.restricted_warehouse = parse_var("SHIPDB_RESTRICTED_WAREHOUSE", &raw)?;
        }
        if let Some(city) = lookup("SHIPDB_DEFAULT_CITY").filter(|v| !v.is_empty()) {
            config.default_city = city;
        }
        Ok(config)
    }
}

fn parse_var<T: FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| Error::InvalidInput(format!("{} is not a valid value for {}", raw, key)))
}
