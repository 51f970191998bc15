//! Metric selectors for bubble sizing and pool aggregation

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Pool, TokenRecord};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown metric '{0}'. Use: market_cap, volume_24h, price, circulating_supply")]
pub struct UnknownMetric(pub String);

/// Record field a bubble chart can be sized by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    #[default]
    MarketCap,
    #[serde(rename = "volume_24h")]
    Volume24h,
    Price,
    CirculatingSupply,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::MarketCap,
        Metric::Volume24h,
        Metric::Price,
        Metric::CirculatingSupply,
    ];

    pub fn field_name(self) -> &'static str {
        match self {
            Metric::MarketCap => "market_cap",
            Metric::Volume24h => "volume_24h",
            Metric::Price => "price",
            Metric::CirculatingSupply => "circulating_supply",
        }
    }

    /// Human label used in captions and table headers
    pub fn label(self) -> &'static str {
        match self {
            Metric::MarketCap => "Market Capitalization",
            Metric::Volume24h => "24H Volume",
            Metric::Price => "Price",
            Metric::CirculatingSupply => "Circulating Supply",
        }
    }

    pub fn value(self, record: &TokenRecord) -> f64 {
        match self {
            Metric::MarketCap => record.market_cap,
            Metric::Volume24h => record.volume_24h,
            Metric::Price => record.price,
            Metric::CirculatingSupply => record.circulating_supply,
        }
    }

    /// The pre-formatted display string paired with this metric
    pub fn display(self, record: &TokenRecord) -> &str {
        match self {
            Metric::MarketCap => &record.market_cap_clean,
            Metric::Volume24h => &record.volume_24h_clean,
            Metric::Price => &record.price_clean,
            Metric::CirculatingSupply => &record.circulating_supply_clean,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

impl FromStr for Metric {
    type Err = UnknownMetric;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .into_iter()
            .find(|m| m.field_name() == s.trim().to_lowercase())
            .ok_or_else(|| UnknownMetric(s.to_string()))
    }
}

/// Numeric pool field the aggregator can fold across matching pools
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PoolMetric {
    #[serde(rename = "change24")]
    Change24,
    #[serde(rename = "changeWeek")]
    ChangeWeek,
    #[serde(rename = "volumeUSD24")]
    VolumeUsd24,
}

impl PoolMetric {
    pub fn field_name(self) -> &'static str {
        match self {
            PoolMetric::Change24 => "change24",
            PoolMetric::ChangeWeek => "changeWeek",
            PoolMetric::VolumeUsd24 => "volumeUSD24",
        }
    }

    pub fn value(self, pool: &Pool) -> Option<f64> {
        match self {
            PoolMetric::Change24 => pool.change24,
            PoolMetric::ChangeWeek => pool.change_week,
            PoolMetric::VolumeUsd24 => pool.volume_usd24,
        }
    }
}

impl fmt::Display for PoolMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}
