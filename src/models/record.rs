//! Derived per-token records

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Pool, PoolMetric, Token};

/// Raw payloads from one fetch cycle
#[derive(Debug, Clone)]
pub struct MarketSnapshot {
    pub tokens: Vec<Token>,
    pub pools: Vec<Pool>,
    pub fetched_at: DateTime<Utc>,
}

/// One bubble's worth of data: price-derived figures, their display
/// strings, and the pool aggregates for this token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub symbol: String,
    pub market_cap: f64,
    pub market_cap_clean: String,
    pub volume_24h: f64,
    pub volume_24h_clean: String,
    pub price: f64,
    pub price_clean: String,
    pub circulating_supply: f64,
    pub circulating_supply_clean: String,
    pub pool_count: usize,
    /// `None` means the aggregate is undefined (mean over zero pools)
    pub aggregates: BTreeMap<PoolMetric, Option<f64>>,
}

impl TokenRecord {
    pub fn aggregate(&self, metric: PoolMetric) -> Option<f64> {
        self.aggregates.get(&metric).copied().flatten()
    }

    pub fn change24(&self) -> Option<f64> {
        self.aggregate(PoolMetric::Change24)
    }

    pub fn change_week(&self) -> Option<f64> {
        self.aggregate(PoolMetric::ChangeWeek)
    }

    pub fn pool_volume_24h(&self) -> Option<f64> {
        self.aggregate(PoolMetric::VolumeUsd24)
    }

    /// Percentage shown in labels and tooltips, "n/a" when undefined
    pub fn change_display(&self, metric: PoolMetric) -> String {
        match self.aggregate(metric) {
            Some(v) => format!("{:.2}", v),
            None => "n/a".to_string(),
        }
    }

    /// `change_display` with a percent sign; "n/a" carries none
    pub fn change_percent(&self, metric: PoolMetric) -> String {
        match self.aggregate(metric) {
            Some(_) => format!("{}%", self.change_display(metric)),
            None => self.change_display(metric),
        }
    }
}
