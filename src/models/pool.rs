//! Liquidity pool models

use serde::{Deserialize, Serialize};

/// One side of a liquidity pair
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoolToken {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub contract: Option<String>,
}

/// A pool as returned by the swap/pools endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pool {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(rename = "tokenA", default)]
    pub token_a: PoolToken,
    #[serde(rename = "tokenB", default)]
    pub token_b: PoolToken,
    #[serde(default)]
    pub change24: Option<f64>,
    #[serde(rename = "changeWeek", default)]
    pub change_week: Option<f64>,
    #[serde(rename = "volumeUSD24", default)]
    pub volume_usd24: Option<f64>,
}

#[cfg(test)]
impl Pool {
    pub fn new(symbol_a: &str, symbol_b: &str, change24: f64, change_week: f64) -> Self {
        Pool {
            id: None,
            token_a: PoolToken { symbol: Some(symbol_a.to_string()), contract: None },
            token_b: PoolToken { symbol: Some(symbol_b.to_string()), contract: None },
            change24: Some(change24),
            change_week: Some(change_week),
            volume_usd24: None,
        }
    }

    pub fn with_volume(mut self, volume_usd24: f64) -> Self {
        self.volume_usd24 = Some(volume_usd24);
        self
    }
}

impl Pool {
    /// True if either side of the pair is exactly `symbol`
    pub fn references(&self, symbol: &str) -> bool {
        self.token_a.symbol.as_deref() == Some(symbol)
            || self.token_b.symbol.as_deref() == Some(symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_deserializes_camel_case_fields() {
        let json = r#"{
            "id": 7,
            "tokenA": {"symbol": "WAX", "contract": "eosio.token"},
            "tokenB": {"symbol": "TLM", "contract": "alien.worlds"},
            "change24": -1.5,
            "changeWeek": 3.25,
            "volumeUSD24": 1200.0
        }"#;
        let pool: Pool = serde_json::from_str(json).unwrap();
        assert_eq!(pool.token_a.symbol.as_deref(), Some("WAX"));
        assert_eq!(pool.token_b.symbol.as_deref(), Some("TLM"));
        assert_eq!(pool.change24, Some(-1.5));
        assert_eq!(pool.change_week, Some(3.25));
        assert_eq!(pool.volume_usd24, Some(1200.0));
    }

    #[test]
    fn test_references_is_exact_and_case_sensitive() {
        let pool = Pool::new("WAX", "TLM", 0.0, 0.0);
        assert!(pool.references("WAX"));
        assert!(pool.references("TLM"));
        assert!(!pool.references("wax"));
        assert!(!pool.references("WA"));
    }
}
