//! Token list models

use serde::{Deserialize, Serialize};

/// A token as returned by the tokens endpoint.
///
/// Fields are optional on the wire so a missing value surfaces as an
/// aggregation error instead of a parse failure for the whole list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Token {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub usd_price: Option<f64>,
    #[serde(default)]
    pub contract: Option<String>,
}

#[cfg(test)]
impl Token {
    pub fn new(symbol: &str, usd_price: f64) -> Self {
        Token {
            symbol: Some(symbol.to_string()),
            usd_price: Some(usd_price),
            contract: None,
        }
    }
}
