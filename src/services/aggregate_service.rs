use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing::debug;

use crate::models::{Pool, PoolMetric, Token, TokenRecord};
use crate::utils::{format_currency, format_currency_short, format_supply};

// Placeholder conversions from USD price; the token list carries no supply data.
const MARKET_CAP_FACTOR: f64 = 1e6;
const VOLUME_FACTOR: f64 = 1e3;
const SUPPLY_FACTOR: f64 = 1e2;

/// How a pool metric is folded across the pools matching a token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    Mean,
    Sum,
}

/// What to do with a token that no pool references
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyPoolPolicy {
    /// Keep the token, means are undefined (`None`)
    #[default]
    Null,
    /// Keep the token, means are 0.0
    Zero,
    /// Leave the token out of the result
    Skip,
}

impl FromStr for EmptyPoolPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "null" | "none" => Ok(EmptyPoolPolicy::Null),
            "zero" => Ok(EmptyPoolPolicy::Zero),
            "skip" | "omit" => Ok(EmptyPoolPolicy::Skip),
            _ => Err(format!("Unknown empty-pool policy '{}'. Use: null, zero, skip", s)),
        }
    }
}

impl fmt::Display for EmptyPoolPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmptyPoolPolicy::Null => f.write_str("null"),
            EmptyPoolPolicy::Zero => f.write_str("zero"),
            EmptyPoolPolicy::Skip => f.write_str("skip"),
        }
    }
}

/// The pool metrics to aggregate per token, and how
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateSpec {
    pub metrics: Vec<(PoolMetric, Aggregation)>,
}

impl AggregateSpec {
    /// Mean 24h and 7d change
    pub fn standard() -> Self {
        AggregateSpec {
            metrics: vec![
                (PoolMetric::Change24, Aggregation::Mean),
                (PoolMetric::ChangeWeek, Aggregation::Mean),
            ],
        }
    }

    /// Mean 24h and 7d change plus summed 24h USD volume
    pub fn with_volume() -> Self {
        let mut spec = Self::standard();
        spec.metrics.push((PoolMetric::VolumeUsd24, Aggregation::Sum));
        spec
    }
}

impl Default for AggregateSpec {
    fn default() -> Self {
        Self::standard()
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AggregateError {
    #[error("Token #{index}: {field} is missing")]
    MissingTokenField { index: usize, field: &'static str },
    #[error("Token #{index} ({symbol}): usd_price {value} is not a finite number")]
    InvalidPrice { index: usize, symbol: String, value: f64 },
    #[error("Pool #{index}: {field} is missing")]
    MissingPoolField { index: usize, field: &'static str },
    #[error("Pool #{index}: {metric} {value} is not a finite number")]
    InvalidPoolMetric { index: usize, metric: PoolMetric, value: f64 },
}

/// Join tokens with the pools that reference them and build one record
/// per token. The first malformed token or pool fails the whole batch.
pub fn aggregate(
    tokens: &[Token],
    pools: &[Pool],
    spec: &AggregateSpec,
    policy: EmptyPoolPolicy,
) -> Result<Vec<TokenRecord>, AggregateError> {
    validate_pools(pools)?;

    let mut records = Vec::with_capacity(tokens.len());
    for (index, token) in tokens.iter().enumerate() {
        let (symbol, usd_price) = validate_token(index, token)?;

        let (indices, relevant): (Vec<usize>, Vec<&Pool>) = pools
            .iter()
            .enumerate()
            .filter(|(_, p)| p.references(symbol))
            .unzip();
        validate_relevant(&indices, &relevant, spec)?;

        if relevant.is_empty() && policy == EmptyPoolPolicy::Skip {
            debug!("Skipping {}: no pools reference it", symbol);
            continue;
        }

        let aggregates = spec
            .metrics
            .iter()
            .map(|&(metric, aggregation)| (metric, fold_metric(&relevant, metric, aggregation, policy)))
            .collect::<BTreeMap<_, _>>();

        records.push(build_record(symbol, usd_price, relevant.len(), aggregates));
    }

    debug!("Aggregated {} tokens against {} pools into {} records", tokens.len(), pools.len(), records.len());
    Ok(records)
}

fn validate_token(index: usize, token: &Token) -> Result<(&str, f64), AggregateError> {
    let symbol = token
        .symbol
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or(AggregateError::MissingTokenField { index, field: "symbol" })?;

    let usd_price = token
        .usd_price
        .ok_or(AggregateError::MissingTokenField { index, field: "usd_price" })?;

    if !usd_price.is_finite() {
        return Err(AggregateError::InvalidPrice {
            index,
            symbol: symbol.to_string(),
            value: usd_price,
        });
    }

    Ok((symbol, usd_price))
}

/// Every pool needs both side symbols to be matched at all
fn validate_pools(pools: &[Pool]) -> Result<(), AggregateError> {
    for (index, pool) in pools.iter().enumerate() {
        if pool.token_a.symbol.as_deref().map_or(true, str::is_empty) {
            return Err(AggregateError::MissingPoolField { index, field: "tokenA.symbol" });
        }
        if pool.token_b.symbol.as_deref().map_or(true, str::is_empty) {
            return Err(AggregateError::MissingPoolField { index, field: "tokenB.symbol" });
        }
    }
    Ok(())
}

/// The aggregated metrics must be present and finite on every pool that
/// references the token. `indices` are positions in the original pool list.
fn validate_relevant(indices: &[usize], relevant: &[&Pool], spec: &AggregateSpec) -> Result<(), AggregateError> {
    for (&index, pool) in indices.iter().zip(relevant) {
        for &(metric, _) in &spec.metrics {
            match metric.value(pool) {
                None => {
                    return Err(AggregateError::MissingPoolField {
                        index,
                        field: metric.field_name(),
                    })
                }
                Some(value) if !value.is_finite() => {
                    return Err(AggregateError::InvalidPoolMetric { index, metric, value })
                }
                Some(_) => {}
            }
        }
    }
    Ok(())
}

fn fold_metric(
    relevant: &[&Pool],
    metric: PoolMetric,
    aggregation: Aggregation,
    policy: EmptyPoolPolicy,
) -> Option<f64> {
    // Relevant pools were validated, each one carries the metric.
    let total: f64 = relevant.iter().filter_map(|p| metric.value(p)).sum();

    match aggregation {
        Aggregation::Sum => Some(total),
        Aggregation::Mean if relevant.is_empty() => match policy {
            EmptyPoolPolicy::Zero => Some(0.0),
            EmptyPoolPolicy::Null | EmptyPoolPolicy::Skip => None,
        },
        Aggregation::Mean => Some(total / relevant.len() as f64),
    }
}

fn build_record(
    symbol: &str,
    usd_price: f64,
    pool_count: usize,
    aggregates: BTreeMap<PoolMetric, Option<f64>>,
) -> TokenRecord {
    let market_cap = usd_price * MARKET_CAP_FACTOR;
    let volume_24h = usd_price * VOLUME_FACTOR;
    let circulating_supply = usd_price * SUPPLY_FACTOR;

    TokenRecord {
        symbol: symbol.to_string(),
        market_cap,
        market_cap_clean: format_currency_short(market_cap),
        volume_24h,
        volume_24h_clean: format_currency_short(volume_24h),
        price: usd_price,
        price_clean: format_currency(usd_price),
        circulating_supply,
        circulating_supply_clean: format_supply(circulating_supply),
        pool_count,
        aggregates,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard(tokens: &[Token], pools: &[Pool]) -> Vec<TokenRecord> {
        aggregate(tokens, pools, &AggregateSpec::standard(), EmptyPoolPolicy::Null).unwrap()
    }

    #[test]
    fn test_single_matching_pool_passes_values_through() {
        let records = standard(&[Token::new("A", 2.0)], &[Pool::new("A", "B", 10.0, 5.0)]);

        assert_eq!(records.len(), 1);
        let a = &records[0];
        assert_eq!(a.symbol, "A");
        assert_eq!(a.change24(), Some(10.0));
        assert_eq!(a.change_week(), Some(5.0));
        assert_eq!(a.pool_count, 1);
        assert_eq!(a.market_cap, 2_000_000.0);
        assert_eq!(a.market_cap_clean, "$2M");
        assert_eq!(a.volume_24h_clean, "$2K");
        assert_eq!(a.price_clean, "$2");
        assert_eq!(a.circulating_supply_clean, "200");
    }

    #[test]
    fn test_mean_covers_exactly_the_matching_pools_on_either_side() {
        let pools = vec![
            Pool::new("A", "B", 10.0, 1.0),
            Pool::new("C", "A", -4.0, 3.0),
            Pool::new("B", "C", 100.0, 100.0),
            Pool::new("a", "B", 50.0, 50.0),
        ];
        let records = standard(&[Token::new("A", 1.0)], &pools);

        assert_eq!(records[0].pool_count, 2);
        assert_eq!(records[0].change24(), Some(3.0));
        assert_eq!(records[0].change_week(), Some(2.0));
    }

    #[test]
    fn test_mean_is_independent_of_pool_order() {
        let mut pools = vec![
            Pool::new("X", "USDT", 1.5, -2.0),
            Pool::new("WAX", "X", 4.0, 8.0),
            Pool::new("X", "TLM", -0.5, 3.0),
        ];
        let forward = standard(&[Token::new("X", 0.3)], &pools);
        pools.reverse();
        let backward = standard(&[Token::new("X", 0.3)], &pools);

        let expected = (1.5 + 4.0 - 0.5) / 3.0;
        assert!((forward[0].change24().unwrap() - expected).abs() < 1e-12);
        assert!((backward[0].change24().unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_zero_pools_under_null_policy_is_none_not_nan() {
        let records = standard(&[Token::new("A", 2.0)], &[]);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].change24(), None);
        assert_eq!(records[0].change_week(), None);
        assert_eq!(records[0].change_display(PoolMetric::Change24), "n/a");
    }

    #[test]
    fn test_zero_pools_under_zero_policy_is_zero() {
        let records = aggregate(&[Token::new("A", 2.0)], &[], &AggregateSpec::standard(), EmptyPoolPolicy::Zero).unwrap();

        assert_eq!(records[0].change24(), Some(0.0));
        assert_eq!(records[0].change_week(), Some(0.0));
    }

    #[test]
    fn test_zero_pools_under_skip_policy_omits_token() {
        let tokens = vec![Token::new("A", 2.0), Token::new("B", 1.0)];
        let pools = vec![Pool::new("B", "C", 1.0, 1.0)];
        let records = aggregate(&tokens, &pools, &AggregateSpec::standard(), EmptyPoolPolicy::Skip).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].symbol, "B");
    }

    #[test]
    fn test_volume_variant_sums_matching_pools() {
        let pools = vec![
            Pool::new("A", "B", 1.0, 1.0).with_volume(100.0),
            Pool::new("B", "A", 3.0, 1.0).with_volume(250.5),
            Pool::new("B", "C", 9.0, 9.0).with_volume(1000.0),
        ];
        let records = aggregate(&[Token::new("A", 1.0)], &pools, &AggregateSpec::with_volume(), EmptyPoolPolicy::Null).unwrap();

        assert_eq!(records[0].pool_volume_24h(), Some(350.5));
        assert_eq!(records[0].change24(), Some(2.0));
    }

    #[test]
    fn test_volume_sum_over_zero_pools_is_zero() {
        let records = aggregate(&[Token::new("A", 1.0)], &[], &AggregateSpec::with_volume(), EmptyPoolPolicy::Null).unwrap();
        assert_eq!(records[0].pool_volume_24h(), Some(0.0));
    }

    #[test]
    fn test_aggregation_is_deterministic() {
        let tokens = vec![Token::new("A", 2.0), Token::new("B", 0.5), Token::new("C", 7.0)];
        let pools = vec![Pool::new("A", "B", 10.0, 5.0), Pool::new("B", "C", -3.0, 2.0)];

        let first = standard(&tokens, &pools);
        let second = standard(&tokens, &pools);
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_token_symbol_fails_whole_batch() {
        let tokens = vec![
            Token::new("A", 2.0),
            Token { symbol: None, usd_price: Some(1.0), contract: None },
        ];
        let err = aggregate(&tokens, &[], &AggregateSpec::standard(), EmptyPoolPolicy::Null).unwrap_err();

        assert_eq!(err, AggregateError::MissingTokenField { index: 1, field: "symbol" });
        assert_eq!(err.to_string(), "Token #1: symbol is missing");
    }

    #[test]
    fn test_missing_or_non_finite_price_fails() {
        let missing = vec![Token { symbol: Some("A".to_string()), usd_price: None, contract: None }];
        assert!(matches!(
            aggregate(&missing, &[], &AggregateSpec::standard(), EmptyPoolPolicy::Null),
            Err(AggregateError::MissingTokenField { index: 0, field: "usd_price" })
        ));

        let nan = vec![Token::new("A", f64::NAN)];
        assert!(matches!(
            aggregate(&nan, &[], &AggregateSpec::standard(), EmptyPoolPolicy::Null),
            Err(AggregateError::InvalidPrice { index: 0, .. })
        ));
    }

    #[test]
    fn test_pool_missing_metric_fails() {
        let mut pool = Pool::new("A", "B", 1.0, 1.0);
        pool.change_week = None;
        let err = aggregate(&[Token::new("A", 1.0)], &[pool], &AggregateSpec::standard(), EmptyPoolPolicy::Null).unwrap_err();

        assert_eq!(err, AggregateError::MissingPoolField { index: 0, field: "changeWeek" });
    }

    #[test]
    fn test_unrelated_pool_with_missing_metric_is_ignored() {
        let mut other = Pool::new("X", "Y", 0.0, 0.0);
        other.change24 = None;
        let pools = vec![Pool::new("A", "B", 10.0, 5.0), other];

        let records = standard(&[Token::new("A", 2.0)], &pools);
        assert_eq!(records[0].change24(), Some(10.0));
        assert_eq!(records[0].pool_count, 1);
    }

    #[test]
    fn test_volume_only_required_on_relevant_pools() {
        let pools = vec![
            Pool::new("A", "B", 1.0, 1.0).with_volume(3.0),
            Pool::new("X", "Y", 1.0, 1.0),
        ];
        let records = aggregate(&[Token::new("A", 2.0)], &pools, &AggregateSpec::with_volume(), EmptyPoolPolicy::Null).unwrap();
        assert_eq!(records[0].pool_volume_24h(), Some(3.0));

        let err = aggregate(&[Token::new("X", 1.0)], &pools, &AggregateSpec::with_volume(), EmptyPoolPolicy::Null).unwrap_err();
        assert_eq!(err, AggregateError::MissingPoolField { index: 1, field: "volumeUSD24" });

        assert!(aggregate(&[Token::new("X", 1.0)], &pools, &AggregateSpec::standard(), EmptyPoolPolicy::Null).is_ok());
    }

    #[test]
    fn test_relevant_pool_error_reports_original_index() {
        let mut bad = Pool::new("C", "A", 0.0, 0.0);
        bad.change_week = Some(f64::INFINITY);
        let pools = vec![Pool::new("X", "Y", 1.0, 1.0), Pool::new("A", "B", 1.0, 1.0), bad];

        assert!(matches!(
            aggregate(&[Token::new("A", 1.0)], &pools, &AggregateSpec::standard(), EmptyPoolPolicy::Null),
            Err(AggregateError::InvalidPoolMetric { index: 2, metric: PoolMetric::ChangeWeek, .. })
        ));
    }

    #[test]
    fn test_policy_parses_from_str() {
        assert_eq!("zero".parse::<EmptyPoolPolicy>(), Ok(EmptyPoolPolicy::Zero));
        assert_eq!("SKIP".parse::<EmptyPoolPolicy>(), Ok(EmptyPoolPolicy::Skip));
        assert_eq!("null".parse::<EmptyPoolPolicy>(), Ok(EmptyPoolPolicy::Null));
        assert!("nan".parse::<EmptyPoolPolicy>().is_err());
    }
}
