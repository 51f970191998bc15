use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::api::{ApiError, MarketSource};
use crate::models::TokenRecord;
use crate::services::aggregate_service::{self, AggregateError, AggregateSpec, EmptyPoolPolicy};
use crate::services::fetch_service;

#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("Fetch failed: {0}")]
    Api(#[from] ApiError),
    #[error("Aggregation failed: {0}")]
    Aggregate(#[from] AggregateError),
    #[error("A refresh is already in progress")]
    InFlight,
}

/// Records produced by one successful refresh
#[derive(Debug, Clone)]
pub struct RefreshOutcome {
    pub records: Vec<TokenRecord>,
    pub token_count: usize,
    pub pool_count: usize,
    pub fetched_at: DateTime<Utc>,
}

/// Runs fetch + aggregate with at most one refresh in flight. A second
/// caller is turned away with `RefreshError::InFlight` rather than queued.
pub struct Refresher {
    source: Arc<dyn MarketSource>,
    spec: AggregateSpec,
    policy: EmptyPoolPolicy,
    in_flight: Mutex<()>,
}

impl Refresher {
    pub fn new(source: Arc<dyn MarketSource>, spec: AggregateSpec, policy: EmptyPoolPolicy) -> Self {
        Refresher {
            source,
            spec,
            policy,
            in_flight: Mutex::new(()),
        }
    }

    pub fn is_refreshing(&self) -> bool {
        self.in_flight.try_lock().is_err()
    }

    pub async fn refresh(&self) -> Result<RefreshOutcome, RefreshError> {
        let _guard = match self.in_flight.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                warn!("Refresh rejected: previous refresh still running");
                return Err(RefreshError::InFlight);
            }
        };

        info!("🔄 Refreshing market data");

        let snapshot = fetch_service::fetch_snapshot(self.source.as_ref())
            .await
            .map_err(|e| {
                error!("Refresh failed: {}", e);
                RefreshError::from(e)
            })?;

        let records = aggregate_service::aggregate(&snapshot.tokens, &snapshot.pools, &self.spec, self.policy)
            .map_err(|e| {
                error!("Refresh failed: {}", e);
                RefreshError::from(e)
            })?;

        info!("✅ Refresh complete: {} records", records.len());

        Ok(RefreshOutcome {
            records,
            token_count: snapshot.tokens.len(),
            pool_count: snapshot.pools.len(),
            fetched_at: snapshot.fetched_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tokio::sync::Notify;

    use crate::api::alcor::test_server::{direct_http_client, TestServer};
    use crate::api::{AlcorClient, Endpoint};
    use crate::models::{Pool, Token};

    struct StaticSource {
        tokens: Vec<Token>,
        pools: Vec<Pool>,
    }

    #[async_trait]
    impl MarketSource for StaticSource {
        async fn fetch_tokens(&self) -> Result<Vec<Token>, ApiError> {
            Ok(self.tokens.clone())
        }

        async fn fetch_pools(&self) -> Result<Vec<Pool>, ApiError> {
            Ok(self.pools.clone())
        }
    }

    /// Holds the tokens request open until released
    struct GatedSource {
        started: Arc<Notify>,
        release: Arc<Notify>,
    }

    #[async_trait]
    impl MarketSource for GatedSource {
        async fn fetch_tokens(&self) -> Result<Vec<Token>, ApiError> {
            self.started.notify_one();
            self.release.notified().await;
            Ok(vec![Token::new("A", 2.0)])
        }

        async fn fetch_pools(&self) -> Result<Vec<Pool>, ApiError> {
            Ok(vec![Pool::new("A", "B", 10.0, 5.0)])
        }
    }

    #[tokio::test]
    async fn test_refresh_produces_records() {
        let source = StaticSource {
            tokens: vec![Token::new("A", 2.0)],
            pools: vec![Pool::new("A", "B", 10.0, 5.0)],
        };
        let refresher = Refresher::new(Arc::new(source), AggregateSpec::standard(), EmptyPoolPolicy::Null);

        let outcome = refresher.refresh().await.unwrap();
        assert_eq!(outcome.token_count, 1);
        assert_eq!(outcome.pool_count, 1);
        assert_eq!(outcome.records[0].change24(), Some(10.0));
        assert_eq!(outcome.records[0].change_week(), Some(5.0));
    }

    #[tokio::test]
    async fn test_malformed_token_fails_refresh() {
        let source = StaticSource {
            tokens: vec![Token { symbol: Some("A".to_string()), usd_price: None, contract: None }],
            pools: vec![],
        };
        let refresher = Refresher::new(Arc::new(source), AggregateSpec::standard(), EmptyPoolPolicy::Null);

        let err = refresher.refresh().await.unwrap_err();
        assert!(matches!(err, RefreshError::Aggregate(AggregateError::MissingTokenField { .. })));
    }

    #[tokio::test]
    async fn test_second_refresh_while_in_flight_is_rejected() {
        let started = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let source = GatedSource {
            started: started.clone(),
            release: release.clone(),
        };
        let refresher = Arc::new(Refresher::new(Arc::new(source), AggregateSpec::standard(), EmptyPoolPolicy::Null));

        let first = {
            let refresher = refresher.clone();
            tokio::spawn(async move { refresher.refresh().await })
        };
        started.notified().await;

        assert!(refresher.is_refreshing());
        assert!(matches!(refresher.refresh().await, Err(RefreshError::InFlight)));

        release.notify_one();
        let outcome = first.await.unwrap().unwrap();
        assert_eq!(outcome.records.len(), 1);
        assert!(!refresher.is_refreshing());
    }

    #[tokio::test]
    async fn test_tokens_endpoint_500_aborts_refresh() {
        let tokens = TestServer::start("500 Internal Server Error", "upstream exploded").await;
        let pools = TestServer::start("200 OK", "[]").await;
        let client = AlcorClient::from_http_client(direct_http_client(), tokens.url.clone(), pools.url.clone());
        let refresher = Refresher::new(Arc::new(client), AggregateSpec::standard(), EmptyPoolPolicy::Null);

        match refresher.refresh().await {
            Err(RefreshError::Api(e)) => {
                assert_eq!(e.endpoint(), Some(Endpoint::Tokens));
                assert_eq!(e.status(), Some(500));
                assert!(e.to_string().contains("tokens endpoint"));
            }
            other => panic!("expected tokens endpoint failure, got {:?}", other),
        }
        assert_eq!(pools.hits(), 0);
    }
}
