use chrono::Utc;
use tracing::info;

use crate::api::{ApiError, MarketSource};
use crate::models::MarketSnapshot;

/// Fetch tokens, then pools. The first failure aborts the cycle, so a
/// failing tokens request never reaches the pools endpoint.
pub async fn fetch_snapshot(source: &dyn MarketSource) -> Result<MarketSnapshot, ApiError> {
    let tokens = source.fetch_tokens().await?;
    let pools = source.fetch_pools().await?;

    info!("📥 Fetched {} tokens and {} pools", tokens.len(), pools.len());

    Ok(MarketSnapshot {
        tokens,
        pools,
        fetched_at: Utc::now(),
    })
}
