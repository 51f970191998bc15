pub mod alcor;

use async_trait::async_trait;

use crate::models::{Pool, Token};

pub use alcor::{AlcorClient, ApiError, Endpoint};

/// Anything that can supply the two raw market lists for one refresh
#[async_trait]
pub trait MarketSource: Send + Sync {
    async fn fetch_tokens(&self) -> Result<Vec<Token>, ApiError>;
    async fn fetch_pools(&self) -> Result<Vec<Pool>, ApiError>;
}
