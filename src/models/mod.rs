//! Data models for token-bubbles
//!
//! Wire types mirror the Alcor API payloads. Derived types are what the
//! aggregator hands to the table, JSON and chart outputs.

pub mod token;
pub mod pool;
pub mod record;
pub mod metric;

// Re-export commonly used types for convenience
pub use token::Token;
pub use pool::Pool;
pub use record::{MarketSnapshot, TokenRecord};
pub use metric::{Metric, PoolMetric};
