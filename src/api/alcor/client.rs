use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::models::{ApiError, Endpoint, ErrorResponse};
use crate::api::MarketSource;
use crate::models::{Pool, Token};

/// Alcor exchange API client for the token and pool lists
pub struct AlcorClient {
    http_client: HttpClient,
    tokens_url: String,
    pools_url: String,
}

impl AlcorClient {
    pub const DEFAULT_TOKENS_URL: &'static str = "https://alcor.exchange/api/v2/tokens";
    pub const DEFAULT_POOLS_URL: &'static str = "https://alcor.exchange/api/v2/swap/pools";
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Create a client with custom endpoint URLs and request timeout
    pub fn with_urls(tokens_url: String, pools_url: String, timeout: Duration) -> Result<Self, ApiError> {
        let http_client = HttpClient::builder()
            .default_headers(Self::create_headers())
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Client(e.to_string()))?;

        Ok(Self::from_http_client(http_client, tokens_url, pools_url))
    }

    /// Wrap an already configured reqwest client (for testing)
    pub fn from_http_client(http_client: HttpClient, tokens_url: String, pools_url: String) -> Self {
        Self {
            http_client,
            tokens_url,
            pools_url,
        }
    }

    pub fn url(&self, endpoint: Endpoint) -> &str {
        match endpoint {
            Endpoint::Tokens => &self.tokens_url,
            Endpoint::Pools => &self.pools_url,
        }
    }

    fn create_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("token-bubbles/", env!("CARGO_PKG_VERSION"))),
        );
        headers
    }

    /// Turn a non-success response into an error, pulling the message out
    /// of a JSON error body when there is one
    async fn handle_error_response(
        endpoint: Endpoint,
        url: &str,
        status: reqwest::StatusCode,
        response: reqwest::Response,
    ) -> ApiError {
        let body_text = response.text().await.unwrap_or_default();

        let message = match serde_json::from_str::<ErrorResponse>(&body_text) {
            Ok(ErrorResponse { message: Some(m), .. }) | Ok(ErrorResponse { error: Some(m), .. }) => m,
            _ if body_text.trim().is_empty() => status
                .canonical_reason()
                .unwrap_or("no response body")
                .to_string(),
            _ => body_text,
        };

        warn!("{} endpoint returned {}: {}", endpoint, status.as_u16(), message);

        ApiError::Status {
            endpoint,
            url: url.to_string(),
            status: status.as_u16(),
            message,
        }
    }

    /// GET an endpoint and decode its JSON body
    async fn get_json<T: DeserializeOwned>(&self, endpoint: Endpoint) -> Result<T, ApiError> {
        let url = self.url(endpoint);
        debug!("GET {} ({})", url, endpoint);

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| ApiError::Request {
                endpoint,
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::handle_error_response(endpoint, url, status, response).await);
        }

        let body = response.bytes().await.map_err(|e| ApiError::Request {
            endpoint,
            url: url.to_string(),
            message: format!("Failed to read response body: {}", e),
        })?;

        serde_json::from_slice::<T>(&body).map_err(|e| ApiError::Deserialization {
            endpoint,
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    /// GET the token list
    pub async fn get_tokens(&self) -> Result<Vec<Token>, ApiError> {
        let tokens: Vec<Token> = self.get_json(Endpoint::Tokens).await?;
        debug!("Received {} tokens", tokens.len());
        Ok(tokens)
    }

    /// GET the swap pool list
    pub async fn get_pools(&self) -> Result<Vec<Pool>, ApiError> {
        let pools: Vec<Pool> = self.get_json(Endpoint::Pools).await?;
        debug!("Received {} pools", pools.len());
        Ok(pools)
    }
}

#[async_trait]
impl MarketSource for AlcorClient {
    async fn fetch_tokens(&self) -> Result<Vec<Token>, ApiError> {
        self.get_tokens().await
    }

    async fn fetch_pools(&self) -> Result<Vec<Pool>, ApiError> {
        self.get_pools().await
    }
}
