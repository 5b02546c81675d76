//! HTTP client for the items API.
//!
//! The API exposes one collection resource:
//! - `GET {base_url}/api/items` returns every item as a JSON array.
//! - `PUT {base_url}/api/items` replaces the whole collection.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use thiserror::Error;

use crate::config::Config;
use crate::models::Item;

const ITEMS_PATH: &str = "/api/items";

/// HTTP client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unauthorized: API key required or invalid")]
    Unauthorized,

    #[error("Server returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// HTTP client for the items API.
#[derive(Debug, Clone)]
pub struct ItemsClient {
    base_url: String,
    api_key: Option<String>,
    client: Client,
}

impl ItemsClient {
    /// Create with explicit configuration and reqwest defaults.
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self::with_client(base_url, api_key, Client::new())
    }

    /// Create from loaded configuration, applying its request timeout.
    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self::with_client(
            config.api_url.clone(),
            config.api_key.clone(),
            client,
        ))
    }

    fn with_client(base_url: impl Into<String>, api_key: Option<String>, client: Client) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a request with optional auth header.
    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.client.request(method, &url);
        if let Some(ref key) = self.api_key {
            req = req.bearer_auth(key);
        }
        req
    }

    /// Map a non-2xx status to a ClientError, passing successes through.
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::UNAUTHORIZED {
            return Err(ClientError::Unauthorized);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ClientError::Status { status, body })
    }

    /// Fetch the full item collection in server order.
    pub async fn fetch_items(&self) -> Result<Vec<Item>, ClientError> {
        let response = self
            .request(reqwest::Method::GET, ITEMS_PATH)
            .send()
            .await?;
        let body = Self::check_status(response).await?.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Replace the server's collection with `items`. Any response body is ignored.
    pub async fn replace_items(&self, items: &[Item]) -> Result<(), ClientError> {
        let response = self
            .request(reqwest::Method::PUT, ITEMS_PATH)
            .json(items)
            .send()
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }
}
