//! Marketplace API client.
//!
//! # Architecture
//!
//! - Plain JSON over HTTP with `reqwest`; every path is relative to the
//!   configured base URL
//! - The marketplace is the source of truth: no local copies beyond an
//!   optional short-lived `moka` cache for products and categories
//! - Transactions and users are never cached
//!
//! # Example
//!
//! ```rust,ignore
//! use almed_storefront::api::ApiClient;
//!
//! let client = ApiClient::new(&config.api)?;
//! let products = client.products().await?;
//! let history = client.transactions(&user_id).await?;
//! ```

mod cache;

use std::sync::Arc;

use almed_core::checkout::NewTransaction;
use almed_core::{Category, Product, Transaction, UserId, UserProfile};
use moka::future::Cache;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use crate::config::ApiConfig;

use cache::{CacheKey, CacheValue};

/// Message shown when the API rejects a transaction without saying why.
pub const DEFAULT_REJECTION_MESSAGE: &str = "Failed to create the transaction";

/// Errors that can occur when talking to the marketplace API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Request URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// API answered with a non-success status.
    #[error("API returned HTTP {0}")]
    Status(u16),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The API refused a mutation; the message is meant for the shopper.
    #[error("{0}")]
    Rejected(String),
}

/// Client for the marketplace API.
///
/// Cheap to clone. When a cache TTL is configured, products and categories
/// are served from memory until it expires.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Option<Cache<CacheKey, CacheValue>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("cached", &self.inner.cache.is_some())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        let cache = (!config.cache_ttl.is_zero()).then(|| {
            Cache::builder()
                .max_capacity(16)
                .time_to_live(config.cache_ttl)
                .build()
        });

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.clone(),
                cache,
            }),
        })
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path)?)
    }

    /// GET `url` and decode a JSON body.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let response = self.inner.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "API returned non-success status"
            );
            return Err(ApiError::Status(status.as_u16()));
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse API response"
            );
            ApiError::Parse(e)
        })
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// All products, in the order the API returns them.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a product list.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Vec<Product>, ApiError> {
        if let Some(cache) = &self.inner.cache
            && let Some(CacheValue::Products(products)) = cache.get(&CacheKey::Products).await
        {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let products: Vec<Product> = self.get_json(self.url("products")?).await?;
        debug!(count = products.len(), "Fetched products");

        if let Some(cache) = &self.inner.cache {
            cache
                .insert(CacheKey::Products, CacheValue::Products(products.clone()))
                .await;
        }

        Ok(products)
    }

    /// All categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a category list.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        if let Some(cache) = &self.inner.cache
            && let Some(CacheValue::Categories(categories)) =
                cache.get(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let categories: Vec<Category> = self.get_json(self.url("categories")?).await?;

        if let Some(cache) = &self.inner.cache {
            cache
                .insert(
                    CacheKey::Categories,
                    CacheValue::Categories(categories.clone()),
                )
                .await;
        }

        Ok(categories)
    }

    /// Drop cached products and categories.
    pub async fn invalidate_catalog(&self) {
        if let Some(cache) = &self.inner.cache {
            cache.invalidate(&CacheKey::Products).await;
            cache.invalidate(&CacheKey::Categories).await;
        }
    }

    // =========================================================================
    // Shopper data (never cached)
    // =========================================================================

    /// Transactions owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a transaction list.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn transactions(&self, user_id: &UserId) -> Result<Vec<Transaction>, ApiError> {
        let mut url = self.url("transactions")?;
        url.query_pairs_mut().append_pair("userId", user_id.as_str());
        self.get_json(url).await
    }

    /// Profile for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for any non-success status, or another
    /// error if the request fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn user(&self, user_id: &UserId) -> Result<UserProfile, ApiError> {
        let url = self.url(&format!("user/{}", urlencoding::encode(user_id.as_str())))?;
        match self.get_json(url).await {
            Err(ApiError::Status(status)) => {
                debug!(status, "User lookup failed");
                Err(ApiError::NotFound(format!("user {user_id}")))
            }
            other => other,
        }
    }

    /// Submit a new transaction.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] carrying the API's `message` (or a
    /// generic one) when the API refuses the order, or another error if the
    /// request fails.
    #[instrument(
        skip(self, payload),
        fields(user_id = %payload.user_id, items = payload.order_items.len())
    )]
    pub async fn create_transaction(&self, payload: &NewTransaction) -> Result<(), ApiError> {
        let response = self
            .inner
            .client
            .post(self.url("transactions")?)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            tracing::info!(status = %status, "Transaction created");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        let message = rejection_message(&body);
        tracing::warn!(status = %status, message = %message, "Transaction rejected");
        Err(ApiError::Rejected(message))
    }
}

/// Pull the shopper-facing message out of an error body.
fn rejection_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_owned))
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_REJECTION_MESSAGE.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::normalize_base_url;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(&ApiConfig {
            base_url: normalize_base_url(base).unwrap(),
            timeout: Duration::from_secs(1),
            cache_ttl: Duration::ZERO,
        })
        .unwrap()
    }

    #[test]
    fn test_rejection_message_uses_api_message() {
        assert_eq!(rejection_message(r#"{"message":"Stok habis"}"#), "Stok habis");
    }

    #[test]
    fn test_rejection_message_falls_back() {
        assert_eq!(rejection_message(""), DEFAULT_REJECTION_MESSAGE);
        assert_eq!(rejection_message("<html>"), DEFAULT_REJECTION_MESSAGE);
        assert_eq!(rejection_message(r#"{"message":""}"#), DEFAULT_REJECTION_MESSAGE);
        assert_eq!(rejection_message(r#"{"error":"x"}"#), DEFAULT_REJECTION_MESSAGE);
    }

    #[test]
    fn test_paths_join_under_base() {
        let client = client("http://localhost:4000/api/store-1");
        assert_eq!(
            client.url("products").unwrap().as_str(),
            "http://localhost:4000/api/store-1/products"
        );
    }

    #[test]
    fn test_cache_disabled_for_zero_ttl() {
        let client = client("http://localhost:4000/");
        assert!(client.inner.cache.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_api_is_http_error() {
        let client = client("http://127.0.0.1:9/");
        assert!(matches!(client.products().await, Err(ApiError::Http(_))));
    }
}
