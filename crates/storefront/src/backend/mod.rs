//! Backend API client.
//!
//! # Architecture
//!
//! - JSON over HTTP with `reqwest`; endpoint paths are joined onto the
//!   configured base URL
//! - The backend is the source of truth for products, payments and orders;
//!   the storefront keeps no copy beyond the visitor's session
//! - Catalog lookups are cached in memory via `moka` (5 minute TTL)
//! - Payment and order calls carry the signed-in customer's bearer token
//!
//! # Example
//!
//! ```rust,ignore
//! use fsad_storefront::backend::BackendClient;
//!
//! let client = BackendClient::new(&config.backend)?;
//! let products = client.list_products().await?;
//! let payment = client.process_payment(token, &request).await?;
//! ```

mod cache;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use fsad_core::{Order, ProductId};
use moka::future::Cache;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use crate::config::BackendConfig;

use cache::{CacheKey, CacheValue};
pub use types::{
    BackendUser, CreateOrderRequest, OrderLineRequest, OrderResponse, PaymentRequest,
    PaymentResponse, Product,
};
use types::{ErrorBody, MeResponse, OrdersResponse, ProductResponse, ProductsResponse};

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    #[error("API error: {status}{}", format_api_message(.message.as_deref()))]
    Api { status: u16, message: Option<String> },

    /// Response body did not match the expected shape.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Endpoint path could not be joined onto the base URL.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

fn format_api_message(message: Option<&str>) -> String {
    message.map(|m| format!(" - {m}")).unwrap_or_default()
}

impl BackendError {
    /// Message the backend supplied for this failure, if any.
    #[must_use]
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            Self::Api {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => Some(message),
            _ => None,
        }
    }

    /// Whether the backend rejected the caller's credentials.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api { status: 401 | 403, .. })
    }

    /// Whether the requested resource does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status: 404, .. })
    }
}

/// Client for the backend API.
///
/// Cheap to clone; clones share the connection pool and the catalog cache.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<CacheKey, CacheValue>,
}

impl BackendClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(BackendClientInner {
                client,
                base_url: config.base_url.clone(),
                cache,
            }),
        })
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, BackendError> {
        let url = self.inner.base_url.join(path)?;
        Ok(self.inner.client.request(method, url))
    }

    /// Send a request and decode a JSON response.
    ///
    /// Non-success statuses become `BackendError::Api` carrying the body's
    /// `message` field when it has one.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, BackendError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.message);
            debug!(status = status.as_u16(), ?message, "Backend returned error status");
            return Err(BackendError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Resolve an access token to the user it belongs to.
    ///
    /// # Errors
    ///
    /// Returns an `Api` error with status 401 when the token is rejected.
    #[instrument(skip(self, token))]
    pub async fn current_user(&self, token: &str) -> Result<BackendUser, BackendError> {
        let request = self.request(Method::GET, "auth/me")?.bearer_auth(token);
        let response: MeResponse = self.send(request).await?;

        match (response.success, response.user) {
            (Some(false), _) | (_, None) => Err(BackendError::Api {
                status: StatusCode::UNAUTHORIZED.as_u16(),
                message: response.message,
            }),
            (_, Some(user)) => Ok(user),
        }
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// List the catalog (cached).
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the response is malformed.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, BackendError> {
        if let Some(CacheValue::Products(products)) =
            self.inner.cache.get(&CacheKey::Products).await
        {
            debug!("Cache hit for product list");
            return Ok(products);
        }

        let products = self.fetch_products().await?;
        self.inner
            .cache
            .insert(CacheKey::Products, CacheValue::Products(products.clone()))
            .await;
        Ok(products)
    }

    /// List the catalog, bypassing the cache.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the response is malformed.
    pub async fn fetch_products(&self) -> Result<Vec<Product>, BackendError> {
        let request = self.request(Method::GET, "products")?;
        let response: ProductsResponse = self.send(request).await?;
        Ok(response.products)
    }

    /// Look up one product (cached).
    ///
    /// # Errors
    ///
    /// Returns an `Api` error with status 404 for unknown products.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: &ProductId) -> Result<Product, BackendError> {
        let key = CacheKey::Product(id.clone());
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let path = format!("products/{}", urlencoding::encode(&id.to_string()));
        let request = self.request(Method::GET, &path)?;
        let response: ProductResponse = self.send(request).await?;
        self.inner
            .cache
            .insert(key, CacheValue::Product(Box::new(response.product.clone())))
            .await;
        Ok(response.product)
    }

    // =========================================================================
    // Payments & Orders
    // =========================================================================

    /// Charge the customer.
    ///
    /// A response with `success: false` is returned as-is; only transport
    /// and HTTP-level failures are errors.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend answers non-2xx.
    #[instrument(skip(self, token, request), fields(amount = %request.amount, method = %request.payment_method))]
    pub async fn process_payment(
        &self,
        token: &str,
        request: &PaymentRequest,
    ) -> Result<PaymentResponse, BackendError> {
        let builder = self
            .request(Method::POST, "payments/process")?
            .bearer_auth(token)
            .json(request);
        self.send(builder).await
    }

    /// Create an order for a captured payment.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend answers non-2xx.
    #[instrument(skip(self, token, request), fields(items = request.items.len()))]
    pub async fn create_order(
        &self,
        token: &str,
        request: &CreateOrderRequest,
    ) -> Result<OrderResponse, BackendError> {
        let builder = self
            .request(Method::POST, "orders")?
            .bearer_auth(token)
            .json(request);
        self.send(builder).await
    }

    /// All orders of the customer behind `token`, in backend order.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the response is malformed.
    #[instrument(skip(self, token))]
    pub async fn list_orders(&self, token: &str) -> Result<Vec<Order>, BackendError> {
        let request = self.request(Method::GET, "orders")?.bearer_auth(token);
        let response: OrdersResponse = self.send(request).await?;
        Ok(response.orders)
    }
}
