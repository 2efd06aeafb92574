//! Shopify Admin API GraphQL client with access-token authentication.
//!
//! This module provides the client used to read the catalog and write
//! translations back. Requests go one at a time; there are no retries.

use std::sync::Arc;
use std::time::Duration;

use graphql_client::QueryBody;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use shopify_catalog_core::ProductRecord;
use tracing::{debug, info};

use crate::config::ShopifyAdminConfig;

use super::{AdminShopifyError, GraphQLError, GraphQLErrorLocation};

mod collections;
mod products;
pub mod queries;
pub mod translations;

pub use products::ProductSelector;

use queries::{Connection, PageInfo};

/// Page size for every paginated query (the API maximum).
pub const PAGE_SIZE: i64 = 250;

/// Pause between page requests.
pub const DEFAULT_PAGE_DELAY: Duration = Duration::from_millis(500);

/// Longest response body kept in an HTTP status error.
const BODY_EXCERPT_LEN: usize = 500;

/// Shopify Admin API GraphQL client.
///
/// Cheap to clone; clones share one connection pool.
///
/// # Security
///
/// The access token has HIGH PRIVILEGE access to the store. It never
/// appears in `Debug` output or logs.
#[derive(Clone)]
pub struct AdminClient {
    inner: Arc<AdminClientInner>,
}

struct AdminClientInner {
    client: reqwest::Client,
    endpoint: String,
    access_token: SecretString,
    page_delay: Duration,
}

impl std::fmt::Debug for AdminClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminClient")
            .field("endpoint", &self.inner.endpoint)
            .field("access_token", &"[REDACTED]")
            .field("page_delay", &self.inner.page_delay)
            .finish()
    }
}

/// GraphQL response wrapper.
#[derive(Debug, Deserialize)]
struct GraphQLResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQLErrorResponse>>,
}

#[derive(Debug, Deserialize)]
struct GraphQLErrorResponse {
    message: String,
    #[serde(default)]
    locations: Vec<GraphQLErrorLocationResponse>,
    #[serde(default)]
    path: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct GraphQLErrorLocationResponse {
    line: i64,
    column: i64,
}

impl AdminClient {
    /// Create a client for the store in `config`.
    ///
    /// # Errors
    ///
    /// Returns `AdminShopifyError::Http` if the HTTP client cannot be built.
    pub fn new(config: &ShopifyAdminConfig) -> Result<Self, AdminShopifyError> {
        Self::with_endpoint(config, config.graphql_endpoint())
    }

    /// Create a client that posts to `endpoint` instead of the store's
    /// public URL (used against local test servers).
    ///
    /// # Errors
    ///
    /// Returns `AdminShopifyError::Http` if the HTTP client cannot be built.
    pub fn with_endpoint(
        config: &ShopifyAdminConfig,
        endpoint: impl Into<String>,
    ) -> Result<Self, AdminShopifyError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(AdminClientInner {
                client,
                endpoint: endpoint.into(),
                access_token: config.access_token.clone(),
                page_delay: DEFAULT_PAGE_DELAY,
            }),
        })
    }

    /// Replace the pause between page requests.
    #[must_use]
    pub fn with_page_delay(self, page_delay: Duration) -> Self {
        Self {
            inner: Arc::new(AdminClientInner {
                client: self.inner.client.clone(),
                endpoint: self.inner.endpoint.clone(),
                access_token: self.inner.access_token.clone(),
                page_delay,
            }),
        }
    }

    /// The GraphQL endpoint requests are sent to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.inner.endpoint
    }

    // =========================================================================
    // GraphQL Execution
    // =========================================================================

    /// Execute a GraphQL document.
    async fn execute<V, R>(&self, body: QueryBody<V>) -> Result<R, AdminShopifyError>
    where
        V: Serialize,
        R: DeserializeOwned,
    {
        debug!(operation = body.operation_name, "Sending Admin API request");

        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            .header("X-Shopify-Access-Token", self.inner.access_token.expose_secret())
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();

        // Check for rate limiting
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(60);
            return Err(AdminShopifyError::RateLimited(retry_after));
        }

        // Check for unauthorized
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(AdminShopifyError::Unauthorized(format!(
                "Admin API rejected the access token (HTTP {})",
                status.as_u16()
            )));
        }

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AdminShopifyError::Status {
                status: status.as_u16(),
                body: text.chars().take(BODY_EXCERPT_LEN).collect(),
            });
        }

        let bytes = response.bytes().await?;
        let graphql_response: GraphQLResponse<R> = serde_json::from_slice(&bytes)?;

        // Check for GraphQL errors
        if let Some(errors) = graphql_response.errors
            && !errors.is_empty()
        {
            let converted_errors: Vec<GraphQLError> = errors
                .into_iter()
                .map(|e| GraphQLError {
                    message: e.message,
                    locations: e
                        .locations
                        .into_iter()
                        .map(|l| GraphQLErrorLocation {
                            line: l.line,
                            column: l.column,
                        })
                        .collect(),
                    path: e.path,
                })
                .collect();
            return Err(AdminShopifyError::GraphQL(converted_errors));
        }

        graphql_response.data.ok_or_else(|| {
            AdminShopifyError::GraphQL(vec![GraphQLError {
                message: "No data in response".to_string(),
                locations: vec![],
                path: vec![],
            }])
        })
    }

    /// Follow a product connection until `hasNextPage` is false.
    ///
    /// `fetch_page` receives the cursor of the previous page and returns that
    /// page's connection. Pages are concatenated in API order. A page that
    /// claims a successor without an `endCursor` is a `Parse` error.
    async fn paginate<F, Fut>(
        &self,
        label: &str,
        mut fetch_page: F,
    ) -> Result<Vec<ProductRecord>, AdminShopifyError>
    where
        F: FnMut(Option<String>) -> Fut,
        Fut: Future<Output = Result<Connection<ProductRecord>, AdminShopifyError>>,
    {
        let mut records = Vec::new();
        let mut cursor: Option<String> = None;
        let mut page = 1_u32;

        loop {
            info!(source = label, page, "Fetching page");
            let (nodes, page_info) = fetch_page(cursor.take()).await?.into_nodes();
            records.extend(nodes);

            match page_info {
                PageInfo {
                    has_next_page: false,
                    ..
                } => break,
                PageInfo {
                    end_cursor: Some(end_cursor),
                    ..
                } => cursor = Some(end_cursor),
                PageInfo {
                    end_cursor: None, ..
                } => {
                    let message = format!("{label} page {page} has a next page but no end cursor");
                    return Err(AdminShopifyError::Parse(
                        <serde_json::Error as serde::de::Error>::custom(message),
                    ));
                }
            }
            page += 1;
            self.pause().await;
        }

        info!(source = label, count = records.len(), "Fetched products");
        Ok(records)
    }

    async fn pause(&self) {
        if !self.inner.page_delay.is_zero() {
            tokio::time::sleep(self.inner.page_delay).await;
        }
    }
}
