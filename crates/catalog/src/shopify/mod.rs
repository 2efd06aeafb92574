//! Shopify Admin API client (HIGH PRIVILEGE).
//!
//! # Security
//!
//! **This module uses the Admin API access token.** The token can read and
//! write the whole catalog, so keep it out of logs (it is held in a
//! `SecretString`) and out of exported files.
//!
//! # Architecture
//!
//! - GraphQL documents are plain strings sent through
//!   `graphql_client::QueryBody`; responses deserialize into small serde
//!   structs, while product nodes stay dynamic ([`ProductRecord`])
//! - Direct API calls to Shopify, one request at a time
//! - Cursor pagination is followed to the end with a short pause per page
//!
//! # Example
//!
//! ```rust,ignore
//! use shopify_catalog::shopify::{AdminClient, ProductSelector};
//!
//! let client = AdminClient::new(&config.shopify)?;
//!
//! // Every product tagged "summer", in API order
//! let products = client.fetch_products(&ProductSelector::Tag("summer".into())).await?;
//!
//! // A single product by handle
//! let lamp = client.fetch_product_by_handle("desk-lamp").await?;
//! ```
//!
//! [`ProductRecord`]: shopify_catalog_core::ProductRecord

mod admin;

pub use admin::{
    AdminClient, DEFAULT_PAGE_DELAY, PAGE_SIZE, ProductSelector,
    queries::CollectionNode,
    translations::{StoredTranslation, TranslationDigests},
};

use thiserror::Error;

/// Errors that can occur when interacting with Shopify Admin API.
#[derive(Debug, Error)]
pub enum AdminShopifyError {
    /// HTTP request failed (connection, DNS, TLS, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status other than 401/403/429.
    #[error("HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body excerpt.
        body: String,
    },

    /// GraphQL query returned errors.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by Shopify.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Authentication/authorization failed.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User error from mutation (e.g., invalid input).
    #[error("User error: {0}")]
    UserError(String),

    /// Shopify has no content digest for a key we want to translate.
    #[error("Missing digest for '{0}' (primary content empty or not indexed yet)")]
    MissingDigest(String),
}

impl AdminShopifyError {
    /// Whether the failure happened below the GraphQL layer.
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Status { .. })
    }
}

/// A GraphQL error returned by the Shopify Admin API.
#[derive(Debug, Clone)]
pub struct GraphQLError {
    /// Error message.
    pub message: String,
    /// Source locations in the query.
    pub locations: Vec<GraphQLErrorLocation>,
    /// Path to the error in the response.
    pub path: Vec<serde_json::Value>,
}

/// Location in a GraphQL query where an error occurred.
#[derive(Debug, Clone)]
pub struct GraphQLErrorLocation {
    /// Line number (1-indexed).
    pub line: i64,
    /// Column number (1-indexed).
    pub column: i64,
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    errors
        .iter()
        .map(|e| e.message.clone())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_shopify_error_display() {
        let err = AdminShopifyError::NotFound("product with handle 'lamp'".to_string());
        assert_eq!(err.to_string(), "Not found: product with handle 'lamp'");
    }

    #[test]
    fn test_graphql_error_formatting() {
        let errors = vec![
            GraphQLError {
                message: "Field not found".to_string(),
                locations: vec![],
                path: vec![],
            },
            GraphQLError {
                message: "Invalid ID".to_string(),
                locations: vec![GraphQLErrorLocation { line: 2, column: 3 }],
                path: vec![],
            },
        ];
        let err = AdminShopifyError::GraphQL(errors);
        assert_eq!(
            err.to_string(),
            "GraphQL errors: Field not found; Invalid ID"
        );
    }

    #[test]
    fn test_status_error_is_network() {
        let err = AdminShopifyError::Status {
            status: 502,
            body: "Bad Gateway".to_string(),
        };
        assert!(err.is_network());
        assert_eq!(err.to_string(), "HTTP 502: Bad Gateway");
        assert!(!AdminShopifyError::Unauthorized("x".to_string()).is_network());
    }

    #[test]
    fn test_missing_digest_error() {
        let err = AdminShopifyError::MissingDigest("body_html".to_string());
        assert!(err.to_string().starts_with("Missing digest for 'body_html'"));
    }
}
