//! Unified error handling for the catalog tools.

use shopify_catalog_core::{LocaleError, RecordError};
use thiserror::Error;

use crate::config::ConfigError;
use crate::formats::FormatError;
use crate::openai::TranslationServiceError;
use crate::shopify::AdminShopifyError;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Shopify API operation failed.
    #[error("Shopify error: {0}")]
    Shopify(#[from] AdminShopifyError),

    /// Reading or writing a record file failed.
    #[error("File error: {0}")]
    Format(#[from] FormatError),

    /// Completion API call failed.
    #[error("Translation service error: {0}")]
    Translation(#[from] TranslationServiceError),

    /// A record is missing a required field or has a bad id.
    #[error("Invalid record: {0}")]
    Record(#[from] RecordError),

    /// A locale code is malformed.
    #[error("Invalid locale: {0}")]
    Locale(#[from] LocaleError),

    /// The selector matched nothing.
    #[error("No products found for {0}")]
    NoProducts(String),

    /// Some records failed; the rest were processed.
    #[error("{failed} of {total} records failed to {action}")]
    Incomplete {
        /// Operation that was run.
        action: &'static str,
        /// Records that failed.
        failed: usize,
        /// Records processed.
        total: usize,
    },

    /// Bad command-line input.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
}

impl AppError {
    /// A remediation hint for the user, when there is an obvious one.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Config(ConfigError::MissingEnvVar(_) | ConfigError::InsecureSecret(..)) => Some(
                "Set the variable in the environment or in a .env file in the working directory.",
            ),
            Self::Shopify(AdminShopifyError::Unauthorized(_)) => Some(
                "Check SHOPIFY_ADMIN_ACCESS_TOKEN and that the app has the read_products, \
                 read_translations and write_translations scopes.",
            ),
            Self::Shopify(AdminShopifyError::RateLimited(_)) => {
                Some("Shopify is throttling requests; wait a minute and run again.")
            }
            Self::Shopify(AdminShopifyError::MissingDigest(_)) => Some(
                "The product has no primary content for that field; rerun with --ensure-base \
                 (needs write_products).",
            ),
            Self::Shopify(AdminShopifyError::Http(_) | AdminShopifyError::Status { .. }) => {
                Some("Check SHOPIFY_STORE_DOMAIN and your network connection.")
            }
            Self::Translation(TranslationServiceError::Unauthorized(_)) => {
                Some("Check OPENAI_API_KEY.")
            }
            Self::Format(FormatError::UnsupportedFormat(_)) => {
                Some("Use a .json, .csv or .xlsx file.")
            }
            Self::NoProducts(_) => Some("Check the handle, id, tag or collection name."),
            Self::Incomplete { .. } => Some("See the failures logged above; fix them and rerun."),
            _ => None,
        }
    }
}
