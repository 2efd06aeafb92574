//! Configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required (commands that talk to the Admin API)
//! - `SHOPIFY_STORE_DOMAIN` - Store domain (e.g., your-store.myshopify.com)
//! - `SHOPIFY_ADMIN_ACCESS_TOKEN` - Admin API access token (HIGH PRIVILEGE)
//!
//! ## Required (AI translation)
//! - `OPENAI_API_KEY` - `OpenAI` API key
//!
//! ## Optional
//! - `SHOPIFY_API_VERSION` - API version (default: 2025-07)
//! - `SHOPIFY_REQUEST_TIMEOUT_SECS` - Per-request timeout (default: 60)
//! - `ORIGINAL_LANGUAGE` - Language of the store's content (default: ar)
//! - `TARGET_LANGUAGE` - Language to translate into (default: en)
//! - `OUTPUT_DIR` - Directory for exports (default: exports)
//! - `OPENAI_MODEL` - Completion model (default: gpt-4o-mini)
//!
//! Every loader calls `dotenvy::dotenv()` first, so a `.env` file in the
//! working directory is honoured.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use shopify_catalog_core::LanguagePair;
use thiserror::Error;

const DEFAULT_API_VERSION: &str = "2025-07";
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_ORIGINAL_LANGUAGE: &str = "ar";
const DEFAULT_TARGET_LANGUAGE: &str = "en";
const DEFAULT_OUTPUT_DIR: &str = "exports";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "your_",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxxx",
    "todo",
    "insert",
    "put-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Shopify Admin API configuration.
///
/// Implements `Debug` manually to redact the HIGH PRIVILEGE token.
#[derive(Clone)]
pub struct ShopifyAdminConfig {
    /// Store domain (e.g., your-store.myshopify.com), without scheme
    pub store_domain: String,
    /// API version (e.g., 2025-07)
    pub api_version: String,
    /// Admin API access token (HIGH PRIVILEGE - full store access)
    pub access_token: SecretString,
    /// Timeout applied to every request
    pub request_timeout: Duration,
}

impl std::fmt::Debug for ShopifyAdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyAdminConfig")
            .field("store_domain", &self.store_domain)
            .field("api_version", &self.api_version)
            .field("access_token", &"[REDACTED]")
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl ShopifyAdminConfig {
    /// Load the Admin API settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the domain or token is missing, or the token
    /// looks like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(&env_lookup)
    }

    fn from_lookup(lookup: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let store_domain = normalize_store_domain(&required(lookup, "SHOPIFY_STORE_DOMAIN")?);
        if store_domain.is_empty() {
            return Err(ConfigError::MissingEnvVar("SHOPIFY_STORE_DOMAIN".to_string()));
        }

        let access_token = required(lookup, "SHOPIFY_ADMIN_ACCESS_TOKEN")?;
        validate_not_placeholder(&access_token, "SHOPIFY_ADMIN_ACCESS_TOKEN")?;

        let timeout_secs = or_default(
            lookup,
            "SHOPIFY_REQUEST_TIMEOUT_SECS",
            &DEFAULT_TIMEOUT_SECS.to_string(),
        )
        .parse::<u64>()
        .map_err(|e| {
            ConfigError::InvalidEnvVar("SHOPIFY_REQUEST_TIMEOUT_SECS".to_string(), e.to_string())
        })?;

        Ok(Self {
            store_domain,
            api_version: or_default(lookup, "SHOPIFY_API_VERSION", DEFAULT_API_VERSION),
            access_token: SecretString::from(access_token),
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// The Admin GraphQL endpoint for this store and API version.
    #[must_use]
    pub fn graphql_endpoint(&self) -> String {
        format!(
            "https://{}/admin/api/{}/graphql.json",
            self.store_domain, self.api_version
        )
    }
}

/// `OpenAI` configuration for the AI translator.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct OpenAIConfig {
    /// `OpenAI` API key
    pub api_key: SecretString,
    /// Chat completion model
    pub model: String,
}

impl std::fmt::Debug for OpenAIConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAIConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .finish()
    }
}

impl OpenAIConfig {
    /// Load the `OpenAI` settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if `OPENAI_API_KEY` is not set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(&env_lookup)
    }

    fn from_lookup(lookup: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_key = required(lookup, "OPENAI_API_KEY")?;
        validate_not_placeholder(&api_key, "OPENAI_API_KEY")?;
        Ok(Self {
            api_key: SecretString::from(api_key),
            model: or_default(lookup, "OPENAI_MODEL", DEFAULT_OPENAI_MODEL),
        })
    }
}

/// Settings shared by every catalog command.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Admin API connection
    pub shopify: ShopifyAdminConfig,
    /// Original and target language
    pub languages: LanguagePair,
    /// Where exports are written
    pub output_dir: PathBuf,
}

impl CatalogConfig {
    /// Load the full configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if Shopify credentials are missing or a
    /// language code is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(&env_lookup)
    }

    fn from_lookup(lookup: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            shopify: ShopifyAdminConfig::from_lookup(lookup)?,
            languages: languages_from_lookup(lookup)?,
            output_dir: PathBuf::from(or_default(lookup, "OUTPUT_DIR", DEFAULT_OUTPUT_DIR)),
        })
    }
}

/// Load only the language pair (for commands that never call Shopify).
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` if a language code is invalid.
pub fn languages_from_env() -> Result<LanguagePair, ConfigError> {
    let _ = dotenvy::dotenv();
    languages_from_lookup(&env_lookup)
}

fn languages_from_lookup(
    lookup: &dyn Fn(&str) -> Option<String>,
) -> Result<LanguagePair, ConfigError> {
    let original = or_default(lookup, "ORIGINAL_LANGUAGE", DEFAULT_ORIGINAL_LANGUAGE);
    let target = or_default(lookup, "TARGET_LANGUAGE", DEFAULT_TARGET_LANGUAGE);
    LanguagePair::new(&original, &target).map_err(|e| {
        ConfigError::InvalidEnvVar("ORIGINAL_LANGUAGE/TARGET_LANGUAGE".to_string(), e.to_string())
    })
}

// =============================================================================
// Helper Functions
// =============================================================================

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get a required, non-blank variable.
fn required(lookup: &dyn Fn(&str) -> Option<String>, key: &str) -> Result<String, ConfigError> {
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a variable with a default for missing or blank values.
fn or_default(lookup: &dyn Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Strip a scheme and trailing slashes from a store domain.
fn normalize_store_domain(domain: &str) -> String {
    domain
        .trim()
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/')
        .to_string()
}

/// Reject values copied verbatim from a sample `.env`.
fn validate_not_placeholder(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_catalog_config_defaults() {
        let lookup = lookup_from(&[
            ("SHOPIFY_STORE_DOMAIN", "https://demo.myshopify.com/"),
            ("SHOPIFY_ADMIN_ACCESS_TOKEN", "shpat_9f8e7d6c5b4a"),
        ]);
        let config = CatalogConfig::from_lookup(&lookup).unwrap();

        assert_eq!(config.shopify.store_domain, "demo.myshopify.com");
        assert_eq!(config.shopify.api_version, DEFAULT_API_VERSION);
        assert_eq!(config.shopify.request_timeout, Duration::from_secs(60));
        assert_eq!(config.languages.original.as_str(), "ar");
        assert_eq!(config.languages.target.as_str(), "en");
        assert_eq!(config.output_dir, PathBuf::from("exports"));
    }

    #[test]
    fn test_catalog_config_overrides() {
        let lookup = lookup_from(&[
            ("SHOPIFY_STORE_DOMAIN", "demo.myshopify.com"),
            ("SHOPIFY_ADMIN_ACCESS_TOKEN", "shpat_9f8e7d6c5b4a"),
            ("SHOPIFY_API_VERSION", "2024-10"),
            ("SHOPIFY_REQUEST_TIMEOUT_SECS", "5"),
            ("ORIGINAL_LANGUAGE", "en"),
            ("TARGET_LANGUAGE", "fr"),
            ("OUTPUT_DIR", "out"),
        ]);
        let config = CatalogConfig::from_lookup(&lookup).unwrap();

        assert_eq!(config.shopify.api_version, "2024-10");
        assert_eq!(config.shopify.request_timeout, Duration::from_secs(5));
        assert_eq!(config.languages.target.as_str(), "fr");
        assert_eq!(config.output_dir, PathBuf::from("out"));
    }

    #[test]
    fn test_missing_credentials_fail_fast() {
        let lookup = lookup_from(&[("SHOPIFY_STORE_DOMAIN", "demo.myshopify.com")]);
        let err = CatalogConfig::from_lookup(&lookup).unwrap_err();
        assert!(
            matches!(err, ConfigError::MissingEnvVar(ref v) if v == "SHOPIFY_ADMIN_ACCESS_TOKEN")
        );

        let lookup = lookup_from(&[("SHOPIFY_ADMIN_ACCESS_TOKEN", "shpat_9f8e7d6c5b4a")]);
        let err = ShopifyAdminConfig::from_lookup(&lookup).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref v) if v == "SHOPIFY_STORE_DOMAIN"));
    }

    #[test]
    fn test_placeholder_token_rejected() {
        let lookup = lookup_from(&[
            ("SHOPIFY_STORE_DOMAIN", "demo.myshopify.com"),
            ("SHOPIFY_ADMIN_ACCESS_TOKEN", "shpat_XXXXXXXXXXXXXXXX"),
        ]);
        let err = ShopifyAdminConfig::from_lookup(&lookup).unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_invalid_timeout() {
        let lookup = lookup_from(&[
            ("SHOPIFY_STORE_DOMAIN", "demo.myshopify.com"),
            ("SHOPIFY_ADMIN_ACCESS_TOKEN", "shpat_9f8e7d6c5b4a"),
            ("SHOPIFY_REQUEST_TIMEOUT_SECS", "soon"),
        ]);
        let err = ShopifyAdminConfig::from_lookup(&lookup).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_invalid_language() {
        let lookup = lookup_from(&[("TARGET_LANGUAGE", "en us")]);
        assert!(languages_from_lookup(&lookup).is_err());
    }

    #[test]
    fn test_graphql_endpoint() {
        let config = ShopifyAdminConfig {
            store_domain: "demo.myshopify.com".to_string(),
            api_version: "2025-07".to_string(),
            access_token: SecretString::from("shpat_9f8e7d6c5b4a"),
            request_timeout: Duration::from_secs(60),
        };
        assert_eq!(
            config.graphql_endpoint(),
            "https://demo.myshopify.com/admin/api/2025-07/graphql.json"
        );
    }

    #[test]
    fn test_openai_config() {
        let lookup = lookup_from(&[("OPENAI_API_KEY", "sk-proj-4f9a2b7c")]);
        let config = OpenAIConfig::from_lookup(&lookup).unwrap();
        assert_eq!(config.model, DEFAULT_OPENAI_MODEL);

        let err = OpenAIConfig::from_lookup(&lookup_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(_)));
    }

    #[test]
    fn test_shopify_config_debug_redacts_secrets() {
        let config = ShopifyAdminConfig {
            store_domain: "demo.myshopify.com".to_string(),
            api_version: "2025-07".to_string(),
            access_token: SecretString::from("shpat_super_secret_token"),
            request_timeout: Duration::from_secs(60),
        };

        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("demo.myshopify.com"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("shpat_super_secret_token"));
    }

    #[test]
    fn test_openai_config_debug_redacts_secrets() {
        let config = OpenAIConfig {
            api_key: SecretString::from("sk-super-secret"),
            model: "gpt-4o-mini".to_string(),
        };
        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("gpt-4o-mini"));
        assert!(!debug_output.contains("sk-super-secret"));
    }
}
