//! Shopify catalog tools.
//!
//! Exports products from the Admin API, converts record files between JSON,
//! CSV and XLSX, fills translations with an AI translator and registers them
//! back with the store.
//!
//! # Security
//!
//! This crate uses a HIGH PRIVILEGE Admin API access token. The token and
//! the `OpenAI` key are held as `SecretString` and never logged.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod formats;
pub mod openai;
pub mod services;
pub mod shopify;

pub use config::{CatalogConfig, ConfigError, OpenAIConfig, ShopifyAdminConfig};
pub use error::AppError;
pub use shopify::{AdminClient, AdminShopifyError, ProductSelector};
