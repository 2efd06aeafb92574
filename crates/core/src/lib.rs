//! Shopify catalog core - shared types library.
//!
//! This crate provides the types and pure transformations used across the
//! catalog components:
//! - `shopify-catalog` - Admin API client, file formats and translation services
//! - `cli` - The `catalog` command-line tool
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. This keeps it lightweight and trivially testable.
//!
//! # Modules
//!
//! - [`types`] - Shopify GIDs, locales, product records, translation payloads
//! - [`annotate`] - Language annotation of fetched records
//! - [`flatten`] - Records to/from flat string tables (CSV, spreadsheets)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod annotate;
pub mod flatten;
pub mod types;

pub use annotate::{annotate, annotate_record};
pub use flatten::{FlatTable, from_table, to_table};
pub use types::*;
