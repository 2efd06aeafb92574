//! Product export commands (`all`, `single`, `tag`, `collection`).
//!
//! # Environment Variables
//!
//! - `SHOPIFY_STORE_DOMAIN`, `SHOPIFY_ADMIN_ACCESS_TOKEN` - Admin API access
//! - `ORIGINAL_LANGUAGE`, `TARGET_LANGUAGE` - Annotation languages
//! - `OUTPUT_DIR` - Export directory (overridden by `--output-dir`)

use std::path::PathBuf;

use shopify_catalog::services::{ExportOptions, fetch_and_export};
use shopify_catalog::{AdminClient, AppError, CatalogConfig, ProductSelector};

/// Global export flags.
pub struct ExportFlags {
    pub output_dir: Option<PathBuf>,
    pub csv: bool,
    pub xlsx: bool,
}

/// Fetch the selected products and write the export files.
pub async fn run(selector: ProductSelector, flags: &ExportFlags) -> Result<(), AppError> {
    let config = CatalogConfig::from_env()?;
    let client = AdminClient::new(&config.shopify)?;

    let options = ExportOptions {
        output_dir: flags
            .output_dir
            .clone()
            .unwrap_or_else(|| config.output_dir.clone()),
        csv: flags.csv,
        xlsx: flags.xlsx,
    };

    tracing::info!(
        selector = %selector,
        original = %config.languages.original,
        target = %config.languages.target,
        "Exporting products"
    );
    let summary = fetch_and_export(&client, &selector, &config.languages, &options).await?;

    tracing::info!(
        count = summary.count,
        raw = %summary.raw.display(),
        "Export complete"
    );
    for path in &summary.annotated {
        tracing::info!(path = %path.display(), "Wrote");
    }
    Ok(())
}
