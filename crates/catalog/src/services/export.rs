//! Fetch exports: raw and language-annotated record files.

use std::path::{Path, PathBuf};

use shopify_catalog_core::{LanguagePair, ProductRecord, annotate};
use tracing::{info, instrument};

use crate::error::AppError;
use crate::formats::{self, Format, FormatError};
use crate::shopify::{AdminClient, ProductSelector};

/// Where and in which formats exports are written.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Directory for every file (created if missing).
    pub output_dir: PathBuf,
    /// Also write `<prefix>_with_lang.csv`.
    pub csv: bool,
    /// Also write `<prefix>_with_lang.xlsx`.
    pub xlsx: bool,
}

impl ExportOptions {
    /// All formats into `output_dir`.
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            csv: true,
            xlsx: true,
        }
    }
}

/// Files written by one export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    /// Number of records exported.
    pub count: usize,
    /// `<prefix>_raw.json`.
    pub raw: PathBuf,
    /// Annotated files, JSON first.
    pub annotated: Vec<PathBuf>,
}

/// Write `records` unannotated to `<prefix>_raw.json`, then annotated with
/// `languages` to `<prefix>_with_lang.{json,csv,xlsx}`.
///
/// # Errors
///
/// Returns `FormatError::Io` if the directory cannot be created, or any
/// error from writing a file.
#[instrument(skip(records, options), fields(count = records.len(), dir = %options.output_dir.display()))]
pub fn export_records(
    records: &[ProductRecord],
    languages: &LanguagePair,
    prefix: &str,
    options: &ExportOptions,
) -> Result<ExportSummary, FormatError> {
    std::fs::create_dir_all(&options.output_dir).map_err(|source| FormatError::Io {
        path: options.output_dir.clone(),
        source,
    })?;

    let raw = file_path(&options.output_dir, &format!("{prefix}_raw"), Format::Json);
    formats::write_records(&raw, records)?;
    info!(path = %raw.display(), "Saved raw export");

    let annotated_records = annotate(records, languages);
    let stem = format!("{prefix}_with_lang");

    let mut targets = vec![Format::Json];
    if options.csv {
        targets.push(Format::Csv);
    }
    if options.xlsx {
        targets.push(Format::Xlsx);
    }

    let mut annotated = Vec::with_capacity(targets.len());
    for format in targets {
        let path = file_path(&options.output_dir, &stem, format);
        formats::write_records(&path, &annotated_records)?;
        info!(path = %path.display(), "Saved annotated export");
        annotated.push(path);
    }

    Ok(ExportSummary {
        count: records.len(),
        raw,
        annotated,
    })
}

fn file_path(dir: &Path, stem: &str, format: Format) -> PathBuf {
    dir.join(format!("{stem}.{}", format.extension()))
}

/// Fetch the products matched by `selector` and export them.
///
/// # Errors
///
/// Returns `AppError::NoProducts` if nothing matched, or any fetch or
/// write error.
pub async fn fetch_and_export(
    client: &AdminClient,
    selector: &ProductSelector,
    languages: &LanguagePair,
    options: &ExportOptions,
) -> Result<ExportSummary, AppError> {
    let records = client.fetch_products(selector).await?;
    if records.is_empty() {
        return Err(AppError::NoProducts(selector.to_string()));
    }

    Ok(export_records(
        &records,
        languages,
        &selector.file_prefix(),
        options,
    )?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records() -> Vec<ProductRecord> {
        vec![
            serde_json::from_value(json!({
                "id": "gid://shopify/Product/1",
                "handle": "lamp",
                "title": "مصباح",
                "descriptionHtml": "<p>ضوء</p>",
                "tags": ["summer"],
                "seo": {"title": null, "description": null},
            }))
            .unwrap(),
        ]
    }

    #[test]
    fn test_export_writes_raw_and_annotated_files() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("exports");
        let languages = LanguagePair::new("ar", "en").unwrap();

        let summary =
            export_records(&records(), &languages, "products", &ExportOptions::new(&out)).unwrap();

        assert_eq!(summary.count, 1);
        assert_eq!(summary.raw, out.join("products_raw.json"));
        assert_eq!(
            summary.annotated,
            [
                out.join("products_with_lang.json"),
                out.join("products_with_lang.csv"),
                out.join("products_with_lang.xlsx"),
            ]
        );

        let raw = formats::read_records(&summary.raw, None).unwrap();
        assert_eq!(raw, records());

        let annotated = formats::read_records(&summary.annotated[0], None).unwrap();
        assert_eq!(annotated[0].get_str("original_language"), Some("ar"));
        assert_eq!(annotated[0].get_str("target_language"), Some("en"));
        assert_eq!(annotated[0].get_str("title_ar"), Some("مصباح"));
        assert_eq!(annotated[0].get_str("title_en"), Some(""));
    }

    #[test]
    fn test_export_skips_disabled_formats() {
        let dir = tempfile::tempdir().unwrap();
        let languages = LanguagePair::new("ar", "en").unwrap();
        let options = ExportOptions {
            output_dir: dir.path().to_path_buf(),
            csv: false,
            xlsx: false,
        };

        let summary = export_records(&records(), &languages, "single_product_lamp", &options)
            .unwrap();

        assert_eq!(summary.annotated.len(), 1);
        assert!(!dir.path().join("single_product_lamp_with_lang.csv").exists());
        assert!(!dir.path().join("single_product_lamp_with_lang.xlsx").exists());
    }
}
