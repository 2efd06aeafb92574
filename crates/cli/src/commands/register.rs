//! Translation registration (`register`).
//!
//! Reads translated columns from a record file, or takes a single product
//! from flags, and registers the values as Shopify translations.
//!
//! # Environment Variables
//!
//! - `SHOPIFY_STORE_DOMAIN`, `SHOPIFY_ADMIN_ACCESS_TOKEN` - Admin API access
//!   (needs `read_translations`/`write_translations`, plus `write_products`
//!   for `--ensure-base`)
//! - `TARGET_LANGUAGE` - Locale used when `--locale` is not given

use std::path::PathBuf;

use shopify_catalog::config::languages_from_env;
use shopify_catalog::formats;
use shopify_catalog::services::{TranslationUploader, UploadOptions};
use shopify_catalog::{AdminClient, AppError, ShopifyAdminConfig};
use shopify_catalog_core::{Locale, ProductRecord, TranslatableField, TranslationColumns};

/// Where the translated values come from.
pub enum RegisterSource {
    /// A JSON/CSV/XLSX file, optionally a named worksheet.
    File { path: PathBuf, sheet: Option<String> },
    /// One product given on the command line.
    Flags {
        id: String,
        title: Option<String>,
        desc: Option<String>,
    },
}

pub struct RegisterArgs {
    pub source: RegisterSource,
    pub id_col: String,
    pub title_col: Option<String>,
    pub desc_col: Option<String>,
    pub seo_title_col: Option<String>,
    pub seo_desc_col: Option<String>,
    pub locale: Option<String>,
    pub ensure_base: bool,
    pub base_title: Option<String>,
    pub base_desc: Option<String>,
    pub verify: bool,
}

/// Register every record's translations and fail if any record failed.
pub async fn run(args: RegisterArgs) -> Result<(), AppError> {
    let locale = match &args.locale {
        Some(code) => Locale::parse(code)?,
        None => languages_from_env()?.target,
    };
    let shopify = ShopifyAdminConfig::from_env()?;
    let client = AdminClient::new(&shopify)?;

    let columns = columns(&args, &locale);
    let records = match args.source {
        RegisterSource::File { path, sheet } => formats::read_records(&path, sheet.as_deref())?,
        RegisterSource::Flags { id, title, desc } => vec![flag_record(&columns, id, title, desc)],
    };

    let mut options = UploadOptions::new(locale);
    options.columns = columns;
    options.ensure_base = args.ensure_base;
    options.verify = args.verify;
    if let Some(title) = args.base_title {
        options.base_title = title;
    }
    if let Some(desc) = args.base_desc {
        options.base_description = desc;
    }

    let report = TranslationUploader::new(client, options)
        .upload(&records)
        .await?
        .into_result()?;
    tracing::info!(
        registered = report.registered,
        skipped = report.skipped,
        "Registration complete"
    );
    Ok(())
}

fn columns(args: &RegisterArgs, locale: &Locale) -> TranslationColumns {
    let overrides = [
        (TranslatableField::Title, &args.title_col),
        (TranslatableField::DescriptionHtml, &args.desc_col),
        (TranslatableField::SeoTitle, &args.seo_title_col),
        (TranslatableField::SeoDescription, &args.seo_desc_col),
    ];

    overrides.into_iter().fold(
        TranslationColumns::for_locale(locale).with_id_column(&args.id_col),
        |columns, (field, column)| match column {
            Some(column) => columns.with_column(field, column),
            None => columns,
        },
    )
}

fn column_of(columns: &TranslationColumns, field: TranslatableField) -> String {
    columns
        .fields
        .iter()
        .find(|(f, _)| *f == field)
        .map_or_else(String::new, |(_, column)| column.clone())
}

/// A one-row record built from `--id`, `--title` and `--desc`.
fn flag_record(
    columns: &TranslationColumns,
    id: String,
    title: Option<String>,
    desc: Option<String>,
) -> ProductRecord {
    let mut record = ProductRecord::new();
    record.insert(columns.id.clone(), id);
    if let Some(title) = title {
        record.insert(column_of(columns, TranslatableField::Title), title);
    }
    if let Some(desc) = desc {
        record.insert(column_of(columns, TranslatableField::DescriptionHtml), desc);
    }
    record
}
