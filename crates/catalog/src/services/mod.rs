//! Catalog workflows built on the Admin client and the file formats.
//!
//! # Services
//!
//! - `export` - Fetch products and write raw and language-annotated files
//! - `translate` - Fill target-language columns with an AI translator
//! - `upload` - Register translated columns as Shopify translations

pub mod export;
pub mod translate;
pub mod upload;

pub use export::{ExportOptions, ExportSummary, export_records, fetch_and_export};
pub use translate::{
    DEFAULT_CACHE_PATH, PostProcessOptions, TranslateOptions, TranslateOutcome, TranslateReport,
    TranslationCache, Translator, default_output_path, translate_file,
};
pub use upload::{TranslationUploader, UploadOptions, UploadReport};

/// A record that could not be processed; the rest of the run carried on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFailure {
    /// 1-based position in the input.
    pub row: usize,
    /// Id as given in the input (may be empty or invalid).
    pub product_id: String,
    /// What went wrong.
    pub reason: String,
}
