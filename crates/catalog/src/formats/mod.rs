//! Record files: JSON arrays, CSV tables and single-sheet XLSX workbooks.
//!
//! The format is chosen from the file extension. CSV and XLSX hold the
//! flattened form of the records (see [`shopify_catalog_core::flatten`]),
//! so reading one back and writing JSON reproduces the original values
//! with every scalar as a string.

mod csv;
mod json;
mod xlsx;

use std::path::{Path, PathBuf};

use shopify_catalog_core::ProductRecord;
use thiserror::Error;
use tracing::{info, instrument};

/// Sheet name used for fetch exports.
pub const PRODUCTS_SHEET: &str = "Products";

/// Sheet name used by the converter.
pub const CONVERTED_SHEET: &str = "translations";

/// Errors that can occur when reading or writing record files.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The extension does not name a supported format.
    #[error("Unsupported file format '{0}' (expected .json, .csv or .xlsx)")]
    UnsupportedFormat(String),

    /// Reading or writing the file failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File being read or written.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV encoding or decoding failed.
    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),

    /// Writing the workbook failed.
    #[error("XLSX write error: {0}")]
    XlsxWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Reading the workbook failed.
    #[error("Spreadsheet read error: {0}")]
    XlsxRead(#[from] calamine::Error),

    /// The file parsed but does not hold product records.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl FormatError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// A supported record file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Pretty-printed JSON array.
    Json,
    /// Comma-separated values with a header row.
    Csv,
    /// Office Open XML workbook.
    Xlsx,
    /// Legacy Excel workbook (read only).
    Xls,
}

impl Format {
    /// Pick the format from `path`'s extension (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedFormat` for a missing or unknown extension.
    pub fn from_path(path: &Path) -> Result<Self, FormatError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "xlsx" => Ok(Self::Xlsx),
            "xls" => Ok(Self::Xls),
            _ => Err(FormatError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// The file extension written for this format.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
            Self::Xls => "xls",
        }
    }
}

/// Write `records` to `path` in the format its extension names.
///
/// XLSX output uses the [`PRODUCTS_SHEET`] sheet.
///
/// # Errors
///
/// Returns `UnsupportedFormat` for unknown extensions (and `.xls`), or an
/// error if encoding or writing fails.
pub fn write_records(path: &Path, records: &[ProductRecord]) -> Result<(), FormatError> {
    write_records_in_sheet(path, records, PRODUCTS_SHEET)
}

/// Like [`write_records`], naming the XLSX sheet.
///
/// # Errors
///
/// See [`write_records`].
#[instrument(skip(records), fields(path = %path.display(), count = records.len()))]
pub fn write_records_in_sheet(
    path: &Path,
    records: &[ProductRecord],
    sheet: &str,
) -> Result<(), FormatError> {
    match Format::from_path(path)? {
        Format::Json => json::write(path, records),
        Format::Csv => csv::write(path, records),
        Format::Xlsx => xlsx::write(path, records, sheet),
        Format::Xls => Err(FormatError::UnsupportedFormat(format!(
            "{} (.xls can be read but not written)",
            path.display()
        ))),
    }
}

/// Read records from `path`.
///
/// `sheet` picks the worksheet of a workbook (first sheet when `None`) and
/// is ignored for other formats.
///
/// # Errors
///
/// Returns `UnsupportedFormat` for unknown extensions, or an error if the
/// file cannot be read or does not hold records.
#[instrument(fields(path = %path.display()))]
pub fn read_records(path: &Path, sheet: Option<&str>) -> Result<Vec<ProductRecord>, FormatError> {
    let records = match Format::from_path(path)? {
        Format::Json => json::read(path)?,
        Format::Csv => csv::read(path)?,
        Format::Xlsx | Format::Xls => xlsx::read(path, sheet)?,
    };
    info!(count = records.len(), "Read records");
    Ok(records)
}

/// Convert a record file to another format.
///
/// Without `output`, writes next to `input` with an `.xlsx` extension.
/// Returns the path written.
///
/// # Errors
///
/// Returns `InvalidInput` if the output would overwrite the input, or any
/// error from reading or writing.
pub fn convert(input: &Path, output: Option<&Path>) -> Result<PathBuf, FormatError> {
    let output = output.map_or_else(
        || input.with_extension(Format::Xlsx.extension()),
        Path::to_path_buf,
    );
    if output == input {
        return Err(FormatError::InvalidInput(format!(
            "output {} would overwrite the input",
            output.display()
        )));
    }

    let records = read_records(input, None)?;
    write_records_in_sheet(&output, &records, CONVERTED_SHEET)?;
    info!(
        input = %input.display(),
        output = %output.display(),
        count = records.len(),
        "Converted"
    );
    Ok(output)
}
