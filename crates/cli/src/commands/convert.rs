//! Record file conversion (`convert`).

use std::path::Path;

use shopify_catalog::AppError;
use shopify_catalog::formats;

/// Convert `input` to `output` (default: `.xlsx` next to the input).
pub fn run(input: &Path, output: Option<&Path>) -> Result<(), AppError> {
    let written = formats::convert(input, output)?;
    tracing::info!(path = %written.display(), "Converted");
    Ok(())
}
