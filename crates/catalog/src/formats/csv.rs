//! CSV record files: a header row of flattened column names, one row per
//! record.

use std::fs::File;
use std::path::Path;

use shopify_catalog_core::{ProductRecord, from_table, to_table};

use super::FormatError;

const UTF8_BOM: char = '\u{feff}';

/// No records (and so no columns) writes an empty file.
pub(super) fn write(path: &Path, records: &[ProductRecord]) -> Result<(), FormatError> {
    let file = File::create(path).map_err(|e| FormatError::io(path, e))?;
    let table = to_table(records);
    if table.columns.is_empty() {
        return Ok(());
    }

    let mut wtr = ::csv::Writer::from_writer(file);
    wtr.write_record(&table.columns)?;
    for row in &table.rows {
        wtr.write_record(row)?;
    }

    wtr.flush().map_err(|e| FormatError::io(path, e))
}

/// Rows may be shorter than the header (trailing empty cells left out). An
/// empty file holds no records.
pub(super) fn read(path: &Path) -> Result<Vec<ProductRecord>, FormatError> {
    let file = File::open(path).map_err(|e| FormatError::io(path, e))?;
    let mut rdr = ::csv::ReaderBuilder::new().flexible(true).from_reader(file);

    let columns: Vec<String> = rdr
        .headers()?
        .iter()
        .enumerate()
        .map(|(index, name)| {
            let name = if index == 0 {
                name.trim_start_matches(UTF8_BOM)
            } else {
                name
            };
            name.trim().to_string()
        })
        .collect();

    let rows = rdr
        .records()
        .map(|row| row.map(|r| r.iter().map(str::to_string).collect::<Vec<_>>()))
        .collect::<Result<Vec<_>, _>>()?;

    if columns.iter().all(String::is_empty) {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        return Err(FormatError::InvalidInput(format!(
            "{} has no header row",
            path.display()
        )));
    }

    Ok(from_table(&columns, rows))
}
