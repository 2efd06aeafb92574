//! Single-sheet XLSX workbooks.
//!
//! Written with a bold header row and columns sized to their longest cell
//! (plus two, at most 50 characters). Cells longer than Excel's limit are
//! truncated with a warning. Any sheet of an `.xlsx` or `.xls` workbook can
//! be read back.
//!
//! A record whose cells are all empty leaves a blank row. Blank rows between
//! records read back as empty records; trailing ones are not stored by the
//! workbook and cannot be recovered.

use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use rust_xlsxwriter::{Format as CellFormat, Workbook};
use shopify_catalog_core::{ProductRecord, from_table, to_table};
use tracing::warn;

use super::FormatError;

const MAX_COLUMN_WIDTH: usize = 50;
const COLUMN_PADDING: usize = 2;

/// Most characters Excel stores in one cell.
pub const MAX_CELL_CHARS: usize = 32_767;

pub(super) fn write(path: &Path, records: &[ProductRecord], sheet: &str) -> Result<(), FormatError> {
    let table = to_table(records);

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet)?;

    let header = CellFormat::new().set_bold();

    for (index, column) in table.columns.iter().enumerate() {
        let col = column_index(index)?;
        worksheet.write_string_with_format(0, col, column, &header)?;

        let longest = table
            .rows
            .iter()
            .map(|row| row.get(index).map_or(0, |cell| cell.chars().count()))
            .chain(std::iter::once(column.chars().count()))
            .max()
            .unwrap_or_default();
        let width = (longest + COLUMN_PADDING).min(MAX_COLUMN_WIDTH);
        worksheet.set_column_width(col, u16::try_from(width).unwrap_or(u16::MAX))?;
    }

    for (row_index, row) in table.rows.iter().enumerate() {
        let row_number = u32::try_from(row_index + 1)
            .map_err(|_| FormatError::InvalidInput("too many rows for a worksheet".to_string()))?;
        for (index, cell) in row.iter().enumerate() {
            if cell.is_empty() {
                continue;
            }
            let column = table.columns.get(index).map_or("", String::as_str);
            let text = fit_cell(cell, row_index + 1, column);
            worksheet.write_string(row_number, column_index(index)?, text)?;
        }
    }

    workbook.save(path)?;
    Ok(())
}

/// `cell` cut to [`MAX_CELL_CHARS`] characters.
fn fit_cell<'a>(cell: &'a str, record: usize, column: &str) -> &'a str {
    match cell.char_indices().nth(MAX_CELL_CHARS) {
        Some((end, _)) => {
            warn!(
                record,
                column,
                chars = cell.chars().count(),
                limit = MAX_CELL_CHARS,
                "Cell exceeds the XLSX limit, truncating"
            );
            cell.get(..end).unwrap_or(cell)
        }
        None => cell,
    }
}

fn column_index(index: usize) -> Result<u16, FormatError> {
    u16::try_from(index)
        .map_err(|_| FormatError::InvalidInput("too many columns for a worksheet".to_string()))
}

pub(super) fn read(path: &Path, sheet: Option<&str>) -> Result<Vec<ProductRecord>, FormatError> {
    std::fs::metadata(path).map_err(|e| FormatError::io(path, e))?;
    let mut workbook = open_workbook_auto(path)?;

    let range = match sheet {
        Some(name) => workbook.worksheet_range(name)?,
        None => workbook.worksheet_range_at(0).ok_or_else(|| {
            FormatError::InvalidInput(format!("{} has no worksheets", path.display()))
        })??,
    };

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(Vec::new());
    };
    let columns: Vec<String> = header
        .iter()
        .map(|cell| cell_text(cell).trim().to_string())
        .collect();

    let rows: Vec<Vec<String>> = rows
        .map(|row| row.iter().map(cell_text).collect::<Vec<_>>())
        .collect();

    Ok(from_table(&columns, rows))
}

/// Cell text as it would appear in a CSV export.
///
/// Integral floats lose their `.0`: spreadsheet tools store numeric ids as
/// floats.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{f:.0}"),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        other => other.to_string(),
    }
}
