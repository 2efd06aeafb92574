//! Conversion between product records and flat string tables.
//!
//! CSV and spreadsheet exports are tables of strings. Records are flattened
//! into that shape with these rules:
//!
//! - nested objects become dotted columns (`seo.title`)
//! - `tags` becomes a `", "`-joined list (Shopify tags cannot contain commas)
//! - other arrays are written as compact JSON
//! - `null` becomes an empty cell, numbers and booleans their text
//!
//! [`from_table`] reverses the nesting and the tag list; everything else
//! comes back as strings.
//!
//! A table has one column order for all rows, so records rebuilt from it
//! share that order: fields follow their first appearance across the whole
//! list, not each record's own order.

use serde_json::{Map, Value};

use crate::types::{ProductRecord, value_text};

/// Separator between path segments in flattened column names.
pub const PATH_SEPARATOR: char = '.';

/// Separator used when joining the tag list into one cell.
pub const TAG_SEPARATOR: &str = ", ";

/// A header row plus string rows, all of the same width.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatTable {
    /// Column names in first-appearance order.
    pub columns: Vec<String>,
    /// One row per record, aligned with `columns`.
    pub rows: Vec<Vec<String>>,
}

/// Flatten one record into `(column, cell)` pairs in field order.
#[must_use]
pub fn flatten_record(record: &ProductRecord) -> Vec<(String, String)> {
    let mut cells = Vec::with_capacity(record.len());
    for (name, value) in record.as_map() {
        flatten_value(name, value, &mut cells);
    }
    cells
}

fn flatten_value(path: &str, value: &Value, cells: &mut Vec<(String, String)>) {
    match value {
        Value::Object(fields) if !fields.is_empty() => {
            for (name, nested) in fields {
                flatten_value(&format!("{path}{PATH_SEPARATOR}{name}"), nested, cells);
            }
        }
        Value::Array(items) if path == ProductRecord::TAGS => {
            let tags: Vec<String> = items.iter().map(value_text).collect();
            cells.push((path.to_string(), tags.join(TAG_SEPARATOR)));
        }
        _ => cells.push((path.to_string(), value_text(value))),
    }
}

/// Flatten records into a table whose columns are the union of every
/// record's columns, in the order they first appear.
///
/// A record whose fields are ordered differently from earlier records is
/// laid out in the shared order.
#[must_use]
pub fn to_table(records: &[ProductRecord]) -> FlatTable {
    let flattened: Vec<Vec<(String, String)>> = records.iter().map(flatten_record).collect();

    let mut columns: Vec<String> = Vec::new();
    for cells in &flattened {
        for (column, _) in cells {
            if !columns.contains(column) {
                columns.push(column.clone());
            }
        }
    }

    let rows = flattened
        .into_iter()
        .map(|cells| {
            columns
                .iter()
                .map(|column| {
                    cells
                        .iter()
                        .find(|(name, _)| name == column)
                        .map(|(_, cell)| cell.clone())
                        .unwrap_or_default()
                })
                .collect()
        })
        .collect();

    FlatTable { columns, rows }
}

/// Rebuild records from a header and string rows.
///
/// Short rows are padded with empty cells; cells beyond the header are
/// dropped.
#[must_use]
pub fn from_table<I>(columns: &[String], rows: I) -> Vec<ProductRecord>
where
    I: IntoIterator<Item = Vec<String>>,
{
    rows.into_iter()
        .map(|row| {
            let mut fields = Map::new();
            for (index, column) in columns.iter().enumerate() {
                let cell = row.get(index).cloned().unwrap_or_default();
                insert_cell(&mut fields, column, cell);
            }
            ProductRecord::from_map(fields)
        })
        .collect()
}

fn insert_cell(fields: &mut Map<String, Value>, column: &str, cell: String) {
    if column == ProductRecord::TAGS {
        let tags = cell
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(|tag| Value::String(tag.to_string()))
            .collect();
        fields.insert(column.to_string(), Value::Array(tags));
        return;
    }

    let mut segments: Vec<&str> = column.split(PATH_SEPARATOR).collect();
    let Some(leaf) = segments.pop() else {
        return;
    };

    let mut target = fields;
    for segment in segments {
        let slot = target
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        // An empty scalar under a parent path came from a null parent in
        // another row; the nested columns win.
        if !slot.is_object() {
            if slot.as_str().is_some_and(str::is_empty) {
                *slot = Value::Object(Map::new());
            } else {
                return;
            }
        }
        let Value::Object(next) = slot else {
            return;
        };
        target = next;
    }

    match target.get(leaf) {
        Some(Value::Object(_)) if cell.is_empty() => {}
        _ => {
            target.insert(leaf.to_string(), Value::String(cell));
        }
    }
}
