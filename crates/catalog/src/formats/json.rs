//! JSON record files: a pretty-printed array of objects.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde_json::Value;
use shopify_catalog_core::ProductRecord;

use super::FormatError;

pub(super) fn write(path: &Path, records: &[ProductRecord]) -> Result<(), FormatError> {
    let file = File::create(path).map_err(|e| FormatError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, records)?;
    writer
        .write_all(b"\n")
        .and_then(|()| writer.flush())
        .map_err(|e| FormatError::io(path, e))
}

/// A top-level object is read as a one-record list.
pub(super) fn read(path: &Path) -> Result<Vec<ProductRecord>, FormatError> {
    let file = File::open(path).map_err(|e| FormatError::io(path, e))?;
    let value: Value = serde_json::from_reader(BufReader::new(file))?;

    match value {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::Object(fields) => Ok(ProductRecord::from_map(fields)),
                other => Err(FormatError::InvalidInput(format!(
                    "item {index} is {}, expected an object",
                    kind(&other)
                ))),
            })
            .collect(),
        Value::Object(fields) => Ok(vec![ProductRecord::from_map(fields)]),
        other => Err(FormatError::InvalidInput(format!(
            "top-level value is {}, expected an array of objects",
            kind(&other)
        ))),
    }
}

const fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_non_ascii_written_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p.json");
        let mut record = ProductRecord::new();
        record.insert("title", "مصباح");
        write(&path, &[record]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("مصباح"));
        assert!(text.starts_with("[\n  {"));
    }

    #[test]
    fn test_single_object_is_one_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("one.json");
        std::fs::write(&path, r#"{"id": "1", "title": "A"}"#).unwrap();

        let records = read(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title(), Some("A"));
    }

    #[test]
    fn test_scalar_items_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"[{"id": "1"}, 5]"#).unwrap();

        let err = read(&path).unwrap_err();
        assert!(matches!(err, FormatError::InvalidInput(ref m) if m.contains("item 1")));
    }
}
