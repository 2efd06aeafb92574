//! Language annotation of fetched products.
//!
//! Annotation stamps each record with the configured language pair and adds
//! the per-language columns that the translation steps read and fill:
//! `<stem>_<original>` carries the source text, `<stem>_<target>` starts out
//! empty. Fields that already exist are never touched, so annotating twice
//! with the same pair is a no-op.

use serde_json::Value;

use crate::types::{LanguagePair, ProductRecord, TranslatableField};

/// Annotate every record, returning new records in the same order.
#[must_use]
pub fn annotate(records: &[ProductRecord], languages: &LanguagePair) -> Vec<ProductRecord> {
    records
        .iter()
        .map(|record| annotate_record(record, languages))
        .collect()
}

/// Annotate a single record.
#[must_use]
pub fn annotate_record(record: &ProductRecord, languages: &LanguagePair) -> ProductRecord {
    let mut annotated = record.clone();

    for field in TranslatableField::ALL {
        let source_column = field.language_column(&languages.original);
        if !annotated.contains(&source_column) {
            let source = record.text(field.source_path());
            annotated.insert(source_column, source);
        }

        let target_column = field.language_column(&languages.target);
        if !annotated.contains(&target_column) {
            annotated.insert(target_column, String::new());
        }
    }

    annotated.insert(
        ProductRecord::ORIGINAL_LANGUAGE,
        Value::String(languages.original.to_string()),
    );
    annotated.insert(
        ProductRecord::TARGET_LANGUAGE,
        Value::String(languages.target.to_string()),
    );

    annotated
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ar_en() -> LanguagePair {
        LanguagePair::new("ar", "en").unwrap()
    }

    fn product() -> ProductRecord {
        serde_json::from_value(json!({
            "id": "gid://shopify/Product/1",
            "handle": "lamp",
            "title": "مصباح",
            "descriptionHtml": "<p>ضوء</p>",
            "tags": ["summer"],
            "seo": {"title": "مصباح مكتب", "description": null},
        }))
        .unwrap()
    }

    #[test]
    fn test_adds_language_markers() {
        let annotated = annotate_record(&product(), &ar_en());
        assert_eq!(annotated.get_str("original_language"), Some("ar"));
        assert_eq!(annotated.get_str("target_language"), Some("en"));
    }

    #[test]
    fn test_adds_language_columns() {
        let annotated = annotate_record(&product(), &ar_en());
        assert_eq!(annotated.get_str("title_ar"), Some("مصباح"));
        assert_eq!(annotated.get_str("descriptionHtml_ar"), Some("<p>ضوء</p>"));
        assert_eq!(annotated.get_str("seoTitle_ar"), Some("مصباح مكتب"));
        assert_eq!(annotated.get_str("seoDescription_ar"), Some(""));
        assert_eq!(annotated.get_str("title_en"), Some(""));
        assert_eq!(annotated.get_str("seoDescription_en"), Some(""));
    }

    #[test]
    fn test_preserves_existing_fields() {
        let original = product();
        let annotated = annotate_record(&original, &ar_en());
        for name in original.field_names() {
            assert_eq!(annotated.get(name), original.get(name), "field {name} changed");
        }
    }

    #[test]
    fn test_is_idempotent() {
        let once = annotate(&[product()], &ar_en());
        let twice = annotate(&once, &ar_en());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_keeps_existing_translation() {
        let mut translated = annotate_record(&product(), &ar_en());
        translated.insert("title_en", "Lamp");
        let again = annotate_record(&translated, &ar_en());
        assert_eq!(again.get_str("title_en"), Some("Lamp"));
    }

    #[test]
    fn test_markers_do_not_depend_on_content() {
        let empty = ProductRecord::new();
        let annotated = annotate_record(&empty, &ar_en());
        assert_eq!(annotated.get_str("original_language"), Some("ar"));
        assert_eq!(annotated.get_str("target_language"), Some("en"));
    }
}
