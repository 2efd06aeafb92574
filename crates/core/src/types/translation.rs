//! Translation payloads sent back to the store.

use serde::{Deserialize, Serialize};

use super::id::ProductGid;
use super::language::Locale;
use super::product::{ProductRecord, RecordError, TranslatableField};

/// One translated value for one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationEntry {
    /// Which piece of content this translates.
    pub field: TranslatableField,
    /// Translated text (HTML for the description).
    pub value: String,
}

/// The translated fields of one product for one locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationPayload {
    /// Product the translations belong to.
    pub product_id: ProductGid,
    /// Locale the values are written in.
    pub locale: Locale,
    /// Non-empty translated values.
    pub entries: Vec<TranslationEntry>,
}

impl TranslationPayload {
    /// Whether there is nothing to register.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Which record columns hold the product id and the translated values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationColumns {
    /// Column holding the product GID or numeric id.
    pub id: String,
    /// Column per translatable field.
    pub fields: Vec<(TranslatableField, String)>,
}

impl TranslationColumns {
    /// The columns the annotator and translator write for `target`.
    #[must_use]
    pub fn for_locale(target: &Locale) -> Self {
        Self {
            id: ProductRecord::ID.to_string(),
            fields: TranslatableField::ALL
                .into_iter()
                .map(|field| (field, field.language_column(target)))
                .collect(),
        }
    }

    /// Replace the column used for `field`.
    #[must_use]
    pub fn with_column(mut self, field: TranslatableField, column: impl Into<String>) -> Self {
        let column = column.into();
        match self.fields.iter_mut().find(|(f, _)| *f == field) {
            Some(entry) => entry.1 = column,
            None => self.fields.push((field, column)),
        }
        self
    }

    /// Replace the id column.
    #[must_use]
    pub fn with_id_column(mut self, column: impl Into<String>) -> Self {
        self.id = column.into();
        self
    }

    /// Build the payload for one record.
    ///
    /// Values are trimmed; empty columns are left out.
    ///
    /// # Errors
    ///
    /// Returns an error if the id column is empty or not a product id.
    pub fn payload(
        &self,
        record: &ProductRecord,
        locale: &Locale,
    ) -> Result<TranslationPayload, RecordError> {
        let raw_id = record.text(&self.id);
        if raw_id.trim().is_empty() {
            return Err(RecordError::MissingField(ProductRecord::ID));
        }
        let product_id = ProductGid::parse(&raw_id)?;

        let entries = self
            .fields
            .iter()
            .filter_map(|(field, column)| {
                let value = record.text(column);
                let value = value.trim();
                (!value.is_empty()).then(|| TranslationEntry {
                    field: *field,
                    value: value.to_string(),
                })
            })
            .collect();

        Ok(TranslationPayload {
            product_id,
            locale: locale.clone(),
            entries,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn en() -> Locale {
        Locale::parse("en").unwrap()
    }

    #[test]
    fn test_payload_from_default_columns() {
        let record: ProductRecord = serde_json::from_value(json!({
            "id": "123",
            "title_en": "  Lamp ",
            "descriptionHtml_en": "<p>Bright</p>",
            "seoTitle_en": "",
        }))
        .unwrap();

        let payload = TranslationColumns::for_locale(&en())
            .payload(&record, &en())
            .unwrap();

        assert_eq!(payload.product_id.as_str(), "gid://shopify/Product/123");
        assert_eq!(payload.entries.len(), 2);
        assert_eq!(payload.entries[0].field, TranslatableField::Title);
        assert_eq!(payload.entries[0].value, "Lamp");
        assert_eq!(payload.entries[1].field, TranslatableField::DescriptionHtml);
    }

    #[test]
    fn test_payload_custom_columns() {
        let record: ProductRecord = serde_json::from_value(json!({
            "product": "gid://shopify/Product/9",
            "English title": "Chair",
        }))
        .unwrap();

        let columns = TranslationColumns::for_locale(&en())
            .with_id_column("product")
            .with_column(TranslatableField::Title, "English title");
        let payload = columns.payload(&record, &en()).unwrap();

        assert_eq!(payload.entries.len(), 1);
        assert_eq!(payload.entries[0].value, "Chair");
    }

    #[test]
    fn test_payload_missing_id() {
        let record: ProductRecord = serde_json::from_value(json!({"title_en": "x"})).unwrap();
        let err = TranslationColumns::for_locale(&en())
            .payload(&record, &en())
            .unwrap_err();
        assert_eq!(err, RecordError::MissingField("id"));
    }

    #[test]
    fn test_payload_empty_when_nothing_translated() {
        let record: ProductRecord = serde_json::from_value(json!({"id": "1"})).unwrap();
        let payload = TranslationColumns::for_locale(&en())
            .payload(&record, &en())
            .unwrap();
        assert!(payload.is_empty());
    }
}
