//! Product records as exported from the Admin API.
//!
//! Products carry a small set of required fields plus whatever else the
//! query selected or later pipeline steps appended, so a record is an
//! ordered field map rather than a fixed struct.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::id::{GidError, ProductGid};
use super::language::Locale;

/// Errors that can occur when validating a [`ProductRecord`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// A required field is absent, null or not a string.
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    /// The `id` field is not a product GID.
    #[error(transparent)]
    InvalidId(#[from] GidError),
}

/// A single product with an open-ended, insertion-ordered field set.
///
/// Serializes as a plain JSON object so exports look exactly like the API
/// node they were built from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductRecord(Map<String, Value>);

impl ProductRecord {
    /// Store-scoped product id (`gid://shopify/Product/...`).
    pub const ID: &'static str = "id";
    /// Human-readable URL slug.
    pub const HANDLE: &'static str = "handle";
    /// Primary-language title.
    pub const TITLE: &'static str = "title";
    /// Product tags.
    pub const TAGS: &'static str = "tags";
    /// Language marker for the store's primary content.
    pub const ORIGINAL_LANGUAGE: &'static str = "original_language";
    /// Language marker for the translation target.
    pub const TARGET_LANGUAGE: &'static str = "target_language";

    /// Fields every product fetched from the API has.
    pub const REQUIRED_FIELDS: [&'static str; 3] = [Self::ID, Self::HANDLE, Self::TITLE];

    /// Create an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing field map.
    #[must_use]
    pub const fn from_map(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Borrow the underlying field map.
    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consume the record, returning the field map.
    #[must_use]
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// Get a top-level field.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Get a possibly nested field using a dotted path such as `seo.title`.
    #[must_use]
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        if let Some(value) = self.0.get(path) {
            return Some(value);
        }
        let mut segments = path.split('.');
        let mut current = self.0.get(segments.next()?)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// Get a top-level field as a string slice, if it is a string.
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    /// Text of a (possibly nested) field; empty when missing or null.
    #[must_use]
    pub fn text(&self, path: &str) -> String {
        self.get_path(path).map(value_text).unwrap_or_default()
    }

    /// Set a top-level field, returning the previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(name.into(), value.into())
    }

    /// Whether a top-level field is present (even if null).
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Iterate over field names in insertion order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Number of top-level fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the record has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The product id, if present.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.get_str(Self::ID)
    }

    /// The product handle, if present.
    #[must_use]
    pub fn handle(&self) -> Option<&str> {
        self.get_str(Self::HANDLE)
    }

    /// The primary-language title, if present.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.get_str(Self::TITLE)
    }

    /// Tags as string slices; non-string entries are ignored.
    #[must_use]
    pub fn tags(&self) -> Vec<&str> {
        self.0
            .get(Self::TAGS)
            .and_then(Value::as_array)
            .map(|tags| tags.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Whether the record carries exactly this tag.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags().iter().any(|t| *t == tag)
    }

    /// Parse the `id` field as a product GID.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is missing or malformed.
    pub fn product_gid(&self) -> Result<ProductGid, RecordError> {
        let id = self
            .get(Self::ID)
            .map(value_text)
            .filter(|id| !id.trim().is_empty())
            .ok_or(RecordError::MissingField(Self::ID))?;
        Ok(ProductGid::parse(&id)?)
    }

    /// Check that the required field subset is present.
    ///
    /// # Errors
    ///
    /// Returns the first missing required field.
    pub fn validate(&self) -> Result<(), RecordError> {
        for field in Self::REQUIRED_FIELDS {
            if self.get_str(field).is_none() {
                return Err(RecordError::MissingField(field));
            }
        }
        self.product_gid().map(|_| ())
    }
}

impl From<Map<String, Value>> for ProductRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// Render a JSON value the way it appears in a spreadsheet cell.
///
/// Strings are returned as-is, `null` becomes empty, integral floats lose
/// their fractional part (spreadsheets store every number as a float), and
/// anything else is rendered as compact JSON.
#[must_use]
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            #[allow(clippy::cast_possible_truncation)]
            Some(f) if !n.is_i64() && !n.is_u64() && f.fract() == 0.0 && f.abs() < 9.0e15 => {
                (f as i64).to_string()
            }
            _ => n.to_string(),
        },
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// A piece of product content Shopify can hold translations for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TranslatableField {
    /// Product title.
    Title,
    /// Product description (HTML).
    DescriptionHtml,
    /// SEO title.
    SeoTitle,
    /// SEO meta description.
    SeoDescription,
}

impl TranslatableField {
    /// All translatable fields in export column order.
    pub const ALL: [Self; 4] = [
        Self::Title,
        Self::DescriptionHtml,
        Self::SeoTitle,
        Self::SeoDescription,
    ];

    /// Where the primary-language text lives in a fetched record.
    #[must_use]
    pub const fn source_path(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::DescriptionHtml => "descriptionHtml",
            Self::SeoTitle => "seo.title",
            Self::SeoDescription => "seo.description",
        }
    }

    /// Stem of the per-language columns (`title_ar`, `seoTitle_en`, ...).
    #[must_use]
    pub const fn column_stem(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::DescriptionHtml => "descriptionHtml",
            Self::SeoTitle => "seoTitle",
            Self::SeoDescription => "seoDescription",
        }
    }

    /// Key used by `translatableResource` / `translationsRegister`.
    #[must_use]
    pub const fn translation_key(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::DescriptionHtml => "body_html",
            Self::SeoTitle => "meta_title",
            Self::SeoDescription => "meta_description",
        }
    }

    /// Whether the content is HTML and its markup must be preserved.
    #[must_use]
    pub const fn is_html(self) -> bool {
        matches!(self, Self::DescriptionHtml)
    }

    /// Column holding this field's text in `locale`.
    #[must_use]
    pub fn language_column(self, locale: &Locale) -> String {
        format!("{}_{}", self.column_stem(), locale.as_str())
    }

    /// Look up a field by its translation key.
    #[must_use]
    pub fn from_translation_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.translation_key() == key)
    }
}
