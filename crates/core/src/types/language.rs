//! Locale codes and the original/target language pair.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Locale`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LocaleError {
    /// The input string is empty.
    #[error("locale cannot be empty")]
    Empty,
    /// The input contains characters outside `[A-Za-z0-9_-]`.
    #[error("invalid characters in locale code: {0}")]
    InvalidCharacters(String),
}

/// A language or language-region code such as `en`, `ar` or `en-GB`.
///
/// ## Examples
///
/// ```
/// use shopify_catalog_core::Locale;
///
/// assert!(Locale::parse("en-GB").is_ok());
/// assert!(Locale::parse("").is_err());
/// assert!(Locale::parse("en GB").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Locale(String);

impl Locale {
    /// Parse a locale code.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty or contains characters other
    /// than ASCII alphanumerics, `-` and `_`.
    pub fn parse(s: &str) -> Result<Self, LocaleError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(LocaleError::Empty);
        }
        if !s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(LocaleError::InvalidCharacters(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }

    /// Get the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// English name of the base language, used in translation prompts.
    ///
    /// Falls back to the code itself for languages not in the table.
    #[must_use]
    pub fn display_name(&self) -> &str {
        let base = self.0.split(['-', '_']).next().unwrap_or(&self.0);
        match base.to_ascii_lowercase().as_str() {
            "ar" => "Arabic",
            "de" => "German",
            "en" => "English",
            "es" => "Spanish",
            "fa" => "Persian",
            "fr" => "French",
            "he" => "Hebrew",
            "hi" => "Hindi",
            "it" => "Italian",
            "ja" => "Japanese",
            "ko" => "Korean",
            "nl" => "Dutch",
            "pt" => "Portuguese",
            "ru" => "Russian",
            "tr" => "Turkish",
            "ur" => "Urdu",
            "zh" => "Chinese",
            _ => self.0.as_str(),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Locale {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The language the catalog is written in and the one it is translated to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguagePair {
    /// Language of the store's primary content.
    pub original: Locale,
    /// Language translations are produced for.
    pub target: Locale,
}

impl LanguagePair {
    /// Build a pair from two locale codes.
    ///
    /// # Errors
    ///
    /// Returns an error if either code is invalid.
    pub fn new(original: &str, target: &str) -> Result<Self, LocaleError> {
        Ok(Self {
            original: Locale::parse(original)?,
            target: Locale::parse(target)?,
        })
    }
}
