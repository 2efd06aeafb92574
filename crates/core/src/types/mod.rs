//! Core types for the catalog tools.
//!
//! This module provides type-safe wrappers for the domain concepts shared by
//! the fetcher, the file exporters and the translation steps.

pub mod id;
pub mod language;
pub mod product;
pub mod translation;

pub use id::*;
pub use language::{LanguagePair, Locale, LocaleError};
pub use product::{ProductRecord, RecordError, TranslatableField, value_text};
pub use translation::{TranslationColumns, TranslationEntry, TranslationPayload};
