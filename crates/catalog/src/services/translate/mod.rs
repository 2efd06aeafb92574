//! AI translation of product records.
//!
//! For every translatable field the translator reads the source-language
//! column (falling back to the field itself) and fills the empty
//! target-language column. Populated target columns are left alone unless
//! `force` is set. A record whose translation fails is kept unchanged in the
//! output and reported; the other records carry on.

mod cache;
mod postprocess;

pub use cache::{DEFAULT_CACHE_PATH, TranslationCache, cache_key};
pub use postprocess::{PostProcessOptions, collapse_whitespace, html_to_text, postprocess_html};

use std::path::{Path, PathBuf};

use futures::{StreamExt, stream};
use shopify_catalog_core::{LanguagePair, ProductRecord, TranslatableField};
use tracing::{info, instrument, warn};

use super::RecordFailure;
use crate::error::AppError;
use crate::formats;
use crate::openai::{CompletionRequest, CompletionService, TranslationServiceError};

/// Longest translated product title kept.
pub const MAX_TITLE_CHARS: usize = 150;

const HTML_MAX_TOKENS: u32 = 2000;
const TEXT_MAX_TOKENS: u32 = 400;

/// How records are translated.
#[derive(Debug, Clone)]
pub struct TranslateOptions {
    /// Source and target languages.
    pub languages: LanguagePair,
    /// Re-translate fields that already have a value.
    pub force: bool,
    /// Records translated at once (at least 1).
    pub concurrency: usize,
    /// HTML clean-up switches.
    pub postprocess: PostProcessOptions,
}

impl TranslateOptions {
    /// Sequential, non-forced translation for `languages`.
    #[must_use]
    pub fn new(languages: LanguagePair) -> Self {
        Self {
            languages,
            force: false,
            concurrency: 1,
            postprocess: PostProcessOptions::default(),
        }
    }
}

/// Outcome of one translation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslateReport {
    /// Records with at least one field filled.
    pub translated: usize,
    /// Records that needed nothing.
    pub unchanged: usize,
    /// Records that failed (kept unchanged in the output).
    pub failures: Vec<RecordFailure>,
}

impl TranslateReport {
    /// Records processed.
    #[must_use]
    pub fn total(&self) -> usize {
        self.translated + self.unchanged + self.failures.len()
    }

    /// `Ok` when nothing failed, else `AppError::Incomplete`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Incomplete` if any record failed.
    pub fn into_result(self) -> Result<Self, AppError> {
        if self.failures.is_empty() {
            Ok(self)
        } else {
            Err(AppError::Incomplete {
                action: "translate",
                failed: self.failures.len(),
                total: self.total(),
            })
        }
    }
}

/// Translated records (input order) and the run report.
#[derive(Debug, Clone)]
pub struct TranslateOutcome {
    /// Every input record, translated where possible.
    pub records: Vec<ProductRecord>,
    /// What happened.
    pub report: TranslateReport,
}

enum RecordResult {
    Translated(ProductRecord),
    Unchanged,
    Failed(TranslationServiceError),
}

/// Fills target-language columns through a completion service.
pub struct Translator<S> {
    service: S,
    cache: TranslationCache,
    options: TranslateOptions,
}

impl<S: CompletionService> Translator<S> {
    /// Create a translator.
    #[must_use]
    pub const fn new(service: S, cache: TranslationCache, options: TranslateOptions) -> Self {
        Self {
            service,
            cache,
            options,
        }
    }

    /// The completion cache (saved by the caller when the run ends).
    #[must_use]
    pub const fn cache(&self) -> &TranslationCache {
        &self.cache
    }

    /// Translate `records`, up to `concurrency` at a time.
    #[instrument(skip(self, records), fields(count = records.len(), model = %self.service.model()))]
    pub async fn translate_records(&self, records: Vec<ProductRecord>) -> TranslateOutcome {
        let total = records.len();
        let results: Vec<(ProductRecord, RecordResult)> = stream::iter(records.into_iter().enumerate())
            .map(|(index, record)| async move {
                info!(row = index + 1, total, "Translating");
                let result = self.translate_record(&record).await;
                (record, result)
            })
            .buffered(self.options.concurrency.max(1))
            .collect()
            .await;

        let mut report = TranslateReport::default();
        let mut out = Vec::with_capacity(results.len());

        for (index, (original, result)) in results.into_iter().enumerate() {
            match result {
                RecordResult::Translated(record) => {
                    report.translated += 1;
                    out.push(record);
                }
                RecordResult::Unchanged => {
                    report.unchanged += 1;
                    out.push(original);
                }
                RecordResult::Failed(err) => {
                    let product_id = original.text(ProductRecord::ID);
                    warn!(row = index + 1, product_id = %product_id, error = %err, "Translation failed");
                    report.failures.push(RecordFailure {
                        row: index + 1,
                        product_id,
                        reason: err.to_string(),
                    });
                    out.push(original);
                }
            }
        }

        info!(
            translated = report.translated,
            unchanged = report.unchanged,
            failed = report.failures.len(),
            "Translation finished"
        );
        TranslateOutcome {
            records: out,
            report,
        }
    }

    async fn translate_record(&self, record: &ProductRecord) -> RecordResult {
        let languages = &self.options.languages;
        let mut updated = record.clone();
        let mut changed = false;

        for field in TranslatableField::ALL {
            let target_column = field.language_column(&languages.target);
            if !self.options.force && !record.text(&target_column).trim().is_empty() {
                continue;
            }

            let source_column = field.language_column(&languages.original);
            let mut source = record.text(&source_column);
            if source.trim().is_empty() {
                source = record.text(field.source_path());
            }
            if source.trim().is_empty() {
                continue;
            }

            let translated = if field.is_html() {
                self.translate_html_field(&source).await
            } else {
                self.translate_plain_field(field, &source).await
            };

            match translated {
                Ok(value) => {
                    updated.insert(target_column, value);
                    changed = true;
                }
                Err(err) => return RecordResult::Failed(err),
            }
        }

        if changed {
            RecordResult::Translated(updated)
        } else {
            RecordResult::Unchanged
        }
    }

    async fn translate_plain_field(
        &self,
        field: TranslatableField,
        source: &str,
    ) -> Result<String, TranslationServiceError> {
        let text = collapse_whitespace(&self.translate_text(&html_to_text(source)).await?);
        if field == TranslatableField::Title {
            Ok(text.chars().take(MAX_TITLE_CHARS).collect())
        } else {
            Ok(text)
        }
    }

    /// Tag-preserving translation; falls back to translating the visible
    /// text and wrapping it in a paragraph.
    async fn translate_html_field(&self, source: &str) -> Result<String, TranslationServiceError> {
        let html = match self.translate_html(source).await {
            Ok(html) if !html.trim().is_empty() => html,
            Ok(_) => {
                warn!("HTML translation came back empty; translating plain text");
                self.text_fallback(source).await?
            }
            Err(err) => {
                warn!(error = %err, "HTML translation failed; translating plain text");
                self.text_fallback(source).await?
            }
        };
        Ok(postprocess_html(&html, self.options.postprocess))
    }

    async fn text_fallback(&self, source: &str) -> Result<String, TranslationServiceError> {
        let plain = self.translate_text(&html_to_text(source)).await?;
        Ok(if plain.is_empty() {
            String::new()
        } else {
            format!("<p>{plain}</p>")
        })
    }

    async fn translate_html(&self, html: &str) -> Result<String, TranslationServiceError> {
        let (from, to) = self.language_names();
        let request = CompletionRequest {
            system: format!(
                "You are a precise technical translator.\n\
                 Translate {from} to {to}.\n\
                 RULES:\n\
                 • Translate ONLY human-visible text. Preserve ALL HTML tags/attributes/order exactly.\n\
                 • Do NOT add, remove, or infer features/specs.\n\
                 • Keep numbers/units/measurements exactly.\n\
                 • Do NOT translate brand names or model codes; leave them verbatim.\n\
                 • Return ONLY the translated HTML string."
            ),
            user: format!(
                "Task: Translate the inner text of this HTML snippet from {from} to {to}.\n\
                 Return only the translated HTML (same tags & attributes):\n\n{html}"
            ),
            max_tokens: HTML_MAX_TOKENS,
        };
        self.cached_complete("translate_html", &request).await
    }

    async fn translate_text(&self, text: &str) -> Result<String, TranslationServiceError> {
        let (from, to) = self.language_names();
        let request = CompletionRequest {
            system: format!(
                "Translate {from} to {to} precisely. No additions. Keep numbers/units. \
                 Do not translate brands/models."
            ),
            user: text.to_string(),
            max_tokens: TEXT_MAX_TOKENS,
        };
        self.cached_complete("translate_text", &request).await
    }

    async fn cached_complete(
        &self,
        kind: &str,
        request: &CompletionRequest,
    ) -> Result<String, TranslationServiceError> {
        let key = cache_key(kind, self.service.model(), request);
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit);
        }
        let output = self.service.complete(request).await?.trim().to_string();
        self.cache.insert(key, output.clone());
        Ok(output)
    }

    fn language_names(&self) -> (&str, &str) {
        (
            self.options.languages.original.display_name(),
            self.options.languages.target.display_name(),
        )
    }
}

/// `<input stem>_translated.json` next to the input.
#[must_use]
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{stem}_translated.json"))
}

/// Read `input`, translate it, write `output`, save the cache.
///
/// The output is written even when some records fail; the report says
/// which.
///
/// # Errors
///
/// Returns an error if the input cannot be read or the output cannot be
/// written.
pub async fn translate_file<S: CompletionService>(
    translator: &Translator<S>,
    input: &Path,
    output: &Path,
) -> Result<TranslateReport, AppError> {
    let records = formats::read_records(input, None)?;
    let outcome = translator.translate_records(records).await;
    formats::write_records(output, &outcome.records)?;
    info!(path = %output.display(), "Saved translations");

    if let Err(err) = translator.cache().save() {
        warn!(error = %err, "Translation cache save failed");
    }
    Ok(outcome.report)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;

    /// Answers from a script: prompts containing a key get its reply.
    struct ScriptedService {
        replies: Vec<(&'static str, Result<&'static str, u16>)>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedService {
        fn new(replies: Vec<(&'static str, Result<&'static str, u16>)>) -> Self {
            Self {
                replies,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CompletionService for ScriptedService {
        async fn complete(
            &self,
            request: &CompletionRequest,
        ) -> Result<String, TranslationServiceError> {
            self.calls.lock().unwrap().push(request.user.clone());
            let reply = self
                .replies
                .iter()
                .find(|(needle, _)| request.user.contains(needle))
                .map_or(Ok(""), |(_, reply)| *reply);
            reply
                .map(str::to_string)
                .map_err(|status| TranslationServiceError::Api {
                    status,
                    message: "scripted failure".to_string(),
                })
        }

        fn model(&self) -> &str {
            "scripted"
        }
    }

    fn options() -> TranslateOptions {
        TranslateOptions::new(LanguagePair::new("ar", "en").unwrap())
    }

    fn record(value: serde_json::Value) -> ProductRecord {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_fills_empty_targets_and_keeps_populated_ones() {
        let service = ScriptedService::new(vec![
            ("مصباح", Ok("Desk   lamp")),
            ("<p>ضوء</p>", Ok("<p>Light, 250 grams</p>")),
        ]);
        let translator = Translator::new(service, TranslationCache::in_memory(), options());

        let input = vec![
            record(json!({
                "id": "gid://shopify/Product/1",
                "title_ar": "مصباح",
                "title_en": "",
                "descriptionHtml_ar": "<p>ضوء</p>",
                "descriptionHtml_en": "",
            })),
            record(json!({
                "id": "gid://shopify/Product/2",
                "title_ar": "كرسي",
                "title_en": "Chair (edited)",
            })),
        ];

        let outcome = translator.translate_records(input).await;

        assert_eq!(outcome.report.translated, 1);
        assert_eq!(outcome.report.unchanged, 1);
        assert!(outcome.report.failures.is_empty());
        assert_eq!(outcome.records[0].get_str("title_en"), Some("Desk lamp"));
        assert_eq!(
            outcome.records[0].get_str("descriptionHtml_en"),
            Some("<p>Light, 250 g</p>")
        );
        assert_eq!(
            outcome.records[1].get_str("title_en"),
            Some("Chair (edited)")
        );
        assert!(
            translator
                .service
                .calls()
                .iter()
                .all(|c| !c.contains("كرسي"))
        );
    }

    #[tokio::test]
    async fn test_failing_record_is_reported_and_others_continue() {
        let service = ScriptedService::new(vec![
            ("معطل", Err(500)),
            ("مصباح", Ok("Lamp")),
        ]);
        let translator = Translator::new(service, TranslationCache::in_memory(), options());

        let input = vec![
            record(json!({"id": "gid://shopify/Product/1", "title_ar": "معطل", "title_en": ""})),
            record(json!({"id": "gid://shopify/Product/2", "title_ar": "مصباح", "title_en": ""})),
        ];

        let outcome = translator.translate_records(input).await;

        assert_eq!(outcome.report.translated, 1);
        assert_eq!(outcome.report.failures.len(), 1);
        assert_eq!(outcome.report.failures[0].row, 1);
        assert_eq!(outcome.report.failures[0].product_id, "gid://shopify/Product/1");
        assert_eq!(outcome.records[0].get_str("title_en"), Some(""));
        assert_eq!(outcome.records[1].get_str("title_en"), Some("Lamp"));
        assert!(outcome.report.into_result().is_err());
    }

    #[tokio::test]
    async fn test_empty_html_falls_back_to_wrapped_text() {
        let service = ScriptedService::new(vec![
            ("HTML snippet", Ok("  ")),
            ("ضوء ساطع", Ok("Bright light")),
        ]);
        let translator = Translator::new(service, TranslationCache::in_memory(), options());

        let input = vec![record(json!({
            "id": "1",
            "descriptionHtml": "<div><b>ضوء</b> ساطع</div>",
        }))];

        let outcome = translator.translate_records(input).await;
        assert_eq!(
            outcome.records[0].get_str("descriptionHtml_en"),
            Some("<p>Bright light</p>")
        );
    }

    #[tokio::test]
    async fn test_force_and_cache() {
        let service = ScriptedService::new(vec![("مصباح", Ok("Lamp"))]);
        let mut opts = options();
        opts.force = true;
        opts.concurrency = 4;
        let translator = Translator::new(service, TranslationCache::in_memory(), opts);

        let input = vec![
            record(json!({"id": "1", "title_ar": "مصباح", "title_en": "Old"})),
            record(json!({"id": "2", "title_ar": "مصباح", "title_en": "Old"})),
        ];

        let outcome = translator.translate_records(input.clone()).await;
        assert_eq!(outcome.records[0].get_str("title_en"), Some("Lamp"));
        assert_eq!(outcome.records[1].get_str("title_en"), Some("Lamp"));

        let calls_before = translator.service.calls().len();
        translator.translate_records(input).await;
        assert_eq!(translator.service.calls().len(), calls_before);
        assert!(!translator.cache().is_empty());
    }

    #[tokio::test]
    async fn test_title_is_capped() {
        let long: &'static str = Box::leak("x".repeat(200).into_boxed_str());
        let service = ScriptedService::new(vec![("مصباح", Ok(long))]);
        let translator = Translator::new(service, TranslationCache::in_memory(), options());

        let outcome = translator
            .translate_records(vec![record(json!({"id": "1", "title": "مصباح"}))])
            .await;
        assert_eq!(
            outcome.records[0].text("title_en").chars().count(),
            MAX_TITLE_CHARS
        );
    }

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("exports/products_with_lang.json")),
            PathBuf::from("exports/products_with_lang_translated.json")
        );
    }

    #[tokio::test]
    async fn test_translate_file_writes_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.json");
        let output = dir.path().join("out.json");
        std::fs::write(&input, r#"[{"id": "1", "title_ar": "مصباح", "title_en": ""}]"#).unwrap();

        let service = ScriptedService::new(vec![("مصباح", Ok("Lamp"))]);
        let translator = Translator::new(
            service,
            TranslationCache::load(dir.path().join("cache.json")),
            options(),
        );

        let report = translate_file(&translator, &input, &output).await.unwrap();
        assert_eq!(report.translated, 1);

        let written = formats::read_records(&output, None).unwrap();
        assert_eq!(written[0].get_str("title_en"), Some("Lamp"));
        assert!(dir.path().join("cache.json").exists());
    }
}
