//! Registering translated records with the store.
//!
//! Each record is handled on its own: a bad id, a missing digest or a
//! rejected mutation is recorded as a failure and the run moves on. Only a
//! rejected access token stops the run, since every later record would
//! fail the same way.

use std::time::Duration;

use shopify_catalog_core::{
    Locale, ProductGid, ProductRecord, TranslatableField, TranslationColumns, TranslationPayload,
};
use tracing::{info, instrument, warn};

use super::RecordFailure;
use crate::error::AppError;
use crate::shopify::{AdminClient, AdminShopifyError, TranslationDigests};

/// Primary title written by `ensure_base` when none is given.
pub const DEFAULT_BASE_TITLE: &str = "—";

/// Primary description written by `ensure_base` when none is given.
pub const DEFAULT_BASE_DESCRIPTION: &str = "<p>—</p>";

/// How records are registered.
#[derive(Debug, Clone)]
pub struct UploadOptions {
    /// Locale the translations are registered under.
    pub locale: Locale,
    /// Id column and translated-value columns.
    pub columns: TranslationColumns,
    /// Write placeholder primary content when a digest is missing.
    pub ensure_base: bool,
    /// Primary title written by `ensure_base`.
    pub base_title: String,
    /// Primary description written by `ensure_base`.
    pub base_description: String,
    /// Read translations back after registering.
    pub verify: bool,
    /// Pause between digest polls after writing primary content.
    pub poll_interval: Duration,
    /// Digest polls before giving up on a record.
    pub poll_attempts: u32,
}

impl UploadOptions {
    /// Default columns for `locale`, no base seeding, no verification.
    #[must_use]
    pub fn new(locale: Locale) -> Self {
        Self {
            columns: TranslationColumns::for_locale(&locale),
            locale,
            ensure_base: false,
            base_title: DEFAULT_BASE_TITLE.to_string(),
            base_description: DEFAULT_BASE_DESCRIPTION.to_string(),
            verify: false,
            poll_interval: Duration::from_millis(700),
            poll_attempts: 20,
        }
    }
}

/// Outcome of one upload run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadReport {
    /// Records whose translations were registered.
    pub registered: usize,
    /// Records with nothing to register.
    pub skipped: usize,
    /// Records that failed.
    pub failures: Vec<RecordFailure>,
}

impl UploadReport {
    /// Records processed.
    #[must_use]
    pub fn total(&self) -> usize {
        self.registered + self.skipped + self.failures.len()
    }

    /// Whether every record succeeded or was skipped.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// `Ok` when nothing failed, else `AppError::Incomplete`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Incomplete` if any record failed.
    pub fn into_result(self) -> Result<Self, AppError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(AppError::Incomplete {
                action: "register",
                failed: self.failures.len(),
                total: self.total(),
            })
        }
    }
}

/// Registers translated records against their products.
#[derive(Debug, Clone)]
pub struct TranslationUploader {
    client: AdminClient,
    options: UploadOptions,
}

enum Outcome {
    Registered,
    Skipped,
}

impl TranslationUploader {
    /// Create an uploader.
    #[must_use]
    pub const fn new(client: AdminClient, options: UploadOptions) -> Self {
        Self { client, options }
    }

    /// Register every record, collecting failures.
    ///
    /// # Errors
    ///
    /// Returns `AdminShopifyError::Unauthorized` (as `AppError::Shopify`) if
    /// the access token is rejected; nothing else aborts the run.
    #[instrument(skip(self, records), fields(count = records.len(), locale = %self.options.locale))]
    pub async fn upload(&self, records: &[ProductRecord]) -> Result<UploadReport, AppError> {
        let mut report = UploadReport::default();

        for (index, record) in records.iter().enumerate() {
            let row = index + 1;
            let raw_id = record.text(&self.options.columns.id);

            match self.upload_record(record).await {
                Ok(Outcome::Registered) => report.registered += 1,
                Ok(Outcome::Skipped) => {
                    info!(row, product_id = %raw_id, "Nothing to register");
                    report.skipped += 1;
                }
                Err(AppError::Shopify(err @ AdminShopifyError::Unauthorized(_))) => {
                    return Err(err.into());
                }
                Err(err) => {
                    warn!(row, product_id = %raw_id, error = %err, "Record failed");
                    report.failures.push(RecordFailure {
                        row,
                        product_id: raw_id,
                        reason: err.to_string(),
                    });
                }
            }
        }

        info!(
            registered = report.registered,
            skipped = report.skipped,
            failed = report.failures.len(),
            "Upload finished"
        );
        Ok(report)
    }

    async fn upload_record(&self, record: &ProductRecord) -> Result<Outcome, AppError> {
        let payload = self.options.columns.payload(record, &self.options.locale)?;
        if payload.is_empty() {
            return Ok(Outcome::Skipped);
        }
        self.register(&payload).await?;
        Ok(Outcome::Registered)
    }

    /// Register one payload: digests, optional base seeding, registration,
    /// optional read-back.
    ///
    /// # Errors
    ///
    /// Returns an error if any step fails.
    #[instrument(skip(self, payload), fields(product_id = %payload.product_id))]
    pub async fn register(&self, payload: &TranslationPayload) -> Result<(), AppError> {
        let product_id = &payload.product_id;
        let mut digests = self.client.translation_digests(product_id).await?;

        let keys: Vec<&str> = payload
            .entries
            .iter()
            .map(|entry| entry.field.translation_key())
            .collect();

        if self.options.ensure_base && !digests.covers(keys.iter().copied()) {
            digests = self.seed_primary_content(product_id, &keys, &digests).await?;
        }

        let stored = self.client.register_translations(payload, &digests).await?;
        let stored_keys: Vec<String> = stored
            .iter()
            .map(|t| format!("{}@{}", t.key, t.locale))
            .collect();
        info!(stored = %stored_keys.join(", "), "Registered translations");

        if self.options.verify {
            self.verify(product_id).await?;
        }
        Ok(())
    }

    /// Write placeholder primary content for keys without a digest, then
    /// poll until Shopify has indexed it.
    async fn seed_primary_content(
        &self,
        product_id: &ProductGid,
        keys: &[&str],
        digests: &TranslationDigests,
    ) -> Result<TranslationDigests, AppError> {
        let missing = |field: TranslatableField| {
            let key = field.translation_key();
            keys.contains(&key) && digests.get(key).is_none()
        };
        let title = missing(TranslatableField::Title).then_some(self.options.base_title.as_str());
        let description = missing(TranslatableField::DescriptionHtml)
            .then_some(self.options.base_description.as_str());

        if title.is_none() && description.is_none() {
            // Only SEO keys are missing; productUpdate cannot create those
            // here, so registration reports the missing digest.
            return Ok(digests.clone());
        }

        info!(
            seed_title = title.is_some(),
            seed_description = description.is_some(),
            "Seeding primary content"
        );
        self.client
            .update_primary_content(product_id, title, description)
            .await?;

        let wanted: Vec<&str> = [
            title.map(|_| TranslatableField::Title.translation_key()),
            description.map(|_| TranslatableField::DescriptionHtml.translation_key()),
        ]
        .into_iter()
        .flatten()
        .collect();

        let mut latest = digests.clone();
        for _ in 0..self.options.poll_attempts {
            tokio::time::sleep(self.options.poll_interval).await;
            latest = self.client.translation_digests(product_id).await?;
            if latest.covers(wanted.iter().copied()) {
                return Ok(latest);
            }
        }

        warn!("Digests not ready yet; try again in a minute");
        Ok(latest)
    }

    async fn verify(&self, product_id: &ProductGid) -> Result<(), AppError> {
        let translations = self
            .client
            .product_translations(product_id, &self.options.locale)
            .await?;

        if translations.is_empty() {
            warn!(
                locale = %self.options.locale,
                "No translations read back; check the published locale code"
            );
        }
        for t in translations {
            let preview: String = t.value.chars().take(120).collect();
            info!(
                key = %t.key,
                locale = %t.locale,
                outdated = t.outdated,
                value = %preview.replace('\n', " "),
                "Verified"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_use_locale_columns() {
        let options = UploadOptions::new(Locale::parse("en-GB").unwrap());
        assert_eq!(options.columns.id, "id");
        assert!(
            options
                .columns
                .fields
                .contains(&(TranslatableField::Title, "title_en-GB".to_string()))
        );
        assert_eq!(options.poll_attempts, 20);
        assert_eq!(options.base_description, "<p>—</p>");
    }

    #[test]
    fn test_report_into_result() {
        let ok = UploadReport {
            registered: 2,
            skipped: 1,
            failures: vec![],
        };
        assert_eq!(ok.total(), 3);
        assert!(ok.into_result().is_ok());

        let failed = UploadReport {
            registered: 2,
            skipped: 0,
            failures: vec![RecordFailure {
                row: 3,
                product_id: "abc".to_string(),
                reason: "bad id".to_string(),
            }],
        };
        assert!(matches!(
            failed.into_result(),
            Err(AppError::Incomplete {
                failed: 1,
                total: 3,
                ..
            })
        ));
    }
}
