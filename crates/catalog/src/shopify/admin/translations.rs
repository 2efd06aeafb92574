//! Translation registration for the Admin API.
//!
//! Shopify only accepts a translation together with the digest of the
//! primary content it translates. Digests come from `translatableResource`;
//! a key with no primary content has no digest and cannot be translated
//! until that content exists.

use std::collections::HashMap;

use graphql_client::QueryBody;
use shopify_catalog_core::{Locale, ProductGid, TranslationPayload};
use tracing::{debug, instrument};

use super::{
    AdminClient, AdminShopifyError, GraphQLError,
    queries::{
        self, IdVariables, ProductUpdateData, ProductUpdateInput, ProductUpdateVariables,
        RegisterVariables, TranslatableContentData, Translation, TranslationInput,
        TranslationsData, TranslationsRegisterData, TranslationsVariables, format_user_errors,
    },
};

/// Content digests of a product, keyed by translation key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationDigests(HashMap<String, String>);

impl TranslationDigests {
    /// Digest for `key`, if Shopify has non-empty primary content for it.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .map(String::as_str)
            .filter(|digest| !digest.is_empty())
    }

    /// Whether every key in `keys` has a digest.
    #[must_use]
    pub fn covers<'a>(&self, mut keys: impl Iterator<Item = &'a str>) -> bool {
        keys.all(|key| self.get(key).is_some())
    }
}

impl FromIterator<(String, String)> for TranslationDigests {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A translation as stored by Shopify.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredTranslation {
    /// Translation key (`title`, `body_html`, ...).
    pub key: String,
    /// Translated value.
    pub value: String,
    /// Locale of the value.
    pub locale: String,
    /// Whether the primary content changed after this was registered.
    pub outdated: bool,
}

impl From<Translation> for StoredTranslation {
    fn from(t: Translation) -> Self {
        Self {
            key: t.key,
            value: t.value.unwrap_or_default(),
            locale: t.locale,
            outdated: t.outdated,
        }
    }
}

impl AdminClient {
    /// Get the content digests of a product.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the product does not exist, or an error if the
    /// request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn translation_digests(
        &self,
        product_id: &ProductGid,
    ) -> Result<TranslationDigests, AdminShopifyError> {
        let body = QueryBody {
            variables: IdVariables {
                id: product_id.as_str(),
            },
            query: queries::GET_TRANSLATABLE_CONTENT,
            operation_name: "GetTranslatableContent",
        };

        let data: TranslatableContentData = self.execute(body).await?;
        let resource = data
            .translatable_resource
            .ok_or_else(|| AdminShopifyError::NotFound(format!("product '{product_id}'")))?;

        let digests: TranslationDigests = resource
            .translatable_content
            .into_iter()
            .filter_map(|c| c.digest.map(|digest| (c.key, digest)))
            .collect();
        debug!(keys = digests.0.len(), "Fetched content digests");
        Ok(digests)
    }

    /// Register every entry of `payload` against the product's content.
    ///
    /// # Errors
    ///
    /// Returns `MissingDigest` if an entry's key has no digest (nothing is
    /// sent in that case), `UserError` if Shopify rejects the translations,
    /// or an error if the request fails.
    #[instrument(skip(self, payload, digests), fields(product_id = %payload.product_id, locale = %payload.locale))]
    pub async fn register_translations(
        &self,
        payload: &TranslationPayload,
        digests: &TranslationDigests,
    ) -> Result<Vec<StoredTranslation>, AdminShopifyError> {
        let translations = payload
            .entries
            .iter()
            .map(|entry| {
                let key = entry.field.translation_key();
                let digest = digests
                    .get(key)
                    .ok_or_else(|| AdminShopifyError::MissingDigest(key.to_string()))?;
                Ok(TranslationInput {
                    key,
                    value: &entry.value,
                    locale: payload.locale.as_str(),
                    translatable_content_digest: digest,
                })
            })
            .collect::<Result<Vec<_>, AdminShopifyError>>()?;

        let body = QueryBody {
            variables: RegisterVariables {
                resource_id: payload.product_id.as_str(),
                translations,
            },
            query: queries::TRANSLATIONS_REGISTER,
            operation_name: "RegisterTranslations",
        };

        let data: TranslationsRegisterData = self.execute(body).await?;
        let Some(result) = data.translations_register else {
            return Err(AdminShopifyError::GraphQL(vec![GraphQLError {
                message: "No payload returned from translationsRegister".to_string(),
                locations: vec![],
                path: vec![],
            }]));
        };

        if !result.user_errors.is_empty() {
            return Err(AdminShopifyError::UserError(format_user_errors(
                &result.user_errors,
            )));
        }

        Ok(result
            .translations
            .unwrap_or_default()
            .into_iter()
            .map(StoredTranslation::from)
            .collect())
    }

    /// Read back the translations stored for `locale`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the product does not exist, or an error if the
    /// request fails.
    #[instrument(skip(self), fields(product_id = %product_id, locale = %locale))]
    pub async fn product_translations(
        &self,
        product_id: &ProductGid,
        locale: &Locale,
    ) -> Result<Vec<StoredTranslation>, AdminShopifyError> {
        let body = QueryBody {
            variables: TranslationsVariables {
                id: product_id.as_str(),
                locale: locale.as_str(),
            },
            query: queries::GET_TRANSLATIONS,
            operation_name: "GetTranslations",
        };

        let data: TranslationsData = self.execute(body).await?;
        let resource = data
            .translatable_resource
            .ok_or_else(|| AdminShopifyError::NotFound(format!("product '{product_id}'")))?;

        Ok(resource
            .translations
            .into_iter()
            .map(StoredTranslation::from)
            .collect())
    }

    /// Write primary (untranslated) title and/or description.
    ///
    /// Used to create the content a translation needs a digest for.
    ///
    /// # Errors
    ///
    /// Returns `UserError` if Shopify rejects the update, or an error if the
    /// request fails.
    #[instrument(skip(self, title, description_html), fields(product_id = %product_id))]
    pub async fn update_primary_content(
        &self,
        product_id: &ProductGid,
        title: Option<&str>,
        description_html: Option<&str>,
    ) -> Result<(), AdminShopifyError> {
        let body = QueryBody {
            variables: ProductUpdateVariables {
                product: ProductUpdateInput {
                    id: product_id.as_str(),
                    title,
                    description_html,
                },
            },
            query: queries::PRODUCT_UPDATE,
            operation_name: "UpdatePrimary",
        };

        let data: ProductUpdateData = self.execute(body).await?;
        if let Some(payload) = data.product_update
            && !payload.user_errors.is_empty()
        {
            return Err(AdminShopifyError::UserError(format_user_errors(
                &payload.user_errors,
            )));
        }
        Ok(())
    }
}
