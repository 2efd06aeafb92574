//! GraphQL documents and response shapes for the Admin API.
//!
//! Documents are sent verbatim through `graphql_client::QueryBody`. Product
//! nodes are kept dynamic so that whatever the selection returns lands in the
//! export unchanged.

use serde::{Deserialize, Serialize};
use shopify_catalog_core::ProductRecord;

// =============================================================================
// Shared selections
// =============================================================================

/// Fields selected for every product node, in export column order.
macro_rules! product_fields {
    () => {
        "id
        title
        handle
        descriptionHtml
        tags
        productType
        vendor
        createdAt
        updatedAt
        status
        publishedAt
        seo { title description }"
    };
}

// =============================================================================
// Product queries
// =============================================================================

pub const GET_PRODUCTS: &str = concat!(
    "query GetProducts($first: Int!, $after: String, $query: String) {
  products(first: $first, after: $after, query: $query) {
    pageInfo { hasNextPage endCursor }
    edges { node { ",
    product_fields!(),
    " } }
  }
}"
);

pub const GET_PRODUCT_BY_HANDLE: &str = concat!(
    "query GetProductByHandle($handle: String!) {
  productByIdentifier(identifier: { handle: $handle }) { ",
    product_fields!(),
    " }
}"
);

pub const GET_PRODUCT: &str = concat!(
    "query GetProduct($id: ID!) {
  product(id: $id) { ",
    product_fields!(),
    " }
}"
);

pub const PRODUCT_UPDATE: &str = "mutation UpdatePrimary($product: ProductUpdateInput!) {
  productUpdate(product: $product) {
    product { id }
    userErrors { field message }
  }
}";

// =============================================================================
// Collection queries
// =============================================================================

pub const GET_COLLECTIONS: &str = "query GetCollections($first: Int!, $after: String) {
  collections(first: $first, after: $after) {
    pageInfo { hasNextPage endCursor }
    edges { node { id title handle } }
  }
}";

pub const GET_COLLECTION: &str = "query GetCollection($id: ID!) {
  collection(id: $id) { id title handle }
}";

pub const GET_COLLECTION_PRODUCTS: &str = concat!(
    "query GetCollectionProducts($id: ID!, $first: Int!, $after: String) {
  collection(id: $id) {
    id
    products(first: $first, after: $after) {
      pageInfo { hasNextPage endCursor }
      edges { node { ",
    product_fields!(),
    " } }
    }
  }
}"
);

// =============================================================================
// Translation queries
// =============================================================================

pub const GET_TRANSLATABLE_CONTENT: &str = "query GetTranslatableContent($id: ID!) {
  translatableResource(resourceId: $id) {
    translatableContent { key value digest locale }
  }
}";

pub const GET_TRANSLATIONS: &str = "query GetTranslations($id: ID!, $locale: String!) {
  translatableResource(resourceId: $id) {
    translations(locale: $locale) { key value locale outdated }
  }
}";

pub const TRANSLATIONS_REGISTER: &str =
    "mutation RegisterTranslations($resourceId: ID!, $translations: [TranslationInput!]!) {
  translationsRegister(resourceId: $resourceId, translations: $translations) {
    userErrors { field message }
    translations { key locale value }
  }
}";

// =============================================================================
// Variables
// =============================================================================

#[derive(Debug, Serialize)]
pub struct PageVariables<'a> {
    pub first: i64,
    pub after: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub struct IdVariables<'a> {
    pub id: &'a str,
}

#[derive(Debug, Serialize)]
pub struct HandleVariables<'a> {
    pub handle: &'a str,
}

#[derive(Debug, Serialize)]
pub struct TranslationsVariables<'a> {
    pub id: &'a str,
    pub locale: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterVariables<'a> {
    pub resource_id: &'a str,
    pub translations: Vec<TranslationInput<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationInput<'a> {
    pub key: &'a str,
    pub value: &'a str,
    pub locale: &'a str,
    pub translatable_content_digest: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ProductUpdateVariables<'a> {
    pub product: ProductUpdateInput<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdateInput<'a> {
    pub id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_html: Option<&'a str>,
}

// =============================================================================
// Responses
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Edge<T> {
    pub node: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection<T> {
    pub page_info: PageInfo,
    pub edges: Vec<Edge<T>>,
}

impl<T> Connection<T> {
    pub fn into_nodes(self) -> (Vec<T>, PageInfo) {
        let nodes = self.edges.into_iter().map(|edge| edge.node).collect();
        (nodes, self.page_info)
    }
}

#[derive(Debug, Deserialize)]
pub struct ProductsData {
    pub products: Connection<ProductRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductByHandleData {
    pub product_by_identifier: Option<ProductRecord>,
}

#[derive(Debug, Deserialize)]
pub struct ProductData {
    pub product: Option<ProductRecord>,
}

/// Collection summary used to resolve a handle or title to an id.
#[derive(Debug, Clone, Deserialize)]
pub struct CollectionNode {
    pub id: String,
    pub title: String,
    pub handle: String,
}

#[derive(Debug, Deserialize)]
pub struct CollectionsData {
    pub collections: Connection<CollectionNode>,
}

#[derive(Debug, Deserialize)]
pub struct CollectionData {
    pub collection: Option<CollectionNode>,
}

#[derive(Debug, Deserialize)]
pub struct CollectionProducts {
    pub products: Connection<ProductRecord>,
}

#[derive(Debug, Deserialize)]
pub struct CollectionProductsData {
    pub collection: Option<CollectionProducts>,
}

#[derive(Debug, Deserialize)]
pub struct UserError {
    pub field: Option<Vec<String>>,
    pub message: String,
}

/// Join mutation `userErrors` into one message.
pub fn format_user_errors(errors: &[UserError]) -> String {
    errors
        .iter()
        .map(|e| {
            let field = e.field.as_ref().map_or_else(String::new, |f| f.join("."));
            if field.is_empty() {
                e.message.clone()
            } else {
                format!("{field}: {}", e.message)
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Deserialize)]
pub struct TranslatableContent {
    pub key: String,
    pub value: Option<String>,
    pub digest: Option<String>,
    pub locale: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslatableContentResource {
    #[serde(default)]
    pub translatable_content: Vec<TranslatableContent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslatableContentData {
    pub translatable_resource: Option<TranslatableContentResource>,
}

#[derive(Debug, Deserialize)]
pub struct Translation {
    pub key: String,
    pub value: Option<String>,
    pub locale: String,
    #[serde(default)]
    pub outdated: bool,
}

#[derive(Debug, Deserialize)]
pub struct TranslationsResource {
    #[serde(default)]
    pub translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationsData {
    pub translatable_resource: Option<TranslationsResource>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationsRegisterPayload {
    #[serde(default)]
    pub user_errors: Vec<UserError>,
    #[serde(default)]
    pub translations: Option<Vec<Translation>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationsRegisterData {
    pub translations_register: Option<TranslationsRegisterPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdatePayload {
    #[serde(default)]
    pub user_errors: Vec<UserError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdateData {
    pub product_update: Option<ProductUpdatePayload>,
}
