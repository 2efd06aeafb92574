//! Product read operations for the Admin API.

use graphql_client::QueryBody;
use shopify_catalog_core::{CollectionGid, ProductGid, ProductRecord};
use tracing::{info, instrument};

use super::{
    AdminClient, AdminShopifyError, PAGE_SIZE,
    queries::{
        self, Connection, HandleVariables, IdVariables, PageVariables, ProductByHandleData,
        ProductData, ProductsData,
    },
};

/// Which products to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductSelector {
    /// Every product in the store.
    All,
    /// One product by handle.
    Handle(String),
    /// One product by GID or numeric id.
    Id(String),
    /// Products carrying this exact tag.
    Tag(String),
    /// Products of the collection with this handle.
    CollectionHandle(String),
    /// Products of the collection with this exact title.
    CollectionTitle(String),
    /// Products of the collection with this GID or numeric id.
    CollectionId(String),
}

impl ProductSelector {
    /// Stem used for export file names.
    ///
    /// ```
    /// use shopify_catalog::shopify::ProductSelector;
    ///
    /// assert_eq!(ProductSelector::All.file_prefix(), "products");
    /// assert_eq!(
    ///     ProductSelector::Tag("summer sale".into()).file_prefix(),
    ///     "products_tag_summer_sale"
    /// );
    /// ```
    #[must_use]
    pub fn file_prefix(&self) -> String {
        match self {
            Self::All => "products".to_string(),
            Self::Handle(handle) => format!("single_product_{}", safe_name(handle)),
            Self::Id(id) => format!(
                "single_product_{}",
                ProductGid::parse(id).map_or_else(|_| safe_name(id), |g| g.numeric_part().to_string())
            ),
            Self::Tag(tag) => format!("products_tag_{}", safe_name(tag)),
            Self::CollectionHandle(name) | Self::CollectionTitle(name) => {
                format!("collection_{}", safe_name(name))
            }
            Self::CollectionId(id) => format!(
                "collection_{}",
                CollectionGid::parse(id)
                    .map_or_else(|_| safe_name(id), |g| g.numeric_part().to_string())
            ),
        }
    }
}

impl std::fmt::Display for ProductSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "all products"),
            Self::Handle(handle) => write!(f, "product with handle '{handle}'"),
            Self::Id(id) => write!(f, "product with id '{id}'"),
            Self::Tag(tag) => write!(f, "products tagged '{tag}'"),
            Self::CollectionHandle(handle) => write!(f, "collection with handle '{handle}'"),
            Self::CollectionTitle(title) => write!(f, "collection titled '{title}'"),
            Self::CollectionId(id) => write!(f, "collection with id '{id}'"),
        }
    }
}

fn safe_name(raw: &str) -> String {
    raw.trim().replace([' ', '/'], "_")
}

/// The search syntax for an exact tag filter.
fn tag_query(tag: &str) -> String {
    format!("tag:'{}'", tag.replace('\'', "\\'"))
}

impl AdminClient {
    /// Fetch the products matched by `selector`.
    ///
    /// Paginated selectors return an empty list when nothing matches;
    /// single-item selectors fail with `NotFound` instead.
    ///
    /// # Errors
    ///
    /// Returns an error if a request fails, the token is rejected, or a
    /// single product or collection does not exist.
    #[instrument(skip(self), fields(selector = %selector))]
    pub async fn fetch_products(
        &self,
        selector: &ProductSelector,
    ) -> Result<Vec<ProductRecord>, AdminShopifyError> {
        match selector {
            ProductSelector::All => self.fetch_all_products().await,
            ProductSelector::Handle(handle) => {
                Ok(vec![self.fetch_product_by_handle(handle).await?])
            }
            ProductSelector::Id(id) => Ok(vec![self.fetch_product_by_id(id).await?]),
            ProductSelector::Tag(tag) => self.fetch_products_by_tag(tag).await,
            ProductSelector::CollectionHandle(handle) => {
                let collection = self.find_collection_by_handle(handle).await?;
                self.fetch_collection_products(&collection.id).await
            }
            ProductSelector::CollectionTitle(title) => {
                let collection = self.find_collection_by_title(title).await?;
                self.fetch_collection_products(&collection.id).await
            }
            ProductSelector::CollectionId(id) => {
                let collection = self.get_collection(id).await?;
                self.fetch_collection_products(&collection.id).await
            }
        }
    }

    /// Fetch every product in the store, in API order.
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails.
    #[instrument(skip(self))]
    pub async fn fetch_all_products(&self) -> Result<Vec<ProductRecord>, AdminShopifyError> {
        self.paginate("products", move |after| self.products_page(None, after))
            .await
    }

    /// Fetch the products carrying `tag`.
    ///
    /// The search is narrowed server-side, then only records whose tag list
    /// contains `tag` exactly are kept (search matching is looser than
    /// equality).
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails.
    #[instrument(skip(self), fields(tag = %tag))]
    pub async fn fetch_products_by_tag(
        &self,
        tag: &str,
    ) -> Result<Vec<ProductRecord>, AdminShopifyError> {
        let query = tag_query(tag);
        let query = query.as_str();
        let records = self
            .paginate("products", move |after| self.products_page(Some(query), after))
            .await?;

        let matched: Vec<ProductRecord> =
            records.into_iter().filter(|r| r.has_tag(tag)).collect();
        info!(tag, count = matched.len(), "Products with exact tag");
        Ok(matched)
    }

    /// Fetch one product by handle.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no product has this handle.
    #[instrument(skip(self), fields(handle = %handle))]
    pub async fn fetch_product_by_handle(
        &self,
        handle: &str,
    ) -> Result<ProductRecord, AdminShopifyError> {
        let body = QueryBody {
            variables: HandleVariables { handle },
            query: queries::GET_PRODUCT_BY_HANDLE,
            operation_name: "GetProductByHandle",
        };

        let data: ProductByHandleData = self.execute(body).await?;
        data.product_by_identifier
            .ok_or_else(|| AdminShopifyError::NotFound(format!("product with handle '{handle}'")))
    }

    /// Fetch one product by GID or numeric id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the id is malformed or no product has it.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn fetch_product_by_id(&self, id: &str) -> Result<ProductRecord, AdminShopifyError> {
        let gid = ProductGid::parse(id)
            .map_err(|e| AdminShopifyError::NotFound(format!("product with id '{id}': {e}")))?;

        let body = QueryBody {
            variables: IdVariables { id: gid.as_str() },
            query: queries::GET_PRODUCT,
            operation_name: "GetProduct",
        };

        let data: ProductData = self.execute(body).await?;
        data.product
            .ok_or_else(|| AdminShopifyError::NotFound(format!("product with id '{gid}'")))
    }

    async fn products_page(
        &self,
        query: Option<&str>,
        after: Option<String>,
    ) -> Result<Connection<ProductRecord>, AdminShopifyError> {
        let body = QueryBody {
            variables: PageVariables {
                first: PAGE_SIZE,
                after: after.as_deref(),
                query,
                id: None,
            },
            query: queries::GET_PRODUCTS,
            operation_name: "GetProducts",
        };

        let data: ProductsData = self.execute(body).await?;
        Ok(data.products)
    }
}
