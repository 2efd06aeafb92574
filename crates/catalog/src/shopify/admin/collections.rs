//! Collection lookups for the Admin API.

use graphql_client::QueryBody;
use shopify_catalog_core::{CollectionGid, ProductRecord};
use tracing::{debug, instrument};

use super::{
    AdminClient, AdminShopifyError, PAGE_SIZE,
    queries::{
        self, CollectionData, CollectionNode, CollectionProductsData, CollectionsData,
        Connection, IdVariables, PageVariables,
    },
};

impl AdminClient {
    /// Get a collection by GID or numeric id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the id is malformed or no collection has it.
    #[instrument(skip(self), fields(collection_id = %id))]
    pub async fn get_collection(&self, id: &str) -> Result<CollectionNode, AdminShopifyError> {
        let gid = CollectionGid::parse(id)
            .map_err(|e| AdminShopifyError::NotFound(format!("collection with id '{id}': {e}")))?;

        let body = QueryBody {
            variables: IdVariables { id: gid.as_str() },
            query: queries::GET_COLLECTION,
            operation_name: "GetCollection",
        };

        let data: CollectionData = self.execute(body).await?;
        data.collection
            .ok_or_else(|| AdminShopifyError::NotFound(format!("collection with id '{gid}'")))
    }

    /// Find a collection by handle.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no collection has this handle.
    #[instrument(skip(self), fields(handle = %handle))]
    pub async fn find_collection_by_handle(
        &self,
        handle: &str,
    ) -> Result<CollectionNode, AdminShopifyError> {
        self.find_collection(|c| c.handle == handle)
            .await?
            .ok_or_else(|| AdminShopifyError::NotFound(format!("collection with handle '{handle}'")))
    }

    /// Find a collection by exact title.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no collection has this title.
    #[instrument(skip(self), fields(title = %title))]
    pub async fn find_collection_by_title(
        &self,
        title: &str,
    ) -> Result<CollectionNode, AdminShopifyError> {
        self.find_collection(|c| c.title == title)
            .await?
            .ok_or_else(|| AdminShopifyError::NotFound(format!("collection titled '{title}'")))
    }

    /// Scan the collection list page by page; first match wins.
    async fn find_collection<P>(
        &self,
        predicate: P,
    ) -> Result<Option<CollectionNode>, AdminShopifyError>
    where
        P: Fn(&CollectionNode) -> bool,
    {
        let mut after: Option<String> = None;

        loop {
            let body = QueryBody {
                variables: PageVariables {
                    first: PAGE_SIZE,
                    after: after.as_deref(),
                    query: None,
                    id: None,
                },
                query: queries::GET_COLLECTIONS,
                operation_name: "GetCollections",
            };

            let data: CollectionsData = self.execute(body).await?;
            let (collections, page_info) = data.collections.into_nodes();
            debug!(count = collections.len(), "Scanned collection page");

            if let Some(found) = collections.into_iter().find(|c| predicate(c)) {
                return Ok(Some(found));
            }

            match page_info.end_cursor {
                Some(cursor) if page_info.has_next_page => after = Some(cursor),
                _ => return Ok(None),
            }
            self.pause().await;
        }
    }

    /// Fetch every product in a collection, in collection order.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the collection disappears mid-pagination, or an
    /// error if any page request fails.
    #[instrument(skip(self), fields(collection_id = %collection_id))]
    pub async fn fetch_collection_products(
        &self,
        collection_id: &str,
    ) -> Result<Vec<ProductRecord>, AdminShopifyError> {
        self.paginate("collection", move |after| {
            self.collection_products_page(collection_id, after)
        })
        .await
    }

    async fn collection_products_page(
        &self,
        collection_id: &str,
        after: Option<String>,
    ) -> Result<Connection<ProductRecord>, AdminShopifyError> {
        let body = QueryBody {
            variables: PageVariables {
                first: PAGE_SIZE,
                after: after.as_deref(),
                query: None,
                id: Some(collection_id),
            },
            query: queries::GET_COLLECTION_PRODUCTS,
            operation_name: "GetCollectionProducts",
        };

        let data: CollectionProductsData = self.execute(body).await?;
        data.collection.map(|c| c.products).ok_or_else(|| {
            AdminShopifyError::NotFound(format!("collection with id '{collection_id}'"))
        })
    }
}
