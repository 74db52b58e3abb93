//! Content type lookup, consumed by the schema resolver.

use async_trait::async_trait;
use cma_api::{ApiRequest, Transport};
use cma_types::{CollectionPage, ContentType, PageRequest};
use reqwest::Method;
use tracing::debug;

use crate::error::decode;
use crate::paths::content_types_path;
use crate::ContentError;

/// Source of content type definitions for a space, one page at a time.
#[async_trait]
pub trait ContentTypeCatalog: Send + Sync {
    async fn list_content_types(&self, space_id: &str, page: PageRequest) -> Result<CollectionPage<ContentType>, ContentError>;
}

/// Catalog backed by `GET /spaces/{space}/content_types`.
#[derive(Debug, Clone)]
pub struct TransportCatalog<T> {
    transport: T,
}

impl<T> TransportCatalog<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl<T: Transport> ContentTypeCatalog for TransportCatalog<T> {
    async fn list_content_types(&self, space_id: &str, page: PageRequest) -> Result<CollectionPage<ContentType>, ContentError> {
        let request = ApiRequest::new(Method::GET, content_types_path(space_id)?).with_query(page.query_pairs());
        let payload = self.transport.send(request).await?;
        let page: CollectionPage<ContentType> = decode("content type page", payload)?;
        debug!(
            space_id,
            skip = page.skip,
            total = page.total,
            returned = page.items.len(),
            "content types listed"
        );
        Ok(page)
    }
}

/// Fixed, in-memory catalog. Pages over the definitions it was built with.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    content_types: Vec<ContentType>,
}

impl StaticCatalog {
    pub fn new(content_types: Vec<ContentType>) -> Self {
        Self { content_types }
    }
}

#[async_trait]
impl ContentTypeCatalog for StaticCatalog {
    async fn list_content_types(&self, _space_id: &str, page: PageRequest) -> Result<CollectionPage<ContentType>, ContentError> {
        let items = self
            .content_types
            .iter()
            .skip(page.skip as usize)
            .take(page.limit as usize)
            .cloned()
            .collect();
        Ok(CollectionPage {
            total: self.content_types.len() as u64,
            skip: page.skip,
            limit: page.limit,
            items,
        })
    }
}
