use cma_api::{ApiRequest, Transport};
use cma_types::{Entry, EntryField, PageRequest};
use reqwest::Method;
use tracing::debug;

use crate::collection::Collection;
use crate::content_types::TransportCatalog;
use crate::error::decode;
use crate::paths::{entries_path, entry_path};
use crate::schema::{CatalogScan, SchemaResolver};
use crate::upsert::{EntryTransition, UpsertController};
use crate::ContentError;

/// Entry operations for one management API connection.
///
/// The transport is injected and cloned into each component the service
/// hands out; wrap a real client in `Arc` or use a cheaply clonable one.
#[derive(Debug, Clone)]
pub struct EntriesService<T> {
    transport: T,
    page_limit: u64,
}

impl<T: Transport + Clone> EntriesService<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            page_limit: PageRequest::default().limit,
        }
    }

    /// Page size for listings and catalog reads.
    pub fn with_page_limit(mut self, limit: u64) -> Self {
        self.page_limit = PageRequest::with_limit(limit).limit;
        self
    }

    /// Lazily list the entries of `space_id`.
    ///
    /// No request is sent until the first page is pulled. An invalid space
    /// identifier does not fail here; it is reported by the first page.
    pub fn list(&self, space_id: &str) -> Collection<T> {
        self.list_with(space_id, PageRequest::with_limit(self.page_limit), Vec::new())
    }

    /// Like [`list`](Self::list), starting at `page` and sending `query` with every request.
    pub fn list_with(&self, space_id: &str, page: PageRequest, query: Vec<(String, String)>) -> Collection<T> {
        match entries_path(space_id) {
            Ok(path) => Collection::new(self.transport.clone(), path, page).with_query(query),
            Err(error) => {
                debug!(space_id, error = %error, "entry listing could not be built");
                Collection::failed(self.transport.clone(), error)
            }
        }
    }

    /// Fetch a single entry.
    ///
    /// Transport and decode failures are returned as they occurred.
    pub async fn get(&self, space_id: &str, entry_id: &str) -> Result<Entry, ContentError> {
        let request = ApiRequest::new(Method::GET, entry_path(space_id, entry_id)?);
        let payload = self.transport.send(request).await?;
        decode("entry", payload)
    }

    pub async fn upsert(&self, space_id: &str, content_type: &str, entry: &mut Entry) -> Result<(), ContentError> {
        self.writer().upsert(space_id, content_type, entry).await
    }

    pub async fn publish(&self, space_id: &str, entry: &mut Entry) -> Result<(), ContentError> {
        self.writer().transition(space_id, entry, EntryTransition::Publish).await
    }

    pub async fn unpublish(&self, space_id: &str, entry: &mut Entry) -> Result<(), ContentError> {
        self.writer().transition(space_id, entry, EntryTransition::Unpublish).await
    }

    pub async fn archive(&self, space_id: &str, entry: &mut Entry) -> Result<(), ContentError> {
        self.writer().transition(space_id, entry, EntryTransition::Archive).await
    }

    pub async fn unarchive(&self, space_id: &str, entry: &mut Entry) -> Result<(), ContentError> {
        self.writer().transition(space_id, entry, EntryTransition::Unarchive).await
    }

    pub async fn delete(&self, space_id: &str, entry: &Entry) -> Result<(), ContentError> {
        self.writer().delete(space_id, entry).await
    }

    /// Raw value of `field_name` paired with its declared type, reading one catalog page.
    pub async fn field(&self, entry: &Entry, field_name: &str) -> Result<EntryField, ContentError> {
        self.schema_resolver(CatalogScan::FirstPage).resolve(entry, field_name).await
    }

    /// A resolver reading content types through this service's transport.
    pub fn schema_resolver(&self, scan: CatalogScan) -> SchemaResolver<TransportCatalog<T>> {
        SchemaResolver::new(TransportCatalog::new(self.transport.clone()))
            .with_scan(scan)
            .with_page_limit(self.page_limit)
    }

    fn writer(&self) -> UpsertController<T> {
        UpsertController::new(self.transport.clone())
    }
}
