//! Lazy, forward-only paging over a listing endpoint.

use std::marker::PhantomData;

use cma_api::{ApiRequest, Transport};
use cma_types::{CollectionPage, Entry, PageRequest};
use reqwest::Method;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::decode;
use crate::ContentError;

/// Cursor over a listing endpoint that fetches one page per [`next_page`](Self::next_page).
///
/// Building a collection performs no I/O. Pages are yielded in remote order
/// and never revisited; once exhausted the collection stays exhausted.
pub struct Collection<T, I = Entry> {
    transport: T,
    path: String,
    query: Vec<(String, String)>,
    page: PageRequest,
    total: Option<u64>,
    exhausted: bool,
    pending_error: Option<ContentError>,
    _items: PhantomData<fn() -> I>,
}

impl<T, I> Collection<T, I>
where
    T: Transport,
    I: DeserializeOwned,
{
    /// `page` is clamped to a size the service accepts.
    pub fn new(transport: T, path: impl Into<String>, page: PageRequest) -> Self {
        Self {
            transport,
            path: path.into(),
            query: Vec::new(),
            page: page.clamped(),
            total: None,
            exhausted: false,
            pending_error: None,
            _items: PhantomData,
        }
    }

    /// A collection whose request could not be built.
    ///
    /// The first call to [`next_page`](Self::next_page) reports `error`;
    /// every later call reports exhaustion.
    pub fn failed(transport: T, error: ContentError) -> Self {
        let mut collection = Self::new(transport, String::new(), PageRequest::default());
        collection.pending_error = Some(error);
        collection
    }

    /// Extra query pairs sent with every page request, e.g. `content_type` or `order`.
    pub fn with_query(mut self, pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    /// Total reported by the most recent page, if any page was fetched.
    pub fn total(&self) -> Option<u64> {
        self.total
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Fetch the next page.
    ///
    /// Returns `Ok(Some(items))` for each fetched page (an empty listing
    /// yields one empty page) and `Ok(None)` once exhausted. A failed fetch
    /// leaves the cursor where it was.
    pub async fn next_page(&mut self) -> Result<Option<Vec<I>>, ContentError> {
        if let Some(error) = self.pending_error.take() {
            self.exhausted = true;
            return Err(error);
        }
        if self.exhausted {
            return Ok(None);
        }

        let request = ApiRequest::new(Method::GET, self.path.clone())
            .with_query(self.query.iter().cloned())
            .with_query(self.page.query_pairs());
        let payload = self.transport.send(request).await?;
        let page: CollectionPage<I> = decode("collection page", payload)?;

        let fetched = page.items.len() as u64;
        self.page.advance(fetched);
        self.total = Some(page.total);
        self.exhausted = fetched == 0 || self.page.covers(page.total);
        debug!(
            path = %self.path,
            fetched,
            next_skip = self.page.skip,
            total = page.total,
            exhausted = self.exhausted,
            "collection page fetched"
        );
        Ok(Some(page.items))
    }

    /// Drain every remaining page, in order.
    pub async fn collect_remaining(&mut self) -> Result<Vec<I>, ContentError> {
        let mut items = Vec::new();
        while let Some(page) = self.next_page().await? {
            items.extend(page);
        }
        Ok(items)
    }
}
