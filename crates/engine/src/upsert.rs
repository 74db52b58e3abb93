//! Create-or-update of entries under optimistic concurrency.
//!
//! Whether a write creates or replaces is decided by the entry's own
//! metadata: an entry the server has already stamped with `createdAt` is
//! updated in place, anything else is created. Every write carries the
//! entry's current version and the caller's content type identifier as
//! headers. After a successful call the entry takes on the server's state,
//! so the next write sends the advanced version.

use cma_api::{ApiRequest, Transport};
use cma_types::{CONTENT_TYPE_HEADER, Entry, VERSION_HEADER};
use reqwest::Method;
use serde_json::Value;
use tracing::debug;

use crate::error::decode;
use crate::paths::{entries_path, entry_path, entry_state_path};
use crate::ContentError;

/// Shape of an entry write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteKind {
    /// `POST` to the collection; the server assigns the identifier.
    Create,
    /// `PUT` to the entry itself; replaces the stored entry.
    Update,
}

/// Everything needed to send an upsert except the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WritePlan {
    pub kind: WriteKind,
    pub method: Method,
    pub path: String,
    pub version: u64,
    pub content_type: String,
}

impl WritePlan {
    fn into_request(self, body: Value) -> ApiRequest {
        ApiRequest::new(self.method, self.path)
            .with_header(VERSION_HEADER, self.version.to_string())
            .with_header(CONTENT_TYPE_HEADER, self.content_type)
            .with_body(body)
    }
}

/// Decide how `entry` would be written to `space_id`.
///
/// # Errors
/// [`ContentError::InvalidRequest`] for an empty space or content type
/// identifier, or for a persisted entry without an identifier.
pub fn plan_write(space_id: &str, content_type: &str, entry: &Entry) -> Result<WritePlan, ContentError> {
    if content_type.trim().is_empty() {
        return Err(ContentError::invalid("content type identifier must not be empty"));
    }

    let (kind, method, path) = if entry.is_persisted() {
        let entry_id = entry
            .id()
            .ok_or_else(|| ContentError::invalid("persisted entry has no identifier"))?;
        (WriteKind::Update, Method::PUT, entry_path(space_id, entry_id)?)
    } else {
        (WriteKind::Create, Method::POST, entries_path(space_id)?)
    };

    Ok(WritePlan {
        kind,
        method,
        path,
        version: entry.version(),
        content_type: content_type.to_string(),
    })
}

/// State transitions that reuse the version header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryTransition {
    Publish,
    Unpublish,
    Archive,
    Unarchive,
}

impl EntryTransition {
    fn method(self) -> Method {
        match self {
            Self::Publish | Self::Archive => Method::PUT,
            Self::Unpublish | Self::Unarchive => Method::DELETE,
        }
    }

    fn state_segment(self) -> &'static str {
        match self {
            Self::Publish | Self::Unpublish => "published",
            Self::Archive | Self::Unarchive => "archived",
        }
    }
}

/// Sends entry writes through a [`Transport`].
#[derive(Debug, Clone)]
pub struct UpsertController<T> {
    transport: T,
}

impl<T: Transport> UpsertController<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Create or update `entry` in `space_id`.
    ///
    /// `content_type` is sent as the content type header and is independent
    /// of any link stored in the entry. On success the entry's metadata and
    /// fields are replaced by the server's response. On failure the entry is
    /// left untouched, which may mean its version is stale.
    pub async fn upsert(&self, space_id: &str, content_type: &str, entry: &mut Entry) -> Result<(), ContentError> {
        let body = serde_json::to_value(&*entry).map_err(ContentError::Serialize)?;
        let plan = plan_write(space_id, content_type, entry)?;
        debug!(
            kind = ?plan.kind,
            path = %plan.path,
            version = plan.version,
            content_type,
            "dispatching entry write"
        );

        let payload = self.transport.send(plan.into_request(body)).await?;
        let server: Entry = decode("entry", payload)?;
        entry.apply_server_state(server);
        debug!(entry_id = ?entry.id(), version = entry.version(), "entry write accepted");
        Ok(())
    }

    /// Apply `transition` to a persisted entry and adopt the server's response.
    pub async fn transition(&self, space_id: &str, entry: &mut Entry, transition: EntryTransition) -> Result<(), ContentError> {
        let entry_id = entry
            .id()
            .ok_or_else(|| ContentError::invalid("entry has no identifier"))?;
        let path = entry_state_path(space_id, entry_id, transition.state_segment())?;
        let version = entry.version();
        debug!(?transition, path = %path, version, "dispatching entry transition");

        let request = ApiRequest::new(transition.method(), path).with_header(VERSION_HEADER, version.to_string());
        let payload = self.transport.send(request).await?;
        let server: Entry = decode("entry", payload)?;
        entry.apply_server_state(server);
        Ok(())
    }

    /// Delete a persisted entry. The version header guards against deleting
    /// a newer revision than the one the caller saw.
    pub async fn delete(&self, space_id: &str, entry: &Entry) -> Result<(), ContentError> {
        let entry_id = entry
            .id()
            .ok_or_else(|| ContentError::invalid("entry has no identifier"))?;
        let path = entry_path(space_id, entry_id)?;
        let version = entry.version();
        debug!(path = %path, version, "deleting entry");

        let request = ApiRequest::new(Method::DELETE, path).with_header(VERSION_HEADER, version.to_string());
        self.transport.send(request).await?;
        Ok(())
    }
}
