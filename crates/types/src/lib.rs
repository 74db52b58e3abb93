//! Wire model shared by the content management client crates.
//!
//! Everything here mirrors the JSON the management API sends and expects:
//! entries with their `sys` metadata, content type definitions, and the
//! envelope used for paginated listings. The types carry no I/O.

mod collection;
mod content_type;
mod entry;
mod field;

pub use collection::{CollectionPage, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT, PageRequest};
pub use content_type::{ContentType, ContentTypeField, FieldItems, FieldType};
pub use entry::{Entry, Link, LinkSys, Sys};
pub use field::EntryField;

/// Media type used for every request and response body of the management API.
pub const CONTENT_MEDIA_TYPE: &str = "application/vnd.contentful.management.v1+json";

/// Header carrying the optimistic-concurrency version of the entity being written.
pub const VERSION_HEADER: &str = "X-Contentful-Version";

/// Header naming the content type the server should validate written fields against.
pub const CONTENT_TYPE_HEADER: &str = "X-Contentful-Content-Type";
