//! Field type resolution.
//!
//! Entries carry untyped field values; the declared type of each field lives
//! in the entry's content type. Resolution fetches the space's content types,
//! finds the one the entry links to, and reads the descriptor for the field.
//!
//! Failing to find the content type or the field is not an error: the
//! returned [`EntryField`] simply has no data type. Only a failed catalog
//! call is reported.

use cma_types::{ContentType, Entry, EntryField, FieldType, PageRequest};
use tracing::debug;

use crate::content_types::ContentTypeCatalog;
use crate::ContentError;

/// How much of the content type catalog a resolution may read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CatalogScan {
    /// Read one page only. Spaces with more content types than fit on a page
    /// may leave a field unresolved.
    #[default]
    FirstPage,
    /// Keep requesting pages until the content type is found or the catalog ends.
    AllPages,
}

/// Declared type of `field_name` for `entry`, looked up in `content_types`.
///
/// The first content type whose identifier equals the entry's content type
/// link is used, and within it the first descriptor whose identifier equals
/// `field_name`. Both comparisons are case-sensitive.
pub fn resolve_field_type(entry: &Entry, field_name: &str, content_types: &[ContentType]) -> Option<FieldType> {
    let content_type_id = entry.content_type_id()?;
    find_content_type(content_types, content_type_id)?
        .field(field_name)
        .map(|field| field.field_type)
}

fn find_content_type<'a>(content_types: &'a [ContentType], content_type_id: &str) -> Option<&'a ContentType> {
    content_types
        .iter()
        .find(|content_type| content_type.id() == Some(content_type_id))
}

/// Resolves field types through an injected [`ContentTypeCatalog`].
///
/// Nothing is cached: every call reads the catalog again.
#[derive(Debug, Clone)]
pub struct SchemaResolver<C> {
    catalog: C,
    scan: CatalogScan,
    page: PageRequest,
}

impl<C: ContentTypeCatalog> SchemaResolver<C> {
    pub fn new(catalog: C) -> Self {
        Self {
            catalog,
            scan: CatalogScan::default(),
            page: PageRequest::default(),
        }
    }

    pub fn with_scan(mut self, scan: CatalogScan) -> Self {
        self.scan = scan;
        self
    }

    /// Page size used for catalog requests.
    pub fn with_page_limit(mut self, limit: u64) -> Self {
        self.page = PageRequest::with_limit(limit);
        self
    }

    /// Pair the raw value of `field_name` with its declared type.
    ///
    /// # Errors
    /// - [`ContentError::InvalidRequest`] when the entry has no space or
    ///   content type link.
    /// - Whatever the catalog reports when listing fails.
    pub async fn resolve(&self, entry: &Entry, field_name: &str) -> Result<EntryField, ContentError> {
        let field = EntryField::new(entry.field(field_name).cloned());
        let space_id = entry
            .space_id()
            .ok_or_else(|| ContentError::invalid("entry has no space link"))?;
        let content_type_id = entry
            .content_type_id()
            .ok_or_else(|| ContentError::invalid("entry has no content type link"))?;

        let Some(content_type) = self.lookup(space_id, content_type_id).await? else {
            debug!(space_id, content_type_id, field_name, "content type not found in catalog");
            return Ok(field);
        };

        let data_type = content_type.field(field_name).map(|descriptor| descriptor.field_type);
        if data_type.is_none() {
            debug!(content_type_id, field_name, "field not declared by content type");
        }
        Ok(field.with_data_type(data_type))
    }

    async fn lookup(&self, space_id: &str, content_type_id: &str) -> Result<Option<ContentType>, ContentError> {
        let mut page = self.page.clamped();
        loop {
            let listing = self.catalog.list_content_types(space_id, page).await?;
            if let Some(found) = find_content_type(&listing.items, content_type_id) {
                return Ok(Some(found.clone()));
            }
            let fetched = listing.items.len() as u64;
            page.advance(fetched);
            let last_page = fetched == 0 || page.covers(listing.total);
            if self.scan == CatalogScan::FirstPage || last_page {
                return Ok(None);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cma_types::{ContentTypeField, Link, Sys};
    use serde_json::json;

    fn content_type(id: &str, fields: Vec<ContentTypeField>) -> ContentType {
        ContentType {
            sys: Sys {
                id: Some(id.into()),
                ..Sys::default()
            },
            name: id.into(),
            fields,
            ..ContentType::default()
        }
    }

    fn linked_entry(content_type_id: &str) -> Entry {
        let mut entry = Entry::new();
        entry.sys = Some(Sys {
            id: Some("e1".into()),
            space: Some(Link::space("abc")),
            content_type: Some(Link::content_type(content_type_id)),
            ..Sys::default()
        });
        entry.set_field("title", json!("Hello"));
        entry
    }

    #[test]
    fn resolves_declared_type() {
        let catalog = vec![
            content_type("author", vec![ContentTypeField::new("title", FieldType::Text)]),
            content_type("post", vec![ContentTypeField::new("title", FieldType::Symbol)]),
        ];
        assert_eq!(resolve_field_type(&linked_entry("post"), "title", &catalog), Some(FieldType::Symbol));
    }

    #[test]
    fn first_matching_content_type_and_descriptor_win() {
        let catalog = vec![
            content_type(
                "post",
                vec![
                    ContentTypeField::new("title", FieldType::Symbol),
                    ContentTypeField::new("title", FieldType::Text),
                ],
            ),
            content_type("post", vec![ContentTypeField::new("title", FieldType::Integer)]),
        ];
        assert_eq!(resolve_field_type(&linked_entry("post"), "title", &catalog), Some(FieldType::Symbol));
    }

    #[test]
    fn missing_content_type_or_field_resolves_to_none() {
        let catalog = vec![content_type("post", vec![ContentTypeField::new("title", FieldType::Symbol)])];
        assert_eq!(resolve_field_type(&linked_entry("page"), "title", &catalog), None);
        assert_eq!(resolve_field_type(&linked_entry("post"), "Title", &catalog), None);
        assert_eq!(resolve_field_type(&Entry::new(), "title", &catalog), None);
    }
}
