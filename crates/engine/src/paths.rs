//! Endpoint paths for the resources this crate touches.
//!
//! Identifiers are percent-encoded as single path segments. Empty identifiers
//! are rejected as request-construction failures.

use cma_util::http::{PathPart, build_path};

use crate::ContentError;

fn require<'a>(kind: &str, identifier: &'a str) -> Result<&'a str, ContentError> {
    if identifier.trim().is_empty() {
        return Err(ContentError::invalid(format!("{kind} identifier must not be empty")));
    }
    Ok(identifier)
}

/// `/spaces/{space}/entries`
pub fn entries_path(space_id: &str) -> Result<String, ContentError> {
    let space_id = require("space", space_id)?;
    Ok(build_path(&[
        PathPart::Literal("spaces"),
        PathPart::Value(space_id),
        PathPart::Literal("entries"),
    ]))
}

/// `/spaces/{space}/entries/{entry}`
pub fn entry_path(space_id: &str, entry_id: &str) -> Result<String, ContentError> {
    let space_id = require("space", space_id)?;
    let entry_id = require("entry", entry_id)?;
    Ok(build_path(&[
        PathPart::Literal("spaces"),
        PathPart::Value(space_id),
        PathPart::Literal("entries"),
        PathPart::Value(entry_id),
    ]))
}

/// `/spaces/{space}/entries/{entry}/{state}` for `published` and `archived`.
pub(crate) fn entry_state_path(space_id: &str, entry_id: &str, state: &'static str) -> Result<String, ContentError> {
    let mut path = entry_path(space_id, entry_id)?;
    path.push('/');
    path.push_str(state);
    Ok(path)
}

/// `/spaces/{space}/content_types`
pub fn content_types_path(space_id: &str) -> Result<String, ContentError> {
    let space_id = require("space", space_id)?;
    Ok(build_path(&[
        PathPart::Literal("spaces"),
        PathPart::Value(space_id),
        PathPart::Literal("content_types"),
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_collection_and_entity_paths() {
        assert_eq!(entries_path("abc").expect("path"), "/spaces/abc/entries");
        assert_eq!(entry_path("abc", "e1").expect("path"), "/spaces/abc/entries/e1");
        assert_eq!(
            entry_state_path("abc", "e1", "published").expect("path"),
            "/spaces/abc/entries/e1/published"
        );
        assert_eq!(content_types_path("abc").expect("path"), "/spaces/abc/content_types");
    }

    #[test]
    fn encodes_identifiers_as_single_segments() {
        assert_eq!(entry_path("abc", "a/b").expect("path"), "/spaces/abc/entries/a%2Fb");
    }

    #[test]
    fn rejects_empty_identifiers() {
        assert!(matches!(entries_path(""), Err(ContentError::InvalidRequest(_))));
        assert!(matches!(entry_path("abc", "  "), Err(ContentError::InvalidRequest(_))));
    }
}
