use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Bytes left alone inside a path segment: RFC 3986 unreserved characters.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// Join already-validated identifiers into an API path, percent-encoding each one.
///
/// Literal segments are passed through untouched; only the values that come
/// from callers (space and entity identifiers) go through [`encode_path_segment`].
///
/// # Example
/// ```rust
/// use cma_util::http::{PathPart, build_path};
///
/// let path = build_path(&[
///     PathPart::Literal("spaces"),
///     PathPart::Value("abc"),
///     PathPart::Literal("entries"),
///     PathPart::Value("team/post 1"),
/// ]);
/// assert_eq!(path, "/spaces/abc/entries/team%2Fpost%201");
/// ```
pub fn build_path(parts: &[PathPart<'_>]) -> String {
    let mut path = String::new();
    for part in parts {
        path.push('/');
        match part {
            PathPart::Literal(segment) => path.push_str(segment),
            PathPart::Value(value) => path.push_str(&encode_path_segment(value)),
        }
    }
    path
}

/// One segment of an API path.
#[derive(Debug, Clone, Copy)]
pub enum PathPart<'a> {
    Literal(&'a str),
    Value(&'a str),
}

/// Percent-encodes a path segment while preserving RFC 3986 unreserved bytes.
pub fn encode_path_segment(value: &str) -> String {
    utf8_percent_encode(value, PATH_SEGMENT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_unreserved_identifier_bytes() {
        assert_eq!(encode_path_segment("5KsDBWseXY6QegucYAoacS"), "5KsDBWseXY6QegucYAoacS");
        assert_eq!(encode_path_segment("my-entry_1.v2~x"), "my-entry_1.v2~x");
    }

    #[test]
    fn encodes_reserved_bytes() {
        assert_eq!(encode_path_segment("team/app name"), "team%2Fapp%20name");
        assert_eq!(encode_path_segment("a?b#c"), "a%3Fb%23c");
    }
}
