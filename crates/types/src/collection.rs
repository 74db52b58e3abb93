use serde::{Deserialize, Serialize};

/// Page size the service uses when no `limit` is given.
pub const DEFAULT_PAGE_LIMIT: u64 = 100;

/// Largest page size the service accepts.
pub const MAX_PAGE_LIMIT: u64 = 1000;

/// Envelope returned by listing endpoints.
///
/// Missing counters decode as zero and a missing `items` member as an empty
/// list, so an empty listing is always an empty page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionPage<T> {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub skip: u64,
    #[serde(default)]
    pub limit: u64,
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

impl<T> Default for CollectionPage<T> {
    fn default() -> Self {
        Self {
            total: 0,
            skip: 0,
            limit: 0,
            items: Vec::new(),
        }
    }
}

/// Offset and size of the next page to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub skip: u64,
    pub limit: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl PageRequest {
    /// First page with the given size, clamped to `1..=MAX_PAGE_LIMIT`.
    pub fn with_limit(limit: u64) -> Self {
        Self {
            skip: 0,
            limit: limit.clamp(1, MAX_PAGE_LIMIT),
        }
    }

    /// Same offset with the size clamped to `1..=MAX_PAGE_LIMIT`.
    ///
    /// A zero limit would make the service answer with an empty page and
    /// end the listing before any item was read.
    pub fn clamped(self) -> Self {
        Self {
            limit: self.limit.clamp(1, MAX_PAGE_LIMIT),
            ..self
        }
    }

    /// Whether this offset is at or past the end of a listing of `total` items.
    pub fn covers(&self, total: u64) -> bool {
        self.skip >= total
    }

    /// Move past `count` items.
    pub fn advance(&mut self, count: u64) {
        self.skip = self.skip.saturating_add(count);
    }

    pub fn query_pairs(&self) -> Vec<(String, String)> {
        vec![
            ("skip".to_string(), self.skip.to_string()),
            ("limit".to_string(), self.limit.to_string()),
        ]
    }
}
