//! Paginated list envelope returned by every admin list endpoint.

use serde::{Deserialize, Serialize};

/// Pagination metadata accompanying a list response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    /// 1-based page number.
    pub page: u32,
    /// Items per page.
    pub per_page: u32,
    /// Total items matching the query across all pages.
    pub total_count: u64,
    /// Total number of pages.
    pub total_pages: u32,
}

/// A page of results plus its [`PageMeta`].
///
/// Mirrors the backend envelope `{ "data": [...], "meta": {...} }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paginated<T> {
    /// The items on this page.
    pub data: Vec<T>,
    /// Pagination metadata.
    pub meta: PageMeta,
}

impl<T> Paginated<T> {
    /// Whether a further page exists.
    #[must_use]
    pub const fn has_next_page(&self) -> bool {
        self.meta.page < self.meta.total_pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_deserializes() {
        let json = r#"{
            "data": [1, 2, 3],
            "meta": {"page": 1, "per_page": 3, "total_count": 7, "total_pages": 3}
        }"#;
        let page: Paginated<i32> = serde_json::from_str(json).expect("deserialize");
        assert_eq!(page.data, vec![1, 2, 3]);
        assert_eq!(page.meta.total_count, 7);
        assert!(page.has_next_page());
    }

    #[test]
    fn test_last_page_has_no_next() {
        let page = Paginated {
            data: vec!["x"],
            meta: PageMeta {
                page: 3,
                per_page: 3,
                total_count: 7,
                total_pages: 3,
            },
        };
        assert!(!page.has_next_page());
    }
}
