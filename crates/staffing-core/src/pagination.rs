//! Pagination types for list endpoints
//!
//! Offset-based paging: `page` is 1-indexed, `limit` is clamped to a hard cap.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Pagination parameters (from query string)
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub struct PageRequest {
    #[serde(default = "default_page")]
    pub page: i64,

    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
        }
    }
}

impl PageRequest {
    pub fn new(page: i64, limit: i64) -> Self {
        Self { page, limit }.normalized(MAX_PAGE_SIZE)
    }

    /// Clamp page to >= 1 and limit to 1..=max_limit
    pub fn normalized(self, max_limit: i64) -> Self {
        Self {
            page: self.page.max(1),
            limit: self.limit.clamp(1, max_limit.max(1)),
        }
    }

    /// Calculate the SQL offset, saturating for absurd page numbers
    pub fn offset(&self) -> i64 {
        (self.page.max(1) - 1).saturating_mul(self.limit.max(0))
    }

    /// Calculate the SQL limit
    pub fn limit(&self) -> i64 {
        self.limit
    }
}

/// One page of results plus the count taken alongside it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            page: request.page,
            limit: request.limit,
        }
    }

    pub fn total_pages(&self) -> i64 {
        if self.limit <= 0 {
            1
        } else {
            (self.total + self.limit - 1) / self.limit
        }
    }

    /// The count query may race the page query; this only looks at offsets
    pub fn has_more(&self) -> bool {
        let skipped = (self.page.max(1) - 1).saturating_mul(self.limit.max(0));
        skipped.saturating_add(self.items.len() as i64) < self.total
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_defaults() {
        let request = PageRequest::default();
        assert_eq!(request.page, 1);
        assert_eq!(request.limit, 10);
        assert_eq!(request.offset(), 0);
    }

    #[test]
    fn test_page_request_is_clamped() {
        let request = PageRequest::new(0, 500);
        assert_eq!(request.page, 1);
        assert_eq!(request.limit, MAX_PAGE_SIZE);

        let request = PageRequest::new(3, 0);
        assert_eq!(request.limit, 1);
        assert_eq!(request.offset(), 2);
    }

    #[test]
    fn test_huge_page_number_saturates() {
        let request = PageRequest::new(i64::MAX, MAX_PAGE_SIZE);
        assert_eq!(request.offset(), i64::MAX);

        let page: Page<i32> = Page::new(vec![], 3, request);
        assert!(!page.has_more());
    }

    #[test]
    fn test_page_metadata() {
        let page = Page::new(vec![1, 2, 3, 4, 5], 23, PageRequest::new(2, 5));
        assert_eq!(page.total_pages(), 5);
        assert!(page.has_more());

        let last = Page::new(vec![1, 2, 3], 23, PageRequest::new(5, 5));
        assert!(!last.has_more());
    }
}
