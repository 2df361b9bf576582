//! Pagination utilities for the listing endpoints.
//!
//! Provides a simple `Pagination` struct and helpers to normalize inputs.

/// Listings default to a small page; mirrors the catalogue's browse UX.
pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PAGE_SIZE: u64 = 3;
pub const MAX_PAGE_SIZE: u64 = 100;

/// Pagination parameters
#[derive(Clone, Copy, Debug)]
pub struct Pagination {
    /// 1-based page index
    pub page: u64,
    /// items per page
    pub limit: u64,
}

impl Pagination {
    pub fn from_query(page: Option<u64>, limit: Option<u64>) -> Self {
        Self {
            page: page.unwrap_or(DEFAULT_PAGE),
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE),
        }
    }

    /// Clamp to sane bounds and convert to a 0-based page index.
    pub fn normalize(self) -> (u64, u64) {
        let page = if self.page == 0 { DEFAULT_PAGE } else { self.page };
        let limit = self.limit.clamp(1, MAX_PAGE_SIZE);
        (page - 1, limit)
    }
}

impl Default for Pagination {
    fn default() -> Self { Self { page: DEFAULT_PAGE, limit: DEFAULT_PAGE_SIZE } }
}

#[cfg(test)]
mod tests {
    use super::Pagination;

    #[test]
    fn normalize_clamps_zero_to_defaults() {
        let (idx, limit) = Pagination { page: 0, limit: 0 }.normalize();
        assert_eq!(idx, 0);
        assert_eq!(limit, 1);
    }

    #[test]
    fn normalize_clamps_upper_bound() {
        let (idx, limit) = Pagination { page: 5, limit: 1000 }.normalize();
        assert_eq!(idx, 4);
        assert_eq!(limit, 100);
    }

    #[test]
    fn default_page_size_is_three() {
        let d = Pagination::default();
        assert_eq!(d.page, 1);
        assert_eq!(d.limit, 3);
    }

    #[test]
    fn from_query_fills_missing_values() {
        let p = Pagination::from_query(Some(2), None);
        assert_eq!(p.page, 2);
        assert_eq!(p.limit, 3);
    }
}
