//! Page-based pagination shared by every list endpoint.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Default page size when the caller does not send one.
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// Largest page size a caller may request.
pub const MAX_PAGE_SIZE: u64 = 100;

/// Largest page number a caller may request. Keeps offsets far inside `i64`.
pub const MAX_PAGE: u64 = 1_000_000;

/// A 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Validate)]
pub struct Pagination {
    #[serde(default = "default_page")]
    #[validate(range(min = 1, max = 1_000_000))]
    pub page: u64,
    #[serde(default = "default_page_size")]
    #[validate(range(min = 1, max = 100))]
    pub page_size: u64,
}

const fn default_page() -> u64 {
    1
}

const fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    /// Build a page request, clamping out-of-range values.
    #[must_use]
    pub fn new(page: u64, page_size: u64) -> Self {
        Self {
            page: page.clamp(1, MAX_PAGE),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Number of rows to skip.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }

    /// Number of rows to fetch.
    #[must_use]
    pub const fn limit(&self) -> u64 {
        self.page_size
    }
}

/// One page of results plus the totals needed to render a pager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageData<T> {
    pub datas: Vec<T>,
    pub total: u64,
    pub current_page: u64,
    pub page_size: u64,
    pub total_page: u64,
}

impl<T> PageData<T> {
    /// Wrap a page of rows fetched with `pagination`.
    #[must_use]
    pub const fn new(datas: Vec<T>, total: u64, pagination: Pagination) -> Self {
        let total_page = if pagination.page_size == 0 {
            0
        } else {
            total.div_ceil(pagination.page_size)
        };
        Self {
            datas,
            total,
            current_page: pagination.page,
            page_size: pagination.page_size,
            total_page,
        }
    }

    /// Convert every row, keeping the page metadata.
    pub fn map<U, F>(self, f: F) -> PageData<U>
    where
        F: FnMut(T) -> U,
    {
        PageData {
            datas: self.datas.into_iter().map(f).collect(),
            total: self.total,
            current_page: self.current_page,
            page_size: self.page_size,
            total_page: self.total_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_is_zero_based() {
        assert_eq!(Pagination::new(1, 20).offset(), 0);
        assert_eq!(Pagination::new(3, 20).offset(), 40);
    }

    #[test]
    fn test_new_clamps_out_of_range_values() {
        let p = Pagination::new(0, 1000);
        assert_eq!(p.page, 1);
        assert_eq!(p.page_size, MAX_PAGE_SIZE);
    }

    #[test]
    fn test_huge_page_fails_validation() {
        let p = Pagination {
            page: 200_000_000_000_000_000,
            page_size: 100,
        };
        assert!(p.validate().is_err());

        let last = Pagination {
            page: MAX_PAGE,
            page_size: MAX_PAGE_SIZE,
        };
        assert!(last.validate().is_ok());
        assert!(i64::try_from(last.offset()).is_ok());
    }

    #[test]
    fn test_offset_saturates() {
        let p = Pagination {
            page: u64::MAX,
            page_size: 100,
        };
        assert_eq!(p.offset(), u64::MAX);
    }

    #[test]
    fn test_total_page_rounds_up() {
        let page = PageData::new(vec![1, 2, 3], 41, Pagination::new(1, 20));
        assert_eq!(page.total_page, 3);

        let empty: PageData<i32> = PageData::new(vec![], 0, Pagination::default());
        assert_eq!(empty.total_page, 0);
    }

    #[test]
    fn test_out_of_range_request_fails_validation() {
        let p = Pagination {
            page: 0,
            page_size: 500,
        };
        assert!(p.validate().is_err());
    }
}
