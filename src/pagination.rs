//! Page-number pagination shared by the list endpoints.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

const DEFAULT_PAGE_SIZE: i64 = 6;
const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Default, Clone, Copy, Deserialize, IntoParams)]
pub struct PageParams {
    /// 1-based page number (default: 1)
    pub page: Option<i64>,
    /// Number of items per page (default: 6, max: 100)
    pub limit: Option<i64>,
}

impl PageParams {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }

    pub fn metadata(&self, total: i64) -> PaginationMetadata {
        PaginationMetadata {
            total,
            page: self.page(),
            limit: self.limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginationMetadata {
    /// Total number of items available
    pub total: i64,
    /// 1-based page number
    pub page: i64,
    /// Number of items per page
    pub limit: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: Option<i64>, limit: Option<i64>) -> PageParams {
        PageParams { page, limit }
    }

    #[test]
    fn defaults() {
        let p = params(None, None);
        assert_eq!(p.page(), 1);
        assert_eq!(p.limit(), 6);
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn offset_math() {
        let p = params(Some(3), Some(10));
        assert_eq!(p.offset(), 20);
    }

    #[test]
    fn clamps_out_of_range_values() {
        assert_eq!(params(Some(0), None).page(), 1);
        assert_eq!(params(Some(-5), None).page(), 1);
        assert_eq!(params(None, Some(0)).limit(), 1);
        assert_eq!(params(None, Some(10_000)).limit(), 100);
    }
}
