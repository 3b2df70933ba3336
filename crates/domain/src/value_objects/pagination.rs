//! Pagination and sorting primitives shared by every list operation.

use serde::{Deserialize, Serialize};

/// Hard upper bound on page size.
pub const MAX_PAGE_LIMIT: u32 = 100;

/// Default page size for catalog lists.
pub const DEFAULT_PAGE_LIMIT: u32 = 10;

/// A normalized page request: `page >= 1` and `1 <= limit <= 100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Build a page request from raw query values, clamping out-of-range input.
    pub fn new(page: Option<u32>, limit: Option<u32>, default_limit: u32) -> Self {
        let page = page.filter(|p| *p >= 1).unwrap_or(1);
        let limit = limit
            .filter(|l| *l >= 1)
            .unwrap_or(default_limit)
            .min(MAX_PAGE_LIMIT);
        Self { page, limit }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn offset(&self) -> u32 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None, DEFAULT_PAGE_LIMIT)
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(request: PageRequest, total: i64, results: Vec<T>) -> Self {
        Self {
            page: request.page(),
            limit: request.limit(),
            total,
            results,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            page: self.page,
            limit: self.limit,
            total: self.total,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_request_clamps_input() {
        let req = PageRequest::new(Some(0), Some(500), DEFAULT_PAGE_LIMIT);
        assert_eq!(req.page(), 1);
        assert_eq!(req.limit(), MAX_PAGE_LIMIT);

        let req = PageRequest::new(Some(3), None, 25);
        assert_eq!(req.limit(), 25);
        assert_eq!(req.offset(), 50);
    }

    #[test]
    fn page_serializes_with_results() {
        let page = Page::new(PageRequest::default(), 1, vec!["Fireball"]);
        let json = serde_json::to_value(&page).expect("serialize");
        assert_eq!(json["total"], 1);
        assert_eq!(json["limit"], 10);
        assert_eq!(json["results"][0], "Fireball");
    }
}
