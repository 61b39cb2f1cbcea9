//! Page-number pagination.

use crate::error::{Result, YamdbError};
use serde::{Deserialize, Serialize};

/// `?page=N` query parameter. Missing means the first page.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    /// 1-based page number.
    pub page: Option<u32>,
}

/// A resolved page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: u32,
    /// Items per page, at least 1.
    pub size: u32,
}

impl PageRequest {
    /// Build a request, clamping the page size to at least one.
    #[must_use]
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page,
            size: size.max(1),
        }
    }

    /// Resolve a query against the page size of an endpoint family.
    #[must_use]
    pub fn from_query(query: PageQuery, size: u32) -> Self {
        Self::new(query.page.unwrap_or(1), size)
    }

    /// Number of rows to skip.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.size)
    }

    /// Number of rows to fetch.
    #[must_use]
    pub fn limit(&self) -> u64 {
        u64::from(self.size)
    }

    /// Fail with 404 if the page lies outside `count` rows.
    ///
    /// Page 1 always exists, even for an empty collection.
    ///
    /// # Errors
    ///
    /// Returns [`YamdbError::NotFound`] for page 0 or a page past the end.
    pub fn check(&self, count: u64) -> Result<()> {
        if self.page == 0 || (self.page > 1 && self.offset() >= count) {
            return Err(YamdbError::not_found("page", self.page));
        }
        Ok(())
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    /// Total number of matching rows.
    pub count: u64,
    /// Next page number.
    pub next: Option<u32>,
    /// Previous page number.
    pub previous: Option<u32>,
    /// Rows on this page.
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Assemble a page from the rows fetched for `request`.
    #[must_use]
    pub fn new(request: PageRequest, count: u64, results: Vec<T>) -> Self {
        let end = request.offset() + request.limit();
        Self {
            count,
            next: (end < count).then(|| request.page + 1),
            previous: (request.page > 1).then(|| request.page - 1),
            results,
        }
    }

    /// Slice an already-filtered, ordered collection.
    ///
    /// # Errors
    ///
    /// Returns [`YamdbError::NotFound`] when the page is out of range.
    pub fn from_vec(request: PageRequest, items: Vec<T>) -> Result<Self> {
        let count = items.len() as u64;
        request.check(count)?;
        let offset = usize::try_from(request.offset()).unwrap_or(usize::MAX);
        let results = items
            .into_iter()
            .skip(offset)
            .take(request.size as usize)
            .collect();
        Ok(Self::new(request, count, results))
    }

    /// Transform every row, keeping the page metadata.
    #[must_use]
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            count: self.count,
            next: self.next,
            previous: self.previous,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}

/// Page sizes per endpoint family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationConfig {
    /// `/categories`.
    pub categories: u32,
    /// `/genres`.
    pub genres: u32,
    /// `/titles`.
    pub titles: u32,
    /// `/titles/{id}/reviews`.
    pub reviews: u32,
    /// `.../comments`.
    pub comments: u32,
    /// `/users`.
    pub users: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            categories: 2,
            genres: 2,
            titles: 2,
            reviews: 3,
            comments: 4,
            users: 4,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn first_page_of_empty_collection_exists() {
        let page = Page::<i32>::from_vec(PageRequest::new(1, 2), Vec::new()).unwrap();
        assert_eq!(page.count, 0);
        assert_eq!(page.next, None);
        assert_eq!(page.previous, None);
    }

    #[test]
    fn links_between_pages() {
        let items: Vec<i32> = (1..=5).collect();
        let page = Page::from_vec(PageRequest::new(2, 2), items).unwrap();
        assert_eq!(page.results, vec![3, 4]);
        assert_eq!(page.next, Some(3));
        assert_eq!(page.previous, Some(1));
    }

    #[test]
    fn last_page_has_no_next() {
        let items: Vec<i32> = (1..=5).collect();
        let page = Page::from_vec(PageRequest::new(3, 2), items).unwrap();
        assert_eq!(page.results, vec![5]);
        assert_eq!(page.next, None);
    }

    #[test]
    fn out_of_range_page_is_not_found() {
        let items: Vec<i32> = (1..=4).collect();
        assert!(matches!(
            Page::from_vec(PageRequest::new(3, 2), items),
            Err(YamdbError::NotFound { resource: "page", .. })
        ));
        assert!(PageRequest::new(0, 2).check(10).is_err());
    }

    #[test]
    fn zero_size_is_clamped() {
        assert_eq!(PageRequest::new(1, 0).size, 1);
    }
}
