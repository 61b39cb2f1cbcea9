//! REST endpoints under `/api/v1`.
//!
//! Each handler follows the same sequence:
//!
//! 1. Resolve the caller ([`crate::auth::CurrentActor`])
//! 2. Check the endpoint policy ([`crate::auth::authorize`])
//! 3. Validate the payload
//! 4. Call the repository
//! 5. For existing records, check object-level permission before writing

pub mod comments;
pub mod reviews;
pub mod taxa;
pub mod titles;
pub mod users;

use serde::Deserialize;
use yamdb_core::pagination::PageRequest;

/// `?page=N&search=...` accepted by user, category and genre listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    /// 1-based page number.
    pub page: Option<u32>,
    /// Case-insensitive substring filter.
    pub search: Option<String>,
}

impl SearchQuery {
    /// Page request with the endpoint's page size.
    #[must_use]
    pub fn page_request(&self, size: u32) -> PageRequest {
        PageRequest::new(self.page.unwrap_or(1), size)
    }

    /// Search term, ignoring an empty value.
    #[must_use]
    pub fn search(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}
