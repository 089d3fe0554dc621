//! Unsplash search request parameters and validation.

use serde::Serialize;

pub use pixcache_core::MAX_PER_PAGE;

use crate::unsplash::UnsplashError;

/// Query string for `GET /search/photos`.
#[derive(Debug, Clone, Serialize, Default, PartialEq, Eq)]
pub struct SearchRequest {
    /// Search terms (required).
    pub query: String,

    /// Page number, 1-based.
    pub page: u32,

    /// Items per page (1-30).
    pub per_page: u32,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, page: u32, per_page: u32) -> Self {
        Self { query: query.into(), page, per_page }
    }

    /// Validate the search request parameters.
    ///
    /// Returns an error if any parameters are out of range or malformed.
    pub fn validate(&self) -> Result<(), UnsplashError> {
        if self.query.trim().is_empty() {
            return Err(UnsplashError::InvalidQuery("query cannot be empty".to_string()));
        }

        if self.page == 0 {
            return Err(UnsplashError::InvalidPage);
        }

        if !(1..=MAX_PER_PAGE).contains(&self.per_page) {
            return Err(UnsplashError::InvalidPerPage);
        }

        Ok(())
    }
}
