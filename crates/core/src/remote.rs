//! Contract between the sync engine and the paginated search API.
//!
//! Implementations issue exactly one request per call and never retry;
//! retry policy belongs to whoever drives the sync engine.

use serde::{Deserialize, Serialize};

use crate::model::Item;

/// Largest `per_page` the search API accepts.
pub const MAX_PER_PAGE: u32 = 30;

/// Failure classes a remote source must distinguish.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    /// The API quota is exhausted; back off before retrying.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Network, transport, server, or decoding failure.
    #[error("request failed: {0}")]
    GeneralFailure(String),
}

/// One page of search results.
///
/// `total` and `total_pages` are informational. An empty `items` list is the
/// only signal that no further page exists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPage {
    pub items: Vec<Item>,
    pub total: Option<u64>,
    pub total_pages: Option<u32>,
}

impl SearchPage {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A paginated search backend.
#[async_trait::async_trait]
pub trait RemoteSource: Send + Sync {
    /// Fetch `page` (1-based) of results for `query`, `per_page` items at a time.
    async fn search(&self, query: &str, page: u32, per_page: u32) -> Result<SearchPage, RemoteError>;
}
