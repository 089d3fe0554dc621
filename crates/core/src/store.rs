//! Entity store contract.
//!
//! The store performs no business logic: point reads, one ordered listing per
//! query, a per-query clear, and one atomic multi-table write.

use crate::Error;
use crate::model::{Item, OrderLink, QueryCursor};

/// A set of writes applied as one unit: fully committed or fully discarded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageWrite {
    /// The query whose cursors and order links this write touches.
    pub query: String,
    /// Delete the query's existing cursors and order links before writing.
    pub clear_existing: bool,
    /// Items to upsert by id (last write wins).
    pub items: Vec<Item>,
    pub cursors: Vec<QueryCursor>,
    pub links: Vec<OrderLink>,
}

impl PageWrite {
    /// True when applying this write would change nothing.
    pub fn is_noop(&self) -> bool {
        !self.clear_existing && self.items.is_empty() && self.cursors.is_empty() && self.links.is_empty()
    }
}

/// Durable storage for items, query cursors, and order links.
#[async_trait::async_trait]
pub trait EntityStore: Send + Sync {
    /// Fetch an item by id.
    async fn get_item(&self, id: &str) -> Result<Option<Item>, Error>;

    /// Fetch the cursor recorded for `item_id` under `query`.
    async fn get_cursor(&self, query: &str, item_id: &str) -> Result<Option<QueryCursor>, Error>;

    /// Items linked to `query`, ascending by order index.
    async fn query_items(&self, query: &str) -> Result<Vec<Item>, Error>;

    /// Delete every cursor and order link of `query`. Items are untouched.
    async fn clear_query(&self, query: &str) -> Result<(), Error>;

    /// Apply `write` atomically.
    async fn apply(&self, write: PageWrite) -> Result<(), Error>;
}
