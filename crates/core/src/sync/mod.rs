//! Reconciles a paginated remote search with the local entity store.
//!
//! ### Triggers
//! - **Refresh**: first load or explicit invalidation. Re-fetches the page
//!   holding the item nearest the scroll anchor (page 1 when nothing is
//!   loaded) and replaces the query's cursors and order links.
//! - **Prepend / Append**: extend the window from the first / last loaded
//!   item's cursor. Incremental, never clears.
//!
//! ### Merge
//! Every item of a fetched page gets `prev = page - 1` (none on page 1),
//! `next = page + 1` (none when the page is empty), and
//! `order_index = (page - 1) * page_size + position`. The whole page is
//! committed with one [`PageWrite`].
//!
//! ### Failures
//! A remote failure aborts before any write. Rate limiting stays distinct
//! from other failures so callers can message it differently.

mod engine;

pub use engine::SyncEngine;

use serde::{Deserialize, Serialize};

use crate::model::{Item, OrderLink, PageKeys, QueryCursor, order_index};
use crate::store::PageWrite;

/// Why a sync was invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum LoadType {
    Refresh,
    Prepend,
    Append,
}

impl std::fmt::Display for LoadType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LoadType::Refresh => "refresh",
            LoadType::Prepend => "prepend",
            LoadType::Append => "append",
        };
        f.write_str(name)
    }
}

/// The consumer's currently materialized window.
#[derive(Debug, Clone, Copy)]
pub struct PagingState<'a> {
    /// Loaded items in display order.
    pub window: &'a [Item],
    /// Index of the item the consumer last read, if any.
    pub anchor_position: Option<usize>,
    /// Items requested per remote page.
    pub page_size: u32,
}

impl<'a> PagingState<'a> {
    pub fn new(window: &'a [Item], anchor_position: Option<usize>, page_size: u32) -> Self {
        Self { window, anchor_position, page_size }
    }

    /// An empty window, as seen on first load.
    pub fn empty(page_size: u32) -> Self {
        Self { window: &[], anchor_position: None, page_size }
    }

    pub fn first_item(&self) -> Option<&'a Item> {
        self.window.first()
    }

    pub fn last_item(&self) -> Option<&'a Item> {
        self.window.last()
    }

    /// Item at the anchor, clamped into the window.
    pub fn closest_item_to_anchor(&self) -> Option<&'a Item> {
        let anchor = self.anchor_position?;
        let last = self.window.len().checked_sub(1)?;
        self.window.get(anchor.min(last))
    }
}

/// Result of one sync invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SyncOutcome {
    /// A page was fetched and committed.
    Fetched { page: u32, items: usize, end_of_pagination_reached: bool },
    /// The window already sits on a recorded boundary; nothing was fetched.
    Boundary { end_of_pagination_reached: bool },
    /// The window has no cursor to extend from; refresh the query first.
    RefreshRequired,
}

impl SyncOutcome {
    /// Whether no further page exists in the requested direction.
    ///
    /// `RefreshRequired` reports false: there is no data yet, so the edge is
    /// unknown rather than reached.
    pub fn end_of_pagination_reached(&self) -> bool {
        match self {
            SyncOutcome::Fetched { end_of_pagination_reached, .. } => *end_of_pagination_reached,
            SyncOutcome::Boundary { end_of_pagination_reached } => *end_of_pagination_reached,
            SyncOutcome::RefreshRequired => false,
        }
    }
}

/// Build the atomic write for `items` fetched from `page`.
///
/// `clear_existing` is set for refreshes so the query restarts from the
/// server's current view.
pub fn build_page_write(query: &str, page: u32, page_size: u32, items: Vec<Item>, clear_existing: bool) -> PageWrite {
    let keys = PageKeys::for_page(page, items.is_empty());

    let cursors = items
        .iter()
        .map(|item| QueryCursor {
            query: query.to_string(),
            item_id: item.id.clone(),
            prev_key: keys.prev_key,
            next_key: keys.next_key,
        })
        .collect();

    let links = items
        .iter()
        .enumerate()
        .map(|(position, item)| OrderLink {
            query: query.to_string(),
            item_id: item.id.clone(),
            order_index: order_index(page, page_size, position),
        })
        .collect();

    PageWrite { query: query.to_string(), clear_existing, items, cursors, links }
}
