//! Records persisted by the entity store.
//!
//! Items are shared by every query that returns them. Cursors and order links
//! are partitioned by query and are written only by the sync engine.

use serde::{Deserialize, Serialize};

/// A single search result, keyed by its remote id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Item {
    pub id: String,
    pub width: u32,
    pub height: u32,
    pub color: Option<String>,
    pub blur_hash: Option<String>,
    pub description: Option<String>,
    pub alt_description: Option<String>,
    pub urls: ImageUrls,
    pub user: Attribution,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Image URLs at the resolutions the API serves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ImageUrls {
    pub raw: String,
    pub full: String,
    pub regular: String,
    pub small: String,
    pub thumb: String,
}

/// The photographer credited for an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Attribution {
    pub name: String,
    pub username: String,
    pub bio: Option<String>,
    pub profile_image: Option<String>,
}

/// Adjacent remote page numbers for an item within one query's result stream.
///
/// A `None` key marks a boundary (or an unknown neighbour), never page zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct PageKeys {
    pub prev_key: Option<u32>,
    pub next_key: Option<u32>,
}

impl PageKeys {
    /// Keys for an item that arrived on `page`.
    ///
    /// Page 1 has no predecessor; an empty page has no successor.
    pub fn for_page(page: u32, page_was_empty: bool) -> Self {
        Self {
            prev_key: if page <= 1 { None } else { Some(page - 1) },
            next_key: if page_was_empty { None } else { Some(page + 1) },
        }
    }
}

/// Pagination cursor for one `(query, item)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct QueryCursor {
    pub query: String,
    pub item_id: String,
    pub prev_key: Option<u32>,
    pub next_key: Option<u32>,
}

impl QueryCursor {
    pub fn keys(&self) -> PageKeys {
        PageKeys { prev_key: self.prev_key, next_key: self.next_key }
    }
}

/// Position of an item inside one query's result list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct OrderLink {
    pub query: String,
    pub item_id: String,
    pub order_index: i64,
}

/// Order index for the item at `position` in the response for `page`.
///
/// Page-major, position-minor, so two items of one query never tie.
pub fn order_index(page: u32, page_size: u32, position: usize) -> i64 {
    (i64::from(page) - 1) * i64::from(page_size) + position as i64
}
