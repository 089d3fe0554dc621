//! MCP tool implementations.
//!
//! This module contains all tools exposed by the pixcache server.

pub mod cache;
pub mod photo_get;
pub mod photo_search;

pub use cache::{CachePurgeParams, purge_impl};
pub use photo_get::{PhotoGetParams, get_impl};
pub use photo_search::{PhotoSearchParams, search_impl};
