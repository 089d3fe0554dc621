//! Core types and shared functionality for pixcache.
//!
//! This crate provides:
//! - Item, cursor, and ordering models
//! - Entity store implementation with SQLite backend
//! - The remote source contract and the sync engine that drives it
//! - A paged view over a query's cached results
//! - Unified error types and configuration structures

pub mod cache;
pub mod config;
pub mod connectivity;
pub mod error;
pub mod model;
pub mod paging;
pub mod remote;
pub mod store;
pub mod sync;

#[cfg(test)]
pub(crate) mod fixtures;

pub use cache::CacheDb;
pub use config::{AppConfig, ConfigError};
pub use connectivity::{AlwaysOnline, NetworkMonitor, WatchMonitor};
pub use error::Error;
pub use model::{Attribution, ImageUrls, Item, OrderLink, QueryCursor};
pub use paging::{Edge, PagedView, PagingConfig};
pub use remote::{MAX_PER_PAGE, RemoteError, RemoteSource, SearchPage};
pub use store::{EntityStore, PageWrite};
pub use sync::{LoadType, PagingState, SyncEngine, SyncOutcome};
