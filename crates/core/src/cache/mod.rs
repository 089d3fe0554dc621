//! SQLite-backed entity store for search results.
//!
//! This module provides a persistent cache using SQLite with async access via
//! tokio-rusqlite. It supports:
//!
//! - Shared item rows upserted by id
//! - Per-query cursors and order links
//! - One atomic write primitive across all three tables
//! - Automatic schema migrations
//! - WAL mode for concurrent access

pub mod connection;
pub mod items;
pub mod migrations;
pub mod query_state;
pub mod transaction;

pub use crate::Error;

pub use connection::CacheDb;
