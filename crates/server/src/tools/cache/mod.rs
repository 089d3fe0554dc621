//! Cache maintenance MCP tools.

pub mod purge;

pub use purge::{CachePurgeParams, purge_impl};
