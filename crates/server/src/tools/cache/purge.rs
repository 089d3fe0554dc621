//! cache_purge tool implementation.
//!
//! Clears one query's list, drops orphaned items, or wipes the whole cache.

use pixcache_core::Error;
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Parameters for the cache_purge tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeParams {
    /// Clear the ordered list and cursors of this query. Items are kept.
    #[serde(default)]
    pub query: Option<String>,

    /// Delete items no query links to.
    #[serde(default)]
    pub orphans: bool,

    /// Delete every item, cursor, and order link.
    #[serde(default)]
    pub all: bool,
}

/// Output from the cache_purge tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeOutput {
    /// Order links removed from the cleared query.
    pub links_deleted: u64,
    /// Items deleted.
    pub items_deleted: u64,
}

/// Implementation of the cache_purge tool.
///
/// A cleared query's view is locked for the duration of the clear, so a sync
/// in flight on it commits first, and is then reset so the next search starts
/// fresh.
pub async fn purge_impl(state: &AppState, params: CachePurgeParams) -> Result<CallToolResult, McpError> {
    if params.query.is_none() && !params.orphans && !params.all {
        return Err(Error::InvalidInput("At least one of query, orphans, or all must be specified".to_string()).into());
    }

    let mut output = CachePurgeOutput::default();

    if params.all {
        let mut guards = state.lock_all_views().await;
        output.items_deleted += state.db.clear_all().await?;
        for guard in &mut guards {
            state.reset_view(guard);
        }
        tracing::info!("cache cleared: {} items deleted", output.items_deleted);
    } else {
        if let Some(query) = params.query.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            let mut guard = state.lock_view(query).await;
            output.links_deleted += state.db.clear_query(query).await?;
            state.reset_view(&mut guard);
        }

        if params.orphans {
            output.items_deleted += state.db.purge_orphan_items().await?;
        }
    }

    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
