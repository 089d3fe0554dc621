//! photo_get tool implementation.
//!
//! Reads a single cached item by id. Never touches the network.

use pixcache_core::{Error, Item};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Parameters for the photo_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PhotoGetParams {
    /// The remote id of the photo.
    pub id: String,
}

/// Output from the photo_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PhotoGetOutput {
    pub item: Item,
}

/// Implementation of the photo_get tool.
pub async fn get_impl(state: &AppState, params: PhotoGetParams) -> Result<CallToolResult, McpError> {
    if params.id.trim().is_empty() {
        return Err(Error::InvalidInput("id cannot be empty".into()).into());
    }

    let item = state
        .db
        .get_item(&params.id)
        .await?
        .ok_or_else(|| Error::CacheMiss(params.id.clone()))?;

    let output = PhotoGetOutput { item };
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize item: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
