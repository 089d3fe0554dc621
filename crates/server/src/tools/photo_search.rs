//! photo_search tool implementation.
//!
//! Opens, scrolls, and refreshes the paged view of a search query and returns
//! a slice of the materialized window. Remote failures are reported alongside
//! the cached window instead of replacing it.

use pixcache_core::{Edge, Error, Item, SyncOutcome};
use rmcp::{ErrorData as McpError, model::*};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::state::{AppState, PhotoView};

/// Largest slice returned in one call.
const MAX_LIMIT: usize = 100;

/// What to do with the query's view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SearchAction {
    /// Show cached results and refresh once (no-op for an open view).
    #[default]
    Open,
    /// Discard the query's list and reload from the anchor's page.
    Refresh,
    /// Fetch the page after the last item.
    Append,
    /// Fetch the page before the first item.
    Prepend,
    /// Record a read at `position`; prefetches near an open edge.
    Access,
}

/// Input parameters for photo_search tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct PhotoSearchParams {
    /// Search query (required).
    pub query: String,

    /// Action to run (default: open).
    #[serde(default)]
    pub action: SearchAction,

    /// Window position read by `access` (0-based).
    #[serde(default)]
    pub position: Option<usize>,

    /// First window position to return (default: 0).
    #[serde(default)]
    pub offset: Option<usize>,

    /// Number of items to return (default: page size, max 100).
    #[serde(default)]
    pub limit: Option<usize>,
}

/// A remote failure that left the cached window in place.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SyncFailure {
    /// Error code, e.g. RATE_LIMITED or REMOTE_FAILURE.
    pub code: String,
    pub message: String,
}

impl From<&Error> for SyncFailure {
    fn from(err: &Error) -> Self {
        Self { code: err.code().to_string(), message: err.to_string() }
    }
}

/// Output structure for photo_search tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PhotoSearchOutput {
    pub query: String,
    pub action: SearchAction,
    /// Result of the sync this call triggered, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<SyncOutcome>,
    /// Set when the triggered sync failed remotely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync_error: Option<SyncFailure>,
    /// Items currently materialized for the query.
    pub total_loaded: usize,
    /// Window position of `items[0]`.
    pub offset: usize,
    pub items: Vec<Item>,
    pub start_reached: bool,
    pub end_reached: bool,
    /// Whether the connectivity monitor reports the API unreachable.
    pub offline: bool,
}

/// Implementation of the photo_search tool.
pub async fn search_impl(state: &AppState, params: PhotoSearchParams) -> Result<CallToolResult, McpError> {
    let query = params.query.trim();
    if query.is_empty() {
        return Err(Error::InvalidInput("query cannot be empty".into()).into());
    }
    if params.action == SearchAction::Access && params.position.is_none() {
        return Err(Error::InvalidInput("position is required for access".into()).into());
    }
    if params.limit == Some(0) {
        return Err(Error::InvalidInput("limit must be greater than 0".into()).into());
    }

    let view = state.view(query).await;
    let mut view = view.lock().await;

    let mut outcome = None;
    let mut sync_error = None;

    let result = run_action(&mut view, &params).await;
    match result {
        Ok(o) => outcome = o,
        Err(e) if e.is_remote() => {
            let e = state.explain_sync_error(e);
            tracing::warn!("photo_search {:?} for query={} kept cached window: {}", params.action, query, e);
            sync_error = Some(SyncFailure::from(&e));
        }
        Err(e) => return Err(e.into()),
    }

    let total_loaded = view.len();
    let offset = params.offset.unwrap_or(0).min(total_loaded);
    let limit = params.limit.unwrap_or(state.paging.page_size as usize).min(MAX_LIMIT);
    let items = view.items()[offset..(offset + limit).min(total_loaded)].to_vec();

    let output = PhotoSearchOutput {
        query: query.to_string(),
        action: params.action,
        outcome,
        sync_error,
        total_loaded,
        offset,
        items,
        start_reached: view.edge_reached(Edge::Start),
        end_reached: view.edge_reached(Edge::End),
        offline: !state.is_online(),
    };

    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}

/// Open the view if needed, then run the requested action.
///
/// Opening already refreshes, so `open` and `refresh` on a fresh view sync once.
async fn run_action(view: &mut PhotoView, params: &PhotoSearchParams) -> Result<Option<SyncOutcome>, Error> {
    if !view.is_opened() {
        let opened = view.open().await?;
        if matches!(params.action, SearchAction::Open | SearchAction::Refresh) {
            return Ok(opened);
        }
    }

    match params.action {
        SearchAction::Open => Ok(None),
        SearchAction::Refresh => view.refresh().await.map(Some),
        SearchAction::Append => view.request_more(Edge::End).await.map(Some),
        SearchAction::Prepend => view.request_more(Edge::Start).await.map(Some),
        SearchAction::Access => view.access(params.position.unwrap_or(0)).await,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pixcache_core::RemoteError;

    use super::*;
    use crate::state::testing::{FakeRemote, output, state_with};

    fn params(query: &str, action: SearchAction) -> PhotoSearchParams {
        PhotoSearchParams { query: query.into(), action, ..Default::default() }
    }

    fn ids(output: &PhotoSearchOutput) -> Vec<&str> {
        output.items.iter().map(|i| i.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_empty_query() {
        let state = state_with(Arc::new(FakeRemote::default()), 2, 0).await;
        let result = search_impl(&state, params("  ", SearchAction::Open)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_access_requires_position() {
        let state = state_with(Arc::new(FakeRemote::default()), 2, 0).await;
        let result = search_impl(&state, params("cats", SearchAction::Access)).await;
        assert_eq!(result.unwrap_err().code.0, -32602);
    }

    #[tokio::test]
    async fn test_open_then_append() {
        let remote = Arc::new(FakeRemote::default().with_pages("cats", &[&["1", "2"], &["3", "4"]]));
        let state = state_with(remote, 2, 0).await;

        let out: PhotoSearchOutput = output(&search_impl(&state, params("cats", SearchAction::Open)).await.unwrap());
        assert_eq!(ids(&out), vec!["1", "2"]);
        assert_eq!(out.outcome, Some(SyncOutcome::Fetched { page: 1, items: 2, end_of_pagination_reached: false }));
        assert!(!out.offline);

        let out: PhotoSearchOutput = output(&search_impl(&state, params("cats", SearchAction::Open)).await.unwrap());
        assert!(out.outcome.is_none());

        let req = PhotoSearchParams { limit: Some(10), ..params("cats", SearchAction::Append) };
        let out: PhotoSearchOutput = output(&search_impl(&state, req).await.unwrap());
        assert_eq!(ids(&out), vec!["1", "2", "3", "4"]);
        assert_eq!(out.total_loaded, 4);

        let out: PhotoSearchOutput =
            output(&search_impl(&state, params("cats", SearchAction::Append)).await.unwrap());
        assert!(out.end_reached);
        assert_eq!(out.total_loaded, 4);
    }

    #[tokio::test]
    async fn test_access_prefetches_and_slices() {
        let remote = Arc::new(FakeRemote::default().with_pages("cats", &[&["1", "2"], &["3", "4"]]));
        let state = state_with(remote, 2, 1).await;

        search_impl(&state, params("cats", SearchAction::Open)).await.unwrap();

        let req = PhotoSearchParams {
            position: Some(1),
            offset: Some(2),
            limit: Some(2),
            ..params("cats", SearchAction::Access)
        };
        let out: PhotoSearchOutput = output(&search_impl(&state, req).await.unwrap());
        assert_eq!(out.total_loaded, 4);
        assert_eq!(out.offset, 2);
        assert_eq!(ids(&out), vec!["3", "4"]);
    }

    #[tokio::test]
    async fn test_remote_failure_keeps_window() {
        let remote = Arc::new(FakeRemote::default().with_pages("cats", &[&["1", "2"], &["3", "4"]]));
        let state = state_with(Arc::clone(&remote), 2, 0).await;

        search_impl(&state, params("cats", SearchAction::Open)).await.unwrap();
        remote.fail_with(Some(RemoteError::RateLimited("quota".into())));

        let out: PhotoSearchOutput =
            output(&search_impl(&state, params("cats", SearchAction::Refresh)).await.unwrap());
        assert_eq!(ids(&out), vec!["1", "2"]);
        assert_eq!(out.sync_error.as_ref().map(|e| e.code.as_str()), Some("RATE_LIMITED"));

        remote.fail_with(Some(RemoteError::GeneralFailure("offline".into())));
        let out: PhotoSearchOutput =
            output(&search_impl(&state, params("cats", SearchAction::Append)).await.unwrap());
        assert_eq!(out.total_loaded, 2);
        assert_eq!(out.sync_error.map(|e| e.code), Some("REMOTE_FAILURE".to_string()));
    }

    #[tokio::test]
    async fn test_prepend_at_first_page_is_boundary() {
        let remote = Arc::new(FakeRemote::default().with_pages("cats", &[&["1", "2"]]));
        let state = state_with(remote, 2, 0).await;

        search_impl(&state, params("cats", SearchAction::Open)).await.unwrap();
        let out: PhotoSearchOutput =
            output(&search_impl(&state, params("cats", SearchAction::Prepend)).await.unwrap());
        assert_eq!(out.outcome, Some(SyncOutcome::Boundary { end_of_pagination_reached: true }));
        assert!(out.start_reached);
    }

    #[tokio::test]
    async fn test_offset_past_end_returns_empty_slice() {
        let remote = Arc::new(FakeRemote::default().with_pages("cats", &[&["1", "2"]]));
        let state = state_with(remote, 2, 0).await;

        let req = PhotoSearchParams { offset: Some(10), ..params("cats", SearchAction::Open) };
        let out: PhotoSearchOutput = output(&search_impl(&state, req).await.unwrap());
        assert_eq!(out.offset, 2);
        assert!(out.items.is_empty());
    }
}
