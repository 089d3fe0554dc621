use std::sync::Arc;
use std::time::Instant;

use super::{LoadType, PagingState, SyncOutcome, build_page_write};
use crate::Error;
use crate::model::QueryCursor;
use crate::remote::RemoteSource;
use crate::store::EntityStore;

/// Where a trigger resolved to before any network call.
enum PageTarget {
    Fetch(u32),
    Done(SyncOutcome),
}

/// Drives refresh / prepend / append cycles for any query.
///
/// Holds no per-query state; everything it needs between calls lives in the
/// store. Callers must not run two triggers for the same query at once, while
/// different queries may sync concurrently.
pub struct SyncEngine<S: ?Sized, R: ?Sized> {
    store: Arc<S>,
    remote: Arc<R>,
}

impl<S: ?Sized, R: ?Sized> Clone for SyncEngine<S, R> {
    fn clone(&self) -> Self {
        Self { store: Arc::clone(&self.store), remote: Arc::clone(&self.remote) }
    }
}

impl<S: EntityStore + ?Sized, R: RemoteSource + ?Sized> SyncEngine<S, R> {
    pub fn new(store: Arc<S>, remote: Arc<R>) -> Self {
        Self { store, remote }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Run one trigger for `query` against the consumer's current window.
    ///
    /// # Errors
    ///
    /// Returns `Error::RateLimited` or `Error::RemoteFailure` when the fetch
    /// fails (nothing is written), or a store error if the commit fails
    /// (the transaction is rolled back).
    pub async fn load(&self, query: &str, load_type: LoadType, state: &PagingState<'_>) -> Result<SyncOutcome, Error> {
        if query.trim().is_empty() {
            return Err(Error::InvalidInput("query cannot be empty".into()));
        }
        if state.page_size == 0 {
            return Err(Error::InvalidInput("page size must be greater than 0".into()));
        }

        let page = match self.resolve_page(query, load_type, state).await? {
            PageTarget::Fetch(page) => page,
            PageTarget::Done(outcome) => {
                tracing::debug!("{} for query={} needs no fetch: {:?}", load_type, query, outcome);
                return Ok(outcome);
            }
        };

        let start = Instant::now();
        tracing::debug!("{} fetching page {} for query={}", load_type, page, query);

        let response = self
            .remote
            .search(query, page, state.page_size)
            .await
            .inspect_err(|e| tracing::warn!("{} of page {} for query={} failed: {}", load_type, page, query, e))?;

        let fetched = response.items.len();
        let end_of_pagination_reached = response.is_empty();
        let write = build_page_write(query, page, state.page_size, response.items, load_type == LoadType::Refresh);
        self.store.apply(write).await?;

        if load_type == LoadType::Refresh {
            tracing::info!("refreshed query={} from page {} with {} items", query, page, fetched);
        }
        tracing::debug!("{} of page {} committed in {:?}, {} items", load_type, page, start.elapsed(), fetched);

        Ok(SyncOutcome::Fetched { page, items: fetched, end_of_pagination_reached })
    }

    async fn resolve_page(&self, query: &str, load_type: LoadType, state: &PagingState<'_>) -> Result<PageTarget, Error> {
        match load_type {
            LoadType::Refresh => {
                let cursor = match state.closest_item_to_anchor() {
                    Some(item) => self.store.get_cursor(query, &item.id).await?,
                    None => None,
                };
                let page = cursor
                    .and_then(|c| c.next_key)
                    .map(|next| next.saturating_sub(1).max(1))
                    .unwrap_or(1);
                Ok(PageTarget::Fetch(page))
            }
            LoadType::Prepend => {
                let cursor = self.edge_cursor(query, state.first_item().map(|i| i.id.as_str())).await?;
                Ok(Self::edge_target(cursor, |c| c.prev_key))
            }
            LoadType::Append => {
                let cursor = self.edge_cursor(query, state.last_item().map(|i| i.id.as_str())).await?;
                Ok(Self::edge_target(cursor, |c| c.next_key))
            }
        }
    }

    async fn edge_cursor(&self, query: &str, item_id: Option<&str>) -> Result<Option<QueryCursor>, Error> {
        match item_id {
            Some(id) => self.store.get_cursor(query, id).await,
            None => Ok(None),
        }
    }

    fn edge_target(cursor: Option<QueryCursor>, key: impl Fn(&QueryCursor) -> Option<u32>) -> PageTarget {
        match cursor {
            None => PageTarget::Done(SyncOutcome::RefreshRequired),
            Some(cursor) => match key(&cursor) {
                Some(page) => PageTarget::Fetch(page),
                None => PageTarget::Done(SyncOutcome::Boundary { end_of_pagination_reached: true }),
            },
        }
    }
}
