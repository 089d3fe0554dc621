//! Paged view over one query's cached results.
//!
//! A thin read-and-trigger adapter: it re-reads the store's ordered list after
//! each sync and asks the engine for more when reads approach an edge. Every
//! trigger takes `&mut self`, so a view can never have two syncs in flight.

use crate::Error;
use crate::model::Item;
use crate::remote::RemoteSource;
use crate::store::EntityStore;
use crate::sync::{LoadType, PagingState, SyncEngine, SyncOutcome};

/// Paging parameters for a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagingConfig {
    /// Items requested per remote page.
    pub page_size: u32,
    /// Reads within this many items of an edge request more data.
    pub prefetch_distance: usize,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self { page_size: 30, prefetch_distance: 30 }
    }
}

/// Which end of the window to extend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Start,
    End,
}

impl Edge {
    fn load_type(self) -> LoadType {
        match self {
            Edge::Start => LoadType::Prepend,
            Edge::End => LoadType::Append,
        }
    }
}

pub struct PagedView<S: ?Sized, R: ?Sized> {
    engine: SyncEngine<S, R>,
    query: String,
    config: PagingConfig,
    items: Vec<Item>,
    anchor_position: Option<usize>,
    opened: bool,
    start_reached: bool,
    end_reached: bool,
}

impl<S: EntityStore + ?Sized, R: RemoteSource + ?Sized> PagedView<S, R> {
    pub fn new(engine: SyncEngine<S, R>, query: impl Into<String>, config: PagingConfig) -> Self {
        Self {
            engine,
            query: query.into(),
            config,
            items: Vec::new(),
            anchor_position: None,
            opened: false,
            start_reached: false,
            end_reached: false,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Currently materialized items in display order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_opened(&self) -> bool {
        self.opened
    }

    pub fn anchor_position(&self) -> Option<usize> {
        self.anchor_position
    }

    /// Whether no further page exists before the first / after the last item.
    pub fn edge_reached(&self, edge: Edge) -> bool {
        match edge {
            Edge::Start => self.start_reached,
            Edge::End => self.end_reached,
        }
    }

    /// First subscription: show whatever is cached, then refresh.
    ///
    /// Cached rows stay visible when the refresh fails, so a restart while
    /// offline still shows the last synced results. Later calls are no-ops.
    pub async fn open(&mut self) -> Result<Option<SyncOutcome>, Error> {
        if self.opened {
            return Ok(None);
        }
        self.reload().await?;
        self.opened = true;
        self.refresh().await.map(Some)
    }

    /// Re-read the query's ordered list from the store.
    pub async fn reload(&mut self) -> Result<(), Error> {
        self.items = self.engine.store().query_items(&self.query).await?;
        if let Some(anchor) = self.anchor_position
            && anchor >= self.items.len()
        {
            self.anchor_position = self.items.len().checked_sub(1);
        }
        Ok(())
    }

    /// Explicit invalidation: restart from the server's current view.
    pub async fn refresh(&mut self) -> Result<SyncOutcome, Error> {
        let outcome = {
            let state = PagingState::new(&self.items, self.anchor_position, self.config.page_size);
            self.engine.load(&self.query, LoadType::Refresh, &state).await?
        };

        let end = outcome.end_of_pagination_reached();
        self.start_reached = end;
        self.end_reached = end;
        self.reload().await?;
        Ok(outcome)
    }

    /// Extend the window at `edge`.
    pub async fn request_more(&mut self, edge: Edge) -> Result<SyncOutcome, Error> {
        let outcome = {
            let state = PagingState::new(&self.items, self.anchor_position, self.config.page_size);
            self.engine.load(&self.query, edge.load_type(), &state).await?
        };

        if outcome.end_of_pagination_reached() {
            match edge {
                Edge::Start => self.start_reached = true,
                Edge::End => self.end_reached = true,
            }
        }
        if matches!(outcome, SyncOutcome::Fetched { .. }) {
            self.reload().await?;
        }
        Ok(outcome)
    }

    /// Record a read at `position` and prefetch if it is near an open edge.
    ///
    /// Returns the outcome of the triggered sync, or None when no edge needed it.
    pub async fn access(&mut self, position: usize) -> Result<Option<SyncOutcome>, Error> {
        if self.items.is_empty() {
            return Ok(None);
        }
        let position = position.min(self.items.len() - 1);
        self.anchor_position = Some(position);

        let distance = self.config.prefetch_distance;
        if !self.end_reached && position.saturating_add(distance) >= self.items.len() - 1 {
            return self.request_more(Edge::End).await.map(Some);
        }
        if !self.start_reached && position <= distance {
            return self.request_more(Edge::Start).await.map(Some);
        }
        Ok(None)
    }
}
