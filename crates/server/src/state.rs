//! Shared server state: the cache, the remote source, connectivity, and one
//! paged view per query.

use std::collections::HashMap;
use std::sync::Arc;

use pixcache_client::UnsplashClient;
use pixcache_core::{
    AppConfig, CacheDb, Error, NetworkMonitor, PagedView, PagingConfig, RemoteError, RemoteSource, SearchPage,
    SyncEngine, WatchMonitor,
};
use tokio::sync::{Mutex, OwnedMutexGuard};

/// A paged view as the server holds it.
pub type PhotoView = PagedView<CacheDb, dyn RemoteSource>;

/// Views kept before idle ones are evicted.
pub const DEFAULT_MAX_VIEWS: usize = 64;

struct ViewSlot {
    view: Arc<Mutex<PhotoView>>,
    last_used: u64,
}

/// Per-query views with least-recently-used eviction.
///
/// A view whose mutex is shared with a caller is never evicted, so one query
/// can't end up with two views syncing at once.
#[derive(Default)]
struct ViewCache {
    slots: HashMap<String, ViewSlot>,
    clock: u64,
}

impl ViewCache {
    fn evict_idle(&mut self, max_views: usize) {
        while self.slots.len() >= max_views {
            let idle = self
                .slots
                .iter()
                .filter(|(_, slot)| Arc::strong_count(&slot.view) == 1)
                .min_by_key(|(_, slot)| slot.last_used)
                .map(|(query, _)| query.clone());
            match idle {
                Some(query) => {
                    tracing::debug!("evicting idle view for query={}", query);
                    self.slots.remove(&query);
                }
                None => break,
            }
        }
    }
}

/// Remote source used when no access key is configured.
///
/// Every fetch fails, so cached results stay browsable.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unconfigured;

#[async_trait::async_trait]
impl RemoteSource for Unconfigured {
    async fn search(&self, _query: &str, _page: u32, _per_page: u32) -> Result<SearchPage, RemoteError> {
        Err(RemoteError::GeneralFailure("no access key configured".into()))
    }
}

pub struct AppState {
    pub db: Arc<CacheDb>,
    pub paging: PagingConfig,
    pub monitor: Arc<dyn NetworkMonitor>,
    engine: SyncEngine<CacheDb, dyn RemoteSource>,
    remote_configured: bool,
    max_views: usize,
    views: Mutex<ViewCache>,
}

impl AppState {
    pub fn new(
        db: Arc<CacheDb>, remote: Arc<dyn RemoteSource>, monitor: Arc<dyn NetworkMonitor>, paging: PagingConfig,
        remote_configured: bool,
    ) -> Self {
        let engine = SyncEngine::new(Arc::clone(&db), remote);
        Self {
            db,
            paging,
            monitor,
            engine,
            remote_configured,
            max_views: DEFAULT_MAX_VIEWS,
            views: Mutex::new(ViewCache::default()),
        }
    }

    pub fn with_max_views(mut self, max_views: usize) -> Self {
        self.max_views = max_views.max(1);
        self
    }

    /// Build state from configuration, falling back to [`Unconfigured`] without a key.
    pub fn from_config(config: &AppConfig, db: Arc<CacheDb>, monitor: WatchMonitor) -> Self {
        let remote: Arc<dyn RemoteSource> = match UnsplashClient::from_app_config(config) {
            Ok(client) => Arc::new(client),
            Err(e) => {
                tracing::warn!("remote search disabled: {}", e);
                Arc::new(Unconfigured)
            }
        };
        let configured = config.require_access_key().is_ok();
        Self::new(db, remote, Arc::new(monitor), config.paging(), configured)
    }

    fn new_view(&self, query: &str) -> PhotoView {
        PagedView::new(self.engine.clone(), query, self.paging)
    }

    /// The view for `query`, created on first use.
    pub async fn view(&self, query: &str) -> Arc<Mutex<PhotoView>> {
        let mut views = self.views.lock().await;
        views.clock += 1;
        let now = views.clock;

        if let Some(slot) = views.slots.get_mut(query) {
            slot.last_used = now;
            return Arc::clone(&slot.view);
        }

        views.evict_idle(self.max_views);
        let view = Arc::new(Mutex::new(self.new_view(query)));
        views
            .slots
            .insert(query.to_string(), ViewSlot { view: Arc::clone(&view), last_used: now });
        view
    }

    /// Lock the view of `query`, waiting for any sync in flight on it.
    pub async fn lock_view(&self, query: &str) -> OwnedMutexGuard<PhotoView> {
        self.view(query).await.lock_owned().await
    }

    /// Lock every current view, in query order.
    pub async fn lock_all_views(&self) -> Vec<OwnedMutexGuard<PhotoView>> {
        let mut views: Vec<(String, Arc<Mutex<PhotoView>>)> = {
            let cache = self.views.lock().await;
            cache
                .slots
                .iter()
                .map(|(query, slot)| (query.clone(), Arc::clone(&slot.view)))
                .collect()
        };
        views.sort_by(|a, b| a.0.cmp(&b.0));

        let mut guards = Vec::with_capacity(views.len());
        for (_, view) in views {
            guards.push(view.lock_owned().await);
        }
        guards
    }

    /// Replace a locked view with a fresh, unopened one.
    pub fn reset_view(&self, guard: &mut OwnedMutexGuard<PhotoView>) {
        let query = guard.query().to_string();
        **guard = self.new_view(&query);
    }

    #[cfg(test)]
    pub(crate) async fn view_count(&self) -> usize {
        self.views.lock().await.slots.len()
    }

    pub fn is_online(&self) -> bool {
        self.monitor.is_online()
    }

    /// Report a failed fetch as an auth problem when no key is configured.
    pub fn explain_sync_error(&self, err: Error) -> Error {
        if !self.remote_configured && err.is_remote() {
            return Error::AuthError("set PIXCACHE_UNSPLASH_ACCESS_KEY to enable remote search".into());
        }
        err
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    use pixcache_core::{AlwaysOnline, Attribution, ImageUrls, Item};

    use super::*;

    pub fn item(id: &str) -> Item {
        Item {
            id: id.to_string(),
            width: 640,
            height: 480,
            color: None,
            blur_hash: None,
            description: Some(format!("photo {id}")),
            alt_description: None,
            urls: ImageUrls {
                raw: format!("https://images.example.com/{id}"),
                full: format!("https://images.example.com/{id}?full"),
                regular: format!("https://images.example.com/{id}?regular"),
                small: format!("https://images.example.com/{id}?small"),
                thumb: format!("https://images.example.com/{id}?thumb"),
            },
            user: Attribution { name: "Someone".into(), username: "someone".into(), bio: None, profile_image: None },
            tags: vec![],
        }
    }

    /// Serves `pages[query][page - 1]`, empty past the end, or fails every call.
    #[derive(Default)]
    pub struct FakeRemote {
        pages: HashMap<String, Vec<Vec<Item>>>,
        failure: StdMutex<Option<RemoteError>>,
        delay: StdMutex<Option<Duration>>,
    }

    impl FakeRemote {
        pub fn with_pages(mut self, query: &str, pages: &[&[&str]]) -> Self {
            let pages = pages.iter().map(|ids| ids.iter().map(|id| item(id)).collect()).collect();
            self.pages.insert(query.to_string(), pages);
            self
        }

        pub fn fail_with(&self, err: Option<RemoteError>) {
            *self.failure.lock().unwrap() = err;
        }

        pub fn set_delay(&self, delay: Duration) {
            *self.delay.lock().unwrap() = Some(delay);
        }
    }

    #[async_trait::async_trait]
    impl RemoteSource for FakeRemote {
        async fn search(&self, query: &str, page: u32, _per_page: u32) -> Result<SearchPage, RemoteError> {
            let delay = *self.delay.lock().unwrap();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            if let Some(err) = self.failure.lock().unwrap().clone() {
                return Err(err);
            }
            let items = self
                .pages
                .get(query)
                .and_then(|pages| pages.get(page as usize - 1))
                .cloned()
                .unwrap_or_default();
            Ok(SearchPage { items, total: None, total_pages: None })
        }
    }

    pub async fn state_with(remote: Arc<FakeRemote>, page_size: u32, prefetch_distance: usize) -> AppState {
        let db = Arc::new(CacheDb::open_in_memory().await.unwrap());
        AppState::new(db, remote, Arc::new(AlwaysOnline), PagingConfig { page_size, prefetch_distance }, true)
    }

    /// Parse the JSON text content of a tool result.
    pub fn output<T: serde::de::DeserializeOwned>(result: &rmcp::model::CallToolResult) -> T {
        let content_val = serde_json::to_value(&result.content[0]).unwrap();
        let text = content_val
            .get("text")
            .and_then(|v| v.as_str())
            .expect("Expected text field in content");
        serde_json::from_str(text).unwrap()
    }
}
