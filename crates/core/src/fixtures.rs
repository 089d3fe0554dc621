//! Shared test fixtures: deterministic items and a scripted remote source.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use crate::model::{Attribution, ImageUrls, Item};
use crate::remote::{RemoteError, RemoteSource, SearchPage};
use crate::store::PageWrite;
use crate::sync::build_page_write;

pub fn item(id: &str) -> Item {
    Item {
        id: id.to_string(),
        width: 100,
        height: 100,
        color: Some("#000000".into()),
        blur_hash: Some("LEHLk~WB2yk8pyo0adR*.7kCMdnj".into()),
        description: Some(format!("Description for {id}")),
        alt_description: None,
        urls: ImageUrls {
            raw: format!("https://images.example.com/{id}?raw"),
            full: format!("https://images.example.com/{id}?w=2000"),
            regular: format!("https://images.example.com/{id}?w=1080"),
            small: format!("https://images.example.com/{id}?w=400"),
            thumb: format!("https://images.example.com/{id}?w=200"),
        },
        user: Attribution {
            name: format!("User {id}"),
            username: format!("user{id}"),
            bio: Some("bio".into()),
            profile_image: None,
        },
        tags: vec!["tag1".into(), "tag2".into()],
    }
}

pub fn items(ids: &[&str]) -> Vec<Item> {
    ids.iter().map(|id| item(id)).collect()
}

pub fn ids(items: &[Item]) -> Vec<String> {
    items.iter().map(|i| i.id.clone()).collect()
}

pub fn page_write(query: &str, page: u32, page_size: u32, ids: &[&str], clear: bool) -> PageWrite {
    build_page_write(query, page, page_size, items(ids), clear)
}

/// Response behaviour of [`ScriptedRemote`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Serve the scripted pages; unscripted pages are empty.
    Pages,
    /// Every page is empty.
    Empty,
    RateLimited,
    GeneralFailure,
}

/// In-memory remote source serving scripted pages per `(query, page)`.
pub struct ScriptedRemote {
    pages: Mutex<HashMap<(String, u32), Vec<String>>>,
    mode: Mutex<Mode>,
    delay: Mutex<Option<Duration>>,
    requests: Mutex<Vec<u32>>,
}

impl Default for ScriptedRemote {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedRemote {
    pub fn new() -> Self {
        Self {
            pages: Mutex::new(HashMap::new()),
            mode: Mutex::new(Mode::Pages),
            delay: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// "cats": page 1 is `["1", "2"]`, page 2 is `["3", "4"]`, later pages are empty.
    pub fn cats() -> Self {
        Self::new().with_page("cats", 1, &["1", "2"]).with_page("cats", 2, &["3", "4"])
    }

    pub fn with_page(self, query: &str, page: u32, ids: &[&str]) -> Self {
        self.pages
            .lock()
            .unwrap()
            .insert((query.to_string(), page), ids.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn with_mode(self, mode: Mode) -> Self {
        self.set_mode(mode);
        self
    }

    pub fn set_mode(&self, mode: Mode) {
        *self.mode.lock().unwrap() = mode;
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn requested_pages(&self) -> Vec<u32> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl RemoteSource for ScriptedRemote {
    async fn search(&self, query: &str, page: u32, _per_page: u32) -> Result<SearchPage, RemoteError> {
        self.requests.lock().unwrap().push(page);

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mode = *self.mode.lock().unwrap();
        match mode {
            Mode::RateLimited => Err(RemoteError::RateLimited("Rate Limit Reached".into())),
            Mode::GeneralFailure => Err(RemoteError::GeneralFailure("HTTP 500".into())),
            Mode::Empty => Ok(SearchPage { items: Vec::new(), total: Some(0), total_pages: Some(0) }),
            Mode::Pages => {
                let ids = self
                    .pages
                    .lock()
                    .unwrap()
                    .get(&(query.to_string(), page))
                    .cloned()
                    .unwrap_or_default();
                let items = ids.iter().map(|id| item(id)).collect();
                Ok(SearchPage { items, total: None, total_pages: None })
            }
        }
    }
}
