//! Unsplash photo search client.
//!
//! Issues `GET /search/photos` with the `Client-ID` authorization scheme and
//! maps the response into [`SearchPage`]. Each call makes exactly one request.
//!
//! ### Failure classification
//!
//! - `403`, `429`, or `X-Ratelimit-Remaining: 0` on any response: [`UnsplashError::RateLimited`]
//! - `401`: [`UnsplashError::AuthError`]
//! - any other 4xx/5xx, transport, or decoding failure: a general failure
//!
//! Requests may be paced by a minimum interval. Pacing delays a request; it
//! never repeats one.

pub mod error;
pub mod request;
pub mod response;

pub use error::UnsplashError;
pub use request::{MAX_PER_PAGE, SearchRequest};
pub use response::{PhotoDto, SearchResponseDto};

use pixcache_core::{AppConfig, RemoteError, RemoteSource, SearchPage};
use reqwest::header::{self, HeaderMap};
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Default base URL for the Unsplash API.
const DEFAULT_BASE_URL: &str = "https://api.unsplash.com";

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Default user agent.
const DEFAULT_USER_AGENT: &str = "pixcache/0.1";

/// Header carrying the remaining hourly quota.
const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";

/// Unsplash client configuration.
#[derive(Debug, Clone)]
pub struct UnsplashConfig {
    /// Application access key.
    pub access_key: String,
    /// Base URL (default: https://api.unsplash.com).
    pub base_url: String,
    /// Request timeout (default: 20s).
    pub timeout: Duration,
    /// User-agent string.
    pub user_agent: String,
    /// Minimum spacing between requests; zero disables pacing.
    pub min_request_interval: Duration,
}

impl Default for UnsplashConfig {
    fn default() -> Self {
        Self {
            access_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            min_request_interval: Duration::ZERO,
        }
    }
}

impl UnsplashConfig {
    /// Build from the application configuration.
    ///
    /// Fails with [`UnsplashError::MissingAccessKey`] when no key is configured.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, UnsplashError> {
        let access_key = config.require_access_key().map_err(|_| UnsplashError::MissingAccessKey)?;

        Ok(Self {
            access_key: access_key.to_string(),
            base_url: config.api_base_url.clone(),
            timeout: config.timeout(),
            user_agent: config.user_agent.clone(),
            min_request_interval: config.min_request_interval(),
        })
    }
}

/// Enforces a minimum interval between requests.
#[derive(Debug)]
struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval: Duration) -> Self {
        Self { last_request: Mutex::new(None), min_interval }
    }

    /// Wait until the interval since the previous request has elapsed.
    async fn acquire(&self) {
        if self.min_interval.is_zero() {
            return;
        }

        let mut last = self.last_request.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}

/// Unsplash search API client.
#[derive(Debug, Clone)]
pub struct UnsplashClient {
    http: reqwest::Client,
    config: UnsplashConfig,
    rate_limiter: Arc<RateLimiter>,
}

impl UnsplashClient {
    /// Create a new client with the given configuration.
    pub fn new(config: UnsplashConfig) -> Result<Self, UnsplashError> {
        if config.access_key.trim().is_empty() {
            return Err(UnsplashError::MissingAccessKey);
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| UnsplashError::Network(Arc::new(e)))?;

        let rate_limiter = Arc::new(RateLimiter::new(config.min_request_interval));
        Ok(Self { http, config, rate_limiter })
    }

    /// Create a client from the application configuration.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, UnsplashError> {
        Self::new(UnsplashConfig::from_app_config(config)?)
    }

    pub fn config(&self) -> &UnsplashConfig {
        &self.config
    }

    /// Fetch one page of photo search results.
    pub async fn search(&self, req: SearchRequest) -> Result<SearchPage, UnsplashError> {
        req.validate()?;

        self.rate_limiter.acquire().await;

        let start = Instant::now();
        let url = format!("{}/search/photos", self.config.base_url.trim_end_matches('/'));

        tracing::debug!("searching Unsplash: query={} page={} per_page={}", req.query, req.page, req.per_page);

        let http_response = self
            .http
            .get(&url)
            .header(header::AUTHORIZATION, format!("Client-ID {}", self.config.access_key))
            .header("Accept-Version", "v1")
            .header(header::ACCEPT, "application/json")
            .header(header::USER_AGENT, &self.config.user_agent)
            .query(&req)
            .send()
            .await?;

        let status = http_response.status();
        tracing::debug!("Unsplash response status: {}", status);

        if let Some(err) = classify_response(status, http_response.headers()) {
            return Err(err);
        }

        let bytes = http_response.bytes().await?;
        let raw: SearchResponseDto =
            serde_json::from_slice(&bytes).map_err(|e| UnsplashError::Parse(e.to_string()))?;

        tracing::debug!("search completed in {:?}, {} results", start.elapsed(), raw.results.len());

        Ok(SearchPage::from(raw))
    }
}

/// Map a response's status and headers to a failure, if any.
///
/// An exhausted quota header wins over a successful status.
fn classify_response(status: StatusCode, headers: &HeaderMap) -> Option<UnsplashError> {
    let quota_exhausted = headers
        .get(RATE_LIMIT_REMAINING)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim() == "0");

    if quota_exhausted {
        return Some(UnsplashError::RateLimited(format!("quota exhausted (status {})", status.as_u16())));
    }

    match status {
        StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => {
            Some(UnsplashError::RateLimited(format!("status {}", status.as_u16())))
        }
        StatusCode::UNAUTHORIZED => Some(UnsplashError::AuthError),
        s if s.is_client_error() || s.is_server_error() => Some(UnsplashError::HttpError { status: s.as_u16() }),
        _ => None,
    }
}

#[async_trait::async_trait]
impl RemoteSource for UnsplashClient {
    async fn search(&self, query: &str, page: u32, per_page: u32) -> Result<SearchPage, RemoteError> {
        UnsplashClient::search(self, SearchRequest::new(query, page, per_page))
            .await
            .inspect_err(|e| tracing::warn!("unsplash search failed: query={} page={}: {}", query, page, e))
            .map_err(RemoteError::from)
    }
}
