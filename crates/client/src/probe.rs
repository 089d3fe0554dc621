//! TCP reachability probe that feeds a [`WatchMonitor`].
//!
//! A probe is a bare TCP connect to the API host; no HTTP request is made, so
//! probing never spends API quota.

use pixcache_core::WatchMonitor;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use url::Url;

/// Default connect timeout for a single probe.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// Reachability probe for one `host:port`.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    addr: String,
    connect_timeout: Duration,
}

impl TcpProbe {
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into(), connect_timeout: DEFAULT_CONNECT_TIMEOUT }
    }

    /// Probe the host of an HTTP(S) base URL, defaulting the port by scheme.
    pub fn for_base_url(base_url: &str) -> Result<Self, url::ParseError> {
        let url = Url::parse(base_url)?;
        let host = url.host_str().ok_or(url::ParseError::EmptyHost)?;
        let port = url.port_or_known_default().unwrap_or(443);
        Ok(Self::new(format!("{host}:{port}")))
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Attempt one connection.
    pub async fn check(&self) -> bool {
        matches!(tokio::time::timeout(self.connect_timeout, TcpStream::connect(&self.addr)).await, Ok(Ok(_)))
    }

    /// Probe once and publish the result.
    pub async fn check_into(&self, monitor: &WatchMonitor) -> bool {
        let online = self.check().await;
        if monitor.set_online(online) {
            tracing::info!("connectivity changed: addr={} online={}", self.addr, online);
        }
        online
    }

    /// Probe every `interval` until the returned task is aborted.
    pub fn spawn(self, monitor: WatchMonitor, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                self.check_into(&monitor).await;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixcache_core::NetworkMonitor;
    use tokio::net::TcpListener;

    #[test]
    fn test_for_base_url() {
        assert_eq!(TcpProbe::for_base_url("https://api.unsplash.com").unwrap().addr(), "api.unsplash.com:443");
        assert_eq!(TcpProbe::for_base_url("http://localhost:8080/v1").unwrap().addr(), "localhost:8080");
        assert_eq!(TcpProbe::for_base_url("http://example.com").unwrap().addr(), "example.com:80");
        assert!(TcpProbe::for_base_url("not a url").is_err());
    }

    #[tokio::test]
    async fn test_check_reachable_and_unreachable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let probe = TcpProbe::new(addr.to_string()).with_connect_timeout(Duration::from_secs(1));
        assert!(probe.check().await);

        drop(listener);
        assert!(!probe.check().await);
    }

    #[tokio::test]
    async fn test_check_into_publishes_changes() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let monitor = WatchMonitor::new(false);
        let mut rx = monitor.subscribe();

        let probe = TcpProbe::new(addr.to_string()).with_connect_timeout(Duration::from_secs(1));
        assert!(probe.check_into(&monitor).await);
        assert!(monitor.is_online());
        assert!(rx.has_changed().unwrap());
        rx.borrow_and_update();

        drop(listener);
        assert!(!probe.check_into(&monitor).await);
        assert!(!monitor.is_online());
        assert!(rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_spawn_updates_monitor() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let monitor = WatchMonitor::new(false);
        let mut rx = monitor.subscribe();

        let handle = TcpProbe::new(addr.to_string()).spawn(monitor.clone(), Duration::from_millis(20));
        tokio::time::timeout(Duration::from_secs(2), rx.changed()).await.unwrap().unwrap();
        assert!(*rx.borrow());

        handle.abort();
    }
}
