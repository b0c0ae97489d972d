//! HTTP-based item fetcher.
//!
//! One GET per identifier against the configured product URL template.

use async_trait::async_trait;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::config::HarvestConfig;
use crate::error::{FetchError, FetchResult, HarvestError, Result};
use crate::traits::fetcher::ItemFetcher;
use crate::types::payload::RawPayload;

/// Fetches catalog payloads over HTTP.
///
/// No retries and no backoff: a failed request is reported immediately.
/// The optional delay is the minimum spacing between request starts, so the
/// first request of a run goes out at once and nothing waits after the last.
///
/// # Example
///
/// ```rust,ignore
/// use harvester::{HarvestConfig, HttpFetcher, ItemFetcher};
///
/// let fetcher = HttpFetcher::new(&HarvestConfig::new())?;
/// let payload = fetcher.fetch(123).await?;
/// ```
pub struct HttpFetcher {
    client: reqwest::Client,
    config: HarvestConfig,
    last_request: Mutex<Option<Instant>>,
}

impl HttpFetcher {
    /// Create a fetcher from configuration.
    pub fn new(config: &HarvestConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| HarvestError::config("http client", e.to_string()))?;

        Ok(Self {
            client,
            config: config.clone(),
            last_request: Mutex::new(None),
        })
    }

    /// URL requested for `id`.
    pub fn url_for(&self, id: i64) -> String {
        self.config.product_url_for(id)
    }

    /// Reserve the next request slot and return how long to wait for it.
    fn claim_slot(&self) -> Duration {
        let mut last = self.last_request.lock().unwrap();
        let now = Instant::now();
        let wait = remaining_pause(*last, now, self.config.request_delay);
        *last = Some(now + wait);
        wait
    }

    async fn fetch_once(&self, id: i64) -> FetchResult<RawPayload> {
        let url = self.url_for(id);
        debug!(id, url = %url, "HTTP fetch starting");

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                warn!(id, url = %url, error = %e, "HTTP request failed");
                FetchError::Transport {
                    id,
                    source: Box::new(e),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Transport {
                id,
                source: Box::new(std::io::Error::other(format!("HTTP {}", status))),
            });
        }

        let text = response.text().await.map_err(|e| FetchError::Transport {
            id,
            source: Box::new(e),
        })?;

        debug!(id, content_length = text.len(), "HTTP fetch complete");
        RawPayload::parse(id, &text)
    }
}

#[async_trait]
impl ItemFetcher for HttpFetcher {
    async fn fetch(&self, id: i64) -> FetchResult<RawPayload> {
        let wait = self.claim_slot();
        if !wait.is_zero() {
            debug!(id, wait_ms = wait.as_millis() as u64, "Waiting before request");
            tokio::time::sleep(wait).await;
        }

        self.fetch_once(id).await
    }

    fn name(&self) -> &str {
        "http"
    }
}

fn remaining_pause(last: Option<Instant>, now: Instant, delay: Duration) -> Duration {
    match last {
        Some(started) => delay.saturating_sub(now.saturating_duration_since(started)),
        None => Duration::ZERO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve exactly one HTTP response on an ephemeral port.
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let mut read = Vec::new();
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                read.extend_from_slice(&buf[..n]);
                if read.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        format!("http://{}/detail/{{id}}", addr)
    }

    fn fetcher_for(template: String) -> HttpFetcher {
        let config = HarvestConfig::new()
            .with_product_url(template)
            .with_request_timeout(Duration::from_secs(5));
        HttpFetcher::new(&config).unwrap()
    }

    #[test]
    fn test_url_for() {
        let fetcher = HttpFetcher::new(&HarvestConfig::new()).unwrap();
        assert_eq!(
            fetcher.url_for(42),
            "https://www.woolworths.com.au/apis/ui/product/detail/42"
        );
        assert_eq!(fetcher.name(), "http");
    }

    #[tokio::test]
    async fn test_fetch_parses_json() {
        let template = serve_once("200 OK", r#"{"Product":null}"#).await;
        let payload = fetcher_for(template).fetch(7).await.unwrap();

        assert_eq!(payload.id, 7);
        assert_eq!(payload.body, json!({ "Product": null }));
    }

    #[tokio::test]
    async fn test_fetch_invalid_body_is_parse_error() {
        let template = serve_once("200 OK", "<html>blocked</html>").await;
        let err = fetcher_for(template).fetch(8).await.unwrap_err();
        assert!(matches!(err, FetchError::Parse { id: 8, .. }));
    }

    #[tokio::test]
    async fn test_fetch_error_status_is_transport_error() {
        let template = serve_once("503 Service Unavailable", "{}").await;
        let err = fetcher_for(template).fetch(9).await.unwrap_err();
        assert!(matches!(err, FetchError::Transport { id: 9, .. }));
    }

    #[tokio::test]
    async fn test_fetch_unreachable_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = fetcher_for(format!("http://{}/detail/{{id}}", addr))
            .fetch(10)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Transport { id: 10, .. }));
    }

    #[test]
    fn test_remaining_pause() {
        let delay = Duration::from_millis(500);
        let start = Instant::now();

        assert_eq!(remaining_pause(None, start, delay), Duration::ZERO);
        assert_eq!(
            remaining_pause(Some(start), start + Duration::from_millis(200), delay),
            Duration::from_millis(300)
        );
        assert_eq!(
            remaining_pause(Some(start), start + Duration::from_secs(2), delay),
            Duration::ZERO
        );
    }

    #[tokio::test]
    async fn test_delay_spaces_requests_without_trailing_wait() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let config = HarvestConfig::new()
            .with_product_url(format!("http://{}/detail/{{id}}", addr))
            .with_request_timeout(Duration::from_secs(5))
            .with_request_delay(Duration::from_secs(30));
        let fetcher = HttpFetcher::new(&config).unwrap();

        // A single (final) request returns without sitting out the delay
        let first = tokio::time::timeout(Duration::from_secs(10), fetcher.fetch(1)).await;
        assert!(matches!(first, Ok(Err(FetchError::Transport { id: 1, .. }))));

        // The next request has to wait for its slot
        let second = tokio::time::timeout(Duration::from_millis(200), fetcher.fetch(2)).await;
        assert!(second.is_err());
    }
}
