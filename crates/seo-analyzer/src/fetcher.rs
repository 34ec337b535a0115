use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::redirect::Policy;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{AnalyzerConfig, RelayConfig};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.3";
const MAX_REDIRECTS: usize = 10;

#[derive(Debug, Error)]
pub enum ContentFetchError {
    #[error("Failed to build HTTP client: {0}")]
    ClientError(String),
    #[error("Failed to fetch URL: {0}")]
    FetchError(String),
    #[error("Relay returned HTTP status {0}")]
    StatusError(u16),
    #[error("Relay returned {length} characters, expected at least {minimum}")]
    ContentTooShort { length: usize, minimum: usize },
    #[error("Failed to fetch URL content after {attempts} relay attempts: {last_error}")]
    Exhausted { attempts: usize, last_error: String },
}

#[derive(Debug, Clone)]
pub struct FetchedContent {
    pub content: String,
    /// Name of the relay that produced the content.
    pub relay: String,
}

/// Retrieves page content through an ordered list of relays.
///
/// Relays are tried one at a time in configuration order and never retried.
/// A response only counts when it is a 2xx with at least `min_content_chars`
/// characters, which filters out interstitial and error pages served with 200.
#[derive(Clone)]
pub struct ContentFetcher {
    client: Client,
    relays: Vec<RelayConfig>,
    min_content_chars: usize,
}

impl ContentFetcher {
    pub fn new(config: &AnalyzerConfig) -> Result<Self, ContentFetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .redirect(Policy::limited(MAX_REDIRECTS))
            .timeout(Duration::from_secs(config.relay_timeout_secs))
            .build()
            .map_err(|e| ContentFetchError::ClientError(e.to_string()))?;

        Ok(Self {
            client,
            relays: config.relays.clone(),
            min_content_chars: config.min_content_chars,
        })
    }

    pub async fn fetch(&self, url: &str) -> Result<FetchedContent, ContentFetchError> {
        let mut last_error: Option<ContentFetchError> = None;

        for relay in &self.relays {
            debug!("Fetching {} through relay {}", url, relay.name);
            match self.fetch_through(relay, url).await {
                Ok(content) => {
                    info!(
                        "Relay {} returned {} characters for {}",
                        relay.name,
                        content.chars().count(),
                        url
                    );
                    return Ok(FetchedContent {
                        content,
                        relay: relay.name.clone(),
                    });
                }
                Err(e) => {
                    warn!("Relay {} failed for {}: {}", relay.name, url, e);
                    last_error = Some(e);
                }
            }
        }

        Err(ContentFetchError::Exhausted {
            attempts: self.relays.len(),
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no relays configured".to_string()),
        })
    }

    async fn fetch_through(
        &self,
        relay: &RelayConfig,
        url: &str,
    ) -> Result<String, ContentFetchError> {
        let response = self
            .client
            .get(relay.build_url(url))
            .send()
            .await
            .map_err(|e| ContentFetchError::FetchError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ContentFetchError::StatusError(response.status().as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ContentFetchError::FetchError(e.to_string()))?;

        let length = body.chars().count();
        if length < self.min_content_chars {
            return Err(ContentFetchError::ContentTooShort {
                length,
                minimum: self.min_content_chars,
            });
        }

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_server::{html_page, start_test_server};

    fn config_with_relays(relays: Vec<RelayConfig>) -> AnalyzerConfig {
        AnalyzerConfig {
            relays,
            ..AnalyzerConfig::default()
        }
    }

    #[tokio::test]
    async fn test_fetch_falls_through_to_first_acceptable_relay() {
        let server = start_test_server(vec![
            ("/short", 200, "<html>blocked</html>".to_string()),
            ("/broken", 502, html_page(800)),
            ("/good", 200, html_page(800)),
            ("/unused", 200, html_page(800)),
        ])
        .await;

        let fetcher = ContentFetcher::new(&config_with_relays(vec![
            RelayConfig::new("short", server.url("/short?url={url}")),
            RelayConfig::new("broken", server.url("/broken?url={url}")),
            RelayConfig::new("good", server.url("/good?url={url}")),
            RelayConfig::new("unused", server.url("/unused?url={url}")),
        ]))
        .unwrap();

        let fetched = fetcher.fetch("https://example.com/page").await.unwrap();
        assert_eq!(fetched.relay, "good");
        assert!(fetched.content.contains("Cardiac Care Guide"));
        assert_eq!(server.paths(), vec!["/short", "/broken", "/good"]);
        assert_eq!(
            server.requests()[2].query.as_deref(),
            Some("url=https%3A%2F%2Fexample.com%2Fpage")
        );

        for request in server.requests() {
            assert_eq!(request.header("user-agent"), Some(USER_AGENT));
            assert!(request
                .header("accept")
                .is_some_and(|accept| accept.starts_with("text/html")));
            assert_eq!(request.header("accept-language"), Some("en-US,en;q=0.9"));
        }
    }

    #[tokio::test]
    async fn test_fetch_exhausted_reports_last_error() {
        let server = start_test_server(vec![
            ("/short", 200, "x".repeat(499)),
            ("/missing", 404, "not found".to_string()),
        ])
        .await;

        let fetcher = ContentFetcher::new(&config_with_relays(vec![
            RelayConfig::new("short", server.url("/short?url={url}")),
            RelayConfig::new("missing", server.url("/missing?url={url}")),
        ]))
        .unwrap();

        let err = fetcher.fetch("https://example.com/").await.unwrap_err();
        match err {
            ContentFetchError::Exhausted {
                attempts,
                last_error,
            } => {
                assert_eq!(attempts, 2);
                assert!(last_error.contains("404"), "last_error: {}", last_error);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        // each relay is attempted exactly once
        assert_eq!(server.paths(), vec!["/short", "/missing"]);
    }

    #[tokio::test]
    async fn test_fetch_accepts_exactly_minimum_length() {
        let server = start_test_server(vec![("/edge", 200, "y".repeat(500))]).await;
        let fetcher = ContentFetcher::new(&config_with_relays(vec![RelayConfig::new(
            "edge",
            server.url("/edge?url={url}"),
        )]))
        .unwrap();

        let fetched = fetcher.fetch("https://example.com/").await.unwrap();
        assert_eq!(fetched.content.len(), 500);
    }

    #[tokio::test]
    async fn test_fetch_without_relays() {
        let fetcher = ContentFetcher::new(&config_with_relays(vec![])).unwrap();
        let err = fetcher.fetch("https://example.com/").await.unwrap_err();
        assert!(err.to_string().contains("no relays configured"));
    }
}
