//! Bocha web search API client

use crate::cache::TtlCache;
use crate::error::{Result, StockError};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

/// Web search endpoint
pub const BOCHA_SEARCH_URL: &str = "https://api.bochaai.com/v1/web-search";

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// One web page returned by the search API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Page title
    pub name: String,
    /// Page URL
    pub url: String,
    /// Short excerpt
    #[serde(default)]
    pub snippet: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    data: SearchData,
}

#[derive(Debug, Deserialize)]
struct SearchData {
    #[serde(rename = "webPages", default)]
    web_pages: Option<WebPages>,
}

#[derive(Debug, Deserialize)]
struct WebPages {
    #[serde(default)]
    value: Vec<SearchHit>,
}

/// Extract the hits from a raw response body
pub fn parse_hits(body: &str) -> Result<Vec<SearchHit>> {
    let response: SearchResponse = serde_json::from_str(body)?;
    Ok(response
        .data
        .web_pages
        .map(|pages| pages.value)
        .unwrap_or_default())
}

/// Rate limited, caching client for the Bocha search API
///
/// Clones share the rate limiter and the cache.
#[derive(Clone)]
pub struct BochaClient {
    client: Client,
    api_key: Option<String>,
    endpoint: String,
    rate_limiter: SharedRateLimiter,
    cache: TtlCache<String, Vec<SearchHit>>,
}

impl BochaClient {
    /// Create a client
    ///
    /// # Arguments
    /// * `client` - HTTP client, already configured with any proxy
    /// * `api_key` - Bearer token; requests fail without one
    /// * `requests_per_minute` - Rate limit applied to the search API
    /// * `cache_ttl` - Lifetime of cached responses
    pub fn new(
        client: Client,
        api_key: Option<String>,
        requests_per_minute: u32,
        cache_ttl: Duration,
    ) -> Self {
        let quota = Quota::per_minute(NonZeroU32::new(requests_per_minute).unwrap_or(NonZeroU32::MIN));

        Self {
            client,
            api_key,
            endpoint: BOCHA_SEARCH_URL.to_string(),
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
            cache: TtlCache::new(cache_ttl),
        }
    }

    /// Send requests to another endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Whether an API key is configured
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Search the web; responses are cached per query
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| StockError::ConfigError("search API key is not configured".to_string()))?;

        self.cache
            .get_or_fetch(query.to_string(), || async {
                self.rate_limiter.until_ready().await;

                let response = self
                    .client
                    .post(&self.endpoint)
                    .bearer_auth(api_key)
                    .json(&json!({ "query": query }))
                    .send()
                    .await?;

                let status = response.status();
                let body = response.text().await?;
                if !status.is_success() {
                    return Err(StockError::SearchFailed {
                        status: status.as_u16(),
                        body,
                    });
                }

                let hits = parse_hits(&body)?;
                debug!(query, hits = hits.len(), "Search completed");
                Ok::<_, StockError>(hits)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hits() {
        let body = r#"{
            "code": 200,
            "data": {
                "webPages": {
                    "value": [
                        {"name": "贵州茅台 600519", "url": "https://example.com/a", "snippet": "白酒龙头"},
                        {"name": "Moutai", "url": "https://example.com/b"}
                    ]
                }
            }
        }"#;

        let hits = parse_hits(body).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].name, "贵州茅台 600519");
        assert_eq!(hits[1].snippet, "");
    }

    #[test]
    fn test_parse_hits_without_pages() {
        assert!(parse_hits(r#"{"data": {}}"#).unwrap().is_empty());
        assert!(parse_hits("not json").is_err());
    }

    #[tokio::test]
    async fn test_search_requires_api_key() {
        let client = BochaClient::new(Client::new(), None, 10, Duration::from_secs(60));
        assert!(!client.has_api_key());

        let err = client.search("茅台").await.unwrap_err();
        assert!(matches!(err, StockError::ConfigError(_)));
    }
}
