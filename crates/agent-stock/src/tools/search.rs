//! Web search tool with page text extraction

use agent_core::Result as AgentResult;
use agent_llm::tools::schema;
use agent_tools::{Tool, parse_params};
use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::api::{BochaClient, SearchHit};
use crate::error::Result;

static SCRIPT_OR_STYLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>|<!--.*?-->")
        .expect("invalid script regex")
});

static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("invalid tag regex"));

static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").expect("invalid entity regex")
});

fn decode_entity(entity: &str) -> Option<String> {
    let decoded = match entity {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        _ => {
            let code = if let Some(hex) = entity.strip_prefix("#x").or(entity.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                entity.strip_prefix('#')?.parse().ok()?
            };
            char::from_u32(code)?
        }
    };
    Some(decoded.to_string())
}

/// Reduce an HTML document to its visible text
///
/// Script, style and comment blocks are dropped, tags become spaces,
/// entities are decoded and runs of whitespace collapse to one space.
pub fn html_to_text(html: &str) -> String {
    let without_code = SCRIPT_OR_STYLE.replace_all(html, " ");
    let without_tags = TAG.replace_all(&without_code, " ");
    let decoded = ENTITY.replace_all(&without_tags, |caps: &regex::Captures<'_>| {
        decode_entity(&caps[1]).unwrap_or_else(|| caps[0].to_string())
    });
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keep whole words while the text stays within `max_chars`
///
/// Each kept word costs its length plus one separator, counted in
/// characters.
pub fn truncate_words(text: &str, max_chars: usize) -> String {
    let mut kept = Vec::new();
    let mut used = 0;
    for word in text.split_whitespace() {
        let cost = word.chars().count() + 1;
        if used + cost > max_chars {
            break;
        }
        used += cost;
        kept.push(word);
    }
    kept.join(" ")
}

/// One enriched search result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub link: String,
    pub snippet: String,
    pub body: String,
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    query: String,
    #[serde(default = "default_num_results")]
    num_results: usize,
    #[serde(default = "default_max_chars")]
    max_chars: usize,
}

fn default_num_results() -> usize {
    2
}

fn default_max_chars() -> usize {
    500
}

/// Tool searching the web and reading the top pages
pub struct WebSearchTool {
    search: BochaClient,
    pages: reqwest::Client,
    fetch_delay: Duration,
}

impl WebSearchTool {
    /// Create the tool
    ///
    /// `pages` fetches result pages and should carry the page timeout.
    pub fn new(search: BochaClient, pages: reqwest::Client, fetch_delay: Duration) -> Self {
        Self {
            search,
            pages,
            fetch_delay,
        }
    }

    /// Visible text of a page, or an empty string if it cannot be read
    async fn page_text(&self, link: &str, max_chars: usize) -> String {
        let url = match url::Url::parse(link) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => url,
            _ => {
                warn!(link, "Skipping result with unsupported URL");
                return String::new();
            }
        };

        let html = match self.pages.get(url).send().await {
            Ok(response) => match response.text().await {
                Ok(html) => html,
                Err(e) => {
                    warn!(link, error = %e, "Failed to read page");
                    return String::new();
                }
            },
            Err(e) => {
                warn!(link, error = %e, "Failed to fetch page");
                return String::new();
            }
        };

        truncate_words(&html_to_text(&html), max_chars)
    }

    async fn run(&self, params: SearchParams) -> Result<Vec<SearchResult>> {
        let hits: Vec<SearchHit> = self
            .search
            .search(&params.query)
            .await?
            .into_iter()
            .take(params.num_results)
            .collect();

        let mut results = Vec::with_capacity(hits.len());
        for (i, hit) in hits.into_iter().enumerate() {
            if i > 0 && !self.fetch_delay.is_zero() {
                tokio::time::sleep(self.fetch_delay).await;
            }
            let body = self.page_text(&hit.url, params.max_chars).await;
            debug!(link = %hit.url, body_chars = body.chars().count(), "Fetched result page");
            results.push(SearchResult {
                title: hit.name,
                link: hit.url,
                snippet: hit.snippet,
                body,
            });
        }

        info!(query = %params.query, results = results.len(), "Web search finished");
        Ok(results)
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let params: SearchParams = parse_params(self.name(), params)?;
        let results = self.run(params).await?;
        Ok(json!(results))
    }

    fn name(&self) -> &'static str {
        "web_search"
    }

    fn description(&self) -> &'static str {
        "Search the web for information. Returns results with title, link, snippet and the \
         beginning of each page's text."
    }

    fn input_schema(&self) -> Value {
        schema::object(
            json!({
                "query": schema::string("Search query"),
                "num_results": schema::integer_with_default("Number of results to return", 2),
                "max_chars": schema::integer_with_default("Characters of page text kept per result", 500),
            }),
            vec!["query"],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool() -> WebSearchTool {
        WebSearchTool::new(
            BochaClient::new(reqwest::Client::new(), None, 10, Duration::from_secs(60)),
            reqwest::Client::new(),
            Duration::ZERO,
        )
    }

    #[test]
    fn test_html_to_text() {
        let html = r#"<html><head><style>body { color: red; }</style>
            <script>var x = "<p>hidden</p>";</script></head>
            <body><h1>Kweichow&nbsp;Moutai</h1><!-- nav -->
            <p>Price &amp; volume &lt;today&gt; &#36;10 &#x4E2D;</p></body></html>"#;

        assert_eq!(
            html_to_text(html),
            "Kweichow Moutai Price & volume <today> $10 中"
        );
    }

    #[test]
    fn test_unknown_entity_is_kept() {
        assert_eq!(html_to_text("a &bogus; b"), "a &bogus; b");
    }

    #[test]
    fn test_truncate_words() {
        let text = "alpha beta gamma delta";
        // " alpha" = 6, " beta" = 5, " gamma" = 6
        assert_eq!(truncate_words(text, 11), "alpha beta");
        assert_eq!(truncate_words(text, 16), "alpha beta");
        assert_eq!(truncate_words(text, 17), "alpha beta gamma");
        assert_eq!(truncate_words(text, 3), "");
        assert_eq!(truncate_words("", 500), "");
    }

    #[test]
    fn test_truncate_counts_characters() {
        // each word is 2 chars, costing 3
        assert_eq!(truncate_words("茅台 腾讯 阿里", 6), "茅台 腾讯");
    }

    #[test]
    fn test_tool_metadata() {
        let tool = tool();
        assert_eq!(tool.name(), "web_search");
        let schema = tool.input_schema();
        assert_eq!(schema["required"][0], "query");
        assert_eq!(schema["properties"]["num_results"]["default"], 2);
    }

    #[tokio::test]
    async fn test_unsupported_link_yields_empty_body() {
        assert_eq!(tool().page_text("ftp://example.com/file", 500).await, "");
        assert_eq!(tool().page_text("not a url", 500).await, "");
    }

    #[tokio::test]
    async fn test_missing_key_is_a_tool_error() {
        let err = tool().execute(json!({"query": "茅台"})).await.unwrap_err();
        assert!(err.to_string().contains("search API key"));
    }

    #[tokio::test]
    async fn test_missing_query_is_rejected() {
        assert!(tool().execute(json!({"num_results": 3})).await.is_err());
    }

    #[tokio::test]
    #[ignore] // Requires network access and Search_API_KEY
    async fn test_live_search() {
        let key = std::env::var("Search_API_KEY").unwrap();
        let tool = WebSearchTool::new(
            BochaClient::new(reqwest::Client::new(), Some(key), 10, Duration::from_secs(60)),
            reqwest::Client::new(),
            Duration::from_secs(1),
        );
        let results = tool.execute(json!({"query": "贵州茅台 股票代码"})).await.unwrap();
        assert!(results.as_array().unwrap().len() <= 2);
    }
}
