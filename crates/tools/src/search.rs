//! Web search with jittered retry.
//!
//! [`WebSearch`] never fails: once the backend has exhausted its attempts it
//! answers with `Search failed: <cause>` so the calling agent can read the
//! failure and carry on.

use dcore::{RetryPolicy, Tool, ToolError, ToolOutput};
use reqwest::Client;
use schemars::JsonSchema;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use thiserror::Error;
use url::Url;

/// DuckDuckGo's JavaScript-free results page.
const DUCKDUCKGO_ENDPOINT: &str = "https://html.duckduckgo.com/html/";

/// Results returned when nothing else is configured.
pub const DEFAULT_MAX_RESULTS: usize = 5;

/// One search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub href: String,
    pub body: String,
}

/// Errors from a search backend.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("search provider returned status {0}")]
    Status(u16),

    #[error("rate limited by search provider")]
    RateLimited,

    #[error("failed to parse results: {0}")]
    Parse(String),
}

/// A web search backend.
pub trait Search: Send + Sync + 'static {
    /// Return at most `max_results` hits for `query`.
    fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> impl Future<Output = Result<Vec<SearchHit>, SearchError>> + Send;
}

/// Scrapes DuckDuckGo's HTML endpoint. No API key required.
#[derive(Clone)]
pub struct DuckDuckGo {
    client: Client,
    endpoint: String,
}

impl DuckDuckGo {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            endpoint: DUCKDUCKGO_ENDPOINT.to_owned(),
        }
    }

    /// Point at a different results page, e.g. a local mirror.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

impl Search for DuckDuckGo {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, SearchError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query)])
            .send()
            .await?;

        let status = response.status().as_u16();
        if status == 202 || status == 429 {
            return Err(SearchError::RateLimited);
        }
        if !(200..300).contains(&status) {
            return Err(SearchError::Status(status));
        }

        let body = response.text().await?;
        parse_results(&body, max_results)
    }
}

/// Extract hits from a DuckDuckGo HTML results page.
pub fn parse_results(html: &str, max_results: usize) -> Result<Vec<SearchHit>, SearchError> {
    let result = selector("div.result")?;
    let link = selector("a.result__a")?;
    let snippet = selector(".result__snippet")?;

    let document = Html::parse_document(html);
    let mut hits = Vec::new();
    for node in document.select(&result) {
        if hits.len() >= max_results {
            break;
        }
        let Some(anchor) = node.select(&link).next() else {
            continue;
        };
        let Some(href) = anchor.value().attr("href").and_then(resolve_href) else {
            continue;
        };
        let title = squash(anchor.text());
        let body = node
            .select(&snippet)
            .next()
            .map(|s| squash(s.text()))
            .unwrap_or_default();
        hits.push(SearchHit { title, href, body });
    }

    if hits.is_empty() && html.contains("anomaly") {
        return Err(SearchError::RateLimited);
    }
    Ok(hits)
}

fn selector(css: &str) -> Result<Selector, SearchError> {
    Selector::parse(css).map_err(|e| SearchError::Parse(e.to_string()))
}

/// Unwrap DuckDuckGo's `/l/?uddg=<target>` redirect links.
fn resolve_href(href: &str) -> Option<String> {
    let base = Url::parse("https://duckduckgo.com/").ok()?;
    let url = base.join(href).ok()?;
    if url.path().starts_with("/l/")
        && let Some((_, target)) = url.query_pairs().find(|(k, _)| k == "uddg")
    {
        return Some(target.into_owned());
    }
    Some(url.into())
}

fn squash<'a>(text: impl Iterator<Item = &'a str>) -> String {
    text.collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Arguments of the `web_search` tool.
#[derive(Deserialize, JsonSchema)]
struct SearchArgs {
    /// The search query.
    query: String,
}

/// The `web_search` tool: a backend plus retry and a result cap.
pub struct WebSearch<S> {
    backend: S,
    max_results: usize,
    retry: RetryPolicy,
}

impl<S: Search> WebSearch<S> {
    /// Wrap a backend with the default jittered retry policy.
    pub fn new(backend: S) -> Self {
        Self {
            backend,
            max_results: DEFAULT_MAX_RESULTS,
            retry: RetryPolicy::default().with_jitter(),
        }
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Tool definition for the model's catalog.
    pub fn tool() -> Tool {
        Tool {
            name: "web_search".into(),
            description: "Search the web and return the top results with title, link and snippet."
                .into(),
            parameters: schemars::schema_for!(SearchArgs),
            strict: false,
        }
    }

    /// Search, retrying on any backend error.
    pub async fn search(&self, query: &str) -> String {
        let outcome = self
            .retry
            .run(
                "web_search",
                |_| self.backend.search(query, self.max_results),
                |_: &SearchError| true,
            )
            .await;

        match outcome {
            Ok(hits) => render(query, &hits),
            Err(e) => format!("Search failed: {}", e.into_inner()),
        }
    }

    /// Tool entry point over raw JSON arguments.
    pub async fn call(&self, arguments: &str) -> ToolOutput {
        let args: SearchArgs =
            serde_json::from_str(arguments).map_err(ToolError::invalid_arguments)?;
        if args.query.trim().is_empty() {
            return Err(ToolError::invalid_arguments("query is empty"));
        }
        Ok(self.search(&args.query).await)
    }
}

fn render(query: &str, hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return format!("No results found for: {query}");
    }
    let mut out = String::new();
    for (i, hit) in hits.iter().enumerate() {
        let _ = writeln!(out, "{}. {}\n   {}\n   {}", i + 1, hit.title, hit.href, hit.body);
    }
    out
}
