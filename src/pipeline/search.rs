//! Web snippet fetching: query a search engine and flatten the top hits.
//!
//! Only the title and snippet of each result are used; result pages are never
//! fetched. The fetcher fails soft: whatever goes wrong, [`search_web`]
//! returns a bounded string, and an error simply reads as
//! `"Web search error: …"` inside the LLM context.

use crate::config::QaConfig;
use crate::error::PdfQaError;
use crate::pipeline::context::{truncate_chars, WEB_CONTEXT_CHARS};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Default number of results folded into the web context.
pub const DEFAULT_MAX_RESULTS: usize = 3;

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0 Safari/537.36";

/// One search hit. Only `title` and `body` reach the prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSnippet {
    pub title: String,
    pub body: String,
    pub href: String,
}

/// Why a search produced no usable snippets.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search provider returned HTTP {status}")]
    Http { status: u16 },

    #[error("{0}")]
    Transport(String),

    #[error("no results found")]
    NoResults,
}

/// A general-purpose text search engine.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Return up to `max_results` hits for `query`, best first.
    async fn text(&self, query: &str, max_results: usize) -> Result<Vec<SearchSnippet>, SearchError>;
}

/// Search the web and return the flattened snippet blob.
///
/// Each hit contributes `"\n\n{title}\n{body}"`; the result is cut to
/// [`WEB_CONTEXT_CHARS`] characters. Never fails: errors and empty result
/// sets come back as `"Web search error: …"`.
pub async fn search_web(provider: &dyn SearchProvider, query: &str, max_results: usize) -> String {
    let outcome = match provider.text(query, max_results).await {
        Ok(hits) if hits.is_empty() => Err(SearchError::NoResults),
        other => other,
    };

    match outcome {
        Ok(hits) => {
            info!("Web search returned {} results", hits.len());
            flatten_snippets(&hits)
        }
        Err(e) => {
            warn!("Web search failed for {:?}: {}", query, e);
            truncate_chars(&format!("Web search error: {}", e), WEB_CONTEXT_CHARS).to_string()
        }
    }
}

/// Concatenate title and body of each hit, bounded to [`WEB_CONTEXT_CHARS`].
pub fn flatten_snippets(hits: &[SearchSnippet]) -> String {
    let mut blob = String::new();
    for hit in hits {
        blob.push_str("\n\n");
        blob.push_str(&hit.title);
        blob.push('\n');
        blob.push_str(&hit.body);
    }
    truncate_chars(&blob, WEB_CONTEXT_CHARS).to_string()
}

// ── DuckDuckGo ───────────────────────────────────────────────────────────

static RESULT: Lazy<Selector> = Lazy::new(|| Selector::parse("div.result").unwrap());
static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("a.result__a").unwrap());
static SNIPPET: Lazy<Selector> = Lazy::new(|| Selector::parse(".result__snippet").unwrap());

/// [`SearchProvider`] backed by DuckDuckGo's HTML results page.
#[derive(Debug, Clone)]
pub struct DuckDuckGoSearch {
    endpoint: String,
    client: reqwest::Client,
}

impl DuckDuckGoSearch {
    /// Build a client for `endpoint` with a per-request `timeout`.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, PdfQaError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| PdfQaError::Internal(format!("HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }

    /// Build from the search fields of a [`QaConfig`].
    pub fn from_config(config: &QaConfig) -> Result<Self, PdfQaError> {
        Self::new(
            config.search_endpoint.clone(),
            Duration::from_secs(config.search_timeout_secs),
        )
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoSearch {
    async fn text(&self, query: &str, max_results: usize) -> Result<Vec<SearchSnippet>, SearchError> {
        debug!("Searching {:?} via {}", query, self.endpoint);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query)])
            .header(reqwest::header::ACCEPT, "text/html,application/xhtml+xml")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SearchError::Transport(format!("request timed out: {}", e))
                } else {
                    SearchError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Http {
                status: status.as_u16(),
            });
        }

        let html = response
            .text()
            .await
            .map_err(|e| SearchError::Transport(e.to_string()))?;

        Ok(parse_results(&html, max_results))
    }
}

/// Pull organic results out of a DuckDuckGo HTML page, skipping ads.
pub fn parse_results(html: &str, max_results: usize) -> Vec<SearchSnippet> {
    let doc = Html::parse_document(html);

    doc.select(&RESULT)
        .filter(|el| !el.value().classes().any(|c| c == "result--ad"))
        .filter_map(|el| {
            let title_el = el.select(&TITLE).next()?;
            let title = collapse_whitespace(title_el);
            if title.is_empty() {
                return None;
            }
            let body = el
                .select(&SNIPPET)
                .next()
                .map(collapse_whitespace)
                .unwrap_or_default();
            let href = title_el.value().attr("href").unwrap_or_default().to_string();
            Some(SearchSnippet { title, body, href })
        })
        .take(max_results)
        .collect()
}

fn collapse_whitespace(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
