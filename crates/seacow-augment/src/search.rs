//! Web search fallback (Brave Search API).
//!
//! Any transport or HTTP failure is logged and returned as an empty result
//! set; callers treat that exactly like "nothing found".

use std::time::Instant;

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use seacow_core::{env_nonempty, Error, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::preprocess::PreparedQuery;
use crate::sources::ALL_SOURCES;
use crate::statistics::{EMPLOYMENT_TERMS, GDP_TERMS, INCOME_TERMS, POPULATION_TERMS};

pub const DEFAULT_RESULT_COUNT: usize = 10;
pub const PRIORITY_RESULT_COUNT: usize = 5;
/// Fewer priority hits than this triggers the secondary domain.
const PRIORITY_MIN_RESULTS: usize = 2;

/// Tried in order for economic questions against the `all` source.
pub const PRIORITY_DOMAINS: [&str; 2] = ["census.gov", "bls.gov"];

/// Economic words beyond the statistics intent keywords.
const EXTRA_ECONOMIC_TERMS: &[&str] = &["economy", "economic", "poverty", "housing", "median"];

/// Statistics intent keywords plus [`EXTRA_ECONOMIC_TERMS`].
fn economic_terms() -> impl Iterator<Item = &'static str> {
    [
        INCOME_TERMS,
        EMPLOYMENT_TERMS,
        GDP_TERMS,
        POPULATION_TERMS,
        EXTRA_ECONOMIC_TERMS,
    ]
    .into_iter()
    .flatten()
    .copied()
}

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());

/// A single search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub description: String,
}

/// Search endpoint and credential.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub endpoint: String,
    /// Without a key every search returns empty.
    pub api_key: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.search.brave.com/res/v1/web/search".into(),
            api_key: None,
        }
    }
}

impl SearchConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            endpoint: env_nonempty("BRAVE_SEARCH_ENDPOINT").unwrap_or(defaults.endpoint),
            api_key: env_nonempty("BRAVE_SEARCH_API_KEY"),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[derive(Debug, Deserialize)]
struct BraveWebSearchResponse {
    web: Option<BraveWeb>,
}

#[derive(Debug, Deserialize)]
struct BraveWeb {
    results: Option<Vec<BraveResult>>,
}

#[derive(Debug, Deserialize)]
struct BraveResult {
    url: String,
    title: Option<String>,
    description: Option<String>,
}

/// Whether a query is about the economy.
pub fn is_economic(query: &str) -> bool {
    let lower = query.to_lowercase();
    economic_terms().any(|t| lower.contains(t))
}

fn strip_tags(text: &str) -> String {
    TAG_RE.replace_all(text, "").trim().to_string()
}

/// Keyword search client.
pub struct WebSearcher {
    client: Client,
    config: SearchConfig,
}

impl WebSearcher {
    /// `client` should carry a short timeout.
    pub fn new(client: Client, config: SearchConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Search for a preprocessed query.
    ///
    /// Economic questions against the `all` source go to the priority
    /// domains first; the site-filtered query is used otherwise, or when
    /// neither priority domain has anything.
    pub async fn search(&self, query: &PreparedQuery, source: Option<&str>) -> Vec<SearchResult> {
        if !self.config.is_configured() {
            debug!("Web search disabled: no API key");
            return Vec::new();
        }

        let is_all = source.is_some_and(|s| s.trim().eq_ignore_ascii_case(ALL_SOURCES));
        if is_all && is_economic(&query.base) {
            let [primary, secondary] = PRIORITY_DOMAINS;

            let first = self
                .query(&format!("site:{} {}", primary, query.base), PRIORITY_RESULT_COUNT)
                .await;
            if first.len() >= PRIORITY_MIN_RESULTS {
                return first;
            }

            info!(
                "Only {} result(s) from {}, trying {}",
                first.len(),
                primary,
                secondary
            );
            let second = self
                .query(&format!("site:{} {}", secondary, query.base), PRIORITY_RESULT_COUNT)
                .await;
            if !second.is_empty() {
                return second;
            }
            if !first.is_empty() {
                return first;
            }
        }

        self.query(&query.filtered, DEFAULT_RESULT_COUNT).await
    }

    /// One search call; failures become an empty list.
    pub async fn query(&self, q: &str, count: usize) -> Vec<SearchResult> {
        match self.try_query(q, count).await {
            Ok(results) => results,
            Err(e) => {
                warn!("Web search failed for query {:?}: {}", q, e);
                Vec::new()
            }
        }
    }

    async fn try_query(&self, q: &str, count: usize) -> Result<Vec<SearchResult>> {
        let Some(api_key) = &self.config.api_key else {
            return Err(Error::Config("BRAVE_SEARCH_API_KEY not set".into()));
        };

        let t0 = Instant::now();
        let count_param = count.to_string();
        let response = self
            .client
            .get(&self.config.endpoint)
            .header("Accept", "application/json")
            .header("X-Subscription-Token", api_key)
            .query(&[("q", q), ("count", count_param.as_str())])
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("{}: {}", self.config.endpoint, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Upstream(format!(
                "{} returned HTTP {}",
                self.config.endpoint, status
            )));
        }

        let parsed: BraveWebSearchResponse = response
            .json()
            .await
            .map_err(|e| Error::Upstream(format!("malformed search response: {}", e)))?;

        let results: Vec<SearchResult> = parsed
            .web
            .and_then(|w| w.results)
            .unwrap_or_default()
            .into_iter()
            .take(count)
            .map(|r| SearchResult {
                title: r.title.map(|t| strip_tags(&t)).unwrap_or_default(),
                url: r.url,
                description: r.description.map(|d| strip_tags(&d)).unwrap_or_default(),
            })
            .collect();

        debug!(
            "Search {:?} returned {} result(s) in {}ms",
            q,
            results.len(),
            t0.elapsed().as_millis()
        );
        Ok(results)
    }
}
