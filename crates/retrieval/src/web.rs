//! Web search adapter.
//!
//! Wraps the DuckDuckGo Instant Answer API behind a `SearchProvider`
//! trait. Web search is best-effort augmentation: the client enforces
//! its own timeout, and every failure mode (timeout, transport error,
//! malformed response) surfaces as `AppError::Search` for the fusion
//! engine to degrade to an empty result.

use grounded_core::{AppError, AppResult};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_API_URL: &str = "https://api.duckduckgo.com";

/// Trait for single-shot web search backends.
#[async_trait::async_trait]
pub trait SearchProvider: Send + Sync {
    /// Run one search and return a blob of result text, possibly empty.
    async fn search(&self, query: &str) -> AppResult<String>;
}

/// Instant Answer API response, reduced to the fields we render.
#[derive(Debug, Deserialize)]
struct InstantAnswer {
    #[serde(rename = "Answer", default)]
    answer: String,
    #[serde(rename = "AbstractText", default)]
    abstract_text: String,
    #[serde(rename = "Definition", default)]
    definition: String,
    #[serde(rename = "RelatedTopics", default)]
    related_topics: Vec<RelatedTopic>,
}

/// Related topics are either leaf results or nested topic groups.
#[derive(Debug, Deserialize)]
struct RelatedTopic {
    #[serde(rename = "Text", default)]
    text: String,
    #[serde(rename = "Topics", default)]
    topics: Vec<RelatedTopic>,
}

/// DuckDuckGo-backed search provider.
pub struct DuckDuckGoClient {
    client: Client,
    api_url: String,
}

impl DuckDuckGoClient {
    /// Create a client with the given per-request timeout.
    pub fn new(timeout: Duration) -> Self {
        let client = Client::builder().timeout(timeout).build().unwrap_or_default();
        Self {
            client,
            api_url: DEFAULT_API_URL.to_string(),
        }
    }

    /// Override the API endpoint.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    fn render(answer: InstantAnswer) -> String {
        let mut parts: Vec<String> = Vec::new();

        for field in [answer.answer, answer.abstract_text, answer.definition] {
            if !field.trim().is_empty() {
                parts.push(field.trim().to_string());
            }
        }

        collect_topic_texts(&answer.related_topics, &mut parts);

        parts.join("\n")
    }
}

fn collect_topic_texts(topics: &[RelatedTopic], out: &mut Vec<String>) {
    for topic in topics {
        if !topic.text.trim().is_empty() {
            out.push(topic.text.trim().to_string());
        }
        collect_topic_texts(&topic.topics, out);
    }
}

#[async_trait::async_trait]
impl SearchProvider for DuckDuckGoClient {
    async fn search(&self, query: &str) -> AppResult<String> {
        tracing::debug!("Performing web search for: {}", query);

        let response = self
            .client
            .get(&self.api_url)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::Search(format!("Search timed out: {}", e))
                } else {
                    AppError::Search(format!("Search request failed: {}", e))
                }
            })?;

        if !response.status().is_success() {
            return Err(AppError::Search(format!(
                "Search provider returned status {}",
                response.status()
            )));
        }

        let answer: InstantAnswer = response
            .json()
            .await
            .map_err(|e| AppError::Search(format!("Malformed search response: {}", e)))?;

        Ok(Self::render(answer))
    }
}
