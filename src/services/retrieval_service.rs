use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{config::Config, errors::AppResult};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RetrievedChunk {
    pub content: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
}

/// Similarity search over the indexed study material.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentRetriever: Send + Sync {
    async fn retrieve(&self, query: &str, k: usize) -> AppResult<Vec<RetrievedChunk>>;
}

#[derive(Debug, Serialize)]
struct RetrievalRequest<'a> {
    query: &'a str,
    k: usize,
}

#[derive(Debug, Deserialize)]
struct RetrievalResponse {
    #[serde(default)]
    chunks: Vec<RetrievedChunk>,
}

/// Client for the retrieval service that fronts the vector store.
pub struct HttpRetriever {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRetriever {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.retriever_url.trim_end_matches('/').to_string(),
        }
    }

    fn query_url(&self) -> String {
        format!("{}/query", self.base_url)
    }
}

#[async_trait]
impl ContentRetriever for HttpRetriever {
    async fn retrieve(&self, query: &str, k: usize) -> AppResult<Vec<RetrievedChunk>> {
        log::info!("Retrieving relevant content for '{}' (k = {})", query, k);

        let response = self
            .client
            .post(self.query_url())
            .json(&RetrievalRequest { query, k })
            .send()
            .await?
            .error_for_status()?
            .json::<RetrievalResponse>()
            .await?;

        log::info!("Retrieved {} relevant chunks", response.chunks.len());
        Ok(response.chunks)
    }
}

/// Serves fixed text instead of querying the vector store.
pub struct StaticRetriever {
    chunks: Vec<RetrievedChunk>,
}

impl StaticRetriever {
    pub fn from_text(content: String, source: Option<String>) -> Self {
        Self {
            chunks: vec![RetrievedChunk {
                content,
                source,
                page: None,
            }],
        }
    }
}

#[async_trait]
impl ContentRetriever for StaticRetriever {
    async fn retrieve(&self, _query: &str, _k: usize) -> AppResult<Vec<RetrievedChunk>> {
        Ok(self
            .chunks
            .iter()
            .filter(|c| !c.content.trim().is_empty())
            .cloned()
            .collect())
    }
}

pub fn combine_chunks(chunks: &[RetrievedChunk]) -> String {
    chunks
        .iter()
        .map(|c| c.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Cuts `content` to `max_chars` characters, marking the cut with `...`.
pub fn truncate_content(content: &str, max_chars: usize) -> (String, bool) {
    match content.char_indices().nth(max_chars) {
        Some((byte_index, _)) => (format!("{}...", &content[..byte_index]), true),
        None => (content.to_string(), false),
    }
}
