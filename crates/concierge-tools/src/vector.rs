//! Vector search client for a Supabase-style REST interface
//!
//! Similarity search goes through an RPC function taking a query
//! embedding and a match count; ingestion upserts rows into a table.

use crate::error::RetrievalError;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

/// One row returned by the similarity search, in backend relevance order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MatchRow {
    pub text: String,
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub similarity: Option<f64>,
}

impl MatchRow {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            id: None,
            similarity: None,
        }
    }
}

/// A document with its embedding, ready for upsert.
#[derive(Clone, Debug, Serialize)]
pub struct Document {
    pub text: String,
    pub embedding: Vec<f32>,
}

/// Similarity search against the external vector store. An empty result
/// list is a valid response meaning "no relevant passage found."
#[async_trait::async_trait]
pub trait VectorSearchClient: Send + Sync {
    async fn search(
        &self,
        embedding: &[f32],
        match_count: usize,
    ) -> Result<Vec<MatchRow>, RetrievalError>;

    async fn upsert(&self, table: &str, documents: &[Document]) -> Result<usize, RetrievalError>;
}

pub struct SupabaseSearch {
    client: Client,
    base_url: String,
    api_key: String,
    function: String,
}

impl SupabaseSearch {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        function: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            function: function.into(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        self
    }
}

#[async_trait::async_trait]
impl VectorSearchClient for SupabaseSearch {
    async fn search(
        &self,
        embedding: &[f32],
        match_count: usize,
    ) -> Result<Vec<MatchRow>, RetrievalError> {
        debug!(
            "calling {} with match_count={}",
            self.function, match_count
        );

        let body = SearchRequest {
            query_embedding: embedding,
            match_count,
        };

        let response = self
            .client
            .post(format!("{}/rest/v1/rpc/{}", self.base_url, self.function))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("search error {}: {}", status, error_text);
            return Err(RetrievalError::Search(format!("{}: {}", status, error_text)));
        }

        response
            .json()
            .await
            .map_err(|e| RetrievalError::Search(e.to_string()))
    }

    async fn upsert(&self, table: &str, documents: &[Document]) -> Result<usize, RetrievalError> {
        debug!("upserting {} documents into {}", documents.len(), table);

        let response = self
            .client
            .post(format!("{}/rest/v1/{}", self.base_url, table))
            .header("apikey", &self.api_key)
            .header("Prefer", "resolution=merge-duplicates")
            .bearer_auth(&self.api_key)
            .json(documents)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("upsert error {}: {}", status, error_text);
            return Err(RetrievalError::Upsert(format!("{}: {}", status, error_text)));
        }

        Ok(documents.len())
    }
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    query_embedding: &'a [f32],
    match_count: usize,
}
