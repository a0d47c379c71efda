//! Semantic search over the knowledge base
//!
//! Embeds the query, asks the vector store for the closest passages, and
//! returns them as one text block. Every failure mode ends in a fixed
//! user-facing string — an error escaping this tool would abort the
//! whole conversational turn.

use crate::embeddings::EmbeddingClient;
use crate::registry::{Tool, ToolResult};
use crate::vector::VectorSearchClient;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};

/// Returned when the query could not be embedded.
pub const EMBEDDING_APOLOGY: &str =
    "I'm sorry, I'm having trouble processing your question. Please try asking in a different way.";

/// Returned when the vector store could not be reached.
pub const SEARCH_APOLOGY: &str =
    "I apologize, but I'm having trouble accessing the knowledge base at the moment. Please try again later.";

/// Returned when the search comes back empty. Not an error.
pub const NO_INFORMATION: &str =
    "I don't have specific information about that. Is there something else I can help you with?";

pub struct KnowledgeSearchTool {
    embeddings: Arc<dyn EmbeddingClient>,
    search: Arc<dyn VectorSearchClient>,
    default_match_count: usize,
}

impl KnowledgeSearchTool {
    pub fn new(
        embeddings: Arc<dyn EmbeddingClient>,
        search: Arc<dyn VectorSearchClient>,
        default_match_count: usize,
    ) -> Self {
        Self {
            embeddings,
            search,
            default_match_count: default_match_count.max(1),
        }
    }

    /// Total search: never errors, always returns displayable text.
    pub async fn search(&self, query: &str, match_count: usize) -> String {
        let match_count = match_count.max(1);

        let embedding = match self.embeddings.embed(query).await {
            Ok(v) => v,
            Err(e) => {
                warn!("embedding failed: {}", e);
                return EMBEDDING_APOLOGY.to_string();
            }
        };
        if embedding.is_empty() {
            warn!("embedding service returned an empty vector");
            return EMBEDDING_APOLOGY.to_string();
        }

        let rows = match self.search.search(&embedding, match_count).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!("similarity search failed: {}", e);
                return SEARCH_APOLOGY.to_string();
            }
        };

        info!("found {} matching passages", rows.len());

        match rows.len() {
            0 => NO_INFORMATION.to_string(),
            1 => rows.into_iter().next().map(|r| r.text).unwrap_or_default(),
            _ => rows
                .into_iter()
                .map(|r| r.text)
                .collect::<Vec<_>>()
                .join("\n\n"),
        }
    }
}

#[async_trait::async_trait]
impl Tool for KnowledgeSearchTool {
    fn name(&self) -> &str {
        "knowledge_search"
    }

    fn description(&self) -> &str {
        "Search the knowledge base for information relevant to the user's question. \
         Useful for answering questions about products, services, locations, \
         policies, and other facts the assistant does not know directly."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The question to search the knowledge base for"
                },
                "match_count": {
                    "type": "integer",
                    "description": "Number of passages to retrieve",
                    "minimum": 1
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: Value) -> ToolResult {
        let query = match args.get("query").and_then(|q| q.as_str()) {
            Some(q) if !q.trim().is_empty() => q.to_string(),
            _ => return ToolResult::error("missing required parameter: query"),
        };
        let match_count = args
            .get("match_count")
            .and_then(|c| c.as_u64())
            .map(|c| c as usize)
            .unwrap_or(self.default_match_count);

        ToolResult::text(self.search(&query, match_count).await)
    }
}
