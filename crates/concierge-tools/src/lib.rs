//! Concierge Tools — retrieval capabilities exposed to the agent
//!
//! Each tool is a self-contained module implementing the Tool trait.
//! The default registry carries the knowledge-base search tool backed by
//! the embedding and vector-search clients.

pub mod embeddings;
pub mod error;
pub mod registry;
pub mod tools;
pub mod vector;

pub use embeddings::{EmbeddingClient, OpenAiEmbeddings};
pub use error::RetrievalError;
pub use registry::{Tool, ToolRegistry, ToolResult};
pub use tools::knowledge_search::KnowledgeSearchTool;
pub use vector::{Document, MatchRow, SupabaseSearch, VectorSearchClient};

use std::sync::Arc;

/// Create the default tool registry with the knowledge-search tool.
pub fn create_default_registry(
    embeddings: Arc<dyn EmbeddingClient>,
    search: Arc<dyn VectorSearchClient>,
    match_count: usize,
) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(KnowledgeSearchTool::new(embeddings, search, match_count));
    registry
}
