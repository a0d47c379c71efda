//! Retrieval error types

use thiserror::Error;

/// Errors from the embedding and vector-search clients. These never
/// propagate past the retrieval tool — it converts every failure into a
/// fixed user-facing string.
#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("embedding request failed: {0}")]
    Embedding(String),

    #[error("search request failed: {0}")]
    Search(String),

    #[error("upsert failed: {0}")]
    Upsert(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}
