//! Knowledge-base ingestion: embed documents and upsert them
//!
//! Input is a JSON array of `{"text": "..."}` objects, typically
//! pre-extracted FAQ passages. Documents that fail to embed are skipped
//! with a warning rather than aborting the run.

use concierge_core::{Config, Error, Result};
use concierge_tools::{Document, EmbeddingClient, OpenAiEmbeddings, SupabaseSearch, VectorSearchClient};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

const INGEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct IngestDocument {
    text: String,
}

pub async fn run_ingest(config: &Config, file: &Path, table: Option<String>) -> Result<usize> {
    let api_key = config
        .openai_api_key
        .as_deref()
        .ok_or_else(|| Error::config("OPENAI_API_KEY not set"))?;
    let supabase_url = config
        .supabase_url
        .as_deref()
        .ok_or_else(|| Error::config("SUPABASE_URL not set"))?;
    let supabase_key = config
        .supabase_key
        .as_deref()
        .ok_or_else(|| Error::config("SUPABASE_KEY not set"))?;

    let raw = std::fs::read_to_string(file)?;
    let documents: Vec<IngestDocument> = serde_json::from_str(&raw)?;
    info!("loaded {} documents from {}", documents.len(), file.display());

    let embeddings = OpenAiEmbeddings::new(api_key, config.embedding_model.clone())
        .with_base_url(config.openai_base_url.clone())
        .with_timeout(INGEST_TIMEOUT);
    let store = SupabaseSearch::new(supabase_url, supabase_key, config.search_function.clone())
        .with_timeout(INGEST_TIMEOUT);

    let mut enriched = Vec::with_capacity(documents.len());
    for (index, doc) in documents.into_iter().enumerate() {
        if doc.text.trim().is_empty() {
            warn!("skipping empty document {}", index);
            continue;
        }
        match embeddings.embed(&doc.text).await {
            Ok(embedding) if !embedding.is_empty() => {
                enriched.push(Document {
                    text: doc.text,
                    embedding,
                });
            }
            Ok(_) => warn!("skipping document {}: empty embedding", index),
            Err(e) => warn!("skipping document {}: {}", index, e),
        }
    }

    if enriched.is_empty() {
        return Err(Error::Retrieval("no documents could be embedded".into()));
    }

    let table = table.unwrap_or_else(|| config.vector_table.clone());
    let stored = store
        .upsert(&table, &enriched)
        .await
        .map_err(|e| Error::Retrieval(e.to_string()))?;

    info!("stored {} documents in {}", stored, table);
    Ok(stored)
}
