//! Tests for concierge-tools: ToolResult, ToolRegistry, and the knowledge-search tool
//! against fake embedding and vector-search backends

use concierge_tools::tools::knowledge_search::{
    EMBEDDING_APOLOGY, NO_INFORMATION, SEARCH_APOLOGY,
};
use concierge_tools::*;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ===========================================================================
// Fakes
// ===========================================================================

struct FakeEmbeddings {
    vector: Vec<f32>,
    fail: bool,
    calls: AtomicUsize,
}

impl FakeEmbeddings {
    fn returning(vector: Vec<f32>) -> Arc<Self> {
        Arc::new(Self {
            vector,
            fail: false,
            calls: AtomicUsize::new(0),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            vector: Vec::new(),
            fail: true,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait::async_trait]
impl EmbeddingClient for FakeEmbeddings {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, RetrievalError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(RetrievalError::Embedding("connection refused".into()));
        }
        Ok(self.vector.clone())
    }
}

struct FakeSearch {
    rows: Vec<MatchRow>,
    fail: bool,
    calls: AtomicUsize,
    last_match_count: Mutex<Option<usize>>,
}

impl FakeSearch {
    fn returning(rows: Vec<MatchRow>) -> Arc<Self> {
        Arc::new(Self {
            rows,
            fail: false,
            calls: AtomicUsize::new(0),
            last_match_count: Mutex::new(None),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            rows: Vec::new(),
            fail: true,
            calls: AtomicUsize::new(0),
            last_match_count: Mutex::new(None),
        })
    }
}

#[async_trait::async_trait]
impl VectorSearchClient for FakeSearch {
    async fn search(
        &self,
        _embedding: &[f32],
        match_count: usize,
    ) -> Result<Vec<MatchRow>, RetrievalError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_match_count.lock().unwrap() = Some(match_count);
        if self.fail {
            return Err(RetrievalError::Search("503: unavailable".into()));
        }
        Ok(self.rows.clone())
    }

    async fn upsert(&self, _table: &str, documents: &[Document]) -> Result<usize, RetrievalError> {
        Ok(documents.len())
    }
}

fn tool_with(embeddings: Arc<FakeEmbeddings>, search: Arc<FakeSearch>) -> KnowledgeSearchTool {
    KnowledgeSearchTool::new(embeddings, search, 5)
}

// ===========================================================================
// ToolResult
// ===========================================================================

#[test]
fn tool_result_text() {
    let r = ToolResult::text("hello");
    assert!(!r.is_error());
    assert_eq!(r.to_content_string(), "hello");
}

#[test]
fn tool_result_error() {
    let r = ToolResult::error("boom");
    assert!(r.is_error());
    assert_eq!(r.to_content_string(), "Error: boom");
}

// ===========================================================================
// ToolRegistry
// ===========================================================================

#[tokio::test]
async fn registry_default_is_empty() {
    let reg = ToolRegistry::new();
    assert!(reg.list().is_empty());
    assert!(reg.get_definitions().is_empty());
    assert!(reg.is_empty());
}

#[tokio::test]
async fn registry_execute_missing_tool() {
    let reg = ToolRegistry::new();
    let r = reg.execute("nope", json!({})).await;
    assert!(r.is_error());
    assert!(r.to_content_string().contains("nope"));
}

#[tokio::test]
async fn default_registry_has_knowledge_search() {
    let reg = create_default_registry(
        FakeEmbeddings::returning(vec![0.1]),
        FakeSearch::returning(vec![]),
        5,
    );
    assert_eq!(reg.list(), vec!["knowledge_search"]);
    let defs = reg.get_definitions();
    assert_eq!(defs.len(), 1);
    assert_eq!(defs[0].name, "knowledge_search");
    assert!(!defs[0].description.is_empty());
    assert_eq!(defs[0].input_schema["required"][0], "query");
}

// ===========================================================================
// KnowledgeSearchTool::search
// ===========================================================================

#[tokio::test]
async fn search_zero_rows_yields_no_information() {
    let search = FakeSearch::returning(vec![]);
    let tool = tool_with(FakeEmbeddings::returning(vec![0.1, 0.2]), search.clone());

    let out = tool.search("x", 3).await;
    assert_eq!(out, NO_INFORMATION);
    assert_eq!(search.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn search_one_row_is_verbatim() {
    let search = FakeSearch::returning(vec![MatchRow::new("We open at 9am.")]);
    let tool = tool_with(FakeEmbeddings::returning(vec![0.1]), search);

    let out = tool.search("opening hours", 3).await;
    assert_eq!(out, "We open at 9am.");
}

#[tokio::test]
async fn search_multiple_rows_joined_in_backend_order() {
    let search = FakeSearch::returning(vec![
        MatchRow::new("first"),
        MatchRow::new("second"),
        MatchRow::new("third"),
    ]);
    let tool = tool_with(FakeEmbeddings::returning(vec![0.1]), search);

    let out = tool.search("x", 3).await;
    assert_eq!(out, "first\n\nsecond\n\nthird");
}

#[tokio::test]
async fn search_empty_embedding_skips_backend() {
    let search = FakeSearch::returning(vec![MatchRow::new("never seen")]);
    let tool = tool_with(FakeEmbeddings::returning(vec![]), search.clone());

    let out = tool.search("x", 3).await;
    assert_eq!(out, EMBEDDING_APOLOGY);
    assert_eq!(search.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn search_embedding_error_yields_apology() {
    let search = FakeSearch::returning(vec![]);
    let tool = tool_with(FakeEmbeddings::failing(), search.clone());

    let out = tool.search("x", 3).await;
    assert_eq!(out, EMBEDDING_APOLOGY);
    assert_eq!(search.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn search_backend_error_yields_apology() {
    let tool = tool_with(FakeEmbeddings::returning(vec![0.1]), FakeSearch::failing());

    let out = tool.search("x", 3).await;
    assert_eq!(out, SEARCH_APOLOGY);
}

#[tokio::test]
async fn search_clamps_match_count_to_one() {
    let search = FakeSearch::returning(vec![MatchRow::new("row")]);
    let tool = tool_with(FakeEmbeddings::returning(vec![0.1]), search.clone());

    tool.search("x", 0).await;
    assert_eq!(*search.last_match_count.lock().unwrap(), Some(1));
}

// ===========================================================================
// KnowledgeSearchTool as a Tool
// ===========================================================================

#[tokio::test]
async fn execute_via_registry() {
    let reg = create_default_registry(
        FakeEmbeddings::returning(vec![0.1]),
        FakeSearch::returning(vec![MatchRow::new("passage text")]),
        5,
    );

    let r = reg
        .execute("knowledge_search", json!({"query": "what is it?"}))
        .await;
    assert!(!r.is_error());
    assert_eq!(r.to_content_string(), "passage text");
}

#[tokio::test]
async fn execute_uses_default_match_count() {
    let embeddings = FakeEmbeddings::returning(vec![0.1]);
    let search = FakeSearch::returning(vec![MatchRow::new("row")]);
    let tool = KnowledgeSearchTool::new(embeddings, search.clone(), 7);

    tool.execute(json!({"query": "q"})).await;
    assert_eq!(*search.last_match_count.lock().unwrap(), Some(7));

    tool.execute(json!({"query": "q", "match_count": 2})).await;
    assert_eq!(*search.last_match_count.lock().unwrap(), Some(2));
}

#[tokio::test]
async fn execute_missing_query_is_error() {
    let tool = tool_with(FakeEmbeddings::returning(vec![0.1]), FakeSearch::returning(vec![]));
    let r = tool.execute(json!({})).await;
    assert!(r.is_error());

    let r = tool.execute(json!({"query": "  "})).await;
    assert!(r.is_error());
}
