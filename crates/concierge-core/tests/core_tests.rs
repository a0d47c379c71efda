//! Tests for concierge-core: ConversationId, BindMode, Config defaults, Error display

use concierge_core::*;
use std::time::Duration;

// ===========================================================================
// ConversationId
// ===========================================================================

#[test]
fn conversation_id_basics() {
    let id = ConversationId::new("table-42");
    assert_eq!(id.as_str(), "table-42");
    assert_eq!(format!("{}", id), "table-42");
}

#[test]
fn conversation_id_from_str_and_string() {
    let a: ConversationId = "abc".into();
    let b: ConversationId = String::from("abc").into();
    assert_eq!(a, b);
}

#[test]
fn conversation_id_is_hashable() {
    use std::collections::HashSet;
    let mut set = HashSet::new();
    set.insert(ConversationId::new("x"));
    set.insert(ConversationId::new("x"));
    set.insert(ConversationId::new("y"));
    assert_eq!(set.len(), 2);
}

// ===========================================================================
// BindMode
// ===========================================================================

#[test]
fn bind_mode_addrs() {
    assert_eq!(BindMode::Loopback.to_addr(), "127.0.0.1");
    assert_eq!(BindMode::Lan.to_addr(), "0.0.0.0");
    assert_eq!(BindMode::default(), BindMode::Lan);
}

// ===========================================================================
// Config
// ===========================================================================

#[test]
fn config_defaults() {
    let cfg = Config::default();
    assert_eq!(cfg.llm_model, "gpt-4o");
    assert_eq!(cfg.embedding_model, "text-embedding-3-small");
    assert_eq!(cfg.match_count, 5);
    assert_eq!(cfg.memory_token_limit, 10_000);
    assert!(cfg.shared_memory);
    assert_eq!(cfg.max_init_wait, Duration::from_secs(30));
    assert_eq!(cfg.max_concurrent_queries, 4);
    assert_eq!(cfg.port, 8000);
    assert!(cfg.openai_api_key.is_none());
    assert!(cfg.system_prompt.is_none());
}

// ===========================================================================
// Error
// ===========================================================================

#[test]
fn error_display() {
    let e = Error::llm("openai", "boom");
    assert_eq!(e.to_string(), "llm error: openai - boom");

    let e = Error::config("OPENAI_API_KEY not set");
    assert_eq!(e.to_string(), "config error: OPENAI_API_KEY not set");

    let e = Error::build("provider unavailable");
    assert_eq!(e.to_string(), "build error: provider unavailable");
}
