//! Tool implementations

pub mod knowledge_search;
