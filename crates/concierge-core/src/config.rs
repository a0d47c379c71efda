//! Environment configuration
//!
//! All settings come from process environment variables, read once at
//! startup. Missing credentials are logged as warnings rather than
//! failing the boot — the failure surfaces on first use, when the agent
//! build attempts to reach the provider.

use crate::types::BindMode;
use std::time::Duration;
use tracing::warn;

#[derive(Clone, Debug)]
pub struct Config {
    // Language-model provider
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub llm_model: String,
    pub embedding_model: String,

    // Vector store
    pub supabase_url: Option<String>,
    pub supabase_key: Option<String>,
    pub vector_table: String,
    pub search_function: String,
    pub match_count: usize,

    // Agent behavior
    pub system_prompt: Option<String>,
    pub memory_token_limit: usize,
    pub shared_memory: bool,
    pub max_tool_iterations: usize,

    // Lifecycle timeouts
    pub max_init_wait: Duration,
    pub build_timeout: Duration,
    pub chat_timeout: Duration,

    // Serving
    pub max_concurrent_queries: usize,
    pub port: u16,
    pub bind: BindMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openai_base_url: "https://api.openai.com/v1".to_string(),
            llm_model: "gpt-4o".to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
            supabase_url: None,
            supabase_key: None,
            vector_table: "faq_embeddings".to_string(),
            search_function: "match_documents".to_string(),
            match_count: 5,
            system_prompt: None,
            memory_token_limit: 10_000,
            shared_memory: true,
            max_tool_iterations: 8,
            max_init_wait: Duration::from_secs(30),
            build_timeout: Duration::from_secs(120),
            chat_timeout: Duration::from_secs(90),
            max_concurrent_queries: 4,
            port: 8000,
            bind: BindMode::default(),
        }
    }
}

impl Config {
    /// Read configuration from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let config = Self {
            openai_api_key: env_opt("OPENAI_API_KEY"),
            openai_base_url: env_or("OPENAI_BASE_URL", &defaults.openai_base_url),
            llm_model: env_or("LLM_MODEL", &defaults.llm_model),
            embedding_model: env_or("EMBEDDING_MODEL", &defaults.embedding_model),
            supabase_url: env_opt("SUPABASE_URL"),
            supabase_key: env_opt("SUPABASE_KEY"),
            vector_table: env_or("VECTOR_TABLE", &defaults.vector_table),
            search_function: env_or("SEARCH_FUNCTION", &defaults.search_function),
            match_count: env_parse("MATCH_COUNT", defaults.match_count).max(1),
            system_prompt: env_opt("SYSTEM_PROMPT"),
            memory_token_limit: env_parse("MEMORY_TOKEN_LIMIT", defaults.memory_token_limit),
            shared_memory: env_parse("SHARED_MEMORY", defaults.shared_memory),
            max_tool_iterations: env_parse("MAX_TOOL_ITERATIONS", defaults.max_tool_iterations)
                .max(1),
            max_init_wait: Duration::from_secs(env_parse("MAX_INIT_WAIT_SECS", 30)),
            build_timeout: Duration::from_secs(env_parse("BUILD_TIMEOUT_SECS", 120)),
            chat_timeout: Duration::from_secs(env_parse("CHAT_TIMEOUT_SECS", 90)),
            max_concurrent_queries: env_parse(
                "MAX_CONCURRENT_QUERIES",
                defaults.max_concurrent_queries,
            )
            .max(1),
            port: env_parse("PORT", defaults.port),
            bind: match env_or("BIND", "lan").as_str() {
                "loopback" | "localhost" | "127.0.0.1" => BindMode::Loopback,
                _ => BindMode::Lan,
            },
        };

        config.validate();
        config
    }

    /// Log warnings for missing credentials. Never fatal — the agent
    /// build reports the failure when the services are actually needed.
    fn validate(&self) {
        if self.openai_api_key.is_none() {
            warn!("OPENAI_API_KEY not set in environment");
        }
        if self.supabase_url.is_none() || self.supabase_key.is_none() {
            warn!("Supabase credentials not fully configured in environment");
        }
    }
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    env_opt(key).unwrap_or_else(|| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    match env_opt(key) {
        Some(raw) => raw.parse().unwrap_or(default),
        None => default,
    }
}
