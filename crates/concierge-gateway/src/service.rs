//! Runtime factory wiring the real providers together
//!
//! Construction happens inside the lifecycle manager's background
//! build, so missing credentials surface as a recorded build failure on
//! first use rather than failing the boot.

use concierge_agent::{AgentConfig, AgentRuntime, ChatRuntime, RuntimeFactory};
use concierge_core::{Config, Error};
use concierge_llm::OpenAiProvider;
use concierge_tools::{create_default_registry, OpenAiEmbeddings, SupabaseSearch};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful concierge assistant answering \
questions about the organization's products, services, and policies. Use the \
knowledge_search tool to look up relevant information before answering, and reply in \
the language the question was asked in. If the knowledge base has no relevant \
information, say so honestly instead of guessing.";

/// Timeout applied to each outbound embedding/search HTTP call.
const RETRIEVAL_TIMEOUT: Duration = Duration::from_secs(30);

pub struct ConciergeFactory {
    config: Config,
}

impl ConciergeFactory {
    pub fn new(config: Config) -> Arc<Self> {
        Arc::new(Self { config })
    }
}

#[async_trait::async_trait]
impl RuntimeFactory for ConciergeFactory {
    async fn build(&self) -> Result<Arc<dyn ChatRuntime>, Error> {
        let config = &self.config;

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

        let provider = Arc::new(
            OpenAiProvider::new(api_key)
                .with_base_url(config.openai_base_url.clone())
                .with_timeout(config.chat_timeout),
        );

        let embeddings = Arc::new(
            OpenAiEmbeddings::new(api_key, config.embedding_model.clone())
                .with_base_url(config.openai_base_url.clone())
                .with_timeout(RETRIEVAL_TIMEOUT),
        );
        let search = Arc::new(
            SupabaseSearch::new(supabase_url, supabase_key, config.search_function.clone())
                .with_timeout(RETRIEVAL_TIMEOUT),
        );

        let tools = create_default_registry(embeddings, search, config.match_count);
        info!("registered tools: {:?}", tools.list());

        let agent_config = AgentConfig {
            model: config.llm_model.clone(),
            system_prompt: config
                .system_prompt
                .clone()
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            max_tool_iterations: config.max_tool_iterations,
            memory_token_limit: config.memory_token_limit,
            shared_memory: config.shared_memory,
        };

        Ok(Arc::new(AgentRuntime::new(provider, tools, agent_config)))
    }
}
