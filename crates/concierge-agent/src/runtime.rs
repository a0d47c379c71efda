//! Agent runtime - the model/tool round-trip loop over shared memory

use crate::memory::ConversationMemory;
use concierge_core::ConversationId;
use concierge_llm::{LlmError, LlmMessage, LlmProvider, LlmRequest};
use concierge_tools::ToolRegistry;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Key used for every conversation when memory is shared. One agent
/// instance per deployment means one history; concurrent callers will
/// see each other's turns in it.
const SHARED_CONVERSATION: &str = "shared";

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("model call failed: {0}")]
    Provider(#[from] LlmError),

    #[error("tool loop exceeded {0} iterations")]
    IterationLimit(usize),
}

/// A callable agent: one message in, one reply out.
#[async_trait::async_trait]
pub trait ChatRuntime: Send + Sync {
    async fn chat(
        &self,
        conversation: &ConversationId,
        message: &str,
    ) -> Result<String, ChatError>;
}

pub struct AgentConfig {
    pub model: String,
    pub system_prompt: String,
    pub max_tool_iterations: usize,
    pub memory_token_limit: usize,
    pub shared_memory: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            system_prompt: String::new(),
            max_tool_iterations: 8,
            memory_token_limit: 10_000,
            shared_memory: true,
        }
    }
}

pub struct AgentRuntime {
    provider: Arc<dyn LlmProvider>,
    tools: Arc<ToolRegistry>,
    config: AgentConfig,
    memories: DashMap<ConversationId, Arc<Mutex<ConversationMemory>>>,
}

impl AgentRuntime {
    pub fn new(provider: Arc<dyn LlmProvider>, tools: ToolRegistry, config: AgentConfig) -> Self {
        Self {
            provider,
            tools: Arc::new(tools),
            config,
            memories: DashMap::new(),
        }
    }

    pub fn provider(&self) -> &Arc<dyn LlmProvider> {
        &self.provider
    }

    pub fn tools(&self) -> &Arc<ToolRegistry> {
        &self.tools
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    fn memory_for(&self, conversation: &ConversationId) -> Arc<Mutex<ConversationMemory>> {
        let key = if self.config.shared_memory {
            ConversationId::from(SHARED_CONVERSATION)
        } else {
            conversation.clone()
        };
        self.memories
            .entry(key)
            .or_insert_with(|| {
                Arc::new(Mutex::new(ConversationMemory::new(
                    self.config.memory_token_limit,
                )))
            })
            .clone()
    }

    /// Number of distinct memories currently held.
    pub fn memory_count(&self) -> usize {
        self.memories.len()
    }

    /// Snapshot of one conversation's history, mainly for inspection.
    pub async fn history(&self, conversation: &ConversationId) -> Vec<LlmMessage> {
        self.memory_for(conversation).lock().await.history()
    }
}

#[async_trait::async_trait]
impl ChatRuntime for AgentRuntime {
    async fn chat(
        &self,
        conversation: &ConversationId,
        message: &str,
    ) -> Result<String, ChatError> {
        let memory = self.memory_for(conversation);
        // Holding the memory lock for the whole turn keeps a turn's
        // messages contiguous; cross-conversation interleaving under
        // shared memory happens at turn granularity.
        let mut memory = memory.lock().await;

        memory.push(LlmMessage::user(message));

        let definitions = self.tools.get_definitions();

        for iteration in 1..=self.config.max_tool_iterations {
            let request = LlmRequest {
                model: self.config.model.clone(),
                messages: memory.history(),
                tools: if definitions.is_empty() {
                    None
                } else {
                    Some(definitions.clone())
                },
                system: if self.config.system_prompt.is_empty() {
                    None
                } else {
                    Some(self.config.system_prompt.clone())
                },
                ..Default::default()
            };

            let response = self.provider.complete(request).await?;
            let reply = response.message;

            if !reply.has_tool_calls() {
                let text = reply.content.clone();
                memory.push(reply);
                info!(
                    "turn complete: conversation={}, messages={}, tokens≈{}",
                    conversation,
                    memory.len(),
                    memory.total_tokens()
                );
                return Ok(text);
            }

            let calls = reply.tool_calls.clone().unwrap_or_default();
            memory.push(reply);

            for call in calls {
                debug!("executing tool {} ({})", call.name, call.id);
                let args = call.parse_arguments().unwrap_or_default();
                let result = self.tools.execute(&call.name, args).await;
                memory.push(LlmMessage::tool_result(
                    call.id,
                    result.to_content_string(),
                ));
            }

            debug!("tool calls executed, continuing loop (iteration {})", iteration);
        }

        Err(ChatError::IterationLimit(self.config.max_tool_iterations))
    }
}
