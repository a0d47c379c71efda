//! Concierge LLM — provider trait and OpenAI chat-completions client

pub mod openai;
pub mod provider;
pub mod types;

pub use openai::OpenAiProvider;
pub use provider::{LlmError, LlmProvider, LlmResult};
pub use types::{LlmMessage, LlmRequest, LlmResponse, Role, ToolCall, ToolDefinition, Usage};
