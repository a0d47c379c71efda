//! Concierge Agent — conversational memory, the agent runtime, and the
//! lifecycle manager that owns the singleton runtime instance

pub mod lifecycle;
pub mod memory;
pub mod runtime;

pub use lifecycle::{
    AgentHandle, AgentStatus, DeferReason, LifecycleConfig, QueryOutcome, RuntimeFactory,
    TECHNICAL_DIFFICULTIES,
};
pub use memory::ConversationMemory;
pub use runtime::{AgentConfig, AgentRuntime, ChatError, ChatRuntime};

pub use concierge_core::ConversationId;
