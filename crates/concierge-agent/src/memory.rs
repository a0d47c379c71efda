//! Conversation memory with token-budgeted eviction

use concierge_llm::{LlmMessage, Role};
use tracing::debug;

const CHARS_PER_TOKEN: f32 = 4.0;

/// Overhead added per message for role markers and separators.
const MESSAGE_OVERHEAD_TOKENS: usize = 10;

/// Rolling history of one conversation, bounded by a token budget.
/// Oldest turns are evicted first when the budget is exceeded; the
/// newest turn is always retained even if it alone exceeds the budget.
pub struct ConversationMemory {
    token_budget: usize,
    turns: Vec<LlmMessage>,
}

impl ConversationMemory {
    pub fn new(token_budget: usize) -> Self {
        Self {
            token_budget,
            turns: Vec::new(),
        }
    }

    pub fn estimate_tokens(text: &str) -> usize {
        (text.len() as f32 / CHARS_PER_TOKEN).ceil() as usize
    }

    pub fn message_tokens(message: &LlmMessage) -> usize {
        let mut tokens = Self::estimate_tokens(&message.content);
        if let Some(calls) = &message.tool_calls {
            for call in calls {
                tokens += Self::estimate_tokens(&call.name);
                tokens += Self::estimate_tokens(&call.arguments);
            }
        }
        tokens + MESSAGE_OVERHEAD_TOKENS
    }

    pub fn total_tokens(&self) -> usize {
        self.turns.iter().map(Self::message_tokens).sum()
    }

    /// Append a turn and evict oldest-first until the budget holds.
    pub fn push(&mut self, message: LlmMessage) {
        self.turns.push(message);
        self.evict();
    }

    fn evict(&mut self) {
        let before = self.turns.len();
        while self.turns.len() > 1 && self.total_tokens() > self.token_budget {
            self.turns.remove(0);
            // A tool result must follow its call; drop results orphaned
            // by the evicted assistant turn.
            while self.turns.len() > 1 && self.turns[0].role == Role::Tool {
                self.turns.remove(0);
            }
        }
        if self.turns.len() < before {
            debug!(
                "evicted {} turns, ~{} tokens remain",
                before - self.turns.len(),
                self.total_tokens()
            );
        }
    }

    pub fn history(&self) -> Vec<LlmMessage> {
        self.turns.clone()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }
}
