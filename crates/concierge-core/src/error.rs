//! Error types for Concierge

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("llm error: {provider} - {message}")]
    Llm { provider: String, message: String },

    #[error("retrieval error: {0}")]
    Retrieval(String),

    #[error("build error: {0}")]
    Build(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn llm(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Llm {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn build(message: impl Into<String>) -> Self {
        Self::Build(message.into())
    }
}
