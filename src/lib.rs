use thiserror::Error;

pub type Result<T> = std::result::Result<T, ChatbotError>;

#[derive(Error, Debug)]
pub enum ChatbotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Corpus error: {0}")]
    Corpus(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    /// An error response from the Sarvam API, passed through verbatim.
    #[error("Provider error (HTTP {status}): {message}")]
    Provider { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Audio error: {0}")]
    Audio(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl ChatbotError {
    /// True when the error came back from the provider with an auth status.
    #[inline]
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::Provider { status: 401 | 403, .. })
    }
}

pub mod commands;
pub mod config;
pub mod corpus;
pub mod database;
pub mod embeddings;
pub mod indexer;
pub mod pipeline;
pub mod prompt;
pub mod retrieval;
pub mod sarvam;
pub mod surface;
