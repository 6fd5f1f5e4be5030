use thiserror::Error;

/// Errors raised while loading or applying an embedding model
#[derive(Error, Debug)]
pub enum EmbedderError {
    #[error("Failed to open model file: {path}")]
    FileNotFound { path: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to decode model file: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid token pattern: {0}")]
    TokenPattern(#[from] regex::Error),

    /// The model decoded but is internally inconsistent
    #[error("Invalid model: {0}")]
    InvalidModel(String),
}

pub type Result<T> = std::result::Result<T, EmbedderError>;
