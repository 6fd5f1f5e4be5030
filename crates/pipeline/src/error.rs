//! Error types for the ranking pipeline.

use embedder::EmbedderError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// The embedder failed on a query or catalog text
    #[error("Embedding failed: {0}")]
    Embedding(#[from] EmbedderError),

    /// Neither every record has a feature vector nor every record has raw text
    #[error("Catalog has no complete feature column and no complete text column")]
    MissingFeatures,

    /// A catalog feature row does not match the embedder's dimension
    #[error("Feature row {row} has {found} dimensions, expected {expected}")]
    RowDimensionMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// A query vector does not match the feature matrix
    #[error("Query vector has {found} dimensions, feature matrix has {expected}")]
    QueryDimensionMismatch { expected: usize, found: usize },
}

pub type Result<T> = std::result::Result<T, PipelineError>;
