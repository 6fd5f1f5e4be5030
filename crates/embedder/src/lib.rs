//! Text embedding for the recommender.
//!
//! The ranker only needs a function from text to a fixed-dimension vector.
//! [`TextEmbedder`] is that seam; [`TfidfVectorizer`] is the implementation
//! the service ships with, applying a model that was fitted offline.

pub mod error;
pub mod tfidf;

pub use error::{EmbedderError, Result};
pub use tfidf::{Norm, TfidfVectorizer};

pub type Embedding = Vec<f32>;

/// Maps free text to vectors of a fixed dimension.
///
/// Implementations are shared read-only across requests, hence `Send + Sync`.
/// `embed_batch` must return exactly what calling `embed` on every input in
/// order would return.
pub trait TextEmbedder: Send + Sync {
    fn embed(&self, text: &str) -> Result<Embedding>;

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    /// Length of every vector this embedder returns
    fn dimensions(&self) -> usize;

    fn model_name(&self) -> &str;
}
