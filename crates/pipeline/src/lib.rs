//! Ranking pipeline for exercise recommendations.
//!
//! This crate provides:
//! - Muscle-query expansion: one scoring query per requested muscle
//! - SimilarityRanker: cosine similarity of a query against every catalog row
//! - Filter trait and implementations, composed with FilterPipeline
//!
//! ## Architecture
//! For each expanded query:
//! 1. The ranker embeds the query text and scores every catalog row
//! 2. Filters narrow the scored rows (muscle match, with fallback)
//! 3. The caller sorts and keeps the best rows
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{expand_queries, FilterPipeline, SimilarityRanker};
//! use pipeline::filters::MuscleMatchFilter;
//!
//! let ranker = SimilarityRanker::from_catalog(&catalog, embedder)?;
//! let filters = FilterPipeline::new().add_filter(MuscleMatchFilter);
//!
//! for query in expand_queries(&preferences) {
//!     let scores = ranker.rank(&query.text())?;
//!     // attach scores to rows, then filters.apply(rows, &query)?
//! }
//! ```

pub mod error;
pub mod types;
pub mod expander;
pub mod ranker;
pub mod traits;
pub mod filters;
pub mod filter_pipeline;

// Re-export main types
pub use error::{PipelineError, Result};
pub use types::{ExerciseSummary, PreferenceQuery, ScoredRecord, UserPreferences};
pub use expander::{expand_queries, split_muscles};
pub use ranker::{cosine_similarity, FeatureMatrix, SimilarityRanker};
pub use traits::Filter;
pub use filter_pipeline::FilterPipeline;
