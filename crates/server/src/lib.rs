//! Server crate for the rep-recs exercise recommender.
//!
//! This crate contains the aggregator that drives the ranking pipeline for
//! a request, the runtime configuration, and the HTTP surface.

pub mod aggregator;
pub mod config;
pub mod http;

pub use aggregator::{AggregatorConfig, RankedExercise, RecommendationAggregator};
pub use config::{load_aggregator, ModelPaths, RankingArgs, ServeConfig};
pub use http::{router, serve, ErrorBody, SuggestionResponse};
