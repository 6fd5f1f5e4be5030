//! # Recommendation Aggregator
//!
//! This module coordinates the recommendation pipeline for one request:
//! 1. Expand the muscle field into one query per muscle
//! 2. For each query: embed, score every catalog row, filter by muscle
//!    (falling back to all rows), sort, keep the top few
//! 3. Concatenate the per-query lists in query order
//! 4. Deduplicate by name, first occurrence wins
//! 5. Re-sort by score and keep the top N
//!
//! The catalog and ranker are shared read-only; every request works on its
//! own list of borrowed rows.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, instrument, warn};

use catalog::Catalog;
use embedder::TextEmbedder;
use pipeline::filters::MuscleMatchFilter;
use pipeline::{
    expand_queries, ExerciseSummary, FilterPipeline, PreferenceQuery, Result, ScoredRecord,
    SimilarityRanker, UserPreferences,
};

/// Result sizes for the two aggregation phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregatorConfig {
    /// Rows kept per muscle query
    pub per_query_limit: usize,
    /// Entries in the final result
    pub result_limit: usize,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            per_query_limit: 3,
            result_limit: 5,
        }
    }
}

/// A recommendation together with how it was ranked.
///
/// Only `summary` leaves the service; score and query muscle are for
/// diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedExercise {
    pub summary: ExerciseSummary,
    pub similarity_score: f32,
    pub query_muscle: String,
}

/// Coordinates expansion, ranking, filtering and merging
#[derive(Clone)]
pub struct RecommendationAggregator {
    catalog: Arc<Catalog>,
    ranker: Option<Arc<SimilarityRanker>>,
    filter_pipeline: Arc<FilterPipeline>,
    config: AggregatorConfig,
}

impl RecommendationAggregator {
    /// Create an aggregator over a loaded catalog and embedder.
    ///
    /// If the catalog's feature matrix cannot be built against this embedder
    /// the aggregator still constructs, with the ranker unavailable, and every
    /// request yields no suggestions.
    pub fn new(
        catalog: Arc<Catalog>,
        embedder: Arc<dyn TextEmbedder>,
        config: AggregatorConfig,
    ) -> Self {
        let ranker = match SimilarityRanker::from_catalog(&catalog, embedder) {
            Ok(ranker) => Some(Arc::new(ranker)),
            Err(e) => {
                warn!("Similarity ranker unavailable: {}", e);
                None
            }
        };
        Self {
            catalog,
            ranker,
            filter_pipeline: Arc::new(FilterPipeline::new().add_filter(MuscleMatchFilter)),
            config,
        }
    }

    /// Aggregator with no ranker at all, e.g. when the model file is absent
    pub fn without_ranker(catalog: Arc<Catalog>, config: AggregatorConfig) -> Self {
        warn!("Similarity ranker unavailable: no embedding model loaded");
        Self {
            catalog,
            ranker: None,
            filter_pipeline: Arc::new(FilterPipeline::new().add_filter(MuscleMatchFilter)),
            config,
        }
    }

    pub fn is_ranker_available(&self) -> bool {
        self.ranker.is_some()
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn config(&self) -> AggregatorConfig {
        self.config
    }

    /// Main entry point: ranked exercise summaries for one preference set
    pub fn recommend(&self, preferences: &UserPreferences) -> Result<Vec<ExerciseSummary>> {
        Ok(self
            .recommend_detailed(preferences)?
            .into_iter()
            .map(|ranked| ranked.summary)
            .collect())
    }

    /// Same as [`recommend`](Self::recommend), keeping score and query muscle
    #[instrument(skip_all, fields(muscle = %preferences.muscle))]
    pub fn recommend_detailed(&self, preferences: &UserPreferences) -> Result<Vec<RankedExercise>> {
        let start_time = Instant::now();

        let queries = expand_queries(preferences);
        if queries.is_empty() {
            debug!("No muscle tokens in request");
            return Ok(Vec::new());
        }

        let Some(ranker) = self.ranker.as_deref() else {
            debug!("Ranker unavailable, skipping {} queries", queries.len());
            return Ok(Vec::new());
        };

        let mut per_query = Vec::with_capacity(queries.len());
        for query in &queries {
            let top = self.run_query(ranker, query)?;
            debug!("Query for {:?} kept {} rows", query.muscle, top.len());
            per_query.push(top);
        }

        let merged = Self::merge_results(per_query);
        let recommendations = self.rank_and_select(merged);

        info!(
            "Selected {} exercises from {} muscle queries in {:.2?}",
            recommendations.len(),
            queries.len(),
            start_time.elapsed()
        );
        Ok(recommendations)
    }

    /// Score, filter, sort and truncate for a single muscle query
    fn run_query<'a>(
        &'a self,
        ranker: &SimilarityRanker,
        query: &'a PreferenceQuery,
    ) -> Result<Vec<ScoredRecord<'a>>> {
        let scores = ranker.rank(&query.text())?;

        let scored: Vec<ScoredRecord<'a>> = self
            .catalog
            .records()
            .iter()
            .zip(scores)
            .enumerate()
            .map(|(row, (record, score))| ScoredRecord::new(row, record, score, &query.muscle))
            .collect();

        let mut filtered = self.filter_pipeline.apply(scored, query)?;
        sort_by_score_desc(&mut filtered);
        filtered.truncate(self.config.per_query_limit);
        Ok(filtered)
    }

    /// Concatenate per-query lists in order and drop repeated names,
    /// keeping the first occurrence
    fn merge_results<'a>(per_query: Vec<Vec<ScoredRecord<'a>>>) -> Vec<ScoredRecord<'a>> {
        let total: usize = per_query.iter().map(Vec::len).sum();
        let mut seen: HashSet<&'a str> = HashSet::with_capacity(total);

        let merged: Vec<ScoredRecord<'a>> = per_query
            .into_iter()
            .flatten()
            .filter(|candidate| seen.insert(candidate.record.name.as_str()))
            .collect();

        debug!(
            "Merged {} per-query rows, {} after deduplication",
            total,
            merged.len()
        );
        merged
    }

    /// Sort by score DESC (stable) and keep the top N
    fn rank_and_select(&self, mut merged: Vec<ScoredRecord<'_>>) -> Vec<RankedExercise> {
        sort_by_score_desc(&mut merged);
        merged.truncate(self.config.result_limit);

        merged
            .into_iter()
            .map(|candidate| RankedExercise {
                summary: ExerciseSummary::from(candidate.record),
                similarity_score: candidate.similarity_score,
                query_muscle: candidate.query_muscle.to_string(),
            })
            .collect()
    }
}

/// Stable: rows with equal scores keep their current relative order.
/// Scores from the ranker are always finite.
fn sort_by_score_desc(rows: &mut [ScoredRecord<'_>]) {
    rows.sort_by(|a, b| {
        b.similarity_score
            .partial_cmp(&a.similarity_score)
            .unwrap_or(Ordering::Equal)
    });
}
