//! Cosine-similarity ranking of catalog rows against a query.
//!
//! The ranker owns the catalog's feature matrix (one row per record, in
//! catalog order) and the embedder used to vectorize queries. Building it is
//! where catalog/embedder mismatches surface; a ranker that exists can always
//! score.

use crate::error::{PipelineError, Result};
use catalog::{Catalog, FeatureSource};
use embedder::{Embedding, TextEmbedder};
use rayon::prelude::*;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Catalogs at or above this many rows are scored with Rayon
const PAR_THRESHOLD: usize = 2_000;

/// Cosine similarity, 0 when either vector has zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    finite_or_zero(dot, norm_a.sqrt() * norm_b.sqrt())
}

fn finite_or_zero(dot: f32, denom: f32) -> f32 {
    if denom == 0.0 {
        return 0.0;
    }
    let score = dot / denom;
    if score.is_finite() { score } else { 0.0 }
}

fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Dense N × D matrix stored row-major.
#[derive(Debug, Clone)]
pub struct FeatureMatrix {
    rows: usize,
    dim: usize,
    data: Vec<f32>,
}

impl FeatureMatrix {
    /// Stack rows, requiring each to have exactly `dim` entries.
    pub fn from_rows(rows: Vec<Vec<f32>>, dim: usize) -> Result<Self> {
        let mut data = Vec::with_capacity(rows.len() * dim);
        let count = rows.len();
        for (row, values) in rows.into_iter().enumerate() {
            if values.len() != dim {
                return Err(PipelineError::RowDimensionMismatch {
                    row,
                    expected: dim,
                    found: values.len(),
                });
            }
            data.extend(values);
        }
        Ok(Self {
            rows: count,
            dim,
            data,
        })
    }

    pub fn row(&self, index: usize) -> &[f32] {
        &self.data[index * self.dim..(index + 1) * self.dim]
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn dim(&self) -> usize {
        self.dim
    }
}

pub struct SimilarityRanker {
    embedder: Arc<dyn TextEmbedder>,
    features: FeatureMatrix,
    row_norms: Vec<f32>,
}

impl SimilarityRanker {
    /// Pair a feature matrix with the embedder that will vectorize queries.
    pub fn new(features: FeatureMatrix, embedder: Arc<dyn TextEmbedder>) -> Result<Self> {
        if features.dim() != embedder.dimensions() {
            return Err(PipelineError::RowDimensionMismatch {
                row: 0,
                expected: embedder.dimensions(),
                found: features.dim(),
            });
        }
        let row_norms = (0..features.rows())
            .map(|i| l2_norm(features.row(i)))
            .collect();
        Ok(Self {
            embedder,
            features,
            row_norms,
        })
    }

    /// Materialize the catalog's feature matrix.
    ///
    /// Precomputed vectors win when every record has one; otherwise every
    /// record's `combined_features` text is embedded. Anything else is
    /// [`PipelineError::MissingFeatures`].
    pub fn from_catalog(catalog: &Catalog, embedder: Arc<dyn TextEmbedder>) -> Result<Self> {
        let dim = embedder.dimensions();
        let source = catalog.feature_source();
        let rows: Vec<Embedding> = match source {
            FeatureSource::Precomputed => catalog
                .records()
                .iter()
                .map(|r| r.feature_vector.clone().unwrap_or_default())
                .collect(),
            FeatureSource::RawText => {
                let texts: Vec<&str> = catalog
                    .records()
                    .iter()
                    .map(|r| r.combined_features.as_deref().unwrap_or_default())
                    .collect();
                embedder.embed_batch(&texts)?
            }
            FeatureSource::Missing => return Err(PipelineError::MissingFeatures),
        };

        let features = FeatureMatrix::from_rows(rows, dim)?;
        info!(
            "Built {} x {} feature matrix from {:?} features ({})",
            features.rows(),
            features.dim(),
            source,
            embedder.model_name()
        );
        Self::new(features, embedder)
    }

    /// Number of catalog rows this ranker scores
    pub fn len(&self) -> usize {
        self.features.rows()
    }

    pub fn is_empty(&self) -> bool {
        self.features.rows() == 0
    }

    pub fn dimensions(&self) -> usize {
        self.features.dim()
    }

    pub fn embed_query(&self, text: &str) -> Result<Embedding> {
        let vector = self.embedder.embed(text)?;
        if vector.len() != self.features.dim() {
            return Err(PipelineError::QueryDimensionMismatch {
                expected: self.features.dim(),
                found: vector.len(),
            });
        }
        Ok(vector)
    }

    /// One score per catalog row, in row order.
    pub fn score(&self, query: &[f32]) -> Result<Vec<f32>> {
        if query.len() != self.features.dim() {
            return Err(PipelineError::QueryDimensionMismatch {
                expected: self.features.dim(),
                found: query.len(),
            });
        }
        let query_norm = l2_norm(query);
        let score_row = |i: usize| {
            let row = self.features.row(i);
            let dot: f32 = query.iter().zip(row).map(|(q, f)| q * f).sum();
            finite_or_zero(dot, query_norm * self.row_norms[i])
        };

        let rows = self.features.rows();
        let scores = if rows >= PAR_THRESHOLD {
            (0..rows).into_par_iter().map(score_row).collect()
        } else {
            (0..rows).map(score_row).collect()
        };
        Ok(scores)
    }

    /// Embed `text` and score it against every row.
    #[instrument(skip(self), level = "debug")]
    pub fn rank(&self, text: &str) -> Result<Vec<f32>> {
        let query = self.embed_query(text)?;
        let scores = self.score(&query)?;
        debug!("Scored {} rows", scores.len());
        Ok(scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::ExerciseRecord;
    use embedder::TfidfVectorizer;
    use std::collections::HashMap;

    fn tfidf(terms: &[&str]) -> Arc<dyn TextEmbedder> {
        let vocabulary: HashMap<String, usize> = terms
            .iter()
            .enumerate()
            .map(|(i, t)| (t.to_string(), i))
            .collect();
        Arc::new(TfidfVectorizer::new(vocabulary, vec![1.0; terms.len()]).unwrap())
    }

    #[test]
    fn test_cosine_similarity_basics() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_zero_norm_is_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[0.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn test_feature_matrix_rejects_ragged_rows() {
        let err = FeatureMatrix::from_rows(vec![vec![1.0, 0.0], vec![1.0]], 2).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::RowDimensionMismatch { row: 1, expected: 2, found: 1 }
        ));
    }

    #[test]
    fn test_from_catalog_precomputed_scores_in_row_order() {
        let catalog = Catalog::from_records(vec![
            ExerciseRecord::new("Bench Press", "Chest", "Barbell", "").with_feature_vector(vec![1.0, 0.0]),
            ExerciseRecord::new("Row", "Back", "Barbell", "").with_feature_vector(vec![0.0, 1.0]),
            ExerciseRecord::new("Blank", "", "", "").with_feature_vector(vec![0.0, 0.0]),
        ]);
        let ranker = SimilarityRanker::from_catalog(&catalog, tfidf(&["chest", "back"])).unwrap();

        let scores = ranker.rank("chest").unwrap();

        assert_eq!(ranker.len(), 3);
        assert!((scores[0] - 1.0).abs() < 1e-6);
        assert_eq!(scores[1], 0.0);
        assert_eq!(scores[2], 0.0);
    }

    #[test]
    fn test_from_catalog_embeds_raw_text() {
        let catalog = Catalog::from_records(vec![
            ExerciseRecord::new("Bench Press", "Chest", "", "").with_combined_features("chest barbell"),
            ExerciseRecord::new("Row", "Back", "", "").with_combined_features("back barbell"),
        ]);
        let ranker =
            SimilarityRanker::from_catalog(&catalog, tfidf(&["chest", "back", "barbell"])).unwrap();

        let scores = ranker.rank("back").unwrap();

        assert!(scores[1] > scores[0]);
        assert_eq!(scores[0], 0.0);
    }

    #[test]
    fn test_from_catalog_missing_features() {
        let catalog = Catalog::from_records(vec![
            ExerciseRecord::new("Bench Press", "Chest", "", "").with_combined_features("chest"),
            ExerciseRecord::new("Row", "Back", "", ""),
        ]);
        let result = SimilarityRanker::from_catalog(&catalog, tfidf(&["chest"]));
        assert!(matches!(result, Err(PipelineError::MissingFeatures)));
    }

    #[test]
    fn test_from_catalog_dimension_mismatch() {
        let catalog = Catalog::from_records(vec![
            ExerciseRecord::new("Bench Press", "Chest", "", "").with_feature_vector(vec![1.0, 0.0, 0.0]),
        ]);
        let result = SimilarityRanker::from_catalog(&catalog, tfidf(&["chest", "back"]));
        assert!(matches!(
            result,
            Err(PipelineError::RowDimensionMismatch { expected: 2, found: 3, .. })
        ));
    }

    #[test]
    fn test_score_rejects_wrong_query_dimension() {
        let catalog = Catalog::from_records(vec![
            ExerciseRecord::new("Bench Press", "Chest", "", "").with_feature_vector(vec![1.0, 0.0]),
        ]);
        let ranker = SimilarityRanker::from_catalog(&catalog, tfidf(&["chest", "back"])).unwrap();

        let err = ranker.score(&[1.0]).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::QueryDimensionMismatch { expected: 2, found: 1 }
        ));
    }

    #[test]
    fn test_parallel_scoring_matches_sequential() {
        let records: Vec<ExerciseRecord> = (0..PAR_THRESHOLD + 10)
            .map(|i| {
                let x = (i % 7) as f32;
                let y = (i % 5) as f32;
                ExerciseRecord::new(format!("Exercise {i}"), "", "", "").with_feature_vector(vec![x, y])
            })
            .collect();
        let catalog = Catalog::from_records(records);
        let ranker = SimilarityRanker::from_catalog(&catalog, tfidf(&["chest", "back"])).unwrap();

        let query = [0.6, 0.8];
        let scores = ranker.score(&query).unwrap();

        assert_eq!(scores.len(), catalog.len());
        for (i, score) in scores.iter().enumerate() {
            let expected = cosine_similarity(&query, catalog.get(i).unwrap().feature_vector.as_ref().unwrap());
            assert!((score - expected).abs() < 1e-5);
        }
    }
}
