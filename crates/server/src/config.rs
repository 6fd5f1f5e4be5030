//! Runtime configuration and model loading.
//!
//! Flags can also be set through `REP_RECS_*` environment variables.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use tracing::{error, info};

use catalog::{Catalog, CatalogError};
use embedder::{EmbedderError, TfidfVectorizer};

use crate::aggregator::{AggregatorConfig, RecommendationAggregator};

/// Locations of the offline-fitted artifacts
#[derive(Debug, Clone, Args)]
pub struct ModelPaths {
    /// Exercise catalog (`.json` array or `.jsonl`)
    #[arg(long, env = "REP_RECS_CATALOG", default_value = "data/catalog.json")]
    pub catalog: PathBuf,

    /// Fitted TF-IDF vectorizer
    #[arg(long, env = "REP_RECS_VECTORIZER", default_value = "data/vectorizer.json")]
    pub vectorizer: PathBuf,
}

#[derive(Debug, Clone, Args)]
pub struct RankingArgs {
    /// Rows kept for each muscle in the request
    #[arg(long, env = "REP_RECS_PER_QUERY_LIMIT", default_value_t = 3)]
    pub per_query_limit: usize,

    /// Suggestions returned per request
    #[arg(long, env = "REP_RECS_RESULT_LIMIT", default_value_t = 5)]
    pub result_limit: usize,
}

impl RankingArgs {
    pub fn to_config(&self) -> AggregatorConfig {
        AggregatorConfig {
            per_query_limit: self.per_query_limit.max(1),
            result_limit: self.result_limit.max(1),
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct ServeConfig {
    /// Address to listen on
    #[arg(long, env = "REP_RECS_BIND", default_value = "127.0.0.1:5000")]
    pub bind: String,

    #[command(flatten)]
    pub paths: ModelPaths,

    #[command(flatten)]
    pub ranking: RankingArgs,
}

/// Load catalog and vectorizer and build the aggregator.
///
/// A missing file is logged and the service starts with the ranker
/// unavailable. Any other load failure is returned.
pub fn load_aggregator(
    paths: &ModelPaths,
    config: AggregatorConfig,
) -> Result<RecommendationAggregator> {
    let catalog = match Catalog::load_from_file(&paths.catalog) {
        Ok(catalog) => Some(Arc::new(catalog)),
        Err(CatalogError::FileNotFound { path }) => {
            error!("Catalog not found at {}; suggestions disabled", path);
            None
        }
        Err(e) => {
            return Err(e).with_context(|| {
                format!("Failed to load catalog from {}", paths.catalog.display())
            });
        }
    };

    let vectorizer = match TfidfVectorizer::load(&paths.vectorizer) {
        Ok(vectorizer) => Some(Arc::new(vectorizer)),
        Err(EmbedderError::FileNotFound { path }) => {
            error!("Vectorizer not found at {}; suggestions disabled", path);
            None
        }
        Err(e) => {
            return Err(e).with_context(|| {
                format!("Failed to load vectorizer from {}", paths.vectorizer.display())
            });
        }
    };

    let aggregator = match (catalog, vectorizer) {
        (Some(catalog), Some(vectorizer)) => {
            RecommendationAggregator::new(catalog, vectorizer, config)
        }
        (catalog, _) => RecommendationAggregator::without_ranker(
            catalog.unwrap_or_else(|| Arc::new(Catalog::new())),
            config,
        ),
    };

    info!(
        "Aggregator ready: {} exercises, ranker available: {}",
        aggregator.catalog().len(),
        aggregator.is_ranker_available()
    );
    Ok(aggregator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const VECTORIZER: &str = r#"{
        "vocabulary": {"chest": 0, "back": 1, "dumbbell": 2},
        "idf": [1.0, 1.0, 1.0]
    }"#;

    const CATALOG: &str = r#"[
        {"name": "Push-up", "muscle": "Chest", "equipment": "Body Only",
         "difficulty": "Beginner", "combined_features": "chest"},
        {"name": "Dumbbell Row", "muscle": "Middle Back", "equipment": "Dumbbell",
         "difficulty": "Beginner", "combined_features": "back dumbbell"}
    ]"#;

    fn write_temp(content: &str, suffix: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_loads_both_artifacts() {
        let catalog = write_temp(CATALOG, ".json");
        let vectorizer = write_temp(VECTORIZER, ".json");
        let paths = ModelPaths {
            catalog: catalog.path().to_path_buf(),
            vectorizer: vectorizer.path().to_path_buf(),
        };

        let aggregator = load_aggregator(&paths, AggregatorConfig::default()).unwrap();

        assert_eq!(aggregator.catalog().len(), 2);
        assert!(aggregator.is_ranker_available());
    }

    #[test]
    fn test_missing_files_degrade_instead_of_failing() {
        let catalog = write_temp(CATALOG, ".json");
        let paths = ModelPaths {
            catalog: catalog.path().to_path_buf(),
            vectorizer: PathBuf::from("/nonexistent/vectorizer.json"),
        };
        let aggregator = load_aggregator(&paths, AggregatorConfig::default()).unwrap();
        assert!(!aggregator.is_ranker_available());

        let paths = ModelPaths {
            catalog: PathBuf::from("/nonexistent/catalog.json"),
            vectorizer: PathBuf::from("/nonexistent/vectorizer.json"),
        };
        let aggregator = load_aggregator(&paths, AggregatorConfig::default()).unwrap();
        assert!(!aggregator.is_ranker_available());
        assert_eq!(aggregator.catalog().len(), 0);
    }

    #[test]
    fn test_malformed_catalog_fails_startup() {
        let catalog = write_temp("[{\"name\": ", ".json");
        let vectorizer = write_temp(VECTORIZER, ".json");
        let paths = ModelPaths {
            catalog: catalog.path().to_path_buf(),
            vectorizer: vectorizer.path().to_path_buf(),
        };

        let Err(err) = load_aggregator(&paths, AggregatorConfig::default()) else {
            panic!("malformed catalog should fail startup");
        };
        assert!(err.to_string().contains("Failed to load catalog"));
    }

    #[test]
    fn test_limits_are_at_least_one() {
        let args = RankingArgs {
            per_query_limit: 0,
            result_limit: 0,
        };
        assert_eq!(
            args.to_config(),
            AggregatorConfig {
                per_query_limit: 1,
                result_limit: 1,
            }
        );
    }
}
