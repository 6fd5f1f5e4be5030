//! Core domain types for the exercise catalog.
//!
//! The catalog is an ordered table: row indices are stable for the lifetime of
//! the process and are what the ranker's feature matrix is aligned against.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;

// =============================================================================
// Type Aliases
// =============================================================================

/// Position of a record inside the catalog (0-based, load order)
pub type RowIndex = usize;

// =============================================================================
// Exercise Record
// =============================================================================

/// A single exercise as loaded from the catalog file.
///
/// `muscle` is free text and may list several muscles
/// (e.g. "Chest, Triceps"), so membership checks are substring based.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseRecord {
    pub name: String,
    #[serde(default, deserialize_with = "string_or_null")]
    pub muscle: String,
    #[serde(default, deserialize_with = "string_or_null")]
    pub equipment: String,
    #[serde(default, deserialize_with = "string_or_null")]
    pub difficulty: String,
    /// Precomputed embedding of the exercise description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_vector: Option<Vec<f32>>,
    /// Raw descriptive text the embedder can turn into a feature vector
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combined_features: Option<String>,
}

impl ExerciseRecord {
    pub fn new(
        name: impl Into<String>,
        muscle: impl Into<String>,
        equipment: impl Into<String>,
        difficulty: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            muscle: muscle.into(),
            equipment: equipment.into(),
            difficulty: difficulty.into(),
            feature_vector: None,
            combined_features: None,
        }
    }

    pub fn with_feature_vector(mut self, vector: Vec<f32>) -> Self {
        self.feature_vector = Some(vector);
        self
    }

    pub fn with_combined_features(mut self, text: impl Into<String>) -> Self {
        self.combined_features = Some(text.into());
        self
    }

    /// Case-insensitive substring match of `token` against the muscle field.
    pub fn targets_muscle(&self, token: &str) -> bool {
        self.muscle.to_lowercase().contains(&token.to_lowercase())
    }
}

fn string_or_null<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

// =============================================================================
// Feature source detection
// =============================================================================

/// Where the feature matrix for this catalog can come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureSource {
    /// Every record carries a `feature_vector`
    Precomputed,
    /// Every record carries `combined_features` text to embed
    RawText,
    /// Neither column is complete; no feature matrix can be built
    Missing,
}

// =============================================================================
// Catalog - the in-memory exercise table
// =============================================================================

/// Ordered, immutable-after-load table of exercises.
///
/// Shared read-only behind an `Arc` once the service starts; nothing in the
/// request path takes `&mut Catalog`.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub(crate) records: Vec<ExerciseRecord>,
}

impl Catalog {
    /// Creates a new, empty Catalog
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    pub fn from_records(records: Vec<ExerciseRecord>) -> Self {
        Self { records }
    }

    /// Append a record; its row index is the previous length
    pub fn insert_record(&mut self, record: ExerciseRecord) -> RowIndex {
        self.records.push(record);
        self.records.len() - 1
    }

    pub fn get(&self, row: RowIndex) -> Option<&ExerciseRecord> {
        self.records.get(row)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in row order
    pub fn records(&self) -> &[ExerciseRecord] {
        &self.records
    }

    /// Case-insensitive exact lookup by name; first row wins on duplicates
    pub fn find_by_name(&self, name: &str) -> Option<(RowIndex, &ExerciseRecord)> {
        let wanted = name.trim().to_lowercase();
        self.records
            .iter()
            .enumerate()
            .find(|(_, record)| record.name.to_lowercase() == wanted)
    }

    /// Case-insensitive substring search over name and muscle, in row order
    pub fn search(&self, text: &str) -> Vec<(RowIndex, &ExerciseRecord)> {
        let needle = text.trim().to_lowercase();
        self.records
            .iter()
            .enumerate()
            .filter(|(_, record)| {
                record.name.to_lowercase().contains(&needle)
                    || record.muscle.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Distinct muscle tags across the catalog, lowercased and sorted.
    ///
    /// The muscle field is split on `,` and `/`.
    pub fn muscle_tags(&self) -> Vec<String> {
        let tags: BTreeSet<String> = self
            .records
            .iter()
            .flat_map(|record| record.muscle.split([',', '/']))
            .map(|tag| tag.trim().to_lowercase())
            .filter(|tag| !tag.is_empty())
            .collect();
        tags.into_iter().collect()
    }

    pub fn feature_source(&self) -> FeatureSource {
        if self.records.iter().all(|r| r.feature_vector.is_some()) {
            FeatureSource::Precomputed
        } else if self.records.iter().all(|r| r.combined_features.is_some()) {
            FeatureSource::RawText
        } else {
            FeatureSource::Missing
        }
    }
}
