//! Request-scoped types flowing through the pipeline.

use catalog::{ExerciseRecord, RowIndex};
use serde::{Deserialize, Serialize};

/// Preferences as submitted by the client.
///
/// Every field defaults to the empty string when missing. `muscle` is raw,
/// possibly comma-separated text; see [`crate::expander`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserPreferences {
    pub goal: String,
    pub experience: String,
    pub equipment: String,
    pub muscle: String,
}

/// One scoring query: the shared preferences plus a single muscle token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceQuery {
    pub goal: String,
    pub experience: String,
    pub equipment: String,
    /// Trimmed, non-empty
    pub muscle: String,
}

impl PreferenceQuery {
    /// Text handed to the embedder: goal, experience, equipment, muscle
    pub fn text(&self) -> String {
        format!(
            "{} {} {} {}",
            self.goal, self.experience, self.equipment, self.muscle
        )
    }
}

/// A catalog row with the similarity score it got for one query.
///
/// Borrows the record from the shared catalog; the catalog itself is never
/// copied or mutated.
#[derive(Debug, Clone)]
pub struct ScoredRecord<'a> {
    pub row: RowIndex,
    pub record: &'a ExerciseRecord,
    pub similarity_score: f32,
    /// Muscle token of the query that produced this score
    pub query_muscle: &'a str,
}

impl<'a> ScoredRecord<'a> {
    pub fn new(
        row: RowIndex,
        record: &'a ExerciseRecord,
        similarity_score: f32,
        query_muscle: &'a str,
    ) -> Self {
        Self {
            row,
            record,
            similarity_score,
            query_muscle,
        }
    }
}

/// Public shape of a recommended exercise. The score is not exposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseSummary {
    pub name: String,
    pub muscle: String,
    pub equipment: String,
    pub difficulty: String,
}

impl From<&ExerciseRecord> for ExerciseSummary {
    fn from(record: &ExerciseRecord) -> Self {
        Self {
            name: record.name.clone(),
            muscle: record.muscle.clone(),
            equipment: record.equipment.clone(),
            difficulty: record.difficulty.clone(),
        }
    }
}
