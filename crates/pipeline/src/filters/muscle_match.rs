//! Filter to keep exercises that work the queried muscle.
//!
//! When nothing in the catalog mentions the muscle, the unfiltered rows are
//! kept so the query still contributes its closest matches.

use crate::error::Result;
use crate::traits::Filter;
use crate::types::{PreferenceQuery, ScoredRecord};
use tracing::debug;

/// Keeps rows whose `muscle` field contains the query's muscle token
/// (case-insensitive substring), falling back to all rows when none match.
pub struct MuscleMatchFilter;

impl Filter for MuscleMatchFilter {
    fn name(&self) -> &str {
        "MuscleMatchFilter"
    }

    fn apply<'a>(
        &self,
        candidates: Vec<ScoredRecord<'a>>,
        query: &PreferenceQuery,
    ) -> Result<Vec<ScoredRecord<'a>>> {
        let matches = |candidate: &ScoredRecord<'_>| candidate.record.targets_muscle(&query.muscle);

        if !candidates.iter().any(matches) {
            debug!(
                "No exercise targets {:?}; keeping all {} rows",
                query.muscle,
                candidates.len()
            );
            return Ok(candidates);
        }

        Ok(candidates.into_iter().filter(|c| matches(c)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::ExerciseRecord;

    fn query(muscle: &str) -> PreferenceQuery {
        PreferenceQuery {
            goal: String::new(),
            experience: String::new(),
            equipment: String::new(),
            muscle: muscle.to_string(),
        }
    }

    fn records() -> Vec<ExerciseRecord> {
        vec![
            ExerciseRecord::new("Bench Press", "Chest, Triceps", "Barbell", "Intermediate"),
            ExerciseRecord::new("Pull-up", "Lats", "Body Only", "Intermediate"),
            ExerciseRecord::new("Cable Fly", "CHEST", "Cable", "Beginner"),
        ]
    }

    fn scored<'a>(records: &'a [ExerciseRecord], muscle: &'a str) -> Vec<ScoredRecord<'a>> {
        records
            .iter()
            .enumerate()
            .map(|(row, r)| ScoredRecord::new(row, r, 0.5, muscle))
            .collect()
    }

    #[test]
    fn test_keeps_matching_rows_case_insensitive() {
        let records = records();
        let filtered = MuscleMatchFilter
            .apply(scored(&records, "Chest"), &query("Chest"))
            .unwrap();

        let rows: Vec<usize> = filtered.iter().map(|c| c.row).collect();
        assert_eq!(rows, vec![0, 2]);
    }

    #[test]
    fn test_substring_match() {
        let records = records();
        let filtered = MuscleMatchFilter
            .apply(scored(&records, "tricep"), &query("tricep"))
            .unwrap();

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].record.name, "Bench Press");
    }

    #[test]
    fn test_falls_back_to_all_rows_when_nothing_matches() {
        let records = records();
        let filtered = MuscleMatchFilter
            .apply(scored(&records, "calves"), &query("calves"))
            .unwrap();

        let rows: Vec<usize> = filtered.iter().map(|c| c.row).collect();
        assert_eq!(rows, vec![0, 1, 2]);
    }

    #[test]
    fn test_empty_input_stays_empty() {
        let filtered = MuscleMatchFilter.apply(Vec::new(), &query("chest")).unwrap();
        assert!(filtered.is_empty());
    }
}
