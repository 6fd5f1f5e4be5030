//! Muscle-query expansion.
//!
//! A request may name several muscles ("chest, back"). Each one becomes an
//! independent scoring query sharing the same goal, experience and equipment.

use crate::types::{PreferenceQuery, UserPreferences};
use std::collections::HashSet;

/// Split a raw muscle field into distinct, trimmed, non-empty tokens.
///
/// Order follows first appearance in the input.
pub fn split_muscles(raw: &str) -> Vec<&str> {
    let mut seen = HashSet::new();
    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .filter(|token| seen.insert(*token))
        .collect()
}

/// One [`PreferenceQuery`] per muscle token; empty when no token survives.
pub fn expand_queries(preferences: &UserPreferences) -> Vec<PreferenceQuery> {
    split_muscles(&preferences.muscle)
        .into_iter()
        .map(|muscle| PreferenceQuery {
            goal: preferences.goal.clone(),
            experience: preferences.experience.clone(),
            equipment: preferences.equipment.clone(),
            muscle: muscle.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefs(muscle: &str) -> UserPreferences {
        UserPreferences {
            goal: "strength".to_string(),
            experience: "beginner".to_string(),
            equipment: "dumbbell".to_string(),
            muscle: muscle.to_string(),
        }
    }

    #[test]
    fn test_blank_input_yields_no_queries() {
        for raw in ["", "   ", ",", " , ,, ", "\t,\n"] {
            assert!(expand_queries(&prefs(raw)).is_empty(), "input {raw:?}");
        }
    }

    #[test]
    fn test_tokens_are_trimmed_and_ordered() {
        let queries = expand_queries(&prefs(" chest,, back ,shoulders"));
        let muscles: Vec<&str> = queries.iter().map(|q| q.muscle.as_str()).collect();

        assert_eq!(muscles, vec!["chest", "back", "shoulders"]);
        assert_eq!(queries[1].text(), "strength beginner dumbbell back");
    }

    #[test]
    fn test_repeated_tokens_keep_first_position() {
        assert_eq!(split_muscles("back, chest, back"), vec!["back", "chest"]);
    }

    #[test]
    fn test_shared_fields_copied_into_every_query() {
        let queries = expand_queries(&prefs("chest, back"));
        assert!(queries.iter().all(|q| q.goal == "strength"
            && q.experience == "beginner"
            && q.equipment == "dumbbell"));
    }

    #[test]
    fn test_empty_shared_fields_keep_spacing() {
        let queries = expand_queries(&UserPreferences {
            muscle: "legs".to_string(),
            ..Default::default()
        });
        assert_eq!(queries[0].text(), "   legs");
    }
}
