//! Core traits for the filtering pipeline.
//!
//! This module defines the Filter trait that allows composable,
//! extensible filters to be applied to a query's scored rows.

use crate::error::Result;
use crate::types::{PreferenceQuery, ScoredRecord};

/// Core trait for filtering scored catalog rows.
///
/// ## Design Note
/// - `Send + Sync` allows filters to be shared across request threads
/// - Filters take ownership of the Vec and return a filtered Vec
/// - Relative order of the rows that survive must be preserved
pub trait Filter: Send + Sync {
    /// Returns the name of this filter (for logging/debugging)
    fn name(&self) -> &str;

    /// Apply this filter to the rows scored for one query.
    ///
    /// # Arguments
    /// * `candidates` - The scored rows (takes ownership)
    /// * `query` - The query the rows were scored against
    fn apply<'a>(
        &self,
        candidates: Vec<ScoredRecord<'a>>,
        query: &PreferenceQuery,
    ) -> Result<Vec<ScoredRecord<'a>>>;
}
