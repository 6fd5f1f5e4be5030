//! Loading and validating a catalog from disk.

use crate::error::{CatalogError, Result};
use crate::parser;
use crate::types::*;
use std::path::Path;
use tracing::info;

impl Catalog {
    /// Load the exercise catalog from a file
    ///
    /// Steps:
    /// 1. Pick the parser from the file extension (`.jsonl` or JSON array)
    /// 2. Build the catalog in file order
    /// 3. Validate every record
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading exercise catalog from {}", path.display());

        let is_json_lines = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("jsonl"))
            .unwrap_or(false);

        let records = if is_json_lines {
            parser::parse_json_lines(path)?
        } else {
            parser::parse_json_array(path)?
        };

        let catalog = Catalog::from_records(records);
        catalog.validate()?;

        info!(
            "Loaded {} exercises (feature source: {:?})",
            catalog.len(),
            catalog.feature_source()
        );
        Ok(catalog)
    }

    /// Validate record integrity
    ///
    /// Checks that:
    /// - every name is non-empty after trimming
    /// - every precomputed feature value is finite
    ///
    /// Dimension agreement is not checked here; a catalog whose vectors
    /// disagree still loads and the ranker refuses to build from it.
    pub fn validate(&self) -> Result<()> {
        for (row, record) in self.records.iter().enumerate() {
            if record.name.trim().is_empty() {
                return Err(CatalogError::InvalidValue {
                    field: "name".to_string(),
                    row,
                    value: format!("{:?}", record.name),
                });
            }
            if let Some(vector) = &record.feature_vector {
                if let Some(bad) = vector.iter().find(|v| !v.is_finite()) {
                    return Err(CatalogError::InvalidValue {
                        field: "feature_vector".to_string(),
                        row,
                        value: bad.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}
