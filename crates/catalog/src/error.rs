//! Error types for the catalog crate.

use thiserror::Error;

/// Errors that can occur while loading and validating the exercise catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    /// File could not be found
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// A record in the catalog file couldn't be decoded
    ///
    /// `line` is 1-based for JSON Lines files; for JSON array files it is the
    /// line reported by the decoder.
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// A record field had an invalid value
    #[error("Invalid value for {field} in row {row}: {value}")]
    InvalidValue {
        field: String,
        row: usize,
        value: String,
    },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CatalogError::ParseError {
            file: "catalog.jsonl".to_string(),
            line: 7,
            reason: "missing field `name`".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Parse error at line 7 in catalog.jsonl: missing field `name`"
        );

        let err = CatalogError::InvalidValue {
            field: "name".to_string(),
            row: 3,
            value: "\"\"".to_string(),
        };
        assert!(err.to_string().contains("row 3"));
    }
}
