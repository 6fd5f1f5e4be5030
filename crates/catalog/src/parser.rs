//! Parsers for catalog files.
//!
//! Two layouts are accepted:
//! - `.jsonl`: one exercise object per line, blank lines ignored
//! - anything else: a single JSON array of exercise objects
//!
//! Missing optional fields default to empty strings; see [`ExerciseRecord`].

use crate::error::{CatalogError, Result};
use crate::types::ExerciseRecord;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Read a whole file, reporting a missing file as [`CatalogError::FileNotFound`]
fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => CatalogError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => CatalogError::IoError(e),
    })
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Parse a JSON Lines catalog
///
/// Format: `{"name": "...", "muscle": "...", ...}` per line
pub fn parse_json_lines(path: &Path) -> Result<Vec<ExerciseRecord>> {
    let content = read_file(path)?;
    parse_json_lines_str(&content, &file_label(path))
}

pub(crate) fn parse_json_lines_str(content: &str, file: &str) -> Result<Vec<ExerciseRecord>> {
    let mut records = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line_trimmed = line.trim();
        if line_trimmed.is_empty() {
            continue;
        }

        let record: ExerciseRecord =
            serde_json::from_str(line_trimmed).map_err(|e| CatalogError::ParseError {
                file: file.to_string(),
                line: line_no,
                reason: e.to_string(),
            })?;
        records.push(record);
    }

    Ok(records)
}

/// Parse a catalog stored as one JSON array
pub fn parse_json_array(path: &Path) -> Result<Vec<ExerciseRecord>> {
    let content = read_file(path)?;
    parse_json_array_str(&content, &file_label(path))
}

pub(crate) fn parse_json_array_str(content: &str, file: &str) -> Result<Vec<ExerciseRecord>> {
    serde_json::from_str(content).map_err(|e| CatalogError::ParseError {
        file: file.to_string(),
        line: e.line(),
        reason: e.to_string(),
    })
}
