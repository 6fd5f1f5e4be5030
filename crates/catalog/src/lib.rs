//! # Catalog Crate
//!
//! In-memory store for the fixed set of exercises the recommender draws from.
//!
//! ## Main Components
//!
//! - **types**: `ExerciseRecord` and the ordered `Catalog` table
//! - **parser**: JSON / JSON Lines catalog files
//! - **load**: file loading and validation
//! - **error**: error types for catalog loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use catalog::Catalog;
//! use std::path::Path;
//!
//! let catalog = Catalog::load_from_file(Path::new("data/catalog.json"))?;
//! for (row, record) in catalog.search("chest") {
//!     println!("{row}: {} ({})", record.name, record.equipment);
//! }
//! ```

pub mod error;
pub mod types;
pub mod parser;
pub mod load;

pub use error::{CatalogError, Result};
pub use types::{Catalog, ExerciseRecord, FeatureSource, RowIndex};
