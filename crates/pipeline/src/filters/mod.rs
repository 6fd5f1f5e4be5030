//! Filter implementations for the ranking pipeline.

pub mod muscle_match;

pub use muscle_match::MuscleMatchFilter;
