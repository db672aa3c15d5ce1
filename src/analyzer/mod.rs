// Analyzer module: folds extracted symbols into the per-symbol mention index.

pub mod mention_index;

// Re-export the main types for ease of use.
pub use mention_index::{MentionIndex, aggregate};
