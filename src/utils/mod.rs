//! Utility modules for diagnosis
//!
//! Contains shared functionality used across the pipeline:
//! - Edit distance: approximate crop name matching
//! - Normalization: score to confidence conversion
//! - Vernacular: canonical + localized display names

pub mod edit_distance;
pub mod normalization;
pub mod vernacular;

// Re-export commonly used items
pub use edit_distance::levenshtein;
pub use normalization::{confidence_percent, clamp_confidence, ScoreCeiling};
pub use vernacular::get_display_name;
