//! Crop Diagnosis Rust Implementation
//!
//! Rule-based crop ailment diagnosis with optional image classification.
//!
//! Pipeline (each stage depends only on the ones before it):
//! - `resolver`: free-text crop name → canonical crop
//! - `scoring/`: weighted rule evaluation, one file per rule family
//! - `vision/`: external image classifier and score fusion
//! - `severity`: tiered severity verdict
//! - `composer`: ranking, truncation and response shapes
//!
//! `engine` wires the stages together against an injected `knowledge_base`.

pub mod composer;
pub mod config;
pub mod engine;
pub mod error;
pub mod knowledge_base;
pub mod resolver;
pub mod scoring;
pub mod severity;
pub mod types;
pub mod utils;
pub mod vision;

#[cfg(feature = "api")]
pub mod api_server;

// Re-export commonly used types
pub use composer::{DiagnosisResult, FormattedMatch, ImageAnalysis};
pub use config::{Config, VisionConfig};
pub use engine::DiagnosisEngine;
pub use error::{DiagnosisError, KnowledgeBaseError};
pub use knowledge_base::{CatalogueEntry, InMemoryKnowledgeBase, KnowledgeBase};
pub use scoring::{ScoreBreakdown, ScoredCandidate};
pub use severity::{SeverityColor, SeverityLevel, SeverityVerdict};
pub use types::*;
pub use vision::{DisabledClassifier, GeminiClassifier, VisionClassifier};

#[cfg(feature = "api")]
pub use api_server::{create_router, AppState};
