//! Error types
//!
//! Not-found conditions are never errors; they are ordinary diagnosis results.
//! Vision failures are absorbed inside the adapter. What is left is the
//! knowledge base itself failing.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::{AilmentId, CropId};

#[derive(Error, Debug)]
pub enum KnowledgeBaseError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("ailment {ailment_id} references unknown crop {crop_id}")]
    UnknownCrop { ailment_id: AilmentId, crop_id: CropId },

    #[error("duplicate crop name '{0}'")]
    DuplicateCrop(String),

    #[error("knowledge base unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug)]
pub enum DiagnosisError {
    #[error(transparent)]
    KnowledgeBase(#[from] KnowledgeBaseError),
}
