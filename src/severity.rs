//! Severity Classifier
//!
//! Priority order:
//! 1. Vision verdict `severe` -> severe
//! 2. Vision verdict `moderate` -> moderate
//! 3. Distinct request symptoms: <2 mild, 2-4 moderate, >4 severe
//!
//! A vision verdict of `mild` (or no vision at all) defers to the symptom count.

use serde::{Deserialize, Serialize};

use crate::types::{DiagnosisRequest, VisionResult, VisionSeverity};

const MODERATE_FROM: usize = 2;
const SEVERE_FROM: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityLevel {
    Mild,
    Moderate,
    Severe,
    Unknown,
}

/// Display hint for the caller's UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityColor {
    Green,
    Orange,
    Red,
    Gray,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityVerdict {
    pub level: SeverityLevel,
    pub message: String,
    pub color: SeverityColor,
}

impl SeverityVerdict {
    pub fn mild() -> Self {
        Self {
            level: SeverityLevel::Mild,
            message: "Early stage detected. Preventive action recommended.".to_string(),
            color: SeverityColor::Green,
        }
    }

    pub fn moderate() -> Self {
        Self {
            level: SeverityLevel::Moderate,
            message: "Active infection likely. Begin treatment immediately.".to_string(),
            color: SeverityColor::Orange,
        }
    }

    pub fn severe() -> Self {
        Self {
            level: SeverityLevel::Severe,
            message: "Severe infection. Immediate intervention required to save crop.".to_string(),
            color: SeverityColor::Red,
        }
    }

    /// Mild verdict used when the image shows a healthy plant
    pub fn healthy() -> Self {
        Self {
            message: "Plant appears healthy. Continue preventive care.".to_string(),
            ..Self::mild()
        }
    }

    /// No diagnosis possible; `message` explains why
    pub fn unknown(message: impl Into<String>) -> Self {
        Self {
            level: SeverityLevel::Unknown,
            message: message.into(),
            color: SeverityColor::Gray,
        }
    }

    fn from_symptom_count(count: usize) -> Self {
        if count < MODERATE_FROM {
            Self::mild()
        } else if count < SEVERE_FROM {
            Self::moderate()
        } else {
            Self::severe()
        }
    }
}

/// Derive the verdict for a diagnosis
pub fn classify(
    request: &DiagnosisRequest,
    candidate_count: usize,
    vision: Option<&VisionResult>,
) -> SeverityVerdict {
    let symptom_count = request.distinct_symptom_count();

    let verdict = match vision.map(|v| v.severity) {
        Some(VisionSeverity::Severe) => SeverityVerdict::severe(),
        Some(VisionSeverity::Moderate) => SeverityVerdict::moderate(),
        Some(VisionSeverity::Mild) | None => SeverityVerdict::from_symptom_count(symptom_count),
    };

    tracing::debug!(
        symptom_count,
        candidate_count,
        vision = vision.is_some(),
        level = ?verdict.level,
        "Classified severity"
    );

    verdict
}
