//! Ailment Scorer
//!
//! Scores every candidate ailment of a crop against the request. Rules are
//! independent and additive (no rule switches another off), so scores are never
//! negative:
//!
//! - `symptoms`: +3 per request symptom found in the ailment's symptom phrases
//! - `indicators`: +2 affected part, +2 spot colour, +1 spot shape
//! - `pathogen`: +2 fungal growth & fungal, +1 no growth & viral/bacterial
//! - `conditions`: +1 when recent weather suits the ailment
//!
//! The vision bonus (+5) is added later by the fusion step.

pub mod conditions;
pub mod indicators;
pub mod pathogen;
pub mod symptoms;

use serde::Serialize;

use crate::types::{AilmentRecord, DiagnosisRequest};
use crate::utils::{confidence_percent, ScoreCeiling};

pub use conditions::weather_points;
pub use indicators::{affected_part_points, spot_color_points, spot_shape_points};
pub use pathogen::pathogen_points;
pub use symptoms::symptom_points;

/// Points earned per rule family
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub symptoms: u32,
    pub affected_part: u32,
    pub spot_color: u32,
    pub spot_shape: u32,
    pub pathogen: u32,
    pub weather: u32,
    /// Added by vision fusion
    pub vision: u32,
    /// Request symptoms that matched this ailment
    pub matched_symptoms: Vec<String>,
}

impl ScoreBreakdown {
    pub fn total(&self) -> u32 {
        self.symptoms
            + self.affected_part
            + self.spot_color
            + self.spot_shape
            + self.pathogen
            + self.weather
            + self.vision
    }
}

/// Candidate ailment with its accumulated score
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub ailment: AilmentRecord,
    pub score: u32,
    /// 0-99
    pub confidence: u8,
    pub breakdown: ScoreBreakdown,
}

impl ScoredCandidate {
    /// Re-derive score and confidence from the breakdown
    pub fn refresh(&mut self, ceiling: ScoreCeiling) {
        self.score = self.breakdown.total();
        self.confidence = confidence_percent(self.score, ceiling);
    }
}

/// Rule points for one ailment
pub fn score_ailment(ailment: &AilmentRecord, request: &DiagnosisRequest) -> ScoreBreakdown {
    let (symptoms, matched_symptoms) = symptom_points(ailment, request);

    ScoreBreakdown {
        symptoms,
        affected_part: affected_part_points(ailment, request),
        spot_color: spot_color_points(ailment, request),
        spot_shape: spot_shape_points(ailment, request),
        pathogen: pathogen_points(ailment, request),
        weather: weather_points(ailment, request),
        vision: 0,
        matched_symptoms,
    }
}

/// One candidate per ailment, in input order (unsorted)
///
/// Confidence is normalized against the rule-table ceiling; fusion re-derives
/// it against the wider ceiling when an image verdict is present.
pub fn score(ailments: &[AilmentRecord], request: &DiagnosisRequest) -> Vec<ScoredCandidate> {
    ailments
        .iter()
        .map(|ailment| {
            let mut candidate = ScoredCandidate {
                ailment: ailment.clone(),
                score: 0,
                confidence: 0,
                breakdown: score_ailment(ailment, request),
            };
            candidate.refresh(ScoreCeiling::Base);
            tracing::debug!(
                ailment = %candidate.ailment.name,
                score = candidate.score,
                confidence = candidate.confidence,
                "Scored candidate"
            );
            candidate
        })
        .collect()
}
