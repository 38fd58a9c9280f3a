//! Result Composer
//!
//! Ranks scored candidates and shapes every response variant:
//!
//! - ranked matches (top 3, score > 0) with optional image analysis
//! - vision only, when the knowledge base has nothing usable but the image does
//! - healthy, when the image shows a healthy plant
//! - crop not found / no known ailments (`unknown` severity, gray)

use serde::Serialize;

use crate::scoring::{ScoreBreakdown, ScoredCandidate};
use crate::severity::SeverityVerdict;
use crate::types::{AilmentId, CropRecord, PathogenType, PlantPart, VisionResult};
use crate::utils::get_display_name;

pub const MAX_MATCHES: usize = 3;
pub const MAX_CROP_HINTS: usize = 10;

pub const RULE_BASED_DISCLAIMER: &str =
    "This is a rule-based assessment. For severe infections, consult your local Krishi Vigyan Kendra (KVK).";
pub const AI_ASSISTED_DISCLAIMER: &str = "This assessment combines AI image analysis with rule-based matching. \
     For severe infections, consult your local Krishi Vigyan Kendra (KVK).";
pub const NO_DATA_DISCLAIMER: &str =
    "This is a rule-based assessment. For accurate diagnosis, consult your local Krishi Vigyan Kendra (KVK).";

/// Engine output
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisResult {
    /// Resolved crop (or the image's crop guess)
    pub crop_name: Option<String>,
    pub top_matches: Vec<FormattedMatch>,
    pub image_analysis: Option<ImageAnalysis>,
    pub severity: SeverityVerdict,
    pub disclaimer: String,
    pub message: Option<String>,
    pub ai_assisted: bool,
}

/// Ranked match with the ailment's advice denormalized in
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedMatch {
    pub id: AilmentId,
    pub name: String,
    pub name_localized: Option<String>,
    pub display_name: String,
    pub crop_name: String,
    pub score: u32,
    pub confidence: u8,
    pub pathogen_type: PathogenType,
    pub symptoms: Vec<String>,
    pub treatment: Vec<String>,
    pub prevention: Vec<String>,
    pub organic_treatment: Vec<String>,
    pub severity_levels: Vec<String>,
    pub affected_part: Option<PlantPart>,
    pub breakdown: ScoreBreakdown,
}

impl FormattedMatch {
    fn from_candidate(candidate: ScoredCandidate, crop: &CropRecord) -> Self {
        let ailment = candidate.ailment;
        Self {
            id: ailment.id,
            display_name: get_display_name(&ailment.name, ailment.name_localized.as_deref()),
            name: ailment.name,
            name_localized: ailment.name_localized,
            crop_name: crop.name.clone(),
            score: candidate.score,
            confidence: candidate.confidence,
            pathogen_type: ailment.pathogen_type,
            symptoms: ailment.symptoms,
            treatment: ailment.treatment,
            prevention: ailment.prevention,
            organic_treatment: ailment.organic_treatment,
            severity_levels: ailment.severity_levels,
            affected_part: ailment.affected_part,
            breakdown: candidate.breakdown,
        }
    }
}

/// Image verdict as reported to the caller
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAnalysis {
    #[serde(flatten)]
    pub verdict: VisionResult,
    /// Rule-based candidates that earned the vision bonus
    pub corroborated_matches: usize,
}

impl ImageAnalysis {
    pub fn new(verdict: VisionResult, corroborated_matches: usize) -> Self {
        Self {
            verdict,
            corroborated_matches,
        }
    }
}

/// Stable sort by descending score, drop zero scores, keep the top 3
pub fn rank(mut candidates: Vec<ScoredCandidate>) -> Vec<ScoredCandidate> {
    candidates.sort_by(|a, b| b.score.cmp(&a.score));
    candidates
        .into_iter()
        .filter(|c| c.score > 0)
        .take(MAX_MATCHES)
        .collect()
}

/// Assemble the result for a resolved crop that has ailments
///
/// Falls back to the vision-only shape when no candidate scored but an
/// image verdict exists.
pub fn compose(
    candidates: Vec<ScoredCandidate>,
    crop: &CropRecord,
    vision: Option<VisionResult>,
    corroborated: usize,
    severity: SeverityVerdict,
) -> DiagnosisResult {
    let ranked = rank(candidates);

    if ranked.is_empty() {
        if let Some(verdict) = vision {
            return vision_only(Some(crop), verdict, severity);
        }
    }

    let message = ranked
        .is_empty()
        .then(|| format!("No matching diseases found for {}. Try adding more symptoms.", crop.name));

    let ai_assisted = vision.is_some();
    DiagnosisResult {
        crop_name: Some(crop.name.clone()),
        top_matches: ranked
            .into_iter()
            .map(|c| FormattedMatch::from_candidate(c, crop))
            .collect(),
        image_analysis: vision.map(|v| ImageAnalysis::new(v, corroborated)),
        severity,
        disclaimer: disclaimer_for(ai_assisted).to_string(),
        message,
        ai_assisted,
    }
}

/// Image verdict substitutes for the (empty) match list
pub fn vision_only(crop: Option<&CropRecord>, verdict: VisionResult, severity: SeverityVerdict) -> DiagnosisResult {
    let crop_name = crop.map(|c| c.name.clone()).unwrap_or_else(|| verdict.crop_name.clone());
    let message = format!(
        "No rule-based matches for {}. Showing AI image analysis: {}.",
        crop_name, verdict.disease_name
    );

    DiagnosisResult {
        crop_name: Some(crop_name),
        top_matches: Vec::new(),
        image_analysis: Some(ImageAnalysis::new(verdict, 0)),
        severity,
        disclaimer: AI_ASSISTED_DISCLAIMER.to_string(),
        message: Some(message),
        ai_assisted: true,
    }
}

/// Healthy short-circuit
pub fn healthy(crop_name: String, verdict: VisionResult) -> DiagnosisResult {
    DiagnosisResult {
        crop_name: Some(crop_name),
        top_matches: Vec::new(),
        image_analysis: Some(ImageAnalysis::new(verdict, 0)),
        severity: SeverityVerdict::healthy(),
        disclaimer: AI_ASSISTED_DISCLAIMER.to_string(),
        message: Some("No disease detected in the image.".to_string()),
        ai_assisted: true,
    }
}

/// Input did not resolve to any crop; hints at up to ten known names
pub fn crop_not_found(input: Option<&str>, known_crops: &[String]) -> DiagnosisResult {
    let hint = known_crops
        .iter()
        .take(MAX_CROP_HINTS)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    let message = match input {
        Some(name) => format!("Crop '{}' not found in our database. Available crops include: {}", name, hint),
        None => format!("No crop name provided. Available crops include: {}", hint),
    };

    no_data(None, message)
}

/// Crop resolved but the knowledge base holds no ailments for it
pub fn no_ailments(crop: &CropRecord) -> DiagnosisResult {
    let message = format!("No diseases found for {} in our database.", crop.name);
    no_data(Some(crop.name.clone()), message)
}

fn no_data(crop_name: Option<String>, message: String) -> DiagnosisResult {
    DiagnosisResult {
        crop_name,
        top_matches: Vec::new(),
        image_analysis: None,
        severity: SeverityVerdict::unknown(message.clone()),
        disclaimer: NO_DATA_DISCLAIMER.to_string(),
        message: Some(message),
        ai_assisted: false,
    }
}

fn disclaimer_for(ai_assisted: bool) -> &'static str {
    if ai_assisted {
        AI_ASSISTED_DISCLAIMER
    } else {
        RULE_BASED_DISCLAIMER
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::severity::{SeverityColor, SeverityLevel};
    use crate::types::AilmentRecord;

    fn tomato() -> CropRecord {
        CropRecord::new(1, "Tomato").with_localized_name("टमाटर")
    }

    fn candidate(id: u32, name: &str, score: u32) -> ScoredCandidate {
        ScoredCandidate {
            ailment: AilmentRecord::new(id, 1, name),
            score,
            confidence: 0,
            breakdown: ScoreBreakdown {
                symptoms: score,
                ..ScoreBreakdown::default()
            },
        }
    }

    #[test]
    fn test_rank_sorts_filters_and_truncates() {
        let ranked = rank(vec![
            candidate(1, "A", 3),
            candidate(2, "B", 0),
            candidate(3, "C", 7),
            candidate(4, "D", 3),
            candidate(5, "E", 5),
        ]);
        let names: Vec<&str> = ranked.iter().map(|c| c.ailment.name.as_str()).collect();
        assert_eq!(names, vec!["C", "E", "A"]);
    }

    #[test]
    fn test_rank_ties_keep_input_order() {
        let ranked = rank(vec![candidate(1, "First", 3), candidate(2, "Second", 3)]);
        assert_eq!(ranked[0].ailment.name, "First");
        assert_eq!(ranked[1].ailment.name, "Second");
    }

    #[test]
    fn test_rank_filters_before_truncating() {
        let ranked = rank(vec![
            candidate(1, "A", 0),
            candidate(2, "B", 0),
            candidate(3, "C", 0),
            candidate(4, "D", 2),
        ]);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].ailment.name, "D");
    }

    #[test]
    fn test_compose_rule_based() {
        let result = compose(
            vec![candidate(1, "Late Blight", 6)],
            &tomato(),
            None,
            0,
            SeverityVerdict::moderate(),
        );
        assert_eq!(result.top_matches.len(), 1);
        assert_eq!(result.top_matches[0].crop_name, "Tomato");
        assert_eq!(result.top_matches[0].display_name, "Late Blight");
        assert!(result.image_analysis.is_none());
        assert!(!result.ai_assisted);
        assert_eq!(result.disclaimer, RULE_BASED_DISCLAIMER);
        assert!(result.message.is_none());
    }

    #[test]
    fn test_compose_without_scoring_candidates() {
        let result = compose(vec![candidate(1, "Late Blight", 0)], &tomato(), None, 0, SeverityVerdict::mild());
        assert!(result.top_matches.is_empty());
        assert_eq!(result.severity.level, SeverityLevel::Mild);
        assert!(result.message.unwrap().contains("Tomato"));
    }

    #[test]
    fn test_compose_falls_back_to_vision_only() {
        let verdict = VisionResult::diseased("Bacterial Spot", "Tomato");
        let result = compose(
            vec![candidate(1, "Late Blight", 0)],
            &tomato(),
            Some(verdict),
            0,
            SeverityVerdict::moderate(),
        );
        assert!(result.top_matches.is_empty());
        assert_eq!(result.image_analysis.unwrap().verdict.disease_name, "Bacterial Spot");
        assert!(result.ai_assisted);
        assert_eq!(result.disclaimer, AI_ASSISTED_DISCLAIMER);
    }

    #[test]
    fn test_compose_with_vision_uses_ai_disclaimer() {
        let verdict = VisionResult::diseased("Late Blight", "Tomato");
        let result = compose(
            vec![candidate(1, "Late Blight", 8)],
            &tomato(),
            Some(verdict),
            1,
            SeverityVerdict::moderate(),
        );
        assert_eq!(result.top_matches.len(), 1);
        assert_eq!(result.image_analysis.unwrap().corroborated_matches, 1);
        assert_eq!(result.disclaimer, AI_ASSISTED_DISCLAIMER);
    }

    #[test]
    fn test_crop_not_found_hint_is_capped() {
        let names: Vec<String> = (1..=15).map(|i| format!("Crop{}", i)).collect();
        let result = crop_not_found(Some("Dragonfruit"), &names);

        let message = result.message.unwrap();
        assert!(message.contains("Dragonfruit"));
        assert!(message.contains("Crop10"));
        assert!(!message.contains("Crop11"));
        assert_eq!(result.severity.level, SeverityLevel::Unknown);
        assert_eq!(result.severity.color, SeverityColor::Gray);
        assert!(result.top_matches.is_empty());
    }

    #[test]
    fn test_no_ailments_names_crop() {
        let result = no_ailments(&CropRecord::new(9, "Jute"));
        assert!(result.message.unwrap().contains("Jute"));
        assert_eq!(result.severity.level, SeverityLevel::Unknown);
        assert_eq!(result.crop_name.as_deref(), Some("Jute"));
    }

    #[test]
    fn test_healthy_shape() {
        let result = healthy("Rice".to_string(), VisionResult::healthy("Rice"));
        assert!(result.top_matches.is_empty());
        assert_eq!(result.severity, SeverityVerdict::healthy());
        assert!(result.image_analysis.unwrap().verdict.healthy);
    }

    #[test]
    fn test_wire_format_is_camel_case() {
        let result = compose(vec![candidate(1, "Late Blight", 6)], &tomato(), None, 0, SeverityVerdict::mild());
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("topMatches").is_some());
        assert!(json.get("aiAssisted").is_some());
        assert_eq!(json["severity"]["color"], "green");
        assert_eq!(json["topMatches"][0]["breakdown"]["symptoms"], 6);
    }
}
