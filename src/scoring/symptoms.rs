//! Symptom phrase matching
//!
//! Every request symptom earns points when some symptom phrase of the ailment
//! contains it (case-insensitive). Repeats count again; blank phrases never match.

use crate::types::{AilmentRecord, DiagnosisRequest};

pub const SYMPTOM_POINTS: u32 = 3;

/// Points from symptom phrases, plus the request phrases that matched
pub fn symptom_points(ailment: &AilmentRecord, request: &DiagnosisRequest) -> (u32, Vec<String>) {
    let ailment_symptoms: Vec<String> = ailment.symptoms.iter().map(|s| s.to_lowercase()).collect();

    let mut matched: Vec<String> = Vec::new();

    for phrase in &request.symptoms {
        let needle = phrase.trim().to_lowercase();
        if needle.is_empty() {
            continue;
        }

        if ailment_symptoms.iter().any(|s| s.contains(&needle)) {
            matched.push(phrase.trim().to_string());
        }
    }

    (matched.len() as u32 * SYMPTOM_POINTS, matched)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blight() -> AilmentRecord {
        let mut ailment = AilmentRecord::new(1, 1, "Late Blight");
        ailment.symptoms = vec![
            "Dark water-soaked lesions on leaves".to_string(),
            "White fungal growth on leaf underside".to_string(),
        ];
        ailment
    }

    #[test]
    fn test_each_matching_phrase_scores() {
        let request = DiagnosisRequest::for_crop("Tomato")
            .with_symptoms(["water-soaked", "LEAF UNDERSIDE", "holes in fruit"]);

        let (points, matched) = symptom_points(&blight(), &request);
        assert_eq!(points, 6);
        assert_eq!(matched, vec!["water-soaked", "LEAF UNDERSIDE"]);
    }

    #[test]
    fn test_repeated_phrases_count_each_time() {
        let request = DiagnosisRequest::for_crop("Tomato").with_symptoms(["lesions", "Lesions "]);

        let (points, matched) = symptom_points(&blight(), &request);
        assert_eq!(points, 6);
        assert_eq!(matched, vec!["lesions", "Lesions"]);
    }

    #[test]
    fn test_blank_phrases_ignored() {
        let request = DiagnosisRequest::for_crop("Tomato").with_symptoms(["lesions", "", "   "]);

        let (points, matched) = symptom_points(&blight(), &request);
        assert_eq!(points, 3);
        assert_eq!(matched.len(), 1);
    }

    #[test]
    fn test_no_symptoms_no_points() {
        let request = DiagnosisRequest::for_crop("Tomato");
        assert_eq!(symptom_points(&blight(), &request).0, 0);
    }
}
