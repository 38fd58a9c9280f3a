//! Fusion of an image verdict into rule-based scores
//!
//! A candidate whose name and the vision disease guess contain one another
//! (case-insensitive) earns the vision bonus. Every candidate is then
//! re-normalized against the fused ceiling so confidences stay comparable
//! whether or not a particular candidate was boosted.

use crate::scoring::ScoredCandidate;
use crate::types::VisionResult;
use crate::utils::normalization::{ScoreCeiling, VISION_BONUS};

/// Substring relation in either direction; blank names relate to nothing
pub fn names_related(guess: &str, name: &str) -> bool {
    let guess = guess.trim().to_lowercase();
    let name = name.trim().to_lowercase();
    if guess.is_empty() || name.is_empty() {
        return false;
    }
    guess.contains(&name) || name.contains(&guess)
}

/// Apply the vision bonus; returns how many candidates were boosted
///
/// Callers short-circuit healthy verdicts before scoring, so `vision` is
/// expected to be a disease verdict here.
pub fn apply_fusion(candidates: &mut [ScoredCandidate], vision: &VisionResult) -> usize {
    let mut boosted = 0;

    for candidate in candidates.iter_mut() {
        if names_related(&vision.disease_name, &candidate.ailment.name) {
            candidate.breakdown.vision = VISION_BONUS;
            boosted += 1;
        }
        candidate.refresh(ScoreCeiling::Fused);
    }

    tracing::debug!(
        guess = %vision.disease_name,
        boosted,
        candidates = candidates.len(),
        "Applied vision fusion"
    );

    boosted
}
