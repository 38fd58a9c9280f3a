//! Normalization Utilities
//!
//! Converts accumulated rule scores into a confidence percentage.
//!
//! The ceiling is the best score a candidate can reach: 14 from the rule table
//! alone, 19 once an image verdict can add its fusion bonus. Confidence is capped
//! at 99 because a rule-based match is never certain.

/// Best score reachable from the rule table
pub const BASE_MAX_SCORE: u32 = 14;

/// Bonus for a candidate whose name agrees with the image verdict
pub const VISION_BONUS: u32 = 5;

/// Best score reachable once the vision bonus is in play
pub const FUSED_MAX_SCORE: u32 = BASE_MAX_SCORE + VISION_BONUS;

/// Upper bound for any confidence value we report
pub const MAX_CONFIDENCE: u8 = 99;

/// Score ceiling to normalize against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreCeiling {
    /// Rule table only
    Base,
    /// Rule table plus vision bonus
    Fused,
}

impl ScoreCeiling {
    pub fn max_score(self) -> u32 {
        match self {
            ScoreCeiling::Base => BASE_MAX_SCORE,
            ScoreCeiling::Fused => FUSED_MAX_SCORE,
        }
    }
}

/// Confidence = min(round(score / ceiling × 100), 99)
///
/// A zero score yields 0; such candidates never reach the result anyway.
pub fn confidence_percent(score: u32, ceiling: ScoreCeiling) -> u8 {
    if score == 0 {
        return 0;
    }

    let percent = (score as f64 / ceiling.max_score() as f64 * 100.0).round();
    percent.min(MAX_CONFIDENCE as f64) as u8
}

/// Clamp an externally reported confidence into 0-99
pub fn clamp_confidence(raw: i64) -> u8 {
    raw.clamp(0, MAX_CONFIDENCE as i64) as u8
}
