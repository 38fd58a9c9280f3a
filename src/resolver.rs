//! Crop Resolver
//!
//! Maps free-text crop input onto a canonical crop record, tolerating case,
//! partial names and typos. Rules are tried in order and the first hit wins:
//!
//! 1. Exact (case-insensitive) name match
//! 2. Substring in either direction
//! 3. Closest Levenshtein distance, if within `max(2, floor(0.4 × name length))`
//!
//! Candidate order is significant: every rule returns the first qualifying
//! candidate in the order supplied, so ties never depend on sorting.

use crate::types::CropRecord;
use crate::utils::levenshtein;

/// Minimum typo allowance for short names
const MIN_TOLERANCE: usize = 2;

/// Which rule produced a match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Exact,
    Substring,
    Approximate { distance: usize },
}

/// Resolved crop plus how it was found
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropMatch<'a> {
    pub crop: &'a CropRecord,
    pub kind: MatchKind,
}

/// Resolve `input` against `candidates`; `None` when no rule matches
pub fn resolve<'a>(input: &str, candidates: &'a [CropRecord]) -> Option<&'a CropRecord> {
    resolve_with_kind(input, candidates).map(|m| m.crop)
}

/// As [`resolve`], also reporting the rule that matched
pub fn resolve_with_kind<'a>(input: &str, candidates: &'a [CropRecord]) -> Option<CropMatch<'a>> {
    if candidates.is_empty() {
        return None;
    }

    let needle = input.trim().to_lowercase();
    let names: Vec<String> = candidates.iter().map(|c| c.name.to_lowercase()).collect();

    // An empty needle is a substring of everything, so the first two rules
    // only apply to real input.
    if !needle.is_empty() {
        if let Some(idx) = names.iter().position(|name| *name == needle) {
            return Some(CropMatch {
                crop: &candidates[idx],
                kind: MatchKind::Exact,
            });
        }

        if let Some(idx) = names
            .iter()
            .position(|name| name.contains(&needle) || needle.contains(name.as_str()))
        {
            return Some(CropMatch {
                crop: &candidates[idx],
                kind: MatchKind::Substring,
            });
        }
    }

    closest_within_tolerance(&needle, &names).map(|(idx, distance)| CropMatch {
        crop: &candidates[idx],
        kind: MatchKind::Approximate { distance },
    })
}

/// Allowed edit distance for a candidate name
pub fn tolerance_for(name: &str) -> usize {
    let len = name.chars().count();
    MIN_TOLERANCE.max(len * 2 / 5)
}

/// Index and distance of the nearest name, if it is close enough
fn closest_within_tolerance(needle: &str, names: &[String]) -> Option<(usize, usize)> {
    let mut best: Option<(usize, usize)> = None;

    for (idx, name) in names.iter().enumerate() {
        let distance = levenshtein(needle, name);
        // Strict less-than keeps the first candidate on ties
        if best.map_or(true, |(_, best_distance)| distance < best_distance) {
            best = Some((idx, distance));
        }
    }

    best.filter(|&(idx, distance)| distance <= tolerance_for(&names[idx]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crops(names: &[&str]) -> Vec<CropRecord> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| CropRecord::new(i as u32 + 1, *name))
            .collect()
    }

    #[test]
    fn test_exact_match_wins_over_approximate() {
        let candidates = crops(&["Tamato", "Tomato"]);
        let found = resolve_with_kind("Tomato", &candidates).unwrap();
        assert_eq!(found.crop.name, "Tomato");
        assert_eq!(found.kind, MatchKind::Exact);
    }

    #[test]
    fn test_exact_match_is_case_insensitive() {
        let candidates = crops(&["Rice", "Wheat"]);
        assert_eq!(resolve("wHeAt", &candidates).unwrap().name, "Wheat");
        assert_eq!(resolve("  rice ", &candidates).unwrap().name, "Rice");
    }

    #[test]
    fn test_substring_both_directions() {
        let candidates = crops(&["Cotton", "Sugarcane", "Potato"]);

        // Input inside candidate
        let partial = resolve_with_kind("sugar", &candidates).unwrap();
        assert_eq!(partial.crop.name, "Sugarcane");
        assert_eq!(partial.kind, MatchKind::Substring);

        // Candidate inside input
        let wordy = resolve_with_kind("my potato field", &candidates).unwrap();
        assert_eq!(wordy.crop.name, "Potato");
        assert_eq!(wordy.kind, MatchKind::Substring);
    }

    #[test]
    fn test_substring_takes_first_in_supplied_order() {
        let candidates = crops(&["Green Gram", "Black Gram"]);
        assert_eq!(resolve("gram", &candidates).unwrap().name, "Green Gram");
    }

    #[test]
    fn test_fuzzy_match_within_tolerance() {
        let candidates = crops(&["Tomato", "Wheat"]);
        let found = resolve_with_kind("Tamato", &candidates).unwrap();
        assert_eq!(found.crop.name, "Tomato");
        assert_eq!(found.kind, MatchKind::Approximate { distance: 1 });
    }

    #[test]
    fn test_fuzzy_match_rejects_distant_input() {
        let candidates = crops(&["Tomato", "Tamato"]);
        assert!(resolve("Xylophone", &candidates).is_none());
    }

    #[test]
    fn test_fuzzy_tie_keeps_first_candidate() {
        // "Bice" is distance 1 from both
        let candidates = crops(&["Rice", "Dice"]);
        assert_eq!(resolve("Bice", &candidates).unwrap().name, "Rice");

        let reversed = crops(&["Dice", "Rice"]);
        assert_eq!(resolve("Bice", &reversed).unwrap().name, "Dice");
    }

    #[test]
    fn test_tolerance_scales_with_name_length() {
        assert_eq!(tolerance_for("Pea"), 2);
        assert_eq!(tolerance_for("Tomato"), 2);
        assert_eq!(tolerance_for("Sugarcane"), 3);
        assert_eq!(tolerance_for("Finger Millet"), 5);

        let candidates = crops(&["Sugarcane"]);
        // distance 3, tolerance 3
        assert!(resolve("Sugrcna", &candidates).is_some());
    }

    #[test]
    fn test_empty_inputs() {
        assert!(resolve("Tomato", &[]).is_none());

        let candidates = crops(&["Tomato", "Wheat"]);
        assert!(resolve("", &candidates).is_none());
        assert!(resolve("   ", &candidates).is_none());
    }
}
