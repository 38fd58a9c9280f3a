//! Localized name handling utility
//!
//! Crops and ailments carry a canonical (English) name and, optionally, a
//! localized one. Display names combine them as "Canonical (Localized)".

/// Get formatted display name
///
/// Returns: "Canonical Name (Localized Name)" or just "Canonical Name"
pub fn get_display_name(canonical_name: &str, localized_name: Option<&str>) -> String {
    match pick_localized(canonical_name, localized_name) {
        Some(local) => format!("{} ({})", canonical_name, local),
        None => canonical_name.to_string(),
    }
}

/// Usable localized name: non-blank and not just a repeat of the canonical name
fn pick_localized<'a>(canonical_name: &str, localized_name: Option<&'a str>) -> Option<&'a str> {
    let local = localized_name?.trim();
    if local.is_empty() || local.eq_ignore_ascii_case(canonical_name.trim()) {
        return None;
    }
    Some(local)
}
