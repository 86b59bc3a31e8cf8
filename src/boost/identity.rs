//! Stable identifiers for trainers, jockeys and owners.
//!
//! Cache keys are built from these ids, so two display names that differ
//! only in case, punctuation or spacing map to the same person on purpose.

/// Normalize a display name: lowercase, keep only `[a-z0-9 ]`, collapse
/// whitespace runs to a single space and trim.
///
/// "  Todd  A. Pletcher " → "todd a pletcher"
pub fn norm_name(name: &str) -> String {
    let lowered = name.to_lowercase();
    let kept: String = lowered
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace())
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Build the cache identifier `"{person_type}:{normalized_name}"`.
pub fn make_id(person_type: &str, display_name: &str) -> String {
    format!("{}:{}", person_type, norm_name(display_name))
}
