//! Event identity derivation.
//!
//! `event_id` is the cross-run identity that approval and override state is
//! keyed on. Any change to how these keys are built is a breaking migration
//! for existing staged snapshots and must be versioned.

use sha2::{Digest, Sha256};

use crate::normalize::{normalize_date, normalize_event_name};

/// Date component used in keys: the ISO form when the date parses, otherwise
/// the trimmed raw string so unparseable rows still get a stable identity.
pub fn date_key(event_date: &str) -> String {
    match normalize_date(event_date) {
        Some(date) => date.format("%Y-%m-%d").to_string(),
        None => event_date.trim().to_string(),
    }
}

/// Composite dedup key: `date|normalized name|venue ref`.
///
/// `venue_ref` must be supplied consistently by callers; the reconciliation
/// stage always passes the normalized venue name, since no resolver has run
/// at that point.
pub fn event_key(event_date: &str, event_name: &str, venue_ref: &str) -> String {
    format!(
        "{}|{}|{}",
        date_key(event_date),
        normalize_event_name(event_name),
        venue_ref
    )
}

/// Deterministic 16-hex-char event identifier: SHA-256 prefix of the
/// composite key.
pub fn event_id(event_date: &str, event_name: &str, venue_ref: &str) -> String {
    let digest = Sha256::digest(event_key(event_date, event_name, venue_ref).as_bytes());
    hex::encode(digest)[..16].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_id_is_stable_and_16_hex_chars() {
        let a = event_id("2026-06-15", "Gig A", "the o2");
        let b = event_id("2026-06-15", "Gig A", "the o2");
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn equivalent_dates_and_names_produce_the_same_id() {
        // Same logical event entered two ways by two sources.
        assert_eq!(
            event_id("15.06.26", "The Gig - Live", "the o2"),
            event_id("2026-06-15", "Gig", "the o2")
        );
    }

    #[test]
    fn different_venues_produce_different_ids() {
        assert_ne!(
            event_id("2026-06-15", "Gig", "the o2"),
            event_id("2026-06-15", "Gig", "indigo")
        );
    }

    #[test]
    fn unparseable_dates_still_key_stably() {
        assert_eq!(event_key("TBC ", "Gig", "v"), "TBC|gig|v");
    }
}
