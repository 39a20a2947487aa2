/// Similarity threshold for the fuzzy venue-matching tier.
pub const VENUE_MATCH_THRESHOLD: f64 = 0.85;

/// Grace period before an ended event counts as outdated.
pub const OUTDATED_BUFFER_HOURS: i64 = 6;

/// All event times are interpreted in this zone.
pub const TIMEZONE: chrono_tz::Tz = chrono_tz::Europe::London;

/// Row highlight colors keyed by validation outcome.
pub const COLOR_ERROR: &str = "#f4cccc";
pub const COLOR_WARNING: &str = "#fff2cc";
pub const COLOR_OK: &str = "#d9ead3";

/// Timestamp format for the LAST_UPDATED publish column.
pub const LAST_UPDATED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
