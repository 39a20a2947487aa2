//! Pure normalization functions for the identity and matching layer.
//!
//! Every function here is total: malformed input degrades to a best-effort
//! value or an empty string, never a panic or an error. Normalized forms are
//! for comparison and key derivation only, never for display.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

static ISO_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());
static DATE_RANGE_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+[-&]\s+").unwrap());

/// Name suffix/prefix patterns stripped for dedup keys, applied in order.
static NAME_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\s*-\s*live$",
        r"^the\s+",
        r"\s+tour$",
        r"\s+\d{4}$",
        r"\s*\(.*\)$",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static VENUE_LOCATION_SUFFIXES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [r",\s*london$", r",\s*uk$", r",\s*ireland$"]
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
});

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static SLUG_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// Venue name variations folded to one spelling before comparison.
/// Order matters: the longer O2 form must rewrite before the shorter one.
const VENUE_SYNONYMS: [(&str, &str); 3] = [
    ("the o2 arena", "the o2"),
    ("o2 arena", "the o2"),
    ("indigo at the o2", "indigo"),
];

/// Parses the date formats the sources use into a calendar date.
///
/// Accepts `YYYY-MM-DD`, `DD.MM.YY[YY]` and `DD/MM/YY[YY]`; two-digit years
/// map to `20YY`; range expressions (`"D - D"`, `"D & D"`) take the first
/// date. Unparseable input yields `None`.
pub fn normalize_date(input: &str) -> Option<NaiveDate> {
    let mut date_str = input.trim();
    if date_str.is_empty() {
        return None;
    }

    if ISO_DATE.is_match(date_str) {
        return NaiveDate::parse_from_str(date_str, "%Y-%m-%d").ok();
    }

    if let Some(first) = DATE_RANGE_SPLIT.split(date_str).next() {
        date_str = first.trim();
    }

    for separator in ['.', '/'] {
        if date_str.contains(separator) {
            let parts: Vec<&str> = date_str.split(separator).collect();
            if parts.len() != 3 {
                return None;
            }
            let day: u32 = parts[0].trim().parse().ok()?;
            let month: u32 = parts[1].trim().parse().ok()?;
            let year_part = parts[2].trim();
            let year: i32 = if year_part.len() == 2 {
                format!("20{year_part}").parse().ok()?
            } else {
                year_part.parse().ok()?
            };
            return NaiveDate::from_ymd_opt(year, month, day);
        }
    }

    None
}

/// Canonical form of an event name for identity and dedup keys.
pub fn normalize_event_name(name: &str) -> String {
    let mut name = name.to_lowercase().trim().to_string();
    for pattern in NAME_PATTERNS.iter() {
        name = pattern.replace(&name, "").into_owned();
    }
    WHITESPACE.replace_all(&name, " ").trim().to_string()
}

/// Canonical form of a free-text venue name for matching.
pub fn normalize_venue_name(venue: &str) -> String {
    let mut venue = venue.to_lowercase().trim().to_string();
    for pattern in VENUE_LOCATION_SUFFIXES.iter() {
        venue = pattern.replace(&venue, "").into_owned();
    }
    for (from, to) in VENUE_SYNONYMS {
        if venue.contains(from) {
            venue = venue.replace(from, to);
        }
    }
    venue.trim().to_string()
}

/// Canonical form of a ticketing URL for dedup.
///
/// Two URLs normalize equal iff they should be treated as the same page:
/// scheme, `www.`, query string, and trailing slashes are not identity.
pub fn normalize_url(url: &str) -> String {
    let mut url = url.to_lowercase().trim().to_string();
    if url.is_empty() {
        return url;
    }
    url = url
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .to_string();
    if let Some(stripped) = url.split('?').next() {
        url = stripped.to_string();
    }
    url = url.trim_end_matches('/').to_string();
    url.replace("www.", "")
}

/// Slug form of a venue name: lowercase, non-alphanumeric runs collapsed to
/// single hyphens.
pub fn venue_slug(name: &str) -> String {
    let lowered = name.to_lowercase();
    SLUG_SEPARATOR
        .replace_all(lowered.trim(), "-")
        .trim_matches('-')
        .to_string()
}

/// Interprets checkbox-ish cell values.
pub fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "yes" | "true" | "1" | "x" | "✓" | "checked"
    )
}

/// Sign language for a venue's country: Ireland signs ISL, everywhere else
/// defaults to BSL.
pub fn language_for_country(country: &str) -> &'static str {
    let country = country.trim().to_lowercase();
    if country.contains("ireland") || country == "ie" {
        "ISL"
    } else {
        "BSL"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_passes_through_iso() {
        assert_eq!(
            normalize_date("2026-06-15"),
            NaiveDate::from_ymd_opt(2026, 6, 15)
        );
    }

    #[test]
    fn date_parses_dotted_and_slashed_forms() {
        let expected = NaiveDate::from_ymd_opt(2026, 6, 15);
        assert_eq!(normalize_date("15.06.26"), expected);
        assert_eq!(normalize_date("15.06.2026"), expected);
        assert_eq!(normalize_date("15/06/26"), expected);
        assert_eq!(normalize_date("15/06/2026"), expected);
    }

    #[test]
    fn date_ranges_take_the_first_date() {
        let expected = NaiveDate::from_ymd_opt(2026, 6, 15);
        assert_eq!(normalize_date("15.06.26 - 20.06.26"), expected);
        assert_eq!(normalize_date("15.06.26 & 16.06.26"), expected);
    }

    #[test]
    fn bad_dates_yield_none() {
        assert_eq!(normalize_date(""), None);
        assert_eq!(normalize_date("next Tuesday"), None);
        assert_eq!(normalize_date("32.13.26"), None);
    }

    #[test]
    fn event_name_strips_suffixes_and_leading_the() {
        assert_eq!(
            normalize_event_name("The Beatles - Live"),
            "beatles".to_string()
        );
        assert_eq!(normalize_event_name("Adele 2026"), "adele");
        assert_eq!(normalize_event_name("Hamlet (matinee)"), "hamlet");
        assert_eq!(normalize_event_name("  Big   Gig  "), "big gig");
    }

    #[test]
    fn venue_name_strips_location_and_applies_synonyms() {
        assert_eq!(normalize_venue_name("The O2 Arena, London"), "the o2");
        assert_eq!(normalize_venue_name("O2 Arena"), "the o2");
        assert_eq!(normalize_venue_name("indigo at the O2"), "indigo");
        assert_eq!(normalize_venue_name("Vicar Street, Ireland"), "vicar street");
    }

    #[test]
    fn url_normalization_drops_noise() {
        assert_eq!(
            normalize_url("https://www.theo2.co.uk/events/detail/gig?ref=123"),
            "theo2.co.uk/events/detail/gig"
        );
        assert_eq!(
            normalize_url("http://theo2.co.uk/events/detail/gig/"),
            "theo2.co.uk/events/detail/gig"
        );
        assert_eq!(normalize_url(""), "");
    }

    #[test]
    fn slug_collapses_non_alphanumeric_runs() {
        assert_eq!(venue_slug("The O2 Arena, London"), "the-o2-arena-london");
        assert_eq!(venue_slug("  St. David's Hall!  "), "st-david-s-hall");
    }

    #[test]
    fn truthy_values_match_case_insensitively() {
        for v in ["Yes", "TRUE", "1", "x", "✓", "checked"] {
            assert!(is_truthy(v), "{v} should be truthy");
        }
        assert!(!is_truthy("no"));
        assert!(!is_truthy(""));
    }

    #[test]
    fn language_defaults_to_bsl() {
        assert_eq!(language_for_country("Ireland"), "ISL");
        assert_eq!(language_for_country("ie"), "ISL");
        assert_eq!(language_for_country("UK"), "BSL");
        assert_eq!(language_for_country(""), "BSL");
    }
}
