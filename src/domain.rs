use serde::{Deserialize, Serialize};

/// Where an event record originated.
///
/// Priority order for deduplication is MONTHLY > MANUAL > O2: staff-curated
/// monthly data catches schedule corrections that the scraper and manual
/// spreadsheet entries miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    O2,
    Manual,
    Monthly,
}

impl Source {
    /// Lower rank wins when deduplicating.
    pub fn priority(&self) -> u8 {
        match self {
            Source::Monthly => 0,
            Source::Manual => 1,
            Source::O2 => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Source::O2 => "O2",
            Source::Manual => "MANUAL",
            Source::Monthly => "MONTHLY",
        }
    }

    pub fn parse(s: &str) -> Option<Source> {
        match s.trim().to_uppercase().as_str() {
            "O2" => Some(Source::O2),
            "MANUAL" => Some(Source::Manual),
            "MONTHLY" => Some(Source::Monthly),
            _ => None,
        }
    }
}

/// Publishability classification produced by the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationStatus {
    Ok,
    Warning,
    Error,
}

impl ValidationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationStatus::Ok => "OK",
            ValidationStatus::Warning => "WARNING",
            ValidationStatus::Error => "ERROR",
        }
    }

    pub fn parse(s: &str) -> Option<ValidationStatus> {
        match s.trim().to_uppercase().as_str() {
            "OK" => Some(ValidationStatus::Ok),
            "WARNING" => Some(ValidationStatus::Warning),
            "ERROR" => Some(ValidationStatus::Error),
            _ => None,
        }
    }
}

/// One candidate event from a source, before reconciliation.
///
/// All fields are carried as the loose strings the sources supply; nothing
/// here is normalized or validated yet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawEvent {
    pub source: Option<Source>,
    pub source_reference: String,
    pub event_date: String,
    pub event_time: String,
    pub event_name: String,
    pub artist_name: String,
    pub event_organiser: String,
    pub venue_name: String,
    pub event_url: String,
    pub image_url: String,
    pub category: String,
    pub access_status: String,
    pub notes: String,
}

/// The pipeline's central mutable entity: reconciled, enriched, reviewable.
///
/// `approve` and the `*_override` fields survive re-runs by identity lookup;
/// every resolved field is recomputed from scratch each run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StagedEvent {
    /// Deterministic hash of normalized date|name|venue ref.
    pub event_id: String,
    pub source: Option<Source>,
    pub source_reference: String,
    pub event_date: String,
    pub event_time: String,
    pub event_name: String,
    pub artist_name: String,
    pub event_organiser: String,
    /// Resolved canonical venue id, filled by enrichment.
    pub venue_id: String,
    pub venue_name: String,
    pub city: String,
    pub country: String,
    pub language: String,
    pub ticket_url: String,
    pub image_url: String,
    pub category_id: String,
    /// Auto-detected category, sticky once assigned.
    pub category_suggestion: String,
    pub venue_id_override: String,
    pub category_override: String,
    pub ticket_url_override: String,
    pub image_url_override: String,
    pub access_status: String,
    pub notes: String,
    /// Empty until the validator has run.
    pub validation_status: Option<ValidationStatus>,
    pub approve: bool,
}

/// Canonical place from the venue reference table. Read-only to the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    pub venue_id: String,
    pub venue_name: String,
    pub aliases: Vec<String>,
    pub city: String,
    pub country: String,
    pub language: String,
    pub interpreter_status: String,
    pub access_email: String,
    pub access_phone: String,
    pub textphone: String,
    pub vrs_provider: String,
    pub vrs_url: String,
    pub default_ticket_url: String,
    pub default_image_url: String,
    pub booking_guide_url: String,
    pub access_notes: String,
    pub official_site_url: String,
}

/// Category reference entry with ordered keyword match terms.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Category {
    pub category_id: String,
    pub category_name: String,
    pub keywords: Vec<String>,
    pub default_image_url: String,
}

/// Read-only projection of an approved staged event into the public schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PublishedEvent {
    pub event_id: String,
    pub date: String,
    pub time: String,
    pub event: String,
    pub artist: String,
    pub organiser: String,
    pub venue: String,
    pub city: String,
    pub country: String,
    pub language: String,
    pub url: String,
    pub image: String,
    pub category: String,
    pub access_status: String,
    pub last_updated: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_priority_ranks_monthly_first() {
        assert!(Source::Monthly.priority() < Source::Manual.priority());
        assert!(Source::Manual.priority() < Source::O2.priority());
    }

    #[test]
    fn source_parse_is_case_insensitive() {
        assert_eq!(Source::parse("monthly"), Some(Source::Monthly));
        assert_eq!(Source::parse(" O2 "), Some(Source::O2));
        assert_eq!(Source::parse("scraper"), None);
    }

    #[test]
    fn validation_status_round_trips_through_strings() {
        for status in [
            ValidationStatus::Ok,
            ValidationStatus::Warning,
            ValidationStatus::Error,
        ] {
            assert_eq!(ValidationStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ValidationStatus::parse(""), None);
    }
}
