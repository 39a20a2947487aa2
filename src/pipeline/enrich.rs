//! Enrichment: fill every resolved field of a staged event, with manual
//! overrides dominating computed values.
//!
//! Idempotent by construction: a second pass over already-enriched input
//! produces identical output.

use serde::Serialize;
use tracing::warn;

use crate::categories::CategoryTable;
use crate::domain::StagedEvent;
use crate::normalize::language_for_country;
use crate::venues::VenueTable;

#[derive(Debug, Clone, Default, Serialize)]
pub struct EnrichSummary {
    pub venues_matched: usize,
    pub venues_unmatched: usize,
    pub categories_suggested: usize,
}

/// Enriches every staged event in place. Reference tables are read-only
/// snapshots passed per run; an empty table just means nothing resolves.
pub fn enrich(
    events: &mut [StagedEvent],
    venues: &VenueTable,
    categories: &CategoryTable,
) -> EnrichSummary {
    let mut summary = EnrichSummary::default();

    for event in events.iter_mut() {
        enrich_venue(event, venues, &mut summary);
        enrich_category(event, categories, &mut summary);
        enrich_ticket_url(event, venues);
        enrich_image_url(event, venues, categories);
    }

    summary
}

/// Resolves the effective venue and recomputes the derived geography.
///
/// Derived fields are always overwritten, never read from a prior snapshot:
/// a changed venue resolution must propagate.
fn enrich_venue(event: &mut StagedEvent, venues: &VenueTable, summary: &mut EnrichSummary) {
    let effective_id = if !event.venue_id_override.trim().is_empty() {
        Some(event.venue_id_override.trim().to_string())
    } else {
        venues.resolve_id(&event.venue_name).map(str::to_string)
    };

    match effective_id {
        Some(id) => {
            summary.venues_matched += 1;
            event.venue_id = id.clone();
            match venues.get(&id) {
                Some(venue) => {
                    event.city = venue.city.clone();
                    event.country = venue.country.clone();
                    event.language = if venue.language.trim().is_empty() {
                        language_for_country(&venue.country).to_string()
                    } else {
                        venue.language.clone()
                    };
                    if event.access_status.trim().is_empty() {
                        event.access_status = venue.interpreter_status.clone();
                    }
                }
                None => {
                    // An override can name a venue the table no longer has;
                    // keep the id but nothing derives from it.
                    warn!(
                        event = event.event_name,
                        venue_id = id,
                        "effective venue id not in reference table"
                    );
                    event.city.clear();
                    event.country.clear();
                    event.language.clear();
                }
            }
        }
        None => {
            summary.venues_unmatched += 1;
            warn!(event = event.event_name, venue = event.venue_name, "venue unresolved");
            event.venue_id.clear();
            event.city.clear();
            event.country.clear();
            event.language.clear();
        }
    }
}

/// Computes the category suggestion (sticky once assigned, to avoid
/// suggestion churn) and the effective category id.
fn enrich_category(event: &mut StagedEvent, categories: &CategoryTable, summary: &mut EnrichSummary) {
    if event.category_suggestion.trim().is_empty() {
        if let Some(suggested) = categories.suggest(&event.event_name) {
            event.category_suggestion = suggested.to_string();
            summary.categories_suggested += 1;
        }
    }

    event.category_id = if !event.category_override.trim().is_empty() {
        event.category_override.trim().to_string()
    } else {
        event.category_suggestion.trim().to_string()
    };
}

/// Ticket URL fallback chain, first non-empty wins:
/// override, original event URL, venue default, empty.
fn enrich_ticket_url(event: &mut StagedEvent, venues: &VenueTable) {
    if !event.ticket_url_override.trim().is_empty() {
        event.ticket_url = event.ticket_url_override.trim().to_string();
        return;
    }
    if !event.ticket_url.trim().is_empty() {
        return;
    }
    if let Some(venue) = venues.get(&event.venue_id) {
        if !venue.default_ticket_url.trim().is_empty() {
            event.ticket_url = venue.default_ticket_url.clone();
        }
    }
}

/// Image URL fallback chain, first non-empty wins:
/// override, original event image, venue default, category default, empty.
fn enrich_image_url(event: &mut StagedEvent, venues: &VenueTable, categories: &CategoryTable) {
    if !event.image_url_override.trim().is_empty() {
        event.image_url = event.image_url_override.trim().to_string();
        return;
    }
    if !event.image_url.trim().is_empty() {
        return;
    }
    if let Some(venue) = venues.get(&event.venue_id) {
        if !venue.default_image_url.trim().is_empty() {
            event.image_url = venue.default_image_url.clone();
            return;
        }
    }
    if let Some(category) = categories.get(&event.category_id) {
        if !category.default_image_url.trim().is_empty() {
            event.image_url = category.default_image_url.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, Venue};

    fn venues() -> VenueTable {
        VenueTable::new(vec![
            Venue {
                venue_id: "the-o2-arena-london".into(),
                venue_name: "The O2".into(),
                city: "London".into(),
                country: "UK".into(),
                language: "BSL".into(),
                interpreter_status: "Interpreter on request".into(),
                default_ticket_url: "https://www.axs.com/uk/theo2".into(),
                default_image_url: "https://img.example/o2.jpg".into(),
                ..Default::default()
            },
            Venue {
                venue_id: "vicar-street-dublin".into(),
                venue_name: "Vicar Street".into(),
                city: "Dublin".into(),
                country: "Ireland".into(),
                ..Default::default()
            },
        ])
    }

    fn categories() -> CategoryTable {
        CategoryTable::new(vec![Category {
            category_id: "concert".into(),
            category_name: "Concert".into(),
            keywords: vec!["gig".into()],
            default_image_url: "https://img.example/concert.jpg".into(),
        }])
    }

    fn staged(name: &str, venue: &str) -> StagedEvent {
        StagedEvent {
            event_id: "deadbeef00000000".into(),
            event_name: name.into(),
            venue_name: venue.into(),
            event_date: "2026-06-15".into(),
            ..Default::default()
        }
    }

    #[test]
    fn geography_derives_from_resolved_venue() {
        let mut events = vec![staged("Gig A", "The O2 Arena, London")];
        let summary = enrich(&mut events, &venues(), &categories());
        assert_eq!(summary.venues_matched, 1);
        assert_eq!(events[0].venue_id, "the-o2-arena-london");
        assert_eq!(events[0].city, "London");
        assert_eq!(events[0].language, "BSL");
        assert_eq!(events[0].access_status, "Interpreter on request");
    }

    #[test]
    fn language_falls_back_to_country_rule() {
        let mut events = vec![staged("Gig A", "Vicar Street")];
        enrich(&mut events, &venues(), &categories());
        assert_eq!(events[0].language, "ISL");
    }

    #[test]
    fn venue_override_dominates_and_propagates_geography() {
        let mut events = vec![staged("Gig A", "The O2 Arena, London")];
        events[0].venue_id_override = "vicar-street-dublin".into();
        enrich(&mut events, &venues(), &categories());
        assert_eq!(events[0].venue_id, "vicar-street-dublin");
        assert_eq!(events[0].city, "Dublin");
        assert_eq!(events[0].language, "ISL");
    }

    #[test]
    fn unresolved_venue_clears_derived_fields() {
        let mut events = vec![staged("Gig A", "Some Pub Nobody Knows")];
        events[0].city = "Stale".into();
        let summary = enrich(&mut events, &venues(), &categories());
        assert_eq!(summary.venues_unmatched, 1);
        assert!(events[0].venue_id.is_empty());
        assert!(events[0].city.is_empty());
        assert!(events[0].language.is_empty());
    }

    #[test]
    fn category_suggestion_is_sticky() {
        let mut events = vec![staged("Big Gig", "The O2")];
        enrich(&mut events, &venues(), &categories());
        assert_eq!(events[0].category_suggestion, "concert");

        // A later rename must not churn the suggestion.
        events[0].event_name = "Renamed Boxing Match".into();
        enrich(&mut events, &venues(), &categories());
        assert_eq!(events[0].category_suggestion, "concert");
    }

    #[test]
    fn category_override_wins_over_suggestion() {
        let mut events = vec![staged("Big Gig", "The O2")];
        events[0].category_override = "comedy".into();
        enrich(&mut events, &venues(), &categories());
        assert_eq!(events[0].category_suggestion, "concert");
        assert_eq!(events[0].category_id, "comedy");
    }

    #[test]
    fn ticket_url_chain_prefers_override_then_event_then_venue() {
        let mut events = vec![staged("Gig", "The O2")];
        enrich(&mut events, &venues(), &categories());
        assert_eq!(events[0].ticket_url, "https://www.axs.com/uk/theo2");

        let mut events = vec![staged("Gig", "The O2")];
        events[0].ticket_url = "https://tickets.example/gig".into();
        enrich(&mut events, &venues(), &categories());
        assert_eq!(events[0].ticket_url, "https://tickets.example/gig");

        let mut events = vec![staged("Gig", "The O2")];
        events[0].ticket_url = "https://tickets.example/gig".into();
        events[0].ticket_url_override = "https://override.example".into();
        enrich(&mut events, &venues(), &categories());
        assert_eq!(events[0].ticket_url, "https://override.example");
    }

    #[test]
    fn image_url_falls_through_to_category_default() {
        let mut events = vec![staged("Big Gig", "Vicar Street")];
        enrich(&mut events, &venues(), &categories());
        // Vicar Street has no default image; the concert category supplies one.
        assert_eq!(events[0].image_url, "https://img.example/concert.jpg");
    }

    #[test]
    fn enrichment_is_idempotent() {
        let mut events = vec![staged("Big Gig", "The O2 Arena, London")];
        events[0].venue_id_override = "vicar-street-dublin".into();
        enrich(&mut events, &venues(), &categories());
        let after_first = events.clone();
        enrich(&mut events, &venues(), &categories());
        assert_eq!(events, after_first);
    }
}
