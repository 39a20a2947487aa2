//! Tiered venue resolution against the reference venue table.

use tracing::debug;

use crate::constants::VENUE_MATCH_THRESHOLD;
use crate::domain::Venue;
use crate::normalize::normalize_venue_name;
use crate::sheet::{schema, Sheet};

/// Immutable, explicitly-passed snapshot of the venue reference table.
#[derive(Debug, Clone, Default)]
pub struct VenueTable {
    venues: Vec<Venue>,
}

impl VenueTable {
    pub fn new(venues: Vec<Venue>) -> Self {
        VenueTable { venues }
    }

    pub fn from_sheet(sheet: &Sheet) -> Self {
        VenueTable::new(schema::parse_venues(sheet))
    }

    pub fn get(&self, venue_id: &str) -> Option<&Venue> {
        self.venues.iter().find(|v| v.venue_id == venue_id)
    }

    pub fn is_empty(&self) -> bool {
        self.venues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.venues.len()
    }

    /// Resolves a free-text venue name to a canonical venue, strictly tiered:
    ///
    /// 1. exact normalized match against the canonical name;
    /// 2. exact normalized match against any alias;
    /// 3. fuzzy match (normalized edit-distance ratio) against canonical
    ///    names and aliases, best score wins if it reaches `threshold`.
    ///
    /// The fuzzy tie-break is first-venue-at-the-winning-score: deterministic
    /// but implementation-defined. `None` means the event needs manual venue
    /// assignment; this never fails.
    pub fn resolve(&self, free_text_name: &str, threshold: f64) -> Option<&Venue> {
        let input = normalize_venue_name(free_text_name);
        if input.is_empty() {
            return None;
        }

        for venue in &self.venues {
            if normalize_venue_name(&venue.venue_name) == input {
                return Some(venue);
            }
        }

        for venue in &self.venues {
            for alias in &venue.aliases {
                if normalize_venue_name(alias) == input {
                    return Some(venue);
                }
            }
        }

        let mut best: Option<&Venue> = None;
        let mut best_score = 0.0f64;
        for venue in &self.venues {
            let mut candidates = vec![venue.venue_name.as_str()];
            candidates.extend(venue.aliases.iter().map(String::as_str));
            for candidate in candidates {
                let score =
                    strsim::normalized_levenshtein(&input, &normalize_venue_name(candidate));
                if score > best_score {
                    best_score = score;
                    best = Some(venue);
                }
            }
        }

        if best_score >= threshold {
            if let Some(venue) = best {
                debug!(
                    input = free_text_name,
                    venue_id = venue.venue_id,
                    score = best_score,
                    "fuzzy venue match"
                );
            }
            best
        } else {
            None
        }
    }

    /// [`resolve`](Self::resolve) at the standard threshold.
    pub fn resolve_id(&self, free_text_name: &str) -> Option<&str> {
        self.resolve(free_text_name, VENUE_MATCH_THRESHOLD)
            .map(|v| v.venue_id.as_str())
    }
}
