//! Publish filter: select approved, valid, non-expired events and project
//! them into the public schema.
//!
//! Output is a full replacement of the publishable set on every run, never an
//! incremental diff; downstream consumers treat each export as authoritative.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::constants::{LAST_UPDATED_FORMAT, TIMEZONE};
use crate::domain::{PublishedEvent, StagedEvent, ValidationStatus};
use crate::schedule::is_outdated_at;

#[derive(Debug, Clone, Default, Serialize)]
pub struct PublishSummary {
    pub approved: usize,
    pub pruned_outdated: usize,
    pub published: usize,
}

/// An event qualifies iff it validated OK, a human approved it, and it has
/// not ended more than the buffer ago.
pub fn publish_at(
    staged: &[StagedEvent],
    now: DateTime<Tz>,
) -> (Vec<PublishedEvent>, PublishSummary) {
    let mut summary = PublishSummary::default();
    let last_updated = now.format(LAST_UPDATED_FORMAT).to_string();
    let mut published = Vec::new();

    for event in staged {
        if event.validation_status != Some(ValidationStatus::Ok) || !event.approve {
            continue;
        }
        summary.approved += 1;

        if is_outdated_at(&event.event_date, &event.event_time, now) {
            summary.pruned_outdated += 1;
            continue;
        }

        published.push(project(event, &last_updated));
    }

    summary.published = published.len();
    (published, summary)
}

/// [`publish_at`] against the current wall clock.
pub fn publish(staged: &[StagedEvent]) -> (Vec<PublishedEvent>, PublishSummary) {
    publish_at(staged, Utc::now().with_timezone(&TIMEZONE))
}

fn project(event: &StagedEvent, last_updated: &str) -> PublishedEvent {
    PublishedEvent {
        event_id: event.event_id.clone(),
        date: event.event_date.clone(),
        time: event.event_time.clone(),
        event: event.event_name.clone(),
        artist: event.artist_name.clone(),
        organiser: event.event_organiser.clone(),
        venue: event.venue_name.clone(),
        city: event.city.clone(),
        country: event.country.clone(),
        language: event.language.clone(),
        url: event.ticket_url.clone(),
        image: event.image_url.clone(),
        category: event.category_id.clone(),
        access_status: event.access_status.clone(),
        last_updated: last_updated.to_string(),
    }
}
