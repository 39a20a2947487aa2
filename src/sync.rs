//! Live two-sheet sync: admission control for freshly scraped events against
//! two existing flat snapshots, plus time-based pruning.
//!
//! This path has no enrichment or approval concept. An incoming event that
//! matches either destination by URL or composite key is skipped, not
//! merged; survivors are appended to the staging destination. Pruning then
//! deletes outdated rows: from the staging destination only rows traceable
//! to the scraper's own source, from the public destination rows of any
//! origin, because staleness in a customer-facing feed is undesirable
//! whoever wrote the row.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::{debug, info};

use crate::constants::TIMEZONE;
use crate::domain::{RawEvent, Source};
use crate::keys::event_key;
use crate::normalize::{normalize_url, normalize_venue_name};
use crate::schedule::is_outdated_at;
use crate::sheet::{HeaderMap, Sheet};

#[derive(Debug, Clone, Default)]
pub struct SyncSummary {
    pub incoming: usize,
    pub admitted: usize,
    pub skipped_duplicates: usize,
    pub skipped_no_date: usize,
    pub url_matches: usize,
    pub composite_matches: usize,
    pub pruned_staging: usize,
    pub pruned_public: usize,
}

/// Dedup key sets extracted from one destination snapshot.
struct DestinationKeys {
    url_keys: HashSet<String>,
    composite_keys: HashSet<String>,
}

fn extract_keys(sheet: &Sheet) -> DestinationKeys {
    let map = sheet.header_map();
    let mut url_keys = HashSet::new();
    let mut composite_keys = HashSet::new();

    for row in &sheet.rows {
        let url = normalize_url(map.cell(row, "EVENT_URL"));
        if !url.is_empty() {
            url_keys.insert(url);
        }
        let name = map.cell(row, "EVENT_NAME");
        let date = map.cell(row, "EVENT_DATE");
        if !name.trim().is_empty() && !date.trim().is_empty() {
            composite_keys.insert(event_key(
                date,
                name,
                &normalize_venue_name(map.cell(row, "VENUE_NAME")),
            ));
        }
    }

    DestinationKeys {
        url_keys,
        composite_keys,
    }
}

/// Admits incoming scraped events into the staging snapshot and prunes
/// outdated rows from both snapshots, at an explicit `now`.
pub fn sync_at(
    incoming: Vec<RawEvent>,
    staging: &mut Sheet,
    public: &mut Sheet,
    now: DateTime<Tz>,
) -> SyncSummary {
    let mut summary = SyncSummary {
        incoming: incoming.len(),
        ..Default::default()
    };

    let staging_keys = extract_keys(staging);
    let public_keys = extract_keys(public);

    let added_date = now.format("%Y-%m-%d").to_string();
    for event in incoming {
        if event.event_date.trim().is_empty() {
            summary.skipped_no_date += 1;
            continue;
        }

        let url_key = {
            let normalized = normalize_url(&event.event_url);
            (!normalized.is_empty()).then_some(normalized)
        };
        let composite_key = event_key(
            &event.event_date,
            &event.event_name,
            &normalize_venue_name(&event.venue_name),
        );

        // URL is checked against both destinations before the composite key
        // is considered at all.
        let url_hit = url_key
            .as_ref()
            .map(|k| staging_keys.url_keys.contains(k) || public_keys.url_keys.contains(k))
            .unwrap_or(false);
        let composite_hit = !url_hit
            && (staging_keys.composite_keys.contains(&composite_key)
                || public_keys.composite_keys.contains(&composite_key));

        if url_hit || composite_hit {
            debug!(event = event.event_name, by_url = url_hit, "skipping duplicate");
            summary.skipped_duplicates += 1;
            if url_hit {
                summary.url_matches += 1;
            } else {
                summary.composite_matches += 1;
            }
            continue;
        }

        append_source_row(staging, &event, &added_date);
        summary.admitted += 1;
    }

    summary.pruned_staging = prune_rows(staging, now, true);
    summary.pruned_public = prune_rows(public, now, false);

    info!(
        admitted = summary.admitted,
        skipped = summary.skipped_duplicates,
        pruned_staging = summary.pruned_staging,
        pruned_public = summary.pruned_public,
        "sync complete"
    );
    summary
}

/// [`sync_at`] against the current wall clock.
pub fn sync(incoming: Vec<RawEvent>, staging: &mut Sheet, public: &mut Sheet) -> SyncSummary {
    sync_at(incoming, staging, public, Utc::now().with_timezone(&TIMEZONE))
}

/// Appends one raw event to a destination snapshot, writing by column name
/// so the destination's own header order is respected.
fn append_source_row(sheet: &mut Sheet, event: &RawEvent, added_date: &str) {
    let map = sheet.header_map();
    let mut row = vec![String::new(); sheet.headers.len()];
    let mut set = |column: &str, value: &str| {
        if let Some(i) = map.index(column) {
            row[i] = value.to_string();
        }
    };

    set("EVENT_NAME", &event.event_name);
    set("ARTIST_NAME", &event.artist_name);
    set("VENUE_NAME", &event.venue_name);
    set("EVENT_DATE", &event.event_date);
    set("EVENT_TIME", &event.event_time);
    set("EVENT_URL", &event.event_url);
    set("IMAGE_URL", &event.image_url);
    set("ACCESS_STATUS", &event.access_status);
    set("CATEGORY", &event.category);
    set(
        "SOURCE",
        event.source.map(|s| s.as_str()).unwrap_or_default(),
    );
    set("NOTES", &event.notes);
    set("ADDED_DATE", added_date);

    sheet.rows.push(row);
}

/// Deletes outdated rows in place. When `scraper_rows_only` is set, only
/// rows identifiable as the scraper's own are eligible; the row survives
/// otherwise no matter how stale.
fn prune_rows(sheet: &mut Sheet, now: DateTime<Tz>, scraper_rows_only: bool) -> usize {
    let map = sheet.header_map();
    let before = sheet.rows.len();

    sheet.rows.retain(|row| {
        let eligible = !scraper_rows_only || is_scraper_sourced(row, &map);
        let outdated = is_outdated_at(map.cell(row, "EVENT_DATE"), map.cell(row, "EVENT_TIME"), now);
        !(eligible && outdated)
    });

    before - sheet.rows.len()
}

/// Three-tier detection of scraper-written rows: the SOURCE cell, the event
/// URL host, then a venue-id prefix for older rows written before the
/// SOURCE column existed.
fn is_scraper_sourced(row: &[String], map: &HeaderMap) -> bool {
    if Source::parse(map.cell(row, "SOURCE")) == Some(Source::O2) {
        return true;
    }
    if map.cell(row, "EVENT_URL").to_lowercase().contains("theo2.co.uk") {
        return true;
    }
    map.cell(row, "VENUE_ID").to_lowercase().starts_with("o2-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::schema::SOURCE_EVENT_COLUMNS;
    use chrono::TimeZone;

    fn destination(rows: Vec<Vec<String>>) -> Sheet {
        Sheet {
            headers: SOURCE_EVENT_COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows,
        }
    }

    fn row(name: &str, date: &str, venue: &str, url: &str, source: &str) -> Vec<String> {
        let mut cells = vec![String::new(); SOURCE_EVENT_COLUMNS.len()];
        let map = HeaderMap::new(
            &SOURCE_EVENT_COLUMNS
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>(),
        );
        for (column, value) in [
            ("EVENT_NAME", name),
            ("EVENT_DATE", date),
            ("VENUE_NAME", venue),
            ("EVENT_URL", url),
            ("SOURCE", source),
        ] {
            if let Some(i) = map.index(column) {
                cells[i] = value.to_string();
            }
        }
        cells
    }

    fn scraped(name: &str, date: &str, venue: &str, url: &str) -> RawEvent {
        RawEvent {
            source: Some(Source::O2),
            source_reference: "o2-scraper".into(),
            event_name: name.into(),
            event_date: date.into(),
            venue_name: venue.into(),
            event_url: url.into(),
            ..Default::default()
        }
    }

    fn noon(y: i32, mo: u32, d: u32) -> DateTime<Tz> {
        TIMEZONE.with_ymd_and_hms(y, mo, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn url_match_in_either_destination_blocks_admission() {
        let mut staging = destination(vec![row(
            "Kept Gig",
            "2026-06-15",
            "the o2",
            "https://www.theo2.co.uk/events/detail/gig-a",
            "O2",
        )]);
        let mut public = destination(vec![]);

        let summary = sync_at(
            vec![scraped(
                "Renamed Gig",
                "2026-06-16",
                "elsewhere",
                "http://theo2.co.uk/events/detail/gig-a/",
            )],
            &mut staging,
            &mut public,
            noon(2026, 6, 1),
        );

        assert_eq!(summary.admitted, 0);
        assert_eq!(summary.url_matches, 1);
        assert_eq!(staging.rows.len(), 1);
    }

    #[test]
    fn composite_match_blocks_when_no_url_present() {
        let mut staging = destination(vec![]);
        let mut public = destination(vec![row("Gig A", "2026-06-15", "The O2 Arena, London", "", "MANUAL")]);

        let summary = sync_at(
            vec![scraped("Gig A", "15.06.26", "the o2", "")],
            &mut staging,
            &mut public,
            noon(2026, 6, 1),
        );

        assert_eq!(summary.admitted, 0);
        assert_eq!(summary.composite_matches, 1);
    }

    #[test]
    fn new_events_are_appended_to_the_staging_destination() {
        let mut staging = destination(vec![]);
        let mut public = destination(vec![]);

        let summary = sync_at(
            vec![scraped(
                "Fresh Gig",
                "2026-06-20",
                "the o2",
                "https://theo2.co.uk/events/detail/fresh",
            )],
            &mut staging,
            &mut public,
            noon(2026, 6, 1),
        );

        assert_eq!(summary.admitted, 1);
        assert_eq!(staging.rows.len(), 1);
        let map = staging.header_map();
        assert_eq!(map.cell(&staging.rows[0], "EVENT_NAME"), "Fresh Gig");
        assert_eq!(map.cell(&staging.rows[0], "SOURCE"), "O2");
        assert_eq!(map.cell(&staging.rows[0], "ADDED_DATE"), "2026-06-01");
        assert!(public.rows.is_empty());
    }

    #[test]
    fn events_without_dates_are_not_admitted() {
        let mut staging = destination(vec![]);
        let mut public = destination(vec![]);
        let summary = sync_at(
            vec![scraped("Dateless", "", "the o2", "")],
            &mut staging,
            &mut public,
            noon(2026, 6, 1),
        );
        assert_eq!(summary.skipped_no_date, 1);
        assert!(staging.rows.is_empty());
    }

    #[test]
    fn staging_prune_only_touches_scraper_rows() {
        let mut staging = destination(vec![
            row("Old Scraped", "2026-01-01", "the o2", "", "O2"),
            row("Old Manual", "2026-01-01", "troxy", "", "MANUAL"),
            row(
                "Old By Url",
                "2026-01-02",
                "the o2",
                "https://theo2.co.uk/events/x",
                "",
            ),
        ]);
        let mut public = destination(vec![]);

        let summary = sync_at(Vec::new(), &mut staging, &mut public, noon(2026, 6, 1));

        assert_eq!(summary.pruned_staging, 2);
        assert_eq!(staging.rows.len(), 1);
        let map = staging.header_map();
        assert_eq!(map.cell(&staging.rows[0], "EVENT_NAME"), "Old Manual");
    }

    #[test]
    fn public_prune_deletes_outdated_rows_of_any_source() {
        let mut staging = destination(vec![]);
        let mut public = destination(vec![
            row("Old Manual", "2026-01-01", "troxy", "", "MANUAL"),
            row("Current", "2026-06-20", "troxy", "", "MANUAL"),
        ]);

        let summary = sync_at(Vec::new(), &mut staging, &mut public, noon(2026, 6, 1));

        assert_eq!(summary.pruned_public, 1);
        assert_eq!(public.rows.len(), 1);
    }
}
