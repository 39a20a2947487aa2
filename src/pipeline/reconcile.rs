//! Reconciliation: merge raw events from every source into one deduplicated
//! staged set, carrying forward human decisions from the previous run.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::debug;

use crate::domain::{RawEvent, StagedEvent};
use crate::keys::event_id;
use crate::normalize::{normalize_url, normalize_venue_name};

/// Counts reported alongside the reconciled set.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconcileSummary {
    pub total_in: usize,
    pub kept: usize,
    pub duplicates_dropped: usize,
    pub approvals_carried: usize,
}

/// Approval and override state preserved across runs, keyed by event id.
#[derive(Debug, Clone, Default)]
struct CarriedDecisions {
    approve: bool,
    venue_id_override: String,
    category_override: String,
    ticket_url_override: String,
    image_url_override: String,
}

/// Merges raw event batches into a deduplicated staged set.
///
/// Events are processed source-priority-first (MONTHLY > MANUAL > O2); a
/// later event is a duplicate when its normalized URL matches a kept URL, or
/// failing that when its composite `date|name|venue` key matches a kept key.
/// The first kept instance wins outright; duplicates contribute nothing.
///
/// `previous` is the prior staged snapshot; surviving events found there by
/// identity keep their approval and override fields. Source snapshots are
/// never mutated.
pub fn reconcile(
    raw_events: Vec<RawEvent>,
    previous: &[StagedEvent],
) -> (Vec<StagedEvent>, ReconcileSummary) {
    let mut summary = ReconcileSummary {
        total_in: raw_events.len(),
        ..Default::default()
    };

    // Stable sort keeps intra-source input order for equal priorities.
    let mut ordered = raw_events;
    ordered.sort_by_key(|e| e.source.map(|s| s.priority()).unwrap_or(u8::MAX));

    let mut kept_url_keys: HashSet<String> = HashSet::new();
    let mut kept_composite_keys: HashSet<String> = HashSet::new();
    let mut kept: Vec<RawEvent> = Vec::new();

    for event in ordered {
        let url_key = {
            let normalized = normalize_url(&event.event_url);
            (!normalized.is_empty()).then_some(normalized)
        };
        let composite_key = composite_key_for(&event);

        if let Some(ref key) = url_key {
            if kept_url_keys.contains(key) {
                debug!(event = event.event_name, source = ?event.source, "duplicate by URL");
                summary.duplicates_dropped += 1;
                continue;
            }
        }
        if kept_composite_keys.contains(&composite_key) {
            debug!(event = event.event_name, source = ?event.source, "duplicate by composite key");
            summary.duplicates_dropped += 1;
            continue;
        }

        if let Some(key) = url_key {
            kept_url_keys.insert(key);
        }
        kept_composite_keys.insert(composite_key);
        kept.push(event);
    }

    let decisions = index_previous_decisions(previous);
    let mut staged = Vec::with_capacity(kept.len());

    for event in kept {
        let id = identity_for(&event);
        let carried = decisions.get(&id);
        if carried.is_some() {
            summary.approvals_carried += 1;
        }
        let carried = carried.cloned().unwrap_or_default();

        staged.push(StagedEvent {
            event_id: id,
            source: event.source,
            source_reference: event.source_reference,
            event_date: event.event_date,
            event_time: event.event_time,
            event_name: event.event_name,
            artist_name: event.artist_name,
            event_organiser: event.event_organiser,
            venue_id: String::new(),
            venue_name: event.venue_name,
            city: String::new(),
            country: String::new(),
            language: String::new(),
            // Enrichment applies the fallback chain; the original event URL
            // is the starting point.
            ticket_url: event.event_url,
            image_url: event.image_url,
            category_id: String::new(),
            category_suggestion: event.category,
            venue_id_override: carried.venue_id_override,
            category_override: carried.category_override,
            ticket_url_override: carried.ticket_url_override,
            image_url_override: carried.image_url_override,
            access_status: event.access_status,
            notes: event.notes,
            validation_status: None,
            approve: carried.approve,
        });
    }

    summary.kept = staged.len();
    (staged, summary)
}

/// Composite dedup key for a raw event. The venue ref is the normalized
/// venue name; no resolver has run at this stage.
fn composite_key_for(event: &RawEvent) -> String {
    crate::keys::event_key(
        &event.event_date,
        &event.event_name,
        &normalize_venue_name(&event.venue_name),
    )
}

/// Cross-run identity for a raw event, consistent with [`composite_key_for`].
fn identity_for(event: &RawEvent) -> String {
    event_id(
        &event.event_date,
        &event.event_name,
        &normalize_venue_name(&event.venue_name),
    )
}

fn index_previous_decisions(previous: &[StagedEvent]) -> HashMap<String, CarriedDecisions> {
    previous
        .iter()
        .filter(|e| !e.event_id.is_empty())
        .map(|e| {
            (
                e.event_id.clone(),
                CarriedDecisions {
                    approve: e.approve,
                    venue_id_override: e.venue_id_override.clone(),
                    category_override: e.category_override.clone(),
                    ticket_url_override: e.ticket_url_override.clone(),
                    image_url_override: e.image_url_override.clone(),
                },
            )
        })
        .collect()
}
