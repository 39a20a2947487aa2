//! Typed parser/serializer pairs for each external tabular schema.
//!
//! Internal stages work on the structs in [`crate::domain`]; only this module
//! knows the wire column sets, which must match the collaborator store
//! exactly.

use crate::domain::{
    Category, PublishedEvent, RawEvent, Source, StagedEvent, ValidationStatus, Venue,
};
use crate::normalize::is_truthy;
use crate::sheet::{parse_string_list_cell, Sheet};

/// Column set for raw event source sheets.
pub const SOURCE_EVENT_COLUMNS: [&str; 14] = [
    "EVENT_NAME",
    "ARTIST_NAME",
    "VENUE_NAME",
    "CITY",
    "COUNTRY",
    "EVENT_DATE",
    "EVENT_TIME",
    "EVENT_URL",
    "IMAGE_URL",
    "ACCESS_STATUS",
    "CATEGORY",
    "SOURCE",
    "NOTES",
    "ADDED_DATE",
];

/// Column set for the staged events sheet.
pub const STAGED_COLUMNS: [&str; 25] = [
    "EVENT_ID",
    "SOURCE",
    "SOURCE_REFERENCE",
    "EVENT_DATE",
    "EVENT_TIME",
    "EVENT_NAME",
    "ARTIST_NAME",
    "EVENT_ORGANISER",
    "VENUE_ID",
    "VENUE_NAME",
    "CITY",
    "COUNTRY",
    "LANGUAGE",
    "TICKET_URL",
    "IMAGE_URL",
    "CATEGORY_ID",
    "CATEGORY_SUGGESTION",
    "VENUE_ID_OVERRIDE",
    "CATEGORY_OVERRIDE",
    "TICKET_URL_OVERRIDE",
    "IMAGE_URL_OVERRIDE",
    "ACCESS_STATUS",
    "NOTES",
    "VALIDATION_STATUS",
    "APPROVE",
];

/// Column set for the venue reference sheet.
pub const VENUE_COLUMNS: [&str; 17] = [
    "VENUE_ID",
    "VENUE_NAME",
    "VENUE_ALIASES",
    "CITY",
    "COUNTRY",
    "LANGUAGE",
    "INTERPRETER_STATUS",
    "ACCESS_EMAIL",
    "ACCESS_PHONE",
    "TEXTPHONE",
    "VRS_PROVIDER",
    "VRS_URL",
    "DEFAULT_TICKET_URL",
    "DEFAULT_IMAGE_URL",
    "BOOKING_GUIDE_URL",
    "ACCESS_NOTES",
    "OFFICIAL_SITE_URL",
];

/// Column set for the category reference sheet.
pub const CATEGORY_COLUMNS: [&str; 4] = [
    "CATEGORY_ID",
    "CATEGORY_NAME",
    "KEYWORDS",
    "DEFAULT_IMAGE_URL",
];

/// Column set for the public publish sheet.
pub const PUBLISH_COLUMNS: [&str; 15] = [
    "EVENT_ID",
    "DATE",
    "TIME",
    "EVENT",
    "ARTIST",
    "ORGANISER",
    "VENUE",
    "CITY",
    "COUNTRY",
    "LANGUAGE",
    "URL",
    "IMAGE",
    "CATEGORY",
    "ACCESS_STATUS",
    "LAST_UPDATED",
];

fn owned(columns: &[&str]) -> Vec<String> {
    columns.iter().map(|c| c.to_string()).collect()
}

/// Extracts raw events from a source sheet.
///
/// The SOURCE cell wins when it names a known source; rows without both a
/// name and a date are dropped (they cannot take part in identity).
pub fn parse_raw_events(
    sheet: &Sheet,
    default_source: Source,
    source_reference: &str,
) -> Vec<RawEvent> {
    let map = sheet.header_map();
    let mut events = Vec::new();

    for row in &sheet.rows {
        let source = Source::parse(map.cell(row, "SOURCE")).unwrap_or(default_source);
        let event = RawEvent {
            source: Some(source),
            source_reference: source_reference.to_string(),
            event_date: map.cell(row, "EVENT_DATE").to_string(),
            event_time: map.cell(row, "EVENT_TIME").to_string(),
            event_name: map.cell(row, "EVENT_NAME").to_string(),
            artist_name: map.cell(row, "ARTIST_NAME").to_string(),
            event_organiser: map.cell(row, "EVENT_ORGANISER").to_string(),
            venue_name: map.cell(row, "VENUE_NAME").to_string(),
            event_url: map.cell(row, "EVENT_URL").to_string(),
            image_url: map.cell(row, "IMAGE_URL").to_string(),
            category: map.cell(row, "CATEGORY").to_string(),
            access_status: map.cell(row, "ACCESS_STATUS").to_string(),
            notes: map.cell(row, "NOTES").to_string(),
        };

        if !event.event_name.trim().is_empty() && !event.event_date.trim().is_empty() {
            events.push(event);
        }
    }

    events
}

pub fn parse_staged_events(sheet: &Sheet) -> Vec<StagedEvent> {
    let map = sheet.header_map();
    sheet
        .rows
        .iter()
        .map(|row| StagedEvent {
            event_id: map.cell(row, "EVENT_ID").to_string(),
            source: Source::parse(map.cell(row, "SOURCE")),
            source_reference: map.cell(row, "SOURCE_REFERENCE").to_string(),
            event_date: map.cell(row, "EVENT_DATE").to_string(),
            event_time: map.cell(row, "EVENT_TIME").to_string(),
            event_name: map.cell(row, "EVENT_NAME").to_string(),
            artist_name: map.cell(row, "ARTIST_NAME").to_string(),
            event_organiser: map.cell(row, "EVENT_ORGANISER").to_string(),
            venue_id: map.cell(row, "VENUE_ID").to_string(),
            venue_name: map.cell(row, "VENUE_NAME").to_string(),
            city: map.cell(row, "CITY").to_string(),
            country: map.cell(row, "COUNTRY").to_string(),
            language: map.cell(row, "LANGUAGE").to_string(),
            ticket_url: map.cell(row, "TICKET_URL").to_string(),
            image_url: map.cell(row, "IMAGE_URL").to_string(),
            category_id: map.cell(row, "CATEGORY_ID").to_string(),
            category_suggestion: map.cell(row, "CATEGORY_SUGGESTION").to_string(),
            venue_id_override: map.cell(row, "VENUE_ID_OVERRIDE").to_string(),
            category_override: map.cell(row, "CATEGORY_OVERRIDE").to_string(),
            ticket_url_override: map.cell(row, "TICKET_URL_OVERRIDE").to_string(),
            image_url_override: map.cell(row, "IMAGE_URL_OVERRIDE").to_string(),
            access_status: map.cell(row, "ACCESS_STATUS").to_string(),
            notes: map.cell(row, "NOTES").to_string(),
            validation_status: ValidationStatus::parse(map.cell(row, "VALIDATION_STATUS")),
            approve: is_truthy(map.cell(row, "APPROVE")),
        })
        .collect()
}

pub fn staged_events_to_sheet(events: &[StagedEvent]) -> Sheet {
    let mut sheet = Sheet::new(owned(&STAGED_COLUMNS));
    for event in events {
        sheet.rows.push(vec![
            event.event_id.clone(),
            event.source.map(|s| s.as_str().to_string()).unwrap_or_default(),
            event.source_reference.clone(),
            event.event_date.clone(),
            event.event_time.clone(),
            event.event_name.clone(),
            event.artist_name.clone(),
            event.event_organiser.clone(),
            event.venue_id.clone(),
            event.venue_name.clone(),
            event.city.clone(),
            event.country.clone(),
            event.language.clone(),
            event.ticket_url.clone(),
            event.image_url.clone(),
            event.category_id.clone(),
            event.category_suggestion.clone(),
            event.venue_id_override.clone(),
            event.category_override.clone(),
            event.ticket_url_override.clone(),
            event.image_url_override.clone(),
            event.access_status.clone(),
            event.notes.clone(),
            event
                .validation_status
                .map(|s| s.as_str().to_string())
                .unwrap_or_default(),
            if event.approve { "TRUE" } else { "FALSE" }.to_string(),
        ]);
    }
    sheet
}

pub fn parse_venues(sheet: &Sheet) -> Vec<Venue> {
    let map = sheet.header_map();
    sheet
        .rows
        .iter()
        .filter(|row| !map.cell(row, "VENUE_ID").trim().is_empty())
        .map(|row| Venue {
            venue_id: map.cell(row, "VENUE_ID").to_string(),
            venue_name: map.cell(row, "VENUE_NAME").to_string(),
            aliases: parse_string_list_cell(map.cell(row, "VENUE_ALIASES")),
            city: map.cell(row, "CITY").to_string(),
            country: map.cell(row, "COUNTRY").to_string(),
            language: map.cell(row, "LANGUAGE").to_string(),
            interpreter_status: map.cell(row, "INTERPRETER_STATUS").to_string(),
            access_email: map.cell(row, "ACCESS_EMAIL").to_string(),
            access_phone: map.cell(row, "ACCESS_PHONE").to_string(),
            textphone: map.cell(row, "TEXTPHONE").to_string(),
            vrs_provider: map.cell(row, "VRS_PROVIDER").to_string(),
            vrs_url: map.cell(row, "VRS_URL").to_string(),
            default_ticket_url: map.cell(row, "DEFAULT_TICKET_URL").to_string(),
            default_image_url: map.cell(row, "DEFAULT_IMAGE_URL").to_string(),
            booking_guide_url: map.cell(row, "BOOKING_GUIDE_URL").to_string(),
            access_notes: map.cell(row, "ACCESS_NOTES").to_string(),
            official_site_url: map.cell(row, "OFFICIAL_SITE_URL").to_string(),
        })
        .collect()
}

pub fn parse_categories(sheet: &Sheet) -> Vec<Category> {
    let map = sheet.header_map();
    sheet
        .rows
        .iter()
        .filter(|row| !map.cell(row, "CATEGORY_ID").trim().is_empty())
        .map(|row| Category {
            category_id: map.cell(row, "CATEGORY_ID").to_string(),
            category_name: map.cell(row, "CATEGORY_NAME").to_string(),
            keywords: parse_string_list_cell(map.cell(row, "KEYWORDS")),
            default_image_url: map.cell(row, "DEFAULT_IMAGE_URL").to_string(),
        })
        .collect()
}

pub fn published_events_to_sheet(events: &[PublishedEvent]) -> Sheet {
    let mut sheet = Sheet::new(owned(&PUBLISH_COLUMNS));
    for event in events {
        sheet.rows.push(vec![
            event.event_id.clone(),
            event.date.clone(),
            event.time.clone(),
            event.event.clone(),
            event.artist.clone(),
            event.organiser.clone(),
            event.venue.clone(),
            event.city.clone(),
            event.country.clone(),
            event.language.clone(),
            event.url.clone(),
            event.image.clone(),
            event.category.clone(),
            event.access_status.clone(),
            event.last_updated.clone(),
        ]);
    }
    sheet
}
