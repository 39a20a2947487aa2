//! Validation: classify each enriched event's publishability and produce the
//! human-facing diagnostics the review sheet shows.
//!
//! Ticket and image URLs are soft requirements: common enough to miss that
//! their absence alone is a WARNING for operator triage, not a blocker.
//! Everything else in the required set is hard: missing one is an ERROR.

use serde::Serialize;

use crate::constants::{COLOR_ERROR, COLOR_OK, COLOR_WARNING};
use crate::domain::{StagedEvent, ValidationStatus};

/// Hard-required fields; missing any of these blocks publication.
const HARD_REQUIRED: [(&str, fn(&StagedEvent) -> &str); 6] = [
    ("EVENT_DATE", |e| &e.event_date),
    ("EVENT_TIME", |e| &e.event_time),
    ("EVENT_NAME", |e| &e.event_name),
    ("VENUE_ID", |e| &e.venue_id),
    ("CATEGORY_ID", |e| &e.category_id),
    ("LANGUAGE", |e| &e.language),
];

/// Classification of one event, with reviewer-readable reasons.
#[derive(Debug, Clone)]
pub struct ValidationOutcome {
    pub status: ValidationStatus,
    pub reasons: Vec<String>,
    pub color: &'static str,
}

/// A row highlight directive for the collaborator store. `row` is the
/// 1-based sheet row; the header row is row 1.
#[derive(Debug, Clone, Serialize)]
pub struct RowFormat {
    pub row: usize,
    pub color: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidateSummary {
    pub ok: usize,
    pub warnings: usize,
    pub errors: usize,
}

/// Pure classification of a single enriched event. Never mutates override or
/// identity fields.
pub fn validate_event(event: &StagedEvent) -> ValidationOutcome {
    let mut blocking = Vec::new();
    for (name, field) in HARD_REQUIRED {
        if field(event).trim().is_empty() {
            blocking.push(format!("Missing {name}"));
        }
    }
    if !blocking.is_empty() {
        return ValidationOutcome {
            status: ValidationStatus::Error,
            reasons: blocking,
            color: COLOR_ERROR,
        };
    }

    let mut warnings = Vec::new();
    if event.ticket_url.trim().is_empty() {
        warnings.push("Missing TICKET_URL".to_string());
    }
    if event.image_url.trim().is_empty() {
        warnings.push("Missing IMAGE_URL".to_string());
    }
    if !warnings.is_empty() {
        return ValidationOutcome {
            status: ValidationStatus::Warning,
            reasons: warnings,
            color: COLOR_WARNING,
        };
    }

    ValidationOutcome {
        status: ValidationStatus::Ok,
        reasons: Vec::new(),
        color: COLOR_OK,
    }
}

/// Validates the whole batch, stamping each event's status and accumulating
/// highlight directives: red for ERROR, amber for WARNING, green only for
/// approved OK rows.
pub fn validate(events: &mut [StagedEvent]) -> (Vec<RowFormat>, ValidateSummary) {
    let mut formats = Vec::new();
    let mut summary = ValidateSummary::default();

    for (i, event) in events.iter_mut().enumerate() {
        let outcome = validate_event(event);
        event.validation_status = Some(outcome.status);

        let sheet_row = i + 2;
        match outcome.status {
            ValidationStatus::Error => {
                summary.errors += 1;
                formats.push(RowFormat {
                    row: sheet_row,
                    color: outcome.color.to_string(),
                    reason: outcome.reasons.join("; "),
                });
            }
            ValidationStatus::Warning => {
                summary.warnings += 1;
                formats.push(RowFormat {
                    row: sheet_row,
                    color: outcome.color.to_string(),
                    reason: outcome.reasons.join("; "),
                });
            }
            ValidationStatus::Ok => {
                summary.ok += 1;
                if event.approve {
                    formats.push(RowFormat {
                        row: sheet_row,
                        color: outcome.color.to_string(),
                        reason: "OK_APPROVED".to_string(),
                    });
                }
            }
        }
    }

    (formats, summary)
}
