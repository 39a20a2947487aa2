//! Event scheduling: time-of-day parsing and the outdated check.
//!
//! Shared by the publish filter and the live-sync pruner. Times are messy
//! free text (`"19:00 - 22:00"`, `"14:00/19:30"`, `"KO - 19:30"`); the
//! parser takes the first clock time it can find and everything else
//! defaults to 23:59 so an event is never pruned just because its time
//! field is unreadable.

use chrono::{DateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::constants::{OUTDATED_BUFFER_HOURS, TIMEZONE};
use crate::normalize::normalize_date;

static CLOCK_TIME: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{1,2}):(\d{2})").unwrap());

/// Outcome of parsing a time cell, kept explicit so the validator can tell a
/// stated time from the conservative fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTime {
    Parsed(NaiveTime),
    Defaulted,
}

impl EventTime {
    /// End-of-day fallback for missing or unparseable times.
    pub fn effective(&self) -> NaiveTime {
        match self {
            EventTime::Parsed(time) => *time,
            EventTime::Defaulted => NaiveTime::from_hms_opt(23, 59, 0).unwrap(),
        }
    }

    pub fn is_defaulted(&self) -> bool {
        matches!(self, EventTime::Defaulted)
    }
}

/// Extracts the first `H:MM` clock time from a time cell.
///
/// This one rule subsumes range handling (`"19:00 - 22:00"` reads 19:00),
/// slash alternatives (`"14:00/19:30"` reads 14:00) and non-numeric prefixes
/// (`"KO - 19:30"` reads 19:30).
pub fn parse_event_time(value: &str) -> EventTime {
    for capture in CLOCK_TIME.captures_iter(value) {
        let hour: u32 = match capture[1].parse() {
            Ok(h) => h,
            Err(_) => continue,
        };
        let minute: u32 = match capture[2].parse() {
            Ok(m) => m,
            Err(_) => continue,
        };
        if let Some(time) = NaiveTime::from_hms_opt(hour, minute, 0) {
            return EventTime::Parsed(time);
        }
    }
    EventTime::Defaulted
}

/// The moment an event is considered over, in the pipeline zone.
/// `None` when the date cell does not parse.
pub fn end_moment(event_date: &str, event_time: &str) -> Option<DateTime<Tz>> {
    let date = normalize_date(event_date)?;
    let naive = date.and_time(parse_event_time(event_time).effective());
    // DST transitions: an ambiguous local time takes the earlier offset, a
    // skipped one the later.
    match TIMEZONE.from_local_datetime(&naive) {
        chrono::LocalResult::Single(dt) => Some(dt),
        chrono::LocalResult::Ambiguous(earlier, _) => Some(earlier),
        chrono::LocalResult::None => date
            .succ_opt()
            .and_then(|next| TIMEZONE.from_local_datetime(&next.and_time(NaiveTime::MIN)).earliest()),
    }
}

/// True iff the event's end moment is more than the buffer before `now`.
/// Unparseable dates are never outdated; humans prune those.
pub fn is_outdated_at(event_date: &str, event_time: &str, now: DateTime<Tz>) -> bool {
    match end_moment(event_date, event_time) {
        Some(end) => end < now - chrono::Duration::hours(OUTDATED_BUFFER_HOURS),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn london(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Tz> {
        TIMEZONE.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn parses_plain_and_ranged_times() {
        assert_eq!(
            parse_event_time("19:00"),
            EventTime::Parsed(NaiveTime::from_hms_opt(19, 0, 0).unwrap())
        );
        assert_eq!(
            parse_event_time("19:00 - 22:00"),
            EventTime::Parsed(NaiveTime::from_hms_opt(19, 0, 0).unwrap())
        );
        assert_eq!(
            parse_event_time("14:00/19:30"),
            EventTime::Parsed(NaiveTime::from_hms_opt(14, 0, 0).unwrap())
        );
    }

    #[test]
    fn strips_non_numeric_prefixes() {
        assert_eq!(
            parse_event_time("KO - 19:30"),
            EventTime::Parsed(NaiveTime::from_hms_opt(19, 30, 0).unwrap())
        );
    }

    #[test]
    fn defaults_when_no_clock_time_present() {
        assert!(parse_event_time("").is_defaulted());
        assert!(parse_event_time("Start 7pm").is_defaulted());
        // An impossible clock reading is not a time.
        assert!(parse_event_time("77:99").is_defaulted());
    }

    #[test]
    fn timed_event_goes_outdated_after_the_buffer() {
        // Ends 19:00; buffer expires 01:00 next day.
        assert!(!is_outdated_at("2026-06-15", "19:00", london(2026, 6, 16, 0, 59)));
        assert!(is_outdated_at("2026-06-15", "19:00", london(2026, 6, 16, 1, 1)));
    }

    #[test]
    fn untimed_event_is_kept_through_the_evening() {
        // No time defaults to 23:59, so the buffer runs to 05:59 next day.
        assert!(!is_outdated_at("2026-06-15", "", london(2026, 6, 15, 17, 58)));
        assert!(!is_outdated_at("2026-06-15", "", london(2026, 6, 16, 0, 1)));
        assert!(!is_outdated_at("2026-06-15", "", london(2026, 6, 16, 5, 58)));
        assert!(is_outdated_at("2026-06-15", "", london(2026, 6, 16, 6, 0)));
    }

    #[test]
    fn unparseable_dates_are_never_outdated() {
        assert!(!is_outdated_at("TBC", "19:00", london(2030, 1, 1, 12, 0)));
    }
}
