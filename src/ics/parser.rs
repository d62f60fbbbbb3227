//! Splits a raw ICS document into VEVENT blocks and extracts the fields the
//! cache serves. Malformed blocks are dropped individually; one bad event
//! never fails the whole document.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use super::datetime::{parse_date_value, DecodedStart};
use super::text::{normalize_description, normalize_title};

/// Maximum length of a normalized description, in characters
const MAX_DESCRIPTION_CHARS: usize = 400;

lazy_static! {
    // Soft line folding: a CRLF (or LF) followed by a space or tab
    // continues the previous line.
    static ref FOLD_RE: Regex = Regex::new(r"\r?\n[ \t]").unwrap();
}

/// One calendar occurrence, ready to serialize for the API
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub all_day: bool,
}

/// Result of parsing one calendar document
#[derive(Debug, Default)]
pub struct ParseOutcome {
    /// Events in source order, unfiltered and unsorted
    pub events: Vec<Event>,
    /// Blocks dropped for a missing terminator, title or start date
    pub skipped: usize,
}

/// Parse an ICS document into events. Everything before the first
/// `BEGIN:VEVENT` is calendar-level metadata and is discarded.
pub fn parse_ics(text: &str, timezone: Option<Tz>) -> ParseOutcome {
    let mut outcome = ParseOutcome::default();

    for raw_block in text.split("BEGIN:VEVENT").skip(1) {
        // A block without a terminator is truncated; skip it without
        // giving up on the rest of the document.
        let Some(end) = raw_block.find("END:VEVENT") else {
            outcome.skipped += 1;
            continue;
        };

        // Unfold before field extraction: folding splits a logical field
        // across physical lines.
        let unfolded = FOLD_RE.replace_all(&raw_block[..end], "");

        let mut uid = "";
        let mut title = String::new();
        let mut description = String::new();
        let mut start: Option<DecodedStart> = None;

        // Last occurrence of a field wins; DTSTART keeps the last
        // decodable value.
        for line in unfolded.lines() {
            if let Some(rest) = line.strip_prefix("UID:") {
                uid = rest.trim();
            } else if let Some(rest) = line.strip_prefix("SUMMARY:") {
                title = normalize_title(rest);
            } else if let Some(rest) = line.strip_prefix("DESCRIPTION:") {
                description = normalize_description(rest);
            } else if line.starts_with("DTSTART") {
                if let Some(decoded) = parse_date_value(line, timezone) {
                    start = Some(decoded);
                }
            }
        }

        let Some(start) = start else {
            outcome.skipped += 1;
            continue;
        };
        if title.is_empty() {
            outcome.skipped += 1;
            continue;
        }

        // Deterministic fallback when the source omits a UID. Two events
        // sharing a title and instant collide; accepted, no dedup pass.
        let id = if uid.is_empty() {
            format!("{}-{}", title, start.date.timestamp_millis())
        } else {
            uid.to_string()
        };

        outcome.events.push(Event {
            id,
            title,
            description: truncate_chars(&description, MAX_DESCRIPTION_CHARS),
            date: start.date,
            all_day: start.all_day,
        });
    }

    outcome
}

fn truncate_chars(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        value.to_string()
    } else {
        value.chars().take(max).collect()
    }
}
