// LogWarden - core/filter.rs
//
// Trailing-window selection and the optional HTTP error-status prefilter.
// Core layer: pure logic, no I/O. "Now" arrives inside the caller's
// TimeWindow, so results depend only on the arguments.

use crate::core::model::{LogBatch, TimeWindow, TimestampPolicy};
use crate::core::parser::parse_timestamp;
use crate::util::constants::DEBUG_MAX_LINE_PREVIEW;
use crate::util::error::TimestampError;
use regex::Regex;
use std::sync::OnceLock;

/// Select the lines whose timestamp lies inside `window` (inclusive).
///
/// Lines without a timestamp, or with a malformed one, are dropped.
/// Input order is preserved; nothing is deduplicated or capped.
pub fn select<S: AsRef<str>>(
    lines: &[S],
    window: &TimeWindow,
    policy: TimestampPolicy,
) -> LogBatch {
    let reference = window.reference_offset();

    let lines = lines
        .iter()
        .map(|line| line.as_ref())
        .filter(|line| match parse_timestamp(line, reference, policy) {
            Ok(ts) => window.contains(&ts),
            Err(TimestampError::NotFound) => false,
            Err(e) => {
                tracing::debug!(
                    error = %e,
                    line = %preview(line),
                    "Dropping line with malformed timestamp"
                );
                false
            }
        })
        .map(str::to_owned)
        .collect();

    LogBatch { lines }
}

/// Request line followed by a 4xx/5xx status, as in common/combined format.
fn error_status_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#""\w+ [^"]+ HTTP/[\d.]+" [45]\d{2} "#).expect("error status regex")
    })
}

/// Keep only lines that record a client or server error response.
pub fn errors_only(batch: LogBatch) -> LogBatch {
    let re = error_status_re();
    LogBatch {
        lines: batch
            .lines
            .into_iter()
            .filter(|line| re.is_match(line))
            .collect(),
    }
}

/// Truncate a line for debug output.
fn preview(line: &str) -> &str {
    match line.char_indices().nth(DEBUG_MAX_LINE_PREVIEW) {
        Some((idx, _)) => &line[..idx],
        None => line,
    }
}
