// LogWarden - core/model.rs
//
// Core data model types. Pure data definitions with no I/O and no platform
// dependencies. These types are the shared vocabulary across all layers.

use chrono::{DateTime, FixedOffset, TimeDelta, Utc};
use std::time::Duration;

// =============================================================================
// Schedule
// =============================================================================

/// Unit of the check interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TimeUnit {
    #[default]
    Seconds,
    Minutes,
    Hours,
}

impl TimeUnit {
    /// Parse a config/CLI unit string.
    ///
    /// Accepts the single-letter forms `S`/`M`/`H` and the spelled-out
    /// singular or plural names, case-insensitively.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "s" | "sec" | "second" | "seconds" => Some(Self::Seconds),
            "m" | "min" | "minute" | "minutes" => Some(Self::Minutes),
            "h" | "hour" | "hours" => Some(Self::Hours),
            _ => None,
        }
    }

    /// Length of one unit in seconds.
    pub fn seconds(self) -> u64 {
        match self {
            Self::Seconds => 1,
            Self::Minutes => 60,
            Self::Hours => 3_600,
        }
    }

    /// Plural label for display.
    pub fn label(self) -> &'static str {
        match self {
            Self::Seconds => "seconds",
            Self::Minutes => "minutes",
            Self::Hours => "hours",
        }
    }
}

impl std::fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Fixed check cadence: run every `every` `unit`s.
///
/// Built once at startup and never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleSpec {
    pub every: u32,
    pub unit: TimeUnit,
}

impl ScheduleSpec {
    pub fn new(every: u32, unit: TimeUnit) -> Self {
        Self { every, unit }
    }

    /// Nominal time between two fires.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.every) * self.unit.seconds())
    }
}

impl std::fmt::Display for ScheduleSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "every {} {}", self.every, self.unit)
    }
}

// =============================================================================
// Time window
// =============================================================================

/// Closed interval `[start, end]` both tagged with the reference offset.
///
/// Recomputed on every tick; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

impl TimeWindow {
    /// The window of length `length` ending at `now`, expressed in `offset`.
    pub fn trailing(now: DateTime<Utc>, length: TimeDelta, offset: FixedOffset) -> Self {
        let end = now.with_timezone(&offset);
        Self {
            start: end - length,
            end,
        }
    }

    /// True when `ts` lies within the window, boundaries included.
    pub fn contains(&self, ts: &DateTime<FixedOffset>) -> bool {
        self.start <= *ts && *ts <= self.end
    }

    /// Offset used for "now" and for reinterpreting line timestamps.
    pub fn reference_offset(&self) -> FixedOffset {
        *self.end.offset()
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} .. {}",
            self.start.format("%Y/%m/%d %H:%M:%S %:z"),
            self.end.format("%Y/%m/%d %H:%M:%S %:z")
        )
    }
}

/// How a parsed access-log timestamp is turned into an instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimestampPolicy {
    /// Reinterpret the local wall-clock time in the window's reference
    /// offset, ignoring the offset token written in the line. Correct only
    /// when the server writes its logs in the reference zone.
    #[default]
    ReferenceZone,

    /// Honour the offset token in the line and convert to the reference
    /// offset. Correct for servers logging in any zone.
    EmbeddedOffset,
}

// =============================================================================
// Batch
// =============================================================================

/// Lines selected for one tick, in source-file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogBatch {
    pub lines: Vec<String>,
}

impl LogBatch {
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Newline-joined batch text, as embedded in the detector prompt.
    pub fn joined(&self) -> String {
        self.lines.join("\n")
    }
}

// =============================================================================
// Tick outcome
// =============================================================================

/// What a successful tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// No line fell inside the window; the detector was not called.
    NoLogsInWindow { lines_read: usize },

    /// A batch was analysed and its findings written to the sink.
    Reported { lines_read: usize, batch_len: usize },
}
