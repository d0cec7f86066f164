// LogWarden - platform/report.rs
//
// Stdout report sink. Findings are free-form text; no structure is imposed
// or persisted.

use crate::app::check::ReportSink;
use crate::core::model::TimeWindow;
use std::io::{self, Write};

/// Writes reports to any `Write`; stdout in production.
pub struct WriterSink<W: Write> {
    out: W,
}

/// The production sink.
pub type StdoutSink = WriterSink<io::Stdout>;

impl StdoutSink {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> WriterSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReportSink for WriterSink<W> {
    fn findings(&mut self, window: &TimeWindow, batch_len: usize, report: &str) -> io::Result<()> {
        writeln!(
            self.out,
            "Anomalies detected ({batch_len} lines reviewed, window {window}):"
        )?;
        writeln!(self.out, "{}", report.trim_end())?;
        writeln!(self.out)?;
        self.out.flush()
    }

    fn no_logs(&mut self, window: &TimeWindow) -> io::Result<()> {
        writeln!(self.out, "No logs in window ({window}).")?;
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeDelta, TimeZone, Utc};

    fn window() -> TimeWindow {
        let now = Utc.with_ymd_and_hms(2025, 1, 10, 5, 0, 0).unwrap();
        TimeWindow::trailing(
            now,
            TimeDelta::hours(2),
            FixedOffset::east_opt(9 * 3600).unwrap(),
        )
    }

    #[test]
    fn test_findings_have_header_and_body() {
        let mut sink = WriterSink::new(Vec::new());
        sink.findings(&window(), 3, "1. 203.0.113.7 ...\n\n").unwrap();

        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert!(text.starts_with("Anomalies detected (3 lines reviewed, window 2025/01/10 12:00:00 +09:00 .. 2025/01/10 14:00:00 +09:00):\n"));
        assert!(text.contains("1. 203.0.113.7 ...\n"));
    }

    #[test]
    fn test_no_logs_notice() {
        let mut sink = WriterSink::new(Vec::new());
        sink.no_logs(&window()).unwrap();

        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert!(text.starts_with("No logs in window"));
    }
}
