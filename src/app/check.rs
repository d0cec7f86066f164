// LogWarden - app/check.rs
//
// One tick of the monitor: read the log, select the trailing window, hand a
// non-empty batch to the anomaly detector, and write its findings out.
//
// Every per-tick fault (unreadable log, detector failure) is contained here:
// it is logged and the tick ends, leaving the scheduler untouched. The next
// scheduled fire is the retry.

use crate::core::filter;
use crate::core::model::{CheckOutcome, LogBatch, TimeWindow, TimestampPolicy};
use crate::util::error::{DetectorError, Result, SourceError};
use chrono::{DateTime, FixedOffset, TimeDelta, Utc};
use std::io;

// =============================================================================
// Collaborator seams
// =============================================================================

/// Supplies the full current content of the monitored log.
pub trait LogSource {
    fn read_lines(&self) -> std::result::Result<Vec<String>, SourceError>;
}

/// Reviews a batch of log lines and returns a free-form findings report.
pub trait AnomalyDetector {
    fn analyze(&self, batch: &LogBatch) -> std::result::Result<String, DetectorError>;
}

/// Where operator-facing output goes.
pub trait ReportSink {
    /// Findings for a non-empty batch.
    fn findings(&mut self, window: &TimeWindow, batch_len: usize, report: &str) -> io::Result<()>;

    /// Nothing fell inside the window this tick.
    fn no_logs(&mut self, window: &TimeWindow) -> io::Result<()>;
}

// =============================================================================
// Checker
// =============================================================================

/// Window and filtering settings for each tick, fixed at startup.
#[derive(Debug, Clone, Copy)]
pub struct CheckSettings {
    pub window_length: TimeDelta,
    pub reference_offset: FixedOffset,
    pub timestamp_policy: TimestampPolicy,
    pub errors_only: bool,
}

/// Owns the collaborators for the tick routine.
pub struct Checker<S, D, K> {
    settings: CheckSettings,
    source: S,
    detector: D,
    sink: K,
}

impl<S, D, K> Checker<S, D, K>
where
    S: LogSource,
    D: AnomalyDetector,
    K: ReportSink,
{
    pub fn new(settings: CheckSettings, source: S, detector: D, sink: K) -> Self {
        Self {
            settings,
            source,
            detector,
            sink,
        }
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Scheduler entry point: run one check against the wall clock and log
    /// the result. Never panics on a per-tick fault.
    pub fn tick(&mut self) {
        match self.check_at(Utc::now()) {
            Ok(CheckOutcome::NoLogsInWindow { lines_read }) => {
                tracing::info!(lines_read, "No logs in window");
            }
            Ok(CheckOutcome::Reported {
                lines_read,
                batch_len,
            }) => {
                tracing::info!(lines_read, batch_len, "Findings reported");
            }
            Err(e) => {
                tracing::error!(error = %e, "Check failed; will retry on next schedule");
            }
        }
    }

    /// Run one check with an explicit "now".
    pub fn check_at(&mut self, now: DateTime<Utc>) -> Result<CheckOutcome> {
        let window = TimeWindow::trailing(
            now,
            self.settings.window_length,
            self.settings.reference_offset,
        );
        tracing::debug!(window = %window, "Check started");

        let lines = self.source.read_lines()?;
        let lines_read = lines.len();

        let mut batch = filter::select(&lines, &window, self.settings.timestamp_policy);
        if self.settings.errors_only {
            batch = filter::errors_only(batch);
        }

        if batch.is_empty() {
            if let Err(e) = self.sink.no_logs(&window) {
                tracing::warn!(error = %e, "Failed to write notice to report sink");
            }
            return Ok(CheckOutcome::NoLogsInWindow { lines_read });
        }

        tracing::debug!(lines_read, batch_len = batch.len(), "Sending batch to detector");
        let report = self.detector.analyze(&batch)?;

        if let Err(e) = self.sink.findings(&window, batch.len(), &report) {
            tracing::warn!(error = %e, "Failed to write findings to report sink");
        }

        Ok(CheckOutcome::Reported {
            lines_read,
            batch_len: batch.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::error::WardenError;
    use chrono::TimeZone;
    use std::cell::RefCell;
    use std::path::PathBuf;

    struct StaticSource(Vec<String>);

    impl LogSource for StaticSource {
        fn read_lines(&self) -> std::result::Result<Vec<String>, SourceError> {
            Ok(self.0.clone())
        }
    }

    struct MissingSource;

    impl LogSource for MissingSource {
        fn read_lines(&self) -> std::result::Result<Vec<String>, SourceError> {
            Err(SourceError::Io {
                path: PathBuf::from("/var/log/httpd/access.log"),
                source: io::Error::new(io::ErrorKind::NotFound, "No such file or directory"),
            })
        }
    }

    /// Records every batch it sees and answers with a canned result.
    struct RecordingDetector {
        batches: RefCell<Vec<Vec<String>>>,
        fail: bool,
    }

    impl RecordingDetector {
        fn ok() -> Self {
            Self {
                batches: RefCell::new(Vec::new()),
                fail: false,
            }
        }

        fn timing_out() -> Self {
            Self {
                fail: true,
                ..Self::ok()
            }
        }
    }

    impl AnomalyDetector for RecordingDetector {
        fn analyze(&self, batch: &LogBatch) -> std::result::Result<String, DetectorError> {
            self.batches.borrow_mut().push(batch.lines.clone());
            if self.fail {
                Err(DetectorError::Timeout { secs: 120 })
            } else {
                Ok(format!("{} suspicious lines", batch.len()))
            }
        }
    }

    #[derive(Default)]
    struct VecSink {
        findings: Vec<String>,
        notices: usize,
    }

    impl ReportSink for VecSink {
        fn findings(&mut self, _: &TimeWindow, _: usize, report: &str) -> io::Result<()> {
            self.findings.push(report.to_string());
            Ok(())
        }

        fn no_logs(&mut self, _: &TimeWindow) -> io::Result<()> {
            self.notices += 1;
            Ok(())
        }
    }

    fn settings() -> CheckSettings {
        CheckSettings {
            window_length: TimeDelta::hours(2),
            reference_offset: FixedOffset::east_opt(9 * 3600).unwrap(),
            timestamp_policy: TimestampPolicy::ReferenceZone,
            errors_only: false,
        }
    }

    /// 2025-01-10 14:00:00 JST.
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 10, 5, 0, 0).unwrap()
    }

    fn line(time: &str, status: u16) -> String {
        format!(r#"198.51.100.4 - - [10/Jan/2025:{time} +0900] "GET /login HTTP/1.1" {status} 64"#)
    }

    #[test]
    fn test_recent_lines_are_analysed_in_order() {
        let lines = vec![line("11:00:00", 200), line("13:00:00", 401), line("14:00:00", 200)];
        let mut checker = Checker::new(
            settings(),
            StaticSource(lines.clone()),
            RecordingDetector::ok(),
            VecSink::default(),
        );

        let outcome = checker.check_at(now()).unwrap();

        assert_eq!(
            outcome,
            CheckOutcome::Reported {
                lines_read: 3,
                batch_len: 2
            }
        );
        assert_eq!(
            *checker.detector.batches.borrow(),
            vec![vec![lines[1].clone(), lines[2].clone()]]
        );
        assert_eq!(checker.sink().findings, vec!["2 suspicious lines".to_string()]);
    }

    #[test]
    fn test_empty_log_skips_detector() {
        let mut checker = Checker::new(
            settings(),
            StaticSource(Vec::new()),
            RecordingDetector::ok(),
            VecSink::default(),
        );

        let outcome = checker.check_at(now()).unwrap();

        assert_eq!(outcome, CheckOutcome::NoLogsInWindow { lines_read: 0 });
        assert!(checker.detector.batches.borrow().is_empty());
        assert_eq!(checker.sink().notices, 1);
        assert!(checker.sink().findings.is_empty());
    }

    #[test]
    fn test_unreadable_source_is_a_source_error() {
        let mut checker = Checker::new(
            settings(),
            MissingSource,
            RecordingDetector::ok(),
            VecSink::default(),
        );

        let result = checker.check_at(now());

        assert!(matches!(result, Err(WardenError::Source(_))), "got {result:?}");
        assert!(checker.detector.batches.borrow().is_empty());
        // tick() must swallow the fault.
        checker.tick();
    }

    #[test]
    fn test_detector_timeout_writes_no_report() {
        let mut checker = Checker::new(
            settings(),
            StaticSource(vec![line("13:30:00", 500)]),
            RecordingDetector::timing_out(),
            VecSink::default(),
        );

        let result = checker.check_at(now());

        assert!(
            matches!(result, Err(WardenError::Detector(DetectorError::Timeout { .. }))),
            "got {result:?}"
        );
        assert!(checker.sink().findings.is_empty());
        assert_eq!(checker.sink().notices, 0);
    }

    #[test]
    fn test_errors_only_can_empty_the_batch() {
        let mut checker = Checker::new(
            CheckSettings {
                errors_only: true,
                ..settings()
            },
            StaticSource(vec![line("13:00:00", 200), line("13:10:00", 304)]),
            RecordingDetector::ok(),
            VecSink::default(),
        );

        let outcome = checker.check_at(now()).unwrap();

        assert_eq!(outcome, CheckOutcome::NoLogsInWindow { lines_read: 2 });
        assert!(checker.detector.batches.borrow().is_empty());
    }
}
