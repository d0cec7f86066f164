// LogWarden - app/scheduler.rs
//
// Fixed-cadence trigger loop.
//
// Architecture:
//   - One thread of control. `run` polls a monotonic clock every
//     `poll` interval and calls `tick` synchronously when a fire is due.
//   - Ticks never overlap: the loop does not poll while `tick` runs.
//   - Fire times lag the nominal boundary by at most one poll interval.
//   - Due times advance from the previous due time, not from when the
//     poll noticed it, so poll lateness never accumulates. A tick that
//     overruns the interval moves the next fire to the first poll after
//     it returns; missed boundaries are never replayed.
//   - An `AtomicBool` stop flag is checked between polls. The binary never
//     sets it (the process ends on SIGINT/SIGTERM); tests use it to exit.

use crate::core::model::ScheduleSpec;
use crate::util::constants::SCHEDULER_POLL_INTERVAL_MS;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Monotonic time source for the scheduler.
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration);
}

/// Real clock backed by `Instant::now` and `thread::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Periodic trigger for the check routine.
#[derive(Debug, Clone, Copy)]
pub struct Scheduler {
    interval: Duration,
    poll: Duration,
}

impl Scheduler {
    /// Scheduler firing on `spec` with the default polling granularity.
    pub fn new(spec: &ScheduleSpec) -> Self {
        Self::with_poll_interval(spec, Duration::from_millis(SCHEDULER_POLL_INTERVAL_MS))
    }

    /// Scheduler with an explicit polling granularity.
    ///
    /// A zero poll interval is raised to one millisecond so the loop never
    /// spins.
    pub fn with_poll_interval(spec: &ScheduleSpec, poll: Duration) -> Self {
        Self {
            interval: spec.interval(),
            poll: poll.max(Duration::from_millis(1)),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run until `stop` is set, calling `tick` once per interval.
    ///
    /// The first fire happens one full interval after the call. Returns the
    /// number of fires performed.
    pub fn run<F>(&self, clock: &dyn Clock, stop: &AtomicBool, mut tick: F) -> u64
    where
        F: FnMut(),
    {
        let mut next_due = clock.now() + self.interval;
        let mut fires: u64 = 0;

        tracing::debug!(
            interval_secs = self.interval.as_secs(),
            poll_ms = self.poll.as_millis() as u64,
            "Scheduler started"
        );

        loop {
            if stop.load(Ordering::SeqCst) {
                tracing::debug!(fires, "Scheduler stopped");
                return fires;
            }

            let fired_at = clock.now();
            if fired_at < next_due {
                clock.sleep(self.poll);
                continue;
            }

            fires += 1;
            tracing::debug!(fire = fires, "Scheduler fire");
            tick();

            let finished_at = clock.now();
            next_due += self.interval;
            if next_due <= finished_at {
                next_due = finished_at;
            }

            if finished_at > fired_at + self.interval {
                tracing::warn!(
                    elapsed_secs = (finished_at - fired_at).as_secs(),
                    interval_secs = self.interval.as_secs(),
                    "Check took longer than the schedule interval; next check delayed"
                );
            }
        }
    }
}
