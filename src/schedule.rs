//! A once-a-day job polled at coarse resolution.
//!
//! The job is due when the wall clock reaches `next_run`. After it runs,
//! `next_run` moves to the next occurrence of the time of day strictly after
//! the moment it ran; missed days are not replayed.

use std::time::Duration;

use chrono::{Days, Local, NaiveDateTime, NaiveTime};
use tracing::{debug, error, info};

use crate::error::Result;

/// Default polling interval for the scheduler loop
pub const DEFAULT_POLL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyJob {
    at: NaiveTime,
    next_run: NaiveDateTime,
    runs: u64,
}

impl DailyJob {
    /// Schedule at `at`, starting with the first occurrence after `now`.
    pub fn new(at: NaiveTime, now: NaiveDateTime) -> Self {
        Self {
            at,
            next_run: next_occurrence(at, now),
            runs: 0,
        }
    }

    pub fn at(&self) -> NaiveTime {
        self.at
    }

    pub fn next_run(&self) -> NaiveDateTime {
        self.next_run
    }

    pub fn runs(&self) -> u64 {
        self.runs
    }

    pub fn is_due(&self, now: NaiveDateTime) -> bool {
        now >= self.next_run
    }

    /// Run `action` if due. Returns whether it ran. The job is rescheduled
    /// even when the action fails.
    pub fn run_pending<F>(&mut self, now: NaiveDateTime, action: F) -> bool
    where
        F: FnOnce() -> Result<()>,
    {
        if !self.is_due(now) {
            return false;
        }
        if let Err(err) = action() {
            error!(error = %err, "scheduled job failed");
        }
        self.runs += 1;
        self.next_run = next_occurrence(self.at, now);
        debug!(next_run = %self.next_run, "job rescheduled");
        true
    }
}

/// First `at` strictly after `now`.
pub fn next_occurrence(at: NaiveTime, now: NaiveDateTime) -> NaiveDateTime {
    let today = now.date().and_time(at);
    if today > now {
        return today;
    }
    now.date()
        .checked_add_days(Days::new(1))
        .map(|tomorrow| tomorrow.and_time(at))
        .unwrap_or(NaiveDateTime::MAX)
}

/// Source of "now" for the loop.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
    fn sleep(&self, duration: Duration);
}

/// Local wall clock with a real sleep
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Check, sleep, repeat. Returns only when `keep_going` says stop; the CLI
/// passes a predicate that never does.
pub fn run_loop<C, F, K>(job: &mut DailyJob, poll: Duration, clock: &C, mut action: F, mut keep_going: K)
where
    C: Clock,
    F: FnMut() -> Result<()>,
    K: FnMut(&DailyJob) -> bool,
{
    info!(at = %job.at(), next_run = %job.next_run(), poll_secs = poll.as_secs(), "scheduler started");
    while keep_going(job) {
        job.run_pending(clock.now(), &mut action);
        clock.sleep(poll);
    }
}
