//! dtt remind and schedule command implementations.

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use tracing::info;

use crate::cli::load_context;
use crate::config::{parse_time_of_day, ReminderConfig};
use crate::error::{Error, Result};
use crate::notify::{send_daily_reminder, ReminderOutcome, ReminderSettings, SmtpMailer};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::schedule::{self, Clock, DailyJob, SystemClock};

pub struct RemindOptions {
    pub dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct ScheduleOptions {
    pub at: Option<String>,
    pub poll_secs: Option<u64>,
    pub dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

#[derive(Serialize)]
struct ScheduleStarted {
    at: String,
    next_run: String,
    poll_secs: u64,
}

pub fn run_remind(options: RemindOptions) -> Result<()> {
    let ctx = load_context(options.dir, None)?;
    let settings = ReminderSettings::from_env(&ctx.config.reminder);
    let mailer = SmtpMailer::from_settings(&settings);
    let outcome = send_daily_reminder(&settings, &mailer)?;

    let human = match &outcome {
        ReminderOutcome::Sent { recipients } => {
            let mut human = HumanOutput::new("Reminder sent");
            human.field("Relay", format!("{}:{}", settings.smtp_host, settings.smtp_port));
            human.field("Recipients", recipients.join(", "));
            human
        }
        ReminderOutcome::Skipped { missing } => {
            let mut human = HumanOutput::new("Reminder skipped");
            human.warn(format!("not set: {}", missing.join(", ")));
            human.hint("export EMAIL_SENDER, EMAIL_PASSWORD and RECIPIENTS");
            human
        }
    };

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "remind",
        &outcome,
        Some(&human),
    )
}

pub fn run_schedule(options: ScheduleOptions) -> Result<()> {
    let ctx = load_context(options.dir, None)?;
    let reminder = ctx.config.reminder;
    let (at, poll) = schedule_params(&reminder, options.at.as_deref(), options.poll_secs)?;

    let clock = SystemClock;
    let mut job = DailyJob::new(at, clock.now());

    let mut human = HumanOutput::new("Scheduler running");
    human.field("At", at.format("%H:%M").to_string());
    human.field("Next run", job.next_run().to_string());
    human.field("Poll", format!("{}s", poll.as_secs()));
    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "schedule",
        &ScheduleStarted {
            at: at.format("%H:%M").to_string(),
            next_run: job.next_run().to_string(),
            poll_secs: poll.as_secs(),
        },
        Some(&human),
    )?;

    schedule::run_loop(
        &mut job,
        poll,
        &clock,
        || {
            // Environment is re-read on every run.
            let settings = ReminderSettings::from_env(&reminder);
            let outcome = send_daily_reminder(&settings, &SmtpMailer::from_settings(&settings))?;
            info!(?outcome, "scheduled reminder finished");
            Ok(())
        },
        |_| true,
    );
    Ok(())
}

fn schedule_params(
    reminder: &ReminderConfig,
    at: Option<&str>,
    poll_secs: Option<u64>,
) -> Result<(chrono::NaiveTime, Duration)> {
    let at = match at {
        Some(raw) => parse_time_of_day(raw).map_err(|msg| Error::InvalidArgument(format!("--at: {msg}")))?,
        None => reminder.time_of_day()?,
    };
    let poll_secs = poll_secs.unwrap_or(reminder.poll_secs);
    if poll_secs == 0 {
        return Err(Error::InvalidArgument("--poll-secs must be > 0".to_string()));
    }
    Ok((at, Duration::from_secs(poll_secs)))
}
