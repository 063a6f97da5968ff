//! Daily reminder email.
//!
//! Sender, credential and recipients come from the environment only:
//! `EMAIL_SENDER`, `EMAIL_PASSWORD`, `RECIPIENTS` (comma-separated) and the
//! optional `APP_URL` dashboard override. When any of the first three is
//! missing the reminder is skipped without touching the network.

use std::fmt;

use serde::Serialize;
use tracing::{info, warn};

use crate::config::ReminderConfig;
use crate::error::{Error, Result};

pub const ENV_SENDER: &str = "EMAIL_SENDER";
pub const ENV_PASSWORD: &str = "EMAIL_PASSWORD";
pub const ENV_RECIPIENTS: &str = "RECIPIENTS";
pub const ENV_DASHBOARD_URL: &str = "APP_URL";

pub const REMINDER_SUBJECT: &str = "Daily Task Tracker - please update your tasks";

/// Login for the mail relay. The password never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct MailCredentials {
    pub user: String,
    pub password: String,
}

impl fmt::Debug for MailCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailCredentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Everything the reminder needs, resolved from config and environment
#[derive(Debug, Clone)]
pub struct ReminderSettings {
    pub sender: Option<String>,
    pub password: Option<String>,
    pub recipients: Vec<String>,
    pub dashboard_url: String,
    pub smtp_host: String,
    pub smtp_port: u16,
}

impl ReminderSettings {
    /// Resolve settings from the process environment.
    pub fn from_env(config: &ReminderConfig) -> Self {
        Self::from_lookup(config, |key| std::env::var(key).ok())
    }

    /// Resolve settings through `lookup` instead of the real environment.
    pub fn from_lookup(config: &ReminderConfig, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let sender = non_empty(lookup(ENV_SENDER));
        let password = non_empty(lookup(ENV_PASSWORD));
        let recipients = lookup(ENV_RECIPIENTS)
            .map(|raw| parse_recipients(&raw))
            .unwrap_or_default();
        let dashboard_url =
            non_empty(lookup(ENV_DASHBOARD_URL)).unwrap_or_else(|| config.dashboard_url.clone());

        Self {
            sender,
            password,
            recipients,
            dashboard_url,
            smtp_host: config.smtp_host.clone(),
            smtp_port: config.smtp_port,
        }
    }

    /// Names of the environment variables that still need a value
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.sender.is_none() {
            missing.push(ENV_SENDER);
        }
        if self.password.is_none() {
            missing.push(ENV_PASSWORD);
        }
        if self.recipients.is_empty() {
            missing.push(ENV_RECIPIENTS);
        }
        missing
    }

    pub fn credentials(&self) -> Option<MailCredentials> {
        match (&self.sender, &self.password) {
            (Some(user), Some(password)) => Some(MailCredentials {
                user: user.clone(),
                password: password.clone(),
            }),
            _ => None,
        }
    }
}

/// Split a comma-separated list, dropping blank entries.
pub fn parse_recipients(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// A composed reminder ready for delivery
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReminderMessage {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

/// Fill the fixed template.
pub fn compose_reminder(from: &str, to: &[String], dashboard_url: &str) -> ReminderMessage {
    let body = format!(
        "Hi,\n\nThis is your automated reminder to update today's tasks.\n\nDashboard: {dashboard_url}\n\nRegards,\nTask Tracker Bot"
    );
    ReminderMessage {
        from: from.to_string(),
        to: to.to_vec(),
        subject: REMINDER_SUBJECT.to_string(),
        body,
    }
}

/// Delivers a composed message.
pub trait Mailer {
    fn deliver(&self, message: &ReminderMessage, credentials: &MailCredentials) -> Result<()>;
}

/// Authenticated SMTP over implicit TLS (the relay's port 465 by default)
#[derive(Debug, Clone)]
pub struct SmtpMailer {
    host: String,
    port: u16,
}

impl SmtpMailer {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn from_settings(settings: &ReminderSettings) -> Self {
        Self::new(settings.smtp_host.clone(), settings.smtp_port)
    }
}

impl Mailer for SmtpMailer {
    fn deliver(&self, message: &ReminderMessage, credentials: &MailCredentials) -> Result<()> {
        use lettre::message::header::ContentType;
        use lettre::message::{Mailbox, Message};
        use lettre::transport::smtp::authentication::Credentials;
        use lettre::{SmtpTransport, Transport};

        let from: Mailbox = message.from.parse().map_err(|err| {
            Error::Mail(format!("invalid sender address \"{}\": {err}", message.from))
        })?;
        let mut builder = Message::builder()
            .from(from)
            .subject(message.subject.as_str())
            .header(ContentType::TEXT_PLAIN);
        for addr in &message.to {
            let mailbox: Mailbox = addr
                .parse()
                .map_err(|err| Error::Mail(format!("invalid recipient \"{addr}\": {err}")))?;
            builder = builder.to(mailbox);
        }
        let email = builder
            .body(message.body.clone())
            .map_err(|err| Error::Mail(format!("failed to build message: {err}")))?;

        let transport = SmtpTransport::relay(&self.host)
            .map_err(|err| Error::Mail(format!("relay {}: {err}", self.host)))?
            .port(self.port)
            .credentials(Credentials::new(
                credentials.user.clone(),
                credentials.password.clone(),
            ))
            .build();

        transport
            .send(&email)
            .map_err(|err| Error::Mail(format!("{}:{}: {err}", self.host, self.port)))?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ReminderOutcome {
    Sent { recipients: Vec<String> },
    Skipped { missing: Vec<String> },
}

/// Send the reminder to every recipient, or skip when settings are missing.
pub fn send_daily_reminder(
    settings: &ReminderSettings,
    mailer: &dyn Mailer,
) -> Result<ReminderOutcome> {
    let (sender, credentials) = match (&settings.sender, settings.credentials()) {
        (Some(sender), Some(credentials)) if !settings.recipients.is_empty() => {
            (sender, credentials)
        }
        _ => {
            let missing = settings.missing();
            warn!(missing = %missing.join(","), "email creds or recipients missing; skipping reminder");
            return Ok(ReminderOutcome::Skipped {
                missing: missing.into_iter().map(str::to_string).collect(),
            });
        }
    };

    let message = compose_reminder(sender, &settings.recipients, &settings.dashboard_url);
    mailer.deliver(&message, &credentials)?;
    info!(recipients = settings.recipients.len(), "reminder email sent");
    Ok(ReminderOutcome::Sent {
        recipients: settings.recipients.clone(),
    })
}
