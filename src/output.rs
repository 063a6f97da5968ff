//! Command reports: a short human summary on stdout, or the `dtt.v1` JSON
//! envelope with `--json`.

use serde::Serialize;

use crate::config::CONFIG_FILE;
use crate::error::{Error, JsonError, Result};
use crate::task::TaskStatus;

pub const SCHEMA_VERSION: &str = "dtt.v1";

#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub json: bool,
    pub quiet: bool,
}

/// What a command tells a person when it finishes
#[derive(Debug, Clone, Default)]
pub struct HumanOutput {
    header: String,
    fields: Vec<(String, String)>,
    rows: Vec<String>,
    warnings: Vec<String>,
    next_steps: Vec<String>,
}

impl HumanOutput {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            ..Self::default()
        }
    }

    /// `Key: value` line under the header
    pub fn field(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.push((key.into(), value.into()));
    }

    /// One listed item, e.g. a task row
    pub fn row(&mut self, value: impl Into<String>) {
        self.rows.push(value.into());
    }

    pub fn warn(&mut self, value: impl Into<String>) {
        self.warnings.push(value.into());
    }

    /// Suggested follow-up command
    pub fn hint(&mut self, value: impl Into<String>) {
        self.next_steps.push(value.into());
    }
}

#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    schema_version: &'static str,
    command: &'a str,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonError>,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    warnings: &'a [String],
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    next_steps: &'a [String],
}

pub fn emit_success<T: Serialize>(
    options: OutputOptions,
    command: &str,
    data: &T,
    human: Option<&HumanOutput>,
) -> Result<()> {
    if options.json {
        let (warnings, next_steps) = match human {
            Some(h) => (h.warnings.as_slice(), h.next_steps.as_slice()),
            None => (&[][..], &[][..]),
        };
        let payload = Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "success",
            data: Some(data),
            error: None,
            warnings,
            next_steps,
        };
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else if let (false, Some(human)) = (options.quiet, human) {
        println!("{}", format_human(human));
    }
    Ok(())
}

/// Report a failed command. Human output goes to stderr.
pub fn emit_error(command: &str, err: &Error, json: bool) -> Result<()> {
    let next_steps = error_next_steps(err);
    if json {
        let payload: Envelope<'_, ()> = Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "error",
            data: None,
            error: Some(JsonError::from(err)),
            warnings: &[],
            next_steps: &next_steps,
        };
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    eprintln!("error: {err}");
    for step in &next_steps {
        eprintln!("hint: {step}");
    }
    Ok(())
}

/// Header, indented fields and rows, then `warning:` and `next:` lines.
pub fn format_human(output: &HumanOutput) -> String {
    let mut lines = vec![output.header.clone()];
    for (key, value) in &output.fields {
        if value.is_empty() {
            lines.push(format!("  {key}"));
        } else {
            lines.push(format!("  {key}: {value}"));
        }
    }
    if !output.rows.is_empty() {
        if !output.fields.is_empty() {
            lines.push(String::new());
        }
        lines.extend(output.rows.iter().map(|row| format!("  {row}")));
    }
    lines.extend(output.warnings.iter().map(|w| format!("warning: {w}")));
    lines.extend(output.next_steps.iter().map(|s| format!("next: {s}")));
    lines.join("\n")
}

fn error_next_steps(err: &Error) -> Vec<String> {
    match err {
        Error::UnknownUser { .. } => vec!["dtt users".to_string()],
        Error::InvalidConfig(_) | Error::TomlParse(_) => {
            vec![format!("fix {CONFIG_FILE}, or delete it to use defaults")]
        }
        Error::InvalidArgument(message) if message.starts_with("invalid status") => {
            vec![format!(
                "dtt add \"<description>\" --status \"{}\"",
                TaskStatus::YetToStart.label()
            )]
        }
        Error::MalformedRecord { path, row, .. } => {
            vec![format!("fix data row {row} of {}", path.display())]
        }
        Error::Mail(_) => vec!["check EMAIL_SENDER, EMAIL_PASSWORD and RECIPIENTS".to_string()],
        _ => Vec::new(),
    }
}
