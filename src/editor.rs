//! External editor round-trip for bulk edits.

use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, ExitStatus};

use tempfile::Builder;
use tracing::debug;

use crate::error::{Error, Result};

/// Open `initial` in the user's editor and return the saved buffer.
/// `suffix` picks the temp file extension so editors choose a syntax.
pub fn edit_text(initial: &str, suffix: &str) -> Result<String> {
    let mut temp = Builder::new().prefix("dtt-").suffix(suffix).tempfile()?;
    temp.write_all(initial.as_bytes())?;
    temp.flush()?;

    let status = launch_editor(temp.path())?;
    if !status.success() {
        let detail = status
            .code()
            .map(|code| format!("exit code {code}"))
            .unwrap_or_else(|| "signal".to_string());
        return Err(Error::OperationFailed(format!("editor exited with {detail}")));
    }

    Ok(std::fs::read_to_string(temp.path())?)
}

fn launch_editor(path: &Path) -> Result<ExitStatus> {
    let mut attempted: Vec<String> = Vec::new();
    for candidate in editor_candidates() {
        let parts = split_editor_command(&candidate);
        if parts.is_empty() {
            continue;
        }
        attempted.push(parts[0].clone());
        let mut command = Command::new(&parts[0]);
        if parts.len() > 1 {
            command.args(&parts[1..]);
        }
        command.arg(path);
        debug!(editor = %parts[0], path = %path.display(), "launching editor");
        match command.status() {
            Ok(status) => return Ok(status),
            Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
            Err(err) => {
                return Err(Error::OperationFailed(format!(
                    "failed to launch editor '{}': {err}",
                    parts[0]
                )));
            }
        }
    }
    let tried = if attempted.is_empty() {
        "no editor candidates".to_string()
    } else {
        attempted.join(", ")
    };
    Err(Error::OperationFailed(format!(
        "no editor found (tried {tried}); set $VISUAL or $EDITOR"
    )))
}

fn editor_candidates() -> Vec<String> {
    let mut out = Vec::new();
    for key in ["VISUAL", "EDITOR"] {
        if let Ok(value) = std::env::var(key) {
            if !value.trim().is_empty() {
                out.push(value);
            }
        }
    }
    out.push("vi".to_string());
    out
}

fn split_editor_command(value: &str) -> Vec<String> {
    value
        .split_whitespace()
        .map(|part| part.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_editor_command_keeps_arguments() {
        assert_eq!(
            split_editor_command("code --wait"),
            vec!["code".to_string(), "--wait".to_string()]
        );
        assert!(split_editor_command("   ").is_empty());
    }
}
