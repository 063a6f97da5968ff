//! Error types for dtt
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad args, unknown user, invalid config)
//! - 4: Operation failed (I/O, CSV, malformed record, mail delivery)

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the dtt CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for dtt operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unknown user '{name}' (expected one of: {known})")]
    UnknownUser { name: String, known: String },

    // Operation failures (exit code 4)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Malformed record in {path} (row {row}): {message}")]
    MalformedRecord {
        path: PathBuf,
        row: u64,
        message: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Mail delivery failed: {0}")]
    Mail(String),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidConfig(_) | Error::InvalidArgument(_) | Error::UnknownUser { .. } => {
                exit_codes::USER_ERROR
            }

            Error::Io(_)
            | Error::Csv(_)
            | Error::MalformedRecord { .. }
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::TomlSerialize(_)
            | Error::Mail(_)
            | Error::OperationFailed(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Structured details for the JSON error envelope.
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::UnknownUser { name, known } => Some(serde_json::json!({
                "user": name,
                "known": known.split(", ").collect::<Vec<_>>(),
            })),
            Error::MalformedRecord { path, row, .. } => Some(serde_json::json!({
                "path": path.to_string_lossy(),
                "row": row,
            })),
            _ => None,
        }
    }
}

/// Result type alias for dtt operations
pub type Result<T> = std::result::Result<T, Error>;

/// The `error` object of the JSON envelope
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub message: String,
    pub code: i32,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&Error> for JsonError {
    fn from(err: &Error) -> Self {
        let code = err.exit_code();
        JsonError {
            message: err.to_string(),
            code,
            kind: if code == exit_codes::USER_ERROR {
                "user_error"
            } else {
                "operation_failed"
            },
            details: err.details(),
        }
    }
}
