//! Active user selection.
//!
//! Resolution order:
//! 1) CLI --user (explicit)
//! 2) DTT_USER environment variable
//! 3) Config default (users.default), else the first listed user
//!
//! The result must be one of the configured names.

use crate::config::UsersConfig;
use crate::error::{Error, Result};

pub const ENV_USER: &str = "DTT_USER";

/// Resolve the active user from CLI, environment and config.
pub fn resolve_user(users: &UsersConfig, cli_user: Option<&str>) -> Result<String> {
    let env_user = std::env::var(ENV_USER).ok();
    resolve_user_with(users, cli_user, env_user.as_deref())
}

/// Same as [`resolve_user`] with the environment value passed in.
pub fn resolve_user_with(
    users: &UsersConfig,
    cli_user: Option<&str>,
    env_user: Option<&str>,
) -> Result<String> {
    let chosen = non_empty(cli_user)
        .or_else(|| non_empty(env_user))
        .or_else(|| users.default_user())
        .ok_or_else(|| Error::InvalidConfig("users.names cannot be empty".to_string()))?;

    ensure_known(users, chosen)?;
    Ok(chosen.to_string())
}

/// Reject names outside the configured list.
pub fn ensure_known(users: &UsersConfig, name: &str) -> Result<()> {
    if users.contains(name) {
        return Ok(());
    }
    Err(Error::UnknownUser {
        name: name.trim().to_string(),
        known: users
            .names
            .iter()
            .map(|name| name.trim())
            .collect::<Vec<_>>()
            .join(", "),
    })
}

fn non_empty(input: Option<&str>) -> Option<&str> {
    input.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    })
}
