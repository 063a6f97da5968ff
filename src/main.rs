//! dtt - Daily Task Tracker CLI
//!
//! Record daily tasks for a small team in a CSV file and send a reminder
//! email every day to keep them up to date.

use clap::Parser;
use dtt::cli::Cli;
use dtt::output::emit_error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() {
    let cli = Cli::parse();
    let command = cli.command.name();

    // RUST_LOG wins; ignore invalid/huge filters.
    let default_filter = if cli.verbose { "dtt=debug" } else { "dtt=warn" };
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|raw| {
            let raw = raw.trim();
            if raw.is_empty() || raw.len() > 4096 {
                return None;
            }
            EnvFilter::try_new(raw).ok()
        })
        .unwrap_or_else(|| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let json = cli.json;
    if let Err(err) = cli.run() {
        let _ = emit_error(command, &err, json);
        std::process::exit(err.exit_code());
    }
}
