//! dtt init command implementation
//!
//! Writes a default `.dtt.toml` and creates the data file with its header.

use std::path::{Path, PathBuf};

use crate::cli::load_context;
use crate::config::{Config, CONFIG_FILE};
use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};

pub struct InitOptions {
    pub dir: Option<PathBuf>,
    pub file: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

#[derive(serde::Serialize)]
struct InitReport {
    dir: PathBuf,
    data_file: PathBuf,
    created: InitCreated,
}

#[derive(serde::Serialize)]
struct InitCreated {
    config: bool,
    data_file: bool,
}

pub fn run(options: InitOptions) -> Result<()> {
    let ctx = load_context(options.dir, options.file)?;
    let created_config = ensure_config(&ctx.dir, &ctx.config)?;
    let created_data = ctx.store.ensure_schema()?;

    let report = InitReport {
        dir: ctx.dir.clone(),
        data_file: ctx.store.path().to_path_buf(),
        created: InitCreated {
            config: created_config,
            data_file: created_data,
        },
    };

    let mut created_items = Vec::new();
    if created_config {
        created_items.push(CONFIG_FILE.to_string());
    }
    if created_data {
        created_items.push(ctx.store.path().display().to_string());
    }

    let header = if created_items.is_empty() {
        "dtt init: nothing to do".to_string()
    } else {
        "dtt init: initialized".to_string()
    };

    let mut human = HumanOutput::new(header);
    human.field("dir", ctx.dir.display().to_string());
    human.field(
        "created",
        if created_items.is_empty() {
            "none".to_string()
        } else {
            created_items.join(", ")
        },
    );
    human.hint(format!("edit users.names in {CONFIG_FILE}"));
    human.hint("dtt add \"<description>\" --deadline YYYY-MM-DD");

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "init",
        &report,
        Some(&human),
    )
}

fn ensure_config(dir: &Path, config: &Config) -> Result<bool> {
    let path = dir.join(CONFIG_FILE);
    if path.exists() {
        return Ok(false);
    }
    std::fs::create_dir_all(dir)?;
    config.save(&path)?;
    Ok(true)
}
