//! dtt task command implementations.

use std::fs::File;
use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use serde::Serialize;

use crate::cli::{load_context, Context};
use crate::editor;
use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::reconcile::{self, BulkSaveReport, Submission, UpsertOutcome};
use crate::store::{self, read_table, table_to_string};
use crate::task::{format_date, parse_date_arg, TaskRecord, TaskStatus, TaskTable};
use crate::user;

pub struct AddOptions {
    pub description: String,
    pub date: Option<String>,
    pub status: String,
    pub deadline: Option<String>,
    pub user: Option<String>,
    pub dir: Option<PathBuf>,
    pub file: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct ListOptions {
    pub all: bool,
    pub user: Option<String>,
    pub dir: Option<PathBuf>,
    pub file: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct ExportOptions {
    pub all: bool,
    pub output: Option<PathBuf>,
    pub user: Option<String>,
    pub dir: Option<PathBuf>,
    pub file: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct ImportOptions {
    pub source: PathBuf,
    pub all: bool,
    pub user: Option<String>,
    pub dir: Option<PathBuf>,
    pub file: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct EditOptions {
    pub all: bool,
    pub user: Option<String>,
    pub dir: Option<PathBuf>,
    pub file: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct UsersOptions {
    pub user: Option<String>,
    pub dir: Option<PathBuf>,
    pub file: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

#[derive(Serialize)]
struct TaskSavedOutput {
    #[serde(flatten)]
    outcome: UpsertOutcome,
    task: TaskRecord,
    total: usize,
}

#[derive(Serialize)]
struct TaskListOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<String>,
    total: usize,
    tasks: Vec<TaskRecord>,
}

#[derive(Serialize)]
struct ExportOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<PathBuf>,
    rows: usize,
}

#[derive(Serialize)]
struct EditOutput {
    changed: bool,
    #[serde(flatten)]
    report: Option<BulkSaveReport>,
}

#[derive(Serialize)]
struct UserEntry {
    name: String,
    tasks: usize,
    active: bool,
}

#[derive(Serialize)]
struct UsersOutput {
    active: String,
    users: Vec<UserEntry>,
    #[serde(skip_serializing_if = "is_zero")]
    unassigned: usize,
}

fn is_zero(value: &usize) -> bool {
    *value == 0
}

pub fn run_add(options: AddOptions) -> Result<()> {
    let ctx = load_context(options.dir, options.file)?;
    let user = user::resolve_user(&ctx.config.users, options.user.as_deref())?;
    let today = Local::now().date_naive();
    let date = optional_date("--date", options.date.as_deref())?.unwrap_or(today);
    let deadline = optional_date("--deadline", options.deadline.as_deref())?.unwrap_or(today);
    let status: TaskStatus = options.status.parse()?;

    let submission = Submission {
        user: user.clone(),
        date,
        task: options.description.clone(),
        status,
        deadline,
    };

    let mut table = ctx.store.load()?;
    let outcome = reconcile::upsert(&mut table, submission)?;
    ctx.store.save(&table)?;

    let record = TaskRecord::new(user.clone(), date, options.description, status, deadline);
    let header = match outcome {
        UpsertOutcome::Appended => "Task added".to_string(),
        UpsertOutcome::Updated { rows: 1 } => "Task updated".to_string(),
        UpsertOutcome::Updated { rows } => format!("Task updated ({rows} matching rows)"),
    };

    let mut human = HumanOutput::new(header);
    human.field("User", user);
    human.field("Date", format_date(record.date));
    human.field("Task", record.task.clone());
    human.field("Status", status.label());
    human.field("Deadline", format_date(record.deadline));

    let output = TaskSavedOutput {
        outcome,
        task: record,
        total: table.len(),
    };

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "add",
        &output,
        Some(&human),
    )
}

pub fn run_list(options: ListOptions) -> Result<()> {
    let ctx = load_context(options.dir, options.file)?;
    let scope = resolve_scope(&ctx, options.all, options.user.as_deref())?;
    let table = ctx.store.load()?;
    let view = view_for(&table, scope.as_deref());

    let mut human = HumanOutput::new("Tasks");
    if let Some(user) = scope.as_ref() {
        human.field("User", user.clone());
    }
    human.field("Total", view.len().to_string());
    for record in view.iter() {
        human.row(format_row(record, scope.is_none()));
    }
    if view.is_empty() {
        human.hint("dtt add \"<description>\"");
    }

    let output = TaskListOutput {
        user: scope,
        total: view.len(),
        tasks: view.records,
    };

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "list",
        &output,
        Some(&human),
    )
}

pub fn run_export(options: ExportOptions) -> Result<()> {
    let ctx = load_context(options.dir, options.file)?;
    let scope = resolve_scope(&ctx, options.all, options.user.as_deref())?;
    let table = ctx.store.load()?;
    let view = view_for(&table, scope.as_deref());
    let rendered = table_to_string(&view)?;

    match options.output.as_ref() {
        Some(path) => store::write_atomic(path, rendered.as_bytes())?,
        None if !options.json => {
            print!("{rendered}");
            return Ok(());
        }
        None => {}
    }

    let mut human = HumanOutput::new("Tasks exported");
    if let Some(user) = scope.as_ref() {
        human.field("User", user.clone());
    }
    human.field("Rows", view.len().to_string());
    if let Some(path) = options.output.as_ref() {
        human.field("File", path.display().to_string());
        human.hint(format!("dtt import {}", path.display()));
    }

    let output = ExportOutput {
        user: scope,
        path: options.output,
        rows: view.len(),
    };

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "export",
        &output,
        Some(&human),
    )
}

pub fn run_import(options: ImportOptions) -> Result<()> {
    let ctx = load_context(options.dir, options.file)?;
    let scope = resolve_scope(&ctx, options.all, options.user.as_deref())?;
    let edited = read_table(File::open(&options.source)?, &options.source)?;

    let table = ctx.store.load()?;
    let (merged, report) = reconcile::apply_bulk_edit(table, scope.as_deref(), edited);
    ctx.store.save(&merged)?;

    let human = bulk_save_human("Tasks imported", &report);
    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "import",
        &report,
        Some(&human),
    )
}

pub fn run_edit(options: EditOptions) -> Result<()> {
    let ctx = load_context(options.dir, options.file)?;
    let scope = resolve_scope(&ctx, options.all, options.user.as_deref())?;
    let table = ctx.store.load()?;
    let view = view_for(&table, scope.as_deref());
    let original = table_to_string(&view)?;

    let buffer = editor::edit_text(&original, ".csv")?;
    if buffer == original {
        let mut human = HumanOutput::new("No changes");
        human.field("Rows", view.len().to_string());
        return emit_success(
            OutputOptions {
                json: options.json,
                quiet: options.quiet,
            },
            "edit",
            &EditOutput {
                changed: false,
                report: None,
            },
            Some(&human),
        );
    }

    let edited = read_table(buffer.as_bytes(), std::path::Path::new("<editor buffer>"))?;
    let (merged, report) = reconcile::apply_bulk_edit(table, scope.as_deref(), edited);
    ctx.store.save(&merged)?;

    let human = bulk_save_human("Updates saved", &report);
    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "edit",
        &EditOutput {
            changed: true,
            report: Some(report),
        },
        Some(&human),
    )
}

pub fn run_users(options: UsersOptions) -> Result<()> {
    let ctx = load_context(options.dir, options.file)?;
    let active = user::resolve_user(&ctx.config.users, options.user.as_deref())?;
    let table = ctx.store.load()?;

    let users: Vec<UserEntry> = ctx
        .config
        .users
        .names
        .iter()
        .map(|name| {
            let name = name.trim().to_string();
            UserEntry {
                tasks: table.count_for(&name),
                active: name == active,
                name,
            }
        })
        .collect();
    let unassigned = table
        .iter()
        .filter(|record| !ctx.config.users.contains(&record.user))
        .count();

    let mut human = HumanOutput::new("Users");
    human.field("Active", active.clone());
    for entry in &users {
        let marker = if entry.active { "*" } else { " " };
        human.row(format!("{marker} {} ({} tasks)", entry.name, entry.tasks));
    }
    if unassigned > 0 {
        human.warn(format!(
            "{unassigned} row(s) belong to users outside users.names"
        ));
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "users",
        &UsersOutput {
            active,
            users,
            unassigned,
        },
        Some(&human),
    )
}

/// `None` means every user's rows.
fn resolve_scope(ctx: &Context, all: bool, cli_user: Option<&str>) -> Result<Option<String>> {
    if all {
        return Ok(None);
    }
    user::resolve_user(&ctx.config.users, cli_user).map(Some)
}

fn view_for(table: &TaskTable, scope: Option<&str>) -> TaskTable {
    let ordered = table.display_order();
    match scope {
        Some(user) => TaskTable::new(ordered.for_user(user).cloned().collect()),
        None => ordered,
    }
}

fn optional_date(label: &str, raw: Option<&str>) -> Result<Option<NaiveDate>> {
    raw.map(|value| parse_date_arg(label, value)).transpose()
}

fn format_row(record: &TaskRecord, with_user: bool) -> String {
    let status = record.status.map(TaskStatus::label).unwrap_or("-");
    let date = match record.date {
        Some(_) => format_date(record.date),
        None => "----------".to_string(),
    };
    let mut line = format!("{date} [{status}] {}", record.task);
    if record.deadline.is_some() {
        line.push_str(&format!(" (due {})", format_date(record.deadline)));
    }
    if with_user {
        let owner = if record.user.is_empty() {
            "(none)"
        } else {
            record.user.as_str()
        };
        line = format!("{owner}: {line}");
    }
    line
}

fn bulk_save_human(header: &str, report: &BulkSaveReport) -> HumanOutput {
    let mut human = HumanOutput::new(header);
    match report.user.as_ref() {
        Some(user) => human.field("User", user.clone()),
        None => human.field("Scope", "all users"),
    }
    human.field("Rows before", report.before.to_string());
    human.field("Edited rows", report.edited.to_string());
    if report.user.is_some() {
        human.field("Other users' rows", report.preserved.to_string());
    }
    human.field("Rows after", report.total.to_string());
    human
}
