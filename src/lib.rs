//! dtt - Daily Task Tracker Library
//!
//! Core functionality for the dtt CLI: a CSV-backed table of daily tasks
//! shared by a small team, and a once-a-day email reminder to keep it
//! current.
//!
//! # Core Concepts
//!
//! - **Task record**: one row of `user, date, task, status, deadline`
//! - **Upsert**: a submission keyed by exact (user, date, task) either
//!   updates status and deadline of the matching rows or appends a row
//! - **Bulk edit**: replace one user's rows and keep everyone else's
//! - **Daily reminder**: SMTP over implicit TLS, skipped when credentials
//!   are missing
//!
//! # Module Organization
//!
//! - `cli`: Command-line interface using clap
//! - `config`: Configuration loading from `.dtt.toml`
//! - `error`: Error types and result aliases
//! - `task`: Task records, statuses and the in-memory table
//! - `store`: CSV persistence of the table
//! - `reconcile`: Upsert and bulk-edit merging
//! - `notify`: Reminder composition and delivery
//! - `schedule`: Daily job polled by the scheduler loop
//! - `user`: Active user resolution
//! - `editor`: External editor round-trip
//! - `ui`: Terminal task board

pub mod cli;
pub mod config;
pub mod editor;
pub mod error;
pub mod notify;
pub mod output;
pub mod reconcile;
pub mod schedule;
pub mod store;
pub mod task;
pub mod ui;
pub mod user;

pub use error::{Error, Result};
