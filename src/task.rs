//! Task records and the table they live in.
//!
//! A record is one row of the CSV file: `user, date, task, status, deadline`.
//! Date and status cells may be empty (a back-filled column or a hand-edited
//! row), so they are optional in memory.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// Column names, in file order
pub const COLUMNS: [&str; 5] = ["user", "date", "task", "status", "deadline"];

/// Date format used in the file and on the command line
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskStatus {
    YetToStart,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [
        TaskStatus::YetToStart,
        TaskStatus::InProgress,
        TaskStatus::Completed,
    ];

    /// Label written to the file and shown in the form
    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::YetToStart => "Yet to Start",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TaskStatus {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|ch| !matches!(ch, ' ' | '_' | '-'))
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "yettostart" | "notstarted" | "todo" | "open" => Ok(TaskStatus::YetToStart),
            "inprogress" | "doing" | "started" => Ok(TaskStatus::InProgress),
            "completed" | "complete" | "done" | "closed" => Ok(TaskStatus::Completed),
            _ => Err(Error::InvalidArgument(format!(
                "invalid status '{}': must be one of Yet to Start, In Progress, Completed",
                s.trim()
            ))),
        }
    }
}

impl Serialize for TaskStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for TaskStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// One row of the tracker
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaskRecord {
    #[serde(default)]
    pub user: String,
    #[serde(default, deserialize_with = "de_opt_date")]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub task: String,
    #[serde(default, deserialize_with = "de_opt_status")]
    pub status: Option<TaskStatus>,
    #[serde(default, deserialize_with = "de_opt_date")]
    pub deadline: Option<NaiveDate>,
}

impl TaskRecord {
    pub fn new(
        user: impl Into<String>,
        date: NaiveDate,
        task: impl Into<String>,
        status: TaskStatus,
        deadline: NaiveDate,
    ) -> Self {
        Self {
            user: user.into(),
            date: Some(date),
            task: task.into(),
            status: Some(status),
            deadline: Some(deadline),
        }
    }
}

/// The in-memory copy of the data file, in file order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskTable {
    pub records: Vec<TaskRecord>,
}

impl TaskTable {
    pub fn new(records: Vec<TaskRecord>) -> Self {
        Self { records }
    }

    pub fn columns(&self) -> &'static [&'static str] {
        &COLUMNS
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TaskRecord> {
        self.records.iter()
    }

    /// Rows owned by `user`, in file order
    pub fn for_user<'a>(&'a self, user: &'a str) -> impl Iterator<Item = &'a TaskRecord> + 'a {
        self.records.iter().filter(move |record| record.user == user)
    }

    pub fn count_for(&self, user: &str) -> usize {
        self.for_user(user).count()
    }

    /// Copy sorted by (date, deadline); empty dates sort last and ties keep
    /// file order.
    pub fn display_order(&self) -> TaskTable {
        let mut records = self.records.clone();
        records.sort_by(|left, right| {
            cmp_date(left.date, right.date).then_with(|| cmp_date(left.deadline, right.deadline))
        });
        TaskTable { records }
    }
}

impl From<Vec<TaskRecord>> for TaskTable {
    fn from(records: Vec<TaskRecord>) -> Self {
        Self { records }
    }
}

impl IntoIterator for TaskTable {
    type Item = TaskRecord;
    type IntoIter = std::vec::IntoIter<TaskRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

fn cmp_date(left: Option<NaiveDate>, right: Option<NaiveDate>) -> Ordering {
    match (left, right) {
        (Some(l), Some(r)) => l.cmp(&r),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Parse a calendar date. Accepts `YYYY-MM-DD` and a date-time with a
/// midnight-style suffix (`YYYY-MM-DD HH:MM:SS`), which spreadsheet exports
/// commonly produce.
pub fn parse_date(raw: &str) -> std::result::Result<NaiveDate, String> {
    let trimmed = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, DATE_FORMAT) {
        return Ok(date);
    }
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S"))
        .map(|value| value.date())
        .map_err(|_| format!("invalid date '{trimmed}' (expected YYYY-MM-DD)"))
}

/// Parse a date given on the command line.
pub fn parse_date_arg(label: &str, raw: &str) -> Result<NaiveDate> {
    parse_date(raw).map_err(|msg| Error::InvalidArgument(format!("{label}: {msg}")))
}

pub fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|value| value.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}

fn de_opt_date<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<NaiveDate>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
    if raw.trim().is_empty() {
        return Ok(None);
    }
    parse_date(&raw).map(Some).map_err(serde::de::Error::custom)
}

fn de_opt_status<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<TaskStatus>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
    if raw.trim().is_empty() {
        return Ok(None);
    }
    raw.parse().map(Some).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).expect("date")
    }

    #[test]
    fn status_parse_is_lenient() {
        assert_eq!("Yet to Start".parse::<TaskStatus>().unwrap(), TaskStatus::YetToStart);
        assert_eq!("yet_to_start".parse::<TaskStatus>().unwrap(), TaskStatus::YetToStart);
        assert_eq!("IN PROGRESS".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        assert_eq!("in-progress".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        assert_eq!("done".parse::<TaskStatus>().unwrap(), TaskStatus::Completed);
        assert!("blocked".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn status_labels_round_trip() {
        for status in TaskStatus::ALL {
            assert_eq!(status.label().parse::<TaskStatus>().unwrap(), status);
        }
    }

    #[test]
    fn parse_date_accepts_datetime_suffix() {
        assert_eq!(parse_date("2024-03-05").unwrap(), day(5));
        assert_eq!(parse_date(" 2024-03-05 00:00:00 ").unwrap(), day(5));
        assert_eq!(parse_date("2024-03-05T00:00:00").unwrap(), day(5));
        assert!(parse_date("05/03/2024").is_err());
    }

    #[test]
    fn display_order_sorts_by_date_then_deadline_with_empty_last() {
        let mut undated = TaskRecord::new("Alice", day(1), "undated", TaskStatus::YetToStart, day(9));
        undated.date = None;
        let table = TaskTable::new(vec![
            undated,
            TaskRecord::new("Alice", day(4), "late", TaskStatus::YetToStart, day(8)),
            TaskRecord::new("Bob", day(2), "b", TaskStatus::InProgress, day(7)),
            TaskRecord::new("Alice", day(2), "a", TaskStatus::Completed, day(3)),
            TaskRecord::new("Alice", day(2), "tie", TaskStatus::Completed, day(7)),
        ]);

        let tasks: Vec<_> = table
            .display_order()
            .into_iter()
            .map(|record| record.task)
            .collect();
        assert_eq!(tasks, vec!["a", "b", "tie", "late", "undated"]);
    }

    #[test]
    fn table_filters_by_user() {
        let table = TaskTable::new(vec![
            TaskRecord::new("Alice", day(1), "a", TaskStatus::YetToStart, day(2)),
            TaskRecord::new("Bob", day(1), "b", TaskStatus::YetToStart, day(2)),
            TaskRecord::new("Alice", day(3), "c", TaskStatus::YetToStart, day(4)),
        ]);
        assert_eq!(table.count_for("Alice"), 2);
        assert_eq!(table.count_for("Carol"), 0);
        assert_eq!(table.columns(), &COLUMNS);
    }
}
