//! Merging form submissions and bulk edits into the task table.
//!
//! A submission is keyed by exact (user, date, description). A match updates
//! status and deadline of every matching row in place; no match appends one
//! row. Last write wins.
//!
//! Bulk edits replace one user's slice of the table and leave every other
//! user's rows untouched.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::task::{TaskRecord, TaskStatus, TaskTable};

/// A form submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub user: String,
    pub date: NaiveDate,
    pub task: String,
    pub status: TaskStatus,
    pub deadline: NaiveDate,
}

impl Submission {
    /// Reject descriptions that are blank after trimming.
    pub fn validate(&self) -> Result<()> {
        if self.task.trim().is_empty() {
            return Err(Error::InvalidArgument(
                "task description cannot be blank".to_string(),
            ));
        }
        Ok(())
    }

    fn matches(&self, record: &TaskRecord) -> bool {
        record.user == self.user && record.date == Some(self.date) && record.task == self.task
    }

    fn into_record(self) -> TaskRecord {
        TaskRecord::new(self.user, self.date, self.task, self.status, self.deadline)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum UpsertOutcome {
    Updated { rows: usize },
    Appended,
}

/// Merge a submission into the table.
pub fn upsert(table: &mut TaskTable, submission: Submission) -> Result<UpsertOutcome> {
    submission.validate()?;

    let mask: Vec<bool> = table
        .records
        .iter()
        .map(|record| submission.matches(record))
        .collect();
    let hits = mask.iter().filter(|hit| **hit).count();

    if hits == 0 {
        debug!(user = %submission.user, task = %submission.task, "appending task");
        table.records.push(submission.into_record());
        return Ok(UpsertOutcome::Appended);
    }

    for (record, hit) in table.records.iter_mut().zip(mask) {
        if hit {
            record.status = Some(submission.status);
            record.deadline = Some(submission.deadline);
        }
    }
    debug!(user = %submission.user, task = %submission.task, rows = hits, "updated task");
    Ok(UpsertOutcome::Updated { rows: hits })
}

/// Split the table into (rows owned by `user`, everyone else's rows).
/// Both halves keep file order.
pub fn partition(table: &TaskTable, user: &str) -> (TaskTable, TaskTable) {
    let (mine, others): (Vec<_>, Vec<_>) = table
        .records
        .iter()
        .cloned()
        .partition(|record| record.user == user);
    (TaskTable::new(mine), TaskTable::new(others))
}

/// Rebuild the full table from the untouched rows and an edited slice.
///
/// Edited rows are taken as-is, including rows whose user was changed.
pub fn recombine(others: TaskTable, edited: TaskTable) -> TaskTable {
    let mut records = others.records;
    records.extend(edited.records);
    TaskTable::new(records)
}

/// Summary of a bulk save
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkSaveReport {
    /// `None` when the whole table was replaced
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    pub before: usize,
    pub edited: usize,
    pub preserved: usize,
    pub total: usize,
}

/// Replace `user`'s slice (or the whole table when `user` is `None`) with
/// `edited`.
pub fn apply_bulk_edit(
    table: TaskTable,
    user: Option<&str>,
    edited: TaskTable,
) -> (TaskTable, BulkSaveReport) {
    let before = table.len();
    let edited_len = edited.len();
    let (merged, preserved) = match user {
        Some(user) => {
            let (_, others) = partition(&table, user);
            let preserved = others.len();
            (recombine(others, edited), preserved)
        }
        None => (edited, 0),
    };
    let report = BulkSaveReport {
        user: user.map(str::to_string),
        before,
        edited: edited_len,
        preserved,
        total: merged.len(),
    };
    (merged, report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).expect("date")
    }

    fn table() -> TaskTable {
        TaskTable::new(vec![
            TaskRecord::new("Alice", day(1), "standup notes", TaskStatus::Completed, day(1)),
            TaskRecord::new("Bob", day(1), "standup notes", TaskStatus::YetToStart, day(2)),
            TaskRecord::new("Alice", day(2), "budget draft", TaskStatus::InProgress, day(9)),
        ])
    }

    fn submission(user: &str, date: NaiveDate, task: &str) -> Submission {
        Submission {
            user: user.to_string(),
            date,
            task: task.to_string(),
            status: TaskStatus::InProgress,
            deadline: day(20),
        }
    }

    #[test]
    fn new_key_appends_exactly_one_row() {
        let mut table = table();
        let outcome = upsert(&mut table, submission("Alice", day(3), "plan offsite")).unwrap();

        assert_eq!(outcome, UpsertOutcome::Appended);
        assert_eq!(table.len(), 4);
        let last = table.records.last().unwrap();
        assert_eq!(last.user, "Alice");
        assert_eq!(last.date, Some(day(3)));
        assert_eq!(last.task, "plan offsite");
        assert_eq!(last.status, Some(TaskStatus::InProgress));
        assert_eq!(last.deadline, Some(day(20)));
    }

    #[test]
    fn matching_key_updates_only_that_row() {
        let mut table = table();
        let before = table.clone();
        let outcome = upsert(&mut table, submission("Bob", day(1), "standup notes")).unwrap();

        assert_eq!(outcome, UpsertOutcome::Updated { rows: 1 });
        assert_eq!(table.len(), 3);
        assert_eq!(table.records[0], before.records[0]);
        assert_eq!(table.records[2], before.records[2]);

        let updated = &table.records[1];
        assert_eq!(updated.user, "Bob");
        assert_eq!(updated.date, Some(day(1)));
        assert_eq!(updated.task, "standup notes");
        assert_eq!(updated.status, Some(TaskStatus::InProgress));
        assert_eq!(updated.deadline, Some(day(20)));
    }

    #[test]
    fn key_match_is_exact() {
        let mut table = table();
        let outcome = upsert(&mut table, submission("Alice", day(2), "Budget draft")).unwrap();
        assert_eq!(outcome, UpsertOutcome::Appended);

        let outcome = upsert(&mut table, submission("Alice", day(2), "budget draft ")).unwrap();
        assert_eq!(outcome, UpsertOutcome::Appended);
        assert_eq!(table.len(), 5);
    }

    #[test]
    fn duplicate_keys_are_all_updated() {
        let mut table = table();
        table.records.push(table.records[2].clone());
        let outcome = upsert(&mut table, submission("Alice", day(2), "budget draft")).unwrap();

        assert_eq!(outcome, UpsertOutcome::Updated { rows: 2 });
        assert_eq!(table.records[2].deadline, Some(day(20)));
        assert_eq!(table.records[3].deadline, Some(day(20)));
    }

    #[test]
    fn blank_description_is_rejected() {
        let mut table = table();
        let err = upsert(&mut table, submission("Alice", day(3), "   ")).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn bulk_edit_preserves_other_users() {
        let table = table();
        let (mine, others) = partition(&table, "Alice");
        assert_eq!(mine.len(), 2);
        assert_eq!(others.len(), 1);

        let mut edited = mine;
        edited.records.remove(0);
        edited.records[0].status = Some(TaskStatus::Completed);
        edited.records.push(TaskRecord::new(
            "Alice",
            day(5),
            "new from grid",
            TaskStatus::YetToStart,
            day(6),
        ));

        let (merged, report) = apply_bulk_edit(table.clone(), Some("Alice"), edited.clone());
        assert_eq!(merged.len(), others.len() + edited.len());
        assert_eq!(report.total, 3);
        assert_eq!(report.preserved, 1);
        assert_eq!(report.edited, 2);
        assert_eq!(report.before, 3);

        let bob_rows: Vec<_> = merged.for_user("Bob").cloned().collect();
        assert_eq!(bob_rows, vec![table.records[1].clone()]);
        assert_eq!(merged.count_for("Alice"), 2);
    }

    #[test]
    fn bulk_edit_without_user_replaces_everything() {
        let edited = TaskTable::new(vec![TaskRecord::new(
            "Bob",
            day(7),
            "only row",
            TaskStatus::Completed,
            day(7),
        )]);
        let (merged, report) = apply_bulk_edit(table(), None, edited.clone());
        assert_eq!(merged, edited);
        assert_eq!(report.preserved, 0);
        assert_eq!(report.user, None);
    }

    #[test]
    fn edited_rows_may_change_owner() {
        let table = table();
        let (mut mine, others) = partition(&table, "Alice");
        mine.records[0].user = "Bob".to_string();
        let merged = recombine(others, mine);
        assert_eq!(merged.count_for("Bob"), 2);
        assert_eq!(merged.count_for("Alice"), 1);
    }
}
