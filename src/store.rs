//! CSV-backed record store.
//!
//! The file on disk is the single source of truth. Every command loads the
//! whole table, changes it in memory, and writes the whole table back.
//!
//! Writes go to a temporary sibling and are renamed into place, so readers
//! never see a partial file. There is no locking: two processes saving at the
//! same time race, and the last rename wins.

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::task::{TaskRecord, TaskTable, COLUMNS};

/// Loads and saves the task table at a fixed path
#[derive(Debug, Clone)]
pub struct TaskStore {
    path: PathBuf,
}

impl TaskStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the full table. A missing file is an empty table.
    pub fn load(&self) -> Result<TaskTable> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "data file missing; starting empty");
            return Ok(TaskTable::default());
        }
        let file = File::open(&self.path)?;
        let table = read_table(file, &self.path)?;
        debug!(path = %self.path.display(), rows = table.len(), "loaded tasks");
        Ok(table)
    }

    /// Overwrite the file with the full table.
    pub fn save(&self, table: &TaskTable) -> Result<()> {
        let mut buffer = Vec::new();
        write_table(&mut buffer, table)?;
        write_atomic(&self.path, &buffer)?;
        debug!(path = %self.path.display(), rows = table.len(), "saved tasks");
        Ok(())
    }

    /// Create the file with just the header if it does not exist yet.
    /// Returns true when a file was created.
    pub fn ensure_schema(&self) -> Result<bool> {
        if self.path.exists() {
            return Ok(false);
        }
        self.save(&TaskTable::default())?;
        Ok(true)
    }
}

/// Parse a table from CSV. `source` only labels errors.
///
/// Columns are matched by header name. Missing columns are back-filled with
/// empty values; unknown columns are ignored. A malformed date or status fails
/// the whole read.
pub fn read_table<R: Read>(reader: R, source: &Path) -> Result<TaskTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let missing: Vec<&str> = COLUMNS
        .iter()
        .copied()
        .filter(|column| !headers.iter().any(|header| header == *column))
        .collect();
    if !missing.is_empty() && !headers.is_empty() {
        warn!(
            path = %source.display(),
            missing = %missing.join(","),
            "back-filling missing columns"
        );
    }

    let mut records = Vec::new();
    for (idx, result) in reader.deserialize::<TaskRecord>().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(err) => {
                if matches!(err.kind(), csv::ErrorKind::Deserialize { .. }) {
                    return Err(Error::MalformedRecord {
                        path: source.to_path_buf(),
                        row: idx as u64 + 1,
                        message: err.to_string(),
                    });
                }
                return Err(Error::Csv(err));
            }
        };
        records.push(record);
    }
    Ok(TaskTable::new(records))
}

/// Write a table as CSV: header, then one row per record in table order.
pub fn write_table<W: Write>(writer: W, table: &TaskTable) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    writer.write_record(COLUMNS)?;
    for record in table.iter() {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Atomically write data to a file
///
/// Writes a temporary sibling, then renames it over the target. The file is
/// either fully written or not modified at all, and the temporary file is
/// removed on every failure path.
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dtt".to_string());
    let mut temp = tempfile::Builder::new()
        .prefix(&format!(".{name}."))
        .suffix(".tmp")
        .tempfile_in(parent)?;
    temp.write_all(data)?;
    temp.as_file().sync_all()?;

    temp.persist(path).map_err(|err| Error::Io(err.error))?;
    Ok(())
}

/// Render a table to a CSV string (exports and editor buffers).
pub fn table_to_string(table: &TaskTable) -> Result<String> {
    let mut buffer = Vec::new();
    write_table(&mut buffer, table)?;
    String::from_utf8(buffer)
        .map_err(|err| Error::Io(io::Error::new(io::ErrorKind::InvalidData, err)))
}
