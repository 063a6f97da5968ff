#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

pub const HEADER: &str = "user,date,task,status,deadline";

/// A scratch project directory with its own `.dtt.toml` and data file.
pub struct TestDir {
    dir: TempDir,
}

impl TestDir {
    pub fn new() -> std::io::Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn data_file(&self) -> PathBuf {
        self.dir.path().join("tasks.csv")
    }

    pub fn write_file(&self, rel_path: &str, contents: &str) -> std::io::Result<PathBuf> {
        let path = self.dir.path().join(rel_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn write_config(&self, contents: &str) -> std::io::Result<PathBuf> {
        self.write_file(".dtt.toml", contents)
    }

    /// Seed the data file with `rows` under the standard header.
    pub fn write_rows(&self, rows: &[&str]) -> std::io::Result<PathBuf> {
        let mut contents = String::from(HEADER);
        contents.push('\n');
        for row in rows {
            contents.push_str(row);
            contents.push('\n');
        }
        self.write_file("tasks.csv", &contents)
    }

    /// Data rows of the data file, header excluded.
    pub fn read_rows(&self) -> std::io::Result<Vec<String>> {
        let contents = fs::read_to_string(self.data_file())?;
        let mut lines = contents.lines();
        assert_eq!(lines.next(), Some(HEADER), "header must stay first");
        Ok(lines.map(str::to_string).collect())
    }

    /// `dtt` with this directory as project root and a clean environment.
    pub fn dtt_cmd(&self) -> Command {
        let mut cmd = dtt_cmd();
        cmd.current_dir(self.path()).arg("--dir").arg(self.path());
        cmd
    }
}

pub fn dtt_cmd() -> Command {
    let mut cmd = Command::cargo_bin("dtt").expect("binary");
    for key in [
        "DTT_DIR",
        "DTT_FILE",
        "DTT_USER",
        "EMAIL_SENDER",
        "EMAIL_PASSWORD",
        "RECIPIENTS",
        "APP_URL",
        "RUST_LOG",
    ] {
        cmd.env_remove(key);
    }
    cmd
}
