mod support;

use std::fs;

use predicates::str::contains;
use serde_json::Value;

use support::TestDir;

const SEED: [&str; 4] = [
    "Alice,2024-05-01,standup,Completed,2024-05-01",
    "Bob,2024-05-01,deploy,In Progress,2024-05-02",
    "Alice,2024-05-02,budget,Yet to Start,2024-05-06",
    "Bob,2024-05-03,retro,Yet to Start,2024-05-03",
];

#[test]
fn export_prints_active_user_view() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TestDir::new()?;
    dir.write_rows(&SEED)?;

    dir.dtt_cmd()
        .args(["--user", "Bob", "export"])
        .assert()
        .success()
        .stdout(
            "user,date,task,status,deadline\n\
             Bob,2024-05-01,deploy,In Progress,2024-05-02\n\
             Bob,2024-05-03,retro,Yet to Start,2024-05-03\n",
        );
    Ok(())
}

#[test]
fn export_to_file_reports_rows() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TestDir::new()?;
    dir.write_rows(&SEED)?;
    let target = dir.path().join("out").join("all.csv");

    let output = dir
        .dtt_cmd()
        .args(["export", "--all", "--json", "-o"])
        .arg(&target)
        .output()?;
    assert!(output.status.success());
    let value: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(value["data"]["rows"], 4);

    let exported = fs::read_to_string(&target)?;
    assert_eq!(exported.lines().count(), 5);
    Ok(())
}

#[test]
fn import_replaces_only_active_user_rows() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TestDir::new()?;
    dir.write_rows(&SEED)?;
    let edited = dir.write_file(
        "alice.csv",
        "user,date,task,status,deadline\n\
         Alice,2024-05-02,budget,Completed,2024-05-06\n\
         Alice,2024-05-04,\"plan Q3, draft\",In Progress,2024-05-10\n",
    )?;
    let edited_before = fs::read_to_string(&edited)?;

    let output = dir
        .dtt_cmd()
        .args(["import", "--json"])
        .arg(&edited)
        .output()?;
    assert!(output.status.success());
    let value: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(value["data"]["user"], "Alice");
    assert_eq!(value["data"]["before"], 4);
    assert_eq!(value["data"]["edited"], 2);
    assert_eq!(value["data"]["preserved"], 2);
    assert_eq!(value["data"]["total"], 4);

    assert_eq!(
        dir.read_rows()?,
        vec![
            SEED[1].to_string(),
            SEED[3].to_string(),
            "Alice,2024-05-02,budget,Completed,2024-05-06".to_string(),
            "Alice,2024-05-04,\"plan Q3, draft\",In Progress,2024-05-10".to_string(),
        ]
    );
    let preserved = value["data"]["preserved"].as_u64().expect("preserved");
    let edited_rows = value["data"]["edited"].as_u64().expect("edited");
    assert_eq!(dir.read_rows()?.len() as u64, preserved + edited_rows);
    assert_eq!(fs::read_to_string(&edited)?, edited_before);
    Ok(())
}

#[test]
fn import_honours_data_file_override() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TestDir::new()?;
    let team = dir.write_file(
        "data/team.csv",
        &format!("{}\n{}\n{}\n", support::HEADER, SEED[0], SEED[1]),
    )?;
    let edited = dir.write_file(
        "bob.csv",
        "user,date,task,status,deadline\nBob,2024-05-07,handover,Completed,2024-05-07\n",
    )?;
    let edited_before = fs::read_to_string(&edited)?;

    let output = dir
        .dtt_cmd()
        .arg("--file")
        .arg(&team)
        .args(["--user", "Bob", "import", "--json"])
        .arg(&edited)
        .output()?;
    assert!(output.status.success());
    let value: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(value["data"]["before"], 2);
    assert_eq!(value["data"]["preserved"], 1);
    assert_eq!(value["data"]["total"], 2);

    assert_eq!(
        fs::read_to_string(&team)?,
        format!(
            "{}\n{}\nBob,2024-05-07,handover,Completed,2024-05-07\n",
            support::HEADER,
            SEED[0]
        )
    );
    assert_eq!(fs::read_to_string(&edited)?, edited_before);
    assert!(!dir.data_file().exists());
    Ok(())
}

#[test]
fn import_backfills_missing_columns() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TestDir::new()?;
    dir.write_rows(&SEED)?;
    let edited = dir.write_file("partial.csv", "task,user\nsweep,Bob\n")?;

    let output = dir
        .dtt_cmd()
        .args(["--user", "Bob", "import", "--json"])
        .arg(&edited)
        .output()?;
    assert!(output.status.success());
    let value: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(value["data"]["preserved"], 2);
    assert_eq!(value["data"]["edited"], 1);

    assert_eq!(
        dir.read_rows()?,
        vec![
            SEED[0].to_string(),
            SEED[2].to_string(),
            "Bob,,sweep,,".to_string(),
        ]
    );
    Ok(())
}

#[test]
fn import_all_replaces_table() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TestDir::new()?;
    dir.write_rows(&SEED)?;
    let edited = dir.write_file(
        "all.csv",
        "user,date,task,status,deadline\nBob,2024-06-01,only,Completed,2024-06-01\n",
    )?;

    dir.dtt_cmd()
        .args(["import", "--all"])
        .arg(&edited)
        .assert()
        .success()
        .stdout(contains("Scope: all users"));

    assert_eq!(
        dir.read_rows()?,
        vec!["Bob,2024-06-01,only,Completed,2024-06-01".to_string()]
    );
    Ok(())
}

#[test]
fn malformed_import_leaves_store_untouched() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TestDir::new()?;
    dir.write_rows(&SEED)?;
    let before = fs::read_to_string(dir.data_file())?;
    let edited = dir.write_file(
        "bad.csv",
        "user,date,task,status,deadline\nAlice,2024-05-01,x,Paused,2024-05-01\n",
    )?;

    dir.dtt_cmd()
        .arg("import")
        .arg(&edited)
        .assert()
        .code(4)
        .stderr(contains("bad.csv"));

    assert_eq!(fs::read_to_string(dir.data_file())?, before);
    Ok(())
}

#[test]
fn unchanged_edit_saves_nothing() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TestDir::new()?;
    dir.write_rows(&SEED)?;
    let before = fs::read_to_string(dir.data_file())?;

    let output = dir
        .dtt_cmd()
        .env("VISUAL", "true")
        .args(["edit", "--json"])
        .output()?;
    assert!(output.status.success());
    let value: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(value["data"]["changed"], false);

    assert_eq!(fs::read_to_string(dir.data_file())?, before);
    Ok(())
}

#[cfg(unix)]
#[test]
fn edit_applies_editor_changes_for_active_user() -> Result<(), Box<dyn std::error::Error>> {
    use std::os::unix::fs::PermissionsExt;

    let dir = TestDir::new()?;
    dir.write_rows(&SEED)?;
    let script = dir.write_file(
        "mark-done.sh",
        "#!/bin/sh\nsed 's/Yet to Start/Completed/' \"$1\" > \"$1.new\" && mv \"$1.new\" \"$1\"\n",
    )?;
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755))?;

    let output = dir
        .dtt_cmd()
        .env("VISUAL", &script)
        .args(["--user", "Bob", "edit", "--json"])
        .output()?;
    assert!(output.status.success());
    let value: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(value["data"]["changed"], true);
    assert_eq!(value["data"]["user"], "Bob");
    assert_eq!(value["data"]["preserved"], 2);

    assert_eq!(
        dir.read_rows()?,
        vec![
            SEED[0].to_string(),
            SEED[2].to_string(),
            SEED[1].to_string(),
            "Bob,2024-05-03,retro,Completed,2024-05-03".to_string(),
        ]
    );
    Ok(())
}

#[test]
fn failing_editor_aborts_edit() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TestDir::new()?;
    dir.write_rows(&SEED)?;
    let before = fs::read_to_string(dir.data_file())?;

    dir.dtt_cmd()
        .env("VISUAL", "false")
        .arg("edit")
        .assert()
        .code(4)
        .stderr(contains("editor exited"));

    assert_eq!(fs::read_to_string(dir.data_file())?, before);
    Ok(())
}
