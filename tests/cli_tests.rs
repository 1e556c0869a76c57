#![cfg(feature = "cli")]

use std::fs;

use assert_cmd::Command;
use predicates::str::contains as str_contains;
use tempfile::{NamedTempFile, TempDir};

#[allow(deprecated)]
fn cli() -> Command {
    let mut cmd = Command::cargo_bin("cli").expect("cli binary");
    cmd.env_remove("LANG")
        .env_remove("BLIND_GANTT_LOG_FILE")
        .env("RUST_LOG", "off");
    cmd
}

fn run_cli(script: &str) -> assert_cmd::assert::Assert {
    cli().write_stdin(script.to_string()).assert()
}

fn write_sheet(dir: &TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("tasks.csv");
    fs::write(&path, contents).unwrap();
    path
}

const SHEET: &str = "Task,Start,Duration,Predecessor\n\
                     Kickoff,06/01/2025,0,-\n\
                     Design,06/01/2025,8,Kickoff\n\
                     Build,06/01/2025,16,Design\n";

#[test]
fn batch_schedule_prints_count_and_table() {
    let dir = TempDir::new().unwrap();
    let sheet = write_sheet(&dir, SHEET);

    cli()
        .arg("schedule")
        .arg(&sheet)
        .args(["--today", "2025-01-07"])
        .assert()
        .success()
        .stdout(str_contains("Valid tasks and milestones found: 3"))
        .stdout(str_contains("Schedule as of 2025-01-07"))
        .stdout(str_contains("| Build"))
        .stdout(str_contains("started"));
}

#[test]
fn batch_schedule_writes_output_and_back() {
    let dir = TempDir::new().unwrap();
    let sheet = write_sheet(&dir, SHEET);
    let output = dir.path().join("out.csv");

    cli()
        .arg("schedule")
        .arg(&sheet)
        .args(["--today", "2025-01-07", "--write-back", "--output"])
        .arg(&output)
        .assert()
        .success()
        .stdout(str_contains("Start dates written back"));

    let written = fs::read_to_string(&sheet).unwrap();
    assert!(written.contains("Build,2025-01-07,16,Design"), "{written}");

    let exported = fs::read_to_string(&output).unwrap();
    assert!(exported.starts_with("Task,Start,Duration,Predecessor,End,Status,SpanDays"));
    assert!(exported.contains("Build,2025-01-07,16.0,Design,2025-01-09,started,2"));
}

#[test]
fn batch_schedule_applies_country_holidays() {
    let dir = TempDir::new().unwrap();
    // 2025-07-14 is a French public holiday
    let sheet = write_sheet(&dir, "Task,Start,Duration,Predecessor\nA,14/07/2025,8,-\n");
    let output = dir.path().join("out.csv");

    cli()
        .arg("schedule")
        .arg(&sheet)
        .args(["--today", "2025-07-01", "--country", "FR", "--output"])
        .arg(&output)
        .assert()
        .success();

    let exported = fs::read_to_string(&output).unwrap();
    assert!(exported.contains("A,2025-07-14,8.0,-,2025-07-16,not_started,2"), "{exported}");
}

#[test]
fn batch_schedule_reports_malformed_rows() {
    let dir = TempDir::new().unwrap();
    let sheet = write_sheet(
        &dir,
        "Task,Start,Duration,Predecessor\nA,06/01/2025,8,-\nB,someday,8,-\n",
    );

    cli()
        .arg("schedule")
        .arg(&sheet)
        .args(["--today", "2025-01-07"])
        .assert()
        .failure()
        .stderr(str_contains("item 'B'"))
        .stderr(str_contains("someday"));
}

#[test]
fn log_file_receives_run_banner() {
    let dir = TempDir::new().unwrap();
    let sheet = write_sheet(&dir, SHEET);
    let log = dir.path().join("log.txt");

    cli()
        .env("RUST_LOG", "blind_gantt=info,cli=info")
        .arg("--log-file")
        .arg(&log)
        .arg("schedule")
        .arg(&sheet)
        .args(["--today", "2025-01-07"])
        .assert()
        .success();

    let contents = fs::read_to_string(&log).unwrap();
    assert!(contents.contains(" Run "), "{contents}");
    assert!(contents.contains("execution successful"), "{contents}");
}

#[test]
fn prompt_add_and_compute() {
    run_cli(
        "add A 2025-01-06 8\nadd B 06/01/2025 8 A\ntoday 2025-01-07\ncompute\nquit\n",
    )
    .success()
    .stdout(str_contains("Item A saved."))
    .stdout(str_contains("Item B saved."))
    .stdout(str_contains("Reference date set to 2025-01-07."))
    .stdout(str_contains("Computed (items=2, milestones=0, tasks=2"));
}

#[test]
fn prompt_delete_command_removes_item() {
    run_cli("add A 2025-01-06 8\nadd B 2025-01-06 8 A\ndelete B\ndelete Z\nquit\n")
        .success()
        .stdout(str_contains("Deleted item B."))
        .stdout(str_contains("Item Z not found."));
}

#[test]
fn prompt_rejects_bad_input() {
    run_cli("add A tomorrow 8\nadd A 2025-01-06 -8\nfrobnicate\nquit\n")
        .success()
        .stdout(str_contains("Invalid start date"))
        .stdout(str_contains("duration -8 is negative"))
        .stdout(str_contains("Unknown command. Type 'help'."));
}

#[test]
fn prompt_save_and_load_json_round_trip() {
    let tmp = NamedTempFile::new().expect("create temp file");
    let path = tmp.path().to_string_lossy().to_string();
    let script = format!(
        "add Persist 2025-01-06 8\nsave json {path}\nadd Temp 2025-01-06 8\nload json {path}\nshow\nquit\n"
    );
    let assert = run_cli(&script).success();
    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(
        output.contains("Schedule loaded from"),
        "expected output to mention load completion"
    );
    let after_reload = output
        .split("Schedule loaded from")
        .last()
        .unwrap_or_default();
    assert!(after_reload.contains("(1 items)"), "{after_reload}");
    assert!(after_reload.contains("Persist"));
    assert!(
        !after_reload.contains("Temp"),
        "temporary item should not appear after reload:\n{after_reload}"
    );
}

#[test]
fn prompt_calendar_holiday_and_strategy() {
    run_cli("calendar holiday 2025-01-07\nstrategy single\ncalendar show\nstrategy sideways\nquit\n")
        .success()
        .stdout(str_contains("Holiday 2025-01-07 added."))
        .stdout(str_contains("Strategy set to single_pass."))
        .stdout(str_contains("2025-01-07"))
        .stdout(str_contains("Usage: strategy <single|topological>"));
}

#[test]
fn prompt_calendar_country_reports_lookup_errors() {
    run_cli("add A 2025-07-07 40\ncalendar country ZZ\ncalendar country FR\ncalendar show\nquit\n")
        .success()
        .stdout(str_contains(
            "Cannot load holidays for ZZ: no holiday calendar available for country 'ZZ'",
        ))
        .stdout(str_contains("holiday(s) for FR."))
        .stdout(str_contains("2025-07-14"));
}
