//! CLI integration tests using assert_cmd.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use rust_xlsxwriter::Workbook;
use tempfile::TempDir;

fn quizmark(dir: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("quizmark").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("QUIZMARK_SEPARATOR")
        .env_remove("RUST_LOG");
    cmd
}

/// Two questions worth 5 and 3; participant 7 answers (2, 4), participant 9
/// is registered but never answers.
fn write_exam_workbook(path: &Path) {
    let mut workbook = Workbook::new();

    let raw = workbook.add_worksheet();
    raw.set_name("raw_data").unwrap();
    raw.write_string(0, 0, "user_id").unwrap();
    raw.write_string(0, 1, "currentQuizNumber").unwrap();
    raw.write_string(0, 2, "option_number").unwrap();
    raw.write_number(1, 0, 7.0).unwrap();
    raw.write_number(1, 1, 1.0).unwrap();
    raw.write_number(1, 2, 2.0).unwrap();
    raw.write_number(2, 0, 7.0).unwrap();
    raw.write_number(2, 1, 2.0).unwrap();
    raw.write_number(2, 2, 4.0).unwrap();

    let users = workbook.add_worksheet();
    users.set_name("user_info").unwrap();
    users.write_string(0, 0, "user_id").unwrap();
    users.write_string(0, 1, "name").unwrap();
    users.write_string(0, 2, "organization").unwrap();
    users.write_number(1, 0, 7.0).unwrap();
    users.write_string(1, 1, "Kim").unwrap();
    users.write_string(1, 2, "HQ").unwrap();
    users.write_number(2, 0, 9.0).unwrap();
    users.write_string(2, 1, "Lee").unwrap();
    users.write_string(2, 2, "HQ").unwrap();

    let items = workbook.add_worksheet();
    items.set_name("item_info").unwrap();
    items.write_string(0, 0, "question").unwrap();
    items.write_string(0, 1, "answer").unwrap();
    items.write_string(0, 2, "score").unwrap();
    items.write_number(1, 0, 1.0).unwrap();
    items.write_number(1, 1, 2.0).unwrap();
    items.write_number(1, 2, 5.0).unwrap();
    items.write_number(2, 0, 2.0).unwrap();
    items.write_number(2, 1, 1.0).unwrap();
    items.write_number(2, 2, 3.0).unwrap();

    workbook.save(path).unwrap();
}

fn exam_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    write_exam_workbook(&dir.path().join("input.xlsx"));
    dir
}

#[test]
fn help_flag() {
    let dir = tempfile::tempdir().unwrap();
    quizmark(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--separator"))
        .stdout(predicate::str::contains("--format"));
}

#[test]
fn default_paths_write_tab_separated_report() {
    let dir = exam_dir();
    quizmark(&dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote output.xls (1 examinees)"));

    let content = std::fs::read_to_string(dir.path().join("output.xls")).unwrap();
    assert_eq!(
        content,
        "userId\t1\t2\tscore\tname\torganization\n7\tO\tX\t5.0\tKim\tHQ\n"
    );
}

#[test]
fn missing_input_fails() {
    let dir = tempfile::tempdir().unwrap();
    quizmark(&dir)
        .arg("nope.xlsx")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"))
        .stderr(predicate::str::contains("not found"));
    assert!(!dir.path().join("output.xls").exists());
}

#[test]
fn separator_flag_overrides_default() {
    let dir = exam_dir();
    quizmark(&dir)
        .args(["input.xlsx", "result", "--separator", "comma", "--no-summary"])
        .assert()
        .success();

    let content = std::fs::read_to_string(dir.path().join("result.xls")).unwrap();
    assert!(content.starts_with("userId,1,2,score,name,organization\n"));
    assert!(content.contains("\n7,O,X,5.0,Kim,HQ\n"));
}

#[test]
fn separator_from_environment() {
    let dir = exam_dir();
    quizmark(&dir)
        .env("QUIZMARK_SEPARATOR", ";")
        .arg("--no-summary")
        .assert()
        .success();

    let content = std::fs::read_to_string(dir.path().join("output.xls")).unwrap();
    assert!(content.contains("7;O;X;5.0;Kim;HQ"));
}

#[test]
fn config_file_in_working_directory() {
    let dir = exam_dir();
    std::fs::write(
        dir.path().join("quizmark.toml"),
        "output_extension = \"tsv\"\nscore_header = \"total\"\n",
    )
    .unwrap();

    quizmark(&dir).arg("--no-summary").assert().success();

    let content = std::fs::read_to_string(dir.path().join("output.tsv")).unwrap();
    assert!(content.starts_with("userId\t1\t2\ttotal\t"));
}

#[test]
fn explicit_missing_config_fails() {
    let dir = exam_dir();
    quizmark(&dir)
        .args(["--config", "absent.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn missing_sheet_is_reported() {
    let dir = exam_dir();
    std::fs::write(
        dir.path().join("quizmark.toml"),
        "[sheets]\nanswer_key = \"answers\"\n",
    )
    .unwrap();

    quizmark(&dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("answers"))
        .stderr(predicate::str::contains("item_info"));
}

#[test]
fn all_formats_written() {
    let dir = exam_dir();
    quizmark(&dir)
        .args(["input.xlsx", "out/report", "--format", "all", "--no-summary"])
        .assert()
        .success()
        .stdout(predicate::str::contains("report.json"))
        .stdout(predicate::str::contains("report.html"));

    assert!(dir.path().join("out/report.xls").exists());
    let json = std::fs::read_to_string(dir.path().join("out/report.json")).unwrap();
    assert!(json.contains("\"statistics\""));
    let html = std::fs::read_to_string(dir.path().join("out/report.html")).unwrap();
    assert!(html.contains("<td>Kim</td>"));
}

#[test]
fn summary_goes_to_stderr() {
    let dir = exam_dir();
    quizmark(&dir)
        .assert()
        .success()
        .stderr(predicate::str::contains("Correct rate"))
        .stdout(predicate::str::contains("Correct rate").not());

    quizmark(&dir)
        .arg("--no-summary")
        .assert()
        .success()
        .stderr(predicate::str::contains("Correct rate").not());
}
