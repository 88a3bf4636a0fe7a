use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::path::Path;
use std::process::Command;

fn write(dir: &Path, name: &str, content: &str) {
    std::fs::write(dir.join(name), content).expect("write fixture");
}

/// CSV-directory workbook: two years of data, one unmatched account code.
fn workbook_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    write(
        dir.path(),
        "Chart of Accounts.csv",
        "Account Code,Level-3 Account\n101,Rent\n201,Sales\n",
    );
    write(
        dir.path(),
        "Payments.csv",
        "Account Code,Supplier,Issue Date,Amount Paid\n\
         101,Landlord Ltd,2023-03-01,400\n\
         999,Mystery Inc,2022-07-15,50\n",
    );
    write(
        dir.path(),
        "Receipts.csv",
        "Account Code,Supplier,Issue Date,Amount Received\n\
         201,Client Co,2023-03-10,1000\n",
    );
    dir
}

/// A command with its settings file isolated in `home`.
fn finboard_cmd(home: &tempfile::TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("finboard"));
    cmd.env("FINBOARD_CONFIG", home.path().join("settings.json"));
    cmd.env_remove("FINBOARD_LOG");
    cmd
}

fn report_json(home: &tempfile::TempDir, workbook: &Path, args: &[&str]) -> serde_json::Value {
    let out = finboard_cmd(home)
        .arg("--workbook")
        .arg(workbook)
        .arg("report")
        .arg("--json")
        .args(args)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    serde_json::from_slice(&out).expect("json stdout")
}

#[test]
fn json_report_defaults_to_latest_year() {
    let home = tempfile::tempdir().expect("tempdir");
    let book = workbook_dir();
    let v = report_json(&home, book.path(), &[]);

    assert_eq!(v["year"], 2023);
    assert_eq!(v["kpis"]["receipts"], "$1,000.00");
    assert_eq!(v["kpis"]["payments"], "$400.00");
    assert_eq!(v["kpis"]["margin"], "$600.00");
    assert_eq!(v["table"].as_array().map(Vec::len), Some(2));
}

#[test]
fn month_breakdown_sums_both_kinds() {
    let home = tempfile::tempdir().expect("tempdir");
    let book = workbook_dir();
    let v = report_json(&home, book.path(), &["--year", "2023"]);

    let bars = v["month_chart"]["bars"].as_array().expect("bars");
    assert_eq!(bars.len(), 12);
    assert_eq!(bars[2]["label"], "Mar");
    assert_eq!(bars[2]["value"], 1400.0);
    assert_eq!(bars[0]["empty"], true);
}

#[test]
fn supplier_with_no_rows_keeps_month_chart() {
    let home = tempfile::tempdir().expect("tempdir");
    let book = workbook_dir();
    let v = report_json(&home, book.path(), &["--year", "2023", "--supplier", "Nobody"]);

    assert_eq!(v["kpis"]["receipts"], "$0.00");
    assert_eq!(v["kpis"]["payments"], "$0.00");
    assert_eq!(v["kpis"]["margin"], "$0.00");
    assert_eq!(v["table"].as_array().map(Vec::len), Some(0));
    assert_eq!(v["category_chart"]["bars"].as_array().map(Vec::len), Some(0));
    assert_eq!(v["month_chart"]["bars"][2]["value"], 1400.0);
}

#[test]
fn unmatched_code_reports_as_unclassified() {
    let home = tempfile::tempdir().expect("tempdir");
    let book = workbook_dir();
    let v = report_json(&home, book.path(), &["--year", "2022"]);

    assert_eq!(v["category_chart"]["bars"][0]["label"], "Unclassified");
    assert_eq!(v["table"][0]["category"], serde_json::Value::Null);
    assert_eq!(v["kpis"]["margin"], "-$50.00");
}

#[test]
fn text_report_shows_kpis() {
    let home = tempfile::tempdir().expect("tempdir");
    let book = workbook_dir();
    finboard_cmd(&home)
        .arg("--workbook")
        .arg(book.path())
        .args(["report", "--page", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("$1,000.00"))
        .stdout(predicate::str::contains("Value by Category"))
        .stdout(predicate::str::contains("Landlord Ltd"));
}

#[test]
fn missing_workbook_fails() {
    let home = tempfile::tempdir().expect("tempdir");
    finboard_cmd(&home)
        .args(["--workbook", "/nonexistent/finboard.xlsx", "report"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("workbook not found"));
}

#[test]
fn missing_join_column_fails() {
    let home = tempfile::tempdir().expect("tempdir");
    let book = workbook_dir();
    write(
        book.path(),
        "Payments.csv",
        "Supplier,Issue Date,Amount Paid\nLandlord Ltd,2023-03-01,400\n",
    );
    write(
        book.path(),
        "Receipts.csv",
        "Supplier,Issue Date,Amount Received\nClient Co,2023-03-10,1000\n",
    );
    finboard_cmd(&home)
        .arg("--workbook")
        .arg(book.path())
        .arg("report")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Join key column 'Account Code'"));
}

#[test]
fn load_remembers_workbook() {
    let home = tempfile::tempdir().expect("tempdir");
    let book = workbook_dir();
    finboard_cmd(&home)
        .arg("load")
        .arg(book.path())
        .assert()
        .success();

    finboard_cmd(&home)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Payments:        2"))
        .stdout(predicate::str::contains("Years:           2022, 2023"));
}

#[test]
fn html_writes_page() {
    let home = tempfile::tempdir().expect("tempdir");
    let book = workbook_dir();
    let out = home.path().join("dash.html");
    finboard_cmd(&home)
        .arg("--workbook")
        .arg(book.path())
        .arg("html")
        .arg("-o")
        .arg(&out)
        .assert()
        .success();
    let page = std::fs::read_to_string(&out).expect("html output");
    assert!(page.contains("<svg"));
    assert!(page.contains("Monthly Total - 2023"));
}

#[test]
fn invalid_date_pattern_in_settings_fails() {
    let home = tempfile::tempdir().expect("tempdir");
    let book = workbook_dir();
    write(
        home.path(),
        "settings.json",
        r#"{"format": {"display_date": "%Q"}}"#,
    );
    finboard_cmd(&home)
        .arg("--workbook")
        .arg(book.path())
        .args(["report", "--json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("display_date"));
}
