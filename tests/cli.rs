use assert_cmd::prelude::*;
use predicates::prelude::*;
use rusqlite::Connection;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn extractor(home: &Path) -> Command {
  let mut cmd = Command::new(env!("CARGO_BIN_EXE_extractor"));
  cmd.arg("--home").arg(home).env("RUST_LOG", "warn");
  cmd
}

fn source_database(path: &Path) {
  let conn = Connection::open(path).unwrap();
  conn
    .execute_batch(include_str!("../migrations/source_schema.sql"))
    .unwrap();
  conn
    .execute_batch(
      "
      INSERT INTO res_partner (id, name, is_company, vat, active) VALUES (1, 'ACME SAS', 1, '900123', 1);
      INSERT INTO account_account (id, code, name) VALUES (1, '413501', 'Ventas');
      INSERT INTO account_move (id, name, move_type, state, date, invoice_date, partner_id)
        VALUES (1, 'FV-001', 'out_invoice', 'posted', '2024-03-01', '2024-03-01', 1);
      INSERT INTO account_move_line (move_id, account_id, debit, credit) VALUES (1, 1, 100, 0);
      ",
    )
    .unwrap();
}

#[test]
fn help_describes_the_tool() {
  let temp = TempDir::new().unwrap();
  extractor(temp.path())
    .arg("--help")
    .assert()
    .success()
    .stdout(predicate::str::contains("Excel reports"));
}

#[test]
fn config_show_prints_defaults() {
  let temp = TempDir::new().unwrap();
  extractor(temp.path())
    .args(["config", "show"])
    .assert()
    .success()
    .stdout(predicate::str::contains("\"source_path\": \"\""))
    .stdout(predicate::str::contains("Reportes"));
}

#[test]
fn generate_without_source_fails() {
  let temp = TempDir::new().unwrap();
  extractor(temp.path())
    .args(["generate", "--start", "2024-03-01"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("CONFIG"));
}

#[test]
fn generate_rejects_bad_dates() {
  let temp = TempDir::new().unwrap();
  extractor(temp.path())
    .args(["generate", "--start", "01/03/2024"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("INVALID_DATE"));

  extractor(temp.path())
    .args(["generate", "--start", "2024-03-02", "--end", "2024-03-01"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("INVALID_RANGE"));
}

#[test]
fn generate_writes_reports_and_history() {
  let temp = TempDir::new().unwrap();
  let home = temp.path().join("home");
  let source = temp.path().join("odoo.sqlite");
  let output = temp.path().join("out");
  source_database(&source);

  extractor(&home)
    .args(["config", "set", "--source"])
    .arg(&source)
    .arg("--output")
    .arg(&output)
    .assert()
    .success();

  extractor(&home).arg("check").assert().success();

  extractor(&home)
    .args(["generate", "--start", "2024-03-01", "--end", "2024-03-31"])
    .assert()
    .success()
    .stdout(predicate::str::contains("2 records"));

  assert!(output.join("facturas_2024-03-01_2024-03-31.xlsx").is_file());
  assert!(output.join("terceros_2024-03-01_2024-03-31.xlsx").is_file());

  extractor(&home)
    .args(["history", "--json"])
    .assert()
    .success()
    .stdout(predicate::str::contains("\"records_found\": 2"));
}

#[test]
fn check_reports_missing_tables() {
  let temp = TempDir::new().unwrap();
  let home = temp.path().join("home");
  let source = temp.path().join("empty.sqlite");
  Connection::open(&source)
    .unwrap()
    .execute_batch("CREATE TABLE unrelated (id INTEGER)")
    .unwrap();

  extractor(&home)
    .args(["config", "set", "--source"])
    .arg(&source)
    .assert()
    .success();

  extractor(&home)
    .arg("check")
    .assert()
    .failure()
    .stderr(predicate::str::contains("account_move"));
}
