use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use chrono::Utc;
use rusqlite::{params, Connection};

use crate::error::AppError;
use crate::settings;

pub const DB_FILE: &str = "extractor.sqlite";
pub const REPORTS_DIR: &str = "Reportes";

pub struct Db {
  pub conn: Mutex<Connection>,
  pub db_path: PathBuf,
}

/// `EXTRACTOR_HOME` wins, then portable mode next to the executable, then the
/// per-user data directory.
pub fn resolve_app_dir() -> Result<PathBuf, AppError> {
  if let Some(home) = std::env::var_os("EXTRACTOR_HOME").filter(|value| !value.is_empty()) {
    return Ok(PathBuf::from(home));
  }
  if let Some(portable) = resolve_portable_dir()? {
    return Ok(portable);
  }

  let base = dirs_next::data_local_dir()
    .ok_or_else(|| AppError::new("PATH", "Local data directory not found"))?;
  Ok(base.join("ExtractorOdoo"))
}

pub fn init_db(app_dir: &Path) -> Result<Db, AppError> {
  fs::create_dir_all(app_dir)?;
  let db_path = app_dir.join(DB_FILE);
  let mut conn = Connection::open(&db_path)?;
  conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL;")?;
  conn.busy_timeout(Duration::from_secs(5))?;

  run_migrations(&mut conn)?;
  settings::ensure_defaults(&conn, &app_dir.join(REPORTS_DIR))?;
  log::debug!("app store ready at {}", db_path.display());

  Ok(Db {
    conn: Mutex::new(conn),
    db_path,
  })
}

/// Store without a backing file, for tests and dry runs.
pub fn init_memory(default_output: &Path) -> Result<Db, AppError> {
  let mut conn = Connection::open_in_memory()?;
  run_migrations(&mut conn)?;
  settings::ensure_defaults(&conn, default_output)?;
  Ok(Db {
    conn: Mutex::new(conn),
    db_path: PathBuf::from(":memory:"),
  })
}

pub fn with_conn<T>(db: &Db, f: impl FnOnce(&mut Connection) -> Result<T, AppError>) -> Result<T, AppError> {
  let mut guard = db.conn.lock()?;
  f(&mut guard)
}

fn run_migrations(conn: &mut Connection) -> Result<(), AppError> {
  conn.execute_batch(
    "CREATE TABLE IF NOT EXISTS schema_migrations (version TEXT PRIMARY KEY, applied_at TEXT NOT NULL)",
  )?;

  apply_migration(conn, "001_init", include_str!("../migrations/001_init.sql"))?;
  Ok(())
}

fn apply_migration(conn: &mut Connection, version: &str, sql: &str) -> Result<(), AppError> {
  let exists: i64 = conn.query_row(
    "SELECT COUNT(*) FROM schema_migrations WHERE version = ?1",
    params![version],
    |row| row.get(0),
  )?;
  if exists > 0 {
    return Ok(());
  }

  let tx = conn.transaction()?;
  tx.execute_batch(sql)?;
  tx.execute(
    "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
    params![version, Utc::now().to_rfc3339()],
  )?;
  tx.commit()?;
  log::info!("applied migration {version}");
  Ok(())
}

fn resolve_portable_dir() -> Result<Option<PathBuf>, AppError> {
  let env_enabled = std::env::var("EXTRACTOR_PORTABLE")
    .ok()
    .map(|value| {
      let value = value.to_ascii_lowercase();
      value == "1" || value == "true" || value == "yes"
    })
    .unwrap_or(false);

  let exe_dir = std::env::current_exe()
    .ok()
    .and_then(|path| path.parent().map(|parent| parent.to_path_buf()));

  if let Some(exe_dir) = exe_dir {
    let flag = exe_dir.join("portable.flag");
    let data_dir = exe_dir.join("data");
    if env_enabled || flag.exists() || data_dir.exists() {
      fs::create_dir_all(&data_dir)?;
      return Ok(Some(data_dir));
    }
  }

  Ok(None)
}
