pub mod queries;

use std::path::Path;
use std::time::{Duration, Instant};

use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, OpenFlags};

use crate::domain::validation::DateRange;
use crate::error::AppError;
use crate::models::ConnectionReport;
use crate::report::query::{Column, QueryResult, Value};

pub use queries::ExtractQuery;

/// Anything that can answer the extraction queries for a date window.
pub trait DataSource {
  fn fetch(&self, query: ExtractQuery, range: &DateRange) -> Result<QueryResult, AppError>;
}

/// Read-only view of an accounting database stored as SQLite.
pub struct SqliteSource {
  conn: Connection,
  database: String,
}

impl SqliteSource {
  pub fn open(path: &Path) -> Result<Self, AppError> {
    if !path.is_file() {
      return Err(AppError::new(
        "SOURCE_MISSING",
        format!("Source database not found: {}", path.display()),
      ));
    }
    let conn = Connection::open_with_flags(
      path,
      OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    conn.busy_timeout(Duration::from_secs(30))?;
    log::debug!("opened source database {}", path.display());
    Ok(Self {
      conn,
      database: path.to_string_lossy().to_string(),
    })
  }

  pub fn from_connection(conn: Connection) -> Self {
    Self {
      conn,
      database: ":memory:".to_string(),
    }
  }

  pub fn check_connection(&self) -> Result<ConnectionReport, AppError> {
    let started = Instant::now();
    let sqlite_version: String = self.conn.query_row("SELECT sqlite_version()", [], |row| row.get(0))?;

    let mut stmt = self
      .conn
      .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")?;
    let present = stmt
      .query_map([], |row| row.get::<_, String>(0))?
      .collect::<Result<Vec<_>, _>>()?;
    let missing_tables = queries::REQUIRED_TABLES
      .iter()
      .filter(|table| !present.iter().any(|name| name.as_str() == **table))
      .map(|table| table.to_string())
      .collect();

    Ok(ConnectionReport {
      database: self.database.clone(),
      sqlite_version,
      missing_tables,
      response_ms: started.elapsed().as_millis(),
    })
  }

  pub fn record_count(&self, table: &str) -> Result<i64, AppError> {
    if !queries::COUNTABLE_TABLES.contains(&table) {
      return Err(AppError::new("CONFIG", format!("Table name '{table}' not allowed")));
    }
    let count = self
      .conn
      .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
    Ok(count)
  }
}

impl DataSource for SqliteSource {
  fn fetch(&self, query: ExtractQuery, range: &DateRange) -> Result<QueryResult, AppError> {
    let mut stmt = self.conn.prepare(&query.sql())?;
    let columns: Vec<Column> = stmt
      .column_names()
      .into_iter()
      .map(|name| Column::new(name, query.column_kind(name)))
      .collect();
    let width = columns.len();

    let start = range.start.format("%Y-%m-%d").to_string();
    let end = range.end.format("%Y-%m-%d").to_string();
    let mut rows = stmt.query(params![start, end])?;

    let mut values = Vec::new();
    while let Some(row) = rows.next()? {
      let mut cells = Vec::with_capacity(width);
      for idx in 0..width {
        cells.push(to_value(row.get_ref(idx)?));
      }
      values.push(cells);
    }

    log::debug!("{:?}: {} rows for {} to {}", query, values.len(), start, end);
    Ok(QueryResult::new(columns, values)?)
  }
}

fn to_value(value: ValueRef<'_>) -> Value {
  match value {
    ValueRef::Null => Value::Null,
    ValueRef::Integer(number) => Value::Integer(number),
    ValueRef::Real(number) => Value::Float(number),
    ValueRef::Text(bytes) | ValueRef::Blob(bytes) => Value::Text(String::from_utf8_lossy(bytes).to_string()),
  }
}
