use chrono::Utc;
use rusqlite::{params, Connection};

use crate::domain::validation::DateRange;
use crate::error::AppError;
use crate::models::HistoryEntry;

pub const DEFAULT_HISTORY_LIMIT: i64 = 10;

pub fn save_query_history(
  conn: &Connection,
  range: &DateRange,
  records_found: usize,
  execution_time: f64,
) -> Result<(), AppError> {
  let created_at = Utc::now().to_rfc3339();
  conn.execute(
    "INSERT INTO query_history (date_start, date_end, records_found, execution_time, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
    params![
      range.start.format("%Y-%m-%d").to_string(),
      range.end.format("%Y-%m-%d").to_string(),
      records_found as i64,
      execution_time,
      created_at
    ],
  )?;
  log::info!(
    "history: {} to {}, {} records in {:.2}s",
    range.start,
    range.end,
    records_found,
    execution_time
  );
  Ok(())
}

pub fn get_query_history(conn: &Connection, limit: i64) -> Result<Vec<HistoryEntry>, AppError> {
  let mut stmt = conn.prepare(
    "SELECT date_start, date_end, records_found, execution_time, created_at
     FROM query_history
     ORDER BY id DESC
     LIMIT ?1",
  )?;
  let rows = stmt.query_map(params![limit], |row| {
    Ok(HistoryEntry {
      date_start: row.get(0)?,
      date_end: row.get(1)?,
      records_found: row.get(2)?,
      execution_time: row.get(3)?,
      created_at: row.get(4)?,
    })
  })?;

  let mut items = Vec::new();
  for row in rows {
    items.push(row?);
  }
  Ok(items)
}

#[cfg(test)]
mod tests {
  use std::path::Path;

  use chrono::NaiveDate;

  use super::*;
  use crate::db;

  fn day(d: u32) -> DateRange {
    DateRange::single(NaiveDate::from_ymd_opt(2024, 1, d).unwrap())
  }

  #[test]
  fn newest_entries_come_first() {
    let db = db::init_memory(Path::new("out")).unwrap();
    let history = db::with_conn(&db, |conn| {
      save_query_history(conn, &day(1), 3, 0.5)?;
      save_query_history(conn, &day(2), 0, 0.1)?;
      save_query_history(conn, &day(3), 12, 1.25)?;
      get_query_history(conn, 2)
    })
    .unwrap();

    assert_eq!(history.len(), 2);
    assert_eq!(history[0].date_start, "2024-01-03");
    assert_eq!(history[0].records_found, 12);
    assert_eq!(history[1].date_start, "2024-01-02");
  }
}
