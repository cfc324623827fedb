use std::path::Path;

use rusqlite::{params, Connection};

use crate::error::AppError;
use crate::models::Settings;

const KEY_SOURCE_PATH: &str = "source_path";
const KEY_OUTPUT_DIRECTORY: &str = "output_directory";

pub fn ensure_defaults(conn: &Connection, default_output: &Path) -> Result<(), AppError> {
  conn.execute(
    "INSERT OR IGNORE INTO settings (key, value) VALUES (?1, ?2)",
    params![KEY_SOURCE_PATH, ""],
  )?;
  conn.execute(
    "INSERT OR IGNORE INTO settings (key, value) VALUES (?1, ?2)",
    params![KEY_OUTPUT_DIRECTORY, default_output.to_string_lossy().to_string()],
  )?;
  Ok(())
}

pub fn get_settings(conn: &Connection) -> Result<Settings, AppError> {
  let mut stmt = conn.prepare("SELECT key, value FROM settings")?;
  let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;

  let mut source_path = String::new();
  let mut output_directory = String::new();

  for row in rows {
    let (key, value) = row?;
    match key.as_str() {
      KEY_SOURCE_PATH => {
        source_path = value;
      }
      KEY_OUTPUT_DIRECTORY => {
        output_directory = value;
      }
      _ => {}
    }
  }

  Ok(Settings {
    source_path,
    output_directory,
  })
}

pub fn update_settings(conn: &Connection, settings: &Settings) -> Result<(), AppError> {
  conn.execute(
    "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
    params![KEY_SOURCE_PATH, settings.source_path.clone()],
  )?;
  conn.execute(
    "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
    params![KEY_OUTPUT_DIRECTORY, settings.output_directory.clone()],
  )?;
  log::info!("settings updated");
  Ok(())
}

/// True once a source database has been configured.
pub fn config_exists(conn: &Connection) -> Result<bool, AppError> {
  Ok(!get_settings(conn)?.source_path.trim().is_empty())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::db;

  #[test]
  fn defaults_do_not_override_saved_values() {
    let db = db::init_memory(Path::new("/tmp/Reportes")).unwrap();
    db::with_conn(&db, |conn| {
      assert!(!config_exists(conn)?);
      assert_eq!(get_settings(conn)?.output_directory, "/tmp/Reportes");

      update_settings(
        conn,
        &Settings {
          source_path: "/data/odoo.sqlite".to_string(),
          output_directory: "/srv/reportes".to_string(),
        },
      )?;
      ensure_defaults(conn, Path::new("/elsewhere"))?;

      let settings = get_settings(conn)?;
      assert_eq!(settings.source_path, "/data/odoo.sqlite");
      assert_eq!(settings.output_directory, "/srv/reportes");
      assert!(config_exists(conn)?);
      Ok(())
    })
    .unwrap();
  }
}
