use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
  pub source_path: String,
  pub output_directory: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HistoryEntry {
  pub date_start: String,
  pub date_end: String,
  pub records_found: i64,
  pub execution_time: f64,
  pub created_at: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ConnectionReport {
  pub database: String,
  pub sqlite_version: String,
  pub missing_tables: Vec<String>,
  pub response_ms: u128,
}

impl ConnectionReport {
  pub fn is_ready(&self) -> bool {
    self.missing_tables.is_empty()
  }
}
