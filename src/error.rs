use std::io;
use std::path::PathBuf;

use rust_xlsxwriter::XlsxError;
use serde::Serialize;
use thiserror::Error;

use crate::report::Stage;

/// Failures of the report pipeline, surfaced unchanged to the caller.
#[derive(Debug, Error)]
pub enum ReportError {
  #[error("cannot access directory {}: {source}", .path.display())]
  Directory {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("file is currently in use: {}", .path.display())]
  FileLocked {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("cannot format report data: {0}")]
  Format(String),

  #[error("cannot write {}: {source}", .path.display())]
  Write {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("cannot build workbook: {0}")]
  Export(#[from] XlsxError),
}

impl ReportError {
  /// The pipeline stage the request was in when it failed. Directory errors
  /// come from building the generator, before any request starts.
  pub fn stage(&self) -> Stage {
    match self {
      ReportError::Directory { .. } => Stage::Idle,
      ReportError::FileLocked { .. } => Stage::WriteProbing,
      ReportError::Format(_) => Stage::Formatting,
      ReportError::Write { .. } | ReportError::Export(_) => Stage::Writing,
    }
  }

  pub fn code(&self) -> &'static str {
    match self {
      ReportError::Directory { .. } => "DIRECTORY",
      ReportError::FileLocked { .. } => "FILE_LOCKED",
      ReportError::Format(_) => "FORMAT",
      ReportError::Write { .. } | ReportError::Export(_) => "WRITE",
    }
  }
}

#[derive(Debug, Serialize)]
pub struct AppError {
  pub code: String,
  pub message: String,
}

impl AppError {
  pub fn new(code: &str, message: impl Into<String>) -> Self {
    Self {
      code: code.to_string(),
      message: message.into(),
    }
  }
}

impl std::fmt::Display for AppError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}: {}", self.code, self.message)
  }
}

impl std::error::Error for AppError {}

impl From<ReportError> for AppError {
  fn from(err: ReportError) -> Self {
    AppError::new(err.code(), err.to_string())
  }
}

impl From<rusqlite::Error> for AppError {
  fn from(err: rusqlite::Error) -> Self {
    AppError::new("DB_ERROR", err.to_string())
  }
}

impl From<io::Error> for AppError {
  fn from(err: io::Error) -> Self {
    AppError::new("IO_ERROR", err.to_string())
  }
}

impl From<XlsxError> for AppError {
  fn from(err: XlsxError) -> Self {
    AppError::new("EXPORT", err.to_string())
  }
}

impl From<serde_json::Error> for AppError {
  fn from(err: serde_json::Error) -> Self {
    AppError::new("SERIALIZE", err.to_string())
  }
}

impl<T> From<std::sync::PoisonError<T>> for AppError {
  fn from(_: std::sync::PoisonError<T>) -> Self {
    AppError::new("LOCK_ERROR", "Database lock failed")
  }
}
