use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use crate::error::ReportError;
use crate::export::excel;
use crate::report::descriptor::ReportDescriptor;
use crate::report::document::ReportDocument;

const WRITE_PROBE_PREFIX: &str = ".extractor_write_probe";

/// Persists rendered documents under one output directory.
#[derive(Debug, Clone)]
pub struct ReportWriter {
  output_directory: PathBuf,
}

impl ReportWriter {
  /// Creates the directory when missing and checks that files can be created
  /// in it.
  pub fn new(output_directory: impl Into<PathBuf>) -> Result<Self, ReportError> {
    let output_directory = output_directory.into();
    ensure_directory(&output_directory)?;
    Ok(Self { output_directory })
  }

  pub fn output_directory(&self) -> &Path {
    &self.output_directory
  }

  pub fn target_path(&self, descriptor: &ReportDescriptor) -> PathBuf {
    self.output_directory.join(descriptor.file_name())
  }

  /// Fails when an existing target cannot be opened for read-modify access,
  /// which is how a file held open by a spreadsheet viewer shows up.
  ///
  /// The probe is advisory: another process may still grab the file between
  /// this check and the final rename.
  pub fn probe(&self, path: &Path) -> Result<(), ReportError> {
    if !path.exists() {
      return Ok(());
    }
    OpenOptions::new()
      .read(true)
      .write(true)
      .open(path)
      .map(drop)
      .map_err(|source| ReportError::FileLocked {
        path: path.to_path_buf(),
        source,
      })
  }

  pub fn write(&self, descriptor: &ReportDescriptor, document: &ReportDocument) -> Result<PathBuf, ReportError> {
    let path = self.target_path(descriptor);
    log::debug!("{}: write probe", path.display());
    self.probe(&path)?;

    log::debug!("{}: writing", path.display());
    let bytes = excel::to_buffer(document)?;
    persist(&path, &bytes)?;
    Ok(path)
  }
}

fn ensure_directory(dir: &Path) -> Result<(), ReportError> {
  let directory_error = |source| ReportError::Directory {
    path: dir.to_path_buf(),
    source,
  };

  fs::create_dir_all(dir).map_err(directory_error)?;
  // One probe file per writer; concurrent writers only ever remove their own.
  let probe = tempfile::Builder::new()
    .prefix(WRITE_PROBE_PREFIX)
    .suffix(".tmp")
    .tempfile_in(dir)
    .map_err(directory_error)?;
  probe.close().map_err(directory_error)?;
  Ok(())
}

// The document lands through a rename so the target is either the previous
// file or the complete new one.
fn persist(path: &Path, bytes: &[u8]) -> Result<(), ReportError> {
  let file_name = path
    .file_name()
    .map(|name| name.to_string_lossy().to_string())
    .unwrap_or_else(|| "report.xlsx".to_string());
  let staging = path.with_file_name(format!(".{file_name}.partial"));

  let result = fs::write(&staging, bytes).and_then(|_| fs::rename(&staging, path));
  if let Err(source) = result {
    let _ = fs::remove_file(&staging);
    return Err(ReportError::Write {
      path: path.to_path_buf(),
      source,
    });
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::{Arc, Barrier};
  use std::thread;

  use chrono::NaiveDate;
  use tempfile::TempDir;

  use crate::report::descriptor::ReportKind;
  use crate::report::render::{ReportMetadata, ReportRenderer};

  fn descriptor() -> ReportDescriptor {
    let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    ReportDescriptor {
      kind: ReportKind::Invoices,
      start_date: day,
      end_date: day,
    }
  }

  fn document() -> ReportDocument {
    let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    ReportRenderer::new().render(
      &ReportMetadata {
        report_type: "Facturas Report".to_string(),
        generated_at: day.and_hms_opt(0, 0, 0).unwrap(),
        start_date: day,
        end_date: day,
        record_count: 0,
      },
      &[],
    )
  }

  #[test]
  fn creates_missing_directories() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("Reportes").join("2024");
    let writer = ReportWriter::new(&dir).unwrap();
    assert!(dir.is_dir());
    assert_eq!(fs::read_dir(&dir).unwrap().count(), 0);
    assert_eq!(writer.output_directory(), dir.as_path());
  }

  #[test]
  fn writers_built_concurrently_share_a_directory() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("Reportes");
    fs::create_dir(&dir).unwrap();

    for _ in 0..50 {
      let barrier = Arc::new(Barrier::new(8));
      let handles: Vec<_> = (0..8)
        .map(|_| {
          let barrier = Arc::clone(&barrier);
          let dir = dir.clone();
          thread::spawn(move || {
            barrier.wait();
            ReportWriter::new(dir).map(drop).map_err(|err| err.to_string())
          })
        })
        .collect();
      for handle in handles {
        handle.join().unwrap().unwrap();
      }
    }
    assert_eq!(fs::read_dir(&dir).unwrap().count(), 0);
  }

  #[test]
  fn directory_under_a_file_is_rejected() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("not_a_dir");
    fs::write(&file, b"x").unwrap();

    let err = ReportWriter::new(file.join("out")).unwrap_err();
    assert!(matches!(err, ReportError::Directory { .. }));
  }

  #[test]
  fn writes_to_the_descriptor_path_without_leftovers() {
    let temp = TempDir::new().unwrap();
    let writer = ReportWriter::new(temp.path()).unwrap();

    let path = writer.write(&descriptor(), &document()).unwrap();
    assert_eq!(path, temp.path().join("facturas_2024-01-01.xlsx"));
    assert!(path.is_file());

    let entries: Vec<_> = fs::read_dir(temp.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);
  }

  #[test]
  fn replaces_an_unlocked_previous_report() {
    let temp = TempDir::new().unwrap();
    let writer = ReportWriter::new(temp.path()).unwrap();
    let target = writer.target_path(&descriptor());
    fs::write(&target, b"old").unwrap();

    writer.write(&descriptor(), &document()).unwrap();
    assert_ne!(fs::read(&target).unwrap(), b"old");
  }

  #[test]
  fn unopenable_target_is_reported_as_locked() {
    let temp = TempDir::new().unwrap();
    let writer = ReportWriter::new(temp.path()).unwrap();
    let target = writer.target_path(&descriptor());
    fs::create_dir(&target).unwrap();
    fs::write(target.join("keep.txt"), b"keep").unwrap();

    let err = writer.write(&descriptor(), &document()).unwrap_err();
    assert!(matches!(err, ReportError::FileLocked { .. }));
    assert_eq!(fs::read(target.join("keep.txt")).unwrap(), b"keep");
  }

  #[test]
  fn failed_rename_leaves_no_staging_file() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("busy");
    fs::create_dir(&target).unwrap();
    fs::write(target.join("child"), b"x").unwrap();

    let err = persist(&target, b"data").unwrap_err();
    assert!(matches!(err, ReportError::Write { .. }));
    assert!(!temp.path().join(".busy.partial").exists());
  }
}
