use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};

use crate::domain::validation::DateRange;
use crate::error::ReportError;
use crate::report::descriptor::{ReportDescriptor, ReportKind};
use crate::report::format::format_result;
use crate::report::query::QueryResult;
use crate::report::render::{ReportMetadata, ReportRenderer};
use crate::report::writer::ReportWriter;
use crate::report::Stage;

/// Runs query results through formatting, rendering and writing. Each call is
/// an independent request; nothing is retried on failure.
pub struct ReportGenerator {
  writer: ReportWriter,
  renderer: ReportRenderer,
}

impl ReportGenerator {
  pub fn new(output_directory: impl Into<PathBuf>) -> Result<Self, ReportError> {
    Ok(Self {
      writer: ReportWriter::new(output_directory)?,
      renderer: ReportRenderer::new(),
    })
  }

  pub fn output_directory(&self) -> &Path {
    self.writer.output_directory()
  }

  pub fn generate(&self, kind: ReportKind, range: &DateRange, result: &QueryResult) -> Result<PathBuf, ReportError> {
    self.generate_at(kind, range, result, Local::now().naive_local())
  }

  pub fn generate_at(
    &self,
    kind: ReportKind,
    range: &DateRange,
    result: &QueryResult,
    generated_at: NaiveDateTime,
  ) -> Result<PathBuf, ReportError> {
    let sheet_title = kind.sheet_title().ok_or_else(|| {
      ReportError::Format(format!("{kind} reports need one result per sheet, use generate_combined"))
    })?;
    let descriptor = ReportDescriptor::new(kind, range);
    let name = descriptor.file_name();

    log::debug!("{name}: {:?}", Stage::Formatting);
    let grid = format_result(result);

    log::debug!("{name}: {:?}", Stage::Rendering);
    let metadata = metadata(kind, range, grid.record_count(), generated_at);
    let document = self.renderer.render(&metadata, &[(sheet_title, &grid)]);

    let path = self.writer.write(&descriptor, &document)?;
    log::debug!("{name}: {:?}", Stage::Done);
    log::info!("{} report generated: {} ({} records)", kind, path.display(), grid.record_count());
    Ok(path)
  }

  /// Invoices and partners in one workbook. Both sheets are written even when
  /// they hold no rows.
  pub fn generate_combined(
    &self,
    range: &DateRange,
    invoices: &QueryResult,
    partners: &QueryResult,
  ) -> Result<PathBuf, ReportError> {
    self.generate_combined_at(range, invoices, partners, Local::now().naive_local())
  }

  pub fn generate_combined_at(
    &self,
    range: &DateRange,
    invoices: &QueryResult,
    partners: &QueryResult,
    generated_at: NaiveDateTime,
  ) -> Result<PathBuf, ReportError> {
    let descriptor = ReportDescriptor::new(ReportKind::Combined, range);
    let name = descriptor.file_name();

    log::debug!("{name}: {:?}", Stage::Formatting);
    let invoice_grid = format_result(invoices);
    let partner_grid = format_result(partners);
    let total = invoice_grid.record_count() + partner_grid.record_count();

    log::debug!("{name}: {:?}", Stage::Rendering);
    let metadata = metadata(ReportKind::Combined, range, total, generated_at);
    let document = self.renderer.render(
      &metadata,
      &[("Facturas", &invoice_grid), ("Terceros", &partner_grid)],
    );

    let path = self.writer.write(&descriptor, &document)?;
    log::debug!("{name}: {:?}", Stage::Done);
    log::info!("combined report generated: {} ({} records)", path.display(), total);
    Ok(path)
  }
}

fn metadata(kind: ReportKind, range: &DateRange, record_count: usize, generated_at: NaiveDateTime) -> ReportMetadata {
  ReportMetadata {
    report_type: kind.report_type().to_string(),
    generated_at,
    start_date: range.start,
    end_date: range.end,
    record_count,
  }
}
