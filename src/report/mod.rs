//! Report pipeline: query result, tabular formatting, sheet rendering and
//! the file writer.

pub mod descriptor;
pub mod document;
pub mod format;
pub mod generator;
pub mod query;
pub mod render;
pub mod writer;

pub use descriptor::{ReportDescriptor, ReportKind};
pub use document::{Border, Cell, CellStyle, CellValue, HorizontalAlign, ReportDocument, Sheet};
pub use format::{format_result, Grid};
pub use generator::ReportGenerator;
pub use query::{Column, ColumnKind, QueryResult, Value};
pub use render::{ReportMetadata, ReportRenderer};
pub use writer::ReportWriter;

/// Progress of a single report request. A failure at any point ends the
/// request with a [`crate::error::ReportError`]; nothing is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
  Idle,
  Formatting,
  Rendering,
  WriteProbing,
  Writing,
  Done,
}
