use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};

use crate::report::document::{Border, Cell, CellStyle, CellValue, HorizontalAlign, ReportDocument, Sheet};
use crate::report::format::Grid;
use crate::report::query::{ColumnKind, Value};

pub const METADATA_SHEET: &str = "Información del Reporte";
pub const SYSTEM_NAME: &str = "Extractor de Datos Odoo 17";
pub const REPORT_VERSION: &str = "1.0";

const HEADER_FILL: u32 = 0x366092;
const KEY_FILL: u32 = 0xE2E2E2;
const WHITE: u32 = 0xFFFFFF;
const TEXT_FORMAT: &str = "@";
const CURRENCY_FORMAT: &str = "#,##0.00";
const MIN_WIDTH: usize = 12;
const MAX_WIDTH: usize = 50;
const METADATA_WIDTHS: [f64; 2] = [25.0, 30.0];

/// Fixed facts written to the first sheet of every report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportMetadata {
  pub report_type: String,
  pub generated_at: NaiveDateTime,
  pub start_date: NaiveDate,
  pub end_date: NaiveDate,
  pub record_count: usize,
}

struct Palette {
  header: Arc<CellStyle>,
  body: Arc<CellStyle>,
  body_text: Arc<CellStyle>,
  body_currency: Arc<CellStyle>,
  body_centered: Arc<CellStyle>,
  meta_key: Arc<CellStyle>,
  meta_value: Arc<CellStyle>,
}

impl Palette {
  fn new() -> Self {
    let body = CellStyle::new().border(Border::Thin);
    Self {
      header: Arc::new(
        CellStyle::new()
          .bold()
          .font_color(WHITE)
          .fill(HEADER_FILL)
          .align(HorizontalAlign::Center)
          .border(Border::Thin),
      ),
      body_text: Arc::new(body.clone().num_format(TEXT_FORMAT)),
      body_currency: Arc::new(body.clone().num_format(CURRENCY_FORMAT)),
      body_centered: Arc::new(body.clone().align(HorizontalAlign::Center)),
      body: Arc::new(body),
      meta_key: Arc::new(CellStyle::new().bold().fill(KEY_FILL)),
      meta_value: Arc::new(CellStyle::new()),
    }
  }
}

/// Lays formatted grids out as styled sheets. Output depends only on the
/// inputs, so rendering the same grid twice yields equal sheets.
pub struct ReportRenderer {
  palette: Palette,
}

impl Default for ReportRenderer {
  fn default() -> Self {
    Self::new()
  }
}

impl ReportRenderer {
  pub fn new() -> Self {
    Self {
      palette: Palette::new(),
    }
  }

  pub fn render(&self, metadata: &ReportMetadata, sheets: &[(&str, &Grid)]) -> ReportDocument {
    let mut document = ReportDocument::new(self.render_metadata(metadata));
    for (name, grid) in sheets {
      document.push_sheet(self.render_sheet(grid, name));
    }
    document
  }

  pub fn render_sheet(&self, grid: &Grid, sheet_name: &str) -> Sheet {
    let header: Vec<Cell> = grid
      .columns
      .iter()
      .map(|column| Cell::new(CellValue::Text(column.name.clone()), &self.palette.header))
      .collect();

    let mut rows = Vec::with_capacity(grid.rows.len() + 1);
    rows.push(header);
    for row in &grid.rows {
      rows.push(
        row
          .iter()
          .map(|value| Cell::new(cell_value(value), &self.palette.body))
          .collect(),
      );
    }

    let widths = (0..grid.columns.len()).map(|col| column_width(&rows, col)).collect();

    for (col, column) in grid.columns.iter().enumerate() {
      let style = match column.kind {
        ColumnKind::Date => &self.palette.body_text,
        ColumnKind::Currency => &self.palette.body_currency,
        ColumnKind::Centered => &self.palette.body_centered,
        ColumnKind::Text => continue,
      };
      for cell in rows.iter_mut().skip(1).map(|row| &mut row[col]) {
        let applies = match column.kind {
          ColumnKind::Date => !cell.value.is_blank(),
          ColumnKind::Currency => matches!(cell.value, CellValue::Number(_)),
          _ => true,
        };
        if applies {
          cell.style = Arc::clone(style);
        }
      }
    }

    Sheet {
      name: sheet_name.to_string(),
      widths,
      rows,
    }
  }

  pub fn render_metadata(&self, metadata: &ReportMetadata) -> Sheet {
    let entries = [
      ("Tipo de Reporte", CellValue::Text(metadata.report_type.clone())),
      (
        "Fecha de Generación",
        CellValue::Text(metadata.generated_at.format("%Y-%m-%d %H:%M:%S").to_string()),
      ),
      ("Fecha Inicio", CellValue::Text(metadata.start_date.format("%Y-%m-%d").to_string())),
      ("Fecha Fin", CellValue::Text(metadata.end_date.format("%Y-%m-%d").to_string())),
      ("Total de Registros", CellValue::Number(metadata.record_count as f64)),
      ("Sistema", CellValue::Text(SYSTEM_NAME.to_string())),
      ("Versión", CellValue::Text(REPORT_VERSION.to_string())),
    ];

    let rows = entries
      .into_iter()
      .map(|(key, value)| {
        vec![
          Cell::new(CellValue::Text(key.to_string()), &self.palette.meta_key),
          Cell::new(value, &self.palette.meta_value),
        ]
      })
      .collect();

    Sheet {
      name: METADATA_SHEET.to_string(),
      widths: METADATA_WIDTHS.to_vec(),
      rows,
    }
  }
}

fn cell_value(value: &Value) -> CellValue {
  match value {
    Value::Null => CellValue::Blank,
    Value::Text(text) => CellValue::Text(text.clone()),
    Value::Integer(number) => CellValue::Number(*number as f64),
    Value::Float(number) => CellValue::Number(*number),
    Value::Date(date) => CellValue::Text(date.format("%Y-%m-%d").to_string()),
    Value::DateTime(date_time) => CellValue::Text(date_time.format("%Y-%m-%d %H:%M:%S").to_string()),
  }
}

fn column_width(rows: &[Vec<Cell>], col: usize) -> f64 {
  let max_len = rows
    .iter()
    .filter_map(|row| row.get(col))
    .map(|cell| cell.value.display().chars().count())
    .max()
    .unwrap_or(0);
  (max_len + 2).clamp(MIN_WIDTH, MAX_WIDTH) as f64
}
