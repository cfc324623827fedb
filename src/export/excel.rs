use std::collections::HashMap;

use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, XlsxError};

use crate::report::document::{Border, CellStyle, CellValue, HorizontalAlign, ReportDocument, Sheet};

/// Serializes a rendered document into xlsx bytes, sheets in document order.
pub fn to_buffer(document: &ReportDocument) -> Result<Vec<u8>, XlsxError> {
  let mut workbook = build_workbook(document)?;
  workbook.save_to_buffer()
}

pub fn build_workbook(document: &ReportDocument) -> Result<Workbook, XlsxError> {
  let mut workbook = Workbook::new();
  let mut formats = FormatCache::default();
  for sheet in document.sheets() {
    write_sheet(&mut workbook, sheet, &mut formats)?;
  }
  Ok(workbook)
}

#[derive(Default)]
struct FormatCache {
  formats: HashMap<CellStyle, Format>,
}

impl FormatCache {
  fn get(&mut self, style: &CellStyle) -> &Format {
    self
      .formats
      .entry(style.clone())
      .or_insert_with(|| to_format(style))
  }
}

fn to_format(style: &CellStyle) -> Format {
  let mut format = Format::new();
  if style.bold {
    format = format.set_bold();
  }
  if let Some(rgb) = style.font_color {
    format = format.set_font_color(Color::RGB(rgb));
  }
  if let Some(rgb) = style.fill {
    format = format.set_background_color(Color::RGB(rgb));
  }
  if style.border == Border::Thin {
    format = format.set_border(FormatBorder::Thin);
  }
  if let Some(HorizontalAlign::Center) = style.align {
    format = format.set_align(FormatAlign::Center);
  }
  if let Some(num_format) = style.num_format {
    format = format.set_num_format(num_format);
  }
  format
}

fn write_sheet(workbook: &mut Workbook, sheet: &Sheet, formats: &mut FormatCache) -> Result<(), XlsxError> {
  let worksheet = workbook.add_worksheet();
  worksheet.set_name(&sheet.name)?;

  for (col, width) in sheet.widths.iter().enumerate() {
    worksheet.set_column_width(col_num(col)?, *width)?;
  }

  for (row_idx, row) in sheet.rows.iter().enumerate() {
    let row_num = u32::try_from(row_idx).map_err(|_| XlsxError::RowColumnLimitError)?;
    for (col, cell) in row.iter().enumerate() {
      let col = col_num(col)?;
      let format = formats.get(&cell.style);
      match &cell.value {
        CellValue::Blank => {
          worksheet.write_blank(row_num, col, format)?;
        }
        CellValue::Text(text) => {
          worksheet.write_string_with_format(row_num, col, text, format)?;
        }
        CellValue::Number(number) => {
          worksheet.write_number_with_format(row_num, col, *number, format)?;
        }
      }
    }
  }
  Ok(())
}

fn col_num(col: usize) -> Result<u16, XlsxError> {
  u16::try_from(col).map_err(|_| XlsxError::RowColumnLimitError)
}
