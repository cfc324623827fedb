use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Border {
  #[default]
  None,
  /// Thin line on all four sides.
  Thin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HorizontalAlign {
  Center,
}

/// Immutable cell appearance. Instances are built once per renderer and shared
/// between cells through `Arc`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct CellStyle {
  pub bold: bool,
  pub font_color: Option<u32>,
  pub fill: Option<u32>,
  pub border: Border,
  pub align: Option<HorizontalAlign>,
  pub num_format: Option<&'static str>,
}

impl CellStyle {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn bold(mut self) -> Self {
    self.bold = true;
    self
  }

  pub fn font_color(mut self, rgb: u32) -> Self {
    self.font_color = Some(rgb);
    self
  }

  pub fn fill(mut self, rgb: u32) -> Self {
    self.fill = Some(rgb);
    self
  }

  pub fn border(mut self, border: Border) -> Self {
    self.border = border;
    self
  }

  pub fn align(mut self, align: HorizontalAlign) -> Self {
    self.align = Some(align);
    self
  }

  pub fn num_format(mut self, format: &'static str) -> Self {
    self.num_format = Some(format);
    self
  }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
  Blank,
  Text(String),
  Number(f64),
}

impl CellValue {
  /// Text as a spreadsheet viewer would show it, used for width estimates.
  pub fn display(&self) -> String {
    match self {
      CellValue::Blank => String::new(),
      CellValue::Text(text) => text.clone(),
      CellValue::Number(number) => number.to_string(),
    }
  }

  pub fn is_blank(&self) -> bool {
    match self {
      CellValue::Blank => true,
      CellValue::Text(text) => text.is_empty(),
      CellValue::Number(_) => false,
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
  pub value: CellValue,
  pub style: Arc<CellStyle>,
}

impl Cell {
  pub fn new(value: CellValue, style: &Arc<CellStyle>) -> Self {
    Self {
      value,
      style: Arc::clone(style),
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
  pub name: String,
  /// Width per column in character units.
  pub widths: Vec<f64>,
  pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
  pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
    self.rows.get(row).and_then(|cells| cells.get(col))
  }
}

/// Workbook contents in sheet order. The metadata sheet passed to
/// [`ReportDocument::new`] stays first no matter how many sheets follow.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportDocument {
  sheets: Vec<Sheet>,
}

impl ReportDocument {
  pub fn new(metadata: Sheet) -> Self {
    Self { sheets: vec![metadata] }
  }

  pub fn push_sheet(&mut self, sheet: Sheet) {
    self.sheets.push(sheet);
  }

  pub fn sheets(&self) -> &[Sheet] {
    &self.sheets
  }

  pub fn metadata(&self) -> &Sheet {
    &self.sheets[0]
  }

  pub fn sheet(&self, name: &str) -> Option<&Sheet> {
    self.sheets.iter().find(|sheet| sheet.name == name)
  }
}
