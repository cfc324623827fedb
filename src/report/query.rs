use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::ReportError;

/// A single nullable scalar as read from the data source.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
  Null,
  Text(String),
  Integer(i64),
  Float(f64),
  Date(NaiveDate),
  DateTime(NaiveDateTime),
}

impl Value {
  pub fn is_null(&self) -> bool {
    matches!(self, Value::Null)
  }

  /// Null, or text with nothing but whitespace.
  pub fn is_blank(&self) -> bool {
    match self {
      Value::Null => true,
      Value::Text(text) => text.trim().is_empty(),
      _ => false,
    }
  }
}

impl From<&str> for Value {
  fn from(value: &str) -> Self {
    Value::Text(value.to_string())
  }
}

impl From<String> for Value {
  fn from(value: String) -> Self {
    Value::Text(value)
  }
}

impl From<i64> for Value {
  fn from(value: i64) -> Self {
    Value::Integer(value)
  }
}

impl From<f64> for Value {
  fn from(value: f64) -> Self {
    Value::Float(value)
  }
}

impl From<NaiveDate> for Value {
  fn from(value: NaiveDate) -> Self {
    Value::Date(value)
  }
}

impl From<NaiveDateTime> for Value {
  fn from(value: NaiveDateTime) -> Self {
    Value::DateTime(value)
  }
}

impl<T: Into<Value>> From<Option<T>> for Value {
  fn from(value: Option<T>) -> Self {
    value.map(Into::into).unwrap_or(Value::Null)
  }
}

/// How a column is presented in the rendered sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
  Text,
  Date,
  Currency,
  Centered,
}

const CENTERED_COLUMNS: &[&str] = &["naturaleza_cuenta", "tipo_empresa"];

impl ColumnKind {
  /// Naming convention used by the accounting queries: `fecha*` columns hold
  /// dates, `valor`/`precio` columns hold amounts, a few flag columns are
  /// centered.
  pub fn infer(name: &str) -> ColumnKind {
    let lower = name.to_lowercase();
    if lower.contains("fecha") {
      ColumnKind::Date
    } else if lower.contains("valor") || lower.contains("precio") {
      ColumnKind::Currency
    } else if CENTERED_COLUMNS.contains(&lower.as_str()) {
      ColumnKind::Centered
    } else {
      ColumnKind::Text
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
  pub name: String,
  pub kind: ColumnKind,
}

impl Column {
  pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
    Self {
      name: name.into(),
      kind,
    }
  }

  pub fn inferred(name: impl Into<String>) -> Self {
    let name = name.into();
    let kind = ColumnKind::infer(&name);
    Self { name, kind }
  }
}

/// Rows read from the data source together with their column schema. Every
/// row has exactly one cell per column.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
  columns: Vec<Column>,
  rows: Vec<Vec<Value>>,
}

impl QueryResult {
  pub fn new(columns: Vec<Column>, rows: Vec<Vec<Value>>) -> Result<Self, ReportError> {
    let mut seen = HashSet::new();
    for column in &columns {
      if !seen.insert(column.name.as_str()) {
        return Err(ReportError::Format(format!("duplicate column '{}'", column.name)));
      }
    }

    for (idx, row) in rows.iter().enumerate() {
      if row.len() != columns.len() {
        return Err(ReportError::Format(format!(
          "row {} has {} cells, expected {}",
          idx + 1,
          row.len(),
          columns.len()
        )));
      }
    }

    Ok(Self { columns, rows })
  }

  /// Builds a result whose column kinds follow [`ColumnKind::infer`].
  pub fn from_names<S: AsRef<str>>(names: &[S], rows: Vec<Vec<Value>>) -> Result<Self, ReportError> {
    let columns = names.iter().map(|name| Column::inferred(name.as_ref())).collect();
    Self::new(columns, rows)
  }

  pub fn columns(&self) -> &[Column] {
    &self.columns
  }

  pub fn rows(&self) -> &[Vec<Value>] {
    &self.rows
  }

  pub fn len(&self) -> usize {
    self.rows.len()
  }

  pub fn is_empty(&self) -> bool {
    self.rows.is_empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn infers_kinds_from_column_names() {
    assert_eq!(ColumnKind::infer("fecha_factura"), ColumnKind::Date);
    assert_eq!(ColumnKind::infer("FechaVencimiento"), ColumnKind::Date);
    assert_eq!(ColumnKind::infer("valor"), ColumnKind::Currency);
    assert_eq!(ColumnKind::infer("precio_unitario"), ColumnKind::Currency);
    assert_eq!(ColumnKind::infer("naturaleza_cuenta"), ColumnKind::Centered);
    assert_eq!(ColumnKind::infer("Tipo_Empresa"), ColumnKind::Centered);
    assert_eq!(ColumnKind::infer("tipo_empresa_padre"), ColumnKind::Text);
    assert_eq!(ColumnKind::infer("numero_factura"), ColumnKind::Text);
  }

  #[test]
  fn date_token_wins_over_amount_token() {
    assert_eq!(ColumnKind::infer("fecha_valor"), ColumnKind::Date);
  }

  #[test]
  fn rejects_ragged_rows() {
    let err = QueryResult::from_names(
      &["a", "b"],
      vec![vec![Value::from("x"), Value::Null], vec![Value::from("y")]],
    )
    .unwrap_err();
    assert!(err.to_string().contains("row 2 has 1 cells, expected 2"));
  }

  #[test]
  fn rejects_duplicate_columns() {
    let err = QueryResult::from_names(&["valor", "valor"], Vec::new()).unwrap_err();
    assert!(matches!(err, ReportError::Format(_)));
  }

  #[test]
  fn optional_values_map_to_null() {
    assert_eq!(Value::from(None::<f64>), Value::Null);
    assert_eq!(Value::from(Some("C")), Value::Text("C".to_string()));
  }

  #[test]
  fn blank_covers_null_and_whitespace_text() {
    assert!(Value::Null.is_blank());
    assert!(Value::from("").is_blank());
    assert!(Value::from("   ").is_blank());
    assert!(!Value::from("2024-01-01").is_blank());
    assert!(!Value::Integer(0).is_blank());
  }
}
