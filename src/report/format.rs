use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::report::query::{Column, ColumnKind, QueryResult, Value};

pub const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y";

/// Display-ready copy of a query result: same columns, same row order, date
/// columns rendered as `DD/MM/YYYY` text.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
  pub columns: Vec<Column>,
  pub rows: Vec<Vec<Value>>,
}

impl Grid {
  pub fn record_count(&self) -> usize {
    self.rows.len()
  }
}

pub fn format_result(result: &QueryResult) -> Grid {
  let columns = result.columns().to_vec();
  let rows = result
    .rows()
    .iter()
    .enumerate()
    .map(|(row_idx, row)| {
      row
        .iter()
        .zip(&columns)
        .map(|(value, column)| match column.kind {
          ColumnKind::Date => format_date_cell(value, &column.name, row_idx),
          _ => value.clone(),
        })
        .collect()
    })
    .collect();

  Grid { columns, rows }
}

// Unparseable dates degrade to blank text instead of failing the row.
fn format_date_cell(value: &Value, column: &str, row_idx: usize) -> Value {
  match parse_date_value(value) {
    Some(date) => Value::Text(date.format(DISPLAY_DATE_FORMAT).to_string()),
    None => {
      if !value.is_blank() {
        log::warn!("{column}: row {}: unparseable date {value:?}, left blank", row_idx + 1);
      }
      Value::Text(String::new())
    }
  }
}

pub fn parse_date_value(value: &Value) -> Option<NaiveDate> {
  match value {
    Value::Date(date) => Some(*date),
    Value::DateTime(date_time) => Some(date_time.date()),
    Value::Text(text) => parse_date_text(text.trim()),
    Value::Null | Value::Integer(_) | Value::Float(_) => None,
  }
}

fn parse_date_text(text: &str) -> Option<NaiveDate> {
  if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
    return Some(date);
  }
  for pattern in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
    if let Ok(date_time) = NaiveDateTime::parse_from_str(text, pattern) {
      return Some(date_time.date());
    }
  }
  DateTime::parse_from_rfc3339(text).ok().map(|date_time| date_time.date_naive())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn invoice_result(rows: Vec<Vec<Value>>) -> QueryResult {
    QueryResult::from_names(&["numero_factura", "fecha_factura", "valor"], rows).unwrap()
  }

  #[test]
  fn keeps_shape_and_order() {
    let result = invoice_result(vec![
      vec!["INV002".into(), "2024-01-02".into(), 20.0.into()],
      vec!["INV001".into(), "2024-01-01".into(), 10.0.into()],
      vec!["INV003".into(), Value::Null, Value::Null],
    ]);

    let grid = format_result(&result);
    assert_eq!(grid.record_count(), 3);
    assert_eq!(grid.columns, result.columns());
    assert!(grid.rows.iter().all(|row| row.len() == 3));
    assert_eq!(grid.rows[0][0], Value::from("INV002"));
    assert_eq!(grid.rows[1][0], Value::from("INV001"));
  }

  #[test]
  fn renders_iso_dates_as_day_first_text() {
    let grid = format_result(&invoice_result(vec![vec![
      "INV001".into(),
      "2024-01-05".into(),
      1000.0.into(),
    ]]));
    assert_eq!(grid.rows[0][1], Value::Text("05/01/2024".to_string()));
    assert_eq!(grid.rows[0][2], Value::Float(1000.0));
  }

  #[test]
  fn unparseable_dates_become_blank_without_touching_the_row() {
    let grid = format_result(&invoice_result(vec![vec![
      "INV001".into(),
      "not-a-date".into(),
      12.5.into(),
    ]]));
    assert_eq!(grid.rows[0][0], Value::from("INV001"));
    assert_eq!(grid.rows[0][1], Value::Text(String::new()));
    assert_eq!(grid.rows[0][2], Value::Float(12.5));
  }

  #[test]
  fn null_and_numeric_dates_become_blank() {
    let grid = format_result(&invoice_result(vec![
      vec!["A".into(), Value::Null, Value::Null],
      vec!["B".into(), Value::Integer(45_000), Value::Null],
    ]));
    assert_eq!(grid.rows[0][1], Value::Text(String::new()));
    assert_eq!(grid.rows[1][1], Value::Text(String::new()));
    assert_eq!(grid.rows[0][2], Value::Null);
  }

  #[test]
  fn empty_text_dates_stay_blank() {
    let grid = format_result(&invoice_result(vec![
      vec!["A".into(), "".into(), Value::Null],
      vec!["B".into(), "  ".into(), Value::Null],
    ]));
    assert_eq!(grid.rows[0][1], Value::Text(String::new()));
    assert_eq!(grid.rows[1][1], Value::Text(String::new()));
  }

  #[test]
  fn accepts_native_and_timestamp_dates() {
    let date = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
    let grid = format_result(&invoice_result(vec![
      vec!["A".into(), Value::Date(date), Value::Null],
      vec!["B".into(), Value::DateTime(date.and_hms_opt(23, 59, 0).unwrap()), Value::Null],
      vec!["C".into(), "2023-12-31 08:15:00".into(), Value::Null],
      vec!["D".into(), "2023-12-31T08:15:00.250".into(), Value::Null],
      vec!["E".into(), " 2023-12-31 ".into(), Value::Null],
    ]));
    for row in &grid.rows {
      assert_eq!(row[1], Value::Text("31/12/2023".to_string()));
    }
  }

  #[test]
  fn empty_result_keeps_header_columns() {
    let grid = format_result(&invoice_result(Vec::new()));
    assert_eq!(grid.record_count(), 0);
    assert_eq!(grid.columns.len(), 3);
  }

  #[test]
  fn only_date_columns_are_rewritten() {
    let result = QueryResult::new(
      vec![
        Column::new("emitida", ColumnKind::Date),
        Column::new("fecha_texto", ColumnKind::Text),
      ],
      vec![vec!["2024-02-29".into(), "2024-02-29".into()]],
    )
    .unwrap();
    let grid = format_result(&result);
    assert_eq!(grid.rows[0][0], Value::from("29/02/2024"));
    assert_eq!(grid.rows[0][1], Value::from("2024-02-29"));
  }
}
