use std::fmt;

use chrono::NaiveDate;

use crate::domain::validation::DateRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKind {
  Invoices,
  Partners,
  CreditNotes,
  Combined,
}

impl ReportKind {
  /// File name prefix.
  pub fn label(self) -> &'static str {
    match self {
      ReportKind::Invoices => "facturas",
      ReportKind::Partners => "terceros",
      ReportKind::CreditNotes => "notas_credito",
      ReportKind::Combined => "reporte_completo",
    }
  }

  /// Title of the data sheet; the combined report carries one sheet per part.
  pub fn sheet_title(self) -> Option<&'static str> {
    match self {
      ReportKind::Invoices => Some("Facturas"),
      ReportKind::Partners => Some("Terceros"),
      ReportKind::CreditNotes => Some("Notas de Crédito"),
      ReportKind::Combined => None,
    }
  }

  pub fn report_type(self) -> &'static str {
    match self {
      ReportKind::Invoices => "Facturas Report",
      ReportKind::Partners => "Terceros Report",
      ReportKind::CreditNotes => "Credit Notes Report",
      ReportKind::Combined => "Combined Report",
    }
  }
}

impl fmt::Display for ReportKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportDescriptor {
  pub kind: ReportKind,
  pub start_date: NaiveDate,
  pub end_date: NaiveDate,
}

impl ReportDescriptor {
  pub fn new(kind: ReportKind, range: &DateRange) -> Self {
    Self {
      kind,
      start_date: range.start,
      end_date: range.end,
    }
  }

  pub fn file_name(&self) -> String {
    let start = self.start_date.format("%Y-%m-%d");
    if self.start_date == self.end_date {
      format!("{}_{}.xlsx", self.kind.label(), start)
    } else {
      format!("{}_{}_{}.xlsx", self.kind.label(), start, self.end_date.format("%Y-%m-%d"))
    }
  }
}
