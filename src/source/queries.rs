//! Extraction queries against the accounting database, each with the column
//! schema its result is rendered with.

use crate::report::descriptor::ReportKind;
use crate::report::query::ColumnKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractQuery {
  Invoices,
  CreditNotes,
  Partners,
}

pub const REQUIRED_TABLES: &[&str] = &[
  "account_account",
  "account_analytic_account",
  "account_move",
  "account_move_line",
  "l10n_latam_identification_type",
  "res_partner",
];

pub const COUNTABLE_TABLES: &[&str] = &["account_move", "res_partner", "account_move_line", "account_account"];

const MOVE_COLUMNS: &[(&str, ColumnKind)] = &[
  ("numero_factura", ColumnKind::Text),
  ("numero_identificacion", ColumnKind::Text),
  ("fecha_factura", ColumnKind::Date),
  ("codigo_centro_costo", ColumnKind::Text),
  ("codigo_cuenta", ColumnKind::Text),
  ("valor", ColumnKind::Currency),
  ("naturaleza_cuenta", ColumnKind::Centered),
  ("n_internacional", ColumnKind::Text),
];

const PARTNER_COLUMNS: &[(&str, ColumnKind)] = &[
  ("tercero_id", ColumnKind::Text),
  ("nombre", ColumnKind::Text),
  ("nombre_completo", ColumnKind::Text),
  ("tipo_identificacion", ColumnKind::Text),
  ("identidad", ColumnKind::Text),
  ("tipo_empresa", ColumnKind::Centered),
  ("mail", ColumnKind::Text),
  ("movil", ColumnKind::Text),
  ("direccion", ColumnKind::Text),
];

const INVOICES_SQL: &str = "
SELECT DISTINCT
  am.name AS numero_factura,
  rp.vat AS numero_identificacion,
  COALESCE(am.invoice_date, am.date) AS fecha_factura,
  aaa.code AS codigo_centro_costo,
  aa.code AS codigo_cuenta,
  COALESCE(NULLIF(aml.debit, 0), NULLIF(aml.credit, 0), 0) AS valor,
  CASE
    WHEN aml.credit > 0 THEN 'C'
    WHEN aml.debit > 0 THEN 'D'
    ELSE 'N'
  END AS naturaleza_cuenta,
  'F' AS n_internacional
FROM account_move am
  LEFT JOIN res_partner rp ON am.partner_id = rp.id
  LEFT JOIN account_move_line aml ON am.id = aml.move_id
  LEFT JOIN account_account aa ON aml.account_id = aa.id
  LEFT JOIN account_analytic_account aaa ON am.user_analytic_account_id = aaa.id
WHERE am.move_type IN ({move_types})
  AND COALESCE(am.invoice_date, am.date) BETWEEN ?1 AND ?2
  AND am.state = 'posted'
ORDER BY fecha_factura DESC, numero_factura ASC, codigo_cuenta ASC";

const PARTNERS_SQL: &str = "
SELECT DISTINCT
  rp.id AS tercero_id,
  rp.name AS nombre,
  CASE
    WHEN rp.is_company = 0 AND rp.first_name IS NOT NULL THEN
      TRIM(CONCAT_WS(' ', rp.first_name, rp.other_names, rp.surname, rp.second_surname))
    ELSE rp.name
  END AS nombre_completo,
  COALESCE(lit.name, 'Sin tipo') AS tipo_identificacion,
  COALESCE(rp.vat, 'Sin identificación') AS identidad,
  CASE
    WHEN rp.is_company = 1 THEN 'Empresa'
    WHEN rp.is_company = 0 THEN 'Persona'
    ELSE 'No definido'
  END AS tipo_empresa,
  COALESCE(rp.email_normalized, '') AS mail,
  COALESCE(rp.phone, '') AS movil,
  CONCAT_WS(', ',
    NULLIF(TRIM(rp.street), ''),
    NULLIF(TRIM(rp.street2), ''),
    NULLIF(TRIM(rp.city), '')
  ) AS direccion
FROM res_partner rp
  LEFT JOIN l10n_latam_identification_type lit ON rp.l10n_latam_identification_type_id = lit.id
  INNER JOIN account_move am ON rp.id = am.partner_id
WHERE am.move_type IN ('out_invoice', 'in_invoice', 'out_refund', 'in_refund')
  AND am.state = 'posted'
  AND COALESCE(am.invoice_date, am.date) BETWEEN ?1 AND ?2
  AND rp.active = 1
ORDER BY rp.name ASC";

impl ExtractQuery {
  /// Query behind a single-sheet report. The combined report reads two.
  pub fn for_report(kind: ReportKind) -> Option<Self> {
    match kind {
      ReportKind::Invoices => Some(ExtractQuery::Invoices),
      ReportKind::CreditNotes => Some(ExtractQuery::CreditNotes),
      ReportKind::Partners => Some(ExtractQuery::Partners),
      ReportKind::Combined => None,
    }
  }

  pub fn sql(self) -> String {
    match self {
      ExtractQuery::Invoices => INVOICES_SQL.replace(
        "{move_types}",
        "'out_invoice', 'in_invoice', 'out_refund', 'in_refund'",
      ),
      ExtractQuery::CreditNotes => INVOICES_SQL.replace("{move_types}", "'out_refund', 'in_refund'"),
      ExtractQuery::Partners => PARTNERS_SQL.to_string(),
    }
  }

  pub fn schema(self) -> &'static [(&'static str, ColumnKind)] {
    match self {
      ExtractQuery::Invoices | ExtractQuery::CreditNotes => MOVE_COLUMNS,
      ExtractQuery::Partners => PARTNER_COLUMNS,
    }
  }

  /// Declared kind of a result column; undeclared columns fall back to the
  /// naming convention.
  pub fn column_kind(self, name: &str) -> ColumnKind {
    self
      .schema()
      .iter()
      .find(|(column, _)| *column == name)
      .map(|(_, kind)| *kind)
      .unwrap_or_else(|| ColumnKind::infer(name))
  }
}
