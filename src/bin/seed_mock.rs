use std::path::PathBuf;

use chrono::{Duration, Local, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rusqlite::{params, Connection};

use extractor_facturacion::db;
use extractor_facturacion::error::AppError;
use extractor_facturacion::settings;

const SEED: u64 = 17;

const ID_TYPES: &[&str] = &["NIT", "Cédula de ciudadanía", "Cédula de extranjería", "Pasaporte"];
const ACCOUNTS: &[(&str, &str)] = &[
  ("130505", "Clientes nacionales"),
  ("220505", "Proveedores nacionales"),
  ("240801", "IVA generado"),
  ("413501", "Ventas de mercancías"),
  ("417501", "Devoluciones en ventas"),
  ("613505", "Costo de ventas"),
];
const COST_CENTERS: &[(&str, &str)] = &[("CC01", "Administración"), ("CC02", "Ventas"), ("CC03", "Logística")];
const COMPANIES: &[&str] = &["Distribuidora Andina", "Comercial El Puerto", "Servicios Integrales", "Agroinsumos del Valle"];
const FIRST_NAMES: &[&str] = &["Ana", "Carlos", "Luisa", "Jorge", "María", "Andrés"];
const SURNAMES: &[&str] = &["Gómez", "Rodríguez", "Martínez", "López", "Ramírez", "Torres"];
const CITIES: &[&str] = &["Bogotá", "Medellín", "Cali", "Barranquilla", "Bucaramanga"];
const MOVE_TYPES: &[(&str, &str)] = &[
  ("out_invoice", "FV"),
  ("out_invoice", "FV"),
  ("out_invoice", "FV"),
  ("in_invoice", "FC"),
  ("out_refund", "NC"),
  ("in_refund", "ND"),
];
const STATES: &[&str] = &["posted", "posted", "posted", "posted", "draft", "cancel"];

/// Builds a demo accounting database: `seed_mock [COUNT] [PATH]`.
fn main() -> Result<(), Box<dyn std::error::Error>> {
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

  let count = std::env::args()
    .nth(1)
    .and_then(|value| value.parse::<usize>().ok())
    .unwrap_or(500);

  let path = match std::env::args().nth(2) {
    Some(path) => PathBuf::from(path),
    None => db::resolve_app_dir()?.join("demo_odoo.sqlite"),
  };
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent)?;
  }

  let mut conn = Connection::open(&path)?;
  let created = seed_mock_data(&mut conn, count)?;
  println!("Seeded {} moves in {}", created, path.display());

  // Point the app store at the fresh database when it lives in the default home.
  if std::env::args().nth(2).is_none() {
    let app_dir = db::resolve_app_dir()?;
    let store = db::init_db(&app_dir)?;
    db::with_conn(&store, |conn| {
      let mut current = settings::get_settings(conn)?;
      current.source_path = path.to_string_lossy().to_string();
      settings::update_settings(conn, &current)
    })?;
    println!("Configured {} as source", path.display());
  }
  Ok(())
}

fn seed_mock_data(conn: &mut Connection, count: usize) -> Result<usize, AppError> {
  conn.execute_batch(include_str!("../../migrations/source_schema.sql"))?;

  let mut rng = StdRng::seed_from_u64(SEED);
  let today = Local::now().date_naive();
  let tx = conn.transaction()?;

  for (idx, name) in ID_TYPES.iter().enumerate() {
    tx.execute(
      "INSERT OR REPLACE INTO l10n_latam_identification_type (id, name) VALUES (?1, ?2)",
      params![idx as i64 + 1, name],
    )?;
  }
  for (idx, (code, name)) in ACCOUNTS.iter().enumerate() {
    tx.execute(
      "INSERT OR REPLACE INTO account_account (id, code, name) VALUES (?1, ?2, ?3)",
      params![idx as i64 + 1, code, name],
    )?;
  }
  for (idx, (code, name)) in COST_CENTERS.iter().enumerate() {
    tx.execute(
      "INSERT OR REPLACE INTO account_analytic_account (id, code, name) VALUES (?1, ?2, ?3)",
      params![idx as i64 + 1, code, name],
    )?;
  }

  let partners = seed_partners(&tx, &mut rng)?;
  if partners == 0 {
    return Err(AppError::new("SEED", "No partners created"));
  }

  let next_move: i64 = tx.query_row("SELECT COALESCE(MAX(id), 0) + 1 FROM account_move", [], |row| row.get(0))?;
  {
    let mut move_stmt = tx.prepare(
      "INSERT INTO account_move (id, name, move_type, state, date, invoice_date, partner_id, user_analytic_account_id)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    )?;
    let mut line_stmt =
      tx.prepare("INSERT INTO account_move_line (move_id, account_id, debit, credit) VALUES (?1, ?2, ?3, ?4)")?;

    for offset in 0..count as i64 {
      let id = next_move + offset;
      let (move_type, prefix) = MOVE_TYPES[rng.gen_range(0..MOVE_TYPES.len())];
      let state = STATES[rng.gen_range(0..STATES.len())];
      let date = random_date(&mut rng, today);
      let invoice_date = if rng.gen_bool(0.9) {
        Some(date.format("%Y-%m-%d").to_string())
      } else {
        None
      };
      let partner = rng.gen_range(1..=partners);
      let analytic = if rng.gen_bool(0.8) {
        Some(rng.gen_range(1..=COST_CENTERS.len() as i64))
      } else {
        None
      };

      move_stmt.execute(params![
        id,
        format!("{prefix}-{id:06}"),
        move_type,
        state,
        date.format("%Y-%m-%d").to_string(),
        invoice_date,
        partner,
        analytic
      ])?;

      let amount = random_amount(&mut rng, 50_000.0, 5_000_000.0);
      let (receivable, income) = match move_type {
        "in_invoice" | "in_refund" => (2, 6),
        "out_refund" => (1, 5),
        _ => (1, 4),
      };
      let refund = move_type.ends_with("refund");
      let (first, second) = if refund { (income, receivable) } else { (receivable, income) };
      line_stmt.execute(params![id, first, amount, 0.0])?;
      line_stmt.execute(params![id, second, 0.0, amount])?;
    }
  }

  tx.commit()?;
  log::info!("seeded {} partners and {} moves", partners, count);
  Ok(count)
}

fn seed_partners(conn: &Connection, rng: &mut StdRng) -> Result<i64, AppError> {
  let existing: i64 = conn.query_row("SELECT COUNT(*) FROM res_partner", [], |row| row.get(0))?;
  if existing > 0 {
    return Ok(existing);
  }

  let mut stmt = conn.prepare(
    "INSERT INTO res_partner (id, name, first_name, other_names, surname, second_surname, is_company, vat,
       l10n_latam_identification_type_id, email_normalized, phone, street, street2, city, active)
     VALUES (?1, ?2, ?3, NULL, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, NULL, ?12, ?13)",
  )?;

  let total = 40_i64;
  for id in 1..=total {
    let is_company = rng.gen_bool(0.4);
    let city = CITIES[rng.gen_range(0..CITIES.len())];
    let (name, first, surname, second, id_type, vat) = if is_company {
      let base = COMPANIES[rng.gen_range(0..COMPANIES.len())];
      let vat = format!("{}-{}", rng.gen_range(800_000_000..999_999_999), rng.gen_range(0..10));
      (format!("{base} S.A.S. {id}"), None, None, None, 1, Some(vat))
    } else {
      let first = FIRST_NAMES[rng.gen_range(0..FIRST_NAMES.len())];
      let surname = SURNAMES[rng.gen_range(0..SURNAMES.len())];
      let second = SURNAMES[rng.gen_range(0..SURNAMES.len())];
      let vat = if rng.gen_bool(0.85) {
        Some(rng.gen_range(10_000_000..1_999_999_999_i64).to_string())
      } else {
        None
      };
      (
        format!("{surname} {first}"),
        Some(first),
        Some(surname),
        Some(second),
        rng.gen_range(2..=ID_TYPES.len() as i64),
        vat,
      )
    };
    let email = rng
      .gen_bool(0.7)
      .then(|| format!("contacto{id}@ejemplo.co"));
    let phone = rng
      .gen_bool(0.6)
      .then(|| format!("3{:09}", rng.gen_range(0..1_000_000_000_u32)));
    let street = format!("Calle {} # {}-{}", rng.gen_range(1..200), rng.gen_range(1..100), rng.gen_range(1..99));
    let active = rng.gen_bool(0.95);

    stmt.execute(params![
      id, name, first, surname, second, is_company, vat, id_type, email, phone, street, city, active
    ])?;
  }
  Ok(total)
}

fn random_date(rng: &mut StdRng, today: NaiveDate) -> NaiveDate {
  today - Duration::days(rng.gen_range(0..365))
}

fn random_amount(rng: &mut StdRng, min: f64, max: f64) -> f64 {
  (rng.gen_range(min..max) * 100.0).round() / 100.0
}
