use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};

use extractor_facturacion::db::{self, Db};
use extractor_facturacion::domain::validation::{self, DateRange};
use extractor_facturacion::error::AppError;
use extractor_facturacion::history;
use extractor_facturacion::report::{ReportGenerator, ReportKind};
use extractor_facturacion::settings;
use extractor_facturacion::source::{DataSource, ExtractQuery, SqliteSource};

#[derive(Parser)]
#[command(name = "extractor")]
#[command(version, about = "Extract invoices and partners from an accounting database into Excel reports")]
struct Cli {
  /// Application data directory (default: EXTRACTOR_HOME, portable ./data or the user data dir)
  #[arg(long, global = true)]
  home: Option<PathBuf>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Show or change the stored configuration
  Config {
    #[command(subcommand)]
    action: ConfigAction,
  },

  /// Test the source database and look for the required tables
  Check,

  /// Generate Excel reports for a date or date range
  Generate {
    /// First day, YYYY-MM-DD
    #[arg(short, long)]
    start: String,

    /// Last day, YYYY-MM-DD (defaults to the start date)
    #[arg(short, long)]
    end: Option<String>,

    #[arg(short, long, value_enum, default_value_t = KindArg::All)]
    kind: KindArg,

    /// Output directory (defaults to the configured one)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Open each generated file when done
    #[arg(long)]
    open: bool,
  },

  /// List recent extractions
  History {
    #[arg(short, long, default_value_t = history::DEFAULT_HISTORY_LIMIT)]
    limit: i64,

    #[arg(long)]
    json: bool,
  },
}

#[derive(Subcommand)]
enum ConfigAction {
  Show,
  Set {
    /// Accounting database file
    #[arg(long)]
    source: Option<PathBuf>,

    /// Directory reports are written to
    #[arg(long)]
    output: Option<PathBuf>,
  },
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
  Invoices,
  Partners,
  CreditNotes,
  Combined,
  /// Invoices and partners as two separate files
  All,
}

fn main() {
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
  let cli = Cli::parse();

  if let Err(err) = run(cli) {
    eprintln!("Error: {err}");
    std::process::exit(1);
  }
}

fn run(cli: Cli) -> Result<(), AppError> {
  let app_dir = match cli.home {
    Some(home) => home,
    None => db::resolve_app_dir()?,
  };
  let db = db::init_db(&app_dir)?;

  match cli.command {
    Commands::Config { action } => config(&db, action),
    Commands::Check => check(&db),
    Commands::Generate {
      start,
      end,
      kind,
      output,
      open,
    } => {
      let range = validation::validate_date_range(&start, end.as_deref(), Local::now().date_naive())?;
      generate(&db, &range, kind, output, open)
    }
    Commands::History { limit, json } => show_history(&db, limit, json),
  }
}

fn config(db: &Db, action: ConfigAction) -> Result<(), AppError> {
  match action {
    ConfigAction::Show => {
      let settings = db::with_conn(db, |conn| settings::get_settings(conn))?;
      println!("{}", serde_json::to_string_pretty(&settings)?);
    }
    ConfigAction::Set { source, output } => {
      let updated = db::with_conn(db, |conn| {
        let mut current = settings::get_settings(conn)?;
        if let Some(source) = source {
          if !source.is_file() {
            log::warn!("source database {} does not exist yet", source.display());
          }
          current.source_path = source.to_string_lossy().to_string();
        }
        if let Some(output) = output {
          current.output_directory = output.to_string_lossy().to_string();
        }
        settings::update_settings(conn, &current)?;
        Ok(current)
      })?;
      println!("{}", serde_json::to_string_pretty(&updated)?);
    }
  }
  Ok(())
}

fn open_source(db: &Db) -> Result<SqliteSource, AppError> {
  let configured = db::with_conn(db, |conn| {
    if !settings::config_exists(conn)? {
      return Err(AppError::new(
        "CONFIG",
        "No source database configured. Run `extractor config set --source <PATH>`",
      ));
    }
    settings::get_settings(conn)
  })?;
  SqliteSource::open(Path::new(&configured.source_path))
}

fn check(db: &Db) -> Result<(), AppError> {
  let source = open_source(db)?;
  let report = source.check_connection()?;
  println!(
    "Connection successful. SQLite {} ({} ms) - {}",
    report.sqlite_version, report.response_ms, report.database
  );
  if report.is_ready() {
    println!("All required tables present");
    Ok(())
  } else {
    Err(AppError::new(
      "SOURCE_SCHEMA",
      format!("Missing tables: {}", report.missing_tables.join(", ")),
    ))
  }
}

fn generate(db: &Db, range: &DateRange, kind: KindArg, output: Option<PathBuf>, open: bool) -> Result<(), AppError> {
  let source = open_source(db)?;
  let output = match output {
    Some(output) => output,
    None => PathBuf::from(db::with_conn(db, |conn| settings::get_settings(conn))?.output_directory),
  };
  let generator = ReportGenerator::new(output)?;
  log::info!("generating reports for {} to {}", range.start, range.end);

  let started = Instant::now();
  let mut records = 0;
  let mut paths = Vec::new();

  match kind {
    KindArg::Invoices => paths.push(single(&source, &generator, ReportKind::Invoices, range, &mut records)?),
    KindArg::Partners => paths.push(single(&source, &generator, ReportKind::Partners, range, &mut records)?),
    KindArg::CreditNotes => paths.push(single(&source, &generator, ReportKind::CreditNotes, range, &mut records)?),
    KindArg::All => {
      paths.push(single(&source, &generator, ReportKind::Invoices, range, &mut records)?);
      paths.push(single(&source, &generator, ReportKind::Partners, range, &mut records)?);
    }
    KindArg::Combined => {
      let invoices = source.fetch(ExtractQuery::Invoices, range)?;
      let partners = source.fetch(ExtractQuery::Partners, range)?;
      records += invoices.len() + partners.len();
      paths.push(generator.generate_combined(range, &invoices, &partners)?);
    }
  }

  let elapsed = started.elapsed().as_secs_f64();
  db::with_conn(db, |conn| history::save_query_history(conn, range, records, elapsed))?;

  println!("{records} records in {elapsed:.2}s");
  for path in &paths {
    println!("{}", path.display());
    if open {
      open::that(path).map_err(|err| AppError::new("OPEN", err.to_string()))?;
    }
  }
  Ok(())
}

fn single(
  source: &impl DataSource,
  generator: &ReportGenerator,
  kind: ReportKind,
  range: &DateRange,
  records: &mut usize,
) -> Result<PathBuf, AppError> {
  let query = ExtractQuery::for_report(kind)
    .ok_or_else(|| AppError::new("FORMAT", format!("{kind} reports read more than one query")))?;
  let result = source.fetch(query, range)?;
  *records += result.len();
  Ok(generator.generate(kind, range, &result)?)
}

fn show_history(db: &Db, limit: i64, json: bool) -> Result<(), AppError> {
  let entries = db::with_conn(db, |conn| history::get_query_history(conn, limit))?;
  if json {
    println!("{}", serde_json::to_string_pretty(&entries)?);
    return Ok(());
  }
  if entries.is_empty() {
    println!("No extractions recorded yet");
    return Ok(());
  }
  for entry in entries {
    println!(
      "{}  {} .. {}  {:>6} records  {:.2}s",
      entry.created_at, entry.date_start, entry.date_end, entry.records_found, entry.execution_time
    );
  }
  Ok(())
}
