pub mod db;
pub mod domain;
pub mod error;
pub mod export;
pub mod history;
pub mod models;
pub mod report;
pub mod settings;
pub mod source;

pub use domain::validation::DateRange;
pub use error::{AppError, ReportError};
pub use report::{QueryResult, ReportGenerator, ReportKind};
