//! Galaxy CLI - validate report requests and inspect the SQL they produce
//!
//! Usage:
//!   galaxy templates
//!   galaxy validate <family> <request.json>
//!   galaxy explain <family> <request.json> [--dialect <dialect>] [--tasking-manager]
//!
//! Examples:
//!   galaxy validate mapathon-detail request.json
//!   galaxy explain countries request.json --dialect duckdb

use clap::{Parser, Subcommand, ValueEnum};
use galaxy::compose::{ComposedQuery, Template};
use galaxy::config::Settings;
use galaxy::report::{self, Database, DatabaseError, ReportContext, ReportError, Row};
use galaxy::request::{self, ReportFamily};
use galaxy::sql::Dialect;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "galaxy")]
#[command(about = "Galaxy - OSM contribution reports over parameterized SQL")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List statement templates with the filter slots they accept
    Templates,

    /// Validate a request and print the applied filters
    Validate {
        /// Report family, e.g. mapathon-summary
        family: String,

        /// Path to the JSON request
        file: PathBuf,
    },

    /// Print every statement a request would run, without a database
    Explain {
        /// Report family, e.g. mapathon-summary
        family: String,

        /// Path to the JSON request
        file: PathBuf,

        /// SQL dialect to render (defaults to the configured one)
        #[arg(short, long)]
        dialect: Option<DialectArg>,

        /// Also explain tasking-manager statements
        #[arg(long)]
        tasking_manager: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum DialectArg {
    Postgres,
    Duckdb,
}

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Postgres => Dialect::Postgres,
            DialectArg::Duckdb => Dialect::DuckDb,
        }
    }
}

/// Records statements instead of running them.
#[derive(Default)]
struct Recorder {
    statements: Mutex<Vec<ComposedQuery>>,
}

impl Database for Recorder {
    fn fetch(&self, query: &ComposedQuery) -> Result<Vec<Row>, DatabaseError> {
        self.statements
            .lock()
            .map_err(|_| DatabaseError::new("recorder poisoned"))?
            .push(query.clone());
        Ok(Vec::new())
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match Settings::load() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    init_logging(&settings.logging.filter);

    match cli.command {
        Commands::Templates => cmd_templates(),
        Commands::Validate { family, file } => cmd_validate(&settings, &family, file),
        Commands::Explain {
            family,
            file,
            dialect,
            tasking_manager,
        } => cmd_explain(&settings, &family, file, dialect, tasking_manager),
    }
}

/// `RUST_LOG` wins over the configured filter.
fn init_logging(configured: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(configured))
        .unwrap_or_else(|_| EnvFilter::new("galaxy=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_request(family: &str, file: &PathBuf) -> Result<(ReportFamily, Value), String> {
    let family: ReportFamily = family.parse()?;
    let source = fs::read_to_string(file)
        .map_err(|e| format!("Error reading file '{}': {}", file.display(), e))?;
    let input = serde_json::from_str(&source)
        .map_err(|e| format!("Error parsing '{}': {}", file.display(), e))?;
    Ok((family, input))
}

fn cmd_templates() -> ExitCode {
    for template in Template::ALL {
        let spec = template.spec();
        let slots: Vec<_> = spec
            .accepted
            .iter()
            .map(|slot| {
                if spec.required.contains(slot) {
                    format!("{}*", slot.as_str())
                } else {
                    slot.as_str().to_string()
                }
            })
            .collect();
        println!(
            "{:<30} {:<16} {}",
            template.id(),
            format!("{:?}", spec.backend),
            slots.join(", ")
        );
    }
    ExitCode::SUCCESS
}

fn cmd_validate(settings: &Settings, family: &str, file: PathBuf) -> ExitCode {
    let (family, input) = match read_request(family, &file) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match request::validate(family, &input, &settings.limits) {
        Ok(applied) => {
            println!("{}", Value::Object(applied));
            ExitCode::SUCCESS
        }
        Err(errors) => {
            eprintln!("Validation errors:");
            for error in errors.iter() {
                eprintln!("  {}", error);
            }
            ExitCode::FAILURE
        }
    }
}

fn cmd_explain(
    settings: &Settings,
    family: &str,
    file: PathBuf,
    dialect: Option<DialectArg>,
    tasking_manager: bool,
) -> ExitCode {
    let (family, input) = match read_request(family, &file) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let dialect = match dialect {
        Some(d) => d.into(),
        None => match settings.query.dialect_type() {
            Ok(d) => d,
            Err(e) => {
                eprintln!("Configuration error: {}", e);
                return ExitCode::FAILURE;
            }
        },
    };

    let underpass = Recorder::default();
    let tm = Recorder::default();
    let mut ctx = ReportContext::new(&underpass)
        .with_limits(settings.limits.clone())
        .with_dialect(dialect);
    if tasking_manager {
        ctx = ctx.with_tasking_manager(&tm);
    }

    // With no rows to read, single-value reports end in a shape error once
    // every statement has been recorded.
    match report::run(family, &ctx, &input) {
        Ok(_) | Err(ReportError::Shape(_)) => {}
        Err(ReportError::Validation(errors)) => {
            eprintln!("Validation errors:");
            for error in errors.iter() {
                eprintln!("  {}", error);
            }
            return ExitCode::FAILURE;
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    }

    for recorder in [&underpass, &tm] {
        let Ok(statements) = recorder.statements.lock() else {
            continue;
        };
        for query in statements.iter() {
            println!("-- {} [{}]", query.template(), query.fingerprint());
            for (i, value) in query.parameters().iter().enumerate() {
                println!("-- ${} {} = {}", i + 1, value.type_name(), value);
            }
            println!("{};", query.statement());
            println!();
        }
    }
    ExitCode::SUCCESS
}
