//! Command line entry point: catalog checks and one-off lookups.

use std::io::Write as _;
use std::path::{
    Path,
    PathBuf,
};
use std::process::ExitCode;

use clap::{
    Parser,
    Subcommand,
    ValueEnum,
};
use serde::Serialize;
use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use ts_catalog::config::{
    ConfigError,
    ConfigManager,
    Severity,
};
use ts_catalog::diagnostics::{
    Diagnostic,
    collect_diagnostics,
};
use ts_catalog::loader::{
    LoadError,
    LoaderError,
    load_catalog_file,
    load_workspace,
};
use ts_catalog::resolver::{
    MessageRequest,
    ResolveError,
    Resolver,
};
use ts_catalog::store;

/// Command line arguments.
#[derive(Parser, Debug)]
#[command(name = "ts-catalog", version, about = "Load, check and query Qt Linguist TS catalogs")]
struct Cli {
    /// Write logs to a daily rotated file in this directory instead of stderr
    #[arg(long, value_name = "DIR", global = true)]
    log_dir: Option<PathBuf>,

    /// Settings file (default: `.ts-catalog.json` in the workspace)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Load every catalog of a workspace and report problems
    ///
    /// Catalogs are the `.ts` files under `languages/` or `translations/`
    /// directories unless `catalogFiles.includePatterns` says otherwise.
    Check {
        /// Workspace root
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Report format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Lowest severity that makes the command fail
        #[arg(long, value_enum, default_value = "error")]
        fail_on: FailOn,
    },

    /// Resolve one message against a catalog
    Resolve {
        /// Catalog file
        #[arg(long, value_name = "FILE")]
        catalog: PathBuf,

        /// Context name
        #[arg(long)]
        context: String,

        /// Source text
        #[arg(long)]
        source: String,

        /// Disambiguating comment
        #[arg(long)]
        disambiguation: Option<String>,

        /// Count for plural messages (`%n`)
        #[arg(long)]
        count: Option<u64>,

        /// Values for `%1`, `%2`, ...
        args: Vec<String>,
    },
}

/// Output of `check`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// One line per diagnostic
    Text,
    /// A JSON document
    Json,
}

/// `--fail-on` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FailOn {
    /// Fail on errors only
    Error,
    /// Fail on warnings and errors
    Warning,
}

impl FailOn {
    /// Lowest severity that fails the run.
    const fn threshold(self) -> Severity {
        match self {
            Self::Error => Severity::Error,
            Self::Warning => Severity::Warning,
        }
    }
}

/// Errors that end the command with exit status 2.
#[derive(Error, Debug)]
enum CliError {
    /// Invalid or unreadable settings
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Workspace could not be searched
    #[error(transparent)]
    Loader(#[from] LoaderError),

    /// `resolve` catalog could not be loaded
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Bad `resolve` arguments
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Writing to stdout failed
    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),

    /// JSON report could not be produced
    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

/// Diagnostics of one catalog file in the JSON report.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CatalogReport<'a> {
    /// Catalog file
    path: &'a Path,
    /// Language of the catalog
    language: &'a str,
    /// Findings, in check order
    diagnostics: Vec<Diagnostic>,
}

/// A file that could not be loaded, in the JSON report.
#[derive(Debug, Serialize)]
struct FailureReport<'a> {
    /// File that failed
    path: &'a Path,
    /// Why it failed
    error: String,
}

/// JSON report of `check`.
#[derive(Debug, Serialize)]
struct CheckReport<'a> {
    /// Loaded catalogs
    catalogs: Vec<CatalogReport<'a>>,
    /// Files that could not be loaded
    failures: Vec<FailureReport<'a>>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let _guard = init_tracing(cli.log_dir.as_deref());

    match run(cli).await {
        Ok(code) => code,
        Err(error) => {
            tracing::error!(%error, "ts-catalog failed");
            let _ = writeln!(std::io::stderr().lock(), "error: {error}");
            ExitCode::from(2)
        }
    }
}

/// Logs go to stderr, or to `<log_dir>/ts-catalog.log.<date>` when a directory is given.
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if let Some(dir) = log_dir {
        let (writer, guard) =
            tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, "ts-catalog.log"));
        tracing_subscriber::fmt().with_env_filter(filter).with_writer(writer).with_ansi(false).init();
        Some(guard)
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
        None
    }
}

/// Loads settings and dispatches the subcommand.
async fn run(cli: Cli) -> Result<ExitCode, CliError> {
    let mut config_manager = ConfigManager::new();

    match cli.command {
        Command::Check { dir, format, fail_on } => {
            match &cli.config {
                Some(path) => config_manager.load_file(path)?,
                None => config_manager.load_settings(Some(dir.clone()))?,
            }
            check(&config_manager, &dir, format, fail_on).await
        }
        Command::Resolve { catalog, context, source, disambiguation, count, args } => {
            match &cli.config {
                Some(path) => config_manager.load_file(path)?,
                None => config_manager.load_settings(std::env::current_dir().ok())?,
            }

            let source_language = &config_manager.get_settings().source_language;
            store::active().replace(load_catalog_file(&catalog, source_language).await?);

            let args: Vec<&str> = args.iter().map(String::as_str).collect();
            let mut request = MessageRequest::new(&context, &source).args(&args);
            if let Some(disambiguation) = disambiguation.as_deref() {
                request = request.disambiguator(disambiguation);
            }
            if let Some(count) = count {
                request = request.count(count);
            }

            let resolver = Resolver::new(config_manager.resolver_settings());
            let text = resolver.resolve(&store::active().current(), &request)?;
            writeln!(std::io::stdout().lock(), "{text}")?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// `check` subcommand.
async fn check(
    config_manager: &ConfigManager,
    dir: &Path,
    format: OutputFormat,
    fail_on: FailOn,
) -> Result<ExitCode, CliError> {
    let settings = config_manager.get_settings();
    let set = load_workspace(dir, settings).await?;

    let catalogs: Vec<CatalogReport<'_>> = set
        .iter()
        .map(|file| CatalogReport {
            path: &file.path,
            language: file.catalog.language(),
            diagnostics: collect_diagnostics(&file.catalog, &settings.diagnostics),
        })
        .collect();

    let threshold = fail_on.threshold();
    let failed = !set.failures().is_empty()
        || catalogs.iter().flat_map(|c| &c.diagnostics).any(|d| d.severity >= threshold);

    let mut out = std::io::stdout().lock();
    match format {
        OutputFormat::Text => {
            for catalog in &catalogs {
                for diagnostic in &catalog.diagnostics {
                    writeln!(out, "{}: {diagnostic}", catalog.path.display())?;
                }
            }
            for failure in set.failures() {
                writeln!(out, "error: {failure}")?;
            }
            let count: usize = catalogs.iter().map(|c| c.diagnostics.len()).sum();
            writeln!(
                out,
                "{} catalog(s), {count} diagnostic(s), {} failed to load",
                catalogs.len(),
                set.failures().len()
            )?;
        }
        OutputFormat::Json => {
            let report = CheckReport {
                failures: set
                    .failures()
                    .iter()
                    .map(|failure| FailureReport { path: failure.path(), error: failure.to_string() })
                    .collect(),
                catalogs,
            };
            serde_json::to_writer_pretty(&mut out, &report)?;
            writeln!(out)?;
        }
    }

    Ok(if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}
