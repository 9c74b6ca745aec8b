// polrec - policy renewal reconciliation (headless)

mod exit_codes;
mod prepare;
mod recon;
mod sources;

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use polrecon_recon::ReconError;

use exit_codes::{recon_exit_code, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "polrec")]
#[command(about = "Reconcile insurer renewal ledgers against SICS and the SharePoint tracker")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Only log warnings and errors
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Log debug detail (RUST_LOG still wins when set)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Prepare the sources in memory, reconcile, and write the report(s)
    #[command(after_help = "\
Examples:
  polrec run
  polrec run rimac --today 2026-10-19
  polrec run pacifico --format csv --output-dir ./out
  polrec run all --json --strict > reports.json")]
    Run {
        /// Which insurer ledger to reconcile
        #[arg(value_enum, default_value = "all")]
        flavor: FlavorArg,

        /// Directory-layout settings file
        #[arg(long, env = "POLREC_SETTINGS")]
        settings: Option<PathBuf>,

        /// Lookup tables file (owners, comments); built-in tables otherwise
        #[arg(long)]
        lookups: Option<PathBuf>,

        /// Run date (YYYY-MM-DD); defaults to the local date
        #[arg(long, value_parser = parse_today)]
        today: Option<NaiveDate>,

        /// Report file format
        #[arg(long, value_enum, default_value = "xlsx")]
        format: OutputFormat,

        /// Write reports here instead of the configured output folders
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Print the report(s) as JSON to stdout
        #[arg(long)]
        json: bool,

        /// Exit 62 when any report carries warnings
        #[arg(long)]
        strict: bool,
    },

    /// Run one preparation stage and write the prepared table
    #[command(after_help = "\
Examples:
  polrec prepare sics
  polrec prepare pacifico --output-dir ./prepared")]
    Prepare {
        #[arg(value_enum)]
        source: PrepareSource,

        /// Directory-layout settings file
        #[arg(long, env = "POLREC_SETTINGS")]
        settings: Option<PathBuf>,

        /// Write here instead of the configured output folder
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Parse and validate lookup tables without running
    #[command(after_help = "\
Examples:
  polrec validate
  polrec validate --lookups lookups.toml")]
    Validate {
        /// Lookup tables file; built-in tables otherwise
        #[arg(long)]
        lookups: Option<PathBuf>,

        /// Directory-layout settings file (for its `lookups` entry)
        #[arg(long, env = "POLREC_SETTINGS")]
        settings: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FlavorArg {
    Rimac,
    Pacifico,
    All,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Xlsx,
    Csv,
}

impl OutputFormat {
    fn extension(self) -> &'static str {
        match self {
            OutputFormat::Xlsx => "xlsx",
            OutputFormat::Csv => "csv",
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PrepareSource {
    Sics,
    Sharepoint,
    Rimac,
    Pacifico,
    Cancellations,
}

fn parse_today(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD, got '{s}': {e}"))
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        "\nengine:  polrecon-recon ", env!("CARGO_PKG_VERSION"),
        "\nflavors: rimac, pacifico",
    )
}

fn init_logging(quiet: bool, verbose: bool) {
    let level = if quiet {
        log::LevelFilter::Warn
    } else if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    let result = match cli.command {
        Commands::Run {
            flavor,
            settings,
            lookups,
            today,
            format,
            output_dir,
            json,
            strict,
        } => recon::cmd_run(recon::RunArgs {
            flavor,
            settings,
            lookups,
            today,
            format,
            output_dir,
            json,
            strict,
        }),
        Commands::Prepare { source, settings, output_dir } => {
            prepare::cmd_prepare(source, settings, output_dir)
        }
        Commands::Validate { lookups, settings } => recon::cmd_validate(lookups, settings),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    /// Create error from an engine error with the registered exit code.
    pub fn recon(err: ReconError) -> Self {
        let code = recon_exit_code(&err);
        let hint = match &err {
            ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => {
                Some("check the lookup tables with `polrec validate --lookups <file>`".to_string())
            }
            ReconError::MissingDriverKey { column, .. } => {
                Some(format!("the ledger export must have a '{column}' column"))
            }
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
