//! `polrec run` and `polrec validate`.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use polrecon_config::Settings;
use polrecon_io::write::{write_csv, write_xlsx};
use polrecon_recon::prepare::{self, Prepared};
use polrecon_recon::{Flavor, LookupConfig, ReconError, ReconInput, ReconReport, Table};

use crate::exit_codes::{EXIT_ERROR, EXIT_RUNTIME, EXIT_WARNINGS};
use crate::{sources, CliError, FlavorArg, OutputFormat};

pub struct RunArgs {
    pub flavor: FlavorArg,
    pub settings: Option<PathBuf>,
    pub lookups: Option<PathBuf>,
    pub today: Option<NaiveDate>,
    pub format: OutputFormat,
    pub output_dir: Option<PathBuf>,
    pub json: bool,
    pub strict: bool,
}

fn recon_err(code: u8, msg: impl Into<String>) -> CliError {
    CliError { code, message: msg.into(), hint: None }
}

pub fn load_settings(path: Option<&Path>) -> Result<Settings, CliError> {
    Settings::load(path).map_err(|e| {
        recon_err(EXIT_RUNTIME, e).with_hint(format!(
            "default settings file: {}",
            Settings::config_path_display()
        ))
    })
}

/// `--lookups` wins over the settings entry; the built-in tables are last.
/// Returns a label for the source alongside the tables.
fn load_lookups(
    explicit: Option<&Path>,
    settings: &Settings,
) -> Result<(String, LookupConfig), CliError> {
    match explicit.or(settings.lookups.as_deref()) {
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|e| {
                recon_err(EXIT_RUNTIME, format!("cannot read lookups {}: {e}", path.display()))
            })?;
            let config = LookupConfig::from_toml(&text).map_err(CliError::recon)?;
            Ok((path.display().to_string(), config))
        }
        None => {
            let config = LookupConfig::builtin().map_err(CliError::recon)?;
            Ok(("built-in".to_string(), config))
        }
    }
}

// ============================================================================
// run
// ============================================================================

pub fn cmd_run(args: RunArgs) -> Result<(), CliError> {
    let settings = load_settings(args.settings.as_deref())?;
    let (lookup_source, lookups) = load_lookups(args.lookups.as_deref(), &settings)?;
    log::info!("lookup tables: {lookup_source}");

    let today = args
        .today
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    let flavors: &[Flavor] = match args.flavor {
        FlavorArg::Rimac => &[Flavor::Rimac],
        FlavorArg::Pacifico => &[Flavor::Pacifico],
        FlavorArg::All => &Flavor::ALL,
    };

    let mut reports: Vec<ReconReport> = Vec::new();
    let mut first_failure: Option<CliError> = None;

    for &flavor in flavors {
        match run_flavor(flavor, &settings, &lookups, today, &args) {
            Ok(report) => reports.push(report),
            Err(err) if flavors.len() > 1 => {
                // Report now, keep going with the next flavor
                eprintln!("error: {flavor}: {}", err.message);
                if let Some(hint) = &err.hint {
                    eprintln!("hint:  {hint}");
                }
                if first_failure.is_none() {
                    first_failure = Some(recon_err(err.code, String::new()));
                }
            }
            Err(err) => return Err(err),
        }
    }

    if args.json {
        let json_str = match reports.as_slice() {
            [single] if flavors.len() == 1 => serde_json::to_string_pretty(single),
            _ => serde_json::to_string_pretty(&reports),
        }
        .map_err(|e| recon_err(EXIT_ERROR, format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
    }

    if let Some(err) = first_failure {
        return Err(err);
    }

    let warning_count: usize = reports.iter().map(|r| r.warnings.len()).sum();
    if args.strict && warning_count > 0 {
        return Err(recon_err(
            EXIT_WARNINGS,
            format!("{warning_count} warning(s) raised (--strict)"),
        ));
    }
    Ok(())
}

fn run_flavor(
    flavor: Flavor,
    settings: &Settings,
    lookups: &LookupConfig,
    today: NaiveDate,
    args: &RunArgs,
) -> Result<ReconReport, CliError> {
    let mut prep_warnings = Vec::new();
    let input = load_input(flavor, settings, &mut prep_warnings)?;

    let mut report = polrecon_recon::run(flavor, lookups, &input, today).map_err(CliError::recon)?;
    if !prep_warnings.is_empty() {
        prep_warnings.append(&mut report.warnings);
        report.warnings = prep_warnings;
    }

    let dir = match &args.output_dir {
        Some(dir) => dir.clone(),
        None => match flavor {
            Flavor::Rimac => settings.rimac_output(),
            Flavor::Pacifico => settings.pacifico_output(),
        },
    };
    let path = dir.join(format!("{}.{}", flavor.report_stem(today), args.format.extension()));
    match args.format {
        OutputFormat::Xlsx => write_xlsx(&report.table, &path, flavor.sheet_name()),
        OutputFormat::Csv => write_csv(&report.table, &path),
    }
    .map_err(|e| recon_err(EXIT_RUNTIME, format!("{flavor}: {e}")))?;

    let s = &report.summary;
    eprintln!(
        "{flavor}: {} policies, {} in window, {} out of window, {} warning(s)",
        s.total,
        s.in_window,
        s.out_of_window,
        report.warnings.len(),
    );
    eprintln!("wrote {}", path.display());

    Ok(report)
}

/// Read and prepare every source one flavor needs.
fn load_input(
    flavor: Flavor,
    settings: &Settings,
    warnings: &mut Vec<String>,
) -> Result<ReconInput, CliError> {
    let sics = prepared_or_raw(sources::sics(settings)?.data, prepare::prepare_sics, warnings);
    let sharepoint = prepared_or_raw(
        sources::sharepoint(settings)?.data,
        prepare::prepare_sharepoint,
        warnings,
    );

    let input = match flavor {
        Flavor::Rimac => ReconInput {
            ledger: prepare::prepare_rimac(sources::rimac(settings)?.data).table,
            sics,
            sharepoint,
            cancellations: None,
        },
        Flavor::Pacifico => {
            let sheets: Vec<_> = sources::pacifico(settings)?
                .into_iter()
                .map(|loaded| loaded.data)
                .collect();
            let cancellations = sources::cancellations(settings)?.map(|loaded| {
                prepared_or_raw(loaded.data, prepare::prepare_cancellations, warnings)
            });
            ReconInput {
                ledger: prepare::prepare_pacifico(&sheets).table,
                sics,
                sharepoint,
                cancellations,
            }
        }
    };
    Ok(input)
}

/// A source that cannot be prepared is passed on as read; the engine then
/// treats its missing columns as unmatched.
fn prepared_or_raw(
    table: Table,
    transform: fn(Table) -> Result<Prepared, ReconError>,
    warnings: &mut Vec<String>,
) -> Table {
    match transform(table.clone()) {
        Ok(prepared) => prepared.table,
        Err(err) => {
            let msg = format!("preparation skipped: {err}");
            log::warn!("{msg}");
            warnings.push(msg);
            table
        }
    }
}

// ============================================================================
// validate
// ============================================================================

pub fn cmd_validate(lookups: Option<PathBuf>, settings: Option<PathBuf>) -> Result<(), CliError> {
    let settings = load_settings(settings.as_deref())?;
    let (source, config) = load_lookups(lookups.as_deref(), &settings)?;

    let categories: usize = config.owners.by_category.values().map(Vec::len).sum();
    eprintln!(
        "valid: {source} lookup tables: {} owner(s) over {} categories, {} line/product entries, \
         {} Rimac remark(s), {} Pacífico remark(s); exception owner '{}'",
        config.owners.by_category.len(),
        categories,
        config.owners.by_line_product.len(),
        config.comments.rimac.len(),
        config.comments.pacifico.len(),
        config.exception_owner,
    );
    Ok(())
}
