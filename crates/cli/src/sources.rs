//! Locating and reading the source exports named by the settings.
//!
//! Every reader returns the table exactly as found on disk; the preparation
//! transforms run afterwards, in memory.

use std::path::{Path, PathBuf};

use polrecon_config::Settings;
use polrecon_io::sheet::{read_raw_rows, read_table, SheetChoice};
use polrecon_io::{locate, SPREADSHEET_EXTENSIONS};
use polrecon_recon::prepare::{RawSheet, RIMAC_SHEET_KEYWORDS, SHAREPOINT_SHEET_KEYWORDS};
use polrecon_recon::Table;

use crate::exit_codes::EXIT_RUNTIME;
use crate::CliError;

/// A table plus the file it was read from.
pub struct Loaded<T> {
    pub path: PathBuf,
    pub data: T,
}

fn runtime(msg: String) -> CliError {
    CliError { code: EXIT_RUNTIME, message: msg, hint: None }
}

fn read_latest(label: &str, dir: &Path, choice: SheetChoice<'_>) -> Result<Loaded<Table>, CliError> {
    let path = locate::latest_file(dir, SPREADSHEET_EXTENSIONS).map_err(|e| {
        runtime(format!("{label}: {e}"))
            .with_hint(format!("drop the latest {label} export into {}", dir.display()))
    })?;
    log::info!("{label}: reading {}", path.display());
    let data = read_table(&path, choice).map_err(|e| runtime(format!("{label}: {e}")))?;
    Ok(Loaded { path, data })
}

pub fn sics(settings: &Settings) -> Result<Loaded<Table>, CliError> {
    read_latest("SICS", &settings.sics_input(), SheetChoice::First)
}

pub fn sharepoint(settings: &Settings) -> Result<Loaded<Table>, CliError> {
    read_latest(
        "SharePoint",
        &settings.sharepoint_input(),
        SheetChoice::Keywords(SHAREPOINT_SHEET_KEYWORDS),
    )
}

pub fn rimac(settings: &Settings) -> Result<Loaded<Table>, CliError> {
    read_latest(
        "Rimac",
        &settings.rimac_input(),
        SheetChoice::Keywords(RIMAC_SHEET_KEYWORDS),
    )
}

/// Every Pacífico export in the input folder, raw rows, header not located.
pub fn pacifico(settings: &Settings) -> Result<Vec<Loaded<RawSheet>>, CliError> {
    let dir = settings.pacifico_input();
    let files = locate::all_files(&dir, SPREADSHEET_EXTENSIONS)
        .map_err(|e| runtime(format!("Pacífico: {e}")))?;
    if files.is_empty() {
        return Err(runtime(format!("Pacífico: no export found in {}", dir.display()))
            .with_hint("expected the vigente and no vigente workbooks"));
    }

    let mut sheets = Vec::with_capacity(files.len());
    for path in files {
        let rows = read_raw_rows(&path, SheetChoice::First)
            .map_err(|e| runtime(format!("Pacífico: {e}")))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        sheets.push(Loaded { path, data: RawSheet { file_name, rows } });
    }
    Ok(sheets)
}

/// The cancellation list, or `None` when the file is absent.
pub fn cancellations(settings: &Settings) -> Result<Option<Loaded<Table>>, CliError> {
    let path = settings.cancellations_file();
    if !path.is_file() {
        log::warn!("cancellation list not found at {}", path.display());
        return Ok(None);
    }
    let data = read_table(&path, SheetChoice::First)
        .map_err(|e| runtime(format!("Cancellations: {e}")))?;
    Ok(Some(Loaded { path, data }))
}
