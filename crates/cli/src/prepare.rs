//! `polrec prepare`: run one preparation stage and write its output.

use std::path::{Path, PathBuf};

use polrecon_io::write::write_xlsx;
use polrecon_recon::prepare as stage;

use crate::exit_codes::EXIT_RUNTIME;
use crate::recon::load_settings;
use crate::{sources, CliError, PrepareSource};

fn prep_err(msg: impl Into<String>) -> CliError {
    CliError { code: EXIT_RUNTIME, message: msg.into(), hint: None }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

pub fn cmd_prepare(
    source: PrepareSource,
    settings: Option<PathBuf>,
    output_dir: Option<PathBuf>,
) -> Result<(), CliError> {
    let settings = load_settings(settings.as_deref())?;

    let (inputs, prepared, default_dir, file_name, sheet) = match source {
        PrepareSource::Sics => {
            let loaded = sources::sics(&settings)?;
            let prepared = stage::prepare_sics(loaded.data).map_err(CliError::recon)?;
            (vec![loaded.path], prepared, settings.prepared_output(), "SICS_preparado.xlsx", "SICS")
        }
        PrepareSource::Sharepoint => {
            let loaded = sources::sharepoint(&settings)?;
            let prepared = stage::prepare_sharepoint(loaded.data).map_err(CliError::recon)?;
            (
                vec![loaded.path],
                prepared,
                settings.prepared_output(),
                "Tablero_preparado.xlsx",
                "Tablero",
            )
        }
        PrepareSource::Rimac => {
            let loaded = sources::rimac(&settings)?;
            let prepared = stage::prepare_rimac(loaded.data);
            (
                vec![loaded.path],
                prepared,
                settings.prepared_output(),
                "Rimac_preparado.xlsx",
                "PagosVencidos",
            )
        }
        PrepareSource::Pacifico => {
            let (paths, sheets): (Vec<_>, Vec<_>) = sources::pacifico(&settings)?
                .into_iter()
                .map(|loaded| (loaded.path, loaded.data))
                .unzip();
            let prepared = stage::prepare_pacifico(&sheets);
            (
                paths,
                prepared,
                settings.pacifico_prepared_output(),
                "Base_Pacifico.xlsx",
                "Base",
            )
        }
        PrepareSource::Cancellations => {
            let loaded = sources::cancellations(&settings)?.ok_or_else(|| {
                prep_err(format!(
                    "cancellation list not found at {}",
                    settings.cancellations_file().display()
                ))
            })?;
            let prepared = stage::prepare_cancellations(loaded.data).map_err(CliError::recon)?;
            (
                vec![loaded.path],
                prepared,
                settings.cancellations_prepared_output(),
                "Anulados_preparado.xlsx",
                "Anulados",
            )
        }
    };

    let path = output_dir.unwrap_or(default_dir).join(file_name);
    if inputs.iter().any(|input| same_file(input, &path)) {
        return Err(CliError::args(format!("refusing to overwrite input {}", path.display()))
            .with_hint("point --output-dir at a folder other than the input folder"));
    }

    write_xlsx(&prepared.table, &path, sheet).map_err(|e| prep_err(e))?;
    for note in &prepared.notes {
        eprintln!("  {note}");
    }
    eprintln!("wrote {} ({} rows)", path.display(), prepared.table.len());
    Ok(())
}
