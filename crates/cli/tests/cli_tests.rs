// End-to-end tests for the `polrec` binary over CSV exports in a temp tree.
//
// Run with: cargo test -p polrecon-cli --test cli_tests -- --nocapture

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

fn polrec() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_polrec"));
    cmd.env_remove("RUST_LOG").env_remove("POLREC_SETTINGS");
    cmd
}

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Data tree with every source present; cancellations read from CSV.
struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();

        write(
            &root.join("settings.toml"),
            r#"
data_dir = "data"

[input]
cancellations = "input/PreparaciónPacífico/Anulados/Anulados.csv"
"#,
        );

        write(
            &root.join("data/input/PreparaciónSics/sics.csv"),
            "Póliza,Vig Hasta Póliza\n\
             AB-100,30/11/2026\n\
             CD-200,15/11/2026\n\
             PA-9001,30/11/2026\n",
        );
        write(
            &root.join("data/input/PreparaciónSharepoint/tablero.csv"),
            "Pólizafinal,STATUS RENOVACION\n\
             AB-100,RENOVADA\n\
             PA-9001,EN PROCESO\n",
        );
        write(
            &root.join("data/input/PreparaciónRimac/pagos.csv"),
            "RESPONSABLE DE PAGO,NRO. POLIZA,CATEGORÍA,VENCIMIENTO,IMPORTE\n\
             ACME,100,SOAT,30/11/2026,10\n\
             BETA,200,VIDA GRUPO,15/10/2026,20\n\
             GAMMA,300,CASCOS,01/12/2026,30\n\
             GAMMA,300,CASCOS,01/01/2027,30\n",
        );
        write(
            &root.join("data/input/PreparaciónPacífico/vigente.csv"),
            "Reporte de pólizas,,,,,,,\n\
             Contratante,Nro de Documento,Linea de Negocio,Producto,Nro de Poliza/Contrato,Fin de Vigencia,Situacion,Prima Bruta Soles\n\
             ACME,20100,VEHICULOS,AUTO,PA-9001,30/11/2026,VIGENTE,\"1,250.50\"\n\
             BETA,20200,SALUD,EPS,PA-9002,15/12/2026,VIGENTE,-\n",
        );
        write(
            &root.join("data/input/PreparaciónPacífico/no_vigente.csv"),
            "Contratante,Nro de Documento,Linea de Negocio,Producto,Nro de Poliza/Contrato,Fin de Vigencia,Situacion,Prima Bruta Soles\n\
             GAMMA,20300,VIDA,VIDA LEY,PA-9003,01/10/2026,NO RENOVADA,300\n",
        );
        write(
            &root.join("data/input/PreparaciónPacífico/Anulados/Anulados.csv"),
            "Nro de Poliza/Contrato,Situacion\n\
             PA-9003,ANULADA\n",
        );

        Self { dir }
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn settings(&self) -> PathBuf {
        self.root().join("settings.toml")
    }

    fn run(&self, args: &[&str]) -> Output {
        polrec()
            .args(args)
            .arg("--settings")
            .arg(self.settings())
            .output()
            .expect("spawn polrec")
    }
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn json(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(stdout.trim())
        .unwrap_or_else(|e| panic!("stdout must be JSON: {e}\n{stdout}"))
}

fn column_index(report: &serde_json::Value, name: &str) -> usize {
    report["columns"]
        .as_array()
        .unwrap()
        .iter()
        .position(|c| c == name)
        .unwrap_or_else(|| panic!("no column {name}"))
}

// ===========================================================================
// run
// ===========================================================================

#[test]
fn run_rimac_writes_dated_report() {
    let ws = Workspace::new();
    let output = ws.run(&["run", "rimac", "--today", "2026-10-19", "--json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let report = json(&output);
    assert_eq!(report["meta"]["flavor"], "rimac");
    assert_eq!(report["meta"]["run_date"], "2026-10-19");
    // Duplicate policy 300 collapsed during preparation
    assert_eq!(report["summary"]["total"], 3);
    assert_eq!(report["warnings"].as_array().unwrap().len(), 0);

    let columns = report["columns"].as_array().unwrap();
    assert_eq!(columns.len(), 10);
    assert!(!columns.iter().any(|c| c == "IMPORTE"));

    let policy = column_index(&report, "NRO. POLIZA");
    let sics = column_index(&report, "SICS");
    let code = column_index(&report, "Obs");
    let window = column_index(&report, "DentroRango");
    let rows = report["rows"].as_array().unwrap();
    let row_300 = rows.iter().find(|r| r[policy] == "300").unwrap();
    assert_eq!(row_300[sics], "No Encontrado");
    assert_eq!(row_300[code], "1");
    assert_eq!(row_300[window], "Sí");
    let row_100 = rows.iter().find(|r| r[policy] == "100").unwrap();
    assert_eq!(row_100[sics], "2026-11");

    let path = ws
        .root()
        .join("data/output/Rimac/Reporte-polizas_Rimac_2026-10-19.xlsx");
    assert!(path.exists(), "missing {}", path.display());
}

#[test]
fn run_pacifico_csv_to_output_dir() {
    let ws = Workspace::new();
    let out = ws.root().join("reports");
    let output = ws.run(&[
        "run",
        "pacifico",
        "--today",
        "2026-10-19",
        "--format",
        "csv",
        "--output-dir",
        out.to_str().unwrap(),
        "--json",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let report = json(&output);
    assert_eq!(report["summary"]["total"], 3);
    let policy = column_index(&report, "Nro de Poliza/Contrato");
    let cancelled = column_index(&report, "Polizas Anulada");
    let rows = report["rows"].as_array().unwrap();
    let row = rows.iter().find(|r| r[policy] == "PA-9003").unwrap();
    assert_eq!(row[cancelled], "ANULADA");

    let path = out.join("Reporte-polizas_Pacifico_2026-10-19.csv");
    let written = fs::read_to_string(&path).unwrap();
    assert!(written.starts_with("Contratante,Nro de Documento,"));
    assert_eq!(written.lines().count(), 4);
}

#[test]
fn run_all_reports_both_flavors() {
    let ws = Workspace::new();
    let output = ws.run(&["run", "all", "--today", "2026-10-19", "--json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let reports = json(&output);
    let reports = reports.as_array().expect("array of reports");
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0]["meta"]["flavor"], "rimac");
    assert_eq!(reports[1]["meta"]["flavor"], "pacifico");

    let err = stderr(&output);
    assert!(err.contains("Rimac: 3 policies"), "stderr: {err}");
    assert!(err.contains("Pacifico: 3 policies"), "stderr: {err}");
}

#[test]
fn run_all_continues_after_one_flavor_fails() {
    let ws = Workspace::new();
    fs::remove_file(ws.root().join("data/input/PreparaciónRimac/pagos.csv")).unwrap();

    let output = ws.run(&["run", "all", "--today", "2026-10-19"]);
    assert_eq!(output.status.code(), Some(61));

    let err = stderr(&output);
    assert!(err.contains("error: Rimac:"), "stderr: {err}");
    assert!(err.contains("Pacifico: 3 policies"), "stderr: {err}");
    assert!(ws
        .root()
        .join("data/output/PacíficoIntegrado/Reporte-polizas_Pacifico_2026-10-19.xlsx")
        .exists());
}

#[test]
fn missing_cancellations_warns_and_strict_fails() {
    let ws = Workspace::new();
    fs::remove_file(
        ws.root()
            .join("data/input/PreparaciónPacífico/Anulados/Anulados.csv"),
    )
    .unwrap();

    let relaxed = ws.run(&["run", "pacifico", "--today", "2026-10-19", "--json"]);
    assert!(relaxed.status.success(), "stderr: {}", stderr(&relaxed));
    let report = json(&relaxed);
    let warnings = report["warnings"].as_array().unwrap();
    assert!(warnings
        .iter()
        .any(|w| w.as_str().unwrap().contains("no cancellation list")));

    let strict = ws.run(&["run", "pacifico", "--today", "2026-10-19", "--strict"]);
    assert_eq!(strict.status.code(), Some(62));
    assert!(stderr(&strict).contains("--strict"));
}

#[test]
fn missing_driver_key_is_runtime_error() {
    let ws = Workspace::new();
    write(
        &ws.root().join("data/input/PreparaciónRimac/pagos.csv"),
        "RESPONSABLE DE PAGO,POLIZA,CATEGORÍA,VENCIMIENTO\nACME,100,SOAT,30/11/2026\n",
    );

    let output = ws.run(&["run", "rimac", "--today", "2026-10-19"]);
    assert_eq!(output.status.code(), Some(61));
    let err = stderr(&output);
    assert!(err.contains("NRO. POLIZA"), "stderr: {err}");
}

#[test]
fn empty_input_folder_is_runtime_error_with_hint() {
    let ws = Workspace::new();
    fs::remove_file(ws.root().join("data/input/PreparaciónSics/sics.csv")).unwrap();

    let output = ws.run(&["run", "rimac"]);
    assert_eq!(output.status.code(), Some(61));
    let err = stderr(&output);
    assert!(err.contains("error: SICS:"), "stderr: {err}");
    assert!(err.contains("hint:"), "stderr: {err}");
}

#[test]
fn bad_today_is_usage_error() {
    let ws = Workspace::new();
    let output = ws.run(&["run", "rimac", "--today", "19/10/2026"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn invalid_lookups_exit_60() {
    let ws = Workspace::new();
    let lookups = ws.root().join("bad.toml");
    write(
        &lookups,
        r#"
exception_owner = "Thalia"

[owners.by_category]
Cesar = ["SOAT"]
Thalia = ["SOAT"]
"#,
    );

    let output = ws.run(&["run", "rimac", "--lookups", lookups.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(60));
    assert!(stderr(&output).contains("SOAT"));
}

// ===========================================================================
// prepare
// ===========================================================================

#[test]
fn prepare_pacifico_writes_base_workbook() {
    let ws = Workspace::new();
    let output = ws.run(&["prepare", "pacifico"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let path = ws.root().join("data/output/Pacífico/Base_Pacifico.xlsx");
    assert!(path.exists());
    assert!(stderr(&output).contains("(3 rows)"));
}

#[test]
fn prepare_cancellations_without_file_fails() {
    let ws = Workspace::new();
    fs::remove_file(
        ws.root()
            .join("data/input/PreparaciónPacífico/Anulados/Anulados.csv"),
    )
    .unwrap();

    let output = ws.run(&["prepare", "cancellations"]);
    assert_eq!(output.status.code(), Some(61));
}

#[test]
fn prepare_never_overwrites_input() {
    let ws = Workspace::new();
    let first = ws.run(&["prepare", "sics"]);
    assert!(first.status.success(), "stderr: {}", stderr(&first));

    // Feed the prepared workbook back in as the only SICS export
    let sics_dir = ws.root().join("data/input/PreparaciónSics");
    fs::remove_file(sics_dir.join("sics.csv")).unwrap();
    fs::copy(
        ws.root().join("data/output/SICS_preparado.xlsx"),
        sics_dir.join("SICS_preparado.xlsx"),
    )
    .unwrap();

    let output = ws.run(&["prepare", "sics", "--output-dir", sics_dir.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("refusing to overwrite"));
}

// ===========================================================================
// validate
// ===========================================================================

#[test]
fn validate_builtin_tables() {
    let output = polrec().args(["validate"]).output().unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("valid: built-in lookup tables"));
}
