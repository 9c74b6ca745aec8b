//! Source preparation.
//!
//! Each transform takes the table as read from disk and returns the table the
//! pipeline expects, plus human-readable notes about what it did. Nothing
//! here touches the filesystem.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{Days, NaiveDate};

use crate::columns;
use crate::error::ReconError;
use crate::normalize::{full_key, suffix_key};
use crate::table::Table;

#[derive(Debug, Clone, Default)]
pub struct Prepared {
    pub table: Table,
    pub notes: Vec<String>,
}

impl Prepared {
    fn note(&mut self, message: String) {
        log::info!("{message}");
        self.notes.push(message);
    }
}

/// Sheet-name keywords used to pick the tracker sheet.
pub const SHAREPOINT_SHEET_KEYWORDS: &[&str] = &["tablero", "renovaciones", "poliza"];
/// Sheet-name keywords used to pick the Rimac ledger sheet.
pub const RIMAC_SHEET_KEYWORDS: &[&str] = &["pagosvencidos", "pagos", "rimac"];

/// Rows scanned for the Pacífico header.
const HEADER_SCAN_ROWS: usize = 10;

// ---------------------------------------------------------------------------
// Dates
// ---------------------------------------------------------------------------

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"];

/// Parse a spreadsheet date. Day-first for slashed and dashed forms, ISO,
/// optional time part, or an Excel serial day number.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    if let Some(date) = excel_serial(value) {
        return Some(date);
    }

    let date_part = value
        .split(|c: char| c == ' ' || c == 'T')
        .next()
        .unwrap_or(value);
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
}

fn excel_serial(value: &str) -> Option<NaiveDate> {
    if !value.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }
    let serial: f64 = value.parse().ok()?;
    if !(1.0..=2_958_465.0).contains(&serial) {
        return None;
    }
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_days(Days::new(serial.trunc() as u64))
}

/// Dates sort ascending with unparseable values last.
fn cmp_dates(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn format_ymd(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// SICS + SharePoint
// ---------------------------------------------------------------------------

fn require(table: &Table, source: &str, column: &str) -> Result<(), ReconError> {
    if table.has_column(column) {
        Ok(())
    } else {
        Err(ReconError::MissingColumn {
            source: source.to_string(),
            column: column.to_string(),
        })
    }
}

/// Trim `policy_column` and derive the full (`Pacifico`) and suffix (`Rimac`) keys from it.
fn derive_keys(table: &mut Table, policy_column: &str) {
    let policies: Vec<String> = table.column_values(policy_column).into_iter().map(full_key).collect();
    let pacifico = policies.clone();
    let rimac = policies.iter().map(|p| suffix_key(p)).collect();
    table.set_column(policy_column, policies);
    table.set_column(columns::KEY_PACIFICO, pacifico);
    table.set_column(columns::KEY_RIMAC, rimac);
}

pub fn prepare_sics(mut table: Table) -> Result<Prepared, ReconError> {
    require(&table, "SICS", columns::SICS_POLICY)?;

    for derived in [columns::KEY_PACIFICO, columns::KEY_RIMAC, columns::SICS_PERIOD_END] {
        table.drop_column(derived);
    }
    derive_keys(&mut table, columns::SICS_POLICY);

    let mut out = Prepared::default();
    if table.has_column(columns::SICS_VALID_UNTIL) {
        let periods: Vec<String> = table
            .column_values(columns::SICS_VALID_UNTIL)
            .into_iter()
            .map(|v| parse_date(v).map(|d| d.format("%Y-%m").to_string()).unwrap_or_default())
            .collect();
        let valid = periods.iter().filter(|p| !p.is_empty()).count();
        let total = periods.len();
        table.set_column(columns::SICS_PERIOD_END, periods);
        out.note(format!("SICS: valid dates converted {valid}/{total}"));
        if valid < total {
            log::warn!("SICS: {} dates could not be converted", total - valid);
        }
    } else {
        log::warn!(
            "SICS: no '{}' column, '{}' not generated",
            columns::SICS_VALID_UNTIL,
            columns::SICS_PERIOD_END
        );
        out.notes.push(format!("SICS: '{}' not generated", columns::SICS_PERIOD_END));
    }

    out.note(format!("SICS: {} rows, {} columns", table.len(), table.columns.len()));
    out.table = table;
    Ok(out)
}

pub fn prepare_sharepoint(mut table: Table) -> Result<Prepared, ReconError> {
    require(&table, "SharePoint", columns::SHAREPOINT_POLICY)?;

    for derived in [columns::KEY_PACIFICO, columns::KEY_RIMAC] {
        table.drop_column(derived);
    }
    derive_keys(&mut table, columns::SHAREPOINT_POLICY);

    let mut out = Prepared::default();
    out.note(format!("SharePoint: {} rows, keys derived", table.len()));
    out.table = table;
    Ok(out)
}

// ---------------------------------------------------------------------------
// Rimac ledger
// ---------------------------------------------------------------------------

const RIMAC_MAIN: &[&str] = &[
    columns::RIMAC_PAYER,
    columns::RIMAC_POLICY,
    columns::RIMAC_CATEGORY,
    columns::RIMAC_DUE,
];

/// Keep the main columns, one row per policy (earliest due date), sorted by due date.
pub fn prepare_rimac(table: Table) -> Prepared {
    let mut out = Prepared::default();

    let missing = table.missing(columns::RIMAC_REQUIRED);
    if !missing.is_empty() {
        log::warn!("Rimac: missing expected columns [{}]", missing.join(", "));
        out.notes.push(format!("Rimac: missing columns [{}]", missing.join(", ")));
    }

    let present: Vec<&str> = RIMAC_MAIN.iter().copied().filter(|c| table.has_column(c)).collect();
    let mut base = table.project(&present);

    let has_due = base.has_column(columns::RIMAC_DUE);
    let due: Vec<Option<NaiveDate>> = base
        .column_values(columns::RIMAC_DUE)
        .into_iter()
        .map(parse_date)
        .collect();

    let mut order: Vec<usize> = (0..base.len()).collect();

    if base.has_column(columns::RIMAC_POLICY) {
        let policies: Vec<String> = base
            .column_values(columns::RIMAC_POLICY)
            .into_iter()
            .map(full_key)
            .collect();

        // Earliest due date per policy; first in source order on ties
        let mut best: HashMap<&str, usize> = HashMap::new();
        for i in 0..policies.len() {
            best.entry(policies[i].as_str())
                .and_modify(|kept| {
                    if cmp_dates(due[i], due[*kept]) == Ordering::Less {
                        *kept = i;
                    }
                })
                .or_insert(i);
        }
        let before = order.len();
        order.retain(|&i| best.get(policies[i].as_str()) == Some(&i));
        let removed = before - order.len();
        if removed > 0 {
            out.note(format!(
                "Rimac: removed {removed} duplicate '{}' rows (earliest kept)",
                columns::RIMAC_POLICY
            ));
        }
        base.set_column(columns::RIMAC_POLICY, policies);
    }

    if has_due {
        order.sort_by(|&a, &b| cmp_dates(due[a], due[b]));
        let formatted = due.iter().map(|d| format_ymd(*d)).collect();
        base.set_column(columns::RIMAC_DUE, formatted);
    }

    let base = base.select_rows(&order);
    out.note(format!("Rimac: {} rows after cleanup", base.len()));
    out.table = base;
    out
}

// ---------------------------------------------------------------------------
// Pacífico ledger
// ---------------------------------------------------------------------------

/// One raw sheet of a Pacífico export: every row, header not yet located.
#[derive(Debug, Clone)]
pub struct RawSheet {
    /// File name the sheet came from; decides the report kind.
    pub file_name: String,
    pub rows: Vec<Vec<String>>,
}

/// Report kind tagged on every row of a Pacífico file.
pub fn report_kind(file_name: &str) -> &'static str {
    let name = file_name.to_lowercase();
    if name.contains("vig") && !name.contains("no") {
        "VIGENTE"
    } else if name.contains("no") {
        "NO VIGENTE"
    } else {
        "DESCONOCIDO"
    }
}

/// Index of the header row: the first of the leading rows holding a
/// `contratante` cell.
pub fn detect_header(rows: &[Vec<String>]) -> Option<usize> {
    rows.iter()
        .take(HEADER_SCAN_ROWS)
        .position(|row| row.iter().any(|c| c.trim().eq_ignore_ascii_case("contratante")))
}

/// Commas removed; a cell made only of dashes is zero.
pub fn clean_amount(raw: &str) -> String {
    let value = raw.trim().replace(',', "");
    if !value.is_empty() && value.chars().all(|c| c == '-' || c == '—') {
        return "0".to_string();
    }
    value
}

fn sheet_to_table(sheet: &RawSheet, notes: &mut Vec<String>) -> Table {
    let header = match detect_header(&sheet.rows) {
        Some(i) => i,
        None => {
            let msg = format!("{}: header row not found, using the first row", sheet.file_name);
            log::warn!("{msg}");
            notes.push(msg);
            0
        }
    };
    let Some(header_row) = sheet.rows.get(header) else {
        return Table::default();
    };

    // Blank-named columns are dropped
    let keep: Vec<usize> = (0..header_row.len())
        .filter(|&i| !header_row[i].trim().is_empty())
        .collect();
    let names: Vec<String> = keep.iter().map(|&i| header_row[i].trim().to_string()).collect();

    let mut table = Table::new(&names);
    for row in sheet.rows.iter().skip(header + 1) {
        let first = keep.first().and_then(|&i| row.get(i)).map(|c| c.trim()).unwrap_or("");
        if first.eq_ignore_ascii_case(columns::PAC_REPORT_KIND) {
            continue;
        }
        table.push_row(keep.iter().map(|&i| row.get(i).cloned().unwrap_or_default()).collect());
    }

    let kind = report_kind(&sheet.file_name);
    table.set_column(columns::PAC_REPORT_KIND, vec![kind.to_string(); table.len()]);
    table
}

/// Merge the Pacífico exports into one clean base table.
pub fn prepare_pacifico(sheets: &[RawSheet]) -> Prepared {
    let mut out = Prepared::default();
    let mut merged: Option<Table> = None;

    for sheet in sheets {
        let table = sheet_to_table(sheet, &mut out.notes);
        log::info!("{}: {} rows ({})", sheet.file_name, table.len(), report_kind(&sheet.file_name));
        match merged.as_mut() {
            Some(m) => m.append(&table),
            None => merged = Some(table),
        }
    }

    let mut table = merged.unwrap_or_default();
    out.note(format!("Pacífico: {} rows merged from {} files", table.len(), sheets.len()));

    for row in &mut table.rows {
        for cell in row.iter_mut() {
            *cell = cell.trim().to_string();
        }
    }

    for column in [columns::PAC_START, columns::PAC_END] {
        if table.has_column(column) {
            let values = table
                .column_values(column)
                .into_iter()
                .map(|v| format_ymd(parse_date(v)))
                .collect();
            table.set_column(column, values);
        }
    }

    for column in [columns::PAC_PREMIUM_USD, columns::PAC_PREMIUM_PEN] {
        if table.has_column(column) {
            let values = table.column_values(column).into_iter().map(clean_amount).collect();
            table.set_column(column, values);
        }
    }

    out.table = table;
    out
}

// ---------------------------------------------------------------------------
// Cancellations
// ---------------------------------------------------------------------------

/// One row per policy number, the last occurrence kept in place.
pub fn prepare_cancellations(mut table: Table) -> Result<Prepared, ReconError> {
    require(&table, "Cancellations", columns::PAC_POLICY)?;

    let policies: Vec<String> = table
        .column_values(columns::PAC_POLICY)
        .into_iter()
        .map(full_key)
        .collect();
    let mut last: HashMap<&str, usize> = HashMap::new();
    for (i, p) in policies.iter().enumerate() {
        last.insert(p.as_str(), i);
    }
    let keep: Vec<usize> = (0..policies.len())
        .filter(|&i| last.get(policies[i].as_str()) == Some(&i))
        .collect();
    let removed = policies.len() - keep.len();
    table.set_column(columns::PAC_POLICY, policies);

    let mut out = Prepared::default();
    out.table = table.select_rows(&keep);
    out.note(format!(
        "Cancellations: {} unique policies, {removed} duplicates removed",
        out.table.len()
    ));
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &[&str]) -> Vec<String> {
        v.iter().map(|c| c.to_string()).collect()
    }

    fn t(columns: &[&str], rows: &[&[&str]]) -> Table {
        Table::from_rows(s(columns), rows.iter().map(|r| s(r)).collect())
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parse_date_formats() {
        assert_eq!(parse_date("01/09/2025"), Some(ymd(2025, 9, 1)));
        assert_eq!(parse_date("1/9/2025"), Some(ymd(2025, 9, 1)));
        assert_eq!(parse_date("15-10-2026"), Some(ymd(2026, 10, 15)));
        assert_eq!(parse_date("2026-10-15"), Some(ymd(2026, 10, 15)));
        assert_eq!(parse_date("2026-10-15 00:00:00"), Some(ymd(2026, 10, 15)));
        assert_eq!(parse_date("2026-10-15T08:30:00"), Some(ymd(2026, 10, 15)));
        assert_eq!(parse_date("45580"), Some(ymd(2024, 10, 15)));
        assert_eq!(parse_date("45580.5"), Some(ymd(2024, 10, 15)));
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("sin fecha"), None);
        assert_eq!(parse_date("31/02/2026"), None);
    }

    #[test]
    fn sics_derives_keys_and_period() {
        let table = t(
            &["Póliza", "Vig Hasta Póliza", "Rimac"],
            &[&[" AB-123 ", "01/09/2025", "stale"], &["999", "n/a", "stale"]],
        );
        let out = prepare_sics(table).unwrap();
        let table = out.table;
        assert_eq!(table.get(0, "Póliza"), "AB-123");
        assert_eq!(table.get(0, "Pacifico"), "AB-123");
        assert_eq!(table.get(0, "Rimac"), "123");
        assert_eq!(table.get(0, "Fin Vig"), "2025-09");
        assert_eq!(table.get(1, "Rimac"), "999");
        assert_eq!(table.get(1, "Fin Vig"), "");
        assert_eq!(table.columns.iter().filter(|c| *c == "Rimac").count(), 1);
        assert!(out.notes.iter().any(|n| n.contains("1/2")));
    }

    #[test]
    fn sics_without_policy_column_fails() {
        let err = prepare_sics(t(&["Vig Hasta Póliza"], &[])).unwrap_err();
        assert!(matches!(err, ReconError::MissingColumn { .. }));
    }

    #[test]
    fn sharepoint_derives_keys() {
        let out = prepare_sharepoint(t(
            &["Pólizafinal", "STATUS RENOVACION"],
            &[&["X-1-77", "RENOVADA"]],
        ))
        .unwrap();
        assert_eq!(out.table.get(0, "Pacifico"), "X-1-77");
        assert_eq!(out.table.get(0, "Rimac"), "77");
    }

    #[test]
    fn rimac_keeps_earliest_and_sorts() {
        let table = t(
            &["RESPONSABLE DE PAGO", "NRO. POLIZA", "CATEGORÍA", "VENCIMIENTO", "EXTRA"],
            &[
                &["A", "100", "SOAT", "15/12/2026", "x"],
                &["B", "200", "SOAT", "sin fecha", "x"],
                &["C", "100", "SOAT", "01/11/2026", "x"],
                &["D", "300", "SOAT", "2026-10-01", "x"],
                &["E", "200", "SOAT", "", "x"],
            ],
        );
        let out = prepare_rimac(table);
        let table = out.table;
        assert_eq!(table.columns, s(&["RESPONSABLE DE PAGO", "NRO. POLIZA", "CATEGORÍA", "VENCIMIENTO"]));
        assert_eq!(table.column_values("RESPONSABLE DE PAGO"), vec!["D", "C", "B"]);
        assert_eq!(table.column_values("VENCIMIENTO"), vec!["2026-10-01", "2026-11-01", ""]);
    }

    #[test]
    fn header_detection_and_kind() {
        let rows = vec![
            s(&["Reporte de pólizas", ""]),
            s(&["", ""]),
            s(&["CONTRATANTE", "Producto"]),
        ];
        assert_eq!(detect_header(&rows), Some(2));
        assert_eq!(report_kind("Polizas_Vigentes.xlsx"), "VIGENTE");
        assert_eq!(report_kind("Polizas_NoVigentes.xlsx"), "NO VIGENTE");
        assert_eq!(report_kind("export.xlsx"), "DESCONOCIDO");
    }

    #[test]
    fn pacifico_merges_and_cleans() {
        let vigentes = RawSheet {
            file_name: "vigentes.xlsx".into(),
            rows: vec![
                s(&["Pacífico Seguros", "", "", ""]),
                s(&["Contratante", "Nro de Poliza/Contrato", "", "Prima Bruta Soles"]),
                s(&[" ACME ", "P-1", "junk", "1,250.50"]),
                s(&["TipoReporte", "", "", ""]),
            ],
        };
        let no_vigentes = RawSheet {
            file_name: "no_vigentes.xlsx".into(),
            rows: vec![
                s(&["Contratante", "Nro de Poliza/Contrato", "Fin de Vigencia"]),
                s(&["BETA", "P-2", "30/11/2026"]),
                s(&["GAMMA", "P-3", "--"]),
            ],
        };
        let out = prepare_pacifico(&[vigentes, no_vigentes]);
        let table = out.table;
        assert_eq!(
            table.columns,
            s(&["Contratante", "Nro de Poliza/Contrato", "Prima Bruta Soles", "TipoReporte", "Fin de Vigencia"])
        );
        assert_eq!(table.len(), 3);
        assert_eq!(table.get(0, "Contratante"), "ACME");
        assert_eq!(table.get(0, "Prima Bruta Soles"), "1250.50");
        assert_eq!(table.get(0, "TipoReporte"), "VIGENTE");
        assert_eq!(table.get(1, "TipoReporte"), "NO VIGENTE");
        assert_eq!(table.get(1, "Fin de Vigencia"), "2026-11-30");
        assert_eq!(table.get(2, "Fin de Vigencia"), "");
        assert_eq!(table.get(1, "Prima Bruta Soles"), "");
    }

    #[test]
    fn amounts() {
        assert_eq!(clean_amount("1,234.56"), "1234.56");
        assert_eq!(clean_amount("--"), "0");
        assert_eq!(clean_amount("—"), "0");
        assert_eq!(clean_amount("-12.5"), "-12.5");
        assert_eq!(clean_amount(""), "");
    }

    #[test]
    fn cancellations_keep_last() {
        let table = t(
            &["Nro de Poliza/Contrato", "Situacion"],
            &[&["P-1", "ANULADA"], &["P-2", "ANULADA"], &[" P-1", "NO RENOVADA"]],
        );
        let out = prepare_cancellations(table).unwrap();
        assert_eq!(out.table.column_values("Nro de Poliza/Contrato"), vec!["P-2", "P-1"]);
        assert_eq!(out.table.column_values("Situacion"), vec!["ANULADA", "NO RENOVADA"]);
    }
}
