//! Reading a source spreadsheet into a [`Table`].
//!
//! The cell engine is chosen by extension: `.csv` goes through the CSV
//! reader, everything else through calamine.

use std::path::Path;

use polrecon_recon::Table;

/// Which sheet of a workbook to read. Ignored for CSV files.
#[derive(Debug, Clone, Copy)]
pub enum SheetChoice<'a> {
    First,
    Named(&'a str),
    /// First sheet whose lower-cased name contains any keyword, else the first sheet.
    Keywords(&'a [&'a str]),
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}

/// Resolve a sheet choice against the workbook's sheet names.
pub fn pick_sheet(names: &[String], choice: SheetChoice<'_>) -> Result<String, String> {
    let first = names
        .first()
        .cloned()
        .ok_or_else(|| "Workbook contains no sheets".to_string())?;

    match choice {
        SheetChoice::First => Ok(first),
        SheetChoice::Named(name) => names
            .iter()
            .find(|n| n.as_str() == name)
            .cloned()
            .ok_or_else(|| format!("Sheet '{}' not found (have: {})", name, names.join(", "))),
        SheetChoice::Keywords(keywords) => Ok(names
            .iter()
            .find(|n| {
                let lower = n.to_lowercase();
                keywords.iter().any(|k| lower.contains(*k))
            })
            .cloned()
            .unwrap_or(first)),
    }
}

/// Every row of the chosen sheet, no header handling.
pub fn read_raw_rows(path: &Path, choice: SheetChoice<'_>) -> Result<Vec<Vec<String>>, String> {
    if is_csv(path) {
        return crate::csv::import_rows(path);
    }
    let names = crate::xlsx::sheet_names(path)?;
    let sheet = pick_sheet(&names, choice)?;
    log::info!("{}: sheet '{}'", file_label(path), sheet);
    crate::xlsx::import_rows(path, &sheet)
}

/// Read a sheet whose first non-blank row is the header. Blank rows are skipped.
pub fn read_table(path: &Path, choice: SheetChoice<'_>) -> Result<Table, String> {
    let rows = read_raw_rows(path, choice)?;
    let table = rows_to_table(rows);
    log::info!(
        "{}: {} rows, {} columns",
        file_label(path),
        table.len(),
        table.columns.len()
    );
    Ok(table)
}

pub fn rows_to_table(rows: Vec<Vec<String>>) -> Table {
    let mut rows = rows.into_iter().filter(|r| r.iter().any(|c| !c.trim().is_empty()));
    let Some(header) = rows.next() else {
        return Table::default();
    };
    Table::from_rows(header, rows.collect())
}

pub(crate) fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
