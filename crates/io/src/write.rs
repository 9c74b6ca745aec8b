// Report export (xlsx, csv)

use std::path::Path;

use polrecon_recon::Table;
use rust_xlsxwriter::{Format, Workbook};

fn ensure_parent(path: &Path) -> Result<(), String> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create {}: {}", parent.display(), e)),
        _ => Ok(()),
    }
}

/// One worksheet, bold header row, every cell written as text.
pub fn write_xlsx(table: &Table, path: &Path, sheet_name: &str) -> Result<(), String> {
    ensure_parent(path)?;

    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let worksheet = workbook
        .add_worksheet()
        .set_name(sheet_name)
        .map_err(|e| format!("Failed to create sheet '{}': {}", sheet_name, e))?;

    for (col, name) in table.columns.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, name, &header)
            .map_err(|e| format!("Failed to write header: {}", e))?;
    }

    for (row_idx, row) in table.rows.iter().enumerate() {
        let target_row = (row_idx + 1) as u32;
        for (col, value) in row.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            worksheet
                .write_string(target_row, col as u16, value)
                .map_err(|e| format!("Failed to write cell ({}, {}): {}", target_row, col, e))?;
        }
    }

    if !table.columns.is_empty() {
        worksheet
            .autofilter(0, 0, table.len() as u32, (table.columns.len() - 1) as u16)
            .map_err(|e| format!("Failed to set autofilter: {}", e))?;
    }

    workbook
        .save(path)
        .map_err(|e| format!("Failed to save XLSX file: {}", e))?;
    log::debug!("wrote {} rows to {}", table.len(), path.display());
    Ok(())
}

pub fn write_csv(table: &Table, path: &Path) -> Result<(), String> {
    ensure_parent(path)?;

    let mut writer = csv::WriterBuilder::new()
        .from_path(path)
        .map_err(|e| format!("Failed to create {}: {}", path.display(), e))?;

    writer.write_record(&table.columns).map_err(|e| e.to_string())?;
    for row in &table.rows {
        writer.write_record(row).map_err(|e| e.to_string())?;
    }

    writer.flush().map_err(|e| e.to_string())?;
    log::debug!("wrote {} rows to {}", table.len(), path.display());
    Ok(())
}
