// Excel import (xlsx, xls, xlsb, ods)

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use chrono::{Days, NaiveDate, NaiveTime, Timelike};

/// Sheet names in workbook order.
pub fn sheet_names(path: &Path) -> Result<Vec<String>, String> {
    let workbook: Sheets<_> = open_workbook_auto(path)
        .map_err(|e| format!("Failed to open Excel file {}: {}", path.display(), e))?;
    Ok(workbook.sheet_names().to_vec())
}

/// Every row of one sheet as text, anchored at A1.
pub fn import_rows(path: &Path, sheet_name: &str) -> Result<Vec<Vec<String>>, String> {
    let mut workbook: Sheets<_> = open_workbook_auto(path)
        .map_err(|e| format!("Failed to open Excel file {}: {}", path.display(), e))?;

    let range = workbook
        .worksheet_range(sheet_name)
        .map_err(|e| format!("Failed to read sheet '{}': {}", sheet_name, e))?;

    let (height, width) = range.get_size();
    if height == 0 || width == 0 {
        return Ok(Vec::new());
    }

    // Range start offset (data may not begin at A1)
    let (start_row, start_col) = range.start().unwrap_or((0, 0));
    let start_col = start_col as usize;

    let mut rows: Vec<Vec<String>> = vec![Vec::new(); start_row as usize];
    for row in range.rows() {
        let mut cells = vec![String::new(); start_col];
        cells.extend(row.iter().map(render_cell));
        rows.push(cells);
    }
    Ok(rows)
}

/// Text form of a cell: integers without decimals, TRUE/FALSE, dates as
/// `YYYY-MM-DD` (with time when present), errors empty.
pub fn render_cell(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(n) => {
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                format!("{}", n)
            }
        }
        Data::Int(n) => format!("{}", n),
        Data::Bool(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
        Data::Error(e) => {
            log::debug!("cell error {:?} read as empty", e);
            String::new()
        }
        // 1900 date system assumed
        Data::DateTime(dt) => serial_to_text(dt.as_f64()),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}

fn serial_to_text(serial: f64) -> String {
    let Some(epoch) = NaiveDate::from_ymd_opt(1899, 12, 30) else {
        return format!("{}", serial);
    };
    if serial < 0.0 {
        return format!("{}", serial);
    }
    let Some(date) = epoch.checked_add_days(Days::new(serial.trunc() as u64)) else {
        return format!("{}", serial);
    };

    let seconds = (serial.fract() * 86_400.0).round() as u32;
    match NaiveTime::from_num_seconds_from_midnight_opt(seconds.min(86_399), 0) {
        Some(time) if seconds > 0 => format!(
            "{} {:02}:{:02}:{:02}",
            date.format("%Y-%m-%d"),
            time.hour(),
            time.minute(),
            time.second()
        ),
        _ => date.format("%Y-%m-%d").to_string(),
    }
}
