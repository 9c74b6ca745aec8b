// Spreadsheet I/O around the reconciliation engine

pub mod csv;
pub mod locate;
pub mod sheet;
pub mod write;
pub mod xlsx;

/// Extensions accepted as source spreadsheets.
pub const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xls", "csv"];
