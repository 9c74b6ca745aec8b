//! In-memory tabular data exchanged with the spreadsheet layer.
//!
//! Every cell is text. Column names are trimmed on the way in, rows are padded
//! to the header width, and lookups of absent columns yield the empty string
//! rather than an error. Row order is the source order.

use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<S: AsRef<str>>(columns: &[S]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.as_ref().trim().to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Build a table from a header row and data rows. Short rows are padded,
    /// cells beyond the header width are dropped.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let mut table = Self::new(&columns);
        for row in rows {
            table.push_row(row);
        }
        table
    }

    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.columns.len(), String::new());
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Names from `required` that this table does not have, in the given order.
    pub fn missing(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|c| !self.has_column(c))
            .map(|c| c.to_string())
            .collect()
    }

    /// Cell text, or "" when the row or column does not exist.
    pub fn get(&self, row: usize, column: &str) -> &str {
        match (self.rows.get(row), self.column_index(column)) {
            (Some(r), Some(idx)) => r.get(idx).map(String::as_str).unwrap_or(""),
            _ => "",
        }
    }

    /// All values of one column; empty strings when the column is absent.
    pub fn column_values(&self, column: &str) -> Vec<&str> {
        match self.column_index(column) {
            Some(idx) => self
                .rows
                .iter()
                .map(|r| r.get(idx).map(String::as_str).unwrap_or(""))
                .collect(),
            None => vec![""; self.rows.len()],
        }
    }

    /// Replace (or append) a column. `values` must have one entry per row.
    pub fn set_column(&mut self, name: &str, values: Vec<String>) {
        debug_assert_eq!(values.len(), self.rows.len());
        match self.column_index(name) {
            Some(idx) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => {
                self.columns.push(name.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
    }

    pub fn drop_column(&mut self, name: &str) {
        if let Some(idx) = self.column_index(name) {
            self.columns.remove(idx);
            for row in &mut self.rows {
                row.remove(idx);
            }
        }
    }

    /// New table with exactly `columns`, in that order. Absent columns are empty.
    pub fn project<S: AsRef<str>>(&self, columns: &[S]) -> Table {
        let indices: Vec<Option<usize>> =
            columns.iter().map(|c| self.column_index(c.as_ref())).collect();
        let mut out = Table::new(columns);
        for row in &self.rows {
            let projected = indices
                .iter()
                .map(|idx| idx.and_then(|i| row.get(i)).cloned().unwrap_or_default())
                .collect();
            out.rows.push(projected);
        }
        out
    }

    /// Keep only the rows at `indices`, in the given order.
    pub fn select_rows(&self, indices: &[usize]) -> Table {
        Table {
            columns: self.columns.clone(),
            rows: indices.iter().filter_map(|&i| self.rows.get(i).cloned()).collect(),
        }
    }

    /// Append another table's rows, aligning by column name. Columns the
    /// receiver lacks are added at the end.
    pub fn append(&mut self, other: &Table) {
        for col in &other.columns {
            if !self.has_column(col) {
                self.columns.push(col.clone());
                for row in &mut self.rows {
                    row.push(String::new());
                }
            }
        }
        for other_row in 0..other.len() {
            let row = self
                .columns
                .iter()
                .map(|c| other.get(other_row, c).to_string())
                .collect();
            self.rows.push(row);
        }
    }
}
