use std::collections::HashMap;

use crate::normalize::{is_blank_key, KeyForm, NOT_FOUND};
use crate::table::Table;

/// Which duplicate of a key survives when a source repeats it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keep {
    First,
    Last,
}

/// Canonical key → value of one source column. Blank keys are never indexed.
#[derive(Debug, Clone, Default)]
pub struct KeyedValues {
    values: HashMap<String, String>,
    /// Rows whose key was already indexed (`Keep::First`) or was overwritten
    /// later (`Keep::Last`).
    pub duplicates: usize,
}

impl KeyedValues {
    /// Index `value_column` by `key_column`. Returns `None` when either column
    /// is absent, in which case every lookup is unmatched.
    pub fn build(
        table: &Table,
        key_column: &str,
        value_column: &str,
        form: KeyForm,
        keep: Keep,
    ) -> Option<Self> {
        let key_idx = table.column_index(key_column)?;
        let value_idx = table.column_index(value_column)?;

        let mut values: HashMap<String, String> = HashMap::with_capacity(table.len());
        let mut duplicates = 0;
        for row in &table.rows {
            let key = form.apply(row.get(key_idx).map(String::as_str).unwrap_or(""));
            if is_blank_key(&key) {
                continue;
            }
            let value = row.get(value_idx).map(|v| v.trim().to_string()).unwrap_or_default();
            match keep {
                Keep::First => {
                    if values.contains_key(&key) {
                        duplicates += 1;
                    } else {
                        values.insert(key, value);
                    }
                }
                Keep::Last => {
                    if values.insert(key, value).is_some() {
                        duplicates += 1;
                    }
                }
            }
        }
        Some(Self { values, duplicates })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        if is_blank_key(key) {
            return None;
        }
        self.values.get(key).map(String::as_str)
    }

    /// Matched value, or the not-found sentinel when the key is absent or the
    /// source cell is empty.
    pub fn lookup_or_not_found(&self, key: &str) -> String {
        match self.get(key) {
            Some(v) if !v.is_empty() => v.to_string(),
            _ => NOT_FOUND.to_string(),
        }
    }
}

/// Lookup against an optional index: a missing index matches nothing.
pub fn lookup_or_not_found(index: Option<&KeyedValues>, key: &str) -> String {
    index
        .map(|ix| ix.lookup_or_not_found(key))
        .unwrap_or_else(|| NOT_FOUND.to_string())
}
