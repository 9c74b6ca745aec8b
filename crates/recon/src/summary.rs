use std::collections::BTreeMap;

use crate::model::{PolicyRow, ReportSummary};

/// Compute summary statistics from classified rows.
pub fn compute_summary(rows: &[PolicyRow]) -> ReportSummary {
    let mut by_code: BTreeMap<String, usize> = BTreeMap::new();
    let mut in_window = 0;

    for r in rows {
        *by_code.entry(r.code.to_string()).or_insert(0) += 1;
        if r.window.is_yes() {
            in_window += 1;
        }
    }

    ReportSummary {
        total: rows.len(),
        in_window,
        out_of_window: rows.len() - in_window,
        by_code,
    }
}
