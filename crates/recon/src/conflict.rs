//! Duplicate-key conflict resolution for the three-source flavor.
//!
//! A policy number may appear several times in the ledger (sub-records). Per
//! group of rows sharing a key, in first-appearance order:
//!
//! - codes 2 and 3 together: every code-3 row leaves the window. Codes are kept.
//! - all rows code 1 and more than one row: if any row is in the window, only
//!   the first such row stays in; the rest leave. Groups with no row in the
//!   window are left alone.

use std::collections::HashMap;

use crate::classify::StatusCode;
use crate::model::PolicyRow;
use crate::window::WindowFlag;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ConflictStats {
    pub groups_with_duplicates: usize,
    pub due_rows_suppressed: usize,
    pub review_flags_collapsed: usize,
}

/// Row indices grouped by key, groups in order of first appearance.
pub fn group_by_key(rows: &[PolicyRow]) -> Vec<Vec<usize>> {
    let mut slot: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<Vec<usize>> = Vec::new();
    for (i, row) in rows.iter().enumerate() {
        let g = *slot.entry(row.key.as_str()).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[g].push(i);
    }
    groups
}

pub fn resolve_conflicts(rows: &mut [PolicyRow]) -> ConflictStats {
    let mut stats = ConflictStats::default();

    for group in group_by_key(rows) {
        if group.len() > 1 {
            stats.groups_with_duplicates += 1;
        }

        let has = |code: StatusCode| group.iter().any(|&i| rows[i].code == code);

        if has(StatusCode::TWO) && has(StatusCode::DUE_FOR_RENEWAL) {
            for &i in &group {
                if rows[i].code == StatusCode::DUE_FOR_RENEWAL && rows[i].window.is_yes() {
                    rows[i].window = WindowFlag::No;
                    stats.due_rows_suppressed += 1;
                }
            }
        }

        let all_not_loaded = group.iter().all(|&i| rows[i].code == StatusCode::NOT_LOADED);
        if all_not_loaded && group.len() > 1 {
            let first_yes = group.iter().copied().find(|&i| rows[i].window.is_yes());
            if let Some(keep) = first_yes {
                for &i in &group {
                    if i != keep && rows[i].window.is_yes() {
                        rows[i].window = WindowFlag::No;
                        stats.review_flags_collapsed += 1;
                    }
                }
            }
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn row(key: &str, code: u8, yes: bool) -> PolicyRow {
        let code = match code {
            1 => StatusCode::NOT_LOADED,
            2 => StatusCode::TWO,
            _ => StatusCode::DUE_FOR_RENEWAL,
        };
        PolicyRow {
            key: key.into(),
            code,
            window: if yes { WindowFlag::Yes } else { WindowFlag::No },
            ..PolicyRow::default()
        }
    }

    fn flags(rows: &[PolicyRow]) -> Vec<bool> {
        rows.iter().map(|r| r.window.is_yes()).collect()
    }

    #[test]
    fn collapse_duplicate_review_flags() {
        let mut rows = vec![row("000111", 1, false), row("000111", 1, true), row("000111", 1, true)];
        let stats = resolve_conflicts(&mut rows);
        assert_eq!(flags(&rows), vec![false, true, false]);
        assert_eq!(stats.review_flags_collapsed, 1);
        assert_eq!(stats.groups_with_duplicates, 1);
    }

    #[test]
    fn all_no_group_untouched() {
        let mut rows = vec![row("A", 1, false), row("A", 1, false)];
        resolve_conflicts(&mut rows);
        assert_eq!(flags(&rows), vec![false, false]);
    }

    #[test]
    fn single_row_group_untouched() {
        let mut rows = vec![row("A", 1, true), row("B", 1, true)];
        resolve_conflicts(&mut rows);
        assert_eq!(flags(&rows), vec![true, true]);
    }

    #[test]
    fn update_needed_outranks_due() {
        let mut rows = vec![row("P", 3, true), row("Q", 3, true), row("P", 2, true), row("P", 3, false)];
        let stats = resolve_conflicts(&mut rows);
        assert_eq!(flags(&rows), vec![false, true, true, false]);
        // codes are not rewritten
        assert_eq!(rows[0].code, StatusCode::DUE_FOR_RENEWAL);
        assert_eq!(stats.due_rows_suppressed, 1);
    }

    #[test]
    fn mixed_one_and_two_untouched() {
        let mut rows = vec![row("P", 1, true), row("P", 2, true)];
        resolve_conflicts(&mut rows);
        assert_eq!(flags(&rows), vec![true, true]);
    }

    #[test]
    fn groups_keep_first_appearance_order() {
        let rows = vec![row("B", 1, false), row("A", 1, false), row("B", 1, false)];
        assert_eq!(group_by_key(&rows), vec![vec![0, 2], vec![1]]);
    }

    fn arb_rows() -> impl Strategy<Value = Vec<PolicyRow>> {
        prop::collection::vec((0u8..4, 1u8..4, any::<bool>()), 0..24).prop_map(|v| {
            v.into_iter()
                .map(|(k, code, yes)| row(&format!("K{k}"), code, yes))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn resolving_twice_changes_nothing(mut rows in arb_rows()) {
            resolve_conflicts(&mut rows);
            let once = flags(&rows);
            let stats = resolve_conflicts(&mut rows);
            prop_assert_eq!(flags(&rows), once);
            prop_assert_eq!(stats.due_rows_suppressed + stats.review_flags_collapsed, 0);
        }

        #[test]
        fn one_review_flag_per_unloaded_duplicate_group(mut rows in arb_rows()) {
            let before: Vec<bool> = flags(&rows);
            resolve_conflicts(&mut rows);
            for group in group_by_key(&rows) {
                let all_one = group.iter().all(|&i| rows[i].code == StatusCode::NOT_LOADED);
                let had_yes = group.iter().any(|&i| before[i]);
                if all_one && group.len() > 1 && had_yes {
                    let yes = group.iter().filter(|&&i| rows[i].window.is_yes()).count();
                    prop_assert_eq!(yes, 1);
                    let first = group.iter().copied().find(|&i| before[i]);
                    prop_assert!(first.map(|i| rows[i].window.is_yes()).unwrap_or(false));
                }
            }
        }
    }
}
