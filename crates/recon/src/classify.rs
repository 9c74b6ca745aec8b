//! Renewal status codes derived from date comparisons.
//!
//! The two insurers read the same decision tree differently, so there are two
//! classifiers with distinct code sets and opposite comparison directions:
//!
//! | Case                          | `Renewal` (Pacífico) | `Schedule` (Rimac) |
//! |-------------------------------|----------------------|--------------------|
//! | SICS and tracker both missing | 1                    | 1                  |
//! | SICS missing                  | 2                    | 6                  |
//! | SICS month after due month    | 3                    | 6                  |
//! | SICS month equals due month   | 3                    | 2                  |
//! | SICS month before due month   | 2                    | 2                  |
//! | month not comparable          | 2                    | 6                  |

use std::cmp::Ordering;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::normalize::{is_unmatched, month_key};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StatusCode(u8);

impl StatusCode {
    /// Not loaded in SICS nor in the tracker.
    pub const NOT_LOADED: Self = Self(1);
    /// Pacífico: SICS period needs updating. Rimac: payment on schedule.
    pub const TWO: Self = Self(2);
    /// Pacífico: due for renewal.
    pub const DUE_FOR_RENEWAL: Self = Self(3);
    /// Rimac: renewal needs review.
    pub const REVIEW_RENEWAL: Self = Self(6);

    pub fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for StatusCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classifier {
    /// Pacífico: a SICS month at or after the due month is a completed forward renewal.
    Renewal,
    /// Rimac: a SICS month at or before the due month is a payment schedule not yet lapsed.
    Schedule,
}

impl Classifier {
    pub fn codes(self) -> &'static [StatusCode] {
        match self {
            Self::Renewal => &[StatusCode::NOT_LOADED, StatusCode::TWO, StatusCode::DUE_FOR_RENEWAL],
            Self::Schedule => &[StatusCode::NOT_LOADED, StatusCode::TWO, StatusCode::REVIEW_RENEWAL],
        }
    }

    /// Code used when SICS is missing or the months cannot be compared.
    pub fn fallback(self) -> StatusCode {
        match self {
            Self::Renewal => StatusCode::TWO,
            Self::Schedule => StatusCode::REVIEW_RENEWAL,
        }
    }

    /// Classify one policy. Total: every input yields one of `self.codes()`.
    pub fn classify(self, due: &str, sics: &str, tracker: &str) -> StatusCode {
        let sics_missing = is_unmatched(sics);
        if sics_missing && is_unmatched(tracker) {
            return StatusCode::NOT_LOADED;
        }
        if sics_missing {
            return self.fallback();
        }

        match compare_months(sics, due) {
            None => self.fallback(),
            Some(ord) => match self {
                Self::Renewal if ord != Ordering::Less => StatusCode::DUE_FOR_RENEWAL,
                Self::Renewal => StatusCode::TWO,
                Self::Schedule if ord != Ordering::Greater => StatusCode::TWO,
                Self::Schedule => StatusCode::REVIEW_RENEWAL,
            },
        }
    }
}

/// Order of the `YYYY-MM` prefixes of two date-like values, `None` when
/// either side has no month to compare.
pub fn compare_months(source: &str, due: &str) -> Option<Ordering> {
    let source_month = month_key(source)?;
    let due_month = month_key(due)?;
    Some(source_month.cmp(&due_month))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const NF: &str = "No Encontrado";

    #[test]
    fn same_month_splits_by_flavor() {
        assert_eq!(Classifier::Renewal.classify("2025-11-30", "2025-11", "RENOVADA"), StatusCode::DUE_FOR_RENEWAL);
        assert_eq!(Classifier::Schedule.classify("2025-11-30", "2025-11", "RENOVADA"), StatusCode::TWO);
    }

    #[test]
    fn both_missing_is_not_loaded() {
        for c in [Classifier::Renewal, Classifier::Schedule] {
            assert_eq!(c.classify("2025-11-30", NF, NF), StatusCode::NOT_LOADED);
            assert_eq!(c.classify("2025-11-30", "", "nan"), StatusCode::NOT_LOADED);
            assert_eq!(c.classify("", "not found", "NO ENCONTRADO"), StatusCode::NOT_LOADED);
        }
    }

    #[test]
    fn sics_missing_alone_falls_back() {
        assert_eq!(Classifier::Renewal.classify("2025-11-30", NF, "EN PROCESO"), StatusCode::TWO);
        assert_eq!(Classifier::Schedule.classify("2025-11-30", NF, "EN PROCESO"), StatusCode::REVIEW_RENEWAL);
    }

    #[test]
    fn direction_of_comparison() {
        // SICS ahead of due month
        assert_eq!(Classifier::Renewal.classify("2025-11-30", "2026-11", NF), StatusCode::DUE_FOR_RENEWAL);
        assert_eq!(Classifier::Schedule.classify("2025-11-30", "2026-11", NF), StatusCode::REVIEW_RENEWAL);
        // SICS behind due month
        assert_eq!(Classifier::Renewal.classify("2025-11-30", "2024-11", NF), StatusCode::TWO);
        assert_eq!(Classifier::Schedule.classify("2025-11-30", "2024-11", NF), StatusCode::TWO);
    }

    #[test]
    fn blank_due_date_falls_back() {
        assert_eq!(Classifier::Renewal.classify("", "2025-11", NF), StatusCode::TWO);
        assert_eq!(Classifier::Schedule.classify("  ", "2025-11", NF), StatusCode::REVIEW_RENEWAL);
    }

    #[test]
    fn code_sets() {
        let renewal: Vec<u8> = Classifier::Renewal.codes().iter().map(|c| c.value()).collect();
        let schedule: Vec<u8> = Classifier::Schedule.codes().iter().map(|c| c.value()).collect();
        assert_eq!(renewal, vec![1, 2, 3]);
        assert_eq!(schedule, vec![1, 2, 6]);
        assert_eq!(serde_json::to_string(&StatusCode::REVIEW_RENEWAL).unwrap(), "6");
    }

    proptest! {
        #[test]
        fn classifier_is_total(due in "\\PC{0,12}", sics in "\\PC{0,12}", tracker in "\\PC{0,12}") {
            for c in [Classifier::Renewal, Classifier::Schedule] {
                let code = c.classify(&due, &sics, &tracker);
                prop_assert!(c.codes().contains(&code));
            }
        }
    }
}
