//! Actionable review window ("DentroRango").
//!
//! A policy is inside the window when its SICS period month falls in the
//! month before, the month of, or the month after the run date. The exception
//! owner gets no look-ahead month. The three-source flavor first filters on
//! lifecycle situation and due-date year.

use std::fmt;

use chrono::{Datelike, Days, NaiveDate};
use serde::{Serialize, Serializer};

use crate::normalize::{is_unmatched, month_key, year_of};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowFlag {
    Yes,
    No,
}

impl WindowFlag {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Yes => "Sí",
            Self::No => "No",
        }
    }

    pub fn is_yes(self) -> bool {
        self == Self::Yes
    }
}

impl fmt::Display for WindowFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for WindowFlag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// `YYYY-MM` of the run date and of the run date ∓ 30 days.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceMonths {
    pub previous: String,
    pub current: String,
    pub next: String,
}

impl ReferenceMonths {
    pub fn around(today: NaiveDate) -> Self {
        let fmt = |d: NaiveDate| d.format("%Y-%m").to_string();
        let previous = today.checked_sub_days(Days::new(30)).unwrap_or(today);
        let next = today.checked_add_days(Days::new(30)).unwrap_or(today);
        Self {
            previous: fmt(previous),
            current: fmt(today),
            next: fmt(next),
        }
    }

    fn contains(&self, month: &str, look_ahead: bool) -> bool {
        month == self.previous || month == self.current || (look_ahead && month == self.next)
    }
}

/// Everything the evaluator depends on besides the row itself.
#[derive(Debug, Clone)]
pub struct WindowContext {
    pub months: ReferenceMonths,
    pub current_year: i32,
    pub exception_owner: String,
    pub excluded_situations: Vec<String>,
}

impl WindowContext {
    pub fn new(today: NaiveDate, exception_owner: &str, excluded_situations: &[String]) -> Self {
        Self {
            months: ReferenceMonths::around(today),
            current_year: today.year(),
            exception_owner: exception_owner.trim().to_uppercase(),
            excluded_situations: excluded_situations
                .iter()
                .map(|s| s.trim().to_uppercase())
                .collect(),
        }
    }

    fn is_exception_owner(&self, owner: &str) -> bool {
        owner.trim().to_uppercase() == self.exception_owner
    }
}

/// Two-source rule: both sources missing flags the policy for manual review,
/// SICS missing alone never does, otherwise the SICS month decides.
pub fn evaluate(ctx: &WindowContext, sics: &str, tracker: &str, owner: &str) -> WindowFlag {
    let sics_missing = is_unmatched(sics);
    if sics_missing && is_unmatched(tracker) {
        return WindowFlag::Yes;
    }
    if sics_missing {
        return WindowFlag::No;
    }

    let month = match month_key(sics) {
        Some(m) => m,
        None => return WindowFlag::No,
    };
    let look_ahead = !ctx.is_exception_owner(owner);
    if ctx.months.contains(&month, look_ahead) {
        WindowFlag::Yes
    } else {
        WindowFlag::No
    }
}

/// Three-source rule: excluded situations and due years other than this year
/// or next are out before the two-source rule applies. An unreadable year is out.
pub fn evaluate_with_lifecycle(
    ctx: &WindowContext,
    sics: &str,
    tracker: &str,
    owner: &str,
    situation: &str,
    due: &str,
) -> WindowFlag {
    let situation = situation.trim().to_uppercase();
    if ctx.excluded_situations.iter().any(|s| *s == situation) {
        return WindowFlag::No;
    }

    match year_of(due) {
        Some(year) if year == ctx.current_year || year == ctx.current_year + 1 => {}
        _ => return WindowFlag::No,
    }

    evaluate(ctx, sics, tracker, owner)
}
