//! Policy-key canonicalization and matched-value helpers.

use serde::Deserialize;

/// Written into a matched column when the key is absent from that source.
pub const NOT_FOUND: &str = "No Encontrado";

/// Which representation of a policy identifier a source uses as its join key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyForm {
    /// The whole identifier, whitespace-trimmed (`"AB-123456"`).
    Full,
    /// Only the part after the last `-` (`"123456"`).
    Suffix,
}

impl KeyForm {
    pub fn apply(self, raw: &str) -> String {
        match self {
            Self::Full => full_key(raw),
            Self::Suffix => suffix_key(raw),
        }
    }
}

pub fn full_key(raw: &str) -> String {
    raw.trim().to_string()
}

/// Text after the last `-`, or the whole (trimmed) identifier when there is none.
/// Idempotent: the suffix of a suffix is itself.
pub fn suffix_key(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.rsplit_once('-') {
        Some((_, tail)) => tail.trim().to_string(),
        None => trimmed.to_string(),
    }
}

/// A key that can never join: blank, or the text of a missing cell.
pub fn is_blank_key(key: &str) -> bool {
    key.is_empty() || key.eq_ignore_ascii_case("nan")
}

/// True for a matched value that carries no information: empty, the
/// not-found sentinel in either spelling, or `nan`.
pub fn is_unmatched(value: &str) -> bool {
    let v = value.trim();
    v.is_empty()
        || v.eq_ignore_ascii_case(NOT_FOUND)
        || v.eq_ignore_ascii_case("not found")
        || v.eq_ignore_ascii_case("nan")
}

/// First seven characters (`YYYY-MM`) of a date-like value, `None` when blank.
pub fn month_key(value: &str) -> Option<String> {
    let v = value.trim();
    if v.is_empty() {
        return None;
    }
    Some(v.chars().take(7).collect())
}

/// Leading four-digit year of a date-like value.
pub fn year_of(value: &str) -> Option<i32> {
    let head: String = value.trim().chars().take(4).collect();
    if head.len() != 4 || !head.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    head.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn suffix_after_last_separator() {
        assert_eq!(suffix_key("AB-123456"), "123456");
        assert_eq!(suffix_key("  X-Y-0042 "), "0042");
        assert_eq!(suffix_key("123456"), "123456");
        assert_eq!(suffix_key("ABC-"), "");
    }

    #[test]
    fn full_only_trims() {
        assert_eq!(full_key("  ab-12 "), "ab-12");
        assert_eq!(KeyForm::Full.apply(" 7 "), "7");
        assert_eq!(KeyForm::Suffix.apply("Z-7"), "7");
    }

    #[test]
    fn unmatched_spellings() {
        for v in ["", "  ", "No Encontrado", "no encontrado", "NOT FOUND", "Not Found", "nan", "NaN"] {
            assert!(is_unmatched(v), "{v:?} should be unmatched");
        }
        assert!(!is_unmatched("2025-11"));
        assert!(!is_unmatched("RENOVADA"));
    }

    #[test]
    fn month_and_year() {
        assert_eq!(month_key("2025-11-30").as_deref(), Some("2025-11"));
        assert_eq!(month_key("2025-11").as_deref(), Some("2025-11"));
        assert_eq!(month_key("2025").as_deref(), Some("2025"));
        assert_eq!(month_key("   "), None);
        assert_eq!(year_of("2026-01-15"), Some(2026));
        assert_eq!(year_of("26-01-15"), None);
        assert_eq!(year_of(""), None);
    }

    proptest! {
        #[test]
        fn full_key_idempotent(s in "\\PC{0,24}") {
            let once = full_key(&s);
            prop_assert_eq!(full_key(&once), once);
        }

        #[test]
        fn suffix_key_idempotent(s in "[ A-Z0-9-]{0,24}") {
            let once = suffix_key(&s);
            prop_assert_eq!(suffix_key(&once), once.clone());
            prop_assert!(!once.contains('-'));
        }
    }
}
