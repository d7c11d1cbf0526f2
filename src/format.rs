//! Display formatting for the fixed-width console reports.
//!
//! The registry stores dates as `YYYYMMDD` strings and times as `HHMMSS`
//! strings, both produced by the database's own date formatting. Everything
//! here maps those raw encodings (and the fixed code columns) to the labels
//! the reports print.

use crate::constants;

/// Format a `YYYYMMDD` string as `YYYY年MM月DD日`.
///
/// Falls back to the raw value when the string is too short to slice.
pub fn kanji_date(value: &str) -> String {
    match (value.get(0..4), value.get(4..6), value.get(6..8)) {
        (Some(y), Some(m), Some(d)) => format!("{y}年{m}月{d}日"),
        _ => value.to_string(),
    }
}

/// Format a birth-date column. Empty, null, or short values render the
/// unknown-birth-date sentinel.
pub fn birth_date(value: Option<&str>) -> String {
    match value {
        Some(d) if d.len() >= 8 => kanji_date(d),
        _ => constants::SENTINEL_UNKNOWN_BIRTH.to_string(),
    }
}

/// Format an `HHMMSS` reception time as `HH:MM:SS`.
///
/// Strings shorter than six characters print as-is; null or empty values
/// render the unset sentinel.
pub fn clock_time(value: Option<&str>) -> String {
    match value {
        Some(t) if t.len() >= 6 => match (t.get(0..2), t.get(2..4), t.get(4..6)) {
            (Some(h), Some(m), Some(s)) => format!("{h}:{m}:{s}"),
            _ => t.to_string(),
        },
        Some(t) if !t.is_empty() => t.to_string(),
        _ => constants::SENTINEL_UNSET.to_string(),
    }
}

/// Format a `YYYYMMDD` visit date as `YYYY/MM/DD` for the recent-visit log.
pub fn slash_date(value: Option<&str>) -> String {
    match value {
        Some(d) if !d.is_empty() => match (d.get(0..4), d.get(4..6), d.get(6..8)) {
            (Some(y), Some(m), Some(dd)) => format!("{y}/{m}/{dd}"),
            _ => d.to_string(),
        },
        _ => constants::SENTINEL_UNSET.to_string(),
    }
}

/// Map a sex code to its display label.
pub fn sex_label(code: Option<&str>) -> &'static str {
    match code.map(str::trim) {
        Some("1") => constants::LABEL_MALE,
        Some("2") => constants::LABEL_FEMALE,
        _ => constants::SENTINEL_UNKNOWN,
    }
}

/// Map a death-status code to alive/deceased. The registry stores a blank
/// char(1) for living patients.
pub fn life_status(code: Option<&str>) -> &'static str {
    match code {
        Some(c) if !c.trim().is_empty() => constants::LABEL_DECEASED,
        _ => constants::LABEL_ALIVE,
    }
}

/// Map a department code to its display name.
///
/// A code absent from the lookup renders as the raw code; a null or blank
/// code renders as `missing` (the table and the statistics breakdown use
/// different sentinels for that case).
pub fn department_label(code: Option<&str>, missing: &'static str) -> String {
    match code.map(str::trim).filter(|c| !c.is_empty()) {
        Some(c) => constants::DEPARTMENT_NAMES
            .iter()
            .find(|(k, _)| *k == c)
            .map_or_else(|| c.to_string(), |(_, name)| (*name).to_string()),
        None => missing.to_string(),
    }
}

/// Truncate a field to `width` characters, marking the cut with `...`.
///
/// Counts characters, not bytes, so CJK names truncate correctly. The result
/// never exceeds `width` characters.
pub fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() > width {
        let kept: String = value.chars().take(width.saturating_sub(3)).collect();
        format!("{kept}...")
    } else {
        value.to_string()
    }
}

/// First non-empty option, or the given sentinel.
pub fn or_sentinel<'a>(value: Option<&'a str>, sentinel: &'a str) -> &'a str {
    value.filter(|s| !s.is_empty()).unwrap_or(sentinel)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_birth_date_eight_digits() {
        assert_eq!(birth_date(Some("19850417")), "1985年04月17日");
    }

    #[test]
    fn test_birth_date_missing() {
        assert_eq!(birth_date(None), "生年月日不明");
        assert_eq!(birth_date(Some("")), "生年月日不明");
        assert_eq!(birth_date(Some("1985")), "生年月日不明");
    }

    #[test]
    fn test_clock_time_full() {
        assert_eq!(clock_time(Some("093000")), "09:30:00");
        assert_eq!(clock_time(Some("235959")), "23:59:59");
    }

    #[test]
    fn test_clock_time_short_prints_raw() {
        assert_eq!(clock_time(Some("0930")), "0930");
    }

    #[test]
    fn test_clock_time_missing() {
        assert_eq!(clock_time(None), "未設定");
        assert_eq!(clock_time(Some("")), "未設定");
    }

    #[test]
    fn test_slash_date() {
        assert_eq!(slash_date(Some("20240115")), "2024/01/15");
        assert_eq!(slash_date(None), "未設定");
        assert_eq!(slash_date(Some("")), "未設定");
    }

    #[test]
    fn test_sex_label() {
        assert_eq!(sex_label(Some("1")), "男性");
        assert_eq!(sex_label(Some("2")), "女性");
        assert_eq!(sex_label(Some("9")), "不明");
        assert_eq!(sex_label(None), "不明");
    }

    #[test]
    fn test_life_status() {
        assert_eq!(life_status(Some("1")), "死亡");
        assert_eq!(life_status(Some(" ")), "生存");
        assert_eq!(life_status(Some("")), "生存");
        assert_eq!(life_status(None), "生存");
    }

    #[test]
    fn test_department_known_code() {
        assert_eq!(department_label(Some("01"), "未設定"), "内科");
        assert_eq!(department_label(Some("02"), "未設定"), "外科");
    }

    #[test]
    fn test_department_unmapped_code_prints_raw() {
        assert_eq!(department_label(Some("99"), "未設定"), "99");
    }

    #[test]
    fn test_department_missing_uses_given_sentinel() {
        // The visit table and the statistics breakdown use different labels
        // for an absent code.
        assert_eq!(department_label(None, "未設定"), "未設定");
        assert_eq!(department_label(Some("  "), "不明"), "不明");
    }

    #[test]
    fn test_truncate_long_name() {
        let long = "a".repeat(25);
        let out = truncate(&long, 18);
        assert_eq!(out.chars().count(), 18);
        assert!(out.ends_with("..."));
    }

    #[test]
    fn test_truncate_cjk_counts_chars() {
        let name = "あ".repeat(20);
        let out = truncate(&name, 18);
        assert_eq!(out.chars().count(), 18);
        assert!(out.ends_with("..."));
    }

    #[test]
    fn test_truncate_short_untouched() {
        assert_eq!(truncate("田中太郎", 18), "田中太郎");
    }

    #[test]
    fn test_or_sentinel() {
        assert_eq!(or_sentinel(Some("田中"), "名前なし"), "田中");
        assert_eq!(or_sentinel(Some(""), "名前なし"), "名前なし");
        assert_eq!(or_sentinel(None, "名前なし"), "名前なし");
    }
}
