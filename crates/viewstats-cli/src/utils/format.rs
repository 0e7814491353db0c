use chrono::NaiveDate;

/// Truncate a string to a maximum number of characters, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format an optional string, returning a default if None
pub fn format_optional(value: Option<&str>, default: &str) -> String {
    value.unwrap_or(default).to_string()
}

/// One decimal place, e.g. `37.5%`
pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}

/// Dates as `dd.mm.yyyy`, comma separated. Shows at most `limit` dates and
/// counts the rest.
pub fn format_dates(dates: &[NaiveDate], limit: usize) -> String {
    if dates.is_empty() {
        return "-".to_string();
    }
    let shown: Vec<String> = dates
        .iter()
        .take(limit)
        .map(|d| d.format("%d.%m.%Y").to_string())
        .collect();
    let hidden = dates.len().saturating_sub(limit);
    if hidden == 0 {
        shown.join(", ")
    } else {
        format!("{} (+{} more)", shown.join(", "), hidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
        assert_eq!(truncate_string("Привет мир", 7), "Прив...");
    }

    #[test]
    fn test_format_optional() {
        assert_eq!(format_optional(Some("x"), "-"), "x");
        assert_eq!(format_optional(None, "-"), "-");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(37.5), "37.5%");
        assert_eq!(format_percent(100.0), "100.0%");
    }

    #[test]
    fn test_format_dates() {
        let d = |day| NaiveDate::from_ymd_opt(2024, 9, day).expect("valid date");
        assert_eq!(format_dates(&[], 3), "-");
        assert_eq!(format_dates(&[d(1), d(2)], 3), "01.09.2024, 02.09.2024");
        assert_eq!(format_dates(&[d(1), d(2), d(3)], 1), "01.09.2024 (+2 more)");
    }
}
