use std::cmp::Ordering;

use chrono::NaiveDate;

use crate::error::ClubError;

/// Cut `s` to `max_chars` characters, appending "..." if anything was removed.
pub fn truncate_with_ellipsis(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}

/// Case-insensitive ordering, falling back to byte order to stay total.
pub fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

pub fn contains_ignore_case(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

/// Numeric value of a price string such as "$18.50"; unparseable is 0.
pub fn parse_price(price: &str) -> f64 {
    let digits: String = price
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    digits.parse().unwrap_or(0.0)
}

/// Normalise admin price input to "$N.NN".
pub fn normalize_price(raw: &str) -> Result<String, ClubError> {
    let digits: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if digits.is_empty() {
        return Err(ClubError::MissingField("price"));
    }
    let value: f64 = digits
        .parse()
        .map_err(|_| ClubError::InvalidPrice(raw.to_string()))?;
    Ok(format!("${:.2}", value))
}

/// Turn a `YYYY-MM-DD` date input into the table's `M/D/YYYY` form.
/// Empty input stays empty.
pub fn normalize_visit_date(raw: &str) -> Result<String, ClubError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(String::new());
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ClubError::InvalidDate(raw.to_string()))?;
    Ok(date.format("%-m/%-d/%Y").to_string())
}

/// Parse a stored visit date (`M/D/YYYY` or ISO `YYYY-MM-DD`).
pub fn parse_visit_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%m/%d/%Y")
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y-%m-%d"))
        .ok()
}

/// Keep an uploaded file name safe for an object path.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.trim_matches('_').is_empty() {
        "photo".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_with_ellipsis() {
        assert_eq!(truncate_with_ellipsis("Hello", 10), "Hello");
        assert_eq!(truncate_with_ellipsis("Hello World", 5), "Hello...");
        assert_eq!(truncate_with_ellipsis("Crème brûlée", 5), "Crème...");
    }

    #[test]
    fn test_cmp_ignore_case() {
        assert_eq!(cmp_ignore_case("alice", "Bob"), Ordering::Less);
        assert_eq!(cmp_ignore_case("Bob", "bob"), Ordering::Less);
        assert_eq!(cmp_ignore_case("same", "same"), Ordering::Equal);
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("$18.50"), 18.5);
        assert_eq!(parse_price("about $9"), 9.0);
        assert_eq!(parse_price(""), 0.0);
        assert_eq!(parse_price("market price"), 0.0);
    }

    #[test]
    fn test_normalize_price() {
        assert_eq!(normalize_price("18.5").unwrap(), "$18.50");
        assert_eq!(normalize_price("$22").unwrap(), "$22.00");
        assert_eq!(normalize_price(""), Err(ClubError::MissingField("price")));
        assert!(matches!(normalize_price("1.2.3"), Err(ClubError::InvalidPrice(_))));
    }

    #[test]
    fn test_normalize_visit_date() {
        assert_eq!(normalize_visit_date("2024-03-04").unwrap(), "3/4/2024");
        assert_eq!(normalize_visit_date("").unwrap(), "");
        assert!(normalize_visit_date("March 4").is_err());
    }

    #[test]
    fn test_parse_visit_date() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 4);
        assert_eq!(parse_visit_date("3/4/2024"), expected);
        assert_eq!(parse_visit_date("2024-03-04"), expected);
        assert_eq!(parse_visit_date("soon"), None);
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("my burger.jpg"), "my_burger.jpg");
        assert_eq!(sanitize_file_name("../../etc"), ".._.._etc");
        assert_eq!(sanitize_file_name("///"), "photo");
    }
}
