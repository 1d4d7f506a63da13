//! Cell-text lexing for the two row shapes on the results page.

use regex::Regex;
use std::sync::LazyLock;

// "Repeat Attempt [ MAT112δ - Mathematics ]" — \S+ rather than \w+ so the
// Greek credit suffixes in subject codes are matched.
static REPEAT_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Repeat Attempt \[\s*(\S+)\s*-\s*(.+?)\s*\]").unwrap());

/// Extracts the subject code from an ordinary row's first cell.
///
/// The cell holds either the bare code (`"AMT1232"`) or a four-token string
/// whose last token is the code (`"1 SC 2020 AMT1232"`). Returns `None` for
/// an empty cell.
pub fn parse_subject_code(cell_text: &str) -> Option<&str> {
    let parts: Vec<&str> = cell_text.split_whitespace().collect();
    if parts.len() > 3 {
        Some(parts[3])
    } else {
        parts.first().copied()
    }
}

/// Extracts the subject code and name from a repeat-attempt row header.
///
/// Returns `None` when the cell is not shaped like a repeat header; the
/// caller treats that as a row to skip, not an error.
pub fn parse_repeat_header(cell_text: &str) -> Option<(&str, &str)> {
    let caps = REPEAT_HEADER.captures(cell_text)?;
    match (caps.get(1), caps.get(2)) {
        (Some(code), Some(name)) => Some((code.as_str(), name.as_str())),
        _ => None,
    }
}

/// Parses the leading digit run of a year cell.
///
/// The portal sometimes renders years as `2020/21`; only the leading digits
/// count. A cell with no leading digits yields `None` and the row is dropped.
pub fn parse_year(cell_text: &str) -> Option<i32> {
    let digits: String = cell_text
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_code_from_multi_token_cell() {
        assert_eq!(parse_subject_code("1  SC  2020  AMT1232"), Some("AMT1232"));
        assert_eq!(
            parse_subject_code("  1   SC   2020   PHY2013  "),
            Some("PHY2013")
        );
    }

    #[test]
    fn test_subject_code_from_bare_cell() {
        assert_eq!(parse_subject_code("AMT1232"), Some("AMT1232"));
        assert_eq!(parse_subject_code("  CHE1013 "), Some("CHE1013"));
    }

    #[test]
    fn test_subject_code_empty_cell() {
        assert_eq!(parse_subject_code(""), None);
        assert_eq!(parse_subject_code("   "), None);
    }

    #[test]
    fn test_repeat_header_parses_code_and_name() {
        let parsed = parse_repeat_header("Repeat Attempt [ AMT1232 - Applied Mathematics ]");
        assert_eq!(parsed, Some(("AMT1232", "Applied Mathematics")));
    }

    #[test]
    fn test_repeat_header_tolerates_greek_suffix() {
        let parsed = parse_repeat_header("Repeat Attempt [ MAT112\u{03B4} - Mathematics I ]");
        assert_eq!(parsed, Some(("MAT112\u{03B4}", "Mathematics I")));
    }

    #[test]
    fn test_repeat_header_rejects_other_text() {
        assert_eq!(parse_repeat_header("Some random text"), None);
        assert_eq!(parse_repeat_header(""), None);
    }

    #[test]
    fn test_year_leading_digits() {
        assert_eq!(parse_year("2020"), Some(2020));
        assert_eq!(parse_year(" 2020/21 "), Some(2020));
        assert_eq!(parse_year(""), None);
        assert_eq!(parse_year("n/a"), None);
    }
}
