//! Common regex patterns for receipt field extraction.

use lazy_static::lazy_static;
use regex::Regex;

/// English and Spanish month names as OCR'd receipts print them.
pub const MONTH_NAMES: &str = concat!(
    r"Jan(?:uary|\.)?|Feb(?:ruary|\.)?|Mar(?:ch|\.)?|Apr(?:il|\.)?|May|Jun(?:e|\.)?",
    r"|Jul(?:y|\.)?|Aug(?:ust|\.)?|Sep(?:tember|\.)?|Oct(?:ober|\.)?|Nov(?:ember|\.)?",
    r"|Dec(?:ember|\.)?",
    r"|Ene(?:ro|\.)?|Feb(?:rero|\.)?|Mar(?:zo|\.)?|Abr(?:il|\.)?|May(?:o|\.)?",
    r"|Jun(?:io|\.)?|Jul(?:io|\.)?|Ago(?:sto|\.)?|Sep(?:tiembre|\.)?|Oct(?:ubre|\.)?",
    r"|Nov(?:iembre|\.)?|Dic(?:iembre|\.)?",
);

const EN_MONTHS: &str = concat!(
    r"jan(?:uary|\.)?|feb(?:ruary|\.)?|mar(?:ch|\.)?|apr(?:il|\.)?|may|jun(?:e|\.)?",
    r"|jul(?:y|\.)?|aug(?:ust|\.)?|sep(?:tember|t\.?|\.)?|oct(?:ober|\.)?",
    r"|nov(?:ember|\.)?|dec(?:ember|\.)?",
);

const ES_MONTHS: &str = concat!(
    r"ene(?:ro|\.)?|feb(?:rero|\.)?|mar(?:zo|\.)?|abr(?:il|\.)?|may(?:o|\.)?",
    r"|jun(?:io|\.)?|jul(?:io|\.)?|ago(?:sto|\.)?|sep(?:tiembre|t\.?|\.)?|set(?:iembre)?",
    r"|oct(?:ubre|\.)?|nov(?:iembre|\.)?|dic(?:iembre|\.)?",
);

/// Label in front of a grand total.
pub const TOTAL_LABEL: &str = r"(?:Total(?: due)?|Balance Due)[^a-z0-9]*";

lazy_static! {
    // OCR repairs applied before date recognition
    pub static ref GARBLED_NUMERIC_DATE: Regex = Regex::new(
        r"(?i)(?P<lead>^|\s)(?P<d>[0-3]?[0-9])[^a-z0-9]{1,2}(?P<m>[0-3]?[0-9])[^a-z0-9]{1,2}(?P<y>[1-9][0-9]{3})(?P<tail>\s|$)"
    ).unwrap();

    pub static ref GLUED_MONTH_DAY: Regex = Regex::new(&format!(
        r"(?i)(?P<lead>^|\s)(?P<month>{months})[^a-z0-9]{{0,2}}(?P<d>[0-3]?[0-9])[^a-z0-9]{{1,2}}(?P<y>[1-9][0-9]{{3}})(?P<tail>\s|$)",
        months = MONTH_NAMES
    )).unwrap();

    pub static ref GLUED_DAY_MONTH: Regex = Regex::new(&format!(
        r"(?i)(?P<lead>^|\s)(?P<d>[0-3]?[0-9])[^a-z0-9]{{1,2}}(?P<month>{months})[^a-z0-9]{{1,2}}(?P<y>[1-9][0-9]{{3}})(?P<tail>\s|$)",
        months = MONTH_NAMES
    )).unwrap();

    pub static ref GARBLED_TIME: Regex = Regex::new(
        r"(?i)T(?P<h>[0-1][0-9]|2[0-4])[^a-z0-9](?P<i>[0-5][0-9])[^a-z0-9](?P<s>[0-5][0-9])(?P<tail>\s|$)"
    ).unwrap();

    // Calendar phrase profile
    pub static ref DATE_ISO: Regex = Regex::new(
        r"(?i)(?:^|[^\p{L}\p{N}./\-])(?P<body>(?P<year>\d{4})-(?P<month>\d{1,2})-(?P<day>\d{1,2})(?:[T\s]\d{1,2}:\d{2}(?::\d{2}(?:\.\d{1,6})?)?(?:Z|[+\-]\d{2}:?\d{2})?)?)(?P<tail>[^\p{L}\p{N}]|$)"
    ).unwrap();

    pub static ref DATE_SLASH: Regex = Regex::new(
        r"(?:^|[^\p{L}\p{N}./\-])(?P<body>(?P<first>\d{1,2})[/.\-](?P<second>\d{1,2})(?:[/.\-](?P<year>\d{4}|\d{2}))?)(?P<tail>[^\p{L}\p{N}/\-:]|:(?:[^\p{N}]|$)|$)"
    ).unwrap();

    pub static ref DATE_SLASH_YEAR_FIRST: Regex = Regex::new(
        r"(?:^|[^\p{L}\p{N}./\-])(?P<body>(?P<year>\d{4})[/.](?P<month>\d{1,2})[/.](?P<day>\d{1,2}))(?P<tail>[^\p{L}\p{N}/\-:]|:(?:[^\p{N}]|$)|$)"
    ).unwrap();

    pub static ref DATE_MONTH_NAME_MIDDLE: Regex = Regex::new(&format!(
        r"(?i)(?:^|[^\p{{L}}])(?P<body>(?P<month>{months})\s*[,/\-]?\s*(?P<day>\d{{1,2}})(?:st|nd|rd|th)?(?:\s*[,/\-]?\s*(?P<year>\d{{4}}))?)(?P<tail>[^\p{{L}}\p{{N}}:]|$)",
        months = EN_MONTHS
    )).unwrap();

    pub static ref DATE_MONTH_NAME_LITTLE: Regex = Regex::new(&format!(
        r"(?i)(?:^|[^\p{{L}}\p{{N}}./\-])(?P<body>(?P<day>\d{{1,2}})(?:st|nd|rd|th)?(?:\s*of)?\s*[,/\-]?\s*(?P<month>{months})(?:\s*[,/\-]?\s*(?P<year>\d{{4}}|\d{{2}}))?)(?P<tail>[^\p{{L}}\p{{N}}:]|:(?:[^\p{{N}}]|$)|$)",
        months = EN_MONTHS
    )).unwrap();

    pub static ref DATE_SPANISH_LITTLE: Regex = Regex::new(&format!(
        r"(?i)(?:^|[^\p{{L}}\p{{N}}./\-])(?P<body>(?P<day>\d{{1,2}})(?:\s*de)?\s*[,/\-]?\s*(?P<month>{months})(?:\s*(?:del|de)?\s*[,/\-]?\s*(?P<year>\d{{4}}|\d{{2}}))?)(?P<tail>[^\p{{L}}\p{{N}}:]|:(?:[^\p{{N}}]|$)|$)",
        months = ES_MONTHS
    )).unwrap();
}

/// Month number for an English or Spanish month name or abbreviation.
pub fn month_number(name: &str) -> Option<u32> {
    let lower = name.trim_end_matches('.').to_lowercase();
    let month = match lower.get(..3)? {
        "jan" | "ene" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" | "abr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" | "ago" => 8,
        "sep" | "set" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" | "dic" => 12,
        _ => return None,
    };
    Some(month)
}

/// Expand a two-digit year: 00-50 is 2000s, 51-99 is 1900s.
pub fn parse_year(s: &str) -> Option<i32> {
    let year: i32 = s.parse().ok()?;
    if s.len() <= 2 {
        if year <= 50 {
            Some(2000 + year)
        } else {
            Some(1900 + year)
        }
    } else {
        Some(year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_number() {
        assert_eq!(month_number("Mar"), Some(3));
        assert_eq!(month_number("march"), Some(3));
        assert_eq!(month_number("Marzo"), Some(3));
        assert_eq!(month_number("Sept."), Some(9));
        assert_eq!(month_number("setiembre"), Some(9));
        assert_eq!(month_number("Dic."), Some(12));
        assert_eq!(month_number("Ma"), None);
        assert_eq!(month_number("xyz"), None);
    }

    #[test]
    fn test_two_digit_year() {
        assert_eq!(parse_year("16"), Some(2016));
        assert_eq!(parse_year("50"), Some(2050));
        assert_eq!(parse_year("99"), Some(1999));
        assert_eq!(parse_year("2016"), Some(2016));
        assert_eq!(parse_year("O6"), None);
    }

    #[test]
    fn test_total_label_is_case_insensitive() {
        let re = Regex::new(&format!("(?i)^{}$", TOTAL_LABEL)).unwrap();
        assert!(re.is_match("TOTAL: "));
        assert!(re.is_match("total due "));
        assert!(re.is_match("Balance due"));
        assert!(!re.is_match("subtotal"));
    }
}
