//! Calendar phrase recognition.
//!
//! A [`DateRecognizer`] reports every span of text that reads as a calendar
//! date, together with which of day, month and year were actually printed.
//! [`PatternRecognizer`] covers the numeric and month-name layouts found on
//! English and Spanish receipts.

use std::fmt;
use std::str::FromStr;

use chrono::Datelike;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use super::patterns::{
    month_number, parse_year, DATE_ISO, DATE_MONTH_NAME_LITTLE, DATE_MONTH_NAME_MIDDLE,
    DATE_SLASH, DATE_SLASH_YEAR_FIRST, DATE_SPANISH_LITTLE,
};
use super::token_matches;
use crate::error::ExtractionError;

/// Which date components were printed rather than inferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Certainty {
    pub day: bool,
    pub month: bool,
    pub year: bool,
}

impl Certainty {
    pub const ALL: Certainty = Certainty {
        day: true,
        month: true,
        year: true,
    };

    pub fn is_complete(&self) -> bool {
        self.day && self.month && self.year
    }
}

/// A date-looking span as read by a recognizer.
///
/// Components are reported as read: a literal `00` day comes through as 0,
/// and an unprinted year carries the recognizer's reference year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognizedDate {
    /// Byte offset of the span.
    pub index: usize,
    pub text: String,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub certainty: Certainty,
}

impl RecognizedDate {
    pub fn end(&self) -> usize {
        self.index + self.text.len()
    }
}

/// Finds calendar phrases in text.
pub trait DateRecognizer: Send + Sync {
    /// All occurrences, ordered by position.
    fn recognize(&self, text: &str) -> Vec<RecognizedDate>;
}

/// Date layouts understood by [`PatternRecognizer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateFormat {
    /// `2016-02-04`, optionally followed by a time.
    Iso,
    /// `04/06/2016`, `4-6-16`, `30.12.16`; month first unless that cannot be.
    Slash,
    /// `2016/02/04`, `2016.02.04`.
    SlashYearFirst,
    /// `Mar 05 2016`, `March 5th, 2016`.
    MonthNameMiddleEndian,
    /// `30 June 2016`, `5th of May 16`.
    MonthNameLittleEndian,
    /// `30 de junio de 2016`, `5 ene 2016`.
    SpanishLittleEndian,
}

impl DateFormat {
    pub const ALL: [DateFormat; 6] = [
        DateFormat::Iso,
        DateFormat::Slash,
        DateFormat::SlashYearFirst,
        DateFormat::MonthNameMiddleEndian,
        DateFormat::MonthNameLittleEndian,
        DateFormat::SpanishLittleEndian,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DateFormat::Iso => "iso",
            DateFormat::Slash => "slash",
            DateFormat::SlashYearFirst => "slash_year_first",
            DateFormat::MonthNameMiddleEndian => "month_name_middle_endian",
            DateFormat::MonthNameLittleEndian => "month_name_little_endian",
            DateFormat::SpanishLittleEndian => "spanish_little_endian",
        }
    }

    fn pattern(self) -> &'static Regex {
        match self {
            DateFormat::Iso => &DATE_ISO,
            DateFormat::Slash => &DATE_SLASH,
            DateFormat::SlashYearFirst => &DATE_SLASH_YEAR_FIRST,
            DateFormat::MonthNameMiddleEndian => &DATE_MONTH_NAME_MIDDLE,
            DateFormat::MonthNameLittleEndian => &DATE_MONTH_NAME_LITTLE,
            DateFormat::SpanishLittleEndian => &DATE_SPANISH_LITTLE,
        }
    }
}

impl FromStr for DateFormat {
    type Err = ExtractionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|format| format.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ExtractionError::UnknownFormat(s.to_string()))
    }
}

impl fmt::Display for DateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Regex-driven recognizer over a fixed set of [`DateFormat`]s.
#[derive(Debug, Clone)]
pub struct PatternRecognizer {
    formats: Vec<DateFormat>,
    reference_year: i32,
}

impl PatternRecognizer {
    /// Recognize every supported format; missing years default to this year.
    pub fn new() -> Self {
        Self {
            formats: DateFormat::ALL.to_vec(),
            reference_year: chrono::Local::now().year(),
        }
    }

    pub fn with_formats(mut self, formats: impl IntoIterator<Item = DateFormat>) -> Self {
        self.formats = formats.into_iter().collect();
        self
    }

    /// Year assumed when the text does not print one.
    pub fn with_reference_year(mut self, year: i32) -> Self {
        self.reference_year = year;
        self
    }

    pub fn formats(&self) -> &[DateFormat] {
        &self.formats
    }

    fn read(&self, format: DateFormat, caps: &Captures<'_>) -> Option<RecognizedDate> {
        let body = caps.name("body")?;
        let number = |name: &str| caps.name(name).and_then(|m| m.as_str().parse::<u32>().ok());
        let printed_year = caps.name("year").and_then(|m| parse_year(m.as_str()));

        let (day, month) = match format {
            DateFormat::Iso | DateFormat::SlashYearFirst => (number("day")?, number("month")?),
            DateFormat::Slash => {
                let (month, day) = month_first(number("first")?, number("second")?)?;
                (day, month)
            }
            DateFormat::MonthNameMiddleEndian
            | DateFormat::MonthNameLittleEndian
            | DateFormat::SpanishLittleEndian => {
                (number("day")?, month_number(caps.name("month")?.as_str())?)
            }
        };

        if !(1..=12).contains(&month) || day > 31 {
            return None;
        }

        Some(RecognizedDate {
            index: body.start(),
            text: body.as_str().to_string(),
            year: printed_year.unwrap_or(self.reference_year),
            month,
            day,
            certainty: Certainty {
                day: true,
                month: true,
                year: printed_year.is_some(),
            },
        })
    }
}

impl Default for PatternRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl DateRecognizer for PatternRecognizer {
    fn recognize(&self, text: &str) -> Vec<RecognizedDate> {
        let mut found: Vec<RecognizedDate> = self
            .formats
            .iter()
            .flat_map(|&format| {
                token_matches(format.pattern(), text)
                    .filter_map(|caps| self.read(format, &caps))
                    .collect::<Vec<_>>()
            })
            .collect();

        found.sort_by_key(|date| date.index);
        remove_overlaps(found)
    }
}

/// Read `a/b` as month/day, or as day/month when `a` cannot be a month.
/// Numeric layouts never yield a zero day.
fn month_first(a: u32, b: u32) -> Option<(u32, u32)> {
    let (month, day) = if a > 12 {
        if (13..=31).contains(&a) && (1..=12).contains(&b) {
            (b, a)
        } else {
            return None;
        }
    } else {
        (a, b)
    };

    if day == 0 { None } else { Some((month, day)) }
}

/// Among overlapping spans keep the longer one; the earlier one wins ties.
fn remove_overlaps(sorted: Vec<RecognizedDate>) -> Vec<RecognizedDate> {
    let mut kept: Vec<RecognizedDate> = Vec::with_capacity(sorted.len());

    for date in sorted {
        match kept.last_mut() {
            Some(last) if date.index < last.end() => {
                if date.text.len() > last.text.len() {
                    *last = date;
                }
            }
            _ => kept.push(date),
        }
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn recognizer() -> PatternRecognizer {
        PatternRecognizer::new().with_reference_year(2020)
    }

    /// First fully printed date as `YYYY-MM-DD`.
    fn first_date(text: &str) -> Option<String> {
        recognizer()
            .recognize(text)
            .into_iter()
            .find(|d| d.certainty.is_complete())
            .map(|d| format!("{:04}-{:02}-{:02}", d.year, d.month, d.day))
    }

    #[test]
    fn test_month_name_middle_endian() {
        assert_eq!(first_date("Mar 30 2016").as_deref(), Some("2016-03-30"));
        assert_eq!(first_date("Mar/05/2016").as_deref(), Some("2016-03-05"));
        assert_eq!(first_date("March 5th, 2016").as_deref(), Some("2016-03-05"));
    }

    #[test]
    fn test_numeric_month_first() {
        assert_eq!(first_date("4/6/2016").as_deref(), Some("2016-04-06"));
        assert_eq!(first_date("4/06/2016").as_deref(), Some("2016-04-06"));
        assert_eq!(first_date("04/06/2016").as_deref(), Some("2016-04-06"));
    }

    #[test]
    fn test_iso_with_time() {
        assert_eq!(first_date("2016-02-04T20:25:01").as_deref(), Some("2016-02-04"));
        assert_eq!(first_date("2016-02-04 20:25:01").as_deref(), Some("2016-02-04"));
        assert_eq!(first_date("2016-02-04T20:25:01.250Z").as_deref(), Some("2016-02-04"));
    }

    #[test]
    fn test_two_digit_years_either_order() {
        assert_eq!(first_date("12-30-16").as_deref(), Some("2016-12-30"));
        assert_eq!(first_date("30-12-16").as_deref(), Some("2016-12-30"));
        assert_eq!(first_date("Friday 12-30-16").as_deref(), Some("2016-12-30"));
        assert_eq!(first_date("Friday, 30-12-16,").as_deref(), Some("2016-12-30"));
        assert_eq!(first_date("Viernes, 30-12-16,").as_deref(), Some("2016-12-30"));
    }

    #[test]
    fn test_dotted_dates() {
        assert_eq!(first_date("12.30.16").as_deref(), Some("2016-12-30"));
        assert_eq!(first_date("30.12.16").as_deref(), Some("2016-12-30"));
        assert_eq!(first_date("12.30.2016").as_deref(), Some("2016-12-30"));
        assert_eq!(first_date("30.12.2016").as_deref(), Some("2016-12-30"));
    }

    #[test]
    fn test_year_first_slashes() {
        assert_eq!(first_date("2016/02/04").as_deref(), Some("2016-02-04"));
        assert_eq!(first_date("on 2016.02.04.").as_deref(), Some("2016-02-04"));
    }

    #[test]
    fn test_month_name_little_endian() {
        assert_eq!(first_date("30 June 2016").as_deref(), Some("2016-06-30"));
        assert_eq!(first_date("5th of May 16").as_deref(), Some("2016-05-05"));
    }

    #[test]
    fn test_spanish_little_endian() {
        assert_eq!(first_date("30 de junio de 2016").as_deref(), Some("2016-06-30"));
        assert_eq!(first_date("5 ene 2016").as_deref(), Some("2016-01-05"));
        assert_eq!(first_date("1 dic. 2015").as_deref(), Some("2015-12-01"));
    }

    #[test]
    fn test_colon_before_and_after() {
        assert_eq!(first_date("Date:02/05/2016").as_deref(), Some("2016-02-05"));
        assert_eq!(first_date("Date:2016-02-04").as_deref(), Some("2016-02-04"));
        assert_eq!(first_date("Fecha:30/12/2016").as_deref(), Some("2016-12-30"));
        assert_eq!(first_date("Date:05 Mar 2016").as_deref(), Some("2016-03-05"));
        assert_eq!(first_date("on 2016/02/04: paid").as_deref(), Some("2016-02-04"));
    }

    #[test]
    fn test_two_digits_before_a_time_are_not_a_year() {
        let found = recognizer().recognize("5 May 12:30");

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text, "5 May");
        assert!(!found[0].certainty.year);
    }

    #[test]
    fn test_partial_dates_are_uncertain() {
        for text in ["06-13", "Feb 15", "30 June"] {
            let found = recognizer().recognize(text);
            assert_eq!(found.len(), 1, "{text}");
            assert!(!found[0].certainty.year, "{text}");
            assert_eq!(found[0].year, 2020);
        }
    }

    #[test]
    fn test_nothing_date_like() {
        for text in ["", "date", "2016", "2016-06", "Pay in 60 days", "2016-OB-13", "53-26-90-00"] {
            assert_eq!(first_date(text), None, "{text}");
        }
    }

    #[test]
    fn test_zero_day_reported_as_read() {
        let found = recognizer().recognize("00\n            Feb 15");

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].day, 0);
        assert_eq!(found[0].month, 2);
        assert_eq!(found[0].year, 2015);
        assert!(found[0].certainty.is_complete());
    }

    #[test]
    fn test_results_ordered_by_position() {
        let found = recognizer().recognize("Date: 02/05/2016 Purchased: Feb 01 2016\n2016-02-07");
        let texts: Vec<_> = found.iter().map(|d| d.text.as_str()).collect();

        assert_eq!(texts, vec!["02/05/2016", "Feb 01 2016", "2016-02-07"]);
    }

    #[test]
    fn test_restricted_formats() {
        let iso_only = recognizer().with_formats([DateFormat::Iso]);

        assert_eq!(iso_only.formats(), &[DateFormat::Iso]);
        assert!(iso_only.recognize("Mar 30 2016").is_empty());
        assert_eq!(iso_only.recognize("2016-03-30").len(), 1);
    }

    #[test]
    fn test_format_names() {
        assert_eq!("iso".parse::<DateFormat>().unwrap(), DateFormat::Iso);
        assert_eq!(
            "spanish_little_endian".parse::<DateFormat>().unwrap(),
            DateFormat::SpanishLittleEndian
        );
        assert!("julian".parse::<DateFormat>().is_err());
    }
}
