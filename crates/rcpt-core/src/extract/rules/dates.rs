//! Date extraction for receipt text.

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::date_strategy::{DateStrategy, DateStrategyKind};
use super::patterns::{GARBLED_NUMERIC_DATE, GARBLED_TIME, GLUED_DAY_MONTH, GLUED_MONTH_DAY};
use super::recognizer::{Certainty, DateRecognizer, PatternRecognizer, RecognizedDate};
use super::replace_tokens;
use crate::models::config::DateConfig;

/// Dash look-alikes OCR produces in place of `-`.
const DASH_VARIANTS: [char; 4] = ['\u{2012}', '\u{2013}', '\u{2014}', '\u{FE58}'];

/// Repair common OCR damage to dates and times.
///
/// - dash look-alikes become `-`
/// - `04|06|2016` becomes `04/06/2016`
/// - `Mar30'2016` becomes `Mar 30 2016`
/// - `01-Jan-2016` becomes `01 Jan 2016`
/// - `T23;59|41` becomes `T23:59:41`
pub fn normalize_date_text(text: &str) -> String {
    let text = text.replace(DASH_VARIANTS, "-");

    let text = replace_tokens(&GARBLED_NUMERIC_DATE, &text, |caps| {
        format!("{}{}/{}/{}", &caps["lead"], &caps["d"], &caps["m"], &caps["y"])
    });
    let text = replace_tokens(&GLUED_MONTH_DAY, &text, |caps| {
        format!("{}{} {} {}", &caps["lead"], &caps["month"], &caps["d"], &caps["y"])
    });
    let text = replace_tokens(&GLUED_DAY_MONTH, &text, |caps| {
        format!("{}{} {} {}", &caps["lead"], &caps["d"], &caps["month"], &caps["y"])
    });

    replace_tokens(&GARBLED_TIME, &text, |caps| {
        format!("T{}:{}:{}", &caps["h"], &caps["i"], &caps["s"])
    })
}

/// A fully printed, valid calendar date found in text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateCandidate {
    /// Date phrase as printed.
    pub text: String,
    pub date: NaiveDate,
    /// Byte span of `text` within the normalized text.
    pub position: (usize, usize),
    pub certainty: Certainty,
}

/// Keep only occurrences that name a real day with every component printed.
pub fn certain_dates(occurrences: Vec<RecognizedDate>) -> Vec<DateCandidate> {
    occurrences
        .into_iter()
        .filter_map(|occurrence| {
            if !occurrence.certainty.is_complete() {
                trace!("Dropping partial date {:?}", occurrence.text);
                return None;
            }
            if occurrence.day == 0 {
                trace!("Dropping zero-day date {:?}", occurrence.text);
                return None;
            }

            let Some(date) =
                NaiveDate::from_ymd_opt(occurrence.year, occurrence.month, occurrence.day)
            else {
                trace!("Dropping impossible date {:?}", occurrence.text);
                return None;
            };

            Some(DateCandidate {
                position: (occurrence.index, occurrence.end()),
                text: occurrence.text,
                date,
                certainty: occurrence.certainty,
            })
        })
        .collect()
}

/// Outcome of date extraction.
#[derive(Debug, Clone, Serialize)]
pub struct DateExtraction {
    /// Text the recognizer ran over.
    pub normalized_text: String,
    pub matches: Vec<DateCandidate>,
    /// Chosen date as `YYYY-MM-DD`.
    #[serde(rename = "match")]
    pub matched: Option<String>,
    pub date: Option<NaiveDate>,
}

/// Date extractor: normalize, recognize, filter, then select.
#[derive(Clone)]
pub struct DateParser {
    recognizer: Arc<dyn DateRecognizer>,
    strategy: Arc<dyn DateStrategy>,
}

impl DateParser {
    pub fn new() -> Self {
        Self {
            recognizer: Arc::new(PatternRecognizer::new()),
            strategy: Arc::new(DateStrategyKind::Earliest),
        }
    }

    pub fn with_strategy(mut self, strategy: impl DateStrategy + 'static) -> Self {
        self.strategy = Arc::new(strategy);
        self
    }

    pub fn with_recognizer(mut self, recognizer: impl DateRecognizer + 'static) -> Self {
        self.recognizer = Arc::new(recognizer);
        self
    }

    /// An empty format list recognizes every built-in format.
    pub fn from_config(config: &DateConfig) -> Self {
        let mut recognizer = PatternRecognizer::new();
        if !config.formats.is_empty() {
            recognizer = recognizer.with_formats(config.formats.iter().copied());
        }
        if let Some(year) = config.reference_year {
            recognizer = recognizer.with_reference_year(year);
        }
        debug!("Recognizing {} date formats", recognizer.formats().len());

        Self::new()
            .with_recognizer(recognizer)
            .with_strategy(config.strategy)
    }

    pub fn strategy_name(&self) -> &str {
        self.strategy.name()
    }

    pub fn parse(&self, text: &str) -> DateExtraction {
        let normalized = normalize_date_text(text);
        let occurrences = self.recognizer.recognize(&normalized);
        let found = occurrences.len();
        let matches = certain_dates(occurrences);

        let date = self.strategy.select(&matches).map(|chosen| chosen.date);
        let matched = date.map(|d| d.format("%Y-%m-%d").to_string());

        debug!(
            "Date {:?} chosen by {} from {} certain of {} recognized",
            matched,
            self.strategy.name(),
            matches.len(),
            found
        );

        DateExtraction {
            normalized_text: normalized,
            matches,
            matched,
            date,
        }
    }
}

impl Default for DateParser {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DateParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DateParser")
            .field("strategy", &self.strategy.name())
            .finish_non_exhaustive()
    }
}
