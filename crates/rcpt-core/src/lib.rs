//! Core library for receipt and invoice field extraction.
//!
//! Takes text already decoded by an upstream OCR or PDF stage and picks:
//! - the monetary total (locale-aware, currency-aware, labeled or largest)
//! - the transaction date (OCR-repaired, certain dates only)
//!
//! Everything here is a pure function of its input text and configuration,
//! so a single [`TextParser`] can be shared across threads.

pub mod error;
pub mod models;
pub mod extract;

pub use error::{ExtractionError, RcptError, Result};
pub use models::config::{AmountConfig, DateConfig, ExtractionConfig, RcptConfig};
pub use models::receipt::{Candidate, FieldMatch, FieldReport, ParsedText, VerboseReport};
pub use extract::{FieldExtractor, FieldKind, FnExtractor, TextParser};
pub use extract::rules::{
    AmountCandidate, AmountExtraction, AmountParser, AmountStrategy, AmountStrategyKind,
    Certainty, DateCandidate, DateExtraction, DateFormat, DateParser, DateRecognizer,
    DateStrategy, DateStrategyKind, Locale, PatternRecognizer, RecognizedDate,
};
