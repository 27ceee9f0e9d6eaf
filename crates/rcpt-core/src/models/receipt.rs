//! Extraction results for a piece of receipt text.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};

use crate::extract::rules::{AmountCandidate, DateCandidate};

/// Best value for one field, or nothing.
///
/// Serializes as the matched string, or `false` when nothing was found.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldMatch(pub Option<String>);

impl FieldMatch {
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn is_found(&self) -> bool {
        self.0.is_some()
    }
}

impl From<Option<String>> for FieldMatch {
    fn from(value: Option<String>) -> Self {
        FieldMatch(value)
    }
}

impl Serialize for FieldMatch {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match &self.0 {
            Some(text) => serializer.serialize_str(text),
            None => serializer.serialize_bool(false),
        }
    }
}

/// One candidate as reported in verbose output.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Candidate {
    Amount(AmountCandidate),
    Date(DateCandidate),
    /// Candidates from caller-supplied extractors.
    Other(serde_json::Value),
}

/// Everything one extractor saw while extracting its field.
#[derive(Debug, Clone, Serialize)]
pub struct FieldReport {
    /// Text the extractor actually scanned, after its own normalization.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalized_text: Option<String>,

    /// Candidates the deciding strategy chose from.
    pub matches: Vec<Candidate>,

    #[serde(rename = "match")]
    pub matched: FieldMatch,
}

impl FieldReport {
    pub fn new(matched: Option<String>) -> Self {
        Self {
            normalized_text: None,
            matches: Vec::new(),
            matched: FieldMatch(matched),
        }
    }
}

/// Intermediate results, keyed by field name.
#[derive(Debug, Clone, Serialize)]
pub struct VerboseReport {
    /// Input text as received.
    pub text: String,

    #[serde(flatten)]
    pub fields: BTreeMap<String, FieldReport>,
}

/// Result of parsing one text.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParsedText {
    #[serde(flatten)]
    pub fields: BTreeMap<String, FieldMatch>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub verbose: Option<VerboseReport>,
}

impl ParsedText {
    /// Matched value of a field, if the field ran and found something.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(FieldMatch::as_deref)
    }

    pub fn amount(&self) -> Option<&str> {
        self.get("amount")
    }

    pub fn date(&self) -> Option<&str> {
        self.get("date")
    }
}
