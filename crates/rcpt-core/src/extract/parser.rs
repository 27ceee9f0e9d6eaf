//! Text parser dispatching to per-field extractors.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use tracing::debug;

use super::{FieldExtractor, FieldKind};
use crate::error::ExtractionError;
use crate::models::config::ExtractionConfig;
use crate::models::receipt::{FieldMatch, ParsedText, VerboseReport};
use crate::extract::rules::{AmountParser, DateParser};

/// Runs every configured extractor over the same text.
#[derive(Clone)]
pub struct TextParser {
    extractors: Vec<Arc<dyn FieldExtractor>>,
    verbose: bool,
}

impl TextParser {
    /// Create a parser extracting `amount` and `date` with default settings.
    pub fn new() -> Self {
        Self {
            extractors: vec![Arc::new(AmountParser::new()), Arc::new(DateParser::new())],
            verbose: false,
        }
    }

    /// Create a parser from explicit extractors; none means the defaults.
    pub fn from_extractors(extractors: Vec<Arc<dyn FieldExtractor>>) -> Self {
        if extractors.is_empty() {
            return Self::new();
        }
        Self {
            extractors,
            verbose: false,
        }
    }

    pub fn from_config(config: &ExtractionConfig) -> Result<Self, ExtractionError> {
        let extractors = config
            .fields
            .iter()
            .map(|field| field.extractor(config))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::from_extractors(extractors).with_verbose(config.verbose))
    }

    /// Add an extractor; one with the same name replaces the earlier one.
    pub fn with_extractor(mut self, extractor: impl FieldExtractor + 'static) -> Self {
        self.extractors.retain(|e| e.name() != extractor.name());
        self.extractors.push(Arc::new(extractor));
        self
    }

    /// Include intermediate results under `verbose`.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.extractors.iter().map(|e| e.name()).collect()
    }

    pub fn parse(&self, text: &str) -> ParsedText {
        let start = Instant::now();
        let mut fields = BTreeMap::new();
        let mut reports = BTreeMap::new();

        for extractor in &self.extractors {
            let report = extractor.extract(text);
            fields.insert(extractor.name().to_string(), report.matched.clone());
            if self.verbose {
                reports.insert(extractor.name().to_string(), report);
            }
        }

        debug!(
            "Parsed {} fields ({} found) in {:?}",
            fields.len(),
            fields.values().filter(|m: &&FieldMatch| m.is_found()).count(),
            start.elapsed()
        );

        ParsedText {
            fields,
            verbose: self.verbose.then(|| VerboseReport {
                text: text.to_string(),
                fields: reports,
            }),
        }
    }

    /// Parse raw bytes, which must be UTF-8.
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<ParsedText, ExtractionError> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| ExtractionError::InvalidInput(format!("text is not UTF-8: {e}")))?;
        Ok(self.parse(text))
    }
}

impl Default for TextParser {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TextParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextParser")
            .field("fields", &self.field_names())
            .field("verbose", &self.verbose)
            .finish()
    }
}

impl From<FieldKind> for TextParser {
    fn from(field: FieldKind) -> Self {
        let extractor: Arc<dyn FieldExtractor> = match field {
            FieldKind::Amount => Arc::new(AmountParser::new()),
            FieldKind::Date => Arc::new(DateParser::new()),
        };
        Self::from_extractors(vec![extractor])
    }
}
