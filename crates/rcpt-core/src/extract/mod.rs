//! Receipt field extraction module.

mod parser;
pub mod rules;

pub use parser::TextParser;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ExtractionError;
use crate::models::config::ExtractionConfig;
use crate::models::receipt::{Candidate, FieldMatch, FieldReport};
use rules::{AmountParser, DateParser};

/// Trait for field extractors run by [`TextParser`].
pub trait FieldExtractor: Send + Sync {
    /// Key the field appears under in the output.
    fn name(&self) -> &str;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> FieldReport;
}

/// Built-in fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Amount,
    Date,
}

impl FieldKind {
    pub const ALL: [FieldKind; 2] = [FieldKind::Amount, FieldKind::Date];

    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::Amount => "amount",
            FieldKind::Date => "date",
        }
    }

    /// Build this field's extractor from configuration.
    pub fn extractor(
        self,
        config: &ExtractionConfig,
    ) -> Result<Arc<dyn FieldExtractor>, ExtractionError> {
        let extractor: Arc<dyn FieldExtractor> = match self {
            FieldKind::Amount => Arc::new(AmountParser::from_config(&config.amount)?),
            FieldKind::Date => Arc::new(DateParser::from_config(&config.date)),
        };
        Ok(extractor)
    }
}

impl FromStr for FieldKind {
    type Err = ExtractionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ExtractionError::UnknownField(s.to_string()))
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FieldExtractor for AmountParser {
    fn name(&self) -> &str {
        FieldKind::Amount.as_str()
    }

    fn extract(&self, text: &str) -> FieldReport {
        let result = self.parse(text);
        FieldReport {
            normalized_text: Some(result.normalized_text),
            matches: result.matches.into_iter().map(Candidate::Amount).collect(),
            matched: FieldMatch(result.matched),
        }
    }
}

impl FieldExtractor for DateParser {
    fn name(&self) -> &str {
        FieldKind::Date.as_str()
    }

    fn extract(&self, text: &str) -> FieldReport {
        let result = self.parse(text);
        FieldReport {
            normalized_text: Some(result.normalized_text),
            matches: result.matches.into_iter().map(Candidate::Date).collect(),
            matched: FieldMatch(result.matched),
        }
    }
}

type ExtractFn = dyn Fn(&str) -> FieldReport + Send + Sync;

/// Extractor backed by a caller-supplied closure.
///
/// Any configuration the closure needs is captured by it.
pub struct FnExtractor {
    name: String,
    extract: Box<ExtractFn>,
}

impl FnExtractor {
    pub fn new<F>(name: impl Into<String>, extract: F) -> Self
    where
        F: Fn(&str) -> FieldReport + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            extract: Box::new(extract),
        }
    }
}

impl FieldExtractor for FnExtractor {
    fn name(&self) -> &str {
        &self.name
    }

    fn extract(&self, text: &str) -> FieldReport {
        (self.extract)(text)
    }
}

impl fmt::Debug for FnExtractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnExtractor")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_names() {
        assert_eq!("amount".parse::<FieldKind>().unwrap(), FieldKind::Amount);
        assert_eq!(" Date ".parse::<FieldKind>().unwrap(), FieldKind::Date);

        let err = "vendor".parse::<FieldKind>().unwrap_err();
        assert_eq!(err.to_string(), "unknown field: vendor");
    }

    #[test]
    fn test_builtin_extractors_report_candidates() {
        let config = ExtractionConfig::default();

        let amount = FieldKind::Amount.extractor(&config).unwrap();
        let report = amount.extract("Total $12.00\n$3.00");
        assert_eq!(amount.name(), "amount");
        assert_eq!(report.matched.as_deref(), Some("12.00"));
        assert_eq!(report.matches.len(), 1);
        assert!(matches!(report.matches[0], Candidate::Amount(_)));

        let date = FieldKind::Date.extractor(&config).unwrap();
        let report = date.extract("Mar 30 2016");
        assert_eq!(date.name(), "date");
        assert_eq!(report.matched.as_deref(), Some("2016-03-30"));
        assert!(matches!(report.matches[0], Candidate::Date(_)));
    }

    #[test]
    fn test_empty_amount_chain_fails_construction() {
        let mut config = ExtractionConfig::default();
        config.amount.strategies.clear();

        assert!(matches!(
            FieldKind::Amount.extractor(&config),
            Err(ExtractionError::NoStrategies(_))
        ));
    }

    #[test]
    fn test_fn_extractor() {
        let keyword = "VOID".to_string();
        let extractor = FnExtractor::new("void", move |text: &str| {
            FieldReport::new(text.contains(&keyword).then(|| "yes".to_string()))
        });

        assert_eq!(extractor.name(), "void");
        assert_eq!(extractor.extract("** VOID **").matched.as_deref(), Some("yes"));
        assert_eq!(extractor.extract("paid").matched.as_deref(), None);
    }
}
