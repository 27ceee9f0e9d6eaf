//! Strategies for picking one amount out of many.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::amounts::{total_scanners, unlabeled_scanners, AmountCandidate, LocaleScanners};
use crate::error::ExtractionError;

/// Selects at most one amount from scanned candidates.
///
/// A strategy also decides which scanners feed it, so a strategy that only
/// trusts labeled amounts can narrow the scan before selecting.
pub trait AmountStrategy: Send + Sync {
    fn name(&self) -> &str;

    fn scanners(&self) -> &LocaleScanners {
        unlabeled_scanners()
    }

    fn select<'a>(&self, candidates: &'a [AmountCandidate]) -> Option<&'a AmountCandidate>;
}

/// Built-in amount strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountStrategyKind {
    /// Largest amount printed after `Total`, `Total due` or `Balance Due`.
    Total,
    /// Largest amount anywhere.
    Largest,
}

impl AmountStrategyKind {
    pub const ALL: [AmountStrategyKind; 2] = [AmountStrategyKind::Total, AmountStrategyKind::Largest];

    pub fn as_str(self) -> &'static str {
        match self {
            AmountStrategyKind::Total => "total",
            AmountStrategyKind::Largest => "largest",
        }
    }
}

impl AmountStrategy for AmountStrategyKind {
    fn name(&self) -> &str {
        self.as_str()
    }

    fn scanners(&self) -> &LocaleScanners {
        match self {
            AmountStrategyKind::Total => total_scanners(),
            AmountStrategyKind::Largest => unlabeled_scanners(),
        }
    }

    fn select<'a>(&self, candidates: &'a [AmountCandidate]) -> Option<&'a AmountCandidate> {
        largest(candidates)
    }
}

impl FromStr for AmountStrategyKind {
    type Err = ExtractionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ExtractionError::UnknownStrategy {
                field: "amount".to_string(),
                name: s.to_string(),
            })
    }
}

impl fmt::Display for AmountStrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Largest positive amount; the leftmost one wins a tie.
pub fn largest(candidates: &[AmountCandidate]) -> Option<&AmountCandidate> {
    candidates
        .iter()
        .filter(|candidate| candidate.value > Decimal::ZERO)
        .fold(None, |best: Option<&AmountCandidate>, candidate| match best {
            Some(best) if best.value >= candidate.value => Some(best),
            _ => Some(candidate),
        })
}

/// Largest amount printed after a caller-chosen label.
#[derive(Debug, Clone)]
pub struct LabeledStrategy {
    name: String,
    scanners: LocaleScanners,
}

impl LabeledStrategy {
    /// `label` is a regex matched case-insensitively right before the amount,
    /// including any separator, e.g. `r"Amount paid[^a-z0-9]*"`.
    pub fn new(name: impl Into<String>, label: &str) -> Result<Self, ExtractionError> {
        Ok(Self {
            name: name.into(),
            scanners: LocaleScanners::new(Some(label))?,
        })
    }
}

impl AmountStrategy for LabeledStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn scanners(&self) -> &LocaleScanners {
        &self.scanners
    }

    fn select<'a>(&self, candidates: &'a [AmountCandidate]) -> Option<&'a AmountCandidate> {
        largest(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::extract::rules::amounts::AmountParser;

    fn extract(kind: AmountStrategyKind, text: &str) -> Option<String> {
        let values = kind.scanners().scan(text).candidates;
        kind.select(&values).map(|c| c.text.clone())
    }

    #[test]
    fn test_largest() {
        assert_eq!(
            extract(AmountStrategyKind::Largest, "$500.32 $6,280.00\n$5,280.00").as_deref(),
            Some("6,280.00")
        );
    }

    #[test]
    fn test_largest_empty() {
        assert_eq!(extract(AmountStrategyKind::Largest, "no amounts here"), None);
    }

    #[test]
    fn test_largest_tie_keeps_leftmost() {
        let values = unlabeled_scanners().scan("$5.00 $3.00 $5.00").candidates;
        let chosen = largest(&values).unwrap();

        assert_eq!(chosen.position, values[0].position);
    }

    #[test]
    fn test_zero_amount_never_wins() {
        assert_eq!(extract(AmountStrategyKind::Largest, "$0.00 $0.0"), None);
    }

    #[test]
    fn test_total_before_subtotal() {
        let text = "subtotal $2,000.43\ndiscount $1,000.00\ntotal $1,000.43";
        assert_eq!(extract(AmountStrategyKind::Total, text).as_deref(), Some("1,000.43"));
    }

    #[test]
    fn test_total_with_colon() {
        assert_eq!(
            extract(AmountStrategyKind::Total, "total:  $1,000.43").as_deref(),
            Some("1,000.43")
        );
    }

    #[test]
    fn test_total_due() {
        assert_eq!(
            extract(AmountStrategyKind::Total, "total due  $1,000.43").as_deref(),
            Some("1,000.43")
        );
    }

    #[test]
    fn test_balance_due() {
        assert_eq!(
            extract(AmountStrategyKind::Total, "balance due $1,000.43").as_deref(),
            Some("1,000.43")
        );
    }

    #[test]
    fn test_total_prefers_highest_labeled() {
        assert_eq!(
            extract(AmountStrategyKind::Total, "balance due $1,000.43 total $2,000.43").as_deref(),
            Some("2,000.43")
        );
    }

    #[test]
    fn test_total_whole_amount() {
        assert_eq!(
            extract(AmountStrategyKind::Total, "TOTAL EUR 40\nTOTAL EUR40").as_deref(),
            Some("40")
        );
    }

    #[test]
    fn test_total_without_label() {
        assert_eq!(extract(AmountStrategyKind::Total, "$5.00 $6.00"), None);
    }

    #[test]
    fn test_strategy_names() {
        assert_eq!("total".parse::<AmountStrategyKind>().unwrap(), AmountStrategyKind::Total);
        assert_eq!("Largest".parse::<AmountStrategyKind>().unwrap(), AmountStrategyKind::Largest);

        let err = "smallest".parse::<AmountStrategyKind>().unwrap_err();
        assert_eq!(err.to_string(), "unknown amount strategy: smallest");
    }

    #[test]
    fn test_labeled_strategy_in_chain() {
        let paid = LabeledStrategy::new("paid", r"Amount paid[^a-z0-9]*").unwrap();
        let chain: Vec<Arc<dyn AmountStrategy>> =
            vec![Arc::new(paid), Arc::new(AmountStrategyKind::Largest)];
        let parser = AmountParser::from_strategies(chain).unwrap();

        let result = parser.parse("Amount paid: 12.00\nChange 88.00");
        assert_eq!(result.matched.as_deref(), Some("12.00"));
        assert_eq!(result.strategy.as_deref(), Some("paid"));

        let result = parser.parse("Change 88.00");
        assert_eq!(result.matched.as_deref(), Some("88.00"));
        assert_eq!(result.strategy.as_deref(), Some("largest"));
    }

    #[test]
    fn test_labeled_strategy_bad_pattern() {
        assert!(matches!(
            LabeledStrategy::new("broken", "(unclosed"),
            Err(ExtractionError::Pattern(_))
        ));
    }
}
