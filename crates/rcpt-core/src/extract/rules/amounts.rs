//! Amount extraction for receipt text.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::amount_strategy::{AmountStrategy, AmountStrategyKind};
use super::currency::{is_iso_code, CURRENCY_MARKER};
use super::patterns::TOTAL_LABEL;
use super::{replace_tokens, token_matches};
use crate::error::ExtractionError;
use crate::models::config::AmountConfig;

/// Decimal and thousands mark pairing used to read numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locale {
    /// `1,234.56`
    PeriodDecimal,
    /// `1.234,56`
    CommaDecimal,
}

impl Locale {
    pub fn decimal_mark(self) -> char {
        match self {
            Locale::PeriodDecimal => '.',
            Locale::CommaDecimal => ',',
        }
    }

    pub fn thousands_mark(self) -> char {
        match self {
            Locale::PeriodDecimal => ',',
            Locale::CommaDecimal => '.',
        }
    }

    /// Integer part with optional thousands grouping, e.g. `5,280`.
    fn grouped_integer(self) -> String {
        format!(
            r"[1-9][0-9]{{0,2}}(?:{}[0-9]{{3}})*",
            regex::escape(&self.thousands_mark().to_string())
        )
    }

    fn decimal(self) -> String {
        regex::escape(&self.decimal_mark().to_string())
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locale::PeriodDecimal => write!(f, "period-decimal"),
            Locale::CommaDecimal => write!(f, "comma-decimal"),
        }
    }
}

/// A monetary amount found in text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmountCandidate {
    /// Digits as printed, grouping preserved.
    pub text: String,
    /// Parsed magnitude.
    pub value: Decimal,
    /// Currency symbol or ISO code as printed.
    pub currency: Option<String>,
    /// Byte span of `text` within the normalized text.
    pub position: (usize, usize),
}

impl AmountCandidate {
    /// Upper-cased ISO 4217 code, if the marker is one.
    pub fn currency_code(&self) -> Option<String> {
        self.currency
            .as_deref()
            .filter(|marker| is_iso_code(marker))
            .map(str::to_uppercase)
    }
}

/// Remove parentheses around an amount, e.g. `(5,000.01)` becomes `5,000.01`.
pub fn normalize_amount_text(text: &str, locale: Locale) -> String {
    replace_tokens(parenthesized(locale), text, |caps| {
        format!("{}{}", &caps["lead"], &caps["amount"])
    })
}

fn parenthesized_pattern(locale: Locale) -> String {
    format!(
        r"(?P<lead>^|\s)\((?P<amount>(?:{}|0){}[0-9]{{1,2}})\)(?P<tail>\s|$)",
        locale.grouped_integer(),
        locale.decimal()
    )
}

lazy_static! {
    static ref PARENS_PERIOD: Regex =
        Regex::new(&parenthesized_pattern(Locale::PeriodDecimal)).unwrap();
    static ref PARENS_COMMA: Regex =
        Regex::new(&parenthesized_pattern(Locale::CommaDecimal)).unwrap();

    static ref UNLABELED: LocaleScanners = LocaleScanners::new(None).unwrap();
    static ref TOTAL_LABELED: LocaleScanners = LocaleScanners::new(Some(TOTAL_LABEL)).unwrap();
}

fn parenthesized(locale: Locale) -> &'static Regex {
    match locale {
        Locale::PeriodDecimal => &PARENS_PERIOD,
        Locale::CommaDecimal => &PARENS_COMMA,
    }
}

/// Scanners with no label requirement.
pub fn unlabeled_scanners() -> &'static LocaleScanners {
    &UNLABELED
}

/// Scanners that only accept amounts printed after a total label.
pub fn total_scanners() -> &'static LocaleScanners {
    &TOTAL_LABELED
}

/// Finds amount tokens under one locale.
#[derive(Debug, Clone)]
pub struct AmountScanner {
    locale: Locale,
    /// Amount with a decimal part, currency optional.
    fractional: Regex,
    /// Amount without a decimal part, currency required.
    whole: Regex,
}

impl AmountScanner {
    /// Build a scanner; `prefix` is a pattern that must directly precede the
    /// currency marker or digits.
    pub fn new(locale: Locale, prefix: Option<&str>) -> Result<Self, ExtractionError> {
        let prefix = prefix.map(|p| format!("(?:{p})")).unwrap_or_default();
        let grouped = locale.grouped_integer();
        let marker = CURRENCY_MARKER.as_str();

        let fractional = Regex::new(&format!(
            r"(?i)(?:^|\s){prefix}(?P<currency>{marker})?(?P<amount>(?:{grouped}|[1-9][0-9]*|0)?{decimal}[0-9]{{1,2}})(?P<tail>\s|$)",
            decimal = locale.decimal(),
        ))?;
        let whole = Regex::new(&format!(
            r"(?i)(?:^|\s){prefix}(?P<currency>{marker})(?P<amount>{grouped}|[1-9][0-9]*)(?P<tail>\s|$)"
        ))?;

        Ok(Self {
            locale,
            fractional,
            whole,
        })
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Normalize `text` for this locale and collect every amount in text order.
    pub fn scan(&self, text: &str) -> AmountScan {
        let normalized = normalize_amount_text(text, self.locale);

        let mut candidates: Vec<AmountCandidate> = [&self.fractional, &self.whole]
            .into_iter()
            .flat_map(|pattern| {
                token_matches(pattern, &normalized)
                    .filter_map(|caps| self.candidate(&caps))
                    .collect::<Vec<_>>()
            })
            .collect();
        candidates.sort_by_key(|candidate| candidate.position.0);

        AmountScan {
            locale: self.locale,
            normalized_text: normalized,
            candidates,
        }
    }

    fn candidate(&self, caps: &Captures<'_>) -> Option<AmountCandidate> {
        let amount = caps.name("amount")?;
        let value = parse_amount(amount.as_str(), self.locale)?;

        Some(AmountCandidate {
            text: amount.as_str().to_string(),
            value,
            currency: caps.name("currency").map(|m| m.as_str().to_string()),
            position: (amount.start(), amount.end()),
        })
    }
}

/// Parse amount digits printed under `locale`.
pub fn parse_amount(text: &str, locale: Locale) -> Option<Decimal> {
    let mut normalized: String = text
        .chars()
        .filter(|c| *c != locale.thousands_mark())
        .map(|c| if c == locale.decimal_mark() { '.' } else { c })
        .collect();

    if normalized.starts_with('.') {
        normalized.insert(0, '0');
    }

    Decimal::from_str(&normalized).ok()
}

/// Candidates found under a single locale.
#[derive(Debug, Clone)]
pub struct AmountScan {
    pub locale: Locale,
    pub normalized_text: String,
    pub candidates: Vec<AmountCandidate>,
}

/// One scanner per locale; picks whichever reads more amounts.
#[derive(Debug, Clone)]
pub struct LocaleScanners {
    period: AmountScanner,
    comma: AmountScanner,
}

impl LocaleScanners {
    pub fn new(prefix: Option<&str>) -> Result<Self, ExtractionError> {
        Ok(Self {
            period: AmountScanner::new(Locale::PeriodDecimal, prefix)?,
            comma: AmountScanner::new(Locale::CommaDecimal, prefix)?,
        })
    }

    /// Scan under both locales and keep the one with strictly more
    /// candidates; a tie keeps period-decimal.
    pub fn scan(&self, text: &str) -> AmountScan {
        let period = self.period.scan(text);
        let comma = self.comma.scan(text);
        debug!(
            "Read {} amounts as {} and {} as {}",
            period.candidates.len(),
            self.period.locale(),
            comma.candidates.len(),
            self.comma.locale()
        );

        if comma.candidates.len() > period.candidates.len() {
            comma
        } else {
            period
        }
    }
}

/// Outcome of amount extraction.
#[derive(Debug, Clone, Serialize)]
pub struct AmountExtraction {
    /// Text the winning scan ran over.
    pub normalized_text: String,
    pub locale: Locale,
    /// Candidates from the deciding strategy, or from the last one tried.
    pub matches: Vec<AmountCandidate>,
    /// Raw text of the chosen amount.
    #[serde(rename = "match")]
    pub matched: Option<String>,
    /// Name of the strategy that produced `matched`.
    pub strategy: Option<String>,
}

/// Amount extractor running an ordered strategy chain.
#[derive(Clone)]
pub struct AmountParser {
    strategies: Vec<Arc<dyn AmountStrategy>>,
}

impl AmountParser {
    /// Create a parser with the default `[total, largest]` chain.
    pub fn new() -> Self {
        Self {
            strategies: vec![
                Arc::new(AmountStrategyKind::Total),
                Arc::new(AmountStrategyKind::Largest),
            ],
        }
    }

    /// Create a parser from built-in strategies, tried in order.
    pub fn with_strategies<I>(kinds: I) -> Result<Self, ExtractionError>
    where
        I: IntoIterator<Item = AmountStrategyKind>,
    {
        Self::from_strategies(
            kinds
                .into_iter()
                .map(|kind| Arc::new(kind) as Arc<dyn AmountStrategy>)
                .collect(),
        )
    }

    /// Create a parser from any mix of built-in and custom strategies.
    pub fn from_strategies(
        strategies: Vec<Arc<dyn AmountStrategy>>,
    ) -> Result<Self, ExtractionError> {
        if strategies.is_empty() {
            return Err(ExtractionError::NoStrategies("amount".to_string()));
        }
        Ok(Self { strategies })
    }

    pub fn from_config(config: &AmountConfig) -> Result<Self, ExtractionError> {
        Self::with_strategies(config.strategies.iter().copied())
    }

    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Try each strategy in turn; the first one that picks an amount wins.
    pub fn parse(&self, text: &str) -> AmountExtraction {
        let mut last_scan = None;

        for strategy in &self.strategies {
            let scan = strategy.scanners().scan(text);

            if let Some(chosen) = strategy.select(&scan.candidates) {
                let matched = chosen.text.clone();
                debug!(
                    "Amount {} chosen by {} from {} {} candidates",
                    matched,
                    strategy.name(),
                    scan.candidates.len(),
                    scan.locale
                );
                return AmountExtraction {
                    normalized_text: scan.normalized_text,
                    locale: scan.locale,
                    matches: scan.candidates,
                    matched: Some(matched),
                    strategy: Some(strategy.name().to_string()),
                };
            }

            debug!("Amount strategy {} found nothing", strategy.name());
            last_scan = Some(scan);
        }

        let scan = last_scan.unwrap_or_else(|| unlabeled_scanners().scan(text));
        AmountExtraction {
            normalized_text: scan.normalized_text,
            locale: scan.locale,
            matches: scan.candidates,
            matched: None,
            strategy: None,
        }
    }
}

impl Default for AmountParser {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AmountParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AmountParser")
            .field("strategies", &self.strategy_names())
            .finish()
    }
}
