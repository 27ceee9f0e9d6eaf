//! Rule-based field extractors for receipt text.

pub mod amounts;
pub mod amount_strategy;
pub mod currency;
pub mod dates;
pub mod date_strategy;
pub mod patterns;
pub mod recognizer;

pub use amounts::{
    normalize_amount_text, AmountCandidate, AmountExtraction, AmountParser, AmountScan,
    AmountScanner, Locale, LocaleScanners,
};
pub use amount_strategy::{AmountStrategy, AmountStrategyKind, LabeledStrategy};
pub use currency::ISO_4217_CODES;
pub use dates::{certain_dates, normalize_date_text, DateCandidate, DateExtraction, DateParser};
pub use date_strategy::{DateStrategy, DateStrategyKind};
pub use recognizer::{Certainty, DateFormat, DateRecognizer, PatternRecognizer, RecognizedDate};

use regex::{Captures, Regex};

/// Name of the capture group holding a token's trailing boundary.
///
/// Token patterns end in `(?P<tail>...)`. The tail is required to match but
/// is handed back to the next search, so `"$1 $2"` yields two tokens even
/// though both need the single space between them.
pub(crate) const TAIL: &str = "tail";

/// Iterator over token matches that leaves each trailing boundary unconsumed.
pub(crate) struct TokenMatches<'r, 't> {
    pattern: &'r Regex,
    text: &'t str,
    pos: usize,
}

pub(crate) fn token_matches<'r, 't>(pattern: &'r Regex, text: &'t str) -> TokenMatches<'r, 't> {
    TokenMatches { pattern, text, pos: 0 }
}

impl<'t> Iterator for TokenMatches<'_, 't> {
    type Item = Captures<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos > self.text.len() {
            return None;
        }

        let caps = self.pattern.captures_at(self.text, self.pos)?;
        let resume = token_end(&caps);

        self.pos = if resume > self.pos {
            resume
        } else {
            // Zero-width progress; step over one character.
            self.pos
                + self.text[self.pos..]
                    .chars()
                    .next()
                    .map_or(1, char::len_utf8)
        };

        Some(caps)
    }
}

/// End of a token match, excluding the trailing boundary.
pub(crate) fn token_end(caps: &Captures<'_>) -> usize {
    match (caps.name(TAIL), caps.get(0)) {
        (Some(tail), _) => tail.start(),
        (None, Some(whole)) => whole.end(),
        (None, None) => 0,
    }
}

/// Rewrite every token match, keeping trailing boundaries in place.
pub(crate) fn replace_tokens<F>(pattern: &Regex, text: &str, mut rewrite: F) -> String
where
    F: FnMut(&Captures<'_>) -> String,
{
    let mut output = String::with_capacity(text.len());
    let mut last = 0;

    for caps in token_matches(pattern, text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        output.push_str(&text[last..whole.start()]);
        output.push_str(&rewrite(&caps));
        last = token_end(&caps);
    }

    output.push_str(&text[last..]);
    output
}
