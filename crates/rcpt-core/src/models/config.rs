//! Configuration structures for field extraction.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::extract::FieldKind;
use crate::extract::rules::{AmountStrategyKind, DateFormat, DateStrategyKind};

/// Main configuration for rcpt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RcptConfig {
    /// Field extraction configuration.
    pub extraction: ExtractionConfig,
}

/// Which fields to extract and how.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Fields to extract, in output order.
    pub fields: Vec<FieldKind>,

    /// Include intermediate results in the output.
    pub verbose: bool,

    /// Amount extraction configuration.
    pub amount: AmountConfig,

    /// Date extraction configuration.
    pub date: DateConfig,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            fields: FieldKind::ALL.to_vec(),
            verbose: false,
            amount: AmountConfig::default(),
            date: DateConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmountConfig {
    /// Strategies tried in order until one picks an amount.
    pub strategies: Vec<AmountStrategyKind>,
}

impl Default for AmountConfig {
    fn default() -> Self {
        Self {
            strategies: AmountStrategyKind::ALL.to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateConfig {
    pub strategy: DateStrategyKind,

    /// Date layouts to recognize.
    pub formats: Vec<DateFormat>,

    /// Year assumed for dates printed without one (null = current year).
    /// Such dates are never chosen, but they still occupy their span.
    pub reference_year: Option<i32>,
}

impl Default for DateConfig {
    fn default() -> Self {
        Self {
            strategy: DateStrategyKind::Earliest,
            formats: DateFormat::ALL.to_vec(),
            reference_year: None,
        }
    }
}

impl RcptConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
