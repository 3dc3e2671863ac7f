//! Configuration loaded from `fincat.toml`.
//!
//! Every field has a default, so a missing file or a partial one is fine.
//! `FINCAT_LOOKAHEAD` in the environment takes precedence over the file for
//! the lookahead depth.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::classifier::MAX_LOOKAHEAD;
use crate::error::FincatError;
use crate::scoring::{Affinities, KeywordRule, KeywordScorer, RecordedScorer};

/// How classified statements are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FincatConfig {
    /// Rows of lookahead for the classifier.
    #[serde(default = "default_lookahead")]
    pub lookahead: usize,

    /// Replaces the built-in keyword rules when present.
    #[serde(default)]
    pub keywords: Option<Vec<KeywordRule>>,

    /// Fixed affinities for specific labels, bypassing keyword scoring.
    #[serde(default)]
    pub overrides: HashMap<String, Affinities>,

    #[serde(default)]
    pub output: OutputFormat,
}

fn default_lookahead() -> usize {
    MAX_LOOKAHEAD
}

impl Default for FincatConfig {
    fn default() -> Self {
        Self {
            lookahead: default_lookahead(),
            keywords: None,
            overrides: HashMap::new(),
            output: OutputFormat::default(),
        }
    }
}

impl FincatConfig {
    /// Loads `fincat.toml` from the current directory, or defaults if absent.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("fincat.toml"))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            toml::from_str::<FincatConfig>(&contents)
                .with_context(|| format!("parsing {}", path.display()))?
        } else {
            Self::default()
        };

        if let Ok(value) = std::env::var("FINCAT_LOOKAHEAD") {
            config.lookahead = parse_lookahead(&value)?;
        }

        Ok(config)
    }

    /// Scorer built from the configured keyword rules and label overrides.
    pub fn scorer(&self) -> RecordedScorer<KeywordScorer> {
        let keywords = match &self.keywords {
            Some(rules) => KeywordScorer::new(rules.clone()),
            None => KeywordScorer::default(),
        };
        let mut scorer = RecordedScorer::new(keywords);
        for (label, affinities) in &self.overrides {
            scorer.record(label.clone(), *affinities);
        }
        scorer
    }
}

fn parse_lookahead(value: &str) -> Result<usize, FincatError> {
    value.trim().parse().map_err(|_| {
        FincatError::Config(format!("FINCAT_LOOKAHEAD must be a number, got {value:?}"))
    })
}
