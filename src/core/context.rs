// File: src/core/context.rs
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use tracing::warn;

use crate::error::{ImeError, Result};

const DEFAULT_BIGRAMS: &str = include_str!("../../data/bigrams.tsv");

/// Static next-word table: a completed word maps to its likely followers.
#[derive(Debug, Clone, Default)]
pub struct NextWordPredictor {
    /// Maps previous word -> followers, most likely first
    bigrams: HashMap<String, Vec<String>>,
}

impl NextWordPredictor {
    pub fn new(bigrams: HashMap<String, Vec<String>>) -> Self {
        Self { bigrams }
    }

    /// Parses `word<TAB>next|next|...` lines.
    pub fn parse_tsv(text: &str) -> Result<Self> {
        let mut bigrams = HashMap::new();
        for (idx, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((word, followers)) = line.split_once('\t') else {
                return Err(ImeError::Parse {
                    resource: "bigram table",
                    line: idx + 1,
                    reason: "expected word<TAB>followers".to_string(),
                });
            };
            let followers: Vec<String> = followers
                .split('|')
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .map(str::to_string)
                .collect();
            bigrams.insert(word.trim().to_string(), followers);
        }
        Ok(Self { bigrams })
    }

    pub fn builtin() -> Arc<NextWordPredictor> {
        static INSTANCE: OnceLock<Arc<NextWordPredictor>> = OnceLock::new();
        INSTANCE
            .get_or_init(|| {
                let table = Self::parse_tsv(DEFAULT_BIGRAMS).unwrap_or_else(|e| {
                    warn!("embedded bigram table is malformed, predictions disabled: {e}");
                    Self::default()
                });
                Arc::new(table)
            })
            .clone()
    }

    /// Up to `cap` likely followers of `last_word`.
    pub fn predict(&self, last_word: &str, cap: usize) -> Vec<String> {
        let word = last_word.trim();
        if word.is_empty() {
            return Vec::new();
        }
        self.bigrams
            .get(word)
            .map(|followers| followers.iter().take(cap).cloned().collect())
            .unwrap_or_default()
    }
}
