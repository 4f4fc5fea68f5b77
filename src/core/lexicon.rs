// File: src/core/lexicon.rs
//! Static word list and the prefix matcher that ranks completions.

use std::sync::{Arc, OnceLock};

use indexmap::IndexSet;
use tracing::{debug, warn};

use crate::core::converter::HALANTA;
use crate::core::types::LexiconEntry;
use crate::error::{ImeError, Result};

const SEED_LEXICON: &str = include_str!("../../data/seed_lexicon.tsv");

/// Read-only list of native words with their Roman spellings.
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    entries: Vec<LexiconEntry>,
}

impl Lexicon {
    pub fn new(entries: Vec<LexiconEntry>) -> Self {
        Self { entries }
    }

    pub fn from_pairs<N, R>(pairs: impl IntoIterator<Item = (N, R)>) -> Self
    where
        N: Into<String>,
        R: Into<String>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(native, roman)| LexiconEntry::new(native, roman))
                .collect(),
        )
    }

    /// Parses `native<TAB>roman` lines. Blank lines and `#` comments are skipped.
    pub fn parse_tsv(text: &str) -> Result<Self> {
        let mut entries = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let parse_err = |reason: &str| ImeError::Parse {
                resource: "lexicon",
                line: idx + 1,
                reason: reason.to_string(),
            };
            let (native, roman) = line
                .split_once('\t')
                .ok_or_else(|| parse_err("expected native<TAB>roman"))?;
            let (native, roman) = (native.trim(), roman.trim());
            if native.is_empty() || roman.is_empty() {
                return Err(parse_err("empty field"));
            }
            entries.push(LexiconEntry::new(native, roman));
        }
        Ok(Self::new(entries))
    }

    /// The embedded seed lexicon, parsed once per process.
    pub fn builtin() -> Arc<Lexicon> {
        static INSTANCE: OnceLock<Arc<Lexicon>> = OnceLock::new();
        INSTANCE
            .get_or_init(|| {
                let lexicon = Self::parse_tsv(SEED_LEXICON).unwrap_or_else(|e| {
                    warn!("embedded lexicon is malformed, starting empty: {e}");
                    Self::default()
                });
                Arc::new(lexicon)
            })
            .clone()
    }

    pub fn entries(&self) -> &[LexiconEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ranked completions for the word being typed.
    ///
    /// Words whose native form starts with `native_prefix` come first, then
    /// words matched only through their Roman spelling; shorter words first
    /// within each tier. Each scan stops once `2 * cap` candidates are held.
    pub fn suggest(&self, native_prefix: &str, roman_prefix: &str, cap: usize) -> Vec<String> {
        if cap == 0 || (native_prefix.trim().is_empty() && roman_prefix.trim().is_empty()) {
            return Vec::new();
        }

        // A dangling consonant still matches the syllable it will complete.
        let native = native_prefix.strip_suffix(HALANTA).unwrap_or(native_prefix);
        let scan_limit = cap.saturating_mul(2);
        let mut found: IndexSet<&str> = IndexSet::new();

        if !native.is_empty() {
            for entry in &self.entries {
                if entry.native.starts_with(native) {
                    found.insert(entry.native.as_str());
                    if found.len() >= scan_limit {
                        break;
                    }
                }
            }
        }

        if !roman_prefix.is_empty() {
            let roman = roman_prefix.to_lowercase();
            for entry in &self.entries {
                if entry.roman.starts_with(&roman) {
                    found.insert(entry.native.as_str());
                    if found.len() >= scan_limit {
                        break;
                    }
                }
            }
        }

        let mut ranked: Vec<&str> = found.into_iter().collect();
        // Stable: ties keep discovery order.
        ranked.sort_by_key(|word| (!word.starts_with(native), word.chars().count()));
        debug!(native, roman_prefix, candidates = ranked.len(), "lexicon lookup");

        ranked.into_iter().take(cap).map(str::to_string).collect()
    }
}
