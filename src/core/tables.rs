// File: src/core/tables.rs
//! Roman token → Devanagari glyph tables.
//!
//! Three roles share one lookup: standalone vowels, consonants and vowel
//! signs (matras). A token may appear in several roles (`aa` is both आ and
//! ा); the converter decides which glyph to use from its state.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, OnceLock};

use crate::error::{ImeError, Result};

/// The minimal "a" sound: a consonant's inherent vowel.
pub const IMPLICIT_VOWEL: &str = "a";

const VOWELS: &[(&str, &str)] = &[
    ("a", "अ"), ("aa", "आ"), ("i", "इ"), ("ii", "ई"), ("ee", "ई"),
    ("u", "उ"), ("uu", "ऊ"), ("oo", "ऊ"), ("e", "ए"), ("ai", "ऐ"),
    ("o", "ओ"), ("au", "औ"), ("aM", "अं"), ("aH", "अः"), ("OM", "ॐ"),
    ("Ri", "ऋ"), ("Ru", "ऋ"),
];

const CONSONANTS: &[(&str, &str)] = &[
    ("k", "क"), ("kh", "ख"), ("g", "ग"), ("gh", "घ"), ("ng", "ङ"),
    ("ch", "च"), ("chh", "छ"), ("j", "ज"), ("jh", "झ"), ("yN", "ञ"),
    ("T", "ट"), ("Th", "ठ"), ("D", "ड"), ("Dh", "ढ"), ("N", "ण"),
    ("t", "त"), ("th", "थ"), ("d", "द"), ("dh", "ध"), ("n", "न"),
    ("p", "प"), ("ph", "फ"), ("b", "ब"), ("bh", "भ"), ("m", "म"),
    ("y", "य"), ("r", "र"), ("l", "ल"), ("w", "व"), ("v", "व"),
    ("sh", "श"), ("Sh", "ष"), ("s", "स"), ("h", "ह"),
    ("ksh", "क्ष"), ("tr", "त्र"), ("gy", "ज्ञ"), ("shr", "श्र"),
    ("z", "ज"), ("f", "फ"),
];

const VOWEL_SIGNS: &[(&str, &str)] = &[
    ("aa", "ा"), ("i", "ि"), ("ii", "ी"), ("ee", "ी"), ("u", "ु"),
    ("uu", "ू"), ("oo", "ू"), ("e", "े"), ("ai", "ै"), ("o", "ो"),
    ("au", "ौ"), ("aM", "ं"), ("aH", "ः"), ("Ri", "ृ"), ("Ru", "ृ"),
];

#[derive(Debug, Clone)]
pub struct TokenTable {
    vowels: HashMap<String, String>,
    consonants: HashMap<String, String>,
    vowel_signs: HashMap<String, String>,
    /// Union of all roles, deduplicated, longest first.
    tokens: Vec<String>,
    max_token_len: usize,
}

impl TokenTable {
    /// The shared Nepali table, built on first use.
    pub fn nepali() -> Arc<TokenTable> {
        static INSTANCE: OnceLock<Arc<TokenTable>> = OnceLock::new();
        INSTANCE
            .get_or_init(|| Arc::new(Self::build(VOWELS, CONSONANTS, VOWEL_SIGNS)))
            .clone()
    }

    /// Builds a custom table. Every token must be non-empty.
    pub fn from_roles(
        vowels: &[(&str, &str)],
        consonants: &[(&str, &str)],
        vowel_signs: &[(&str, &str)],
    ) -> Result<Self> {
        for (role, pairs) in [
            ("vowel", vowels),
            ("consonant", consonants),
            ("vowel sign", vowel_signs),
        ] {
            if pairs.iter().any(|(token, _)| token.is_empty()) {
                return Err(ImeError::EmptyToken { role });
            }
        }
        Ok(Self::build(vowels, consonants, vowel_signs))
    }

    fn build(
        vowels: &[(&str, &str)],
        consonants: &[(&str, &str)],
        vowel_signs: &[(&str, &str)],
    ) -> Self {
        let to_map = |pairs: &[(&str, &str)]| -> HashMap<String, String> {
            pairs
                .iter()
                .map(|&(token, glyph)| (token.to_string(), glyph.to_string()))
                .collect()
        };

        let mut seen = HashSet::new();
        let mut tokens: Vec<String> = consonants
            .iter()
            .chain(vowels)
            .chain(vowel_signs)
            .filter(|(token, _)| seen.insert(*token))
            .map(|(token, _)| token.to_string())
            .collect();
        // Stable: equal lengths keep declaration order.
        tokens.sort_by(|a, b| b.len().cmp(&a.len()));
        let max_token_len = tokens.first().map_or(0, String::len);

        Self {
            vowels: to_map(vowels),
            consonants: to_map(consonants),
            vowel_signs: to_map(vowel_signs),
            tokens,
            max_token_len,
        }
    }

    /// All tokens, longest first.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }

    pub fn contains(&self, token: &str) -> bool {
        self.vowels.contains_key(token)
            || self.consonants.contains_key(token)
            || self.vowel_signs.contains_key(token)
    }

    /// Longest token that `input` starts with.
    pub fn longest_match<'i>(&self, input: &'i str) -> Option<&'i str> {
        let upper = self.max_token_len.min(input.len());
        (1..=upper)
            .rev()
            .filter_map(|len| input.get(..len))
            .find(|candidate| self.contains(candidate))
    }

    pub fn vowel(&self, token: &str) -> Option<&str> {
        self.vowels.get(token).map(String::as_str)
    }

    pub fn consonant(&self, token: &str) -> Option<&str> {
        self.consonants.get(token).map(String::as_str)
    }

    pub fn vowel_sign(&self, token: &str) -> Option<&str> {
        self.vowel_signs.get(token).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_ordered_longest_first() {
        let table = TokenTable::nepali();
        let lengths: Vec<usize> = table.tokens().map(str::len).collect();
        assert!(lengths.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(table.tokens().next().map(str::len), Some(3));
    }

    #[test]
    fn shared_tokens_appear_once() {
        let table = TokenTable::nepali();
        let aa = table.tokens().filter(|t| *t == "aa").count();
        assert_eq!(aa, 1);
        assert_eq!(table.vowel("aa"), Some("आ"));
        assert_eq!(table.vowel_sign("aa"), Some("ा"));
    }

    #[test]
    fn every_token_matches_itself_in_full() {
        let table = TokenTable::nepali();
        for token in table.tokens() {
            assert_eq!(table.longest_match(token), Some(token), "token {token}");
        }
    }

    #[test]
    fn longer_digraphs_shadow_their_prefixes() {
        let table = TokenTable::nepali();
        assert_eq!(table.longest_match("chhaina"), Some("chh"));
        assert_eq!(table.longest_match("chiya"), Some("ch"));
        assert_eq!(table.longest_match("shri"), Some("shr"));
        assert_eq!(table.longest_match("kshamaa"), Some("ksh"));
    }

    #[test]
    fn unmapped_input_has_no_match() {
        let table = TokenTable::nepali();
        assert_eq!(table.longest_match("123"), None);
        assert_eq!(table.longest_match("q"), None);
        assert_eq!(table.longest_match("नम"), None);
        assert_eq!(table.longest_match(""), None);
    }

    #[test]
    fn empty_tokens_are_rejected() {
        let err = TokenTable::from_roles(&[("a", "अ")], &[("", "क")], &[]).unwrap_err();
        assert!(matches!(err, ImeError::EmptyToken { role: "consonant" }));
    }
}
