// File: src/core/converter.rs
use std::sync::Arc;

use tracing::trace;

use crate::core::tables::{TokenTable, IMPLICIT_VOWEL};

pub const HALANTA: char = '\u{094d}';
pub const ANUSVARA: char = '\u{0902}';
pub const CHANDRABINDU: char = '\u{0901}';

/// Raw character that asks for chandrabindu after a vowel sound.
const CHANDRABINDU_MARKER: char = 'M';

/// What the converter appended last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Glyph {
    Nothing,
    Vowel,
    VowelSign,
    Consonant,
    Literal,
}

/// Output buffer plus the one bit of carry between tokens.
///
/// `pending_consonant` is set iff the last glyph is a bare consonant that a
/// following vowel sign may still attach to. Any other glyph resolves it
/// with a halanta first.
struct TokenizerState {
    output: String,
    pending_consonant: bool,
    last: Glyph,
}

impl TokenizerState {
    fn new(capacity: usize) -> Self {
        Self {
            output: String::with_capacity(capacity),
            pending_consonant: false,
            last: Glyph::Nothing,
        }
    }

    fn close_pending(&mut self) {
        if self.pending_consonant {
            self.output.push(HALANTA);
            self.pending_consonant = false;
        }
    }

    fn push(&mut self, glyph: &str, kind: Glyph) {
        self.output.push_str(glyph);
        self.last = kind;
    }

    /// Applies the chandrabindu marker if the previous glyph ended on a
    /// vowel sound. Returns false when the marker must be tokenized normally.
    fn try_chandrabindu(&mut self) -> bool {
        if self.pending_consonant || !matches!(self.last, Glyph::Vowel | Glyph::VowelSign) {
            return false;
        }
        if self.output.ends_with(ANUSVARA) {
            self.output.pop();
        }
        self.output.push(CHANDRABINDU);
        self.last = Glyph::VowelSign;
        true
    }

    fn finish(mut self) -> String {
        self.close_pending();
        self.output
    }
}

/// Stateless Romanization to Devanagari converter.
///
/// Cloning is cheap; the token table is shared.
#[derive(Debug, Clone)]
pub struct RomanizationEngine {
    table: Arc<TokenTable>,
}

impl Default for RomanizationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RomanizationEngine {
    pub fn new() -> Self {
        Self::with_table(TokenTable::nepali())
    }

    pub fn with_table(table: Arc<TokenTable>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &TokenTable {
        &self.table
    }

    /// Transliterates a full roman string.
    ///
    /// Total: characters without a token pass through unchanged.
    pub fn transliterate(&self, roman: &str) -> String {
        let mut state = TokenizerState::new(roman.len() * 3);
        let mut cursor = 0;

        while cursor < roman.len() {
            let rest = &roman[cursor..];

            if rest.starts_with(CHANDRABINDU_MARKER) && state.try_chandrabindu() {
                cursor += CHANDRABINDU_MARKER.len_utf8();
                continue;
            }

            match self.table.longest_match(rest) {
                Some(token) => {
                    self.apply_token(&mut state, token);
                    cursor += token.len();
                }
                None => {
                    // Unmapped: one raw character, verbatim.
                    let ch = rest.chars().next().unwrap_or_default();
                    state.close_pending();
                    let mut buf = [0u8; 4];
                    state.push(ch.encode_utf8(&mut buf), Glyph::Literal);
                    cursor += ch.len_utf8();
                }
            }
        }

        let output = state.finish();
        trace!(roman, output = %output, "transliterated");
        output
    }

    fn apply_token(&self, state: &mut TokenizerState, token: &str) {
        let table = &*self.table;

        if token == IMPLICIT_VOWEL {
            if state.pending_consonant {
                // The consonant already carries the inherent vowel.
                state.pending_consonant = false;
            } else if let Some(glyph) = table.vowel(token) {
                state.push(glyph, Glyph::Vowel);
            }
            return;
        }

        if let Some(glyph) = table.consonant(token) {
            state.close_pending();
            state.push(glyph, Glyph::Consonant);
            state.pending_consonant = true;
            return;
        }

        if state.pending_consonant {
            if let Some(sign) = table.vowel_sign(token) {
                state.push(sign, Glyph::VowelSign);
                state.pending_consonant = false;
                return;
            }
        }

        if let Some(glyph) = table.vowel(token) {
            // A vowel with no sign form after a consonant; close it first.
            state.close_pending();
            state.push(glyph, Glyph::Vowel);
            return;
        }

        state.close_pending();
        state.push(token, Glyph::Literal);
    }
}
