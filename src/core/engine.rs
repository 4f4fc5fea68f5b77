use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::ImeConfig;
use crate::core::context::NextWordPredictor;
use crate::core::converter::RomanizationEngine;
use crate::core::lexicon::Lexicon;
use crate::core::types::WordRecord;
use crate::error::Result;
use crate::learning::PersonalLexicon;
use crate::persistence::{FileStore, MemoryStore};

/// The input engine: converter, matcher, predictor and personal lexicon,
/// plus the word currently being typed and the text committed so far.
///
/// Keystrokes must reach one engine in arrival order; the preview is a
/// function of the whole buffer.
pub struct ImeEngine {
    romanizer: RomanizationEngine,
    lexicon: Arc<Lexicon>,
    predictor: Arc<NextWordPredictor>,
    learned: PersonalLexicon,
    config: ImeConfig,
    preedit: String,
    composed: String,
}

impl ImeEngine {
    /// Built-in lexicon and bigrams, learned words in the configured file.
    pub fn new(config: ImeConfig) -> Self {
        let store = FileStore::from_config(&config.store);
        debug!(path = %store.path().display(), "personal lexicon store");
        let learned = PersonalLexicon::new(Box::new(store), config.learning.clone());
        Self::with_parts(config, Lexicon::builtin(), NextWordPredictor::builtin(), learned)
    }

    /// Loads the user config, falling back to defaults if it is unusable.
    pub fn from_config_or_default() -> Self {
        let config = ImeConfig::load().unwrap_or_else(|e| {
            warn!("ignoring config: {e}");
            ImeConfig::default()
        });
        Self::new(config)
    }

    /// Nothing touches disk; learned words live as long as the engine.
    pub fn in_memory(config: ImeConfig) -> Self {
        let learned = PersonalLexicon::new(Box::new(MemoryStore::new()), config.learning.clone());
        Self::with_parts(config, Lexicon::builtin(), NextWordPredictor::builtin(), learned)
    }

    pub fn with_parts(
        config: ImeConfig,
        lexicon: Arc<Lexicon>,
        predictor: Arc<NextWordPredictor>,
        learned: PersonalLexicon,
    ) -> Self {
        Self {
            romanizer: RomanizationEngine::new(),
            lexicon,
            predictor,
            learned,
            config,
            preedit: String::new(),
            composed: String::new(),
        }
    }

    pub fn config(&self) -> &ImeConfig {
        &self.config
    }

    pub fn romanizer(&self) -> &RomanizationEngine {
        &self.romanizer
    }

    pub fn transliterate(&self, roman: &str) -> String {
        self.romanizer.transliterate(roman)
    }

    pub fn suggest(&self, native_prefix: &str, roman_prefix: &str) -> Vec<String> {
        self.lexicon
            .suggest(native_prefix, roman_prefix, self.config.suggestions.max_display)
    }

    pub fn next_word_predictions(&self, last_word: &str) -> Vec<String> {
        self.predictor
            .predict(last_word, self.config.predictions.max_display)
    }

    pub fn record_use(&mut self, word: &str) {
        self.learned.record_use(word);
    }

    pub fn top_words(&mut self, limit: usize) -> Vec<String> {
        self.learned.top_words(limit)
    }

    pub fn lookup(&mut self, word: &str) -> Option<WordRecord> {
        self.learned.lookup(word)
    }

    /// Writes the personal lexicon now, reporting any failure.
    pub fn flush(&mut self) -> Result<()> {
        self.learned.flush()
    }

    // --- composing session ---

    pub fn push_char(&mut self, c: char) {
        self.preedit.push(c);
    }

    pub fn push_str(&mut self, roman: &str) {
        self.preedit.push_str(roman);
    }

    /// Removes the last raw character. Returns false if the buffer was empty.
    pub fn backspace(&mut self) -> bool {
        self.preedit.pop().is_some()
    }

    pub fn cancel_word(&mut self) {
        self.preedit.clear();
    }

    pub fn preedit(&self) -> &str {
        &self.preedit
    }

    pub fn preview(&self) -> String {
        self.romanizer.transliterate(&self.preedit)
    }

    pub fn current_suggestions(&self) -> Vec<String> {
        self.suggest(&self.preview(), &self.preedit)
    }

    /// Commits the preview as a word. Returns the committed word, or `None`
    /// when there is nothing to commit.
    pub fn finalize_word(&mut self) -> Option<String> {
        let preview = self.preview();
        if preview.trim().is_empty() {
            // A buffer of spaces alone is discarded.
            self.preedit.clear();
            return None;
        }
        self.commit(&preview);
        Some(preview)
    }

    /// Commits a chosen suggestion or prediction in place of the preview.
    pub fn select_candidate(&mut self, word: &str) {
        let word = word.trim();
        if word.is_empty() {
            return;
        }
        self.commit(word);
    }

    fn commit(&mut self, word: &str) {
        self.composed.push_str(word);
        self.composed.push(' ');
        self.learned.record_use(word);
        self.preedit.clear();
        debug!(word, "committed");
    }

    /// Likely next words after the last committed word.
    pub fn current_predictions(&self) -> Vec<String> {
        self.composed
            .split_whitespace()
            .last()
            .map(|last| self.next_word_predictions(last))
            .unwrap_or_default()
    }

    pub fn learned_words(&mut self) -> Vec<String> {
        let limit = self.config.learning.top_words_display;
        self.learned.top_words(limit)
    }

    pub fn composed_text(&self) -> &str {
        &self.composed
    }

    pub fn clear_all(&mut self) {
        self.preedit.clear();
        self.composed.clear();
    }
}
