// File: src/learning.rs
//! Personal lexicon: words the user has committed, with use counts.
//!
//! The snapshot is loaded on first access and written back in full after
//! every mutation. Reads take `&mut self` because the first one may load.

use std::cmp::Reverse;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, warn};

use crate::config::LearningConfig;
use crate::core::types::{Timestamp, WordRecord};
use crate::error::Result;
use crate::persistence::{Snapshot, SnapshotStore};

pub trait Clock: Send {
    fn now_millis(&self) -> Timestamp;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> Timestamp {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as Timestamp
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock(Arc<AtomicU64>);

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self(Arc::new(AtomicU64::new(start)))
    }

    pub fn set(&self, now: Timestamp) {
        self.0.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, millis: u64) {
        self.0.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> Timestamp {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct PersonalLexicon {
    store: Box<dyn SnapshotStore>,
    clock: Box<dyn Clock>,
    limits: LearningConfig,
    words: Option<Snapshot>,
}

impl PersonalLexicon {
    pub fn new(store: Box<dyn SnapshotStore>, limits: LearningConfig) -> Self {
        Self::with_clock(store, Box::new(SystemClock), limits)
    }

    pub fn with_clock(
        store: Box<dyn SnapshotStore>,
        clock: Box<dyn Clock>,
        limits: LearningConfig,
    ) -> Self {
        Self {
            store,
            clock,
            limits,
            words: None,
        }
    }

    fn words(&mut self) -> &mut Snapshot {
        let store = &self.store;
        self.words.get_or_insert_with(|| match store.load() {
            Ok(Some(snapshot)) => {
                debug!(words = snapshot.len(), "personal lexicon loaded");
                snapshot
            }
            Ok(None) => Snapshot::new(),
            Err(e) => {
                warn!("personal lexicon unreadable, starting fresh: {e}");
                Snapshot::new()
            }
        })
    }

    /// Counts one use of `word`. Blank or over-long words are ignored.
    pub fn record_use(&mut self, word: &str) {
        let word = word.trim();
        let chars = word.chars().count();
        if chars == 0 || chars > self.limits.max_word_chars {
            return;
        }

        let now = self.clock.now_millis();
        let cap = self.limits.frequency_cap;
        let record = self
            .words()
            .entry(word.to_string())
            .or_insert(WordRecord {
                frequency: 0,
                last_used: now,
            });
        record.frequency = record.frequency.saturating_add(1).min(cap);
        record.last_used = now;

        if let Err(e) = self.persist() {
            warn!("failed to save personal lexicon: {e}");
        }
    }

    /// Up to `limit` words, most frequent first, ties broken by recency.
    pub fn top_words(&mut self, limit: usize) -> Vec<String> {
        let mut ranked: Vec<(&String, &WordRecord)> = self.words().iter().collect();
        ranked.sort_by_key(|(_, r)| (Reverse(r.frequency), Reverse(r.last_used)));
        ranked
            .into_iter()
            .take(limit)
            .map(|(word, _)| word.clone())
            .collect()
    }

    pub fn lookup(&mut self, word: &str) -> Option<WordRecord> {
        self.words().get(word.trim()).copied()
    }

    pub fn len(&mut self) -> usize {
        self.words().len()
    }

    pub fn is_empty(&mut self) -> bool {
        self.words().is_empty()
    }

    /// Trims if over capacity, then writes the full snapshot.
    pub fn flush(&mut self) -> Result<()> {
        self.persist()
    }

    fn persist(&mut self) -> Result<()> {
        let max_entries = self.limits.max_entries;
        let trim_to = self.limits.trim_to;
        self.words();
        let Some(words) = self.words.as_mut() else {
            return Ok(());
        };
        if words.len() > max_entries {
            evict(words, trim_to);
        }
        self.store.save(words)
    }
}

/// Keeps the `keep` most recently used words, frequency breaking ties.
///
/// Recency-first, unlike `top_words`.
fn evict(words: &mut Snapshot, keep: usize) {
    let before = words.len();
    let mut entries: Vec<(String, WordRecord)> = words.drain(..).collect();
    entries.sort_by_key(|(_, r)| (Reverse(r.last_used), Reverse(r.frequency)));
    entries.truncate(keep);
    words.extend(entries);
    debug!(before, after = words.len(), "personal lexicon trimmed");
}
