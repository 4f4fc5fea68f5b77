// src/core/types.rs
use serde::{Deserialize, Serialize};

/// Milliseconds since the Unix epoch.
pub type Timestamp = u64;

/// Usage statistics for one learned Nepali word.
/// Serialized as `{"frequency": n, "lastUsed": ms}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordRecord {
    /// Number of confirmed uses, saturating at the configured cap.
    #[serde(default)]
    pub frequency: u32,
    #[serde(default)]
    pub last_used: Timestamp,
}

/// A static lexicon word paired with the Roman spelling used for
/// phonetic matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexiconEntry {
    pub native: String,
    pub roman: String,
}

impl LexiconEntry {
    pub fn new(native: impl Into<String>, roman: impl Into<String>) -> Self {
        Self {
            native: native.into(),
            roman: roman.into().to_lowercase(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_record_uses_camel_case_keys() {
        let record = WordRecord {
            frequency: 3,
            last_used: 42,
        };
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"frequency":3,"lastUsed":42}"#);
    }

    #[test]
    fn lexicon_entry_lowercases_roman_form() {
        let entry = LexiconEntry::new("नमस्ते", "Namaste");
        assert_eq!(entry.roman, "namaste");
    }
}
