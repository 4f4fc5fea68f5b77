// File: src/persistence.rs
//! Whole-snapshot storage for the personal lexicon.
//!
//! Every save rewrites the full mapping. Stores have no locking of their
//! own; the owning `PersonalLexicon` serialises load-modify-save.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use indexmap::IndexMap;
use serde_json::Value;
use tempfile::NamedTempFile;

use crate::config::{SnapshotFormat, StoreConfig};
use crate::core::types::WordRecord;
use crate::error::{ImeError, Result};

const MAGIC: &[u8; 4] = b"NTUD";
const VERSION: u8 = 1;

/// Learned words in insertion order.
pub type Snapshot = IndexMap<String, WordRecord>;

pub trait SnapshotStore: Send {
    /// `Ok(None)` when nothing has been stored yet.
    fn load(&self) -> Result<Option<Snapshot>>;
    fn save(&self, snapshot: &Snapshot) -> Result<()>;
}

impl<S: SnapshotStore + Sync> SnapshotStore for std::sync::Arc<S> {
    fn load(&self) -> Result<Option<Snapshot>> {
        (**self).load()
    }

    fn save(&self, snapshot: &Snapshot) -> Result<()> {
        (**self).save(snapshot)
    }
}

pub fn encode_json(snapshot: &Snapshot) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(snapshot)?)
}

/// Decodes the JSON layout, defaulting bad or missing fields to 0.
pub fn decode_json(bytes: &[u8]) -> Result<Snapshot> {
    let value: Value = serde_json::from_slice(bytes)?;
    let Value::Object(words) = value else {
        return Err(ImeError::MalformedSnapshot("top level is not a JSON object"));
    };

    Ok(words
        .into_iter()
        .map(|(word, record)| {
            let record = WordRecord {
                frequency: field_u64(&record, "frequency").min(u32::MAX as u64) as u32,
                last_used: field_u64(&record, "lastUsed"),
            };
            (word, record)
        })
        .collect())
}

fn field_u64(record: &Value, key: &str) -> u64 {
    match record.get(key) {
        Some(v) => v
            .as_u64()
            .or_else(|| v.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64))
            .unwrap_or(0),
        None => 0,
    }
}

pub fn encode_bincode(snapshot: &Snapshot) -> Result<Vec<u8>> {
    let body = bincode::serialize(snapshot)?;
    let mut buf = Vec::with_capacity(MAGIC.len() + 1 + body.len());
    buf.extend_from_slice(MAGIC);
    buf.push(VERSION);
    buf.extend_from_slice(&body);
    Ok(buf)
}

pub fn decode_bincode(bytes: &[u8]) -> Result<Snapshot> {
    if bytes.len() < MAGIC.len() + 1 || &bytes[..MAGIC.len()] != MAGIC {
        return Err(ImeError::BadMagic);
    }
    if bytes[MAGIC.len()] != VERSION {
        return Err(ImeError::UnsupportedVersion(bytes[MAGIC.len()]));
    }
    Ok(bincode::deserialize(&bytes[MAGIC.len() + 1..])?)
}

/// A snapshot kept in a single file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    format: SnapshotFormat,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>, format: SnapshotFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(config.path.clone(), config.format)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for FileStore {
    fn load(&self) -> Result<Option<Snapshot>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let snapshot = match self.format {
            SnapshotFormat::Json => decode_json(&bytes)?,
            SnapshotFormat::Bincode => decode_bincode(&bytes)?,
        };
        Ok(Some(snapshot))
    }

    /// Atomic write: temp file in the same directory, then rename.
    fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let parent_dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent_dir)?;

        let bytes = match self.format {
            SnapshotFormat::Json => encode_json(snapshot)?,
            SnapshotFormat::Bincode => encode_bincode(snapshot)?,
        };

        let temp_file = NamedTempFile::new_in(parent_dir)?;
        {
            let mut writer = BufWriter::new(&temp_file);
            writer.write_all(&bytes)?;
            writer.flush()?;
        }
        temp_file.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

/// The JSON record held in memory, like a browser's local storage slot.
#[derive(Debug, Default)]
pub struct MemoryStore {
    record: Mutex<Option<Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the slot with raw text, valid or not.
    pub fn with_raw(text: impl Into<String>) -> Self {
        Self {
            record: Mutex::new(Some(text.into().into_bytes())),
        }
    }

    /// The stored JSON text, if any.
    pub fn raw(&self) -> Option<String> {
        let record = self.record.lock().unwrap_or_else(|e| e.into_inner());
        record
            .as_ref()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Result<Option<Snapshot>> {
        let record = self.record.lock().unwrap_or_else(|e| e.into_inner());
        record.as_deref().map(decode_json).transpose()
    }

    fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let bytes = encode_json(snapshot)?;
        *self.record.lock().unwrap_or_else(|e| e.into_inner()) = Some(bytes);
        Ok(())
    }
}
