// File: src/error.rs
use std::io;

/// Errors raised by fallible constructors and store I/O.
///
/// The typing-path operations (`transliterate`, `suggest`, `record_use`,
/// `top_words`) never return these; they log and degrade instead.
#[derive(Debug, thiserror::Error)]
pub enum ImeError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("bincode error: {0}")]
    Bincode(#[from] bincode::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid value for {field}: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("{resource} line {line}: {reason}")]
    Parse {
        resource: &'static str,
        line: usize,
        reason: String,
    },

    #[error("empty token in {role} table")]
    EmptyToken { role: &'static str },

    #[error("malformed snapshot: {0}")]
    MalformedSnapshot(&'static str),

    #[error("invalid magic bytes (expected NTUD)")]
    BadMagic,

    #[error("unsupported snapshot version: {0}")]
    UnsupportedVersion(u8),
}

pub type Result<T> = std::result::Result<T, ImeError>;
