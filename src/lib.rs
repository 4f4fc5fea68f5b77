// src/lib.rs

pub mod c_api;
pub mod config;
pub mod core;
pub mod error;
pub mod learning;
pub mod persistence;

pub use crate::config::ImeConfig;
pub use crate::core::converter::RomanizationEngine;
pub use crate::core::engine::ImeEngine;
pub use crate::core::lexicon::Lexicon;
pub use crate::error::{ImeError, Result};
pub use crate::learning::PersonalLexicon;
