pub mod context;
pub mod converter;
pub mod engine;
pub mod lexicon;
pub mod tables;
pub mod types;
