use std::fs;

use ime_core::config::{ImeConfig, SnapshotFormat, StoreConfig};
use ime_core::ImeEngine;
use tempfile::tempdir;

fn config_at(path: std::path::PathBuf, format: SnapshotFormat) -> ImeConfig {
    ImeConfig {
        store: StoreConfig { path, format },
        ..ImeConfig::default()
    }
}

#[test]
fn learned_words_survive_a_restart() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("user_dictionary.json");

    let mut engine = ImeEngine::new(config_at(path.clone(), SnapshotFormat::Json));
    engine.select_candidate("नमस्ते");
    engine.select_candidate("नमस्ते");
    engine.push_str("ghar");
    engine.finalize_word();
    engine.flush().unwrap();
    drop(engine);

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains(r#""नमस्ते":{"frequency":2"#), "{text}");

    let mut reopened = ImeEngine::new(config_at(path, SnapshotFormat::Json));
    assert_eq!(reopened.top_words(5), vec!["नमस्ते", "घर्"]);
    assert_eq!(reopened.lookup("नमस्ते").map(|r| r.frequency), Some(2));
}

#[test]
fn bincode_store_round_trips_through_the_engine() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("user_dictionary.bin");

    let mut engine = ImeEngine::new(config_at(path.clone(), SnapshotFormat::Bincode));
    engine.record_use("आज");
    drop(engine);

    assert_eq!(&fs::read(&path).unwrap()[..4], b"NTUD");
    let mut reopened = ImeEngine::new(config_at(path, SnapshotFormat::Bincode));
    assert_eq!(reopened.top_words(5), vec!["आज"]);
}

#[test]
fn corrupt_file_starts_empty_and_is_replaced() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("user_dictionary.json");
    fs::write(&path, "{not json").unwrap();

    let mut engine = ImeEngine::new(config_at(path.clone(), SnapshotFormat::Json));
    assert!(engine.top_words(5).is_empty());
    engine.record_use("राम्रो");

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with('{') && text.contains("राम्रो"), "{text}");
}

#[test]
fn lenient_fields_load_as_zero() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("user_dictionary.json");
    fs::write(&path, r#"{"घर":{"frequency":"many"},"म":{"frequency":3,"lastUsed":7}}"#).unwrap();

    let mut engine = ImeEngine::new(config_at(path, SnapshotFormat::Json));
    let house = engine.lookup("घर").unwrap();
    assert_eq!((house.frequency, house.last_used), (0, 0));
    assert_eq!(engine.top_words(1), vec!["म"]);
}
