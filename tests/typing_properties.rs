use std::sync::Arc;

use ime_core::config::{ImeConfig, LearningConfig};
use ime_core::core::converter::HALANTA;
use ime_core::core::context::NextWordPredictor;
use ime_core::core::lexicon::Lexicon;
use ime_core::core::tables::TokenTable;
use ime_core::learning::{ManualClock, PersonalLexicon};
use ime_core::persistence::{decode_json, MemoryStore};
use ime_core::{ImeEngine, RomanizationEngine};
use proptest::prelude::*;

fn personal_lexicon(clock: &ManualClock, limits: LearningConfig) -> (PersonalLexicon, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let lexicon = PersonalLexicon::with_clock(Box::new(store.clone()), Box::new(clock.clone()), limits);
    (lexicon, store)
}

#[test]
fn namaste_resolves_entirely_through_syllables() {
    let native = RomanizationEngine::new().transliterate("namaste");
    assert_eq!(native, "नमस्ते");
    assert!(!native.chars().any(|c| c.is_ascii()));
}

#[test]
fn ghar_closes_on_bare_consonant() {
    assert_eq!(RomanizationEngine::new().transliterate("ghar"), "घ\u{0930}\u{094d}");
}

#[test]
fn roman_prefix_finds_namaste_first() {
    let engine = ImeEngine::in_memory(ImeConfig::default());
    assert_eq!(engine.suggest("", "nam").first().map(String::as_str), Some("नमस्ते"));
}

#[test]
fn two_uses_give_frequency_two_at_second_timestamp() {
    let clock = ManualClock::new(1_700_000_000_000);
    let (mut lexicon, _) = personal_lexicon(&clock, LearningConfig::default());
    lexicon.record_use("धन्यवाद");
    clock.advance(1_234);
    lexicon.record_use("धन्यवाद");

    let record = lexicon.lookup("धन्यवाद").unwrap();
    assert_eq!(record.frequency, 2);
    assert_eq!(record.last_used, 1_700_000_001_234);
}

#[test]
fn two_hundred_and_one_words_leave_the_newest_150() {
    let clock = ManualClock::new(0);
    let (mut lexicon, store) = personal_lexicon(&clock, LearningConfig::default());
    for i in 0..201 {
        clock.advance(1);
        lexicon.record_use(&format!("शब्द{i}"));
    }

    let persisted = decode_json(store.raw().unwrap().as_bytes()).unwrap();
    assert_eq!(persisted.len(), 150);
    assert!((51..201).all(|i| persisted.contains_key(&format!("शब्द{i}"))));
    assert_eq!(lexicon.top_words(1), vec!["शब्द200"]);
}

#[test]
fn engine_session_from_keystrokes_to_prediction() {
    let clock = ManualClock::new(10);
    let (learned, _) = personal_lexicon(&clock, LearningConfig::default());
    let mut engine = ImeEngine::with_parts(
        ImeConfig::default(),
        Lexicon::builtin(),
        NextWordPredictor::builtin(),
        learned,
    );

    for c in "nam".chars() {
        engine.push_char(c);
    }
    let top = engine.current_suggestions().into_iter().next().unwrap();
    engine.select_candidate(&top);
    assert_eq!(engine.composed_text(), "नमस्ते ");
    assert_eq!(engine.current_predictions(), vec!["कसरी", "तपाईंलाई", "के छ"]);

    engine.push_str("ghar");
    assert_eq!(engine.finalize_word().as_deref(), Some("घर्"));
    assert_eq!(engine.composed_text(), "नमस्ते घर् ");
    assert_eq!(engine.learned_words().len(), 2);
}

fn consonant_tokens() -> Vec<String> {
    let table = TokenTable::nepali();
    table
        .tokens()
        .filter(|t| table.consonant(t).is_some())
        .map(str::to_string)
        .collect()
}

fn all_tokens() -> Vec<String> {
    TokenTable::nepali().tokens().map(str::to_string).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn transliteration_is_deterministic(roman in "[a-zA-Z0-9 .,~]{0,24}") {
        let engine = RomanizationEngine::new();
        prop_assert_eq!(engine.transliterate(&roman), engine.transliterate(&roman));
    }

    #[test]
    fn trailing_consonant_always_gets_halanta(
        body in prop::collection::vec(prop::sample::select(all_tokens()), 0..8),
        last in prop::sample::select(consonant_tokens()),
    ) {
        let roman = format!("{}{}", body.concat(), last);
        let native = RomanizationEngine::new().transliterate(&roman);
        prop_assert!(native.ends_with(HALANTA), "{} -> {}", roman, native);
    }

    #[test]
    fn longer_token_is_never_cut_short(
        token in prop::sample::select(all_tokens()),
        rest in "[a-zA-Z]{0,4}",
    ) {
        let table = TokenTable::nepali();
        let input = format!("{token}{rest}");
        let matched = table.longest_match(&input).unwrap();
        prop_assert!(matched.len() >= token.len());
    }

    #[test]
    fn suggestions_match_one_of_the_prefixes(roman in "[a-zA-Z]{1,6}") {
        let lexicon = Lexicon::builtin();
        let native = RomanizationEngine::new().transliterate(&roman);
        let clean = native.strip_suffix(HALANTA).unwrap_or(&native);
        let roman_lower = roman.to_lowercase();

        let result = lexicon.suggest(&native, &roman, 5);
        prop_assert!(result.len() <= 5);
        for word in &result {
            let by_roman = lexicon
                .entries()
                .iter()
                .any(|e| &e.native == word && e.roman.starts_with(&roman_lower));
            prop_assert!(word.starts_with(clean) || by_roman, "{} for {}", word, roman);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn personal_lexicon_never_exceeds_capacity(
        words in prop::collection::vec("[क-ह]{1,3}", 1..400),
    ) {
        let clock = ManualClock::new(0);
        let (mut lexicon, _) = personal_lexicon(&clock, LearningConfig::default());
        for word in &words {
            let before = lexicon.len();
            clock.advance(1);
            lexicon.record_use(word);
            let after = lexicon.len();
            prop_assert!(after <= 200);
            if before == 200 && after != 200 {
                prop_assert!(after <= 150);
            }
        }
    }

    #[test]
    fn frequency_never_exceeds_cap(uses in 1usize..60) {
        let clock = ManualClock::new(0);
        let limits = LearningConfig { frequency_cap: 25, ..LearningConfig::default() };
        let (mut lexicon, _) = personal_lexicon(&clock, limits);
        for _ in 0..uses {
            lexicon.record_use("म");
        }
        let frequency = lexicon.lookup("म").unwrap().frequency;
        prop_assert_eq!(frequency as usize, uses.min(25));
    }
}
