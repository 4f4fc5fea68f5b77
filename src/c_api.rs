// C entry points for input-method frontends.
// The engine sits behind one process-wide mutex, so every
// load-modify-save of the personal lexicon is serialised.
use crate::ImeEngine;
use std::ffi::{c_char, CStr, CString};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::ptr;
use std::sync::{Mutex, MutexGuard};
use tracing::{error, info, warn};

static IME_ENGINE: Mutex<Option<ImeEngine>> = Mutex::new(None);

fn engine_slot() -> MutexGuard<'static, Option<ImeEngine>> {
    IME_ENGINE.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Borrows a C string; null or invalid UTF-8 reads as empty.
unsafe fn read_str<'a>(s: *const c_char) -> &'a str {
    if s.is_null() {
        return "";
    }
    CStr::from_ptr(s).to_str().unwrap_or("")
}

fn into_c_string(s: String) -> *mut c_char {
    // Interior NULs cannot cross the boundary.
    CString::new(s.replace('\0', ""))
        .map(CString::into_raw)
        .unwrap_or(ptr::null_mut())
}

fn json_list(words: Vec<String>) -> *mut c_char {
    into_c_string(serde_json::to_string(&words).unwrap_or_else(|_| "[]".to_string()))
}

/// Runs `f` against the engine, returning `fallback` if it is not
/// initialised or `f` panics.
fn with_engine<T>(what: &str, fallback: T, f: impl FnOnce(&mut ImeEngine) -> T) -> T {
    let result = catch_unwind(AssertUnwindSafe(|| engine_slot().as_mut().map(f)));
    match result {
        Ok(Some(value)) => value,
        Ok(None) => {
            warn!("{what} called before nepali_ime_engine_init");
            fallback
        }
        Err(_) => {
            error!("panic in {what}");
            fallback
        }
    }
}

#[no_mangle]
pub extern "C" fn nepali_ime_engine_init() {
    let result = catch_unwind(|| {
        let mut slot = engine_slot();
        if slot.is_none() {
            *slot = Some(ImeEngine::from_config_or_default());
            info!("Nepali IME engine initialized");
        }
    });
    if result.is_err() {
        error!("panic during IME engine initialization");
    }
}

#[no_mangle]
pub extern "C" fn nepali_ime_engine_destroy() {
    let _ = catch_unwind(|| {
        if let Some(mut engine) = engine_slot().take() {
            match engine.flush() {
                Ok(()) => info!("personal lexicon saved"),
                Err(e) => error!("failed to save personal lexicon: {e}"),
            }
        }
    });
}

/// # Safety
/// `roman` must be null or a valid NUL-terminated string. The result must be
/// released with `nepali_ime_free_string`.
#[no_mangle]
pub unsafe extern "C" fn nepali_ime_transliterate(roman: *const c_char) -> *mut c_char {
    let roman = read_str(roman);
    let native = with_engine("transliterate", String::new(), |engine| {
        engine.transliterate(roman)
    });
    into_c_string(native)
}

/// Suggestions as a JSON array of strings.
///
/// # Safety
/// Both arguments must be null or valid NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn nepali_ime_get_suggestions(
    native_prefix: *const c_char,
    roman_prefix: *const c_char,
) -> *mut c_char {
    let native_prefix = read_str(native_prefix);
    let roman_prefix = read_str(roman_prefix);
    json_list(with_engine("get_suggestions", Vec::new(), |engine| {
        engine.suggest(native_prefix, roman_prefix)
    }))
}

/// Next-word predictions as a JSON array of strings.
///
/// # Safety
/// `last_word` must be null or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn nepali_ime_get_predictions(last_word: *const c_char) -> *mut c_char {
    let last_word = read_str(last_word);
    json_list(with_engine("get_predictions", Vec::new(), |engine| {
        engine.next_word_predictions(last_word)
    }))
}

/// # Safety
/// `word` must be null or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn nepali_ime_confirm_word(word: *const c_char) {
    let word = read_str(word);
    if !word.is_empty() {
        with_engine("confirm_word", (), |engine| engine.record_use(word));
    }
}

/// Most used words as a JSON array of strings.
#[no_mangle]
pub extern "C" fn nepali_ime_top_words(limit: u32) -> *mut c_char {
    json_list(with_engine("top_words", Vec::new(), |engine| {
        engine.top_words(limit as usize)
    }))
}

/// # Safety
/// `s` must be null or a pointer returned by this library, freed once.
#[no_mangle]
pub unsafe extern "C" fn nepali_ime_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = CString::from_raw(s);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ImeConfig;

    unsafe fn take(s: *mut c_char) -> String {
        let out = CStr::from_ptr(s).to_str().unwrap().to_string();
        nepali_ime_free_string(s);
        out
    }

    #[test]
    fn calls_degrade_before_init_then_work() {
        // Serial: this is the only test touching the global slot.
        engine_slot().take();
        unsafe {
            let roman = CString::new("ghar").unwrap();
            assert_eq!(take(nepali_ime_transliterate(roman.as_ptr())), "");
            assert_eq!(take(nepali_ime_top_words(5)), "[]");

            *engine_slot() = Some(ImeEngine::in_memory(ImeConfig::default()));

            assert_eq!(take(nepali_ime_transliterate(roman.as_ptr())), "घर्");
            let empty = CString::new("").unwrap();
            let nam = CString::new("nam").unwrap();
            assert_eq!(
                take(nepali_ime_get_suggestions(empty.as_ptr(), nam.as_ptr())),
                r#"["नमस्ते"]"#
            );
            let word = CString::new("नमस्ते").unwrap();
            assert_eq!(
                take(nepali_ime_get_predictions(word.as_ptr())),
                r#"["कसरी","तपाईंलाई","के छ"]"#
            );
            nepali_ime_confirm_word(word.as_ptr());
            nepali_ime_confirm_word(ptr::null());
            assert_eq!(take(nepali_ime_top_words(5)), r#"["नमस्ते"]"#);
        }
        engine_slot().take();
    }
}
