use ime_core::ImeEngine;
use std::io::{self, BufRead, Write};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

const KEY_SPACE: u32 = 32;
const KEY_RETURN: u32 = 65293;
const KEY_TAB: u32 = 65289;
const KEY_BACKSPACE: u32 = 65288;
const KEY_ESCAPE: u32 = 65307;

fn init_logging() {
    // stdout carries the protocol, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();
}

fn main() -> io::Result<()> {
    init_logging();
    info!("Nepali IME engine starting");

    let mut engine = ImeEngine::from_config_or_default();
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let input = line?;
        debug!(?input, "<-");
        let parts: Vec<&str> = input.split_whitespace().collect();
        let command = parts.first().copied().unwrap_or("");

        match command {
            "PROCESS_KEY_EVENT" => {
                let key_val: u32 = parts.get(1).and_then(|s| s.parse().ok()).unwrap_or(0);
                if handle_key_event(key_val, &mut engine, &mut stdout)? {
                    update_frontend(&engine, &mut stdout)?;
                }
            }
            "EXIT" => {
                info!("received EXIT, saving personal lexicon");
                if let Err(e) = engine.flush() {
                    error!("error saving personal lexicon: {e}");
                }
                break;
            }
            _ => debug!(command, "unknown command"),
        }
    }
    info!("shutting down");
    Ok(())
}

fn send(stdout: &mut io::Stdout, cmd: &str) -> io::Result<()> {
    debug!(cmd, "->");
    writeln!(stdout, "{cmd}")
}

/// Applies one key. Returns whether the preedit/lookup table changed.
fn handle_key_event(key_val: u32, engine: &mut ImeEngine, stdout: &mut io::Stdout) -> io::Result<bool> {
    match key_val {
        KEY_SPACE | KEY_RETURN => {
            match engine.finalize_word() {
                Some(word) => send(stdout, &format!("COMMIT_TEXT {word} "))?,
                None => send(stdout, "COMMIT_TEXT  ")?, // bare space
            }
        }
        KEY_TAB => {
            let top = engine.current_suggestions().into_iter().next();
            match top {
                Some(word) => {
                    engine.select_candidate(&word);
                    send(stdout, &format!("COMMIT_TEXT {word} "))?;
                }
                None => return Ok(false),
            }
        }
        KEY_BACKSPACE => {
            if !engine.backspace() {
                return Ok(false);
            }
        }
        KEY_ESCAPE => engine.cancel_word(),
        _ => match char::from_u32(key_val) {
            // Case matters: capitals select retroflex consonants and marks.
            Some(c) if c.is_ascii_graphic() => engine.push_char(c),
            _ => return Ok(false),
        },
    }
    Ok(true)
}

fn update_frontend(engine: &ImeEngine, stdout: &mut io::Stdout) -> io::Result<()> {
    send(stdout, &format!("UPDATE_PREEDIT_TEXT {} 0 true", engine.preview()))?;
    send(stdout, "UPDATE_LOOKUP_TABLE")?;

    let candidates = if engine.preedit().is_empty() {
        engine.current_predictions()
    } else {
        engine.current_suggestions()
    };

    if candidates.is_empty() {
        send(stdout, "HIDE_LOOKUP_TABLE")?;
    } else {
        for (i, word) in candidates.iter().enumerate() {
            send(stdout, &format!("ADD_CANDIDATE {i} '{word}' {i}"))?;
        }
        send(stdout, "SHOW_LOOKUP_TABLE")?;
    }
    stdout.flush()
}
