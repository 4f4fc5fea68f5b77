use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::style::Stylize;
use crossterm::terminal::{Clear, ClearType};
use ime_core::ImeEngine;
use std::io::{self, stdin, stdout, Write};
use tracing_subscriber::EnvFilter;

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let mut engine = ImeEngine::from_config_or_default();

    loop {
        let suggestions = engine.current_suggestions();
        let predictions = engine.current_predictions();
        print_ui(&mut engine, &suggestions, &predictions)?;

        let mut input = String::new();
        if stdin().read_line(&mut input)? == 0 {
            break;
        }
        let cmd = input.trim_end_matches(&['\r', '\n'][..]);

        match cmd {
            "exit" => break,
            ":clear" => engine.clear_all(),
            ":back" => {
                engine.backspace();
            }
            "" => {
                // Enter: commit the preview as typed
                engine.finalize_word();
            }
            s if s.starts_with(":p") => {
                if let Some(word) = pick(&s[2..], &predictions) {
                    engine.select_candidate(&word);
                }
            }
            s if s.starts_with(':') => {
                if let Some(word) = pick(&s[1..], &suggestions) {
                    engine.select_candidate(&word);
                }
            }
            s => {
                // Spaces separate words, just as the space bar would.
                let mut words = s.split(' ').peekable();
                while let Some(part) = words.next() {
                    engine.push_str(part);
                    if words.peek().is_some() {
                        engine.finalize_word();
                    }
                }
            }
        }
    }

    println!("\nSaving personal lexicon...");
    match engine.flush() {
        Ok(()) => println!("Saved to '{}'", engine.config().store.path.display()),
        Err(e) => eprintln!("[ERROR] Could not save personal lexicon: {e}"),
    }
    Ok(())
}

/// Resolves a 1-based index typed after `:` or `:p`.
fn pick(index: &str, options: &[String]) -> Option<String> {
    let n: usize = index.trim().parse().ok()?;
    options.get(n.checked_sub(1)?).cloned()
}

fn print_ui(engine: &mut ImeEngine, suggestions: &[String], predictions: &[String]) -> io::Result<()> {
    let mut out = stdout();
    execute!(out, Clear(ClearType::All), MoveTo(0, 0))?;

    writeln!(out, "{}", "Nepali Typer Simulator".bold())?;
    writeln!(out, "---------------------------------------------------------------")?;
    writeln!(out, "Type roman text and press [Enter] to commit the preview.")?;
    writeln!(out, "':1' picks a suggestion, ':p1' a prediction, ':back', ':clear', 'exit'.\n")?;

    writeln!(out, "Text:      {}", engine.composed_text().green())?;
    writeln!(out, "Pre-edit:  [{}]", engine.preedit())?;
    writeln!(out, "Preview -> {}", engine.preview().cyan().bold())?;

    print_list(&mut out, "Suggestions", ":", suggestions)?;
    print_list(&mut out, "Next word", ":p", predictions)?;

    let learned = engine.learned_words();
    if !learned.is_empty() {
        writeln!(out, "\n{} {}", "Frequent:".dark_grey(), learned.join(", ").dark_grey())?;
    }

    write!(out, "\n> ")?;
    out.flush()
}

fn print_list(out: &mut io::Stdout, title: &str, prefix: &str, words: &[String]) -> io::Result<()> {
    if words.is_empty() {
        return Ok(());
    }
    writeln!(out, "\n{title}:")?;
    for (i, word) in words.iter().enumerate() {
        writeln!(out, "  {}{} {}", prefix.yellow(), (i + 1).to_string().yellow(), word)?;
    }
    Ok(())
}
