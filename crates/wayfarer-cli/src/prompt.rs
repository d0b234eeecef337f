//! Terminal prompts: yes/no confirmation and line input.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};

use wayfarer_core::Confirm;

/// Asks on stderr and reads the answer from stdin. Anything other than
/// `y`/`yes` (including EOF) counts as no.
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        eprint!("{prompt} [y/N] ");
        let _ = io::stderr().flush();
        match read_line() {
            Ok(answer) => is_yes(&answer),
            Err(_) => false,
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

fn read_line() -> io::Result<String> {
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line)
}

/// Use `given` if present, otherwise ask for it on stderr.
pub fn value_or_prompt(given: Option<String>, label: &str) -> Result<String> {
    if let Some(v) = given {
        return Ok(v);
    }
    eprint!("{label}: ");
    io::stderr().flush().context("failed to flush stderr")?;
    let line = read_line().with_context(|| format!("failed to read {label}"))?;
    let value = line.trim_end_matches(['\r', '\n']).to_string();
    if value.is_empty() {
        anyhow::bail!("{label} must not be empty");
    }
    Ok(value)
}
