//! User input and interaction handling.
//! All console interaction goes through the [`Prompter`] trait so that the
//! collection and hook logic can be driven by scripted input in tests.

use crate::error::{Error, Result};
use dialoguer::{Confirm, Input};
use std::io::{self, BufRead, IsTerminal, Write};

/// Source of user answers.
pub trait Prompter {
    /// Shows `prompt` and reads one line of input, without the line terminator.
    ///
    /// # Errors
    /// Returns an error when the input stream fails or is closed. Callers treat
    /// this as a hard abort.
    fn read_line(&self, prompt: &str) -> Result<String>;

    /// Asks a yes/no question. `default` is used for an empty answer.
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool>;

    /// Shows a message to the user, e.g. why an answer was rejected.
    fn notify(&self, message: &str);
}

/// Console prompter. Uses dialoguer when attached to a terminal and plain
/// line reads from stdin otherwise, so answers can be piped in.
#[derive(Debug, Default)]
pub struct DialoguerPrompter {}

impl DialoguerPrompter {
    pub fn new() -> Self {
        Self {}
    }

    fn read_stdin_line(prompt: &str) -> Result<String> {
        print!("{prompt} ");
        io::stdout().flush()?;

        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line)?;
        if read == 0 {
            return Err(Error::PromptError("end of input".to_string()));
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

impl Prompter for DialoguerPrompter {
    fn read_line(&self, prompt: &str) -> Result<String> {
        if !io::stdin().is_terminal() {
            return Self::read_stdin_line(prompt);
        }

        Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .map_err(|e| Error::PromptError(e.to_string()))
    }

    fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        if !io::stdin().is_terminal() {
            let hint = if default { "[Y/n]" } else { "[y/N]" };
            let answer = Self::read_stdin_line(&format!("{prompt} {hint}"))?;
            return Ok(confirm_answer(&answer, default));
        }

        Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()
            .map_err(|e| Error::PromptError(e.to_string()))
    }

    fn notify(&self, message: &str) {
        eprintln!("{message}");
    }
}

/// Parses a yes/no style answer, case-insensitively.
///
/// `y`, `yes`, `true`, `1` are true; `n`, `no`, `false`, `0` are false.
/// Anything else is `None`.
pub fn parse_bool(input: &str) -> Option<bool> {
    match input.trim().to_lowercase().as_str() {
        "y" | "yes" | "true" | "1" => Some(true),
        "n" | "no" | "false" | "0" => Some(false),
        _ => None,
    }
}

/// Interprets a confirmation answer: empty keeps `default`, unrecognised means no.
pub fn confirm_answer(answer: &str, default: bool) -> bool {
    if answer.trim().is_empty() {
        return default;
    }
    parse_bool(answer).unwrap_or(false)
}
