//! Line-based interactive prompts.
//!
//! Prompts always read from their input, even when it is not a terminal, so
//! answers can be piped in. A destructive confirmation never falls back to an
//! implicit yes.
//!
//! # Example
//!
//! ```rust,ignore
//! use dlite::tui::{LinePrompt, Prompt};
//!
//! let mut prompt = LinePrompt::stdio();
//! let cores = prompt.ask_int("CPU cores to allocate to VM", 2)?;
//! ```

use std::io::{self, BufRead, StdinLock, Stderr, Write};

use teapot::{
    output::{is_ci, is_tty},
    style::{Color, RESET},
};

use super::confirm;
use crate::error::{Error, Result};

/// Interactive question-and-answer source.
///
/// Implementors only provide raw line reading; typed helpers are built on top.
pub trait Prompt {
    /// Ask `question` and return the raw answer, or `None` at end of input.
    fn read_answer(&mut self, question: &str, default: Option<&str>) -> Result<Option<String>>;

    /// Ask a destructive yes/no question. Returns true only for an explicit yes.
    fn confirm(&mut self, question: &str) -> Result<bool>;

    /// Report a rejected answer before asking again.
    fn reject(&mut self, message: &str);

    /// Announce the `(question, default)` pairs about to be asked.
    ///
    /// Prompts that can collect several answers at once may ask them all here;
    /// answers collected this way are returned by later reads.
    fn prefill(&mut self, _questions: &[(&str, &str)]) -> Result<()> {
        Ok(())
    }

    /// Ask for free text, falling back to `default` on an empty answer.
    fn ask_string(&mut self, question: &str, default: &str) -> Result<String> {
        let answer = self.read_answer(question, Some(default))?.ok_or_else(input_closed)?;
        let answer = answer.trim();
        Ok(if answer.is_empty() { default.to_string() } else { answer.to_string() })
    }

    /// Ask for optional free text with no default.
    fn ask(&mut self, question: &str) -> Result<String> {
        let answer = self.read_answer(question, None)?.ok_or_else(input_closed)?;
        Ok(answer.trim().to_string())
    }

    /// Ask for a non-negative integer, asking again until the answer parses.
    fn ask_int(&mut self, question: &str, default: u32) -> Result<u32> {
        let default_text = default.to_string();
        loop {
            let answer =
                self.read_answer(question, Some(&default_text))?.ok_or_else(input_closed)?;
            let answer = answer.trim();
            if answer.is_empty() {
                return Ok(default);
            }
            match answer.parse() {
                Ok(value) => return Ok(value),
                Err(_) => self.reject(&format!("'{answer}' is not a whole number")),
            }
        }
    }

    /// Ask a yes/no question, asking again until the answer is recognized.
    fn ask_bool(&mut self, question: &str, default: bool) -> Result<bool> {
        let default_text = if default { "yes" } else { "no" };
        loop {
            let answer =
                self.read_answer(question, Some(default_text))?.ok_or_else(input_closed)?;
            match answer.trim().to_lowercase().as_str() {
                "" => return Ok(default),
                "y" | "yes" | "true" => return Ok(true),
                "n" | "no" | "false" => return Ok(false),
                other => self.reject(&format!("'{other}' is not yes or no")),
            }
        }
    }
}

fn input_closed() -> Error {
    Error::cancelled("Input closed, aborting initialization...")
}

/// Prompt that writes questions to `W` and reads answers line by line from `R`.
pub struct LinePrompt<R, W> {
    input: R,
    output: W,
    styled: bool,
}

impl LinePrompt<StdinLock<'static>, Stderr> {
    /// Prompt on the process's stdin and stderr.
    pub fn stdio() -> Self {
        Self { input: io::stdin().lock(), output: io::stderr(), styled: is_tty() && !is_ci() }
    }
}

/// Line prompt on stdin and stderr that locks stdin only while reading.
///
/// Lets other stdin readers, such as forms, take turns with it.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdioPrompt;

impl Prompt for StdioPrompt {
    fn read_answer(&mut self, question: &str, default: Option<&str>) -> Result<Option<String>> {
        LinePrompt::stdio().read_answer(question, default)
    }

    fn confirm(&mut self, question: &str) -> Result<bool> {
        LinePrompt::stdio().confirm(question)
    }

    fn reject(&mut self, message: &str) {
        LinePrompt::stdio().reject(message);
    }
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    /// Create an unstyled prompt over arbitrary streams.
    pub fn new(input: R, output: W) -> Self {
        Self { input, output, styled: false }
    }

    /// Consume the prompt, returning the output stream.
    pub fn into_output(self) -> W {
        self.output
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn format_question(&self, question: &str, default: Option<&str>) -> String {
        let default = default.filter(|d| !d.is_empty());
        if self.styled {
            let cyan = Color::Cyan.to_ansi_fg();
            let dim = Color::BrightBlack.to_ansi_fg();
            match default {
                Some(d) => format!("{cyan}?{RESET} {question} {dim}({d}){RESET}: "),
                None => format!("{cyan}?{RESET} {question}: "),
            }
        } else {
            match default {
                Some(d) => format!("{question} ({d}): "),
                None => format!("{question}: "),
            }
        }
    }
}

impl<R: BufRead, W: Write> Prompt for LinePrompt<R, W> {
    fn read_answer(&mut self, question: &str, default: Option<&str>) -> Result<Option<String>> {
        let text = self.format_question(question, default);
        write!(self.output, "{text}")?;
        self.output.flush()?;
        self.read_line()
    }

    fn confirm(&mut self, question: &str) -> Result<bool> {
        let text =
            if self.styled { confirm::render_danger(question) } else { format!("{question} (y/n) ") };
        write!(self.output, "{text}")?;
        self.output.flush()?;
        Ok(self.read_line()?.is_some_and(|answer| confirm::is_confirmed(&answer)))
    }

    fn reject(&mut self, message: &str) {
        let _ = writeln!(self.output, "{message}, please try again");
    }
}
