//! Form-backed prompts for interactive terminals.
//!
//! On a terminal the configuration questions are shown together as one
//! Teapot form. Anything the form does not answer, such as a re-ask after an
//! invalid value or a destructive confirmation, goes to a line prompt.
//!
//! # Example
//!
//! ```rust,ignore
//! use dlite::tui::{FormPrompt, Prompt, StdioPrompt};
//!
//! let mut prompt = FormPrompt::new("Configure dlite", StdioPrompt);
//! prompt.prefill(&[("CPU cores to allocate to VM", "2")])?;
//! let cores = prompt.ask_int("CPU cores to allocate to VM", 2)?;
//! ```

use std::{
    collections::HashMap,
    io::{self, IsTerminal},
};

use teapot::{
    forms::{Form, FormResults, Group, InputField},
    output::{is_ci, is_tty},
};

use super::prompt::Prompt;
use crate::error::{Error, Result};

/// Run a form and return its results.
///
/// Returns `None` if the form was cancelled.
pub fn run_form(mut form: Form) -> Result<Option<FormResults>> {
    form.run_accessible().map_err(|e| Error::other(e.to_string()))
}

/// Check if forms should use accessible (plain text) mode.
pub fn is_accessible() -> bool {
    std::env::var_os("ACCESSIBLE").is_some() || !is_tty() || is_ci()
}

/// Whether questions should be asked with a form rather than line by line.
///
/// Piped answers always go through the line prompt.
pub fn use_forms() -> bool {
    !is_accessible() && io::stdin().is_terminal()
}

/// One text field per `(question, default)` pair, keyed by its question.
fn question_group(questions: &[(&str, &str)]) -> Group {
    questions.iter().fold(Group::new(), |group, (question, default)| {
        group.field(InputField::new(*question).title(*question).default(*default).build())
    })
}

/// Prompt that collects prefilled questions with a single form.
pub struct FormPrompt<P> {
    title: String,
    fallback: P,
    answers: HashMap<String, String>,
}

impl<P: Prompt> FormPrompt<P> {
    /// Create a form prompt that sends everything else to `fallback`.
    pub fn new(title: impl Into<String>, fallback: P) -> Self {
        Self { title: title.into(), fallback, answers: HashMap::new() }
    }

    /// Keep the form's answer for each question.
    fn load(&mut self, questions: &[(&str, &str)], results: &FormResults) {
        for (question, _) in questions {
            if let Some(answer) = results.get_string(question) {
                self.answers.insert((*question).to_string(), answer.to_string());
            }
        }
    }
}

impl<P: Prompt> Prompt for FormPrompt<P> {
    fn prefill(&mut self, questions: &[(&str, &str)]) -> Result<()> {
        let form = Form::new().title(&self.title).group(question_group(questions));
        let results = run_form(form)?
            .ok_or_else(|| Error::cancelled("Aborting initialization..."))?;
        self.load(questions, &results);
        Ok(())
    }

    fn read_answer(&mut self, question: &str, default: Option<&str>) -> Result<Option<String>> {
        match self.answers.remove(question) {
            Some(answer) => Ok(Some(answer)),
            None => self.fallback.read_answer(question, default),
        }
    }

    fn confirm(&mut self, question: &str) -> Result<bool> {
        self.fallback.confirm(question)
    }

    fn reject(&mut self, message: &str) {
        self.fallback.reject(message);
    }
}
