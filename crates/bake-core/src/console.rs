//! The console capability the registry reports through.
//!
//! The registry never prints or formats anything itself. It hands messages to
//! a [`Console`] and asks it for confirmation; the CLI supplies a terminal
//! implementation. A `RecordingConsole` is available under `#[cfg(test)]`
//! for exercising prompts without a terminal.

#[cfg(test)]
use std::cell::RefCell;
#[cfg(test)]
use std::collections::VecDeque;

/// Answer to a confirmation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// The user agreed.
    Yes,
    /// The user declined.
    No,
    /// No answer could be obtained (closed or non-interactive input).
    Unavailable,
}

/// Narrow output/prompt interface used by registry operations.
pub trait Console {
    /// Report a successful outcome.
    fn success(&self, msg: &str);
    /// Report a failure.
    fn error(&self, msg: &str);
    /// Report neutral information.
    fn info(&self, msg: &str);
    /// Report a warning.
    fn warn(&self, msg: &str);
    /// Ask a yes/no question.
    fn confirm(&self, prompt: &str) -> Confirmation;
}

/// Message severity captured by [`RecordingConsole`].
#[cfg(test)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// `success`
    Success,
    /// `error`
    Error,
    /// `info`
    Info,
    /// `warn`
    Warn,
    /// `confirm` prompt
    Prompt,
}

/// A console that records everything and answers prompts from a script.
///
/// When the scripted answers run out, prompts get [`Confirmation::Unavailable`].
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingConsole {
    messages: RefCell<Vec<(Level, String)>>,
    answers: RefCell<VecDeque<Confirmation>>,
}

#[cfg(test)]
impl RecordingConsole {
    /// Create a console with no scripted answers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a console that answers prompts in order.
    pub fn answering(answers: impl IntoIterator<Item = Confirmation>) -> Self {
        Self {
            messages: RefCell::default(),
            answers: RefCell::new(answers.into_iter().collect()),
        }
    }

    /// Recorded messages of a single level.
    pub fn at(&self, level: Level) -> Vec<String> {
        self.messages
            .borrow()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    fn record(&self, level: Level, msg: &str) {
        self.messages.borrow_mut().push((level, msg.to_string()));
    }
}

#[cfg(test)]
impl Console for RecordingConsole {
    fn success(&self, msg: &str) {
        self.record(Level::Success, msg);
    }

    fn error(&self, msg: &str) {
        self.record(Level::Error, msg);
    }

    fn info(&self, msg: &str) {
        self.record(Level::Info, msg);
    }

    fn warn(&self, msg: &str) {
        self.record(Level::Warn, msg);
    }

    fn confirm(&self, prompt: &str) -> Confirmation {
        self.record(Level::Prompt, prompt);
        self.answers
            .borrow_mut()
            .pop_front()
            .unwrap_or(Confirmation::Unavailable)
    }
}
