//! Terminal implementation of the registry's [`Console`].
//!
//! Success and info lines go to stdout and are silenced by `--quiet`.
//! Warnings, errors, and prompts go to stderr so `--json` output stays clean.

use std::io::{self, BufRead, Write};

use bake_core::{Confirmation, Console};

use super::style::{MessageType, Style};

/// Console backed by stdout/stderr and a line read from stdin.
#[derive(Debug, Clone, Copy)]
pub struct TerminalConsole {
    style: Style,
    quiet: bool,
}

impl TerminalConsole {
    /// Create a console styled with `style`. With `quiet`, success and info
    /// lines are dropped.
    pub fn new(style: Style, quiet: bool) -> Self {
        Self { style, quiet }
    }
}

/// Interpret a prompt answer. Only `y`/`yes` (any case) confirm.
fn parse_answer(line: &str) -> Confirmation {
    match line.trim().to_lowercase().as_str() {
        "y" | "yes" => Confirmation::Yes,
        _ => Confirmation::No,
    }
}

impl Console for TerminalConsole {
    fn success(&self, msg: &str) {
        if !self.quiet {
            println!("{}", self.style.message(MessageType::Ok, msg));
        }
    }

    fn error(&self, msg: &str) {
        eprintln!("{}", self.style.message(MessageType::Err, msg));
    }

    fn info(&self, msg: &str) {
        if !self.quiet {
            println!("{}", self.style.message(MessageType::Info, msg));
        }
    }

    fn warn(&self, msg: &str) {
        eprintln!("{}", self.style.message(MessageType::Warn, msg));
    }

    fn confirm(&self, prompt: &str) -> Confirmation {
        ask(&mut io::stderr(), &mut io::stdin().lock(), prompt)
    }
}

/// Write `prompt` to `out` and read one answer line from `input`.
///
/// A prompt that cannot be shown is never answered.
fn ask(out: &mut impl Write, input: &mut impl BufRead, prompt: &str) -> Confirmation {
    if let Err(e) = write!(out, "{} [y/N] ", prompt).and_then(|()| out.flush()) {
        tracing::debug!("Failed to show confirmation prompt: {}", e);
        return Confirmation::Unavailable;
    }

    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(0) => {
            if let Err(e) = writeln!(out) {
                tracing::debug!("Failed to finish prompt line: {}", e);
            }
            Confirmation::Unavailable
        }
        Ok(_) => parse_answer(&line),
        Err(e) => {
            tracing::debug!("Failed to read confirmation: {}", e);
            Confirmation::Unavailable
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_answer() {
        assert_eq!(parse_answer("y\n"), Confirmation::Yes);
        assert_eq!(parse_answer(" YES \n"), Confirmation::Yes);
        assert_eq!(parse_answer("n\n"), Confirmation::No);
        assert_eq!(parse_answer("\n"), Confirmation::No);
        assert_eq!(parse_answer("yep"), Confirmation::No);
    }

    struct ClosedOutput;

    impl Write for ClosedOutput {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    #[test]
    fn test_ask_reads_answer_after_prompt() {
        let mut out = Vec::new();
        let answer = ask(&mut out, &mut io::Cursor::new("yes\n"), "Overwrite `greet`?");
        assert_eq!(answer, Confirmation::Yes);
        assert_eq!(String::from_utf8(out).unwrap(), "Overwrite `greet`? [y/N] ");
    }

    #[test]
    fn test_ask_without_input_is_unavailable() {
        let mut out = Vec::new();
        let answer = ask(&mut out, &mut io::Cursor::new(""), "Delete all?");
        assert_eq!(answer, Confirmation::Unavailable);
    }

    #[test]
    fn test_ask_with_closed_output_does_not_read() {
        let mut input = io::Cursor::new("y\n");
        let answer = ask(&mut ClosedOutput, &mut input, "Overwrite `greet`?");
        assert_eq!(answer, Confirmation::Unavailable);
        assert_eq!(input.position(), 0);
    }
}
