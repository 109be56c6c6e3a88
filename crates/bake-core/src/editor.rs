//! External editor collaborator.
//!
//! `bake edit` hands the wrapper path to an editor and waits for it to exit.

use std::path::Path;
use std::process::Command;

use crate::errors::BakeError;

/// Editor used when nothing else is configured.
pub const DEFAULT_EDITOR: &str = "nano";

/// Something that can open a file for interactive editing.
pub trait EditorLauncher {
    /// Open `path` and block until the editor exits.
    fn open(&self, path: &Path) -> Result<(), BakeError>;
}

/// Launches an editor command line such as `nano` or `code --wait`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandEditor {
    program: String,
    args: Vec<String>,
}

impl CommandEditor {
    /// Parse an editor command line, splitting on whitespace.
    ///
    /// Returns `None` for a blank string.
    pub fn parse(command_line: &str) -> Option<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }

    /// Resolve the editor from `$VISUAL`, `$EDITOR`, the configured editor,
    /// then [`DEFAULT_EDITOR`], taking the first non-blank value.
    pub fn resolve(configured: Option<&str>) -> Self {
        let from_env = |key: &str| std::env::var(key).ok();
        Self::resolve_from(
            from_env("VISUAL").as_deref(),
            from_env("EDITOR").as_deref(),
            configured,
        )
    }

    fn resolve_from(visual: Option<&str>, editor: Option<&str>, configured: Option<&str>) -> Self {
        [visual, editor, configured]
            .into_iter()
            .flatten()
            .find_map(Self::parse)
            .unwrap_or_else(|| Self {
                program: DEFAULT_EDITOR.to_string(),
                args: Vec::new(),
            })
    }

    /// The program that will be executed.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Extra arguments placed before the file path.
    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl EditorLauncher for CommandEditor {
    fn open(&self, path: &Path) -> Result<(), BakeError> {
        tracing::debug!("Launching editor `{}` on {}", self.program, path.display());
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .status()
            .map_err(|e| BakeError::io(path, e))?;

        if status.success() {
            Ok(())
        } else {
            Err(BakeError::EditorFailed {
                editor: self.program.clone(),
                status: status.to_string(),
            })
        }
    }
}
