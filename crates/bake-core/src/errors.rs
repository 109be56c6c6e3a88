//! Error types for bake-core.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for registry operations.
pub type Result<T> = std::result::Result<T, BakeError>;

/// Domain-specific errors for bake operations.
///
/// Every registry operation reports failures through this type and never
/// terminates the process; the front end decides exit codes.
#[derive(Error, Debug)]
pub enum BakeError {
    /// The environment does not provide what bake needs (e.g. no home directory).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The config file exists but could not be read or parsed.
    #[error("Invalid config at `{path}`: {message}")]
    InvalidConfig {
        /// Path to the config file.
        path: PathBuf,
        /// Description of the problem.
        message: String,
    },

    /// The command name is malformed or reserved.
    #[error("Invalid command name `{name}`: {reason}")]
    InvalidName {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The script to register does not exist.
    #[error("Script not found: {0}")]
    ScriptNotFound(PathBuf),

    /// The script path exists but is not a regular file.
    #[error("Not a regular file: {0}")]
    NotAFile(PathBuf),

    /// The script exists but cannot be read by the current user.
    #[error("Script is not readable: {0}")]
    UnreadableScript(PathBuf),

    /// The path cannot be embedded in a wrapper (it is not valid UTF-8).
    #[error("Unsupported path (not valid UTF-8): {0}")]
    UnsupportedPath(PathBuf),

    /// No command is registered under this name.
    #[error("Command not found: {0}")]
    NotFound(String),

    /// A command with this name is already registered and no confirmation
    /// could be obtained. Pass `--force` to overwrite.
    #[error("Command `{name}` already exists (-> {}). Use --force to overwrite.", .target.as_ref().map(|t| t.display().to_string()).unwrap_or_else(|| "unknown target".to_string()))]
    AlreadyExists {
        /// The conflicting name.
        name: String,
        /// The target it currently points at, when readable.
        target: Option<PathBuf>,
    },

    /// Rename was asked to rename a command to its own name.
    #[error("Nothing to do: `{0}` is already named `{0}`")]
    SameName(String),

    /// The bin directory holds an entry bake did not create.
    #[error("`{}` exists and is not managed by bake; refusing to replace it", .0.display())]
    ForeignBinEntry(PathBuf),

    /// The wrapper script exists but no target path could be read from it.
    #[error("Wrapper for `{name}` is corrupt: no script_path found in {}", .path.display())]
    CorruptWrapper {
        /// The command name.
        name: String,
        /// The wrapper path.
        path: PathBuf,
    },

    /// One half of a paired symlink/wrapper operation failed.
    #[error("`{name}` was only partially removed; still present: {}", display_paths(.remaining))]
    PartialFailure {
        /// The command name.
        name: String,
        /// Paths that could not be removed and need manual cleanup.
        remaining: Vec<PathBuf>,
        /// The underlying failure message(s).
        reason: String,
    },

    /// The external editor exited unsuccessfully.
    #[error("Editor `{editor}` exited with {status}")]
    EditorFailed {
        /// The editor program that was launched.
        editor: String,
        /// Exit status description.
        status: String,
    },

    /// A filesystem operation failed.
    #[error("I/O error at `{}`: {source}", .path.display())]
    Io {
        /// The path that was being operated on.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl BakeError {
    /// Wrap an I/O error with the path that was being operated on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
