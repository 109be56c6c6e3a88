//! Common constants used throughout bake-core.
//!
//! This module centralizes directory names, file names, and the reserved
//! command list to keep the persisted layout consistent across the codebase.

// ============================================================================
// Tool identity
// ============================================================================

/// The tool's own command name. Never usable as a registered command.
pub const TOOL_NAME: &str = "bake";

// ============================================================================
// Directory Layout
// ============================================================================

/// Path segments from `$HOME` to the user bin directory (`~/.local/bin`).
pub const USER_BIN_SEGMENTS: &[&str] = &[".local", "bin"];

/// Path segments from `$HOME` to the install directory (`~/.local/lib/bake`).
pub const INSTALL_DIR_SEGMENTS: &[&str] = &[".local", "lib", TOOL_NAME];

/// Subdirectory of the install directory that holds wrapper scripts.
pub const WRAPPER_SCRIPTS_DIR: &str = "scripts";

/// Config file name inside the install directory.
pub const CONFIG_FILENAME: &str = "config.yaml";

/// Prefix for the hidden staging files written before a wrapper is moved
/// into place. Entries starting with `.` are never listed as commands.
pub const STAGING_PREFIX: &str = ".";

/// Suffix for wrapper staging files.
pub const STAGING_SUFFIX: &str = ".bake-tmp";

// ============================================================================
// Wrapper format
// ============================================================================

/// Marker that precedes the quoted target path inside a wrapper script.
pub const SCRIPT_PATH_MARKER: &str = "script_path = \"";

/// Permission bits applied to generated wrappers.
pub const WRAPPER_MODE: u32 = 0o755;

/// Exit status of a wrapper whose target script disappeared.
pub const WRAPPER_MISSING_TARGET_STATUS: i32 = 127;

// ============================================================================
// Reserved command names
// ============================================================================

/// System commands that can never be shadowed by a registered command.
///
/// Compared case-insensitively.
pub const RESERVED_COMMANDS: &[&str] = &[
    "bash", "cat", "cd", "chmod", "chown", "cp", "curl", "echo", "env", "git", "grep", "kill",
    "less", "ln", "ls", "make", "man", "mkdir", "mv", "node", "npm", "pip", "pip3", "ps", "pwd",
    "python", "python3", "rm", "rmdir", "sed", "sh", "ssh", "sudo", "tar", "top", "touch", "vi",
    "vim", "which", "zsh",
];

/// Check if a name collides with the tool name or a reserved system command.
#[inline]
pub fn is_reserved(name: &str) -> bool {
    name.eq_ignore_ascii_case(TOOL_NAME)
        || RESERVED_COMMANDS
            .iter()
            .any(|reserved| reserved.eq_ignore_ascii_case(name))
}
