//! # bake-core
//!
//! Command registry library for `bake`.
//!
//! `bake` turns a script on disk into a named shell command. For every command
//! it writes a small wrapper script into `~/.local/lib/bake/scripts/` and
//! symlinks it from `~/.local/bin/`. This crate owns those two artifacts and
//! keeps them consistent; it never prints anything itself.
//!
//! ## Main Types
//!
//! - [`Registry`] – add, edit, delete, rename, list, show, and purge commands
//! - [`BakePaths`] – the install layout derived from the home directory
//! - [`CommandName`] – a validated command name
//! - [`BakeError`] – domain-specific error type
//!
//! ## Modules
//!
//! - [`config`] – optional YAML configuration
//! - [`console`] – the output/confirmation capability operations report through
//! - [`editor`] – external editor launcher
//! - [`fs`] – filesystem seam ([`OsFs`] at runtime)
//! - [`wrapper`] – wrapper script rendering and parsing
//!
//! ## Example
//!
//! ```ignore
//! use bake_core::{BakePaths, Registry};
//! use std::path::Path;
//!
//! let registry = Registry::open(BakePaths::from_env()?);
//! let console = MyConsole::default(); // any `Console` implementation
//! registry.add("greet", Path::new("greet.py"), false, &console)?;
//! registry.rename("greet", "hello", false, &console)?;
//! registry.delete("hello")?;
//! ```

// Modules
pub mod config;
pub mod console;
pub mod constants;
pub mod editor;
pub mod errors;
pub mod fs;
pub mod name;
pub mod paths;
pub mod registry;
pub mod wrapper;

// Re-exports for convenience
pub use config::BakeConfig;
pub use console::{Confirmation, Console};
pub use editor::{CommandEditor, EditorLauncher};
pub use errors::{BakeError, Result};
pub use fs::{EntryKind, FileSystem, OsFs};
pub use name::CommandName;
pub use paths::BakePaths;
pub use registry::{
    AddReport, CommandEntry, CommandHealth, DeleteReport, Outcome, PurgeReport, Registry,
    Removal, RenameReport,
};
