//! # CLI UI Module
//!
//! Styling and formatting layer for bake's terminal output.
//!
//! ## Design Principles
//!
//! 1. **Scannable**: every line starts with a status prefix (`[ok]`, `[err]`, ...)
//! 2. **Accessible**: works without colors (respects `NO_COLOR`)
//! 3. **Scriptable**: `--json` output goes to stdout, prompts and errors to stderr
//!
//! ## Module Structure
//!
//! - `color`: Color mode detection and terminal capability checks
//! - `console`: Terminal implementation of the registry's `Console`
//! - `style`: Message types, prefixes, and styling functions
//! - `format`: Path shortening, relative time, truncation
//! - `table`: The `bake list` table

pub mod color;
pub mod console;
pub mod format;
pub mod style;
pub mod table;

pub use color::ColorMode;
pub use console::TerminalConsole;
pub use style::{MessageType, Style};
