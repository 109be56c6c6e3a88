//! # bake CLI
//!
//! Turns scripts into named shell commands.
//!
//! This binary is a thin front end over `bake-core`: it parses arguments,
//! renders output, and maps errors to exit codes. Run `bake --help` for usage.

mod cli;
pub mod ui;

use std::process::ExitCode;

fn main() -> ExitCode {
    cli::run()
}
