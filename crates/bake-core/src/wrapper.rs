//! Wrapper script rendering and parsing.
//!
//! A wrapper is a tiny Python 3 program that re-executes the interpreter
//! against the target script, forwarding every argument. The target is stored
//! as a single field on its own line:
//!
//! ```text
//! script_path = "/home/u/greet.py"
//! ```
//!
//! The value is written as a Python string literal with `\`, `"`, newline and
//! carriage return escaped. For paths without those characters the
//! `script_path` line is the same as in wrappers written by earlier bake
//! releases, so existing wrappers keep parsing.

use std::path::{Path, PathBuf};

use crate::constants::{SCRIPT_PATH_MARKER, WRAPPER_MISSING_TARGET_STATUS};
use crate::errors::BakeError;

/// Render the wrapper script for a target.
///
/// The output is deterministic for a given path. The wrapper re-checks the
/// target at run time and exits with status 127 and a message on stderr if
/// the target has been moved, deleted, or made unreadable.
///
/// # Errors
///
/// Returns [`BakeError::UnsupportedPath`] if the path is not valid UTF-8.
pub fn render(target: &Path) -> Result<String, BakeError> {
    let raw = target
        .to_str()
        .ok_or_else(|| BakeError::UnsupportedPath(target.to_path_buf()))?;
    let status = WRAPPER_MISSING_TARGET_STATUS;

    Ok(format!(
        r#"#!/usr/bin/env python3
import sys
import os

{SCRIPT_PATH_MARKER}{escaped}"

if __name__ == "__main__":
    if not os.path.isfile(script_path):
        sys.stderr.write("bake: target script not found: " + script_path + "\n")
        sys.exit({status})
    if not os.access(script_path, os.R_OK):
        sys.stderr.write("bake: target script is not readable: " + script_path + "\n")
        sys.exit({status})
    args = sys.argv[1:]
    os.execv(sys.executable, [sys.executable, script_path] + args)
"#,
        escaped = escape(raw),
    ))
}

/// Extract the target path from wrapper content.
///
/// Returns `None` when the marker is missing or the quoted value is not
/// terminated.
pub fn parse(content: &str) -> Option<PathBuf> {
    let start = content.find(SCRIPT_PATH_MARKER)? + SCRIPT_PATH_MARKER.len();
    unescape_until_quote(&content[start..]).map(PathBuf::from)
}

/// Like [`parse`], for raw file contents. Non-UTF-8 content has no target.
pub fn parse_bytes(content: &[u8]) -> Option<PathBuf> {
    std::str::from_utf8(content).ok().and_then(parse)
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out
}

fn unescape_until_quote(rest: &str) -> Option<String> {
    let mut out = String::new();
    let mut chars = rest.chars();

    while let Some(c) = chars.next() {
        match c {
            '"' => return Some(out),
            '\n' => return None,
            '\\' => match chars.next()? {
                '\\' => out.push('\\'),
                '"' => out.push('"'),
                'n' => out.push('\n'),
                'r' => out.push('\r'),
                // Python keeps unknown escapes verbatim.
                other => {
                    out.push('\\');
                    out.push(other);
                }
            },
            other => out.push(other),
        }
    }
    None
}
