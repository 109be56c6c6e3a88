//! Validated command names.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::constants::{is_reserved, TOOL_NAME};
use crate::errors::BakeError;

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_-]*$").expect("Invalid regex"));

/// A command name that passed validation.
///
/// Names start with an ASCII letter, continue with letters, digits, `_` or `-`,
/// and are case-insensitively distinct from `bake` and the reserved system
/// commands.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandName(String);

impl CommandName {
    /// Validate and wrap a raw name.
    ///
    /// # Errors
    ///
    /// Returns [`BakeError::InvalidName`] with a human-readable reason.
    pub fn new(raw: &str) -> Result<Self, BakeError> {
        let invalid = |reason: &str| BakeError::InvalidName {
            name: raw.to_string(),
            reason: reason.to_string(),
        };

        if raw.is_empty() {
            return Err(invalid("name must not be empty"));
        }
        if !NAME_RE.is_match(raw) {
            return Err(invalid(
                "must start with a letter and contain only letters, digits, '_' or '-'",
            ));
        }
        if raw.eq_ignore_ascii_case(TOOL_NAME) {
            return Err(invalid("this name is used by bake itself"));
        }
        if is_reserved(raw) {
            return Err(invalid("this name is reserved for a system command"));
        }

        Ok(Self(raw.to_string()))
    }

    /// Wrap the name of a command that may already be registered.
    ///
    /// Looking up, deleting, or renaming a command only requires that the
    /// name stays inside its directory, so wrappers created under older,
    /// looser naming rules remain reachable.
    ///
    /// # Errors
    ///
    /// Returns [`BakeError::InvalidName`] for an empty name, a path
    /// separator, or a leading `.`.
    pub fn existing(raw: &str) -> Result<Self, BakeError> {
        let reason = if raw.is_empty() {
            Some("name must not be empty")
        } else if raw.contains(['/', '\\', '\0']) {
            Some("name must not contain path separators")
        } else if raw.starts_with('.') {
            Some("name must not start with '.'")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(BakeError::InvalidName {
                name: raw.to_string(),
                reason: reason.to_string(),
            }),
            None => Ok(Self(raw.to_string())),
        }
    }

    /// Get the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommandName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CommandName {
    type Err = BakeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for CommandName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
