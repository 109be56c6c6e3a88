//! Configuration for bake.
//!
//! The optional config file lives at `~/.local/lib/bake/config.yaml`:
//!
//! ```yaml
//! # Editor for `bake edit` (overridden by $VISUAL / $EDITOR)
//! editor: code --wait
//! # Color output: always, never, auto
//! color: auto
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::BakeError;

/// Accepted values for the `color` setting.
pub const COLOR_MODES: &[&str] = &["always", "never", "auto"];

/// User-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BakeConfig {
    /// Editor command line used by `bake edit` when neither `$VISUAL` nor
    /// `$EDITOR` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor: Option<String>,

    /// Color output mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl BakeConfig {
    /// Load the configuration from a path.
    ///
    /// If the file does not exist, returns the default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`BakeError::InvalidConfig`] if the file exists but cannot be
    /// read or parsed.
    pub fn from_path(path: &Path) -> Result<Self, BakeError> {
        if !path.exists() {
            tracing::debug!("Config not found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| BakeError::InvalidConfig {
            path: path.to_path_buf(),
            message: format!("failed to read: {}", e),
        })?;

        // An empty file parses as YAML null.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Self = serde_yaml::from_str(&content).map_err(|e| BakeError::InvalidConfig {
            path: path.to_path_buf(),
            message: format!("failed to parse: {}", e),
        })?;

        for warning in config.validate() {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok(config)
    }

    /// Check values that parse but make no sense. Returns warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if let Some(color) = &self.color {
            if !COLOR_MODES.contains(&color.to_lowercase().as_str()) {
                warnings.push(format!(
                    "unknown color mode '{}', expected one of: {}",
                    color,
                    COLOR_MODES.join(", ")
                ));
            }
        }

        if matches!(&self.editor, Some(editor) if editor.trim().is_empty()) {
            warnings.push("editor is blank and will be ignored".to_string());
        }

        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let config = BakeConfig::from_path(&temp.path().join("config.yaml")).unwrap();
        assert_eq!(config, BakeConfig::default());
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(&path, "\n").unwrap();
        assert_eq!(BakeConfig::from_path(&path).unwrap(), BakeConfig::default());
    }

    #[test]
    fn test_from_yaml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(&path, "editor: code --wait\ncolor: never\n").unwrap();
        let config = BakeConfig::from_path(&path).unwrap();
        assert_eq!(config.editor.as_deref(), Some("code --wait"));
        assert_eq!(config.color.as_deref(), Some("never"));
    }

    #[test]
    fn test_invalid_yaml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(&path, "editor: [unclosed").unwrap();
        let err = BakeConfig::from_path(&path).unwrap_err();
        assert!(matches!(err, BakeError::InvalidConfig { .. }));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(&path, "editr: vim\n").unwrap();
        assert!(BakeConfig::from_path(&path).is_err());
    }

    #[test]
    fn test_validate_warnings() {
        let config = BakeConfig {
            editor: Some("  ".to_string()),
            color: Some("rainbow".to_string()),
        };
        let warnings = config.validate();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("rainbow"));

        assert!(BakeConfig {
            editor: Some("vim".to_string()),
            color: Some("ALWAYS".to_string()),
        }
        .validate()
        .is_empty());
    }
}
