//! Well-known filesystem locations.
//!
//! Every location bake touches is derived from a single home directory, so
//! tests can point the whole registry at a temporary directory.

use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;

use crate::constants::{
    CONFIG_FILENAME, INSTALL_DIR_SEGMENTS, TOOL_NAME, USER_BIN_SEGMENTS, WRAPPER_SCRIPTS_DIR,
};
use crate::errors::BakeError;
use crate::name::CommandName;

/// Resolved bake locations for one home directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BakePaths {
    /// The home directory everything is derived from.
    home: PathBuf,
    /// `~/.local/lib/bake`
    install_dir: PathBuf,
    /// `~/.local/lib/bake/scripts`
    wrapper_dir: PathBuf,
    /// `~/.local/bin`
    user_bin_dir: PathBuf,
    /// `~/.local/bin/bake`
    install_link: PathBuf,
    /// `~/.local/lib/bake/config.yaml`
    config_file: PathBuf,
}

impl BakePaths {
    /// Derive all locations from a home directory.
    pub fn from_home(home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        let install_dir = join_all(&home, INSTALL_DIR_SEGMENTS);
        let user_bin_dir = join_all(&home, USER_BIN_SEGMENTS);

        Self {
            wrapper_dir: install_dir.join(WRAPPER_SCRIPTS_DIR),
            config_file: install_dir.join(CONFIG_FILENAME),
            install_link: user_bin_dir.join(TOOL_NAME),
            install_dir,
            user_bin_dir,
            home,
        }
    }

    /// Derive all locations from the current user's home directory.
    ///
    /// # Errors
    ///
    /// Returns [`BakeError::Configuration`] if the home directory is unset.
    pub fn from_env() -> Result<Self, BakeError> {
        let home = dirs::home_dir()
            .filter(|h| !h.as_os_str().is_empty())
            .ok_or_else(|| {
                BakeError::Configuration("could not determine the home directory".to_string())
            })?;
        tracing::debug!("Resolved home directory: {}", home.display());
        Ok(Self::from_home(home))
    }

    /// The home directory.
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// The install directory (`~/.local/lib/bake`).
    pub fn install_dir(&self) -> &Path {
        &self.install_dir
    }

    /// The wrapper scripts directory (`~/.local/lib/bake/scripts`).
    pub fn wrapper_dir(&self) -> &Path {
        &self.wrapper_dir
    }

    /// The user bin directory (`~/.local/bin`).
    pub fn user_bin_dir(&self) -> &Path {
        &self.user_bin_dir
    }

    /// The link through which bake itself is invoked (`~/.local/bin/bake`).
    pub fn install_link(&self) -> &Path {
        &self.install_link
    }

    /// The default config file location.
    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    /// Wrapper script location for a command.
    pub fn wrapper_path(&self, name: &CommandName) -> PathBuf {
        self.wrapper_dir.join(name.as_str())
    }

    /// Symlink location for a command.
    pub fn symlink_path(&self, name: &CommandName) -> PathBuf {
        self.user_bin_dir.join(name.as_str())
    }

    /// Check whether the user bin directory appears in a `PATH`-style value.
    pub fn bin_dir_on_path(&self, path_var: &OsStr) -> bool {
        std::env::split_paths(path_var).any(|entry| entry == self.user_bin_dir)
    }
}

fn join_all(base: &Path, segments: &[&str]) -> PathBuf {
    segments
        .iter()
        .fold(base.to_path_buf(), |acc, segment| acc.join(segment))
}

/// Make a path absolute against `cwd` and drop `.`/`..` components lexically.
///
/// Symlinks are not resolved, so the registered target is the path the user
/// typed, made absolute.
pub fn absolutize(path: &Path, cwd: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    };

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
