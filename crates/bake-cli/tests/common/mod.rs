//! Shared test utilities for bake-cli integration tests.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;

/// Get a Command for the bake binary with `HOME` pointed at `home`.
///
/// Colors are disabled and editor/bake environment overrides are cleared so
/// the host environment cannot leak into assertions.
///
/// # Panics
///
/// Panics if the bake binary cannot be found.
#[allow(deprecated)]
pub fn bake_cmd(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("bake").expect("bake binary should exist");
    cmd.env("HOME", home)
        .env("NO_COLOR", "1")
        .env_remove("VISUAL")
        .env_remove("EDITOR")
        .env_remove("BAKE_CONFIG")
        .env_remove("BAKE_COLOR")
        .env_remove("BAKE_VERBOSE")
        .env_remove("BAKE_QUIET");
    cmd
}

/// Write a small Python script under `home` and return its path.
#[allow(dead_code)]
pub fn write_script(home: &Path, name: &str) -> PathBuf {
    let path = home.join(name);
    fs::write(&path, "print('hello from bake tests')\n").expect("write script");
    path
}

/// Wrapper location for a command under `home`.
#[allow(dead_code)]
pub fn wrapper_path(home: &Path, name: &str) -> PathBuf {
    home.join(".local/lib/bake/scripts").join(name)
}

/// Symlink location for a command under `home`.
#[allow(dead_code)]
pub fn symlink_path(home: &Path, name: &str) -> PathBuf {
    home.join(".local/bin").join(name)
}
