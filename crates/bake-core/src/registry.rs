//! The command registry.
//!
//! A command is registered when its wrapper script exists in the wrapper
//! directory and a symlink with the same name in the user bin directory points
//! at it. The registry keeps no index: every operation re-reads the
//! filesystem through a [`FileSystem`] implementation.
//!
//! ## Failure semantics
//!
//! - Add/Rename write the wrapper to a hidden staging file and move it into
//!   place before touching the symlink. If linking fails, the wrapper is
//!   rolled back (previous content restored, or the new file removed).
//! - Rename completes the new registration before tearing down the old one,
//!   so a failure never leaves both names unusable.
//! - Delete removes the symlink and the wrapper independently and reports a
//!   [`BakeError::PartialFailure`] when only one of them could be removed.
//! - Entries in the bin directory that are not symlinks to bake's own wrappers
//!   are never removed or replaced.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::console::{Confirmation, Console};
use crate::constants::{STAGING_PREFIX, STAGING_SUFFIX, WRAPPER_MODE};
use crate::editor::EditorLauncher;
use crate::errors::{BakeError, Result};
use crate::fs::{EntryKind, FileSystem, OsFs};
use crate::name::CommandName;
use crate::paths::{absolutize, BakePaths};
use crate::wrapper;

// ============================================================================
// Result types
// ============================================================================

/// Result of an operation that may ask the user for confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The operation ran.
    Done(T),
    /// The user declined; nothing was changed.
    Cancelled,
}

impl<T> Outcome<T> {
    /// Whether the user declined.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// The report, if the operation ran.
    pub fn done(self) -> Option<T> {
        match self {
            Self::Done(value) => Some(value),
            Self::Cancelled => None,
        }
    }
}

/// Consistency of a registered command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommandHealth {
    /// Wrapper, symlink, and target are all in place.
    Ok,
    /// The wrapper exists but the symlink is missing or not bake's.
    Unlinked,
    /// The target script no longer exists.
    MissingTarget,
    /// The wrapper cannot be read or has no target path.
    Corrupt,
}

impl std::fmt::Display for CommandHealth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Ok => "ok",
            Self::Unlinked => "unlinked",
            Self::MissingTarget => "missing-target",
            Self::Corrupt => "corrupt",
        };
        f.write_str(label)
    }
}

/// One registered command as seen by `list` and `show`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandEntry {
    /// Command name (the wrapper's file name).
    pub name: String,
    /// Target script, when the wrapper could be parsed.
    pub target: Option<PathBuf>,
    /// Wrapper script location.
    pub wrapper: PathBuf,
    /// Symlink location.
    pub symlink: PathBuf,
    /// Consistency check result.
    pub health: CommandHealth,
    /// When the wrapper was last written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
}

/// Report for a successful add.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddReport {
    /// The registered name.
    pub name: String,
    /// Absolute target path.
    pub target: PathBuf,
    /// Wrapper script location.
    pub wrapper: PathBuf,
    /// Symlink location.
    pub symlink: PathBuf,
    /// Whether an existing command was overwritten.
    pub replaced: bool,
    /// Target of the overwritten command, when it could be read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_target: Option<PathBuf>,
}

/// Report for a successful rename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameReport {
    /// Old name.
    pub from: String,
    /// New name.
    pub to: String,
    /// Target carried over to the new name.
    pub target: PathBuf,
    /// Whether a command already registered under the new name was overwritten.
    pub replaced: bool,
}

/// What happened to one half of a command during delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Removal {
    /// It was removed.
    Removed,
    /// It was already gone.
    AlreadyMissing,
    /// Something not created by bake occupies the path; left in place.
    NotOwned,
}

/// Report for a successful delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteReport {
    /// The deleted name.
    pub name: String,
    /// Symlink outcome.
    pub symlink: Removal,
    /// Wrapper outcome.
    pub wrapper: Removal,
}

/// Report for purge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurgeReport {
    /// Names that were fully removed.
    pub removed: Vec<String>,
    /// Dangling symlinks into the wrapper directory that were cleaned up.
    pub orphan_links: Vec<PathBuf>,
    /// Names that could not be fully removed, with the reason.
    pub failed: Vec<(String, String)>,
}

// ============================================================================
// Internal state
// ============================================================================

/// State of `<bin>/<name>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LinkState {
    Missing,
    Ours,
    Foreign,
}

/// A registration about to be overwritten.
#[derive(Debug, Clone)]
struct Existing {
    target: Option<PathBuf>,
    content: Vec<u8>,
    linked: bool,
}

enum Decision {
    Fresh,
    Overwrite(Existing),
    Cancel,
}

// ============================================================================
// Registry
// ============================================================================

/// The command registry over one bake installation.
///
/// # Example
///
/// ```ignore
/// use bake_core::{BakePaths, Registry};
///
/// let registry = Registry::open(BakePaths::from_env()?);
/// for entry in registry.list()? {
///     println!("{} -> {:?}", entry.name, entry.target);
/// }
/// ```
#[derive(Debug)]
pub struct Registry<F: FileSystem = OsFs> {
    paths: BakePaths,
    fs: F,
}

impl Registry<OsFs> {
    /// Open the registry on the real filesystem.
    pub fn open(paths: BakePaths) -> Self {
        Self::with_fs(paths, OsFs)
    }
}

impl<F: FileSystem> Registry<F> {
    /// Open the registry on a specific filesystem implementation.
    pub fn with_fs(paths: BakePaths, fs: F) -> Self {
        Self { paths, fs }
    }

    /// The locations this registry operates on.
    pub fn paths(&self) -> &BakePaths {
        &self.paths
    }

    #[cfg(test)]
    fn fs(&self) -> &F {
        &self.fs
    }

    /// Whether the wrapper directory exists at all.
    pub fn has_wrapper_dir(&self) -> bool {
        matches!(
            self.fs.kind(self.paths.wrapper_dir()),
            Ok(Some(EntryKind::Dir))
        )
    }

    // -------------------------------------------------------------------------
    // Add
    // -------------------------------------------------------------------------

    /// Register `script` as the command `name`.
    ///
    /// Without `force`, an existing command triggers a confirmation prompt on
    /// `console`; declining returns [`Outcome::Cancelled`].
    ///
    /// # Errors
    ///
    /// - [`BakeError::InvalidName`] for a malformed or reserved name
    /// - [`BakeError::ScriptNotFound`], [`BakeError::NotAFile`],
    ///   [`BakeError::UnreadableScript`] for a bad script path
    /// - [`BakeError::ForeignBinEntry`] if the bin directory already holds an
    ///   unrelated file with this name
    /// - [`BakeError::AlreadyExists`] if confirmation could not be obtained
    /// - [`BakeError::Io`] if writing fails (after rolling back)
    pub fn add(
        &self,
        name: &str,
        script: &Path,
        force: bool,
        console: &dyn Console,
    ) -> Result<Outcome<AddReport>> {
        let name = CommandName::new(name)?;
        let target = self.resolve_script(script)?;
        self.ensure_not_foreign(&name)?;

        let existing = match self.decide(&name, force, console)? {
            Decision::Fresh => None,
            Decision::Overwrite(existing) => Some(existing),
            Decision::Cancel => return Ok(Outcome::Cancelled),
        };

        self.register(&name, &target, existing.as_ref())?;
        tracing::debug!("Registered `{}` -> {}", name, target.display());

        Ok(Outcome::Done(AddReport {
            name: name.to_string(),
            wrapper: self.paths.wrapper_path(&name),
            symlink: self.paths.symlink_path(&name),
            target,
            replaced: existing.is_some(),
            previous_target: existing.and_then(|e| e.target),
        }))
    }

    // -------------------------------------------------------------------------
    // Edit
    // -------------------------------------------------------------------------

    /// Open the wrapper of `name` in an editor and wait for it to exit.
    ///
    /// The edited content is not validated.
    ///
    /// # Errors
    ///
    /// Returns [`BakeError::NotFound`] if `name` is not registered, or the
    /// editor's error.
    pub fn edit(&self, name: &str, editor: &dyn EditorLauncher) -> Result<PathBuf> {
        let name = CommandName::existing(name)?;
        if !self.is_registered(&name)? {
            return Err(BakeError::NotFound(name.to_string()));
        }

        let wrapper = self.paths.wrapper_path(&name);
        editor.open(&wrapper)?;
        Ok(wrapper)
    }

    // -------------------------------------------------------------------------
    // Delete
    // -------------------------------------------------------------------------

    /// Remove the symlink and the wrapper of `name`.
    ///
    /// Both removals are always attempted. A half that is already missing is
    /// not an error.
    ///
    /// # Errors
    ///
    /// - [`BakeError::NotFound`] if neither half exists
    /// - [`BakeError::PartialFailure`] if exactly one removal failed
    /// - [`BakeError::Io`] if both failed
    pub fn delete(&self, name: &str) -> Result<DeleteReport> {
        let name = CommandName::existing(name)?;
        let wrapper_path = self.paths.wrapper_path(&name);
        let link_path = self.paths.symlink_path(&name);

        let wrapper_present = self.is_registered(&name)?;
        let link_state = self.link_state(&name)?;
        if !wrapper_present && link_state != LinkState::Ours {
            return Err(BakeError::NotFound(name.to_string()));
        }

        let link_result = match link_state {
            LinkState::Ours => self.fs.remove_file(&link_path).map(|()| Removal::Removed),
            LinkState::Missing => Ok(Removal::AlreadyMissing),
            LinkState::Foreign => {
                tracing::warn!(
                    "{} is not a bake symlink, leaving it in place",
                    link_path.display()
                );
                Ok(Removal::NotOwned)
            }
        };

        let wrapper_result = if wrapper_present {
            self.fs
                .remove_file(&wrapper_path)
                .map(|()| Removal::Removed)
        } else {
            Ok(Removal::AlreadyMissing)
        };

        match (link_result, wrapper_result) {
            (Ok(symlink), Ok(wrapper)) => {
                tracing::debug!("Deleted `{}` (symlink: {:?}, wrapper: {:?})", name, symlink, wrapper);
                Ok(DeleteReport {
                    name: name.to_string(),
                    symlink,
                    wrapper,
                })
            }
            (Err(e), Ok(_)) => Err(BakeError::PartialFailure {
                name: name.to_string(),
                remaining: vec![link_path],
                reason: e.to_string(),
            }),
            (Ok(_), Err(e)) => Err(BakeError::PartialFailure {
                name: name.to_string(),
                remaining: vec![wrapper_path],
                reason: e.to_string(),
            }),
            (Err(link_err), Err(wrapper_err)) => {
                tracing::warn!(
                    "Failed to remove wrapper {}: {}",
                    wrapper_path.display(),
                    wrapper_err
                );
                Err(BakeError::io(link_path, link_err))
            }
        }
    }

    // -------------------------------------------------------------------------
    // Rename
    // -------------------------------------------------------------------------

    /// Move the command `old` to `new`, keeping its target.
    ///
    /// The new registration is completed before the old one is removed. If it
    /// fails, whatever was created for `new` is rolled back and `old` is left
    /// untouched.
    ///
    /// # Errors
    ///
    /// - [`BakeError::NotFound`] if `old` is not registered
    /// - [`BakeError::InvalidName`] if `new` is invalid
    /// - [`BakeError::SameName`] if the names are equal
    /// - [`BakeError::CorruptWrapper`] if `old` has no readable target
    /// - [`BakeError::PartialFailure`] if `new` was registered but `old`
    ///   could not be fully removed
    pub fn rename(
        &self,
        old: &str,
        new: &str,
        force: bool,
        console: &dyn Console,
    ) -> Result<Outcome<RenameReport>> {
        let old = CommandName::existing(old)?;
        if !self.is_registered(&old)? {
            return Err(BakeError::NotFound(old.to_string()));
        }
        let new = CommandName::new(new)?;
        if old == new {
            return Err(BakeError::SameName(old.to_string()));
        }

        let target = self
            .read_target(&old)?
            .ok_or_else(|| BakeError::CorruptWrapper {
                name: old.to_string(),
                path: self.paths.wrapper_path(&old),
            })?;
        self.ensure_not_foreign(&new)?;

        let existing = match self.decide(&new, force, console)? {
            Decision::Fresh => None,
            Decision::Overwrite(existing) => Some(existing),
            Decision::Cancel => return Ok(Outcome::Cancelled),
        };

        self.register(&new, &target, existing.as_ref())?;
        tracing::debug!("Registered `{}` -> {}, removing `{}`", new, target.display(), old);

        self.teardown(&old)?;

        Ok(Outcome::Done(RenameReport {
            from: old.to_string(),
            to: new.to_string(),
            target,
            replaced: existing.is_some(),
        }))
    }

    // -------------------------------------------------------------------------
    // List / Show
    // -------------------------------------------------------------------------

    /// All registered commands sorted by name (case-sensitive, ordinal).
    ///
    /// A missing or empty wrapper directory yields an empty list.
    pub fn list(&self) -> Result<Vec<CommandEntry>> {
        let dir = self.paths.wrapper_dir();
        if !self.has_wrapper_dir() {
            tracing::debug!("Wrapper directory {} does not exist", dir.display());
            return Ok(Vec::new());
        }

        let mut names: Vec<String> = self
            .fs
            .read_dir_names(dir)
            .map_err(|e| BakeError::io(dir, e))?
            .into_iter()
            .filter(|n| !n.starts_with(STAGING_PREFIX))
            .collect();
        names.sort();

        let mut entries = Vec::with_capacity(names.len());
        for name in names {
            let wrapper = dir.join(&name);
            if !matches!(self.fs.link_kind(&wrapper), Ok(Some(EntryKind::File))) {
                tracing::debug!("Skipping non-file entry {}", wrapper.display());
                continue;
            }
            entries.push(self.entry(&name));
        }
        Ok(entries)
    }

    /// The entry for a single command.
    ///
    /// # Errors
    ///
    /// Returns [`BakeError::NotFound`] if `name` is not registered.
    pub fn show(&self, name: &str) -> Result<CommandEntry> {
        let name = CommandName::existing(name)?;
        if !self.is_registered(&name)? {
            return Err(BakeError::NotFound(name.to_string()));
        }
        Ok(self.entry(name.as_str()))
    }

    // -------------------------------------------------------------------------
    // Purge
    // -------------------------------------------------------------------------

    /// Delete every registered command, then clean up bake symlinks whose
    /// wrapper is already gone.
    ///
    /// Without `force`, asks for confirmation first. A failure on one command
    /// does not stop the others; failures are collected in the report.
    pub fn purge(&self, force: bool, console: &dyn Console) -> Result<Outcome<PurgeReport>> {
        let entries = self.list()?;

        if !force && !entries.is_empty() {
            let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
            console.info(&format!(
                "This will delete {} command(s): {}",
                names.len(),
                names.join(", ")
            ));
            match console.confirm("Delete all registered commands?") {
                Confirmation::Yes => {}
                Confirmation::No => return Ok(Outcome::Cancelled),
                Confirmation::Unavailable => {
                    console.warn("No confirmation received. Use --force to skip the prompt.");
                    return Ok(Outcome::Cancelled);
                }
            }
        }

        let mut report = PurgeReport::default();
        for entry in &entries {
            match self.delete(&entry.name) {
                Ok(_) => report.removed.push(entry.name.clone()),
                Err(e) => {
                    tracing::warn!("Failed to delete `{}`: {}", entry.name, e);
                    report.failed.push((entry.name.clone(), e.to_string()));
                }
            }
        }

        report.orphan_links = self.remove_orphan_links();
        Ok(Outcome::Done(report))
    }

    // -------------------------------------------------------------------------
    // Helpers
    // -------------------------------------------------------------------------

    fn resolve_script(&self, script: &Path) -> Result<PathBuf> {
        let target = if script.is_absolute() {
            absolutize(script, Path::new("/"))
        } else {
            let cwd = self.fs.current_dir().map_err(|e| BakeError::io(".", e))?;
            absolutize(script, &cwd)
        };

        match self.fs.kind(&target) {
            Ok(Some(EntryKind::File)) => {}
            Ok(Some(_)) => return Err(BakeError::NotAFile(target)),
            Ok(None) => return Err(BakeError::ScriptNotFound(target)),
            Err(e) => return Err(BakeError::io(target, e)),
        }

        if let Err(e) = self.fs.check_readable(&target) {
            tracing::debug!("Readability check failed for {}: {}", target.display(), e);
            return Err(BakeError::UnreadableScript(target));
        }
        Ok(target)
    }

    fn is_registered(&self, name: &CommandName) -> Result<bool> {
        let wrapper = self.paths.wrapper_path(name);
        self.fs
            .link_kind(&wrapper)
            .map(|kind| kind.is_some())
            .map_err(|e| BakeError::io(wrapper, e))
    }

    fn link_state(&self, name: &CommandName) -> Result<LinkState> {
        let link = self.paths.symlink_path(name);
        match self.fs.link_kind(&link).map_err(|e| BakeError::io(&link, e))? {
            None => Ok(LinkState::Missing),
            Some(EntryKind::Symlink) => {
                let points_to = self.fs.read_link(&link).map_err(|e| BakeError::io(&link, e))?;
                if points_to == self.paths.wrapper_path(name) {
                    Ok(LinkState::Ours)
                } else {
                    Ok(LinkState::Foreign)
                }
            }
            Some(_) => Ok(LinkState::Foreign),
        }
    }

    fn ensure_not_foreign(&self, name: &CommandName) -> Result<()> {
        if self.link_state(name)? == LinkState::Foreign {
            return Err(BakeError::ForeignBinEntry(self.paths.symlink_path(name)));
        }
        Ok(())
    }

    fn read_target(&self, name: &CommandName) -> Result<Option<PathBuf>> {
        let wrapper = self.paths.wrapper_path(name);
        let content = self
            .fs
            .read(&wrapper)
            .map_err(|e| BakeError::io(&wrapper, e))?;
        Ok(wrapper::parse_bytes(&content))
    }

    /// Apply the confirm/force policy for a name that may already exist.
    fn decide(&self, name: &CommandName, force: bool, console: &dyn Console) -> Result<Decision> {
        if !self.is_registered(name)? {
            return Ok(Decision::Fresh);
        }

        let wrapper = self.paths.wrapper_path(name);
        let content = self
            .fs
            .read(&wrapper)
            .map_err(|e| BakeError::io(&wrapper, e))?;
        let existing = Existing {
            target: wrapper::parse_bytes(&content),
            content,
            linked: self.link_state(name)? == LinkState::Ours,
        };

        if force {
            tracing::debug!("Overwriting `{}` (forced)", name);
            return Ok(Decision::Overwrite(existing));
        }

        let current = existing
            .target
            .as_ref()
            .map(|t| t.display().to_string())
            .unwrap_or_else(|| "an unreadable target".to_string());
        console.info(&format!("Command `{}` already exists and points to {}", name, current));

        match console.confirm(&format!("Overwrite `{}`?", name)) {
            Confirmation::Yes => Ok(Decision::Overwrite(existing)),
            Confirmation::No => Ok(Decision::Cancel),
            Confirmation::Unavailable => Err(BakeError::AlreadyExists {
                name: name.to_string(),
                target: existing.target,
            }),
        }
    }

    /// Write the wrapper and link it, rolling back the wrapper on failure.
    fn register(&self, name: &CommandName, target: &Path, existing: Option<&Existing>) -> Result<()> {
        let content = wrapper::render(target)?;
        let wrapper_dir = self.paths.wrapper_dir();
        let bin_dir = self.paths.user_bin_dir();
        let wrapper_path = self.paths.wrapper_path(name);

        for dir in [wrapper_dir, bin_dir] {
            self.fs
                .create_dir_all(dir)
                .map_err(|e| BakeError::io(dir, e))?;
        }

        let staging = wrapper_dir.join(format!("{}{}{}", STAGING_PREFIX, name, STAGING_SUFFIX));
        if let Err(e) = self.install_wrapper(&staging, &wrapper_path, &content) {
            if matches!(self.fs.link_kind(&staging), Ok(Some(_))) {
                if let Err(cleanup) = self.fs.remove_file(&staging) {
                    tracing::warn!("Failed to remove staging file {}: {}", staging.display(), cleanup);
                }
            }
            return Err(e);
        }

        if let Err(e) = self.link(name) {
            tracing::warn!("Linking `{}` failed, rolling back wrapper: {}", name, e);
            self.rollback(name, existing);
            return Err(e);
        }
        Ok(())
    }

    fn install_wrapper(&self, staging: &Path, wrapper_path: &Path, content: &str) -> Result<()> {
        self.fs
            .write(staging, content.as_bytes())
            .map_err(|e| BakeError::io(staging, e))?;
        self.fs
            .set_mode(staging, WRAPPER_MODE)
            .map_err(|e| BakeError::io(staging, e))?;
        self.fs
            .rename(staging, wrapper_path)
            .map_err(|e| BakeError::io(wrapper_path, e))
    }

    /// Replace `<bin>/<name>` with a symlink to the wrapper (remove, then create).
    fn link(&self, name: &CommandName) -> Result<()> {
        let link_path = self.paths.symlink_path(name);
        match self.link_state(name)? {
            LinkState::Foreign => return Err(BakeError::ForeignBinEntry(link_path)),
            LinkState::Ours => self
                .fs
                .remove_file(&link_path)
                .map_err(|e| BakeError::io(&link_path, e))?,
            LinkState::Missing => {}
        }
        self.fs
            .symlink(&self.paths.wrapper_path(name), &link_path)
            .map_err(|e| BakeError::io(&link_path, e))
    }

    /// Undo a wrapper write after a failed link. Best effort; failures are logged.
    fn rollback(&self, name: &CommandName, existing: Option<&Existing>) {
        let wrapper_path = self.paths.wrapper_path(name);
        match existing {
            Some(previous) => {
                if let Err(e) = self.fs.write(&wrapper_path, &previous.content) {
                    tracing::warn!("Failed to restore wrapper {}: {}", wrapper_path.display(), e);
                }
                if previous.linked && self.link_state(name).ok() == Some(LinkState::Missing) {
                    let link_path = self.paths.symlink_path(name);
                    if let Err(e) = self.fs.symlink(&wrapper_path, &link_path) {
                        tracing::warn!("Failed to restore symlink {}: {}", link_path.display(), e);
                    }
                }
            }
            None => {
                if let Err(e) = self.fs.remove_file(&wrapper_path) {
                    tracing::warn!("Failed to remove wrapper {}: {}", wrapper_path.display(), e);
                }
            }
        }
    }

    /// Remove the old half of a rename; both removals are attempted.
    fn teardown(&self, old: &CommandName) -> Result<()> {
        let mut remaining = Vec::new();
        let mut reasons = Vec::new();

        if self.link_state(old)? == LinkState::Ours {
            let link_path = self.paths.symlink_path(old);
            if let Err(e) = self.fs.remove_file(&link_path) {
                reasons.push(e.to_string());
                remaining.push(link_path);
            }
        }

        let wrapper_path = self.paths.wrapper_path(old);
        if let Err(e) = self.fs.remove_file(&wrapper_path) {
            reasons.push(e.to_string());
            remaining.push(wrapper_path);
        }

        if remaining.is_empty() {
            Ok(())
        } else {
            Err(BakeError::PartialFailure {
                name: old.to_string(),
                remaining,
                reason: reasons.join("; "),
            })
        }
    }

    fn entry(&self, name: &str) -> CommandEntry {
        let wrapper = self.paths.wrapper_dir().join(name);
        let symlink = self.paths.user_bin_dir().join(name);

        let target = match self.fs.read(&wrapper) {
            Ok(content) => wrapper::parse_bytes(&content),
            Err(e) => {
                tracing::warn!("Failed to read wrapper {}: {}", wrapper.display(), e);
                None
            }
        };

        let linked = matches!(
            self.fs.link_kind(&symlink),
            Ok(Some(EntryKind::Symlink))
        ) && self.fs.read_link(&symlink).ok().as_deref() == Some(wrapper.as_path());

        let health = match &target {
            None => CommandHealth::Corrupt,
            Some(_) if !linked => CommandHealth::Unlinked,
            Some(t) if !matches!(self.fs.kind(t), Ok(Some(EntryKind::File))) => {
                CommandHealth::MissingTarget
            }
            Some(_) => CommandHealth::Ok,
        };

        CommandEntry {
            name: name.to_string(),
            updated: self.fs.modified(&wrapper).ok().map(DateTime::<Utc>::from),
            target,
            wrapper,
            symlink,
            health,
        }
    }

    /// Remove symlinks in the bin directory that point into the wrapper
    /// directory at a wrapper that no longer exists.
    fn remove_orphan_links(&self) -> Vec<PathBuf> {
        let bin_dir = self.paths.user_bin_dir();
        let Ok(names) = self.fs.read_dir_names(bin_dir) else {
            return Vec::new();
        };

        let mut removed = Vec::new();
        for name in names {
            let link = bin_dir.join(&name);
            if !matches!(self.fs.link_kind(&link), Ok(Some(EntryKind::Symlink))) {
                continue;
            }
            let Ok(points_to) = self.fs.read_link(&link) else {
                continue;
            };
            let orphaned = points_to.starts_with(self.paths.wrapper_dir())
                && matches!(self.fs.link_kind(&points_to), Ok(None));
            if orphaned {
                match self.fs.remove_file(&link) {
                    Ok(()) => removed.push(link),
                    Err(e) => tracing::warn!("Failed to remove orphan link {}: {}", link.display(), e),
                }
            }
        }
        removed.sort();
        removed
    }
}

// ============================================================================
// Tests
// ============================================================================
