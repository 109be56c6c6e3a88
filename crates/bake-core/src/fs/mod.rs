//! Filesystem abstraction used by the registry.
//!
//! The registry never calls `std::fs` directly; it goes through
//! [`FileSystem`], so tests can swap in an in-memory tree and inject failures
//! at any step.
//!
//! ## Backends
//!
//! - [`OsFs`]: the real filesystem
//! - `MemoryFs`: in-memory tree with fault injection, only under `#[cfg(test)]`

use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

#[cfg(test)]
pub(crate) mod memory;

#[cfg(test)]
pub(crate) use memory::{FsOp, MemoryFs};

/// What kind of entry lives at a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Regular file.
    File,
    /// Directory.
    Dir,
    /// Symbolic link (only reported when links are not followed).
    Symlink,
    /// Anything else (socket, fifo, device).
    Other,
}

/// The filesystem capabilities the registry relies on.
pub trait FileSystem {
    /// Kind of the entry at `path`, following symlinks. `None` if absent.
    fn kind(&self, path: &Path) -> io::Result<Option<EntryKind>>;

    /// Kind of the entry at `path` without following symlinks. `None` if absent.
    fn link_kind(&self, path: &Path) -> io::Result<Option<EntryKind>>;

    /// Fail unless the current user can open `path` for reading.
    fn check_readable(&self, path: &Path) -> io::Result<()>;

    /// Read a whole file as raw bytes.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Create or truncate a file with the given contents.
    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    /// Mark a file executable with the given permission bits.
    fn set_mode(&self, path: &Path, mode: u32) -> io::Result<()>;

    /// Atomically move `from` over `to`.
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Remove a file or symlink.
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Create a directory and all missing parents.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Create a symlink at `link` pointing to `original`.
    fn symlink(&self, original: &Path, link: &Path) -> io::Result<()>;

    /// Read the target of a symlink.
    fn read_link(&self, path: &Path) -> io::Result<PathBuf>;

    /// File names directly inside a directory.
    fn read_dir_names(&self, path: &Path) -> io::Result<Vec<String>>;

    /// Last modification time of a file.
    fn modified(&self, path: &Path) -> io::Result<SystemTime>;

    /// Directory relative script paths are resolved against.
    fn current_dir(&self) -> io::Result<PathBuf>;
}

// ============================================================================
// OsFs
// ============================================================================

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFs;

fn kind_of(file_type: std::fs::FileType) -> EntryKind {
    if file_type.is_symlink() {
        EntryKind::Symlink
    } else if file_type.is_file() {
        EntryKind::File
    } else if file_type.is_dir() {
        EntryKind::Dir
    } else {
        EntryKind::Other
    }
}

fn absent_as_none(
    result: io::Result<std::fs::Metadata>,
) -> io::Result<Option<EntryKind>> {
    match result {
        Ok(meta) => Ok(Some(kind_of(meta.file_type()))),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

impl FileSystem for OsFs {
    fn kind(&self, path: &Path) -> io::Result<Option<EntryKind>> {
        absent_as_none(std::fs::metadata(path))
    }

    fn link_kind(&self, path: &Path) -> io::Result<Option<EntryKind>> {
        absent_as_none(std::fs::symlink_metadata(path))
    }

    fn check_readable(&self, path: &Path) -> io::Result<()> {
        std::fs::File::open(path).map(|_| ())
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        std::fs::write(path, contents)
    }

    #[cfg(unix)]
    fn set_mode(&self, path: &Path, mode: u32) -> io::Result<()> {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
    }

    #[cfg(not(unix))]
    fn set_mode(&self, _path: &Path, _mode: u32) -> io::Result<()> {
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        std::fs::rename(from, to)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    #[cfg(unix)]
    fn symlink(&self, original: &Path, link: &Path) -> io::Result<()> {
        std::os::unix::fs::symlink(original, link)
    }

    #[cfg(not(unix))]
    fn symlink(&self, _original: &Path, _link: &Path) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "command symlinks require a Unix-like system",
        ))
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        std::fs::read_link(path)
    }

    fn read_dir_names(&self, path: &Path) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => tracing::warn!("Skipping non-UTF-8 entry {:?}", raw),
            }
        }
        Ok(names)
    }

    fn modified(&self, path: &Path) -> io::Result<SystemTime> {
        std::fs::metadata(path)?.modified()
    }

    fn current_dir(&self) -> io::Result<PathBuf> {
        std::env::current_dir()
    }
}
