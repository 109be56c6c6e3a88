//! In-memory filesystem double.
//!
//! [`MemoryFs`] models files, directories, and symlinks in a flat map keyed by
//! absolute path. Any operation can be configured to fail for a given path,
//! which is how rollback paths in the registry are exercised.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use super::{EntryKind, FileSystem};

/// Maximum symlink hops followed before reporting a loop.
const MAX_LINK_HOPS: usize = 40;

/// Operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FsOp {
    /// [`FileSystem::read`]
    Read,
    /// [`FileSystem::write`]
    Write,
    /// [`FileSystem::set_mode`]
    SetMode,
    /// [`FileSystem::rename`] (matched on the destination)
    Rename,
    /// [`FileSystem::remove_file`]
    Remove,
    /// [`FileSystem::create_dir_all`]
    CreateDir,
    /// [`FileSystem::symlink`] (matched on the link path)
    Symlink,
}

#[derive(Debug, Clone)]
enum Node {
    File {
        content: Vec<u8>,
        mode: u32,
        readable: bool,
        modified: SystemTime,
    },
    Dir,
    Symlink(PathBuf),
}

/// In-memory [`FileSystem`] with fault injection.
#[derive(Debug, Default)]
pub struct MemoryFs {
    nodes: RefCell<BTreeMap<PathBuf, Node>>,
    failures: RefCell<HashSet<(FsOp, PathBuf)>>,
    one_shot: RefCell<HashSet<(FsOp, PathBuf)>>,
    cwd: RefCell<Option<PathBuf>>,
}

impl MemoryFs {
    /// Create an empty filesystem containing only `/`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every future `op` on `path` fail with a permission error.
    pub fn fail_on(&self, op: FsOp, path: impl Into<PathBuf>) {
        self.failures.borrow_mut().insert((op, path.into()));
    }

    /// Make only the next `op` on `path` fail.
    pub fn fail_once(&self, op: FsOp, path: impl Into<PathBuf>) {
        self.one_shot.borrow_mut().insert((op, path.into()));
    }

    /// Set the directory reported by `current_dir` (defaults to `/`).
    pub fn set_current_dir(&self, path: impl Into<PathBuf>) {
        *self.cwd.borrow_mut() = Some(path.into());
    }

    /// Remove all injected failures.
    pub fn clear_failures(&self) {
        self.failures.borrow_mut().clear();
        self.one_shot.borrow_mut().clear();
    }

    /// Create a readable file (and its parent directories).
    pub fn add_file(&self, path: impl AsRef<Path>, content: impl AsRef<[u8]>) {
        self.insert_file(path.as_ref(), content.as_ref(), true);
    }

    /// Create a file the current user cannot read.
    pub fn add_unreadable_file(&self, path: impl AsRef<Path>, content: impl AsRef<[u8]>) {
        self.insert_file(path.as_ref(), content.as_ref(), false);
    }

    /// Create a directory and its parents.
    pub fn add_dir(&self, path: impl AsRef<Path>) {
        self.ensure_dirs(path.as_ref());
    }

    /// Create a symlink (and the link's parent directories).
    pub fn add_symlink(&self, original: impl AsRef<Path>, link: impl AsRef<Path>) {
        let link = link.as_ref();
        if let Some(parent) = link.parent() {
            self.ensure_dirs(parent);
        }
        self.nodes
            .borrow_mut()
            .insert(link.to_path_buf(), Node::Symlink(original.as_ref().to_path_buf()));
    }

    /// Whether any entry (including a dangling symlink) exists at `path`.
    pub fn exists(&self, path: impl AsRef<Path>) -> bool {
        self.nodes.borrow().contains_key(path.as_ref())
    }

    /// Contents of a UTF-8 file, without following symlinks.
    pub fn content(&self, path: impl AsRef<Path>) -> Option<String> {
        self.bytes(path).and_then(|b| String::from_utf8(b).ok())
    }

    /// Raw contents of a file, without following symlinks.
    pub fn bytes(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        match self.nodes.borrow().get(path.as_ref()) {
            Some(Node::File { content, .. }) => Some(content.clone()),
            _ => None,
        }
    }

    /// Permission bits of a file, without following symlinks.
    pub fn mode(&self, path: impl AsRef<Path>) -> Option<u32> {
        match self.nodes.borrow().get(path.as_ref()) {
            Some(Node::File { mode, .. }) => Some(*mode),
            _ => None,
        }
    }

    /// Target of a symlink.
    pub fn link_target(&self, path: impl AsRef<Path>) -> Option<PathBuf> {
        match self.nodes.borrow().get(path.as_ref()) {
            Some(Node::Symlink(target)) => Some(target.clone()),
            _ => None,
        }
    }

    /// Every path currently in the tree, sorted.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.nodes.borrow().keys().cloned().collect()
    }

    fn insert_file(&self, path: &Path, content: &[u8], readable: bool) {
        if let Some(parent) = path.parent() {
            self.ensure_dirs(parent);
        }
        self.nodes.borrow_mut().insert(
            path.to_path_buf(),
            Node::File {
                content: content.to_vec(),
                mode: 0o644,
                readable,
                modified: SystemTime::now(),
            },
        );
    }

    fn ensure_dirs(&self, path: &Path) {
        let mut nodes = self.nodes.borrow_mut();
        for ancestor in path.ancestors() {
            if ancestor.as_os_str().is_empty() || ancestor == Path::new("/") {
                continue;
            }
            nodes.entry(ancestor.to_path_buf()).or_insert(Node::Dir);
        }
    }

    fn check(&self, op: FsOp, path: &Path) -> io::Result<()> {
        let key = (op, path.to_path_buf());
        if self.one_shot.borrow_mut().remove(&key) || self.failures.borrow().contains(&key) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("injected {:?} failure at {}", op, path.display()),
            ));
        }
        Ok(())
    }

    fn is_dir(&self, path: &Path) -> bool {
        path == Path::new("/") || matches!(self.nodes.borrow().get(path), Some(Node::Dir))
    }

    fn require_parent(&self, path: &Path) -> io::Result<()> {
        match path.parent() {
            Some(parent) if self.is_dir(parent) => Ok(()),
            _ => Err(not_found(path)),
        }
    }

    /// Follow symlinks to the final path. `None` if the chain dangles.
    fn resolve(&self, path: &Path) -> io::Result<Option<PathBuf>> {
        let nodes = self.nodes.borrow();
        let mut current = path.to_path_buf();
        for _ in 0..MAX_LINK_HOPS {
            match nodes.get(&current) {
                Some(Node::Symlink(target)) => {
                    current = if target.is_absolute() {
                        target.clone()
                    } else {
                        current
                            .parent()
                            .map(|p| p.join(target))
                            .unwrap_or_else(|| target.clone())
                    };
                }
                Some(_) => return Ok(Some(current)),
                None if current == Path::new("/") => return Ok(Some(current)),
                None => return Ok(None),
            }
        }
        Err(io::Error::new(
            io::ErrorKind::Other,
            format!("too many levels of symbolic links: {}", path.display()),
        ))
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("no such file or directory: {}", path.display()),
    )
}

fn node_kind(node: &Node) -> EntryKind {
    match node {
        Node::File { .. } => EntryKind::File,
        Node::Dir => EntryKind::Dir,
        Node::Symlink(_) => EntryKind::Symlink,
    }
}

impl FileSystem for MemoryFs {
    fn kind(&self, path: &Path) -> io::Result<Option<EntryKind>> {
        let Some(resolved) = self.resolve(path)? else {
            return Ok(None);
        };
        if resolved == Path::new("/") {
            return Ok(Some(EntryKind::Dir));
        }
        Ok(self.nodes.borrow().get(&resolved).map(node_kind))
    }

    fn link_kind(&self, path: &Path) -> io::Result<Option<EntryKind>> {
        if path == Path::new("/") {
            return Ok(Some(EntryKind::Dir));
        }
        Ok(self.nodes.borrow().get(path).map(node_kind))
    }

    fn check_readable(&self, path: &Path) -> io::Result<()> {
        let resolved = self.resolve(path)?.ok_or_else(|| not_found(path))?;
        match self.nodes.borrow().get(&resolved) {
            Some(Node::File { readable: false, .. }) => Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("permission denied: {}", path.display()),
            )),
            Some(_) => Ok(()),
            None => Err(not_found(path)),
        }
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.check(FsOp::Read, path)?;
        self.check_readable(path)?;
        let resolved = self.resolve(path)?.ok_or_else(|| not_found(path))?;
        match self.nodes.borrow().get(&resolved) {
            Some(Node::File { content, .. }) => Ok(content.clone()),
            Some(_) => Err(io::Error::new(
                io::ErrorKind::Other,
                format!("is a directory: {}", path.display()),
            )),
            None => Err(not_found(path)),
        }
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        self.check(FsOp::Write, path)?;
        self.require_parent(path)?;
        let mut nodes = self.nodes.borrow_mut();
        let mode = match nodes.get(path) {
            Some(Node::Dir) => {
                return Err(io::Error::new(
                    io::ErrorKind::Other,
                    format!("is a directory: {}", path.display()),
                ))
            }
            Some(Node::File { mode, .. }) => *mode,
            _ => 0o644,
        };
        nodes.insert(
            path.to_path_buf(),
            Node::File {
                content: contents.to_vec(),
                mode,
                readable: true,
                modified: SystemTime::now(),
            },
        );
        Ok(())
    }

    fn set_mode(&self, path: &Path, new_mode: u32) -> io::Result<()> {
        self.check(FsOp::SetMode, path)?;
        match self.nodes.borrow_mut().get_mut(path) {
            Some(Node::File { mode, .. }) => {
                *mode = new_mode;
                Ok(())
            }
            Some(_) => Ok(()),
            None => Err(not_found(path)),
        }
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        self.check(FsOp::Rename, to)?;
        self.require_parent(to)?;
        let mut nodes = self.nodes.borrow_mut();
        if matches!(nodes.get(to), Some(Node::Dir)) {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("is a directory: {}", to.display()),
            ));
        }
        let node = nodes.remove(from).ok_or_else(|| not_found(from))?;
        nodes.insert(to.to_path_buf(), node);
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        self.check(FsOp::Remove, path)?;
        let mut nodes = self.nodes.borrow_mut();
        match nodes.get(path) {
            Some(Node::Dir) => Err(io::Error::new(
                io::ErrorKind::Other,
                format!("is a directory: {}", path.display()),
            )),
            Some(_) => {
                nodes.remove(path);
                Ok(())
            }
            None => Err(not_found(path)),
        }
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        self.check(FsOp::CreateDir, path)?;
        for ancestor in path.ancestors() {
            if let Some(Node::File { .. } | Node::Symlink(_)) = self.nodes.borrow().get(ancestor) {
                return Err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("not a directory: {}", ancestor.display()),
                ));
            }
        }
        self.ensure_dirs(path);
        Ok(())
    }

    fn symlink(&self, original: &Path, link: &Path) -> io::Result<()> {
        self.check(FsOp::Symlink, link)?;
        self.require_parent(link)?;
        let mut nodes = self.nodes.borrow_mut();
        if nodes.contains_key(link) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("file exists: {}", link.display()),
            ));
        }
        nodes.insert(link.to_path_buf(), Node::Symlink(original.to_path_buf()));
        Ok(())
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        match self.nodes.borrow().get(path) {
            Some(Node::Symlink(target)) => Ok(target.clone()),
            Some(_) => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not a symlink: {}", path.display()),
            )),
            None => Err(not_found(path)),
        }
    }

    fn read_dir_names(&self, path: &Path) -> io::Result<Vec<String>> {
        let resolved = self.resolve(path)?.ok_or_else(|| not_found(path))?;
        if !self.is_dir(&resolved) {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("not a directory: {}", path.display()),
            ));
        }
        Ok(self
            .nodes
            .borrow()
            .keys()
            .filter(|p| p.parent() == Some(resolved.as_path()))
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()).map(str::to_string))
            .collect())
    }

    fn modified(&self, path: &Path) -> io::Result<SystemTime> {
        let resolved = self.resolve(path)?.ok_or_else(|| not_found(path))?;
        match self.nodes.borrow().get(&resolved) {
            Some(Node::File { modified, .. }) => Ok(*modified),
            Some(_) => Ok(SystemTime::UNIX_EPOCH),
            None => Err(not_found(path)),
        }
    }

    fn current_dir(&self) -> io::Result<PathBuf> {
        Ok(self
            .cwd
            .borrow()
            .clone()
            .unwrap_or_else(|| PathBuf::from("/")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_requires_parent() {
        let fs = MemoryFs::new();
        assert!(fs.write(Path::new("/a/b.txt"), b"x").is_err());
        fs.create_dir_all(Path::new("/a")).unwrap();
        fs.write(Path::new("/a/b.txt"), b"x").unwrap();
        assert_eq!(fs.read(Path::new("/a/b.txt")).unwrap(), b"x");
    }

    #[test]
    fn test_symlink_follow_and_dangling() {
        let fs = MemoryFs::new();
        fs.add_file("/s/real.py", "print(1)");
        fs.add_symlink("/s/real.py", "/bin/real");
        fs.add_symlink("/s/gone.py", "/bin/gone");

        assert_eq!(fs.kind(Path::new("/bin/real")).unwrap(), Some(EntryKind::File));
        assert_eq!(fs.kind(Path::new("/bin/gone")).unwrap(), None);
        assert_eq!(
            fs.link_kind(Path::new("/bin/gone")).unwrap(),
            Some(EntryKind::Symlink)
        );
        assert_eq!(fs.read(Path::new("/bin/real")).unwrap(), b"print(1)");
    }

    #[test]
    fn test_injected_failure() {
        let fs = MemoryFs::new();
        fs.add_dir("/d");
        fs.fail_on(FsOp::Write, "/d/x");
        let err = fs.write(Path::new("/d/x"), b"data").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
        fs.clear_failures();
        fs.write(Path::new("/d/x"), b"data").unwrap();
    }

    #[test]
    fn test_one_shot_failure_clears_after_first_hit() {
        let fs = MemoryFs::new();
        fs.add_dir("/d");
        fs.fail_once(FsOp::Write, "/d/x");
        assert!(fs.write(Path::new("/d/x"), b"a").is_err());
        fs.write(Path::new("/d/x"), b"b").unwrap();
        assert_eq!(fs.bytes("/d/x").unwrap(), b"b");
    }

    #[test]
    fn test_read_dir_names_lists_direct_children() {
        let fs = MemoryFs::new();
        fs.add_file("/d/a", "");
        fs.add_file("/d/b", "");
        fs.add_file("/d/sub/c", "");
        let mut names = fs.read_dir_names(Path::new("/d")).unwrap();
        names.sort();
        assert_eq!(names, vec!["a", "b", "sub"]);
    }

    #[test]
    fn test_unreadable_file() {
        let fs = MemoryFs::new();
        fs.add_unreadable_file("/d/secret.py", "");
        assert_eq!(fs.kind(Path::new("/d/secret.py")).unwrap(), Some(EntryKind::File));
        assert!(fs.check_readable(Path::new("/d/secret.py")).is_err());
    }

    #[test]
    fn test_current_dir_defaults_to_root() {
        let fs = MemoryFs::new();
        assert_eq!(fs.current_dir().unwrap(), PathBuf::from("/"));
        fs.set_current_dir("/home/u/proj");
        assert_eq!(fs.current_dir().unwrap(), PathBuf::from("/home/u/proj"));
    }

    #[test]
    fn test_rename_replaces_destination() {
        let fs = MemoryFs::new();
        fs.add_file("/d/.tmp", "new");
        fs.add_file("/d/w", "old");
        fs.rename(Path::new("/d/.tmp"), Path::new("/d/w")).unwrap();
        assert_eq!(fs.content("/d/w").as_deref(), Some("new"));
        assert!(!fs.exists("/d/.tmp"));
    }
}
