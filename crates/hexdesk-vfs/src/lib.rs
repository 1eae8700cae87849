//! Virtual file system for hexdesk.
//!
//! A single hierarchical namespace of files and folders, addressed with
//! POSIX-like paths relative to a per-session working directory. The tree is
//! persistent: mutations copy only the path from the root to the changed
//! folder, so snapshots taken earlier never observe later writes.

mod memory;
mod path;
mod seed;

pub use memory::{MemoryVfs, Node, VfsSnapshot};
pub use path::{basename, resolve_path};
pub use seed::seed_tree;

use hexdesk_types::error::Result;

/// Kind of a node in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    File,
    Folder,
}

/// Path-based access to a virtual file system with a working directory.
///
/// Relative paths are resolved against [`Vfs::cwd`]; `~` expands to the home
/// directory.
pub trait Vfs {
    /// Current working directory (absolute, normalized).
    fn cwd(&self) -> &str;

    /// Resolve `path` to a normalized absolute path.
    fn resolve(&self, path: &str) -> String;

    /// Child names of a folder, or the file's own name when `path` is a file.
    /// An empty `path` lists the working directory.
    fn readdir(&self, path: &str) -> Result<Vec<String>>;

    /// Content of a file.
    fn read_file(&self, path: &str) -> Result<String>;

    /// Change the working directory. Leaves it untouched on failure.
    fn change_dir(&mut self, path: &str) -> Result<()>;

    /// Create an empty folder. The parent must already exist.
    fn mkdir(&mut self, path: &str) -> Result<()>;

    /// Create a file. Touching an existing node does nothing.
    fn touch(&mut self, path: &str, content: Option<&str>) -> Result<()>;

    /// Kind of the node at `path`, if any.
    fn kind(&self, path: &str) -> Option<NodeKind>;
}
