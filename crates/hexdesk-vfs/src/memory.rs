//! Persistent in-memory tree.
//!
//! Folders hold their children behind `Arc`, and every mutation goes through
//! `Arc::make_mut`. A write therefore clones only the nodes on the path from
//! the root to the changed folder, and anyone holding a [`VfsSnapshot`] of
//! the previous root keeps seeing the old tree.

use std::collections::BTreeMap;
use std::sync::Arc;

use hexdesk_types::error::{HexError, Result};

use crate::path::{basename, resolve_path, segments};
use crate::{NodeKind, Vfs};

/// A file or folder in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    File { content: String },
    Folder { children: BTreeMap<String, Arc<Node>> },
}

impl Node {
    pub fn empty_folder() -> Self {
        Self::Folder {
            children: BTreeMap::new(),
        }
    }

    pub fn file(content: impl Into<String>) -> Self {
        Self::File {
            content: content.into(),
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Self::File { .. } => NodeKind::File,
            Self::Folder { .. } => NodeKind::Folder,
        }
    }

    fn child(&self, name: &str) -> Option<&Node> {
        match self {
            Self::Folder { children } => children.get(name).map(Arc::as_ref),
            Self::File { .. } => None,
        }
    }
}

/// Walk `path` (absolute, normalized) from `root`.
fn lookup<'a>(root: &'a Node, path: &str) -> Option<&'a Node> {
    segments(path)
        .into_iter()
        .try_fold(root, |node, segment| node.child(segment))
}

/// Insert `node` as `name` under the folder reached by `parents`.
///
/// Folders along the way are unshared with `Arc::make_mut` before descent.
fn insert_at(folder: &mut Node, parents: &[&str], name: &str, node: Node) -> bool {
    let Node::Folder { children } = folder else {
        return false;
    };
    match parents.split_first() {
        None => {
            children.insert(name.to_string(), Arc::new(node));
            true
        },
        Some((head, rest)) => match children.get_mut(*head) {
            Some(child) => insert_at(Arc::make_mut(child), rest, name, node),
            None => false,
        },
    }
}

/// Read-only view of the tree at one point in time.
#[derive(Debug, Clone)]
pub struct VfsSnapshot {
    root: Arc<Node>,
}

impl VfsSnapshot {
    /// Node at an absolute path.
    pub fn get(&self, path: &str) -> Option<&Node> {
        lookup(&self.root, path)
    }

    /// Child names of the folder at an absolute path.
    pub fn children(&self, path: &str) -> Option<Vec<&str>> {
        match self.get(path)? {
            Node::Folder { children } => Some(children.keys().map(String::as_str).collect()),
            Node::File { .. } => None,
        }
    }
}

/// A fully in-memory virtual file system with a working directory.
#[derive(Debug, Clone)]
pub struct MemoryVfs {
    root: Arc<Node>,
    cwd: String,
    home: String,
}

impl MemoryVfs {
    /// Create an empty tree (root folder only) with the given home prefix.
    /// The working directory starts at the root.
    pub fn new(home: impl Into<String>) -> Self {
        Self {
            root: Arc::new(Node::empty_folder()),
            cwd: "/".to_string(),
            home: home.into(),
        }
    }

    pub fn home(&self) -> &str {
        &self.home
    }

    /// Capture the current tree. Later writes are not visible through it.
    pub fn snapshot(&self) -> VfsSnapshot {
        VfsSnapshot {
            root: Arc::clone(&self.root),
        }
    }

    /// Node at `path` (resolved against the working directory).
    pub fn get_node(&self, path: &str) -> Option<&Node> {
        lookup(&self.root, &self.resolve(path))
    }

    /// Create `path` and any missing ancestors. Existing folders are kept.
    pub fn mkdir_all(&mut self, path: &str) -> Result<()> {
        let abs = self.resolve(path);
        let mut partial = String::new();
        for segment in segments(&abs) {
            partial.push('/');
            partial.push_str(segment);
            match lookup(&self.root, &partial).map(Node::kind) {
                Some(NodeKind::Folder) => {},
                Some(NodeKind::File) => return Err(HexError::NotADirectory(partial)),
                None => self.create(&partial, Node::empty_folder())?,
            }
        }
        Ok(())
    }

    /// Create or replace a file. Used for seeding; `touch` never overwrites.
    pub fn write_file(&mut self, path: &str, content: &str) -> Result<()> {
        let abs = self.resolve(path);
        if let Some(Node::Folder { .. }) = lookup(&self.root, &abs) {
            return Err(HexError::IsADirectory(abs));
        }
        self.create(&abs, Node::file(content))
    }

    /// Insert a node at `abs`, whose parent must be an existing folder.
    fn create(&mut self, abs: &str, node: Node) -> Result<()> {
        let segs = segments(abs);
        let Some((name, parents)) = segs.split_last() else {
            return Err(HexError::AlreadyExists(abs.to_string()));
        };
        let parent_path = format!("/{}", parents.join("/"));
        match lookup(&self.root, &parent_path) {
            Some(Node::Folder { .. }) => {},
            _ => return Err(HexError::NotFound(parent_path)),
        }
        let inserted = insert_at(Arc::make_mut(&mut self.root), parents, name, node);
        debug_assert!(inserted, "parent was checked to be a folder");
        log::debug!("vfs: created {abs}");
        Ok(())
    }
}

impl Vfs for MemoryVfs {
    fn cwd(&self) -> &str {
        &self.cwd
    }

    fn resolve(&self, path: &str) -> String {
        resolve_path(path, &self.cwd, &self.home)
    }

    fn readdir(&self, path: &str) -> Result<Vec<String>> {
        let abs = self.resolve(path);
        match lookup(&self.root, &abs) {
            Some(Node::Folder { children }) => Ok(children.keys().cloned().collect()),
            Some(Node::File { .. }) => Ok(vec![basename(&abs).to_string()]),
            None => Err(HexError::NotFound(abs)),
        }
    }

    fn read_file(&self, path: &str) -> Result<String> {
        let abs = self.resolve(path);
        match lookup(&self.root, &abs) {
            Some(Node::File { content }) => Ok(content.clone()),
            Some(Node::Folder { .. }) => Err(HexError::IsADirectory(abs)),
            None => Err(HexError::NotFound(abs)),
        }
    }

    fn change_dir(&mut self, path: &str) -> Result<()> {
        let abs = self.resolve(path);
        match lookup(&self.root, &abs) {
            Some(Node::Folder { .. }) => {
                self.cwd = abs;
                Ok(())
            },
            Some(Node::File { .. }) => Err(HexError::NotADirectory(abs)),
            None => Err(HexError::NotFound(abs)),
        }
    }

    fn mkdir(&mut self, path: &str) -> Result<()> {
        let abs = self.resolve(path);
        if lookup(&self.root, &abs).is_some() {
            return Err(HexError::AlreadyExists(abs));
        }
        self.create(&abs, Node::empty_folder())
    }

    fn touch(&mut self, path: &str, content: Option<&str>) -> Result<()> {
        let abs = self.resolve(path);
        if lookup(&self.root, &abs).is_some() {
            // Existing nodes are left exactly as they are.
            return Ok(());
        }
        self.create(&abs, Node::file(content.unwrap_or_default()))
    }

    fn kind(&self, path: &str) -> Option<NodeKind> {
        self.get_node(path).map(Node::kind)
    }
}
