//! In-memory model of a diff tree
//!
//! A diff tree holds only the part of the source tree that is absent from the
//! destination. Children are keyed by their raw file name, so a directory can
//! never hold two entries with the same name, names that are not valid UTF-8
//! survive unchanged, and iteration is always in name order. Only rendering
//! and serialization use the lossy UTF-8 form of a name.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};

/// A file or directory inside a diff tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node {
    /// Leaf entry
    File(FileNode),
    /// Entry that may hold children
    Directory(DirectoryNode),
}

impl Node {
    /// Create a file node
    pub fn file<S: Into<OsString>>(name: S) -> Self {
        Self::File(FileNode::new(name))
    }

    /// Create an empty directory node
    pub fn directory<S: Into<OsString>>(name: S) -> Self {
        Self::Directory(DirectoryNode::new(name))
    }

    /// Base name of the entry
    pub fn name(&self) -> &OsStr {
        match self {
            Self::File(file) => &file.name,
            Self::Directory(dir) => &dir.name,
        }
    }

    /// Base name for display, with invalid UTF-8 replaced
    pub fn display_name(&self) -> Cow<'_, str> {
        self.name().to_string_lossy()
    }

    /// Whether this node is a directory
    pub fn is_directory(&self) -> bool {
        matches!(self, Self::Directory(_))
    }

    /// Borrow the directory payload, if any
    pub fn as_directory(&self) -> Option<&DirectoryNode> {
        match self {
            Self::Directory(dir) => Some(dir),
            Self::File(_) => None,
        }
    }

    /// Number of nodes in this subtree, this node included
    pub fn count_nodes(&self) -> usize {
        match self {
            Self::File(_) => 1,
            Self::Directory(dir) => 1 + dir.item_count(),
        }
    }

    /// Number of file nodes in this subtree
    pub fn file_count(&self) -> u64 {
        match self {
            Self::File(_) => 1,
            Self::Directory(dir) => dir.file_count(),
        }
    }
}

impl From<FileNode> for Node {
    fn from(file: FileNode) -> Self {
        Self::File(file)
    }
}

impl From<DirectoryNode> for Node {
    fn from(dir: DirectoryNode) -> Self {
        Self::Directory(dir)
    }
}

/// Leaf node of a diff tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileNode {
    /// Base name of the file
    #[serde(with = "lossy_name")]
    pub name: OsString,
}

impl FileNode {
    /// Create a new file node
    pub fn new<S: Into<OsString>>(name: S) -> Self {
        Self { name: name.into() }
    }
}

/// Directory node of a diff tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryNode {
    /// Base name of the directory
    #[serde(with = "lossy_name")]
    pub name: OsString,
    #[serde(with = "child_list")]
    children: BTreeMap<OsString, Node>,
}

impl DirectoryNode {
    /// Create a new directory node without children
    pub fn new<S: Into<OsString>>(name: S) -> Self {
        Self {
            name: name.into(),
            children: BTreeMap::new(),
        }
    }

    /// Add a child, replacing and returning any child with the same name
    pub fn add_child<N: Into<Node>>(&mut self, child: N) -> Option<Node> {
        let child = child.into();
        self.children.insert(child.name().to_os_string(), child)
    }

    /// Children keyed by name
    pub fn children(&self) -> &BTreeMap<OsString, Node> {
        &self.children
    }

    /// Look up a direct child by name
    pub fn child<N: AsRef<OsStr>>(&self, name: N) -> Option<&Node> {
        self.children.get(name.as_ref())
    }

    /// Follow a relative path of child names
    pub fn get<P: AsRef<Path>>(&self, path: P) -> Option<&Node> {
        let mut components = path.as_ref().iter();
        let mut current = self.children.get(components.next()?)?;
        for component in components {
            current = current.as_directory()?.children.get(component)?;
        }
        Some(current)
    }

    /// Whether this directory has at least one child
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Number of direct children
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Whether this directory has no children
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of nodes below this directory, excluding the directory itself
    pub fn item_count(&self) -> usize {
        self.children.values().map(Node::count_nodes).sum()
    }

    /// Number of file nodes below this directory
    pub fn file_count(&self) -> u64 {
        self.children.values().map(Node::file_count).sum()
    }

    /// Relative paths of every node below this directory, parents before children
    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths = Vec::new();
        self.collect_paths(Path::new(""), &mut paths, false);
        paths
    }

    /// Relative paths of every file below this directory
    pub fn file_paths(&self) -> Vec<PathBuf> {
        let mut paths = Vec::new();
        self.collect_paths(Path::new(""), &mut paths, true);
        paths
    }

    fn collect_paths(&self, prefix: &Path, paths: &mut Vec<PathBuf>, files_only: bool) {
        for child in self.children.values() {
            let path = prefix.join(child.name());
            match child {
                Node::File(_) => paths.push(path),
                Node::Directory(dir) => {
                    if !files_only {
                        paths.push(path.clone());
                    }
                    dir.collect_paths(&path, paths, files_only);
                }
            }
        }
    }

    fn fmt_children(&self, f: &mut fmt::Formatter<'_>, indent: &str) -> fmt::Result {
        let last_index = self.children.len().saturating_sub(1);
        for (index, child) in self.children.values().enumerate() {
            let is_last = index == last_index;
            let branch = if is_last { "└── " } else { "├── " };
            match child {
                Node::File(_) => writeln!(f, "{}{}{}", indent, branch, child.display_name())?,
                Node::Directory(dir) => {
                    writeln!(f, "{}{}{}/", indent, branch, child.display_name())?;
                    let next = format!("{}{}", indent, if is_last { "    " } else { "│   " });
                    dir.fmt_children(f, &next)?;
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for DirectoryNode {
    /// Renders the tree with the receiver as root, directories suffixed with `/`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} (Root)", self.name.to_string_lossy())?;
        self.fmt_children(f, "")
    }
}

/// Names are written as (lossy) UTF-8 strings
mod lossy_name {
    use super::{Deserialize, Deserializer, OsString, Serializer};

    pub fn serialize<S: Serializer>(name: &OsString, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&name.to_string_lossy())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<OsString, D::Error> {
        String::deserialize(deserializer).map(OsString::from)
    }
}

/// Children are written as a name-ordered list; each node carries its own name
mod child_list {
    use super::{BTreeMap, Deserialize, Deserializer, Node, OsString, Serializer};

    pub fn serialize<S: Serializer>(
        children: &BTreeMap<OsString, Node>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(children.values())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<OsString, Node>, D::Error> {
        let nodes = Vec::<Node>::deserialize(deserializer)?;
        Ok(nodes
            .into_iter()
            .map(|node| (node.name().to_os_string(), node))
            .collect())
    }
}
