//! The externally supplied workspace tree.

use serde::{Deserialize, Serialize};

/// Kind of a workspace element.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    File,
    Folder,
}

/// One node of the workspace tree: a named file or folder with ordered
/// children.
///
/// The tree is owned by whoever loads it; the core never mutates node
/// content, only walks the `children` relation while building its index.
/// Children order is significant and defines document order for traversal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub name: String,
    /// Raw path, possibly carrying leading or trailing separators. The root
    /// element may have an empty path.
    pub path: String,
    pub kind: ElementKind,
    #[serde(default)]
    pub children: Vec<Element>,
}

/// Flat projection of an indexed element, safe to hand out across reloads.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ElementInfo {
    pub name: String,
    pub path: String,
    pub kind: ElementKind,
    /// Raw paths of the element's children, in document order.
    pub child_paths: Vec<String>,
}
