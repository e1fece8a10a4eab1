//! Flattened arena view of the current element tree.
//!
//! On every reload the supplied [`Element`] tree is walked pre-order into a
//! flat node vector with parent indices, plus a map from normalized path to
//! node id. The arena is immutable for the lifetime of one tree generation;
//! reload swaps the whole structure.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::element::{Element, ElementInfo, ElementKind};
use crate::paths::normalize_path;

/// Stable, compact identifier for nodes within one tree generation.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub(crate) struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug)]
pub(crate) struct Node {
    pub name: String,
    /// Raw path as supplied by the loader.
    pub path: String,
    /// Normalized path, the key this node is indexed under.
    pub norm: String,
    pub kind: ElementKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// Arena plus path index for one tree generation.
#[derive(Debug)]
pub(crate) struct TreeState {
    nodes: Vec<Node>,
    index: FxHashMap<String, NodeId>,
}

impl TreeState {
    pub fn build(root: Element) -> Self {
        let mut state = Self {
            nodes: Vec::new(),
            index: FxHashMap::default(),
        };
        state.add(root, None);
        state
    }

    fn add(&mut self, element: Element, parent: Option<NodeId>) -> NodeId {
        let Element {
            name,
            path,
            kind,
            children,
        } = element;
        let norm = normalize_path(&path).to_string();

        let id = NodeId(u32::try_from(self.nodes.len()).expect("node count exceeds u32 range"));
        self.nodes.push(Node {
            name,
            path,
            norm: norm.clone(),
            kind,
            parent,
            children: Vec::new(),
        });
        self.index.insert(norm, id);

        for child in children {
            let child_id = self.add(child, Some(id));
            self.nodes[id.index()].children.push(child_id);
        }
        id
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Look up a node by raw or normalized path.
    pub fn lookup(&self, path: &str) -> Option<NodeId> {
        self.index.get(normalize_path(path)).copied()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.index.contains_key(normalize_path(path))
    }

    /// Normalized paths of every indexed node.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(String::as_str)
    }

    pub fn info(&self, id: NodeId) -> ElementInfo {
        let node = self.node(id);
        ElementInfo {
            name: node.name.clone(),
            path: node.path.clone(),
            kind: node.kind,
            child_paths: node
                .children
                .iter()
                .map(|&child| self.node(child).path.clone())
                .collect(),
        }
    }
}

/// Visibility-aware traversal. Collapsed folders are themselves visible but
/// opaque: their descendants are skipped entirely.
impl TreeState {
    fn is_open(&self, id: NodeId, expanded: &FxHashSet<String>) -> bool {
        let node = self.node(id);
        node.kind == ElementKind::Folder && expanded.contains(&node.norm)
    }

    /// Next node in the visible pre-order sequence, or `None` for the last
    /// visible node.
    pub fn next_visible(&self, id: NodeId, expanded: &FxHashSet<String>) -> Option<NodeId> {
        let node = self.node(id);
        if !node.children.is_empty() && self.is_open(id, expanded) {
            return Some(node.children[0]);
        }
        self.next_sibling_or_ancestor_sibling(id)
    }

    fn next_sibling_or_ancestor_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.node(id).parent?;
        let siblings = &self.node(parent).children;
        let position = siblings.iter().position(|&child| child == id)?;
        match siblings.get(position + 1) {
            Some(&next) => Some(next),
            None => self.next_sibling_or_ancestor_sibling(parent),
        }
    }

    /// Previous node in the visible pre-order sequence, or `None` for the
    /// root.
    pub fn previous_visible(&self, id: NodeId, expanded: &FxHashSet<String>) -> Option<NodeId> {
        let parent = self.node(id).parent?;
        let siblings = &self.node(parent).children;
        let position = siblings.iter().position(|&child| child == id)?;
        if position == 0 {
            Some(parent)
        } else {
            Some(self.last_visible_descendant(siblings[position - 1], expanded))
        }
    }

    /// Descend into last children while they belong to expanded folders,
    /// stopping at the first file or collapsed folder.
    fn last_visible_descendant(&self, id: NodeId, expanded: &FxHashSet<String>) -> NodeId {
        if self.is_open(id, expanded) {
            match self.node(id).children.last() {
                Some(&last) => self.last_visible_descendant(last, expanded),
                None => id,
            }
        } else {
            id
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, path: &str) -> Element {
        Element {
            name: name.to_string(),
            path: path.to_string(),
            kind: ElementKind::File,
            children: Vec::new(),
        }
    }

    fn folder(name: &str, path: &str, children: Vec<Element>) -> Element {
        Element {
            name: name.to_string(),
            path: path.to_string(),
            kind: ElementKind::Folder,
            children,
        }
    }

    fn sample() -> TreeState {
        TreeState::build(folder(
            "root",
            "root",
            vec![
                file("a", "root/a"),
                folder("sub", "root/sub", vec![file("b", "root/sub/b")]),
            ],
        ))
    }

    #[test]
    fn build_indexes_every_node_by_normalized_path() {
        let tree = sample();
        for path in ["root", "root/a", "root/sub", "root/sub/b"] {
            assert!(tree.contains(path), "missing {path}");
        }
        assert_eq!(tree.paths().count(), 4);
    }

    #[test]
    fn lookup_accepts_raw_paths() {
        let tree = sample();
        let id = tree.lookup("/root/sub/").expect("indexed");
        assert_eq!(tree.node(id).name, "sub");
    }

    #[test]
    fn info_projects_child_paths_in_order() {
        let tree = sample();
        let root = tree.lookup("root").unwrap();
        let info = tree.info(root);
        assert_eq!(info.child_paths, vec!["root/a", "root/sub"]);
    }

    #[test]
    fn parent_pointers_reach_the_root() {
        let tree = sample();
        let leaf = tree.lookup("root/sub/b").unwrap();
        let parent = tree.node(leaf).parent.unwrap();
        assert_eq!(tree.node(parent).norm, "root/sub");
        let grandparent = tree.node(parent).parent.unwrap();
        assert_eq!(grandparent, tree.root());
        assert!(tree.node(grandparent).parent.is_none());
    }
}
