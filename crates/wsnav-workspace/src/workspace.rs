//! Workspace facade over the path index, marker store, and UI state.
//!
//! [`Workspace`] is a cheap-to-clone handle; clones share the same index,
//! marker store, and UI state. All mutations here are synchronous and run to
//! completion; the only asynchronous boundary in the crate is an observer's
//! poll (see [`MarkerObserver`](crate::MarkerObserver) and
//! [`WorkspaceObserver`](crate::WorkspaceObserver)). Reload is the sole
//! operation that invalidates index entries in bulk, and it never cancels
//! in-flight observer chains.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashSet;
use serde_json::Value;
use tracing::warn;

use crate::element::{Element, ElementInfo, ElementKind};
use crate::error::WorkspaceError;
use crate::markers::{MarkerBag, MarkerStore, MarkerUpdate};
use crate::paths::{normalize_path, subpaths};
use crate::tree::{NodeId, TreeState};
use crate::ui::{NewElementRequest, RenameElementRequest, UiState};

/// Shared handle to one logical workspace.
///
/// Lock discipline: the tree lock is always acquired before the UI lock,
/// never the other way around.
#[derive(Clone)]
pub struct Workspace {
    tree: Arc<RwLock<Option<TreeState>>>,
    markers: MarkerStore,
    ui: Arc<RwLock<UiState>>,
}

impl Workspace {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tree: Arc::new(RwLock::new(None)),
            markers: MarkerStore::new(),
            ui: Arc::new(RwLock::new(UiState::default())),
        }
    }

    /// Replace the element tree and rebuild the path index wholesale.
    ///
    /// The new root is marked expanded. When `clear_stale_markers` is set,
    /// marker bags for paths absent from the rebuilt index are pruned; the
    /// marker store is otherwise untouched and survives the reload.
    pub fn reload(&self, new_root: Element, clear_stale_markers: bool) {
        let state = TreeState::build(new_root);
        let root_norm = state.node(state.root()).norm.clone();
        *self.tree.write() = Some(state);
        self.ui.write().set_expanded(&root_norm, true);
        if clear_stale_markers {
            self.clear_stale_markers();
        }
    }

    /// Whether a tree has been loaded yet.
    #[must_use]
    pub fn initialized(&self) -> bool {
        self.tree.read().is_some()
    }

    fn with_tree<R>(
        &self,
        f: impl FnOnce(&TreeState) -> Result<R, WorkspaceError>,
    ) -> Result<R, WorkspaceError> {
        match self.tree.read().as_ref() {
            Some(tree) => f(tree),
            None => Err(WorkspaceError::NotInitialized),
        }
    }

    /// Whether `path` denotes an element of the current tree. Total: `false`
    /// before the first reload.
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.tree
            .read()
            .as_ref()
            .is_some_and(|tree| tree.contains(path))
    }

    /// Name/path/kind/child-paths projection of the element at `path`.
    pub fn get_element_info(&self, path: &str) -> Result<ElementInfo, WorkspaceError> {
        self.with_tree(|tree| {
            tree.lookup(path)
                .map(|id| tree.info(id))
                .ok_or_else(|| WorkspaceError::NoSuchElement {
                    path: normalize_path(path).to_string(),
                })
        })
    }

    /// Parent of `path` by path-prefix, `None` for the root's own path and
    /// for prefixes the index does not know.
    ///
    /// When the root's normalized path is empty, single-segment paths
    /// resolve to the root itself.
    pub fn get_parent(&self, path: &str) -> Result<Option<ElementInfo>, WorkspaceError> {
        self.with_tree(|tree| {
            let normalized = normalize_path(path);
            if normalized.is_empty() {
                return Ok(None);
            }
            if let Some(separator) = normalized.rfind('/') {
                Ok(tree
                    .lookup(&normalized[..separator])
                    .map(|id| tree.info(id)))
            } else if tree.node(tree.root()).norm.is_empty() {
                Ok(Some(tree.info(tree.root())))
            } else {
                Ok(None)
            }
        })
    }

    /// Strict ancestor chain of `path`; see [`paths::subpaths`](subpaths).
    #[must_use]
    pub fn get_subpaths(&self, path: &str) -> Vec<String> {
        subpaths(path)
    }

    /// Raw path of the current root element.
    pub fn get_root_path(&self) -> Result<String, WorkspaceError> {
        self.with_tree(|tree| Ok(tree.node(tree.root()).path.clone()))
    }

    /// Whether the element at `path` has children.
    pub fn has_sub_elements(&self, path: &str) -> Result<bool, WorkspaceError> {
        self.with_tree(|tree| {
            tree.lookup(path)
                .map(|id| !tree.node(id).children.is_empty())
                .ok_or_else(|| WorkspaceError::NoSuchElement {
                    path: normalize_path(path).to_string(),
                })
        })
    }

    /// The element's name with the last `.`-delimited extension removed.
    pub fn name_without_file_extension(&self, path: &str) -> Result<String, WorkspaceError> {
        self.with_tree(|tree| {
            let id = tree
                .lookup(path)
                .ok_or_else(|| WorkspaceError::NoSuchElement {
                    path: normalize_path(path).to_string(),
                })?;
            let name = &tree.node(id).name;
            match name.rfind('.') {
                Some(delimiter) => Ok(name[..delimiter].to_string()),
                None => Ok(name.clone()),
            }
        })
    }
}

/// Marker operations.
impl Workspace {
    /// Set one marker field for `path`, creating the bag on first write.
    ///
    /// Fails with [`WorkspaceError::EmptyArgument`] for an empty field name
    /// and with [`WorkspaceError::NoSuchElement`] when `path` is not in the
    /// current index; a failed call leaves the store untouched.
    pub fn set_marker_value(
        &self,
        path: &str,
        field: &str,
        value: Value,
    ) -> Result<(), WorkspaceError> {
        if field.is_empty() {
            return Err(WorkspaceError::EmptyArgument("field name"));
        }
        let normalized = normalize_path(path).to_string();
        self.with_tree(|tree| {
            if tree.contains(&normalized) {
                Ok(())
            } else {
                Err(WorkspaceError::NoSuchElement {
                    path: normalized.clone(),
                })
            }
        })?;
        self.markers.set(&normalized, field, value);
        Ok(())
    }

    /// The stored value for `(path, field)`, by identity.
    ///
    /// Absent bag and absent field are distinct failures
    /// ([`WorkspaceError::NoMarkers`] vs [`WorkspaceError::NoSuchField`]).
    pub fn get_marker_value(&self, path: &str, field: &str) -> Result<Value, WorkspaceError> {
        let normalized = normalize_path(path);
        if !self.markers.has_bag(normalized) {
            return Err(WorkspaceError::NoMarkers {
                path: normalized.to_string(),
            });
        }
        self.markers
            .get(normalized, field)
            .ok_or_else(|| WorkspaceError::NoSuchField {
                path: normalized.to_string(),
                field: field.to_string(),
            })
    }

    /// Total predicate: would [`Self::get_marker_value`] succeed.
    #[must_use]
    pub fn has_marker(&self, path: &str, field: &str) -> bool {
        self.markers.has(normalize_path(path), field)
    }

    /// Clone of the marker bag for `path`; empty if none exists.
    #[must_use]
    pub fn get_markers(&self, path: &str) -> MarkerBag {
        self.markers.bag(normalize_path(path))
    }

    /// Apply every `(path, field, value)` triple of the batch.
    ///
    /// A failing triple is logged and skipped; the batch always attempts
    /// every remaining triple and never fails as a whole.
    pub fn update_markers(&self, updates: &[MarkerUpdate]) {
        for update in updates {
            for (field, value) in &update.fields {
                if let Err(error) = self.set_marker_value(&update.path, field, value.clone()) {
                    warn!(path = %update.path, %field, %error, "skipping marker update");
                }
            }
        }
    }

    /// Remove every marker bag whose path is absent from the current index.
    /// Idempotent; a no-op before the first reload.
    pub fn clear_stale_markers(&self) {
        if let Some(tree) = self.tree.read().as_ref() {
            self.markers.retain_paths(|path| tree.contains(path));
        }
    }
}

/// UI navigation state and visibility traversal.
impl Workspace {
    /// Raw path of the selected element, `None` when nothing is selected or
    /// the selection no longer resolves against the current index.
    #[must_use]
    pub fn get_selected(&self) -> Option<String> {
        let guard = self.tree.read();
        let tree = guard.as_ref()?;
        let ui = self.ui.read();
        let selected = ui.selected.as_deref()?;
        tree.lookup(selected).map(|id| tree.node(id).path.clone())
    }

    /// Select the element at `path`; clears the selection when the path is
    /// not in the index.
    pub fn set_selected(&self, path: &str) {
        let normalized = normalize_path(path).to_string();
        let resolves = self.contains(&normalized);
        self.ui.write().selected = resolves.then_some(normalized);
    }

    pub fn clear_selected(&self) {
        self.ui.write().selected = None;
    }

    #[must_use]
    pub fn is_selected(&self, path: &str) -> bool {
        self.ui.read().selected.as_deref() == Some(normalize_path(path))
    }

    /// Move the selection to the next node of the visible pre-order
    /// sequence; a no-op at the last visible node.
    pub fn select_successor(&self) {
        self.move_selection(TreeState::next_visible);
    }

    /// Move the selection to the previous node of the visible pre-order
    /// sequence; a no-op at the root.
    pub fn select_predecessor(&self) {
        self.move_selection(TreeState::previous_visible);
    }

    fn move_selection(
        &self,
        step: impl FnOnce(&TreeState, NodeId, &FxHashSet<String>) -> Option<NodeId>,
    ) {
        let guard = self.tree.read();
        let Some(tree) = guard.as_ref() else {
            return;
        };
        let mut ui = self.ui.write();
        let Some(selected) = ui.selected.as_deref() else {
            return;
        };
        let Some(id) = tree.lookup(selected) else {
            return;
        };
        if let Some(next) = step(tree, id, ui.expanded()) {
            ui.selected = Some(tree.node(next).norm.clone());
        }
    }

    #[must_use]
    pub fn is_expanded(&self, path: &str) -> bool {
        self.ui.read().is_expanded(normalize_path(path))
    }

    /// Expand or collapse the folder at `path`. Takes effect only for
    /// folders present in the index; files are never expandable.
    pub fn set_expanded(&self, path: &str, expanded: bool) {
        let guard = self.tree.read();
        let Some(tree) = guard.as_ref() else {
            return;
        };
        let Some(id) = tree.lookup(path) else {
            return;
        };
        let node = tree.node(id);
        if node.kind == ElementKind::Folder {
            self.ui.write().set_expanded(&node.norm, expanded);
        }
    }

    pub fn toggle_expanded(&self, path: &str) {
        self.set_expanded(path, !self.is_expanded(path));
    }

    /// Clear the expansion set, then force the root back to expanded: the
    /// root is always implicitly visible and open.
    pub fn collapse_all(&self) {
        let guard = self.tree.read();
        let mut ui = self.ui.write();
        ui.clear_expanded();
        if let Some(tree) = guard.as_ref() {
            ui.set_expanded(&tree.node(tree.root()).norm, true);
        }
    }

    /// Expand every strict ancestor of `path` plus the root, so the element
    /// becomes visible. Does not expand `path` itself.
    pub fn reveal_element(&self, path: &str) {
        let guard = self.tree.read();
        let mut ui = self.ui.write();
        for ancestor in subpaths(path) {
            ui.set_expanded(&ancestor, true);
        }
        if let Some(tree) = guard.as_ref() {
            ui.set_expanded(&tree.node(tree.root()).norm, true);
        }
    }

    #[must_use]
    pub fn is_dirty(&self, path: &str) -> bool {
        self.ui.read().is_dirty(normalize_path(path))
    }

    pub fn set_dirty(&self, path: &str, dirty: bool) {
        self.ui.write().set_dirty(normalize_path(path), dirty);
    }

    /// Normalized path of the active editor, if any.
    #[must_use]
    pub fn get_active(&self) -> Option<String> {
        self.ui.read().active_editor.clone()
    }

    /// Mark the element at `path` as the active editor; ignored for paths
    /// the index does not contain.
    pub fn set_active(&self, path: &str) {
        let normalized = normalize_path(path).to_string();
        if self.contains(&normalized) {
            self.ui.write().active_editor = Some(normalized);
        }
    }

    fn selected_info(&self) -> Option<ElementInfo> {
        let guard = self.tree.read();
        let tree = guard.as_ref()?;
        let ui = self.ui.read();
        let selected = ui.selected.as_deref()?;
        tree.lookup(selected).map(|id| tree.info(id))
    }

    /// Record a request to create a new element of `kind` under the current
    /// selection. A selected folder is expanded first so the new entry will
    /// be visible once created.
    pub fn new_element(&self, kind: ElementKind) {
        let selected = self.selected_info();
        if let Some(info) = &selected {
            if info.kind == ElementKind::Folder {
                self.set_expanded(&info.path, true);
            }
        }
        self.ui.write().new_element_request = Some(NewElementRequest { selected, kind });
    }

    #[must_use]
    pub fn has_new_element_request(&self) -> bool {
        self.ui.read().new_element_request.is_some()
    }

    /// Selection captured by the pending new-element request, if any.
    #[must_use]
    pub fn get_new_element(&self) -> Option<ElementInfo> {
        self.ui
            .read()
            .new_element_request
            .as_ref()
            .and_then(|request| request.selected.clone())
    }

    #[must_use]
    pub fn get_new_element_kind(&self) -> Option<ElementKind> {
        self.ui
            .read()
            .new_element_request
            .as_ref()
            .map(|request| request.kind)
    }

    /// Clear the pending new-element request once the collaborator has
    /// handled it; creation itself happens outside the core.
    pub fn remove_new_element_request(&self) {
        self.ui.write().new_element_request = None;
    }

    /// Record a request to rename the current selection; logs and no-ops
    /// when nothing is selected.
    pub fn rename_selected_element(&self) {
        match self.selected_info() {
            Some(selected) => {
                self.ui.write().rename_element_request = Some(RenameElementRequest { selected });
            }
            None => warn!("there is no selected element to rename"),
        }
    }

    #[must_use]
    pub fn has_rename_element_request(&self) -> bool {
        self.ui.read().rename_element_request.is_some()
    }

    #[must_use]
    pub fn get_rename_element(&self) -> Option<ElementInfo> {
        self.ui
            .read()
            .rename_element_request
            .as_ref()
            .map(|request| request.selected.clone())
    }

    pub fn remove_rename_element_request(&self) {
        self.ui.write().rename_element_request = None;
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}
