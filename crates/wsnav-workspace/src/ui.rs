//! Ephemeral, non-persisted view state.
//!
//! Everything here is per-session: expansion, selection, the active editor,
//! dirty flags, and pending create/rename requests. Keys are normalized
//! paths; nothing survives a process restart and nothing is reconciled
//! automatically on reload beyond what
//! [`Workspace::reload`](crate::Workspace::reload) does itself.

use rustc_hash::FxHashSet;

use crate::element::{ElementInfo, ElementKind};

/// Pending request to create a new element under the captured selection.
#[derive(Clone, Debug, PartialEq)]
pub struct NewElementRequest {
    /// Selection at the time of the request; `None` when nothing was
    /// selected.
    pub selected: Option<ElementInfo>,
    pub kind: ElementKind,
}

/// Pending request to rename the captured selection.
#[derive(Clone, Debug, PartialEq)]
pub struct RenameElementRequest {
    pub selected: ElementInfo,
}

#[derive(Debug, Default)]
pub(crate) struct UiState {
    expanded: FxHashSet<String>,
    dirty: FxHashSet<String>,
    /// Normalized path of the selected element, if any.
    pub selected: Option<String>,
    /// Normalized path of the active editor, if any.
    pub active_editor: Option<String>,
    pub new_element_request: Option<NewElementRequest>,
    pub rename_element_request: Option<RenameElementRequest>,
}

impl UiState {
    pub fn set_expanded(&mut self, path: &str, expanded: bool) {
        if expanded {
            self.expanded.insert(path.to_string());
        } else {
            self.expanded.remove(path);
        }
    }

    pub fn is_expanded(&self, path: &str) -> bool {
        self.expanded.contains(path)
    }

    pub fn clear_expanded(&mut self) {
        self.expanded.clear();
    }

    pub fn expanded(&self) -> &FxHashSet<String> {
        &self.expanded
    }

    pub fn set_dirty(&mut self, path: &str, dirty: bool) {
        if dirty {
            self.dirty.insert(path.to_string());
        } else {
            self.dirty.remove(path);
        }
    }

    pub fn is_dirty(&self, path: &str) -> bool {
        self.dirty.contains(path)
    }
}
