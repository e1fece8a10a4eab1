//! In-memory model of a hierarchical workspace.
//!
//! The [`Workspace`] keeps a path-indexed view of an externally supplied
//! element tree, a dynamic per-path marker overlay refreshed by long-lived
//! polling observers, and the ephemeral UI state (expansion, selection,
//! pending create/rename requests) consumed by the visibility-aware tree
//! traversal.

mod element;
mod error;
mod markers;
mod observe;
pub mod paths;
mod tree;
mod ui;
mod workspace;

pub use element::{Element, ElementInfo, ElementKind};
pub use error::WorkspaceError;
pub use markers::{MarkerBag, MarkerUpdate};
pub use observe::{MarkerObserver, WorkspaceObserver};
pub use ui::{NewElementRequest, RenameElementRequest};
pub use workspace::Workspace;
