//! Shared marker storage.
//!
//! Markers are named field values attached to a normalized path,
//! independent of tree structure and of the current tree generation. The
//! store is shared between the synchronous [`Workspace`](crate::Workspace)
//! API and spawned observer chains, so it lives behind an `Arc<DashMap>`
//! clone handle.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Dynamic per-path bag of named field values.
pub type MarkerBag = HashMap<String, Value>;

/// One item of a bulk marker update: every field in `fields` is applied to
/// `path`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarkerUpdate {
    pub path: String,
    #[serde(default)]
    pub fields: MarkerBag,
}

/// Shared storage of marker bags, keyed by normalized path.
///
/// The store itself is dumb: validation (non-empty field names, membership
/// in the path index) happens at the [`Workspace`](crate::Workspace) level.
#[derive(Clone, Debug)]
pub(crate) struct MarkerStore {
    inner: Arc<DashMap<String, MarkerBag>>,
}

impl MarkerStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
        }
    }

    /// Set one field, creating the bag for `path` if absent.
    pub fn set(&self, path: &str, field: &str, value: Value) {
        self.inner
            .entry(path.to_string())
            .or_default()
            .insert(field.to_string(), value);
    }

    /// The stored value, `None` when either the bag or the field is absent.
    pub fn get(&self, path: &str, field: &str) -> Option<Value> {
        self.inner.get(path)?.get(field).cloned()
    }

    /// Whether a bag exists for `path` at all.
    pub fn has_bag(&self, path: &str) -> bool {
        self.inner.contains_key(path)
    }

    pub fn has(&self, path: &str, field: &str) -> bool {
        self.inner
            .get(path)
            .is_some_and(|bag| bag.contains_key(field))
    }

    /// Clone of the bag for `path`, or an empty bag if none exists.
    pub fn bag(&self, path: &str) -> MarkerBag {
        self.inner
            .get(path)
            .map(|bag| bag.clone())
            .unwrap_or_default()
    }

    /// Drop every bag whose path key fails the predicate.
    pub fn retain_paths(&self, mut keep: impl FnMut(&str) -> bool) {
        self.inner.retain(|path, _| keep(path));
    }
}
