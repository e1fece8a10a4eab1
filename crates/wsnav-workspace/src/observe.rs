//! Self-perpetuating marker observation.
//!
//! Markers model a push-unavailable backend: the only way to keep them
//! fresh is to poll. Each registered observer runs as its own spawned task
//! looping poll-apply-poll; poll `n + 1` is issued only after poll `n`'s
//! result has been fully applied, so one chain is strictly sequential with
//! respect to itself. Independent chains are unordered against each other
//! and against direct synchronous writes; last write wins.
//!
//! Failures never terminate a chain: a failed poll is logged and the loop
//! continues, so a transient backend outage cannot silently stop a status
//! indicator from ever updating again. Only a `stop_on` returning `true`
//! for a successfully received value ends the loop. Callers needing
//! earlier termination can abort the returned [`JoinHandle`].

use std::future::Future;

use serde::Serialize;
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::WorkspaceError;
use crate::markers::MarkerUpdate;
use crate::paths::normalize_path;
use crate::workspace::Workspace;

/// Source of bulk marker updates for the whole workspace.
pub trait WorkspaceObserver: Send + 'static {
    /// Produce the next batch of marker updates, or fail.
    fn observe(&mut self) -> impl Future<Output = anyhow::Result<Vec<MarkerUpdate>>> + Send;

    /// Whether the polling chain should terminate after this batch.
    /// Evaluated only for successfully received batches.
    fn stop_on(&mut self, updates: &[MarkerUpdate]) -> bool;
}

/// Source of values for a single `(path, field)` marker.
pub trait MarkerObserver: Send + 'static {
    type Value: Serialize + Clone + Send + 'static;

    /// Path of the observed element. Validated once, at registration.
    fn path(&self) -> &str;

    /// Name of the observed marker field.
    fn field(&self) -> &str;

    /// Produce the next value, or fail.
    fn observe(&mut self) -> impl Future<Output = anyhow::Result<Self::Value>> + Send;

    /// Whether the polling chain should terminate after this value.
    fn stop_on(&mut self, value: &Self::Value) -> bool;
}

impl Workspace {
    /// Register a bulk observer and start its polling chain.
    ///
    /// Every received batch is applied through
    /// [`update_markers`](Workspace::update_markers), which already skips
    /// individual stale triples; a failed poll applies nothing.
    pub fn observe<O: WorkspaceObserver>(&self, mut observer: O) -> JoinHandle<()> {
        let workspace = self.clone();
        tokio::spawn(async move {
            loop {
                match observer.observe().await {
                    Ok(updates) => {
                        workspace.update_markers(&updates);
                        if observer.stop_on(&updates) {
                            break;
                        }
                    }
                    Err(error) => {
                        warn!(%error, "workspace marker poll failed, continuing the chain");
                    }
                }
            }
        })
    }

    /// Register a single-field observer and start its polling chain.
    ///
    /// Fails synchronously with [`WorkspaceError::NoSuchElement`] when the
    /// observed path is not in the current index. When no marker exists yet
    /// for `(path, field)` it is seeded to [`Value::Null`], so readers see
    /// "present but unknown" while the first poll is in flight.
    ///
    /// If the path disappears from the index mid-chain (a reload underneath
    /// the observer), the write attempt fails and is swallowed like any
    /// poll failure; the chain keeps polling. After a failed poll the last
    /// successfully received value, when one exists, is rewritten
    /// best-effort so the marker reflects the freshest known state.
    pub fn observe_marker<O: MarkerObserver>(
        &self,
        mut observer: O,
    ) -> Result<JoinHandle<()>, WorkspaceError> {
        let path = normalize_path(observer.path()).to_string();
        if !self.contains(&path) {
            return Err(WorkspaceError::NoSuchElement { path });
        }
        let field = observer.field().to_string();
        if !self.has_marker(&path, &field) {
            self.set_marker_value(&path, &field, Value::Null)?;
        }

        let workspace = self.clone();
        Ok(tokio::spawn(async move {
            let mut last: Option<O::Value> = None;
            loop {
                match observer.observe().await {
                    Ok(value) => {
                        write_marker(&workspace, &path, &field, &value);
                        if observer.stop_on(&value) {
                            break;
                        }
                        last = Some(value);
                    }
                    Err(error) => {
                        warn!(%path, %field, %error, "marker poll failed, continuing the chain");
                        if let Some(value) = &last {
                            write_marker(&workspace, &path, &field, value);
                        }
                    }
                }
            }
        }))
    }
}

/// Best-effort marker write for observer chains: serialization and
/// stale-path failures are logged, never propagated.
fn write_marker<V: Serialize>(workspace: &Workspace, path: &str, field: &str, value: &V) {
    match serde_json::to_value(value) {
        Ok(json) => {
            if let Err(error) = workspace.set_marker_value(path, field, json) {
                debug!(%path, %field, %error, "skipping observed marker write");
            }
        }
        Err(error) => warn!(%path, %field, %error, "observed value is not serializable"),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use anyhow::anyhow;
    use serde_json::json;

    use super::*;
    use crate::element::{Element, ElementKind};
    use crate::markers::MarkerBag;

    fn workspace_with_children(children: Vec<&str>) -> Workspace {
        let workspace = Workspace::new();
        workspace.reload(
            Element {
                name: "root".to_string(),
                path: "root".to_string(),
                kind: ElementKind::Folder,
                children: children
                    .into_iter()
                    .map(|name| Element {
                        name: name.to_string(),
                        path: format!("root/{name}"),
                        kind: ElementKind::File,
                        children: Vec::new(),
                    })
                    .collect(),
            },
            true,
        );
        workspace
    }

    struct ScriptedMarkerObserver {
        path: String,
        field: String,
        script: VecDeque<anyhow::Result<i64>>,
        terminal: i64,
        polls: Arc<AtomicUsize>,
    }

    impl ScriptedMarkerObserver {
        fn new(path: &str, field: &str, script: Vec<anyhow::Result<i64>>, terminal: i64) -> Self {
            Self {
                path: path.to_string(),
                field: field.to_string(),
                script: script.into_iter().collect(),
                terminal,
                polls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl MarkerObserver for ScriptedMarkerObserver {
        type Value = i64;

        fn path(&self) -> &str {
            &self.path
        }

        fn field(&self) -> &str {
            &self.field
        }

        async fn observe(&mut self) -> anyhow::Result<i64> {
            self.polls.fetch_add(1, Ordering::SeqCst);
            self.script.pop_front().unwrap_or(Ok(self.terminal))
        }

        fn stop_on(&mut self, value: &i64) -> bool {
            *value == self.terminal
        }
    }

    struct ScriptedWorkspaceObserver {
        script: VecDeque<anyhow::Result<Vec<MarkerUpdate>>>,
        polls: Arc<AtomicUsize>,
    }

    impl WorkspaceObserver for ScriptedWorkspaceObserver {
        async fn observe(&mut self) -> anyhow::Result<Vec<MarkerUpdate>> {
            self.polls.fetch_add(1, Ordering::SeqCst);
            self.script.pop_front().unwrap_or(Ok(Vec::new()))
        }

        fn stop_on(&mut self, _updates: &[MarkerUpdate]) -> bool {
            self.script.is_empty()
        }
    }

    fn update(path: &str, field: &str, value: i64) -> MarkerUpdate {
        MarkerUpdate {
            path: path.to_string(),
            fields: MarkerBag::from([(field.to_string(), json!(value))]),
        }
    }

    #[tokio::test]
    async fn bulk_observer_applies_every_batch_until_stop() {
        let workspace = workspace_with_children(vec!["a", "b"]);
        let polls = Arc::new(AtomicUsize::new(0));
        let observer = ScriptedWorkspaceObserver {
            script: VecDeque::from([
                Ok(vec![update("root/a", "status", 1)]),
                Ok(vec![update("root/a", "status", 2), update("root/b", "status", 7)]),
            ]),
            polls: polls.clone(),
        };

        workspace.observe(observer).await.unwrap();

        assert_eq!(
            workspace.get_marker_value("root/a", "status"),
            Ok(json!(2))
        );
        assert_eq!(
            workspace.get_marker_value("root/b", "status"),
            Ok(json!(7))
        );
        assert_eq!(polls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn bulk_observer_survives_poll_failures() {
        let workspace = workspace_with_children(vec!["a"]);
        let polls = Arc::new(AtomicUsize::new(0));
        let observer = ScriptedWorkspaceObserver {
            script: VecDeque::from([
                Err(anyhow!("backend unavailable")),
                Ok(vec![update("root/a", "status", 3)]),
            ]),
            polls: polls.clone(),
        };

        workspace.observe(observer).await.unwrap();

        assert_eq!(
            workspace.get_marker_value("root/a", "status"),
            Ok(json!(3))
        );
        assert_eq!(polls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn bulk_observer_skips_stale_paths_within_a_batch() {
        let workspace = workspace_with_children(vec!["a"]);
        let polls = Arc::new(AtomicUsize::new(0));
        let observer = ScriptedWorkspaceObserver {
            script: VecDeque::from([Ok(vec![
                update("root/a", "status", 1),
                update("root/gone", "status", 2),
            ])]),
            polls: polls.clone(),
        };

        workspace.observe(observer).await.unwrap();

        assert_eq!(
            workspace.get_marker_value("root/a", "status"),
            Ok(json!(1))
        );
        assert!(workspace.get_markers("root/gone").is_empty());
    }

    #[tokio::test]
    async fn marker_observer_requires_an_indexed_path() {
        let workspace = workspace_with_children(vec!["a"]);
        let observer = ScriptedMarkerObserver::new("root/gone", "status", Vec::new(), 0);
        let result = workspace.observe_marker(observer);
        assert!(matches!(
            result,
            Err(WorkspaceError::NoSuchElement { path }) if path == "root/gone"
        ));
    }

    #[tokio::test]
    async fn marker_observer_seeds_a_null_placeholder() {
        let workspace = workspace_with_children(vec!["a"]);
        let observer = ScriptedMarkerObserver::new("root/a", "status", vec![Ok(5)], 5);

        // Registration is synchronous; the task has not polled yet on the
        // current-thread test runtime.
        let handle = workspace.observe_marker(observer).unwrap();
        assert_eq!(
            workspace.get_marker_value("root/a", "status"),
            Ok(Value::Null)
        );

        handle.await.unwrap();
        assert_eq!(
            workspace.get_marker_value("root/a", "status"),
            Ok(json!(5))
        );
    }

    #[tokio::test]
    async fn marker_observer_keeps_an_existing_marker_unseeded() {
        let workspace = workspace_with_children(vec!["a"]);
        workspace
            .set_marker_value("root/a", "status", json!("prior"))
            .unwrap();
        let observer = ScriptedMarkerObserver::new("root/a", "status", vec![Ok(9)], 9);

        let handle = workspace.observe_marker(observer).unwrap();
        assert_eq!(
            workspace.get_marker_value("root/a", "status"),
            Ok(json!("prior"))
        );
        handle.await.unwrap();
        assert_eq!(
            workspace.get_marker_value("root/a", "status"),
            Ok(json!(9))
        );
    }

    #[tokio::test]
    async fn marker_observer_swallows_one_failure_and_ends_on_the_terminal_value() {
        let workspace = workspace_with_children(vec!["a"]);
        let observer =
            ScriptedMarkerObserver::new("root/a", "status", vec![Err(anyhow!("flaky")), Ok(4)], 4);
        let polls = observer.polls.clone();

        workspace
            .observe_marker(observer)
            .unwrap()
            .await
            .unwrap();

        assert_eq!(
            workspace.get_marker_value("root/a", "status"),
            Ok(json!(4))
        );
        // One failed poll swallowed, one successful terminating poll.
        assert_eq!(polls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn marker_observer_rewrites_the_last_value_after_a_failure() {
        let workspace = workspace_with_children(vec!["a"]);
        let observer = ScriptedMarkerObserver::new(
            "root/a",
            "status",
            vec![Ok(1), Err(anyhow!("flaky")), Ok(6)],
            6,
        );
        let polls = observer.polls.clone();

        workspace
            .observe_marker(observer)
            .unwrap()
            .await
            .unwrap();

        assert_eq!(
            workspace.get_marker_value("root/a", "status"),
            Ok(json!(6))
        );
        assert_eq!(polls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn marker_observer_accepts_unnormalized_paths() {
        let workspace = workspace_with_children(vec!["a"]);
        let observer = ScriptedMarkerObserver::new("/root/a/", "status", vec![Ok(2)], 2);

        workspace
            .observe_marker(observer)
            .unwrap()
            .await
            .unwrap();

        assert_eq!(
            workspace.get_marker_value("root/a", "status"),
            Ok(json!(2))
        );
    }
}
