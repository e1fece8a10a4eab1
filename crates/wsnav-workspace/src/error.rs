use thiserror::Error;

/// Errors raised by the synchronous [`Workspace`](crate::Workspace) API.
///
/// Structural queries and mutators fail loudly; callers expecting
/// uncertainty are meant to check `contains`/`has_marker` first. Batch
/// updates and the observation engine invert this policy and swallow these
/// errors at the point of iteration, trading strict visibility for liveness.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum WorkspaceError {
    /// A path-keyed query was issued before the first successful reload.
    #[error("workspace is not initialized; load an element tree first")]
    NotInitialized,

    /// A required argument was empty.
    #[error("{0} must not be empty")]
    EmptyArgument(&'static str),

    /// The path is not present in the current path index.
    #[error("no element with path {path:?} in this workspace")]
    NoSuchElement { path: String },

    /// No marker fields have ever been set for the path.
    #[error("there are no marker fields for path {path:?}")]
    NoMarkers { path: String },

    /// The path has a marker bag, but not this field.
    #[error("the marker field {field:?} does not exist for path {path:?}")]
    NoSuchField { path: String, field: String },
}
