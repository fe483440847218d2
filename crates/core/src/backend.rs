//! The SCM backend abstraction.
//!
//! Each source-control system implements the same five-operation contract;
//! the reconciler drives whichever backend matches a component's
//! [`ScmKind`]. Backend instances are constructed per reconciliation task
//! and never shared across concurrent operations.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::errors::ScmError;
use crate::git::GitBackend;
use crate::models::ScmKind;
use crate::svn::SvnBackend;

/// Shared sink receiving conflicted paths during update/switch.
pub type ConflictSink = Arc<Mutex<Vec<String>>>;

/// Capability contract implemented independently per SCM kind.
#[async_trait]
pub trait ScmBackend: Send + Sync {
    /// Strip any embedded revision suffix and trailing path separators from
    /// `uri`. An explicit `revision` wins; otherwise the embedded suffix (if
    /// any) becomes the resolved revision. Pure, no I/O.
    fn clean_uri(&self, uri: &str, revision: Option<&str>) -> (String, Option<String>);

    /// Read the working copy's recorded upstream URI and current revision.
    ///
    /// Never fails: a missing or corrupt working copy yields `(None, None)`,
    /// which the reconciler treats as divergent.
    async fn inspect(&self, path: &Path) -> (Option<String>, Option<String>);

    /// Materialize a new working copy at `path` bound to `uri`/`revision`.
    /// `path` must not exist yet.
    async fn checkout(&self, path: &Path, uri: &str, revision: Option<&str>)
        -> Result<(), ScmError>;

    /// Advance an existing working copy bound to the same URI to `revision`,
    /// or to the latest state if absent.
    async fn update(&self, path: &Path, revision: Option<&str>) -> Result<(), ScmError>;

    /// Rebind an existing working copy to a different URI and/or revision.
    async fn switch(&self, path: &Path, uri: &str, revision: Option<&str>)
        -> Result<(), ScmError>;

    /// Register a sink receiving conflicted paths observed during
    /// update/switch. Default no-op for backends without a conflict channel.
    fn set_conflict_monitor(&mut self, sink: ConflictSink) {
        let _ = sink;
    }
}

/// Construct a fresh backend instance for one reconciliation task.
pub fn backend_for(kind: ScmKind, verbose: bool) -> Box<dyn ScmBackend> {
    match kind {
        ScmKind::Svn => Box::new(SvnBackend::new()),
        ScmKind::Git => Box::new(GitBackend::new(verbose)),
    }
}
