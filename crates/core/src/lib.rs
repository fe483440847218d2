//! extsync core library.
//!
//! Reconciles a declared set of source-tree externals (SVN and Git) against
//! their upstream repositories in parallel: declaration loading, the SCM
//! backend abstraction, per-component reconciliation, bounded dispatch, and
//! result aggregation.

pub mod backend;
pub mod dispatcher;
pub mod errors;
pub mod git;
pub mod manifest;
pub mod models;
pub mod reconciler;
pub mod report;
pub mod svn;

// Re-exports for convenience.
pub use backend::{backend_for, ConflictSink, ScmBackend};
pub use dispatcher::{Dispatcher, DEFAULT_MAX_JOBS};
pub use manifest::{ManifestFormat, DEFAULT_EXTERNALS_FILE};
pub use models::{Component, Outcome, ScmKind};
pub use report::{aggregate, RunSummary};
