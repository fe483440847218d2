//! Domain model types for externals reconciliation.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// SCM kind
// ---------------------------------------------------------------------------

/// Source-control kind of a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScmKind {
    Svn,
    Git,
}

impl ScmKind {
    /// Infer the SCM kind from a declared URI: Git if the URI ends in `.git`
    /// or embeds `.git@`, SVN otherwise.
    pub fn from_uri(uri: &str) -> Self {
        let uri = uri.trim_end_matches('/');
        if uri.ends_with(".git") || uri.contains(".git@") {
            Self::Git
        } else {
            Self::Svn
        }
    }
}

impl std::fmt::Display for ScmKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Svn => write!(f, "svn"),
            Self::Git => write!(f, "git"),
        }
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Result of reconciling one component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Update,
    Checkout,
    Switch,
    UpdateError,
    CheckoutError,
    SwitchError,
    Error,
}

impl Outcome {
    /// Whether this outcome represents a completed backend operation.
    pub fn is_success(self) -> bool {
        matches!(self, Self::Update | Self::Checkout | Self::Switch)
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Update => write!(f, "update"),
            Self::Checkout => write!(f, "checkout"),
            Self::Switch => write!(f, "switch"),
            Self::UpdateError => write!(f, "update_error"),
            Self::CheckoutError => write!(f, "checkout_error"),
            Self::SwitchError => write!(f, "switch_error"),
            Self::Error => write!(f, "error"),
        }
    }
}

// ---------------------------------------------------------------------------
// Component
// ---------------------------------------------------------------------------

/// One declared (path, uri, revision) binding to reconcile.
///
/// Constructed in bulk by a declaration loader, mutated by exactly one
/// reconciliation task, then consumed read-only by the aggregator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Component {
    /// Local filesystem path, relative to the working root. Unique per run.
    pub path: String,

    /// Declared upstream location; may embed a revision/branch suffix.
    pub uri: String,

    /// Explicit target revision or branch; wins over an embedded suffix.
    pub revision: Option<String>,

    /// Decided once at construction from `uri`, never re-decided.
    scm_kind: ScmKind,

    /// Conflicted paths reported while updating or switching.
    #[serde(default)]
    pub conflicts: Vec<String>,

    /// Set exactly once by the reconciler.
    #[serde(default)]
    pub outcome: Option<Outcome>,
}

impl Component {
    pub fn new(path: impl Into<String>, uri: impl Into<String>, revision: Option<String>) -> Self {
        let uri = uri.into();
        let scm_kind = ScmKind::from_uri(&uri);
        Self {
            path: path.into(),
            uri,
            revision,
            scm_kind,
            conflicts: Vec::new(),
            outcome: None,
        }
    }

    pub fn scm_kind(&self) -> ScmKind {
        self.scm_kind
    }

    /// Whether this component counts toward an overall successful run.
    ///
    /// An unset outcome marks a component that was never dispatched and is
    /// not treated as a failure.
    pub fn is_success(&self) -> bool {
        self.outcome.map_or(true, Outcome::is_success) && self.conflicts.is_empty()
    }
}
