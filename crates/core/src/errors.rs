//! Error types for the extsync core library.
//!
//! Each subsystem has its own error type derived with `thiserror`; the
//! backend trait surfaces SCM failures through the unified [`ScmError`].

use thiserror::Error;

// ---------------------------------------------------------------------------
// SVN errors
// ---------------------------------------------------------------------------

/// Errors from SVN CLI operations.
#[derive(Debug, Error)]
pub enum SvnError {
    /// The `svn` binary was not found on `$PATH`.
    #[error("svn binary not found: {0}")]
    BinaryNotFound(String),

    /// An `svn` command exited with a non-zero status.
    #[error("svn command failed (exit {exit_code}): {stderr}")]
    CommandFailed {
        exit_code: i32,
        stderr: String,
    },

    /// Could not parse the XML output produced by `svn`.
    #[error("failed to parse svn XML output: {0}")]
    XmlParseError(String),

    /// Generic I/O wrapper.
    #[error("svn I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Git errors
// ---------------------------------------------------------------------------

/// Errors from Git CLI operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// The `git` binary was not found on `$PATH`.
    #[error("git binary not found: {0}")]
    BinaryNotFound(String),

    /// A `git` command exited with a non-zero status.
    #[error("git command failed (exit {exit_code}): {stderr}")]
    CommandFailed {
        exit_code: i32,
        stderr: String,
    },

    /// Generic I/O wrapper.
    #[error("git I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Unified backend error
// ---------------------------------------------------------------------------

/// Unified error type for SCM backend operations.
#[derive(Debug, Error)]
pub enum ScmError {
    #[error(transparent)]
    Svn(#[from] SvnError),

    #[error(transparent)]
    Git(#[from] GitError),
}

// ---------------------------------------------------------------------------
// Declaration-file errors
// ---------------------------------------------------------------------------

/// Errors from declaration-file loading.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The declaration file does not exist.
    #[error("externals file '{0}' not found")]
    FileNotFound(String),

    /// Generic I/O error reading the declaration file.
    #[error("externals file I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
