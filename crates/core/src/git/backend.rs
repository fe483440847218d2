//! Git implementation of the backend contract.
//!
//! Local repository state is read through `git2`; mutation goes through
//! `git` CLI invocations, each carrying `--quiet` unless verbose. Revision
//! semantics are branch names, not commit hashes: `update` is a
//! fast-forward-only pull on the current branch, `switch` checks out the
//! target branch (or the remote default branch) and fast-forwards it. No
//! non-fast-forward operation is ever attempted; an impossible fast-forward
//! fails the operation instead of diverging history.
//!
//! Content conflicts cannot be observed through the monitor channel for
//! Git; the trait's no-op default stands.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use git2::Repository;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::backend::ScmBackend;
use crate::errors::{GitError, ScmError};

/// Git backend. One instance per reconciliation task.
#[derive(Debug)]
pub struct GitBackend {
    verbose: bool,
}

impl GitBackend {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    fn quiet_flag(&self) -> Option<String> {
        (!self.verbose).then(|| "--quiet".to_string())
    }

    async fn run_git(&self, args: &[String]) -> Result<String, GitError> {
        let mut cmd = Command::new("git");
        cmd.args(args).stdout(Stdio::piped()).stderr(Stdio::piped());

        debug!(cmd = ?format!("git {}", args.join(" ")), "running git command");
        let output = cmd.output().await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                GitError::BinaryNotFound("git".into())
            } else {
                GitError::IoError(e)
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            let exit_code = output.status.code().unwrap_or(-1);
            warn!(exit_code, %stderr, "git command failed");
            return Err(GitError::CommandFailed { exit_code, stderr });
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// Resolve the remote default branch from `refs/remotes/origin/HEAD`.
    async fn default_branch(&self, path: &Path) -> Result<String, GitError> {
        let args = vec![
            "-C".to_string(),
            path.display().to_string(),
            "symbolic-ref".to_string(),
            "--short".to_string(),
            "refs/remotes/origin/HEAD".to_string(),
        ];
        let output = self.run_git(&args).await?;
        let name = output.trim();
        Ok(name.strip_prefix("origin/").unwrap_or(name).to_string())
    }
}

#[async_trait]
impl ScmBackend for GitBackend {
    fn clean_uri(&self, uri: &str, revision: Option<&str>) -> (String, Option<String>) {
        let uri = uri.trim_end_matches('/');
        let (base, embedded) = match uri.find(".git@") {
            Some(idx) => {
                let (base, suffix) = uri.split_at(idx + ".git".len());
                // Skip the '@'; branch names may themselves contain '/'.
                let branch = &suffix[1..];
                (base, (!branch.is_empty()).then(|| branch.to_string()))
            }
            None => (uri, None),
        };
        let resolved = revision.map(str::to_string).or(embedded);
        (base.trim_end_matches('/').to_string(), resolved)
    }

    async fn inspect(&self, path: &Path) -> (Option<String>, Option<String>) {
        let repo = match Repository::open(path) {
            Ok(repo) => repo,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "no readable git repository");
                return (None, None);
            }
        };
        let uri = repo
            .find_remote("origin")
            .ok()
            .and_then(|remote| remote.url().map(str::to_string));
        // A detached HEAD has no branch name and reads as unknown.
        let branch = repo
            .head()
            .ok()
            .filter(|head| head.is_branch())
            .and_then(|head| head.shorthand().map(str::to_string));
        (uri, branch)
    }

    async fn checkout(
        &self,
        path: &Path,
        uri: &str,
        revision: Option<&str>,
    ) -> Result<(), ScmError> {
        let mut args = vec!["clone".to_string()];
        if let Some(quiet) = self.quiet_flag() {
            args.push(quiet);
        }
        if let Some(branch) = revision {
            args.push("--branch".into());
            args.push(branch.to_string());
        }
        args.push(uri.to_string());
        args.push(path.display().to_string());
        self.run_git(&args).await?;
        debug!(path = %path.display(), uri, "git clone completed");
        Ok(())
    }

    async fn update(&self, path: &Path, _revision: Option<&str>) -> Result<(), ScmError> {
        let mut args = vec![
            "-C".to_string(),
            path.display().to_string(),
            "pull".to_string(),
            "--ff-only".to_string(),
        ];
        if let Some(quiet) = self.quiet_flag() {
            args.push(quiet);
        }
        self.run_git(&args).await?;
        Ok(())
    }

    async fn switch(&self, path: &Path, _uri: &str, revision: Option<&str>) -> Result<(), ScmError> {
        let mut fetch = vec![
            "-C".to_string(),
            path.display().to_string(),
            "fetch".to_string(),
        ];
        if let Some(quiet) = self.quiet_flag() {
            fetch.push(quiet);
        }
        self.run_git(&fetch).await?;

        let branch = match revision {
            Some(branch) => branch.to_string(),
            None => self.default_branch(path).await.map_err(ScmError::Git)?,
        };
        let mut checkout = vec![
            "-C".to_string(),
            path.display().to_string(),
            "checkout".to_string(),
        ];
        if let Some(quiet) = self.quiet_flag() {
            checkout.push(quiet);
        }
        checkout.push(branch);
        self.run_git(&checkout).await?;

        let mut pull = vec![
            "-C".to_string(),
            path.display().to_string(),
            "pull".to_string(),
            "--ff-only".to_string(),
        ];
        if let Some(quiet) = self.quiet_flag() {
            pull.push(quiet);
        }
        self.run_git(&pull).await?;
        Ok(())
    }
}
