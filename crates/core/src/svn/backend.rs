//! SVN implementation of the backend contract, shelling out to the `svn`
//! CLI.
//!
//! Every invocation runs with `--non-interactive`. `update` and `switch`
//! postpone conflict resolution and report conflicted paths through the
//! attached monitor sink, relative to the working-copy root.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use super::parser::{parse_conflicted_paths, parse_working_copy_info};
use crate::backend::{ConflictSink, ScmBackend};
use crate::errors::{ScmError, SvnError};

/// SVN backend. One instance per reconciliation task.
#[derive(Debug, Default)]
pub struct SvnBackend {
    conflict_sink: Option<ConflictSink>,
}

impl SvnBackend {
    pub fn new() -> Self {
        Self::default()
    }

    async fn run_svn(&self, args: &[String]) -> Result<String, SvnError> {
        let mut cmd = Command::new("svn");
        cmd.args(args)
            .arg("--non-interactive")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        debug!(cmd = ?format!("svn {}", args.join(" ")), "running svn command");
        let output = cmd.output().await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SvnError::BinaryNotFound("svn".into())
            } else {
                SvnError::IoError(e)
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            let exit_code = output.status.code().unwrap_or(-1);
            warn!(exit_code, %stderr, "svn command failed");
            return Err(SvnError::CommandFailed { exit_code, stderr });
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// Feed conflicted paths from an update/switch transcript into the
    /// monitor sink, relative to the working-copy root.
    fn record_conflicts(&self, root: &Path, output: &str) {
        let conflicted = parse_conflicted_paths(output);
        if conflicted.is_empty() {
            return;
        }
        if let Some(sink) = &self.conflict_sink {
            let mut sink = sink.lock().unwrap();
            for path in conflicted {
                let relative = match Path::new(&path).strip_prefix(root) {
                    Ok(stripped) => stripped.display().to_string(),
                    Err(_) => path.clone(),
                };
                sink.push(relative);
            }
        }
    }
}

#[async_trait]
impl ScmBackend for SvnBackend {
    fn clean_uri(&self, uri: &str, revision: Option<&str>) -> (String, Option<String>) {
        let uri = uri.trim_end_matches('/');
        // A trailing `@rev` is a peg revision; an `@` followed by `/` is part
        // of the path proper and left alone.
        let (base, embedded) = match uri.rsplit_once('@') {
            Some((base, rev)) if !base.is_empty() && !rev.is_empty() && !rev.contains('/') => {
                (base, Some(rev.to_string()))
            }
            _ => (uri, None),
        };
        let resolved = revision.map(str::to_string).or(embedded);
        (base.trim_end_matches('/').to_string(), resolved)
    }

    async fn inspect(&self, path: &Path) -> (Option<String>, Option<String>) {
        let args = vec![
            "info".to_string(),
            "--xml".to_string(),
            path.display().to_string(),
        ];
        let xml = match self.run_svn(&args).await {
            Ok(xml) => xml,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "no readable svn working copy");
                return (None, None);
            }
        };
        match parse_working_copy_info(&xml) {
            Ok(info) => {
                // Zero or negative working-copy revisions mean "unknown".
                let revision = (info.revision > 0).then(|| info.revision.to_string());
                (Some(info.url), revision)
            }
            Err(e) => {
                debug!(path = %path.display(), error = %e, "unparseable svn info output");
                (None, None)
            }
        }
    }

    async fn checkout(
        &self,
        path: &Path,
        uri: &str,
        revision: Option<&str>,
    ) -> Result<(), ScmError> {
        let mut args = vec!["checkout".to_string()];
        if let Some(rev) = revision {
            args.push("-r".into());
            args.push(rev.to_string());
        }
        args.push(uri.to_string());
        args.push(path.display().to_string());
        self.run_svn(&args).await?;
        debug!(path = %path.display(), uri, "svn checkout completed");
        Ok(())
    }

    async fn update(&self, path: &Path, revision: Option<&str>) -> Result<(), ScmError> {
        let mut args = vec![
            "update".to_string(),
            "--accept".to_string(),
            "postpone".to_string(),
        ];
        if let Some(rev) = revision {
            args.push("-r".into());
            args.push(rev.to_string());
        }
        args.push(path.display().to_string());
        let output = self.run_svn(&args).await?;
        self.record_conflicts(path, &output);
        Ok(())
    }

    async fn switch(&self, path: &Path, uri: &str, revision: Option<&str>) -> Result<(), ScmError> {
        let mut args = vec![
            "switch".to_string(),
            "--accept".to_string(),
            "postpone".to_string(),
        ];
        if let Some(rev) = revision {
            args.push("-r".into());
            args.push(rev.to_string());
        }
        args.push(uri.to_string());
        args.push(path.display().to_string());
        let output = self.run_svn(&args).await?;
        self.record_conflicts(path, &output);
        Ok(())
    }

    fn set_conflict_monitor(&mut self, sink: ConflictSink) {
        self.conflict_sink = Some(sink);
    }
}
