//! Integration tests for the reconciliation pipeline.
//!
//! These exercise dispatch, reconciliation, and aggregation against:
//! - Real local Git repositories (created via `git2`, operated on via the
//!   `git` CLI)
//! - Real local SVN repositories created via `svnadmin create` (`file://`)
//!
//! No network I/O. If the `git` or `svn`/`svnadmin` binaries are not
//! installed, the corresponding tests skip gracefully.

use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

use extsync_core::report;
use extsync_core::{Component, Dispatcher, Outcome};

// ===========================================================================
// Helper functions
// ===========================================================================

fn binary_available(name: &str) -> bool {
    Command::new(name)
        .arg("--version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

fn git_available() -> bool {
    binary_available("git")
}

/// Returns `true` if both `svn` and `svnadmin` are available on `$PATH`.
fn svn_available() -> bool {
    binary_available("svn") && binary_available("svnadmin")
}

/// Create a local upstream Git repository with one commit. The directory is
/// named `<name>.git` so declared URIs infer the Git backend.
fn create_git_upstream(dir: &Path, name: &str) -> PathBuf {
    let repo_dir = dir.join(format!("{name}.git"));
    let repo = git2::Repository::init(&repo_dir).unwrap();
    std::fs::write(repo_dir.join("README"), format!("{name}\n")).unwrap();
    let mut index = repo.index().unwrap();
    index.add_path(Path::new("README")).unwrap();
    index.write().unwrap();
    let tree_oid = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_oid).unwrap();
    let sig = git2::Signature::now("Test", "test@test.com").unwrap();
    repo.commit(Some("HEAD"), &sig, &sig, "initial", &tree, &[])
        .unwrap();
    repo_dir
}

fn git_clone(uri: &str, target: &Path) {
    let status = Command::new("git")
        .args(["clone", "--quiet", uri, target.to_str().unwrap()])
        .status()
        .expect("failed to run git clone");
    assert!(status.success(), "git clone failed");
}

/// Create a local SVN repository via `svnadmin create`. Returns the
/// `file://` URL.
fn create_svn_repo(dir: &Path) -> String {
    let repo_dir = dir.join("svn_repo");
    let status = Command::new("svnadmin")
        .args(["create", repo_dir.to_str().unwrap()])
        .status()
        .expect("failed to run svnadmin create");
    assert!(status.success(), "svnadmin create failed");
    format!("file://{}", repo_dir.display())
}

fn svn_checkout(url: &str, wc_path: &Path) {
    let status = Command::new("svn")
        .args([
            "checkout",
            url,
            wc_path.to_str().unwrap(),
            "--non-interactive",
        ])
        .stdout(std::process::Stdio::null())
        .status()
        .expect("failed to run svn checkout");
    assert!(status.success(), "svn checkout failed");
}

/// Write `content` to `filename` inside `wc_path`, stage it if new, and
/// commit.
fn svn_commit_file(wc_path: &Path, filename: &str, content: &str, message: &str) {
    let file_path = wc_path.join(filename);
    let is_new = !file_path.exists();
    std::fs::write(&file_path, content).unwrap();

    if is_new {
        let status = Command::new("svn")
            .args(["add", file_path.to_str().unwrap()])
            .stdout(std::process::Stdio::null())
            .status()
            .expect("failed to run svn add");
        assert!(status.success(), "svn add failed");
    }

    let status = Command::new("svn")
        .args([
            "commit",
            "-m",
            message,
            wc_path.to_str().unwrap(),
            "--non-interactive",
        ])
        .stdout(std::process::Stdio::null())
        .status()
        .expect("failed to run svn commit");
    assert!(status.success(), "svn commit failed");
}

// ===========================================================================
// Git scenarios
// ===========================================================================

#[tokio::test]
async fn test_git_update_and_branch_pinned_checkout() {
    if !git_available() {
        eprintln!("skipping: git not installed");
        return;
    }

    let tmp = TempDir::new().unwrap();
    let upstream_a = create_git_upstream(tmp.path(), "liba");
    let upstream_b = create_git_upstream(tmp.path(), "libb");

    // Give libb a dev branch to pin the checkout to.
    {
        let repo = git2::Repository::open(&upstream_b).unwrap();
        let head = repo.head().unwrap().peel_to_commit().unwrap();
        repo.branch("dev", &head, false).unwrap();
    }

    let workdir = tmp.path().join("work");
    std::fs::create_dir(&workdir).unwrap();

    let uri_a = upstream_a.display().to_string();
    let uri_b = format!("{}@dev", upstream_b.display());

    // `a` pre-exists bound to the same origin; `b` is absent on disk.
    git_clone(&uri_a, &workdir.join("a"));

    let components = vec![
        Component::new("a", uri_a, None),
        Component::new("b", uri_b, None),
    ];
    let dispatcher = Dispatcher::new(workdir.clone(), 4, false);
    let processed = dispatcher.run(components).await;

    assert_eq!(processed[0].outcome, Some(Outcome::Update));
    assert_eq!(processed[1].outcome, Some(Outcome::Checkout));
    assert!(processed.iter().all(|c| c.conflicts.is_empty()));

    let summary = report::aggregate(&processed);
    assert!(summary.success);
    assert_eq!(summary.updated, 1);
    assert_eq!(summary.checked_out, 1);

    // The pinned clone must sit on the dev branch.
    let cloned = git2::Repository::open(workdir.join("b")).unwrap();
    assert_eq!(cloned.head().unwrap().shorthand(), Some("dev"));
    assert!(workdir.join("b/README").exists());
}

#[tokio::test]
async fn test_git_update_picks_up_new_commits() {
    if !git_available() {
        eprintln!("skipping: git not installed");
        return;
    }

    let tmp = TempDir::new().unwrap();
    let upstream = create_git_upstream(tmp.path(), "lib");
    let workdir = tmp.path().join("work");
    std::fs::create_dir(&workdir).unwrap();

    let uri = upstream.display().to_string();
    git_clone(&uri, &workdir.join("lib"));

    // Advance the upstream after the clone.
    {
        let repo = git2::Repository::open(&upstream).unwrap();
        std::fs::write(upstream.join("second.txt"), "more\n").unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new("second.txt")).unwrap();
        index.write().unwrap();
        let tree_oid = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_oid).unwrap();
        let sig = git2::Signature::now("Test", "test@test.com").unwrap();
        let parent = repo.head().unwrap().peel_to_commit().unwrap();
        repo.commit(Some("HEAD"), &sig, &sig, "second", &tree, &[&parent])
            .unwrap();
    }

    let dispatcher = Dispatcher::new(workdir.clone(), 2, false);
    let processed = dispatcher
        .run(vec![Component::new("lib", uri, None)])
        .await;

    assert_eq!(processed[0].outcome, Some(Outcome::Update));
    // The fast-forward pull materialized the new upstream commit.
    assert!(workdir.join("lib/second.txt").exists());
}

#[tokio::test]
async fn test_git_switch_on_origin_change() {
    if !git_available() {
        eprintln!("skipping: git not installed");
        return;
    }

    let tmp = TempDir::new().unwrap();
    let upstream_old = create_git_upstream(tmp.path(), "old");
    let upstream_new = create_git_upstream(tmp.path(), "new");
    let workdir = tmp.path().join("work");
    std::fs::create_dir(&workdir).unwrap();

    git_clone(&upstream_old.display().to_string(), &workdir.join("c"));

    let components = vec![Component::new("c", upstream_new.display().to_string(), None)];
    let dispatcher = Dispatcher::new(workdir.clone(), 2, false);
    let processed = dispatcher.run(components).await;

    assert_eq!(processed[0].outcome, Some(Outcome::Switch));
    let summary = report::aggregate(&processed);
    assert!(summary.success);
}

// ===========================================================================
// SVN scenarios
// ===========================================================================

#[tokio::test]
async fn test_svn_checkout_update_and_conflict() {
    if !svn_available() {
        eprintln!("skipping: svn/svnadmin not installed");
        return;
    }

    let tmp = TempDir::new().unwrap();
    let url = create_svn_repo(tmp.path());

    // Seed the repository through a control working copy.
    let control = tmp.path().join("control");
    svn_checkout(&url, &control);
    svn_commit_file(&control, "f.txt", "base\n", "seed");

    let workdir = tmp.path().join("work");
    std::fs::create_dir(&workdir).unwrap();
    let dispatcher = Dispatcher::new(workdir.clone(), 2, false);

    // First run materializes the working copy.
    let processed = dispatcher
        .run(vec![Component::new("ext", url.clone(), None)])
        .await;
    assert_eq!(processed[0].outcome, Some(Outcome::Checkout));
    assert!(workdir.join("ext/f.txt").exists());

    // Second run over an up-to-date component is a clean update.
    let processed = dispatcher
        .run(vec![Component::new("ext", url.clone(), None)])
        .await;
    assert_eq!(processed[0].outcome, Some(Outcome::Update));
    assert!(processed[0].conflicts.is_empty());
    assert!(report::aggregate(&processed).success);

    // Conflicting upstream and local edits: the update still completes but
    // the conflict flips the overall verdict.
    svn_commit_file(&control, "f.txt", "upstream\n", "upstream change");
    std::fs::write(workdir.join("ext/f.txt"), "local\n").unwrap();

    let processed = dispatcher
        .run(vec![Component::new("ext", url.clone(), None)])
        .await;
    assert_eq!(processed[0].outcome, Some(Outcome::Update));
    assert_eq!(processed[0].conflicts, vec!["f.txt".to_string()]);

    let summary = report::aggregate(&processed);
    assert!(!summary.success);
    assert_eq!(summary.updated, 1);
    assert_eq!(summary.conflicted, 1);
}

#[tokio::test]
async fn test_svn_pinned_revision_checkout() {
    if !svn_available() {
        eprintln!("skipping: svn/svnadmin not installed");
        return;
    }

    let tmp = TempDir::new().unwrap();
    let url = create_svn_repo(tmp.path());

    let control = tmp.path().join("control");
    svn_checkout(&url, &control);
    svn_commit_file(&control, "f.txt", "first\n", "r1");
    svn_commit_file(&control, "f.txt", "second\n", "r2");

    let workdir = tmp.path().join("work");
    std::fs::create_dir(&workdir).unwrap();
    let dispatcher = Dispatcher::new(workdir.clone(), 2, false);

    // The embedded @1 suffix pins the checkout to the first revision.
    let processed = dispatcher
        .run(vec![Component::new("pinned", format!("{url}@1"), None)])
        .await;

    assert_eq!(processed[0].outcome, Some(Outcome::Checkout));
    let content = std::fs::read_to_string(workdir.join("pinned/f.txt")).unwrap();
    assert_eq!(content, "first\n");
}

// ===========================================================================
// Mixed-tree scenarios
// ===========================================================================

#[tokio::test]
async fn test_blocked_component_does_not_disturb_siblings() {
    if !git_available() {
        eprintln!("skipping: git not installed");
        return;
    }

    let tmp = TempDir::new().unwrap();
    let upstream = create_git_upstream(tmp.path(), "lib");
    let workdir = tmp.path().join("work");
    std::fs::create_dir(&workdir).unwrap();

    // A plain file where a working copy should be.
    std::fs::write(workdir.join("blocked"), "in the way").unwrap();

    let components = vec![
        Component::new("blocked", "https://svn.example.com/repo", None),
        Component::new("lib", upstream.display().to_string(), None),
    ];
    let dispatcher = Dispatcher::new(workdir.clone(), 2, false);
    let processed = dispatcher.run(components).await;

    assert_eq!(processed[0].outcome, Some(Outcome::Error));
    assert_eq!(processed[1].outcome, Some(Outcome::Checkout));

    let summary = report::aggregate(&processed);
    assert!(!summary.success);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.checked_out, 1);
}
