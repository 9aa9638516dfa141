//! End-to-end provenance resolution against real throwaway git repositories.

use std::path::{Path, PathBuf};
use std::process::Command;

use verstamp_core::{provenance, CommandOutput, CommandRunner, Result, ShellRunner, UNKNOWN};

/// Runs each command through the real shell inside a fixed directory, so
/// the git fallbacks see the test repository instead of the test cwd.
struct DirRunner {
    dir: PathBuf,
}

impl CommandRunner for DirRunner {
    fn run(&self, command: &str) -> Result<CommandOutput> {
        ShellRunner::new().run(&format!("cd '{}' && {}", self.dir.display(), command))
    }
}

fn no_env(_: &str) -> Option<String> {
    None
}

fn run_git(repo_dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(repo_dir)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
}

fn make_git_repo() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    run_git(dir.path(), &["init"]);
    run_git(dir.path(), &["config", "user.name", "test-user"]);
    run_git(dir.path(), &["config", "user.email", "test@example.com"]);
    run_git(dir.path(), &["commit", "--allow-empty", "-m", "initial"]);
    dir
}

#[test]
fn fallback_resolves_branch_and_sha_from_a_checkout() {
    let repo = make_git_repo();
    run_git(repo.path(), &["checkout", "-b", "feature-test"]);
    let runner = DirRunner {
        dir: repo.path().to_path_buf(),
    };

    let p = provenance::resolve_with(no_env, &runner);
    assert_eq!(p.branch, "feature-test");
    assert_ne!(p.sha, UNKNOWN);
    assert!(p.sha.len() >= 4, "short sha expected, got: {}", p.sha);
    assert!(p.sha.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn detached_head_degrades_branch_to_unknown_but_resolves_sha() {
    let repo = make_git_repo();
    run_git(repo.path(), &["checkout", "--detach"]);
    let runner = DirRunner {
        dir: repo.path().to_path_buf(),
    };

    let p = provenance::resolve_with(no_env, &runner);
    // Both branch fallbacks fail on a detached HEAD.
    assert_eq!(p.branch, UNKNOWN);
    assert_ne!(p.sha, UNKNOWN);
}

#[test]
fn outside_a_repository_both_fields_are_unknown() {
    let dir = tempfile::tempdir().unwrap();
    let runner = DirRunner {
        dir: dir.path().to_path_buf(),
    };

    let p = provenance::resolve_with(no_env, &runner);
    assert_eq!(p.branch, UNKNOWN);
    assert_eq!(p.sha, UNKNOWN);
}

#[test]
fn ci_environment_bypasses_git_entirely() {
    // No repository at all; values must come from the injected environment.
    let dir = tempfile::tempdir().unwrap();
    let runner = DirRunner {
        dir: dir.path().to_path_buf(),
    };
    let lookup = |name: &str| match name {
        "GITHUB_ACTIONS" => Some("true".to_string()),
        "GITHUB_REF_NAME" => Some("release-2.0".to_string()),
        "GITHUB_SHA" => Some("cafe123".to_string()),
        _ => None,
    };

    let p = provenance::resolve_with(lookup, &runner);
    assert_eq!(p.branch, "release-2.0");
    assert_eq!(p.sha, "cafe123");
}
