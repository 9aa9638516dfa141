//! Build provenance resolution: which branch and commit is this build from.
//!
//! CI-supplied environment variables are authoritative when present. When no
//! platform is detected, or the detected platform did not set a variable,
//! resolution falls back to an ordered chain of git commands tried one at a
//! time until one succeeds. A fallback step counts as failed when the
//! command exits non-zero, produces empty trimmed output, or cannot be
//! spawned at all; if every alternative fails the field resolves to the
//! literal `"unknown"`. Resolution itself never returns an error.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ci::CiProvider;
use crate::exec::{CommandRunner, ShellRunner};

/// Sentinel for a field no fallback command could resolve.
pub const UNKNOWN: &str = "unknown";

/// Ordered branch-name fallbacks, tried until one succeeds.
const BRANCH_FALLBACKS: [&str; 2] = [
    "git branch --show-current",
    "git symbolic-ref --short HEAD",
];

/// Ordered commit-sha fallbacks, tried until one succeeds.
const SHA_FALLBACKS: [&str; 2] = [
    "git --no-pager log -1 --format=%h",
    "git rev-parse --short HEAD",
];

/// The branch and commit a build was produced from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    /// Branch name, or [`UNKNOWN`].
    pub branch: String,

    /// Short commit sha, or [`UNKNOWN`].
    pub sha: String,
}

/// Resolve branch and sha from the process environment, shelling out to
/// git where CI variables are absent.
pub fn resolve() -> Provenance {
    resolve_with(|name| std::env::var(name).ok(), &ShellRunner::new())
}

/// Resolve branch and sha through injectable environment and command seams.
pub fn resolve_with<F, R>(lookup: F, runner: &R) -> Provenance
where
    F: Fn(&str) -> Option<String>,
    R: CommandRunner,
{
    let provider = CiProvider::detect(&lookup);
    if let Some(p) = provider {
        debug!(provider = ?p, "detected CI platform");
    }

    Provenance {
        branch: resolve_branch_with(provider, &lookup, runner),
        sha: resolve_sha_with(provider, &lookup, runner),
    }
}

/// Branch name: CI variable first, then the git fallback chain.
pub fn resolve_branch_with<F, R>(provider: Option<CiProvider>, lookup: F, runner: &R) -> String
where
    F: Fn(&str) -> Option<String>,
    R: CommandRunner,
{
    if let Some(branch) = provider.and_then(|p| p.branch_name(&lookup)) {
        debug!(%branch, "branch from CI environment");
        return branch;
    }
    first_success(&BRANCH_FALLBACKS, runner)
}

/// Commit sha: CI variable first, then the git fallback chain.
pub fn resolve_sha_with<F, R>(provider: Option<CiProvider>, lookup: F, runner: &R) -> String
where
    F: Fn(&str) -> Option<String>,
    R: CommandRunner,
{
    if let Some(sha) = provider.and_then(|p| p.commit_sha(&lookup)) {
        debug!(%sha, "commit sha from CI environment");
        return sha;
    }
    first_success(&SHA_FALLBACKS, runner)
}

/// Run each command in order until one exits zero with non-empty trimmed
/// stdout; later commands only run after the earlier ones fail.
fn first_success<R: CommandRunner>(commands: &[&str], runner: &R) -> String {
    for command in commands {
        match runner.run(command) {
            Ok(out) if out.succeeded() && !out.stdout.is_empty() => {
                debug!(%command, value = %out.stdout, "fallback command resolved");
                return out.stdout;
            }
            Ok(out) => {
                debug!(%command, exit_code = out.exit_code, "fallback command failed");
            }
            Err(err) => {
                debug!(%command, %err, "fallback command could not be spawned");
            }
        }
    }
    UNKNOWN.to_string()
}
