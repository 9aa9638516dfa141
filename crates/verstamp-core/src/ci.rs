//! CI platform detection via characteristic environment variables.
//!
//! Each supported platform is identified by three environment-variable
//! names: one whose presence marks the platform, one holding the branch
//! name, and one holding the commit sha. The variable names are an external
//! contract with each platform and must match its documented variables
//! verbatim.

use serde::{Deserialize, Serialize};

/// A supported CI platform.
///
/// Detection scans [`CiProvider::ALL`] in declaration order and the first
/// match wins, so the variant order here is load-bearing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CiProvider {
    GithubActions,
    GitlabCi,
    Jenkins,
    CircleCi,
    BitbucketPipelines,
    TravisCi,
    AzurePipelines,
    Bamboo,
    TeamCity,
    Bitrise,
}

impl CiProvider {
    /// Every known provider, in detection priority order.
    pub const ALL: [CiProvider; 10] = [
        CiProvider::GithubActions,
        CiProvider::GitlabCi,
        CiProvider::Jenkins,
        CiProvider::CircleCi,
        CiProvider::BitbucketPipelines,
        CiProvider::TravisCi,
        CiProvider::AzurePipelines,
        CiProvider::Bamboo,
        CiProvider::TeamCity,
        CiProvider::Bitrise,
    ];

    /// Environment variable whose presence identifies this platform.
    pub fn detection_var(&self) -> &'static str {
        match self {
            CiProvider::GithubActions => "GITHUB_ACTIONS",
            CiProvider::GitlabCi => "GITLAB_CI",
            CiProvider::Jenkins => "JENKINS_URL",
            CiProvider::CircleCi => "CIRCLECI",
            CiProvider::BitbucketPipelines => "BITBUCKET_COMMIT",
            CiProvider::TravisCi => "TRAVIS",
            CiProvider::AzurePipelines => "TF_BUILD",
            CiProvider::Bamboo => "bamboo_planKey",
            CiProvider::TeamCity => "TEAMCITY_VERSION",
            CiProvider::Bitrise => "BITRISE_IO",
        }
    }

    /// Environment variable holding the git branch name on this platform.
    pub fn branch_var(&self) -> &'static str {
        match self {
            CiProvider::GithubActions => "GITHUB_REF_NAME",
            CiProvider::GitlabCi => "CI_COMMIT_REF_NAME",
            CiProvider::Jenkins => "GIT_BRANCH",
            CiProvider::CircleCi => "CIRCLE_BRANCH",
            CiProvider::BitbucketPipelines => "BITBUCKET_BRANCH",
            CiProvider::TravisCi => "TRAVIS_BRANCH",
            CiProvider::AzurePipelines => "BUILD_SOURCEBRANCHNAME",
            CiProvider::Bamboo => "bamboo_repository_branch_name",
            CiProvider::TeamCity => "env.BRANCH_NAME",
            CiProvider::Bitrise => "BITRISE_GIT_BRANCH",
        }
    }

    /// Environment variable holding the git commit sha on this platform.
    pub fn sha_var(&self) -> &'static str {
        match self {
            CiProvider::GithubActions => "GITHUB_SHA",
            CiProvider::GitlabCi => "CI_COMMIT_SHA",
            CiProvider::Jenkins => "GIT_COMMIT",
            CiProvider::CircleCi => "CIRCLE_SHA1",
            CiProvider::BitbucketPipelines => "BITBUCKET_COMMIT",
            CiProvider::TravisCi => "TRAVIS_COMMIT",
            CiProvider::AzurePipelines => "BUILD_SOURCEVERSION",
            CiProvider::Bamboo => "bamboo_planRepository_revision",
            CiProvider::TeamCity => "build.vcs.number",
            CiProvider::Bitrise => "BITRISE_GIT_COMMIT",
        }
    }

    /// Detect the current platform through a variable lookup (pass
    /// `|name| std::env::var(name).ok()` for the process environment).
    ///
    /// The first provider in [`CiProvider::ALL`] whose detection variable
    /// is present wins; returns `None` when no provider matches.
    pub fn detect<F>(lookup: F) -> Option<CiProvider>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::ALL
            .iter()
            .copied()
            .find(|p| lookup(p.detection_var()).is_some())
    }

    /// Branch name this platform reports through the lookup, if set.
    pub fn branch_name<F>(&self, lookup: F) -> Option<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        lookup(self.branch_var())
    }

    /// Commit sha this platform reports through the lookup, if set.
    pub fn commit_sha<F>(&self, lookup: F) -> Option<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        lookup(self.sha_var())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn detect_returns_none_for_empty_environment() {
        let env = env_of(&[]);
        assert_eq!(CiProvider::detect(|k| env.get(k).cloned()), None);
    }

    #[test]
    fn detect_finds_each_provider_by_its_detection_var() {
        for provider in CiProvider::ALL {
            let env = env_of(&[(provider.detection_var(), "1")]);
            assert_eq!(
                CiProvider::detect(|k| env.get(k).cloned()),
                Some(provider),
                "expected {provider:?} from {}",
                provider.detection_var()
            );
        }
    }

    #[test]
    fn detect_prefers_earlier_declaration_when_two_match() {
        // GitLab CI is declared before CircleCI.
        let env = env_of(&[("CIRCLECI", "true"), ("GITLAB_CI", "true")]);
        assert_eq!(
            CiProvider::detect(|k| env.get(k).cloned()),
            Some(CiProvider::GitlabCi)
        );
    }

    #[test]
    fn branch_and_sha_reads_propagate_absence() {
        // Detection var set, branch var missing, sha var set.
        let env = env_of(&[("GITHUB_ACTIONS", "true"), ("GITHUB_SHA", "abc123")]);
        let provider = CiProvider::detect(|k| env.get(k).cloned()).unwrap();
        assert_eq!(provider.branch_name(|k| env.get(k).cloned()), None);
        assert_eq!(
            provider.commit_sha(|k| env.get(k).cloned()),
            Some("abc123".to_string())
        );
    }

    #[test]
    fn bitbucket_detection_and_sha_share_a_variable() {
        let env = env_of(&[("BITBUCKET_COMMIT", "deadbeef")]);
        let provider = CiProvider::detect(|k| env.get(k).cloned()).unwrap();
        assert_eq!(provider, CiProvider::BitbucketPipelines);
        assert_eq!(
            provider.commit_sha(|k| env.get(k).cloned()),
            Some("deadbeef".to_string())
        );
    }
}
