// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Mark Wells <contact@markwells.dev>

//! Build version resolution.
//!
//! A [`VersionResolver`] turns a [`VersioningStrategy`] into the single version
//! string stamped on the build artifacts:
//!
//! - `None` yields `none`.
//! - `Custom` yields the version given on the command line.
//! - `Tag` yields the tag on the build commit, minus a leading `v`.
//! - `Semantic` derives `major.minor.patch` from the nearest version tag and
//!   the number of commits since it, or `0.0.<commits>` without one.

pub mod android;
pub mod describe;
pub mod git;

pub use describe::{DescribeMatch, VersionDescriptor};
pub use git::{GitCli, VersionControl};

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::environment::Environment;
use crate::error::{Error, Result};

/// Default number of diff lines shown when refusing a dirty build.
pub const DEFAULT_MAX_DIFF_LINES: usize = 60;

/// Version string used when versioning is disabled.
pub const NO_VERSION: &str = "none";

/// How the build version is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VersioningStrategy {
    /// No versioning; the version is `none`.
    None,
    /// Use the version passed in verbatim.
    Custom,
    /// Derive from version tags and commit distance.
    Semantic,
    /// Use the tag on the build commit.
    Tag,
}

impl VersioningStrategy {
    const fn as_str(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Custom => "Custom",
            Self::Semantic => "Semantic",
            Self::Tag => "Tag",
        }
    }
}

impl FromStr for VersioningStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "None" => Ok(Self::None),
            "Custom" => Ok(Self::Custom),
            "Semantic" => Ok(Self::Semantic),
            "Tag" => Ok(Self::Tag),
            other => Err(Error::UnknownStrategy(other.to_string())),
        }
    }
}

impl fmt::Display for VersioningStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolves the build version against a repository.
pub struct VersionResolver<V> {
    vcs: V,
    environment: Environment,
    max_diff_lines: usize,
}

impl<V: VersionControl> VersionResolver<V> {
    /// Creates a resolver querying `vcs`, with CI context from `environment`.
    pub fn new(vcs: V, environment: Environment) -> Self {
        Self {
            vcs,
            environment,
            max_diff_lines: DEFAULT_MAX_DIFF_LINES,
        }
    }

    /// Caps how much of the diff is logged for a dirty tree.
    #[must_use]
    pub fn with_max_diff_lines(mut self, max_diff_lines: usize) -> Self {
        self.max_diff_lines = max_diff_lines;
        self
    }

    /// Produces the build version for `strategy`.
    ///
    /// `explicit_version` is only read by [`VersioningStrategy::Custom`] and
    /// `allow_dirty_build` only by [`VersioningStrategy::Semantic`].
    ///
    /// # Errors
    ///
    /// - [`Error::NoTagFound`] for `Tag` when the build commit has no tag.
    /// - [`Error::DirtyTree`] for `Semantic` on a dirty tree unless allowed.
    /// - [`Error::VcsQuery`] when the repository cannot be queried.
    pub fn resolve(
        &self,
        strategy: VersioningStrategy,
        explicit_version: &str,
        allow_dirty_build: bool,
    ) -> Result<String> {
        debug!("Resolving build version with strategy {strategy}");
        let version = match strategy {
            VersioningStrategy::None => NO_VERSION.to_string(),
            VersioningStrategy::Custom => explicit_version.to_string(),
            VersioningStrategy::Tag => self.tag_version()?,
            VersioningStrategy::Semantic => self.semantic_version(allow_dirty_build)?,
        };
        info!("Build version: {version}");
        Ok(version)
    }

    fn tag_version(&self) -> Result<String> {
        let tag = self.vcs.tag_at_head()?.ok_or(Error::NoTagFound)?;
        Ok(tag.strip_prefix('v').unwrap_or(&tag).to_string())
    }

    fn semantic_version(&self, allow_dirty_build: bool) -> Result<String> {
        if self.vcs.is_shallow_clone()? {
            self.deepen_history()?;
        }

        if self.vcs.is_working_tree_dirty()? {
            let diff = self.vcs.diff_summary(self.max_diff_lines)?;
            warn!("Uncommitted changes in the working tree:\n{diff}");
            if !allow_dirty_build {
                return Err(Error::DirtyTree);
            }
            warn!("Dirty builds are allowed, continuing with uncommitted changes");
        }

        let commit_ish = self.environment.commit_ish();
        if self.vcs.count_version_like_tags_in_history(commit_ish)? == 0 {
            let version = self.commit_count_version()?;
            info!("Generated version {version} (no version tags found)");
            return Ok(version);
        }

        let description = self.vcs.describe_long_always_tags(commit_ish)?;
        match describe::parse(&description) {
            DescribeMatch::Matched(descriptor) => {
                let version = describe::three_component_version(
                    &descriptor.tag,
                    descriptor.commits_since_tag,
                );
                info!(
                    "Found semantic version {version} for {}@{}",
                    self.environment.branch().unwrap_or(commit_ish),
                    descriptor.abbreviated_hash
                );
                Ok(version)
            }
            DescribeMatch::Unmatched => {
                warn!("Failed to parse git describe output \"{description}\"");
                let version = self.commit_count_version()?;
                info!("Generated version {version} (semantic version couldn't be determined)");
                Ok(version)
            }
        }
    }

    /// Fetches the full history of a shallow clone.
    ///
    /// Commit counts on a truncated history are wrong, so a clone that is
    /// still shallow afterwards is an error.
    fn deepen_history(&self) -> Result<()> {
        debug!("Shallow clone detected, fetching full history");
        if let Err(err) = self.vcs.fetch_unshallow() {
            warn!("fetch --unshallow did not work, falling back to regular fetch: {err}");
            self.vcs.fetch_default()?;
        }

        if self.vcs.is_shallow_clone()? {
            return Err(Error::VcsQuery {
                command: "fetch --unshallow".to_string(),
                message: "history is still shallow after fetching, \
                          commit counts would be wrong"
                    .to_string(),
            });
        }
        Ok(())
    }

    fn commit_count_version(&self) -> Result<String> {
        let commits = self
            .vcs
            .total_commit_count(self.environment.commit_ish())?;
        Ok(format!("0.0.{commits}"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    /// Scripted repository state.
    #[derive(Default)]
    struct FakeRepo {
        shallow: Cell<bool>,
        unshallow_fails: bool,
        fetch_fails: bool,
        /// Whether a plain fetch completes the history.
        fetch_deepens: bool,
        dirty: bool,
        tag: Option<String>,
        version_tags: usize,
        description: String,
        commits: u64,
        calls: RefCell<Vec<String>>,
    }

    impl FakeRepo {
        fn record(&self, call: impl Into<String>) {
            self.calls.borrow_mut().push(call.into());
        }

        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }
    }

    fn query_error(command: &str) -> Error {
        Error::VcsQuery {
            command: command.to_string(),
            message: "scripted failure".to_string(),
        }
    }

    impl VersionControl for FakeRepo {
        fn is_shallow_clone(&self) -> Result<bool> {
            self.record("is_shallow");
            Ok(self.shallow.get())
        }
        fn fetch_unshallow(&self) -> Result<()> {
            self.record("fetch_unshallow");
            if self.unshallow_fails {
                Err(query_error("fetch --unshallow"))
            } else {
                self.shallow.set(false);
                Ok(())
            }
        }
        fn fetch_default(&self) -> Result<()> {
            self.record("fetch");
            if self.fetch_fails {
                Err(query_error("fetch"))
            } else {
                if self.fetch_deepens {
                    self.shallow.set(false);
                }
                Ok(())
            }
        }
        fn is_working_tree_dirty(&self) -> Result<bool> {
            self.record("is_dirty");
            Ok(self.dirty)
        }
        fn diff_summary(&self, max_lines: usize) -> Result<String> {
            self.record(format!("diff:{max_lines}"));
            Ok("+ changed line".to_string())
        }
        fn tag_at_head(&self) -> Result<Option<String>> {
            self.record("tag_at_head");
            Ok(self.tag.clone())
        }
        fn count_version_like_tags_in_history(&self, commit_ish: &str) -> Result<usize> {
            self.record(format!("count_tags:{commit_ish}"));
            Ok(self.version_tags)
        }
        fn describe_long_always_tags(&self, commit_ish: &str) -> Result<String> {
            self.record(format!("describe:{commit_ish}"));
            Ok(self.description.clone())
        }
        fn total_commit_count(&self, commit_ish: &str) -> Result<u64> {
            self.record(format!("count_commits:{commit_ish}"));
            Ok(self.commits)
        }
    }

    /// Fails every query.
    struct BrokenRepo;

    impl VersionControl for BrokenRepo {
        fn is_shallow_clone(&self) -> Result<bool> {
            Err(query_error("rev-parse --is-shallow-repository"))
        }
        fn fetch_unshallow(&self) -> Result<()> {
            Err(query_error("fetch --unshallow"))
        }
        fn fetch_default(&self) -> Result<()> {
            Err(query_error("fetch"))
        }
        fn is_working_tree_dirty(&self) -> Result<bool> {
            Err(query_error("status"))
        }
        fn diff_summary(&self, _: usize) -> Result<String> {
            Err(query_error("diff"))
        }
        fn tag_at_head(&self) -> Result<Option<String>> {
            Err(query_error("tag --points-at HEAD"))
        }
        fn count_version_like_tags_in_history(&self, _: &str) -> Result<usize> {
            Err(query_error("tag --list"))
        }
        fn describe_long_always_tags(&self, _: &str) -> Result<String> {
            Err(query_error("describe"))
        }
        fn total_commit_count(&self, _: &str) -> Result<u64> {
            Err(query_error("rev-list --count"))
        }
    }

    fn resolve(repo: &FakeRepo, strategy: VersioningStrategy) -> Result<String> {
        VersionResolver::new(repo, Environment::default()).resolve(strategy, "", false)
    }

    #[test]
    fn test_strategy_names() {
        for name in ["None", "Custom", "Semantic", "Tag"] {
            assert_eq!(name.parse::<VersioningStrategy>().unwrap().to_string(), name);
        }
        assert!(matches!(
            "Calendar".parse::<VersioningStrategy>(),
            Err(Error::UnknownStrategy(name)) if name == "Calendar"
        ));
    }

    #[test]
    fn test_none_ignores_everything_else() {
        let repo = FakeRepo::default();
        let resolver = VersionResolver::new(&repo, Environment::default());
        assert_eq!(resolver.resolve(VersioningStrategy::None, "9.9.9", true).unwrap(), "none");
        assert!(repo.calls().is_empty());
    }

    #[test]
    fn test_custom_is_verbatim() {
        let repo = FakeRepo::default();
        let resolver = VersionResolver::new(&repo, Environment::default());
        for input in ["1.2.3", "", "not a version", "v1"] {
            assert_eq!(resolver.resolve(VersioningStrategy::Custom, input, false).unwrap(), input);
        }
        assert!(repo.calls().is_empty());
    }

    #[test]
    fn test_tag_strips_single_v() {
        let mut repo = FakeRepo {
            tag: Some("v1.2.3".to_string()),
            ..FakeRepo::default()
        };
        assert_eq!(resolve(&repo, VersioningStrategy::Tag).unwrap(), "1.2.3");

        repo.tag = Some("1.2.3".to_string());
        assert_eq!(resolve(&repo, VersioningStrategy::Tag).unwrap(), "1.2.3");

        repo.tag = Some("vv2".to_string());
        assert_eq!(resolve(&repo, VersioningStrategy::Tag).unwrap(), "v2");
    }

    #[test]
    fn test_tag_missing_is_an_error() {
        let repo = FakeRepo::default();
        assert!(matches!(
            resolve(&repo, VersioningStrategy::Tag),
            Err(Error::NoTagFound)
        ));
    }

    #[test]
    fn test_semantic_refuses_dirty_tree() {
        let repo = FakeRepo {
            dirty: true,
            commits: 3,
            ..FakeRepo::default()
        };
        assert!(matches!(
            resolve(&repo, VersioningStrategy::Semantic),
            Err(Error::DirtyTree)
        ));
        assert!(repo.calls().contains(&"diff:60".to_string()));
    }

    #[test]
    fn test_semantic_allows_dirty_tree_when_asked() {
        let repo = FakeRepo {
            dirty: true,
            commits: 3,
            ..FakeRepo::default()
        };
        let resolver = VersionResolver::new(&repo, Environment::default()).with_max_diff_lines(5);
        assert_eq!(
            resolver.resolve(VersioningStrategy::Semantic, "", true).unwrap(),
            "0.0.3"
        );
        assert!(repo.calls().contains(&"diff:5".to_string()));
    }

    #[test]
    fn test_semantic_without_version_tags_counts_commits() {
        let repo = FakeRepo {
            commits: 7,
            ..FakeRepo::default()
        };
        assert_eq!(resolve(&repo, VersioningStrategy::Semantic).unwrap(), "0.0.7");
        assert!(!repo.calls().iter().any(|c| c.starts_with("describe")));
    }

    #[test]
    fn test_semantic_from_describe() {
        let repo = FakeRepo {
            version_tags: 1,
            description: "v0.1-2-g12345678".to_string(),
            ..FakeRepo::default()
        };
        assert_eq!(resolve(&repo, VersioningStrategy::Semantic).unwrap(), "0.1.2");
    }

    #[test]
    fn test_semantic_unparseable_describe_degrades() {
        let repo = FakeRepo {
            version_tags: 2,
            description: "abc1234".to_string(),
            commits: 11,
            ..FakeRepo::default()
        };
        assert_eq!(resolve(&repo, VersioningStrategy::Semantic).unwrap(), "0.0.11");
    }

    #[test]
    fn test_semantic_queries_the_triggering_commit() {
        let repo = FakeRepo {
            version_tags: 1,
            description: "v1.4-0-gfeedbee".to_string(),
            ..FakeRepo::default()
        };
        let environment = Environment::from_vars([("GITHUB_SHA", "feedbee123")]);
        let resolver = VersionResolver::new(&repo, environment);
        assert_eq!(
            resolver.resolve(VersioningStrategy::Semantic, "", false).unwrap(),
            "1.4.0"
        );
        let calls = repo.calls();
        assert!(calls.contains(&"count_tags:feedbee123".to_string()));
        assert!(calls.contains(&"describe:feedbee123".to_string()));
    }

    #[test]
    fn test_shallow_clone_is_unshallowed() {
        let repo = FakeRepo {
            shallow: Cell::new(true),
            commits: 9,
            ..FakeRepo::default()
        };
        assert_eq!(resolve(&repo, VersioningStrategy::Semantic).unwrap(), "0.0.9");
        assert!(!repo.calls().contains(&"fetch".to_string()));
    }

    #[test]
    fn test_shallow_clone_is_deepened_with_fallback() {
        let repo = FakeRepo {
            shallow: Cell::new(true),
            unshallow_fails: true,
            fetch_deepens: true,
            commits: 1,
            ..FakeRepo::default()
        };
        assert_eq!(resolve(&repo, VersioningStrategy::Semantic).unwrap(), "0.0.1");
        let calls = repo.calls();
        let unshallow = calls.iter().position(|c| c == "fetch_unshallow").unwrap();
        let fetch = calls.iter().position(|c| c == "fetch").unwrap();
        assert!(unshallow < fetch);
    }

    #[test]
    fn test_shallow_clone_fetch_failure_is_fatal() {
        let repo = FakeRepo {
            shallow: Cell::new(true),
            unshallow_fails: true,
            fetch_fails: true,
            commits: 4,
            ..FakeRepo::default()
        };
        let err = resolve(&repo, VersioningStrategy::Semantic).unwrap_err();
        assert!(matches!(err, Error::VcsQuery { ref command, .. } if command == "fetch"));
        assert!(!repo.calls().iter().any(|c| c.starts_with("count_")));
    }

    #[test]
    fn test_still_shallow_after_fetch_is_fatal() {
        let repo = FakeRepo {
            shallow: Cell::new(true),
            unshallow_fails: true,
            commits: 4,
            ..FakeRepo::default()
        };
        assert!(matches!(
            resolve(&repo, VersioningStrategy::Semantic),
            Err(Error::VcsQuery { .. })
        ));
        assert!(!repo.calls().iter().any(|c| c.starts_with("count_")));
    }

    #[test]
    fn test_full_clone_is_not_fetched() {
        let repo = FakeRepo {
            commits: 2,
            ..FakeRepo::default()
        };
        let _ = resolve(&repo, VersioningStrategy::Semantic).unwrap();
        assert!(!repo.calls().iter().any(|c| c.starts_with("fetch")));
    }

    #[test]
    fn test_query_failures_propagate() {
        let resolver = VersionResolver::new(BrokenRepo, Environment::default());
        assert!(matches!(
            resolver.resolve(VersioningStrategy::Semantic, "", true),
            Err(Error::VcsQuery { .. })
        ));
        assert!(matches!(
            resolver.resolve(VersioningStrategy::Tag, "", true),
            Err(Error::VcsQuery { .. })
        ));
    }

    #[test]
    fn test_resolution_is_repeatable() {
        let repo = FakeRepo {
            version_tags: 1,
            description: "v3.1-9-gabcdef1".to_string(),
            ..FakeRepo::default()
        };
        let first = resolve(&repo, VersioningStrategy::Semantic).unwrap();
        let second = resolve(&repo, VersioningStrategy::Semantic).unwrap();
        assert_eq!(first, "3.1.9");
        assert_eq!(first, second);
    }
}
