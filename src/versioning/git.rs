// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Mark Wells <contact@markwells.dev>

//! Version-control queries the version resolver depends on.
//!
//! [`VersionControl`] is the seam between resolution logic and the repository;
//! [`GitCli`] implements it by shelling out to `git` in the project directory.

use regex::Regex;
use std::fmt::Write;
use std::path::PathBuf;
use std::process::Command;
use std::sync::LazyLock;
use tracing::debug;

use crate::error::{Error, Result};

/// Tags that look like a version number: `1`, `v1.2`, `2.0.0-rc.1`, ...
#[allow(clippy::expect_used, reason = "Pattern is a literal")]
static VERSION_LIKE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^v?([0-9]+\.)*[0-9]+.*").expect("valid version tag pattern"));

/// Queries against the repository being built.
///
/// Implementations must be read-only except for the two fetch operations.
pub trait VersionControl {
    /// Whether the checkout has truncated history.
    ///
    /// # Errors
    ///
    /// Returns [`Error::VcsQuery`] if the repository cannot be queried.
    fn is_shallow_clone(&self) -> Result<bool>;

    /// Fetches the full history of a shallow clone.
    ///
    /// # Errors
    ///
    /// Returns [`Error::VcsQuery`] if the fetch fails.
    fn fetch_unshallow(&self) -> Result<()>;

    /// Plain fetch from the default remote.
    ///
    /// # Errors
    ///
    /// Returns [`Error::VcsQuery`] if the fetch fails.
    fn fetch_default(&self) -> Result<()>;

    /// Whether tracked files have uncommitted changes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::VcsQuery`] if the repository cannot be queried.
    fn is_working_tree_dirty(&self) -> Result<bool>;

    /// The working-tree diff, cut off after `max_lines` lines.
    ///
    /// # Errors
    ///
    /// Returns [`Error::VcsQuery`] if the diff cannot be produced.
    fn diff_summary(&self, max_lines: usize) -> Result<String>;

    /// The tag pointing at `HEAD`, if any. The first one wins when several do.
    ///
    /// # Errors
    ///
    /// Returns [`Error::VcsQuery`] if the repository cannot be queried.
    fn tag_at_head(&self) -> Result<Option<String>>;

    /// Number of version-looking tags reachable from `commit_ish`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::VcsQuery`] if the repository cannot be queried.
    fn count_version_like_tags_in_history(&self, commit_ish: &str) -> Result<usize>;

    /// `git describe --long --tags --always` for `commit_ish`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::VcsQuery`] if the repository cannot be queried.
    fn describe_long_always_tags(&self, commit_ish: &str) -> Result<String>;

    /// Number of commits reachable from `commit_ish`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::VcsQuery`] if the repository cannot be queried or the
    /// count is not a number.
    fn total_commit_count(&self, commit_ish: &str) -> Result<u64>;
}

impl<T: VersionControl + ?Sized> VersionControl for &T {
    fn is_shallow_clone(&self) -> Result<bool> {
        (**self).is_shallow_clone()
    }
    fn fetch_unshallow(&self) -> Result<()> {
        (**self).fetch_unshallow()
    }
    fn fetch_default(&self) -> Result<()> {
        (**self).fetch_default()
    }
    fn is_working_tree_dirty(&self) -> Result<bool> {
        (**self).is_working_tree_dirty()
    }
    fn diff_summary(&self, max_lines: usize) -> Result<String> {
        (**self).diff_summary(max_lines)
    }
    fn tag_at_head(&self) -> Result<Option<String>> {
        (**self).tag_at_head()
    }
    fn count_version_like_tags_in_history(&self, commit_ish: &str) -> Result<usize> {
        (**self).count_version_like_tags_in_history(commit_ish)
    }
    fn describe_long_always_tags(&self, commit_ish: &str) -> Result<String> {
        (**self).describe_long_always_tags(commit_ish)
    }
    fn total_commit_count(&self, commit_ish: &str) -> Result<u64> {
        (**self).total_commit_count(commit_ish)
    }
}

/// Whether a tag name looks like a version number.
#[must_use]
pub fn is_version_like_tag(tag: &str) -> bool {
    VERSION_LIKE_TAG.is_match(tag)
}

/// Cuts `text` after `max_lines` lines, noting how many were dropped.
#[must_use]
pub fn truncate_lines(text: &str, max_lines: usize) -> String {
    let total = text.lines().count();
    let mut kept = text.lines().take(max_lines).collect::<Vec<_>>().join("\n");
    if total > max_lines {
        let _ = write!(kept, "\n... ({} more lines)", total - max_lines);
    }
    kept
}

/// [`VersionControl`] backed by the `git` executable.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: String,
    repo: PathBuf,
}

impl GitCli {
    /// Runs `git` inside `repo`.
    #[must_use]
    pub fn new(repo: impl Into<PathBuf>) -> Self {
        Self {
            program: "git".to_string(),
            repo: repo.into(),
        }
    }

    /// Uses a different git executable.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Runs git with `args` and returns trimmed stdout.
    fn run(&self, args: &[&str]) -> Result<String> {
        let command = args.join(" ");
        debug!("git {command} (in {})", self.repo.display());

        let output = Command::new(&self.program)
            .arg("--no-pager")
            .args(args)
            .current_dir(&self.repo)
            .output()
            .map_err(|e| Error::VcsQuery {
                command: command.clone(),
                message: format!("failed to spawn {}: {e}", self.program),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(Error::VcsQuery {
                command,
                message: if stderr.is_empty() {
                    format!("exited with {}", output.status)
                } else {
                    stderr
                },
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl VersionControl for GitCli {
    fn is_shallow_clone(&self) -> Result<bool> {
        Ok(self.run(&["rev-parse", "--is-shallow-repository"])? == "true")
    }

    fn fetch_unshallow(&self) -> Result<()> {
        self.run(&["fetch", "--unshallow"]).map(drop)
    }

    fn fetch_default(&self) -> Result<()> {
        self.run(&["fetch"]).map(drop)
    }

    fn is_working_tree_dirty(&self) -> Result<bool> {
        let status = self.run(&["status", "--porcelain", "--untracked-files=no"])?;
        Ok(!status.is_empty())
    }

    fn diff_summary(&self, max_lines: usize) -> Result<String> {
        let diff = self.run(&["diff"])?;
        Ok(truncate_lines(&diff, max_lines))
    }

    fn tag_at_head(&self) -> Result<Option<String>> {
        let tags = self.run(&["tag", "--points-at", "HEAD"])?;
        Ok(tags
            .lines()
            .map(str::trim)
            .find(|t| !t.is_empty())
            .map(ToString::to_string))
    }

    fn count_version_like_tags_in_history(&self, commit_ish: &str) -> Result<usize> {
        let tags = self.run(&["tag", "--list", "--merged", commit_ish])?;
        Ok(tags.lines().filter(|t| is_version_like_tag(t.trim())).count())
    }

    fn describe_long_always_tags(&self, commit_ish: &str) -> Result<String> {
        self.run(&["describe", "--long", "--tags", "--always", commit_ish])
    }

    fn total_commit_count(&self, commit_ish: &str) -> Result<u64> {
        let count = self.run(&["rev-list", "--count", commit_ish])?;
        count.parse().map_err(|_| Error::VcsQuery {
            command: format!("rev-list --count {commit_ish}"),
            message: format!("expected a commit count, got \"{count}\""),
        })
    }
}
