// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Mark Wells <contact@markwells.dev>

//! Snapshot of the CI environment taken once at start-up.
//!
//! Resolvers receive this value instead of reading process variables, so the
//! same inputs always produce the same version and image.

use std::collections::HashMap;
use std::path::PathBuf;

/// Commit reference used when no triggering SHA is known.
const DEFAULT_COMMIT_ISH: &str = "HEAD";

/// Prefix GitHub puts in front of branch names in `GITHUB_REF`.
const BRANCH_REF_PREFIX: &str = "refs/heads/";

/// CI-provided values the build needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    /// SHA of the commit that triggered the workflow (`GITHUB_SHA`).
    pub sha: Option<String>,
    /// Full ref that triggered the workflow (`GITHUB_REF`).
    pub git_ref: Option<String>,
    /// Source branch of a pull request (`GITHUB_HEAD_REF`).
    pub head_ref: Option<String>,
    /// Checkout directory on the runner (`GITHUB_WORKSPACE`).
    pub workspace: Option<PathBuf>,
    /// File that step outputs are appended to (`GITHUB_OUTPUT`).
    pub output_file: Option<PathBuf>,
}

impl Environment {
    /// Captures the current process environment.
    #[must_use]
    pub fn capture() -> Self {
        Self::from_vars(std::env::vars())
    }

    /// Builds a snapshot from arbitrary key/value pairs. Empty values count as unset.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .filter(|(_, v)| !v.is_empty())
            .collect();

        Self {
            sha: vars.get("GITHUB_SHA").cloned(),
            git_ref: vars.get("GITHUB_REF").cloned(),
            head_ref: vars.get("GITHUB_HEAD_REF").cloned(),
            workspace: vars.get("GITHUB_WORKSPACE").map(PathBuf::from),
            output_file: vars.get("GITHUB_OUTPUT").map(PathBuf::from),
        }
    }

    /// The commit version queries run against: the triggering SHA in CI, `HEAD` locally.
    #[must_use]
    pub fn commit_ish(&self) -> &str {
        self.sha.as_deref().unwrap_or(DEFAULT_COMMIT_ISH)
    }

    /// Branch being built, if the CI told us.
    #[must_use]
    pub fn branch(&self) -> Option<&str> {
        self.head_ref.as_deref().or_else(|| {
            self.git_ref
                .as_deref()
                .map(|r| r.strip_prefix(BRANCH_REF_PREFIX).unwrap_or(r))
        })
    }
}
