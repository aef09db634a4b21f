// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Mark Wells <contact@markwells.dev>

//! Parsing of `git describe --long --tags` output.
//!
//! Three tag shapes are recognised, tried in order:
//!
//! | Shape              | Example describe string      |
//! |--------------------|------------------------------|
//! | dotted numbers     | `v1.2-4-gdeadbeef`           |
//! | with a suffix word | `v1.2-beta-4-gdeadbeef`      |
//! | suffix + sub-index | `v1.2-beta.3-4-gdeadbeef`    |

use regex::Regex;
use std::sync::LazyLock;

#[allow(clippy::expect_used, reason = "Patterns are literals")]
static DESCRIBE_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        r"^v?([0-9.]+)-([0-9]+)-g([A-Za-z0-9_]+)",
        r"^v?([0-9.]+-[A-Za-z0-9_]+)-([0-9]+)-g([A-Za-z0-9_]+)",
        r"^v?([0-9.]+-[A-Za-z0-9_]+\.[0-9]+)-([0-9]+)-g([A-Za-z0-9_]+)",
    ]
    .map(|pattern| Regex::new(pattern).expect("valid describe pattern"))
});

/// The pieces of a describe string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionDescriptor {
    /// Nearest tag, without a leading `v`.
    pub tag: String,
    /// Commits between the tag and the described commit.
    pub commits_since_tag: u64,
    /// Abbreviated commit hash (without the `g` marker).
    pub abbreviated_hash: String,
}

/// Outcome of parsing a describe string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescribeMatch {
    /// One of the known shapes matched.
    Matched(VersionDescriptor),
    /// None did; callers degrade instead of failing.
    Unmatched,
}

/// Parses `description` against each known shape, first match wins.
#[must_use]
pub fn parse(description: &str) -> DescribeMatch {
    DESCRIBE_PATTERNS
        .iter()
        .find_map(|pattern| {
            let captures = pattern.captures(description)?;
            Some(VersionDescriptor {
                tag: captures[1].to_string(),
                commits_since_tag: captures[2].parse().ok()?,
                abbreviated_hash: captures[3].to_string(),
            })
        })
        .map_or(DescribeMatch::Unmatched, DescribeMatch::Matched)
}

/// Folds the commit distance into the tag to get a `major.minor.patch` string.
///
/// The distance is appended as one more dotted component and the first three
/// components are kept. When the third one is not numeric (a one-component
/// tag such as `2`) the result degrades to `major.0.minor`.
#[must_use]
pub fn three_component_version(tag: &str, commits_since_tag: u64) -> String {
    let joined = format!("{tag}.{commits_since_tag}");
    let mut components = joined.split('.');
    let major = components.next().unwrap_or_default();
    let minor = components.next().unwrap_or_default();

    match components.next() {
        Some(patch) if !patch.is_empty() && patch.bytes().all(|b| b.is_ascii_digit()) => {
            format!("{major}.{minor}.{patch}")
        }
        _ => format!("{major}.0.{minor}"),
    }
}
