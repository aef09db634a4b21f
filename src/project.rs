// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Mark Wells <contact@markwells.dev>

//! Engine version detection from the project on disk.

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::info;

use crate::error::{Error, Result};

/// Value that asks for the version to be read from the project.
pub const AUTO_DETECT: &str = "auto";

#[allow(clippy::expect_used, reason = "Pattern is a literal")]
static EDITOR_VERSION_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"m_EditorVersion: ([0-9]+\.[0-9]+\.[0-9]+[A-Za-z]?[0-9]+)").expect("valid editor version pattern")
});

/// Location of the file recording which editor last saved the project.
#[must_use]
pub fn project_version_file(project_path: &Path) -> PathBuf {
    project_path.join("ProjectSettings").join("ProjectVersion.txt")
}

/// The editor version to build with.
///
/// Anything but `auto` is taken as is; `auto` reads the project's
/// `ProjectVersion.txt`.
///
/// # Errors
///
/// - [`Error::ProjectSettingsNotFound`] if `auto` was requested and the file is missing.
/// - [`Error::ProjectVersionUnparseable`] if the file has no editor version.
/// - [`Error::Io`] if the file cannot be read.
pub fn detect_engine_version(project_path: &Path, requested: &str) -> Result<String> {
    if requested != AUTO_DETECT {
        return Ok(requested.to_string());
    }

    let path = project_version_file(project_path);
    if !path.exists() {
        return Err(Error::ProjectSettingsNotFound(path));
    }

    let version = parse_project_version(&std::fs::read_to_string(&path)?)?;
    info!("Detected editor version {version} from {}", path.display());
    Ok(version)
}

/// Extracts `m_EditorVersion` from the contents of `ProjectVersion.txt`.
///
/// # Errors
///
/// Returns [`Error::ProjectVersionUnparseable`] if no version line is present.
pub fn parse_project_version(contents: &str) -> Result<String> {
    EDITOR_VERSION_LINE
        .captures(contents)
        .map(|captures| captures[1].to_string())
        .ok_or_else(|| Error::ProjectVersionUnparseable(contents.trim().to_string()))
}
