// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Mark Wells <contact@markwells.dev>

//! Error kinds raised while resolving a build.
//!
//! Every variant is fatal to the current build invocation. The binary reports
//! the message on a single line and exits non-zero.

use std::path::PathBuf;

use crate::platform::{BuilderPlatform, TargetPlatform};

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by version resolution, image selection and project inspection.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The working tree has uncommitted changes and dirty builds are not allowed.
    #[error(
        "Branch is dirty. Refusing to base semantic version on uncommitted changes \
         (pass --allow-dirty-build to override)"
    )]
    DirtyTree,

    /// The `Tag` strategy was selected but no tag points at the build commit.
    #[error("No tag points at the current commit; the Tag versioning strategy needs one")]
    NoTagFound,

    /// The strategy name matched none of the known strategies.
    #[error(
        "Versioning strategy \"{0}\" is not implemented. Expected one of: None, Custom, Semantic, Tag"
    )]
    UnknownStrategy(String),

    /// A version-control query could not be executed or returned unusable output.
    #[error("`git {command}` failed: {message}")]
    VcsQuery {
        /// The git arguments that were run.
        command: String,
        /// Captured stderr, or a description of what went wrong.
        message: String,
    },

    /// The engine version does not match `YYYY.M.xxx[x]` or `3`.
    #[error("Invalid engine version \"{0}\"")]
    InvalidEngineVersion(String),

    /// The target platform name is not one the engine knows about.
    #[error("Unsupported target platform \"{0}\"")]
    UnsupportedPlatform(String),

    /// The target platform cannot be built from this builder platform.
    #[error("{target} can only be built on a Windows builder (current builder: {builder})")]
    UnsupportedHostPlatform {
        /// Requested target.
        target: TargetPlatform,
        /// Builder the resolution ran for.
        builder: BuilderPlatform,
    },

    /// `ProjectSettings/ProjectVersion.txt` does not exist under the project path.
    #[error("Project settings file not found at \"{}\". Have you correctly set the project path?", .0.display())]
    ProjectSettingsNotFound(PathBuf),

    /// `ProjectVersion.txt` exists but carries no editor version.
    #[error("Failed to parse editor version from \"{0}\"")]
    ProjectVersionUnparseable(String),

    /// Unknown value for the Android export type.
    #[error(
        "Unknown Android export type \"{0}\". Expected one of: androidPackage, androidAppBundle, androidStudioProject"
    )]
    UnsupportedAndroidExportType(String),

    /// The derived Android version code would exceed what the store accepts.
    #[error(
        "Generated versionCode {0} is dangerously close to the maximum allowed number 2100000000. \
         Consider a different versioning scheme to be able to continue updating your application."
    )]
    AndroidVersionCodeTooLarge(u64),

    /// Filesystem access failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
