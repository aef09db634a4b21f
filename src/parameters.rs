// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Mark Wells <contact@markwells.dev>

//! Assembly of everything a build invocation needs.
//!
//! [`BuildParameters::resolve`] validates the raw inputs, resolves the build
//! version and image, and fills in defaults for output naming. Cheap checks run
//! before any repository query so a typo fails before a fetch.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::config::Config;
use crate::environment::Environment;
use crate::error::{Error, Result};
use crate::image::{ImageReferenceResolver, ImageSettings};
use crate::platform::{BuilderPlatform, TargetPlatform};
use crate::project;
use crate::versioning::{VersionControl, VersionResolver, VersioningStrategy, android};

/// Output format of an Android build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AndroidExportType {
    /// `.apk`
    #[default]
    AndroidPackage,
    /// `.aab`
    AndroidAppBundle,
    /// Exported Gradle project.
    AndroidStudioProject,
}

impl AndroidExportType {
    const fn as_str(self) -> &'static str {
        match self {
            Self::AndroidPackage => "androidPackage",
            Self::AndroidAppBundle => "androidAppBundle",
            Self::AndroidStudioProject => "androidStudioProject",
        }
    }
}

impl FromStr for AndroidExportType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "androidPackage" => Ok(Self::AndroidPackage),
            "androidAppBundle" => Ok(Self::AndroidAppBundle),
            "androidStudioProject" => Ok(Self::AndroidStudioProject),
            other => Err(Error::UnsupportedAndroidExportType(other.to_string())),
        }
    }
}

impl fmt::Display for AndroidExportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for AndroidExportType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// File name of the player the engine writes.
#[must_use]
pub fn build_file(name: &str, platform: TargetPlatform, export_type: AndroidExportType) -> String {
    if platform.is_windows() {
        return format!("{name}.exe");
    }
    if platform.is_android() {
        return match export_type {
            AndroidExportType::AndroidPackage => format!("{name}.apk"),
            AndroidExportType::AndroidAppBundle => format!("{name}.aab"),
            AndroidExportType::AndroidStudioProject => name.to_string(),
        };
    }
    name.to_string()
}

/// Unvalidated build inputs, as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct BuildInputs {
    /// Project directory, relative to the workspace.
    pub project_path: PathBuf,
    /// Target platform name.
    pub target_platform: String,
    /// Editor version or `auto`.
    pub unity_version: String,
    /// Versioning strategy name.
    pub versioning_strategy: String,
    /// Version for the `Custom` strategy.
    pub version: String,
    /// Build even with uncommitted changes.
    pub allow_dirty_build: bool,
    /// Image to use instead of the resolved one.
    pub custom_image: Option<String>,
    /// Builder OS name; the current machine when absent.
    pub builder_platform: Option<String>,
    /// Player name.
    pub build_name: Option<String>,
    /// Output directory.
    pub build_path: Option<PathBuf>,
    /// Static editor method that performs the build.
    pub build_method: Option<String>,
    /// Extra arguments for the editor.
    pub custom_parameters: Option<String>,
    /// Android export type name.
    pub android_export_type: Option<String>,
    /// Explicit Android version code.
    pub android_version_code: Option<String>,
    /// Android target SDK, e.g. `AndroidApiLevel31`.
    pub android_target_sdk_version: Option<String>,
}

/// Resolved parameters for one build.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildParameters {
    /// Project directory, relative to the workspace.
    pub project_path: PathBuf,
    /// Target platform.
    pub target_platform: TargetPlatform,
    /// OS the build runs on.
    pub builder_platform: BuilderPlatform,
    /// Editor version.
    pub engine_version: String,
    /// Strategy the version came from.
    pub versioning_strategy: VersioningStrategy,
    /// Version stamped on the artifacts.
    pub build_version: String,
    /// Android version code, for Android targets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub android_version_code: Option<String>,
    /// Android export type.
    pub android_export_type: AndroidExportType,
    /// `sdkmanager` packages to install.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub android_sdk_manager_parameters: Option<String>,
    /// Player name.
    pub build_name: String,
    /// Output directory.
    pub build_path: PathBuf,
    /// Player file name.
    pub build_file: String,
    /// Static editor method that performs the build.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_method: Option<String>,
    /// Extra arguments for the editor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_parameters: Option<String>,
    /// Container image reference.
    pub image: String,
}

impl BuildParameters {
    /// Validates `inputs` and resolves version and image.
    ///
    /// `vcs` must be bound to the repository containing the project.
    ///
    /// # Errors
    ///
    /// Any of the validation, image or versioning errors in [`Error`].
    pub fn resolve<V: VersionControl>(
        inputs: &BuildInputs,
        config: &Config,
        environment: &Environment,
        vcs: V,
    ) -> Result<Self> {
        let target_platform: TargetPlatform = inputs.target_platform.parse()?;
        let builder_platform = inputs
            .builder_platform
            .as_deref()
            .map(BuilderPlatform::from_str)
            .transpose()?
            .unwrap_or_else(BuilderPlatform::current);
        let versioning_strategy: VersioningStrategy = inputs.versioning_strategy.parse()?;
        let android_export_type = inputs
            .android_export_type
            .as_deref()
            .map(AndroidExportType::from_str)
            .transpose()?
            .unwrap_or_default();

        let engine_version =
            project::detect_engine_version(&inputs.project_path, &inputs.unity_version)?;
        let image = ImageReferenceResolver::new(ImageSettings::from(&config.image)).resolve(
            &engine_version,
            target_platform,
            builder_platform,
            inputs.custom_image.as_deref(),
        )?;

        let build_version = VersionResolver::new(vcs, environment.clone())
            .with_max_diff_lines(config.versioning.max_diff_lines)
            .resolve(versioning_strategy, &inputs.version, inputs.allow_dirty_build)?;

        let android_version_code = if target_platform.is_android() {
            Some(android::version_code(
                &build_version,
                inputs.android_version_code.as_deref(),
            )?)
        } else {
            None
        };
        let android_sdk_manager_parameters = inputs
            .android_target_sdk_version
            .as_deref()
            .map(android::sdk_manager_parameters)
            .filter(|params| !params.is_empty());

        let build_name = inputs
            .build_name
            .clone()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| target_platform.to_string());
        let build_path = inputs
            .build_path
            .clone()
            .unwrap_or_else(|| Path::new("build").join(target_platform.as_str()));
        let build_file = build_file(&build_name, target_platform, android_export_type);

        Ok(Self {
            project_path: inputs.project_path.clone(),
            target_platform,
            builder_platform,
            engine_version,
            versioning_strategy,
            build_version,
            android_version_code,
            android_export_type,
            android_sdk_manager_parameters,
            build_name,
            build_path,
            build_file,
            build_method: inputs.build_method.clone().filter(|m| !m.is_empty()),
            custom_parameters: inputs.custom_parameters.clone().filter(|p| !p.is_empty()),
            image,
        })
    }
}
