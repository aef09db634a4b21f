// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Mark Wells <contact@markwells.dev>

//! Editor container image selection.
//!
//! Images are published as `unityci/editor:<prefix>-<editor>-<suffix>-<rolling>`,
//! e.g. `unityci/editor:ubuntu-2019.2.11f1-webgl-1`. The prefix names the
//! builder OS, the suffix the player module installed in the image, and the
//! rolling number is bumped by the publisher for non-breaking image updates.

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::error::{Error, Result};
use crate::platform::{BuilderPlatform, TargetPlatform};

#[allow(clippy::expect_used, reason = "Pattern is a literal")]
static ENGINE_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(20[0-9]{2}\.[0-9]\.[A-Za-z0-9_]{3,4}|3)$").expect("valid engine version pattern")
});

/// Default image repository.
pub const DEFAULT_REPOSITORY: &str = "unityci";

/// Default image name.
pub const DEFAULT_NAME: &str = "editor";

/// Default rolling image revision.
pub const DEFAULT_ROLLING_VERSION: u32 = 1;

/// A validated editor version such as `2019.2.11f1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineVersion {
    raw: String,
    major: u32,
    minor: u32,
}

impl EngineVersion {
    /// The version as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Year component (`3` for the legacy major-only form).
    #[must_use]
    pub const fn major(&self) -> u32 {
        self.major
    }

    /// Minor component, `0` when absent.
    #[must_use]
    pub const fn minor(&self) -> u32 {
        self.minor
    }

    /// Whether this editor ships the il2cpp-based desktop images (2019.3 and later).
    #[must_use]
    pub const fn uses_il2cpp_images(&self) -> bool {
        self.major >= 2020 || (self.major == 2019 && self.minor >= 3)
    }
}

impl FromStr for EngineVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if !ENGINE_VERSION.is_match(s) {
            return Err(Error::InvalidEngineVersion(s.to_string()));
        }

        let mut components = s.split('.').map(|c| c.parse::<u32>().unwrap_or(0));
        Ok(Self {
            raw: s.to_string(),
            major: components.next().unwrap_or(0),
            minor: components.next().unwrap_or(0),
        })
    }
}

impl fmt::Display for EngineVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Where images are pulled from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSettings {
    /// Registry namespace, e.g. `unityci`.
    pub repository: String,
    /// Image name, e.g. `editor`.
    pub name: String,
    /// Rolling image revision.
    pub rolling_version: u32,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            repository: DEFAULT_REPOSITORY.to_string(),
            name: DEFAULT_NAME.to_string(),
            rolling_version: DEFAULT_ROLLING_VERSION,
        }
    }
}

/// A fully resolved editor image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageReference {
    /// Registry namespace.
    pub repository: String,
    /// Image name.
    pub name: String,
    /// Editor version.
    pub editor_version: String,
    /// Player module suffix; empty for the generic image.
    pub builder_platform_suffix: String,
    /// Builder OS prefix; empty on macOS.
    pub host_platform_prefix: String,
    /// Rolling image revision.
    pub rolling_version: u32,
}

impl ImageReference {
    /// Tag part, with empty segments left out.
    #[must_use]
    pub fn tag(&self) -> String {
        let rolling = self.rolling_version.to_string();
        [
            self.host_platform_prefix.as_str(),
            self.editor_version.as_str(),
            self.builder_platform_suffix.as_str(),
            rolling.as_str(),
        ]
        .into_iter()
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("-")
    }

    /// `repository/name`, or just `name` without a repository.
    #[must_use]
    pub fn image(&self) -> String {
        if self.repository.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", self.repository.trim_end_matches('/'), self.name)
        }
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.image(), self.tag())
    }
}

/// Image suffix for `target`, enforcing builder restrictions.
///
/// # Errors
///
/// Returns [`Error::UnsupportedHostPlatform`] when the target's image only runs
/// on Windows builders and `builder` is not one.
pub fn platform_suffix(
    target: TargetPlatform,
    version: &EngineVersion,
    builder: BuilderPlatform,
) -> Result<&'static str> {
    let windows_only = |suffix: &'static str| {
        if builder.is_windows() {
            Ok(suffix)
        } else {
            Err(Error::UnsupportedHostPlatform { target, builder })
        }
    };

    match target {
        TargetPlatform::StandaloneOsx => Ok("mac-mono"),
        TargetPlatform::StandaloneWindows | TargetPlatform::StandaloneWindows64 => {
            if version.uses_il2cpp_images() {
                windows_only("windows-il2cpp")
            } else {
                Ok("windows-mono")
            }
        }
        TargetPlatform::StandaloneLinux64 => {
            if version.uses_il2cpp_images() {
                Ok("linux-il2cpp")
            } else {
                Ok("base")
            }
        }
        TargetPlatform::Android => Ok("android"),
        TargetPlatform::Ios => Ok("ios"),
        TargetPlatform::WebGl => Ok("webgl"),
        TargetPlatform::WsaPlayer => windows_only("universal-windows-platform"),
        TargetPlatform::TvOs => windows_only("appletv"),
        TargetPlatform::Facebook => Ok("facebook"),
        // No dedicated images; the Windows mono image is the closest match.
        TargetPlatform::Ps4
        | TargetPlatform::XboxOne
        | TargetPlatform::Switch
        | TargetPlatform::Lumin
        | TargetPlatform::Bjm
        | TargetPlatform::Stadia => Ok("windows-mono"),
        TargetPlatform::NoTarget | TargetPlatform::Test => Ok(""),
    }
}

/// Picks the container image a build runs in.
#[derive(Debug, Clone, Default)]
pub struct ImageReferenceResolver {
    settings: ImageSettings,
}

impl ImageReferenceResolver {
    /// Creates a resolver publishing from `settings`.
    #[must_use]
    pub const fn new(settings: ImageSettings) -> Self {
        Self { settings }
    }

    /// The image reference string for a build.
    ///
    /// A non-empty `custom_image` is returned as is, without looking at the
    /// other inputs.
    ///
    /// # Errors
    ///
    /// See [`Self::reference`].
    pub fn resolve(
        &self,
        engine_version: &str,
        target: TargetPlatform,
        builder: BuilderPlatform,
        custom_image: Option<&str>,
    ) -> Result<String> {
        if let Some(image) = custom_image.filter(|image| !image.is_empty()) {
            return Ok(image.to_string());
        }
        Ok(self.reference(engine_version, target, builder)?.to_string())
    }

    /// The structured image reference for a build.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidEngineVersion`] if `engine_version` is malformed.
    /// - [`Error::UnsupportedHostPlatform`] if `target` needs a Windows builder.
    pub fn reference(
        &self,
        engine_version: &str,
        target: TargetPlatform,
        builder: BuilderPlatform,
    ) -> Result<ImageReference> {
        let version: EngineVersion = engine_version.parse()?;
        let suffix = platform_suffix(target, &version, builder)?;

        Ok(ImageReference {
            repository: self.settings.repository.clone(),
            name: self.settings.name.clone(),
            editor_version: version.raw,
            builder_platform_suffix: suffix.to_string(),
            host_platform_prefix: builder.image_prefix().to_string(),
            rolling_version: self.settings.rolling_version,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use super::*;

    fn resolve(version: &str, target: TargetPlatform, builder: BuilderPlatform) -> Result<String> {
        ImageReferenceResolver::default().resolve(version, target, builder, None)
    }

    #[test]
    fn test_engine_version_pattern() {
        for valid in ["2019.2.11f1", "2020.1.0f1", "2021.3.45f1", "2022.1.0b12", "3"] {
            assert!(valid.parse::<EngineVersion>().is_ok(), "{valid} should be valid");
        }
        for invalid in [
            "notaversion",
            "2019.2",
            "19.2.11f1",
            "2019.10.1f1",
            "4",
            "",
            "2019.\u{0662}.11f1",
            "2019.2.\u{ff11}\u{ff11}f1",
        ] {
            assert!(
                matches!(invalid.parse::<EngineVersion>(), Err(Error::InvalidEngineVersion(_))),
                "{invalid} should be rejected"
            );
        }
    }

    #[test]
    fn test_engine_version_components() {
        let version: EngineVersion = "2019.3.0f6".parse().unwrap();
        assert_eq!((version.major(), version.minor()), (2019, 3));
        assert!(version.uses_il2cpp_images());

        let legacy: EngineVersion = "2019.2.11f1".parse().unwrap();
        assert!(!legacy.uses_il2cpp_images());

        let major_only: EngineVersion = "3".parse().unwrap();
        assert_eq!((major_only.major(), major_only.minor()), (3, 0));
        assert!(!major_only.uses_il2cpp_images());
    }

    #[test]
    fn test_webgl_on_linux() {
        assert_eq!(
            resolve("2019.2.11f1", TargetPlatform::WebGl, BuilderPlatform::Linux).unwrap(),
            "unityci/editor:ubuntu-2019.2.11f1-webgl-1"
        );
    }

    #[test]
    fn test_local_builder_has_no_prefix() {
        let builder: BuilderPlatform = "local".parse().unwrap();
        assert_eq!(
            resolve("2019.2.11f1", TargetPlatform::WebGl, builder).unwrap(),
            "unityci/editor:2019.2.11f1-webgl-1"
        );
        assert!(matches!(
            resolve("2020.1.0f1", TargetPlatform::StandaloneWindows64, builder),
            Err(Error::UnsupportedHostPlatform { .. })
        ));
    }

    #[test]
    fn test_custom_image_passthrough() {
        let resolver = ImageReferenceResolver::default();
        for target in TargetPlatform::ALL {
            assert_eq!(
                resolver
                    .resolve("garbage", target, BuilderPlatform::MacOs, Some("my/image:tag"))
                    .unwrap(),
                "my/image:tag"
            );
        }
    }

    #[test]
    fn test_empty_custom_image_is_ignored() {
        let resolver = ImageReferenceResolver::default();
        assert_eq!(
            resolver
                .resolve("2020.1.0f1", TargetPlatform::Android, BuilderPlatform::Linux, Some(""))
                .unwrap(),
            "unityci/editor:ubuntu-2020.1.0f1-android-1"
        );
    }

    #[test]
    fn test_invalid_version_rejected_for_every_target() {
        for target in TargetPlatform::ALL {
            for builder in [BuilderPlatform::Windows, BuilderPlatform::Linux, BuilderPlatform::MacOs] {
                assert!(matches!(
                    resolve("notaversion", target, builder),
                    Err(Error::InvalidEngineVersion(_))
                ));
            }
        }
    }

    #[test]
    fn test_windows_il2cpp_needs_windows_builder() {
        assert!(matches!(
            resolve("2020.1.0f1", TargetPlatform::StandaloneWindows64, BuilderPlatform::Linux),
            Err(Error::UnsupportedHostPlatform {
                target: TargetPlatform::StandaloneWindows64,
                builder: BuilderPlatform::Linux,
            })
        ));
        assert_eq!(
            resolve("2020.1.0f1", TargetPlatform::StandaloneWindows64, BuilderPlatform::Windows)
                .unwrap(),
            "unityci/editor:windows-2020.1.0f1-windows-il2cpp-1"
        );
    }

    #[test]
    fn test_windows_mono_before_il2cpp() {
        assert_eq!(
            resolve("2019.2.11f1", TargetPlatform::StandaloneWindows, BuilderPlatform::Linux)
                .unwrap(),
            "unityci/editor:ubuntu-2019.2.11f1-windows-mono-1"
        );
    }

    #[test]
    fn test_linux_backend_by_version() {
        let legacy: EngineVersion = "2019.2.11f1".parse().unwrap();
        let modern: EngineVersion = "2019.3.0f1".parse().unwrap();
        let target = TargetPlatform::StandaloneLinux64;
        assert_eq!(platform_suffix(target, &legacy, BuilderPlatform::Linux).unwrap(), "base");
        assert_eq!(
            platform_suffix(target, &modern, BuilderPlatform::Linux).unwrap(),
            "linux-il2cpp"
        );
    }

    #[test]
    fn test_windows_only_targets() {
        let version: EngineVersion = "2021.3.1f1".parse().unwrap();
        for (target, suffix) in [
            (TargetPlatform::WsaPlayer, "universal-windows-platform"),
            (TargetPlatform::TvOs, "appletv"),
        ] {
            assert_eq!(
                platform_suffix(target, &version, BuilderPlatform::Windows).unwrap(),
                suffix
            );
            assert!(matches!(
                platform_suffix(target, &version, BuilderPlatform::MacOs),
                Err(Error::UnsupportedHostPlatform { .. })
            ));
        }
    }

    #[test]
    fn test_suffix_table() {
        let version: EngineVersion = "2021.3.1f1".parse().unwrap();
        let builder = BuilderPlatform::Linux;
        for (target, suffix) in [
            (TargetPlatform::StandaloneOsx, "mac-mono"),
            (TargetPlatform::Android, "android"),
            (TargetPlatform::Ios, "ios"),
            (TargetPlatform::WebGl, "webgl"),
            (TargetPlatform::Facebook, "facebook"),
            (TargetPlatform::Ps4, "windows-mono"),
            (TargetPlatform::XboxOne, "windows-mono"),
            (TargetPlatform::Switch, "windows-mono"),
            (TargetPlatform::Lumin, "windows-mono"),
            (TargetPlatform::Bjm, "windows-mono"),
            (TargetPlatform::Stadia, "windows-mono"),
            (TargetPlatform::NoTarget, ""),
            (TargetPlatform::Test, ""),
        ] {
            assert_eq!(platform_suffix(target, &version, builder).unwrap(), suffix, "{target}");
        }
    }

    #[test]
    fn test_empty_segments_are_dropped() {
        assert_eq!(
            resolve("2019.2.11f1", TargetPlatform::NoTarget, BuilderPlatform::MacOs).unwrap(),
            "unityci/editor:2019.2.11f1-1"
        );
        assert_eq!(
            resolve("2019.2.11f1", TargetPlatform::Test, BuilderPlatform::Linux).unwrap(),
            "unityci/editor:ubuntu-2019.2.11f1-1"
        );
    }

    #[test]
    fn test_custom_repository_and_rolling_version() {
        let resolver = ImageReferenceResolver::new(ImageSettings {
            repository: "ghcr.io/acme".to_string(),
            name: "unity".to_string(),
            rolling_version: 3,
        });
        let reference = resolver
            .reference("2022.3.10f1", TargetPlatform::Ios, BuilderPlatform::MacOs)
            .unwrap();
        assert_eq!(reference.tag(), "2022.3.10f1-ios-3");
        assert_eq!(reference.to_string(), "ghcr.io/acme/unity:2022.3.10f1-ios-3");
    }

    #[test]
    fn test_empty_repository() {
        let resolver = ImageReferenceResolver::new(ImageSettings {
            repository: String::new(),
            ..ImageSettings::default()
        });
        assert_eq!(
            resolver
                .resolve("2022.3.10f1", TargetPlatform::WebGl, BuilderPlatform::Linux, None)
                .unwrap(),
            "editor:ubuntu-2022.3.10f1-webgl-1"
        );
    }
}
