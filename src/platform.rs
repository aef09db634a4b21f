// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Mark Wells <contact@markwells.dev>

//! Build targets and builder operating systems.

use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// A platform the engine can produce a player build for.
///
/// Names follow the engine's `BuildTarget` identifiers exactly; parsing is
/// case-sensitive and unknown names are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetPlatform {
    /// 32-bit Windows standalone player.
    StandaloneWindows,
    /// 64-bit Windows standalone player.
    StandaloneWindows64,
    /// macOS standalone player.
    StandaloneOsx,
    /// 64-bit Linux standalone player.
    StandaloneLinux64,
    /// Android.
    Android,
    /// iOS.
    Ios,
    /// WebGL.
    WebGl,
    /// Universal Windows Platform.
    WsaPlayer,
    /// PlayStation 4.
    Ps4,
    /// Xbox One.
    XboxOne,
    /// Apple TV.
    TvOs,
    /// Nintendo Switch.
    Switch,
    /// Magic Leap.
    Lumin,
    /// `WeChat` mini games.
    Bjm,
    /// Google Stadia.
    Stadia,
    /// Facebook gameroom.
    Facebook,
    /// Editor-only operations that need no player module.
    NoTarget,
    /// Test runs.
    Test,
}

impl TargetPlatform {
    /// Every known target, in declaration order.
    pub const ALL: [Self; 18] = [
        Self::StandaloneWindows,
        Self::StandaloneWindows64,
        Self::StandaloneOsx,
        Self::StandaloneLinux64,
        Self::Android,
        Self::Ios,
        Self::WebGl,
        Self::WsaPlayer,
        Self::Ps4,
        Self::XboxOne,
        Self::TvOs,
        Self::Switch,
        Self::Lumin,
        Self::Bjm,
        Self::Stadia,
        Self::Facebook,
        Self::NoTarget,
        Self::Test,
    ];

    /// The engine's name for this target.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StandaloneWindows => "StandaloneWindows",
            Self::StandaloneWindows64 => "StandaloneWindows64",
            Self::StandaloneOsx => "StandaloneOSX",
            Self::StandaloneLinux64 => "StandaloneLinux64",
            Self::Android => "Android",
            Self::Ios => "iOS",
            Self::WebGl => "WebGL",
            Self::WsaPlayer => "WSAPlayer",
            Self::Ps4 => "PS4",
            Self::XboxOne => "XboxOne",
            Self::TvOs => "tvOS",
            Self::Switch => "Switch",
            Self::Lumin => "Lumin",
            Self::Bjm => "BJM",
            Self::Stadia => "Stadia",
            Self::Facebook => "Facebook",
            Self::NoTarget => "NoTarget",
            Self::Test => "Test",
        }
    }

    /// Whether the player is a Windows executable.
    #[must_use]
    pub const fn is_windows(self) -> bool {
        matches!(self, Self::StandaloneWindows | Self::StandaloneWindows64)
    }

    /// Whether the player is an Android package.
    #[must_use]
    pub const fn is_android(self) -> bool {
        matches!(self, Self::Android)
    }
}

impl FromStr for TargetPlatform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|platform| platform.as_str() == s)
            .ok_or_else(|| Error::UnsupportedPlatform(s.to_string()))
    }
}

impl fmt::Display for TargetPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TargetPlatform {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Operating system of the machine executing the build step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuilderPlatform {
    /// Windows builder; uses `windows-*` images.
    Windows,
    /// Linux builder; uses `ubuntu-*` images.
    Linux,
    /// macOS builder.
    MacOs,
    /// Explicit `local` run; local editor images carry no host prefix.
    Local,
    /// Anything else.
    Other,
}

impl BuilderPlatform {
    /// The platform this process is running on.
    #[must_use]
    pub fn current() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    /// Maps a `std::env::consts::OS` value.
    #[must_use]
    pub fn from_os(os: &str) -> Self {
        match os {
            "windows" => Self::Windows,
            "linux" => Self::Linux,
            "macos" => Self::MacOs,
            _ => Self::Other,
        }
    }

    /// Image tag prefix for editor images built for this builder.
    #[must_use]
    pub const fn image_prefix(self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::Linux => "ubuntu",
            Self::MacOs | Self::Local | Self::Other => "",
        }
    }

    /// Whether this is a Windows-class builder.
    #[must_use]
    pub const fn is_windows(self) -> bool {
        matches!(self, Self::Windows)
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::Linux => "linux",
            Self::MacOs => "macos",
            Self::Local => "local",
            Self::Other => "other",
        }
    }
}

impl FromStr for BuilderPlatform {
    type Err = Error;

    /// Accepts OS names as well as the `win32`/`darwin` spellings CI runners use.
    /// `local` selects unprefixed images regardless of the host OS.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "windows" | "win32" => Ok(Self::Windows),
            "linux" | "ubuntu" => Ok(Self::Linux),
            "macos" | "darwin" | "mac" => Ok(Self::MacOs),
            "local" => Ok(Self::Local),
            _ => Err(Error::UnsupportedPlatform(s.to_string())),
        }
    }
}

impl fmt::Display for BuilderPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
