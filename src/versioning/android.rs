// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Mark Wells <contact@markwells.dev>

//! Android `versionCode` derivation from the build version.

use semver::Version;
use tracing::{info, warn};

use super::NO_VERSION;
use crate::error::{Error, Result};

/// Codes at or above this are refused; the store's hard limit is 2 100 000 000.
pub const MAX_VERSION_CODE: u64 = 2_050_000_000;

/// Picks the Android version code for a build.
///
/// An explicit, non-empty code always wins. Otherwise the code packs the
/// semantic version as `major * 1_000_000 + minor * 1_000 + patch`, which
/// leaves three digits for each component.
///
/// # Errors
///
/// Returns [`Error::AndroidVersionCodeTooLarge`] if the packed code reaches
/// [`MAX_VERSION_CODE`].
pub fn version_code(build_version: &str, explicit: Option<&str>) -> Result<String> {
    if let Some(code) = explicit.map(str::trim).filter(|c| !c.is_empty()) {
        return Ok(code.to_string());
    }
    from_build_version(build_version).map(|code| code.to_string())
}

fn from_build_version(build_version: &str) -> Result<u64> {
    if build_version == NO_VERSION {
        info!("Versioning strategy is None, android version code will not be applied");
        return Ok(0);
    }

    let Ok(version) = Version::parse(build_version.strip_prefix('v').unwrap_or(build_version))
    else {
        warn!("Could not parse \"{build_version}\" as semver, defaulting android version code to 1");
        return Ok(1);
    };

    let code = version
        .major
        .saturating_mul(1_000_000)
        .saturating_add(version.minor.saturating_mul(1_000))
        .saturating_add(version.patch);

    if code >= MAX_VERSION_CODE {
        return Err(Error::AndroidVersionCodeTooLarge(code));
    }

    info!("Using android versionCode {code}");
    Ok(code)
}

/// `sdkmanager` package for a target SDK such as `AndroidApiLevel31`.
///
/// Returns an empty string when the last two characters are not a number.
#[must_use]
pub fn sdk_manager_parameters(target_sdk_version: &str) -> String {
    let chars: Vec<char> = target_sdk_version.chars().collect();
    let level: String = chars[chars.len().saturating_sub(2)..].iter().collect();
    level
        .parse::<u32>()
        .map(|level| format!("platforms;android-{level}"))
        .unwrap_or_default()
}
