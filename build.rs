// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Mark Wells <contact@markwells.dev>

//! Stamps `UNITY_BUILDER_VERSION` for `--version`.
//!
//! Release tags (`v*`) give `0.4.0` or `0.4.0-3-gabc1234-dirty`. A checkout
//! without a release tag gives `<package version>+g<short hash>`, and a source
//! tarball just the package version.

#![allow(clippy::print_stdout, reason = "Cargo reads build script directives from stdout")]

use std::process::Command;

const WATCHED: [&str; 3] = [".git/HEAD", ".git/refs/tags", ".git/packed-refs"];

fn main() {
    for path in WATCHED {
        println!("cargo:rerun-if-changed={path}");
    }

    let package = env!("CARGO_PKG_VERSION");
    let version = if let Some(tag) = git(&["describe", "--tags", "--match", "v[0-9]*", "--dirty"]) {
        tag.trim_start_matches('v').to_string()
    } else if let Some(hash) = git(&["rev-parse", "--short", "HEAD"]) {
        format!("{package}+g{hash}")
    } else {
        package.to_string()
    };
    println!("cargo:rustc-env=UNITY_BUILDER_VERSION={version}");
}

/// Trimmed stdout of a successful, non-empty git query.
fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    let stdout = String::from_utf8(output.stdout).ok()?;
    let stdout = stdout.trim();
    (output.status.success() && !stdout.is_empty()).then(|| stdout.to_string())
}
