// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Mark Wells <contact@markwells.dev>

//! Step outputs reported back to the CI system.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::debug;

use crate::environment::Environment;

/// Name of the build version output.
pub const BUILD_VERSION: &str = "buildVersion";

/// Name of the Android version code output.
pub const ANDROID_VERSION_CODE: &str = "androidVersionCode";

/// Name of the container exit code output.
pub const ENGINE_EXIT_CODE: &str = "engineExitCode";

/// Publishes `name=value` outputs.
///
/// Appends to the `GITHUB_OUTPUT` file when the runner provides one and
/// falls back to stdout otherwise.
#[derive(Debug, Clone)]
pub struct Outputs {
    file: Option<PathBuf>,
}

impl Outputs {
    /// Outputs for the given environment.
    #[must_use]
    pub fn new(environment: &Environment) -> Self {
        Self {
            file: environment.output_file.clone(),
        }
    }

    /// Publishes one output.
    ///
    /// # Errors
    ///
    /// Returns an error if the output file or stdout cannot be written.
    pub fn set(&self, name: &str, value: &str) -> io::Result<()> {
        debug!("Setting output {name}={value}");
        match &self.file {
            Some(path) => {
                let mut file = OpenOptions::new().create(true).append(true).open(path)?;
                writeln!(file, "{name}={value}")
            }
            None => writeln!(io::stdout().lock(), "{name}={value}"),
        }
    }
}
