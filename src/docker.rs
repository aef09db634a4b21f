// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Mark Wells <contact@markwells.dev>

//! Runs the build inside the editor container.

use anyhow::{Result, anyhow};
use std::path::Path;
use std::process::Stdio;
use tracing::{debug, info};

use crate::config::DockerConfig;
use crate::parameters::BuildParameters;

/// Variables forwarded by name only, so their values stay off the command line.
pub const SECRET_VARIABLES: [&str; 4] = [
    "UNITY_LICENSE",
    "UNITY_EMAIL",
    "UNITY_PASSWORD",
    "UNITY_SERIAL",
];

/// Launches `docker run` for a resolved build.
#[derive(Debug, Clone)]
pub struct DockerRunner {
    binary: String,
    workdir: String,
    entrypoint: String,
}

impl DockerRunner {
    /// Creates a runner from the `[docker]` config section.
    #[must_use]
    pub fn new(config: &DockerConfig) -> Self {
        Self {
            binary: config.binary.clone(),
            workdir: config.workdir.clone(),
            entrypoint: config.entrypoint.clone(),
        }
    }

    /// Environment passed to the container with explicit values.
    #[must_use]
    pub fn environment(params: &BuildParameters) -> Vec<(&'static str, String)> {
        let mut env = vec![
            ("UNITY_VERSION", params.engine_version.clone()),
            ("PROJECT_PATH", params.project_path.display().to_string()),
            ("BUILD_TARGET", params.target_platform.to_string()),
            ("BUILD_NAME", params.build_name.clone()),
            ("BUILD_PATH", params.build_path.display().to_string()),
            ("BUILD_FILE", params.build_file.clone()),
            ("VERSION", params.build_version.clone()),
            ("ANDROID_EXPORT_TYPE", params.android_export_type.to_string()),
        ];

        let optional = [
            ("BUILD_METHOD", &params.build_method),
            ("ANDROID_VERSION_CODE", &params.android_version_code),
            (
                "ANDROID_SDK_MANAGER_PARAMETERS",
                &params.android_sdk_manager_parameters,
            ),
            ("CUSTOM_PARAMETERS", &params.custom_parameters),
        ];
        env.extend(
            optional
                .into_iter()
                .filter_map(|(name, value)| value.clone().map(|v| (name, v))),
        );
        env
    }

    /// Arguments after the `docker` executable.
    #[must_use]
    pub fn arguments(&self, params: &BuildParameters, workspace: &Path) -> Vec<String> {
        let mut args = vec![
            "run".to_string(),
            "--workdir".to_string(),
            self.workdir.clone(),
            "--rm".to_string(),
        ];

        for (name, value) in Self::environment(params) {
            args.push("--env".to_string());
            args.push(format!("{name}={value}"));
        }
        for name in SECRET_VARIABLES {
            args.push("--env".to_string());
            args.push(name.to_string());
        }

        args.push("--volume".to_string());
        args.push(format!("{}:{}:z", workspace.display(), self.workdir));
        args.push(params.image.clone());
        args.push("/bin/bash".to_string());
        args.push("-c".to_string());
        args.push(self.entrypoint.clone());
        args
    }

    /// Runs the container to completion and returns its exit code.
    ///
    /// # Errors
    ///
    /// Returns an error if the runtime cannot be spawned or the container was
    /// killed by a signal.
    pub async fn run(&self, params: &BuildParameters, workspace: &Path) -> Result<i32> {
        let args = self.arguments(params, workspace);
        info!("Running build in {}", params.image);
        debug!("Executing: {} {:?}", self.binary, args);

        let status = tokio::process::Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| anyhow!("Failed to spawn '{}': {e}", self.binary))?;

        status
            .code()
            .ok_or_else(|| anyhow!("Build container was terminated by a signal"))
    }
}
