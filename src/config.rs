/*
 * Copyright (C) 2026 Mark Wells Dev
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

use crate::image::{self, ImageSettings};
use crate::versioning::DEFAULT_MAX_DIFF_LINES;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    /// Where editor images come from.
    #[serde(default)]
    pub image: ImageConfig,

    /// Build version defaults.
    #[serde(default)]
    pub versioning: VersioningConfig,

    /// Container runtime settings.
    #[serde(default)]
    pub docker: DockerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ImageConfig {
    /// Registry namespace (default: "unityci")
    #[serde(default = "default_repository")]
    pub repository: String,

    /// Image name (default: "editor")
    #[serde(default = "default_image_name")]
    pub name: String,

    /// Rolling image revision appended to every tag (default: 1)
    #[serde(default = "default_rolling_version")]
    pub rolling_version: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct VersioningConfig {
    /// Strategy used when none is given on the command line (default: "Semantic")
    #[serde(default = "default_strategy")]
    pub strategy: String,

    /// Diff lines logged when refusing a dirty build (default: 60)
    #[serde(default = "default_max_diff_lines")]
    pub max_diff_lines: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DockerConfig {
    /// Container runtime executable (default: "docker")
    #[serde(default = "default_docker_binary")]
    pub binary: String,

    /// Mount point of the workspace inside the container
    #[serde(default = "default_workdir")]
    pub workdir: String,

    /// Script run inside the container
    #[serde(default = "default_entrypoint")]
    pub entrypoint: String,
}

fn default_repository() -> String {
    image::DEFAULT_REPOSITORY.to_string()
}

fn default_image_name() -> String {
    image::DEFAULT_NAME.to_string()
}

const fn default_rolling_version() -> u32 {
    image::DEFAULT_ROLLING_VERSION
}

fn default_strategy() -> String {
    "Semantic".to_string()
}

const fn default_max_diff_lines() -> usize {
    DEFAULT_MAX_DIFF_LINES
}

fn default_docker_binary() -> String {
    "docker".to_string()
}

fn default_workdir() -> String {
    "/github/workspace".to_string()
}

fn default_entrypoint() -> String {
    "/entrypoint.sh".to_string()
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            repository: default_repository(),
            name: default_image_name(),
            rolling_version: default_rolling_version(),
        }
    }
}

impl Default for VersioningConfig {
    fn default() -> Self {
        Self {
            strategy: default_strategy(),
            max_diff_lines: default_max_diff_lines(),
        }
    }
}

impl Default for DockerConfig {
    fn default() -> Self {
        Self {
            binary: default_docker_binary(),
            workdir: default_workdir(),
            entrypoint: default_entrypoint(),
        }
    }
}

impl From<&ImageConfig> for ImageSettings {
    fn from(config: &ImageConfig) -> Self {
        Self {
            repository: config.repository.clone(),
            name: config.name.clone(),
            rolling_version: config.rolling_version,
        }
    }
}

impl Config {
    /// Load configuration from standard paths or a specific file.
    pub fn load(explicit_file: Option<PathBuf>) -> Result<Self> {
        let mut builder = config::Config::builder();

        // 1. Start with defaults
        builder = builder
            .set_default("image.repository", default_repository())?
            .set_default("image.name", default_image_name())?
            .set_default("image.rolling_version", i64::from(default_rolling_version()))?
            .set_default("versioning.strategy", default_strategy())?;

        // 2. Load from user config directory (~/.config/unity-builder/config.toml)
        if let Some(config_dir) = dirs::config_dir() {
            let config_path = config_dir.join("unity-builder").join("config.toml");
            if config_path.exists() {
                builder = builder.add_source(config::File::from(config_path));
            }
        }

        // 3. Load from explicit file if provided
        if let Some(path) = explicit_file {
            builder = builder.add_source(config::File::from(path));
        }

        // 4. Load from environment variables (UNITY_BUILDER_IMAGE__ROLLING_VERSION, etc.)
        builder = builder.add_source(
            config::Environment::with_prefix("UNITY_BUILDER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .context("Failed to build configuration")?;

        config.try_deserialize().context("Failed to deserialize configuration")
    }
}
