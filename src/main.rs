// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Mark Wells <contact@markwells.dev>

//! Unity builder CLI.
//!
//! `build` resolves version and image and runs the containerized build;
//! `version` and `image` print one of the two resolved values.

#![allow(clippy::print_stdout, reason = "CLI tool needs to output to stdout")]
#![allow(clippy::print_stderr, reason = "CLI tool needs to output to stderr")]

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use unity_builder::cli::{self, ColorConfig};
use unity_builder::config::Config;
use unity_builder::docker::DockerRunner;
use unity_builder::environment::Environment;
use unity_builder::image::{ImageReferenceResolver, ImageSettings};
use unity_builder::output::{self, Outputs};
use unity_builder::parameters::{BuildInputs, BuildParameters};
use unity_builder::platform::BuilderPlatform;
use unity_builder::project;
use unity_builder::versioning::{GitCli, VersionResolver, VersioningStrategy};

/// Command-line arguments for the builder.
#[derive(Parser, Debug)]
#[command(name = "unity-builder")]
#[command(about = "Build Unity projects in CI inside editor containers")]
#[command(version = env!("UNITY_BUILDER_VERSION"))]
struct Args {
    /// The subcommand to run.
    #[command(subcommand)]
    command: Command,

    /// Path to configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output.
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Flags selecting the build version.
#[derive(clap::Args, Debug)]
struct VersioningArgs {
    /// None, Custom, Semantic or Tag. Defaults to the configured strategy.
    #[arg(long, alias = "versioningStrategy")]
    versioning_strategy: Option<String>,

    /// Version used by the Custom strategy.
    #[arg(long = "version", value_name = "VERSION")]
    custom_version: Option<String>,

    /// Allow Semantic versioning on a working tree with uncommitted changes.
    #[arg(long, alias = "allowDirtyBuild")]
    allow_dirty_build: bool,
}

/// Flags selecting the editor image.
#[derive(clap::Args, Debug)]
struct ImageArgs {
    /// Engine build target, e.g. StandaloneLinux64, Android, WebGL.
    #[arg(long, alias = "targetPlatform")]
    target_platform: String,

    /// Editor version, or "auto" to read it from the project.
    #[arg(long, alias = "unityVersion", default_value = project::AUTO_DETECT)]
    unity_version: String,

    /// Image to run instead of the resolved editor image.
    #[arg(long, alias = "customImage")]
    custom_image: Option<String>,

    /// OS of the build machine (windows, linux, macos). Defaults to this machine.
    #[arg(long, alias = "builderPlatform")]
    builder_platform: Option<String>,
}

/// Subcommands supported by the builder.
#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve version and image, then run the build in a container.
    Build {
        /// Path to the Unity project.
        #[arg(default_value = ".")]
        project_path: PathBuf,

        #[command(flatten)]
        image: ImageArgs,

        #[command(flatten)]
        versioning: VersioningArgs,

        /// Name of the player (defaults to the target platform).
        #[arg(long, alias = "buildName")]
        build_name: Option<String>,

        /// Output directory (defaults to build/<TargetPlatform>).
        #[arg(long, alias = "buildPath")]
        build_path: Option<PathBuf>,

        /// Static editor method performing the build.
        #[arg(long, alias = "buildMethod")]
        build_method: Option<String>,

        /// Extra arguments passed to the editor.
        #[arg(long, alias = "customParameters", allow_hyphen_values = true)]
        custom_parameters: Option<String>,

        /// androidPackage, androidAppBundle or androidStudioProject.
        #[arg(long, alias = "androidExportType")]
        android_export_type: Option<String>,

        /// Explicit Android version code.
        #[arg(long, alias = "androidVersionCode")]
        android_version_code: Option<String>,

        /// Android target SDK, e.g. AndroidApiLevel31.
        #[arg(long, alias = "androidTargetSdkVersion")]
        android_target_sdk_version: Option<String>,

        /// Print the resolved build as JSON instead of running it.
        #[arg(long)]
        dry_run: bool,

        /// Disable colored output.
        #[arg(long)]
        nocolor: bool,
    },

    /// Print the build version.
    Version {
        /// Path to the Unity project.
        #[arg(default_value = ".")]
        project_path: PathBuf,

        #[command(flatten)]
        versioning: VersioningArgs,
    },

    /// Print the editor image reference.
    Image {
        /// Path to the Unity project.
        #[arg(default_value = ".")]
        project_path: PathBuf,

        #[command(flatten)]
        image: ImageArgs,
    },
}

/// Entry point for the builder binary.
#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(args).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose {
        "unity_builder=debug"
    } else {
        "unity_builder=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

async fn run(args: Args) -> Result<ExitCode> {
    let config = Config::load(args.config)?;
    let environment = Environment::capture();

    match args.command {
        Command::Version {
            project_path,
            versioning,
        } => {
            let strategy: VersioningStrategy = versioning
                .versioning_strategy
                .as_deref()
                .unwrap_or(&config.versioning.strategy)
                .parse()?;
            let version = VersionResolver::new(GitCli::new(&project_path), environment)
                .with_max_diff_lines(config.versioning.max_diff_lines)
                .resolve(
                    strategy,
                    versioning.custom_version.as_deref().unwrap_or_default(),
                    versioning.allow_dirty_build,
                )?;
            println!("{version}");
            Ok(ExitCode::SUCCESS)
        }
        Command::Image {
            project_path,
            image,
        } => {
            let target = image.target_platform.parse()?;
            let builder = image
                .builder_platform
                .as_deref()
                .map_or_else(|| Ok(BuilderPlatform::current()), str::parse)?;
            let engine_version =
                project::detect_engine_version(&project_path, &image.unity_version)?;
            let reference = ImageReferenceResolver::new(ImageSettings::from(&config.image))
                .resolve(
                    &engine_version,
                    target,
                    builder,
                    image.custom_image.as_deref(),
                )?;
            println!("{reference}");
            Ok(ExitCode::SUCCESS)
        }
        Command::Build {
            project_path,
            image,
            versioning,
            build_name,
            build_path,
            build_method,
            custom_parameters,
            android_export_type,
            android_version_code,
            android_target_sdk_version,
            dry_run,
            nocolor,
        } => {
            let inputs = BuildInputs {
                project_path,
                target_platform: image.target_platform,
                unity_version: image.unity_version,
                versioning_strategy: versioning
                    .versioning_strategy
                    .unwrap_or_else(|| config.versioning.strategy.clone()),
                version: versioning.custom_version.unwrap_or_default(),
                allow_dirty_build: versioning.allow_dirty_build,
                custom_image: image.custom_image,
                builder_platform: image.builder_platform,
                build_name,
                build_path,
                build_method,
                custom_parameters,
                android_export_type,
                android_version_code,
                android_target_sdk_version,
            };
            run_build(&inputs, &config, &environment, dry_run, nocolor).await
        }
    }
}

async fn run_build(
    inputs: &BuildInputs,
    config: &Config,
    environment: &Environment,
    dry_run: bool,
    nocolor: bool,
) -> Result<ExitCode> {
    let colors = ColorConfig::new(nocolor);
    let params = BuildParameters::resolve(
        inputs,
        config,
        environment,
        GitCli::new(&inputs.project_path),
    )?;
    eprint!("{}", cli::render_summary(&colors, &params));

    if dry_run {
        println!("{}", serde_json::to_string_pretty(&params)?);
        return Ok(ExitCode::SUCCESS);
    }

    let outputs = Outputs::new(environment);
    outputs.set(output::BUILD_VERSION, &params.build_version)?;
    if let Some(code) = &params.android_version_code {
        outputs.set(output::ANDROID_VERSION_CODE, code)?;
    }

    let workspace = match &environment.workspace {
        Some(workspace) => workspace.clone(),
        None => std::env::current_dir()?,
    };
    let exit_code = DockerRunner::new(&config.docker)
        .run(&params, &workspace)
        .await?;
    outputs.set(output::ENGINE_EXIT_CODE, &exit_code.to_string())?;

    if exit_code == 0 {
        eprintln!("{}", colors.green("Build succeeded"));
        Ok(ExitCode::SUCCESS)
    } else {
        eprintln!(
            "{}",
            colors.red(&format!("Build failed with exit code {exit_code}"))
        );
        Ok(ExitCode::from(u8::try_from(exit_code).unwrap_or(1)))
    }
}
