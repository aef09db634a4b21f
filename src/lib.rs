// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Mark Wells <contact@markwells.dev>

//! Unity builder runs engine batch-mode builds inside CI.
//!
//! It resolves a deterministic build version from the repository, selects the
//! editor container image matching the project's engine version and target
//! platform, and launches the build in that container.

/// Terminal output formatting.
pub mod cli;
/// Configuration loading.
pub mod config;
/// Container invocation.
pub mod docker;
/// CI environment snapshot.
pub mod environment;
/// Error taxonomy.
pub mod error;
/// Editor image selection.
pub mod image;
/// CI step outputs.
pub mod output;
/// Build parameter assembly.
pub mod parameters;
/// Target and builder platforms.
pub mod platform;
/// Project inspection.
pub mod project;
/// Build version resolution.
pub mod versioning;

pub use error::{Error, Result};
