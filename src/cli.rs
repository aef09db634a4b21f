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

//! CLI utilities for terminal output formatting and colors.

use crossterm::tty::IsTty;
use std::fmt::Write;
use std::io::stderr;

use crate::parameters::BuildParameters;

/// Configuration for color output
#[derive(Debug, Clone)]
pub struct ColorConfig {
    pub enabled: bool,
}

impl ColorConfig {
    /// Create a new ColorConfig, auto-detecting a TTY on stderr unless nocolor is true
    pub fn new(nocolor: bool) -> Self {
        Self {
            enabled: !nocolor && stderr().is_tty(),
        }
    }

    fn paint(&self, code: &str, s: &str) -> String {
        if self.enabled {
            format!("\x1b[{code}m{s}\x1b[0m")
        } else {
            s.to_string()
        }
    }

    /// Green (success)
    pub fn green(&self, s: &str) -> String {
        self.paint("32", s)
    }

    /// Red (errors)
    pub fn red(&self, s: &str) -> String {
        self.paint("31", s)
    }

    /// Cyan (values)
    pub fn cyan(&self, s: &str) -> String {
        self.paint("36", s)
    }

    /// Bold text
    pub fn bold(&self, s: &str) -> String {
        self.paint("1", s)
    }
}

/// Render the resolved build plan as aligned `label value` lines
pub fn render_summary(colors: &ColorConfig, params: &BuildParameters) -> String {
    let mut rows = vec![
        ("Target", params.target_platform.to_string()),
        ("Builder", params.builder_platform.to_string()),
        ("Editor", params.engine_version.clone()),
        (
            "Version",
            format!("{} ({})", params.build_version, params.versioning_strategy),
        ),
        ("Image", params.image.clone()),
        (
            "Output",
            params.build_path.join(&params.build_file).display().to_string(),
        ),
    ];
    if let Some(code) = &params.android_version_code {
        rows.push(("Android code", code.clone()));
    }

    let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    let mut out = String::new();
    for (label, value) in rows {
        let label = format!("{label:<width$}");
        let _ = writeln!(out, "{} {}", colors.bold(&label), colors.cyan(&value));
    }
    out
}
