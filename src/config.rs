//! Emission configuration (spec §10.3 of the expanded spec).
//!
//! The core itself takes no configuration beyond the `Project` it is
//! handed (spec §6: "no CLI, no environment variables"); `EmitConfig`
//! belongs to the demonstration binary and layers an optional `fbgen.toml`
//! file under CLI flags, the way a caller embedding this crate would wire
//! its own front-end.

use std::path::PathBuf;

use serde::Deserialize;

/// Caller-supplied knobs for a single emission run, layered as:
/// defaults < `fbgen.toml` < CLI flags.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmitConfig {
    /// Directory `fbuild.bff` (and any ensured directories) are written
    /// under. Overrides `Project::home_output_dir` when set.
    pub home_output_dir: Option<PathBuf>,
    /// Overrides `Project::configurations` when non-empty.
    pub configurations: Vec<String>,
    /// `pc` or `darwin`/`linux` — selects the `cmd.exe /C "..."` vs. plain
    /// shell chaining rule used by C4/C7.
    pub host_family: HostFamily,
}

impl Default for EmitConfig {
    fn default() -> Self {
        EmitConfig {
            home_output_dir: None,
            configurations: Vec::new(),
            host_family: HostFamily::Unix,
        }
    }
}

/// Which shell-chaining convention C4/C7 should use (spec §4.4, §4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostFamily {
    Windows,
    Unix,
}

impl Default for HostFamily {
    fn default() -> Self {
        HostFamily::Unix
    }
}

impl EmitConfig {
    /// Load defaults, then overlay an `fbgen.toml` file if present at
    /// `path`. Absence of the file is not an error.
    pub fn load_with_overlay(path: &std::path::Path) -> anyhow::Result<Self> {
        let mut config = EmitConfig::default();
        if path.exists() {
            let text = std::fs::read_to_string(path)?;
            config = toml::from_str(&text)?;
        }
        Ok(config)
    }

    /// Resolve the effective home output directory, given a value carried
    /// on the `Project` itself.
    pub fn resolve_home_output_dir(&self, project_default: &std::path::Path) -> PathBuf {
        self.home_output_dir
            .clone()
            .unwrap_or_else(|| project_default.to_path_buf())
    }
}
