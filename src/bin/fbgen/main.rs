//! fbgen - demonstration front-end for `fbuild-emit`.
//!
//! Deserializes a JSON `Project` (this crate's own wire format) and runs
//! the emission pipeline against it. This binary is not a meta build-system
//! front end: it owns no parsing of any build-description language.

use std::fs;

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use tracing_subscriber::EnvFilter;

mod cli;

use cli::Cli;
use fbuild_emit::config::{EmitConfig, HostFamily};
use fbuild_emit::model::Project;

fn main() {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("fbgen=debug,fbuild_emit=debug")
    } else {
        EnvFilter::new("fbgen=info,fbuild_emit=info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    let mut config = EmitConfig::load_with_overlay(&cli.config).into_diagnostic()?;
    if let Some(ref out_dir) = cli.out_dir {
        config.home_output_dir = Some(out_dir.clone());
    }
    if !cli.configs.is_empty() {
        config.configurations = cli.configs.clone();
    }
    if cli.windows {
        config.host_family = HostFamily::Windows;
    }

    let text = fs::read_to_string(&cli.project).into_diagnostic()?;
    let mut project: Project = serde_json::from_str(&text).into_diagnostic()?;
    if !config.configurations.is_empty() {
        project.configurations = config.configurations.clone();
    }

    tracing::info!(targets = project.targets.len(), "emitting fbuild.bff");
    fbuild_emit::emit(&project, &config)?;
    tracing::info!("wrote fbuild.bff");

    Ok(())
}
