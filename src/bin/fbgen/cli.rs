//! CLI definitions using clap.

use std::path::PathBuf;

use clap::Parser;

/// Demonstration front-end for `fbuild-emit`: deserializes a `Project`
/// (this crate's own wire format, not a meta build-system's description
/// language) and runs the emission pipeline against it.
#[derive(Parser)]
#[command(name = "fbgen")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a JSON-serialized `Project` (see `fbuild_emit::model::Project`).
    pub project: PathBuf,

    /// Path to an `fbgen.toml` overlay. Missing is not an error.
    #[arg(long, default_value = "fbgen.toml")]
    pub config: PathBuf,

    /// Override the home output directory the `.bff` is written under.
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Override the configuration list, comma-separated (e.g. `Debug,Release`).
    #[arg(long, value_delimiter = ',')]
    pub configs: Vec<String>,

    /// Emit Windows-family shell chaining/path separators instead of Unix.
    #[arg(long)]
    pub windows: bool,

    /// Enable verbose (debug) logging.
    #[arg(short, long)]
    pub verbose: bool,
}
