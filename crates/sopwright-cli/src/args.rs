//! Command-line argument definitions for the Sopwright CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control input/output paths, configuration and
//! template selection, metadata edits, and logging verbosity.

use clap::Parser;

/// Command-line arguments for the Sopwright SOP generator
#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input BPMN diagram
    #[arg(help = "Path to the input BPMN file")]
    pub input: String,

    /// Path to the output document
    #[arg(short, long, default_value = "out.docx")]
    pub output: String,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Path to a metadata edits file (TOML, or JSON with a `.json` extension)
    #[arg(short, long)]
    pub metadata: Option<String>,

    /// Override a metadata field, e.g. `--set process_code=PR-001`
    #[arg(long = "set", value_name = "FIELD=VALUE")]
    pub fields: Vec<String>,

    /// Path to a custom `.docx` template
    #[arg(long)]
    pub template: Option<String>,

    /// Print the extracted metadata defaults as TOML instead of rendering
    #[arg(long)]
    pub print_metadata: bool,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
