//! CLI logic for the Sopwright SOP generator.
//!
//! This module contains the core CLI logic: it reads a BPMN diagram, applies
//! the user's metadata edits and writes the rendered `.docx` document.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;
pub use config::ConfigError;

use std::{fs, path::Path};

use log::{debug, info};

use sopwright::{SopBuilder, SopError, export::docx::Template};

/// Run the Sopwright CLI application
///
/// This function processes the input diagram through the Sopwright
/// pipeline and writes the resulting document to the output file. With
/// `--print-metadata` it prints the extracted metadata defaults instead.
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `SopError` for:
/// - File I/O errors
/// - Configuration or edits loading errors
/// - Parsing errors
/// - Diagrams without a start event
/// - Template and rendering errors
pub fn run(args: &Args) -> Result<(), SopError> {
    info!(
        input_path = args.input,
        output_path = args.output;
        "Processing diagram"
    );

    let app_config = config::load_config(args.config.as_ref())?;

    let template_path = args
        .template
        .as_deref()
        .map(Path::new)
        .or_else(|| app_config.template().path());
    let template = match template_path {
        Some(path) => Template::from_path(path)?,
        None => Template::builtin(),
    };

    let markup = fs::read_to_string(&args.input)?;

    let builder = SopBuilder::new(app_config).with_template(template);
    let graph = builder.ingest(&markup)?;

    if args.print_metadata {
        let metadata = builder.extract_metadata(&graph);
        let rendered = toml::to_string(&metadata)
            .map_err(|e| SopError::Io(std::io::Error::other(e.to_string())))?;
        print!("{rendered}");
        return Ok(());
    }

    let edits = config::load_edits(args.metadata.as_ref(), &args.fields)?;
    debug!(fields = edits.fields().len(); "Metadata edits loaded");

    let document = builder.finalize(&graph, &edits)?;
    fs::write(&args.output, document.bytes())?;

    info!(
        output_file = args.output,
        warnings = document.warnings().len();
        "Document exported successfully"
    );

    Ok(())
}
