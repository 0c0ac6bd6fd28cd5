//! Sopwright - Standard operating procedures from BPMN process diagrams.
//!
//! Parsing, linearization, section synthesis and `.docx` rendering for
//! "Guideline V2" SOP documents. A diagram goes through three stages:
//! ingest (markup to [`graph::ProcessGraph`]), metadata extraction (the
//! defaults a user may review) and finalize (the rendered document).

pub mod config;
pub mod export;
pub mod linearize;
pub mod session;
pub mod synthesize;

mod error;

pub use sopwright_core::{document, element, graph, properties, step};

pub use error::SopError;

use std::collections::BTreeMap;

use log::{debug, info, trace, warn};

use config::AppConfig;
use document::{DocumentContext, WarningKind};
use export::{Exporter, RenderedDocument, docx::Template};
use graph::ProcessGraph;
use linearize::Linearizer;
use synthesize::{Synthesizer, UserEdits};

/// Builder for turning BPMN diagrams into SOP documents.
///
/// This provides an API for processing diagrams through the ingest,
/// metadata extraction and finalize stages.
///
/// # Examples
///
/// ```rust,no_run
/// use sopwright::{SopBuilder, config::AppConfig, synthesize::UserEdits};
///
/// let markup = std::fs::read_to_string("purchase_request.bpmn")
///     .expect("Failed to read diagram");
///
/// // With custom config
/// let config = AppConfig::default();
/// let builder = SopBuilder::new(config);
///
/// // Parse markup to the process graph
/// let graph = builder.ingest(&markup)
///     .expect("Failed to parse");
///
/// // Review the metadata defaults
/// let defaults = builder.extract_metadata(&graph);
///
/// // Render the document with the user's edits
/// let edits = UserEdits::new().with_field("process_code", "PR-001");
/// let document = builder.finalize(&graph, &edits)
///     .expect("Failed to render");
///
/// // Or use default config
/// let builder = SopBuilder::default();
/// ```
#[derive(Debug, Default)]
pub struct SopBuilder {
    config: AppConfig,
    template: Template,
}

impl SopBuilder {
    /// Create a new builder with the given configuration and the built-in
    /// template.
    ///
    /// # Arguments
    ///
    /// * `config` - Application configuration including style and metadata defaults
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use sopwright::{SopBuilder, config::AppConfig};
    ///
    /// let config = AppConfig::default();
    /// let builder = SopBuilder::new(config);
    /// ```
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            template: Template::builtin(),
        }
    }

    /// Replace the document template.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use sopwright::{SopBuilder, export::docx::Template};
    ///
    /// let template = Template::from_path("company_template.docx")
    ///     .expect("Failed to load template");
    /// let builder = SopBuilder::default().with_template(template);
    /// ```
    pub fn with_template(mut self, template: Template) -> Self {
        self.template = template;
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Parse BPMN markup into a process graph.
    ///
    /// # Arguments
    ///
    /// * `markup` - BPMN 2.0 XML as a string
    ///
    /// # Errors
    ///
    /// Returns `SopError::Parse` for malformed markup or structural errors,
    /// carrying every diagnostic found.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use sopwright::SopBuilder;
    ///
    /// let markup = std::fs::read_to_string("purchase_request.bpmn")
    ///     .expect("Failed to read diagram");
    /// let graph = SopBuilder::default().ingest(&markup)
    ///     .expect("Failed to parse diagram");
    /// ```
    pub fn ingest(&self, markup: &str) -> Result<ProcessGraph, SopError> {
        info!("Ingesting diagram");

        let graph = sopwright_parser::parse(markup)
            .map_err(|err| SopError::new_parse_error(err, markup))?;

        debug!(
            elements = graph.elements_count(),
            flows = graph.flows_count(),
            lanes = graph.lanes().len();
            "Diagram ingested"
        );
        trace!(graph:?; "Process graph");

        Ok(graph)
    }

    /// The metadata defaults a user may review before finalizing.
    ///
    /// Keys are the scalar fields of the document (`process_name`,
    /// `process_code`, `issued_by`, `release_date`, `process_owner`,
    /// `purpose`, `scope`, `inputs`, `outputs`).
    pub fn extract_metadata(&self, graph: &ProcessGraph) -> BTreeMap<String, String> {
        Synthesizer::new(self.config.defaults()).default_fields(graph)
    }

    /// Build the render-ready document context.
    ///
    /// # Errors
    ///
    /// Returns `SopError::Linearize` if the graph has no start event.
    pub fn context(&self, graph: &ProcessGraph, edits: &UserEdits) -> Result<DocumentContext, SopError> {
        let linearization = Linearizer::new(self.config.defaults().actor()).linearize(graph)?;
        let context = Synthesizer::new(self.config.defaults()).synthesize(graph, linearization, edits);
        debug!(
            steps = context.steps().len(),
            warnings = context.warnings().len();
            "Document context built"
        );
        Ok(context)
    }

    /// Render the final document.
    ///
    /// User edits take precedence over diagram-declared values, which take
    /// precedence over synthesized defaults.
    ///
    /// # Errors
    ///
    /// Returns `SopError::Linearize` for graphs without a start event and
    /// `SopError::Export` if the template cannot be rendered.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use sopwright::{SopBuilder, synthesize::UserEdits};
    ///
    /// let markup = std::fs::read_to_string("purchase_request.bpmn")
    ///     .expect("Failed to read diagram");
    /// let builder = SopBuilder::default();
    /// let graph = builder.ingest(&markup)
    ///     .expect("Failed to parse");
    ///
    /// let document = builder.finalize(&graph, &UserEdits::new())
    ///     .expect("Failed to render document");
    ///
    /// std::fs::write("purchase_request.docx", document.bytes())
    ///     .expect("Failed to write document");
    /// ```
    pub fn finalize(&self, graph: &ProcessGraph, edits: &UserEdits) -> Result<RenderedDocument, SopError> {
        let context = self.context(graph, edits)?;

        info!("Rendering document");
        let exporter = export::docx::DocxBuilder::new()
            .with_style(self.config.style())
            .with_template(&self.template)
            .build()?;
        let document = exporter.export_document(&context)?;

        let mismatches = document
            .warnings()
            .iter()
            .filter(|warning| warning.kind() == WarningKind::RenderMismatch);
        for warning in mismatches {
            warn!("{warning}");
        }
        info!(
            bytes = document.bytes().len(),
            warnings = document.warnings().len();
            "Document rendered successfully"
        );
        Ok(document)
    }
}
