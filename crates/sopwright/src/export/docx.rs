//! WordprocessingML (`.docx`) export.
//!
//! The exporter merges a [`DocumentContext`] into a [`Template`]: the
//! template's `word/document.xml` is parsed into an owned tree, placeholders
//! are filled and styled, and the package is written back with every other
//! part copied unchanged.

mod content;
mod document;
mod merge;
mod package;
mod properties;
mod template;
mod xml;

pub use template::Template;

use std::borrow::Cow;

use log::{debug, info};

use sopwright_core::document::DocumentContext;

use super::{Error, Exporter, RenderedDocument};
use crate::config::StyleConfig;
use content::MergeData;
use merge::Merger;
use xml::XmlDocument;

/// Builder for [`Docx`] exporters.
#[derive(Debug, Default)]
pub struct DocxBuilder<'a> {
    style: Option<&'a StyleConfig>,
    template: Option<&'a Template>,
}

impl<'a> DocxBuilder<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the style applied to substituted text and table cells.
    pub fn with_style(mut self, style: &'a StyleConfig) -> Self {
        self.style = Some(style);
        self
    }

    /// Sets the template. Without one the built-in template is used.
    pub fn with_template(mut self, template: &'a Template) -> Self {
        self.template = Some(template);
        self
    }

    /// Builds the exporter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Template`] if the template has no usable main document.
    pub fn build(self) -> Result<Docx<'a>, Error> {
        let template = match self.template {
            Some(template) => Cow::Borrowed(template),
            None => Cow::Owned(Template::builtin()),
        };
        template.document_xml()?;
        Ok(Docx {
            style: match self.style {
                Some(style) => Cow::Borrowed(style),
                None => Cow::Owned(StyleConfig::default()),
            },
            template,
        })
    }
}

/// Exporter producing `.docx` bytes.
#[derive(Debug)]
pub struct Docx<'a> {
    style: Cow<'a, StyleConfig>,
    template: Cow<'a, Template>,
}

impl Exporter for Docx<'_> {
    fn export_document(&self, context: &DocumentContext) -> Result<RenderedDocument, Error> {
        info!(steps = context.steps().len(); "Rendering document");

        let data = MergeData::from_context(context, &self.style);
        let mut document = XmlDocument::parse(template::DOCUMENT_PART, self.template.document_xml()?)?;
        if document.root.name != "w:document" {
            return Err(Error::Template(format!(
                "`{}` root is `{}`, expected `w:document`",
                template::DOCUMENT_PART,
                document.root.name
            )));
        }
        let body = document
            .root
            .child_mut("w:body")
            .ok_or_else(|| Error::Template(format!("`{}` has no `w:body`", template::DOCUMENT_PART)))?;

        let render_warnings = Merger::new(&data, self.style.font_family()).merge(body);
        let bytes = self.template.package(&document.to_xml())?;
        debug!(bytes = bytes.len(), warnings = render_warnings.len(); "Document packaged");

        let mut warnings = context.warnings().to_vec();
        warnings.extend(render_warnings);
        Ok(RenderedDocument::new(bytes, warnings))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use sopwright_core::{
        document::{Abbreviation, WarningKind},
        step::{NarrativeParagraph, Step, StepKind},
    };

    use super::*;

    fn context() -> DocumentContext {
        let fields = [
            "process_name",
            "process_code",
            "issued_by",
            "release_date",
            "process_owner",
            "purpose",
            "scope",
            "inputs",
            "outputs",
        ]
        .into_iter()
        .map(|name| (name.to_string(), format!("<{name}>")))
        .collect::<BTreeMap<_, _>>();
        let steps = vec![
            Step::new(1, StepKind::Start, 0)
                .with_reference("1")
                .with_narrative(vec![NarrativeParagraph::title("Process Starts")]),
        ];
        DocumentContext::new(fields, steps)
            .with_abbreviations(vec![Abbreviation::new("SOP", "Standard Operating Procedure")])
    }

    fn document_xml(bytes: &[u8]) -> String {
        package::read(bytes)
            .unwrap()
            .into_iter()
            .find(|part| part.name == template::DOCUMENT_PART)
            .map(|part| String::from_utf8(part.data).unwrap())
            .unwrap()
    }

    #[test]
    fn test_builtin_template_renders_context() {
        let exporter = DocxBuilder::new().build().unwrap();
        let rendered = exporter.export_document(&context()).unwrap();
        let xml = document_xml(rendered.bytes());

        assert!(xml.contains("&lt;process_name&gt;"));
        assert!(xml.contains("Standard Operating Procedure"));
        assert!(xml.contains("Process Starts"));
        assert!(!xml.contains("{{"));
        assert!(!xml.contains("Referenced Documents"));
        assert!(rendered.warnings().is_empty(), "{:?}", rendered.warnings());
    }

    #[test]
    fn test_unknown_context_field_is_reported() {
        let mut fields = context().fields().clone();
        fields.insert("reviewer".to_string(), "Jo".to_string());
        let context = DocumentContext::new(fields, Vec::new());

        let rendered = DocxBuilder::new().build().unwrap().export_document(&context).unwrap();

        assert!(rendered.warnings().iter().any(|warning| {
            warning.kind() == WarningKind::RenderMismatch && warning.message().contains("reviewer")
        }));
    }

    #[test]
    fn test_custom_font_is_applied() {
        let style: StyleConfig = serde_json::from_str(r#"{"font_family": "Arial"}"#).unwrap();
        let rendered = DocxBuilder::new()
            .with_style(&style)
            .build()
            .unwrap()
            .export_document(&context())
            .unwrap();

        assert!(document_xml(rendered.bytes()).contains(r#"w:ascii="Arial""#));
    }
}
