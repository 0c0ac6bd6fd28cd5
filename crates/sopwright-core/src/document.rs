//! The render-ready document model.
//!
//! A [`DocumentContext`] gathers everything the renderer needs: scalar
//! metadata fields, the ordered steps and the auxiliary section lists. It is
//! built fresh for each rendering request.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

use crate::step::Step;

/// A term and its definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Abbreviation {
    term: String,
    definition: String,
}

impl Abbreviation {
    pub fn new(term: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            definition: definition.into(),
        }
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn definition(&self) -> &str {
        &self.definition
    }
}

/// An entry of the referenced documents and approvals section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferencedDocument {
    id: String,
    title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    lane: Option<String>,
}

impl ReferencedDocument {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            lane: None,
        }
    }

    /// Records the lane the entry was derived from.
    pub fn with_lane(mut self, lane: impl Into<String>) -> Self {
        self.lane = Some(lane.into());
        self
    }

    /// Document number, `N/A` when none exists yet.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn lane(&self) -> Option<&str> {
        self.lane.as_deref()
    }
}

/// Category of a non-fatal pipeline condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarningKind {
    /// No path leads from a start event to the element.
    UnreachableElement,
    /// The element's notation is not recognized.
    UnsupportedElement,
    /// Template placeholders and context fields disagree.
    RenderMismatch,
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarningKind::UnreachableElement => write!(f, "unreachable element"),
            WarningKind::UnsupportedElement => write!(f, "unsupported element"),
            WarningKind::RenderMismatch => write!(f, "render mismatch"),
        }
    }
}

/// A recoverable condition surfaced alongside a result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    kind: WarningKind,
    element: Option<String>,
    message: String,
}

impl Warning {
    pub fn new(kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            element: None,
            message: message.into(),
        }
    }

    /// Attaches the id of the element the warning concerns.
    pub fn with_element(mut self, element: impl Into<String>) -> Self {
        self.element = Some(element.into());
        self
    }

    pub fn kind(&self) -> WarningKind {
        self.kind
    }

    pub fn element(&self) -> Option<&str> {
        self.element.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Everything the renderer consumes for one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentContext {
    fields: BTreeMap<String, String>,
    steps: Vec<Step>,
    abbreviations: Vec<Abbreviation>,
    references: Vec<ReferencedDocument>,
    policies: Vec<String>,
    warnings: Vec<Warning>,
}

impl DocumentContext {
    pub fn new(fields: BTreeMap<String, String>, steps: Vec<Step>) -> Self {
        Self {
            fields,
            steps,
            ..Self::default()
        }
    }

    pub fn with_abbreviations(mut self, abbreviations: Vec<Abbreviation>) -> Self {
        self.abbreviations = abbreviations;
        self
    }

    pub fn with_references(mut self, references: Vec<ReferencedDocument>) -> Self {
        self.references = references;
        self
    }

    pub fn with_policies(mut self, policies: Vec<String>) -> Self {
        self.policies = policies;
        self
    }

    pub fn with_warnings(mut self, warnings: Vec<Warning>) -> Self {
        self.warnings = warnings;
        self
    }

    /// Scalar metadata fields keyed by placeholder name.
    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn abbreviations(&self) -> &[Abbreviation] {
        &self.abbreviations
    }

    pub fn references(&self) -> &[ReferencedDocument] {
        &self.references
    }

    pub fn policies(&self) -> &[String] {
        &self.policies
    }

    /// Warnings collected while building the context.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_display() {
        let warning = Warning::new(
            WarningKind::UnreachableElement,
            "element `orphan` is not reachable from any start event",
        )
        .with_element("orphan");

        assert_eq!(warning.element(), Some("orphan"));
        assert_eq!(
            warning.to_string(),
            "unreachable element: element `orphan` is not reachable from any start event"
        );
    }

    #[test]
    fn test_context_field_lookup() {
        let mut fields = BTreeMap::new();
        fields.insert("process_name".to_string(), "Purchase Request".to_string());
        let context = DocumentContext::new(fields, Vec::new());

        assert_eq!(context.field("process_name"), Some("Purchase Request"));
        assert_eq!(context.field("scope"), None);
        assert!(context.references().is_empty());
    }

    #[test]
    fn test_referenced_document_lane_is_optional_in_input() {
        use serde::de::value::{Error, MapDeserializer};

        let pairs = vec![("id", "FIN-001"), ("title", "Finance Approval")];
        let doc =
            ReferencedDocument::deserialize(MapDeserializer::<_, Error>::new(pairs.into_iter()))
                .unwrap();

        assert_eq!(doc.id(), "FIN-001");
        assert_eq!(doc.lane(), None);
    }
}
