//! Derivation of metadata and auxiliary sections.
//!
//! Every synthesized value is a default. Precedence, highest first:
//!
//! 1. user edits (including explicit empty strings)
//! 2. values declared in the diagram
//! 3. templated boilerplate parameterized by the effective process name

pub mod glossary;

use std::collections::{BTreeMap, BTreeSet};

use log::debug;
use serde::{Deserialize, Serialize};

use sopwright_core::{
    document::{Abbreviation, DocumentContext, ReferencedDocument},
    element::DiagramElement,
    graph::ProcessGraph,
};

use crate::{config::DefaultsConfig, linearize::Linearization};

pub const PROCESS_NAME: &str = "process_name";
pub const PROCESS_CODE: &str = "process_code";
pub const ISSUED_BY: &str = "issued_by";
pub const RELEASE_DATE: &str = "release_date";
pub const PROCESS_OWNER: &str = "process_owner";
pub const PURPOSE: &str = "purpose";
pub const SCOPE: &str = "scope";
pub const INPUTS: &str = "inputs";
pub const OUTPUTS: &str = "outputs";

const UNTITLED: &str = "Untitled Process";
const NOT_APPLICABLE: &str = "N/A";

/// Values supplied by the user before the final render.
///
/// Deserializes from the form data a host collects, e.g. TOML:
///
/// ```toml
/// policies = ["Quotes are kept for one year."]
///
/// [fields]
/// process_name = "Purchase Request"
/// purpose = ""
///
/// [[abbreviations]]
/// term = "PO"
/// definition = "Purchase Order"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserEdits {
    fields: BTreeMap<String, String>,
    abbreviations: Vec<Abbreviation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    references: Option<Vec<ReferencedDocument>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    policies: Option<Vec<String>>,
}

impl UserEdits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a scalar field; an empty value clears the synthesized default.
    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_field(name, value);
        self
    }

    /// Defines or redefines an abbreviation.
    pub fn with_abbreviation(mut self, term: impl Into<String>, definition: impl Into<String>) -> Self {
        self.abbreviations.push(Abbreviation::new(term, definition));
        self
    }

    /// Replaces the derived referenced documents.
    pub fn with_references(mut self, references: Vec<ReferencedDocument>) -> Self {
        self.references = Some(references);
        self
    }

    /// Replaces the derived general policies.
    pub fn with_policies(mut self, policies: Vec<String>) -> Self {
        self.policies = Some(policies);
        self
    }

    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn abbreviations(&self) -> &[Abbreviation] {
        &self.abbreviations
    }

    pub fn references(&self) -> Option<&[ReferencedDocument]> {
        self.references.as_deref()
    }

    pub fn policies(&self) -> Option<&[String]> {
        self.policies.as_deref()
    }

    /// Overlays `other` on top of these edits.
    pub fn merge(&mut self, other: UserEdits) {
        self.fields.extend(other.fields);
        self.abbreviations.extend(other.abbreviations);
        if other.references.is_some() {
            self.references = other.references;
        }
        if other.policies.is_some() {
            self.policies = other.policies;
        }
    }
}

/// Derives document sections from a process graph.
#[derive(Debug, Clone, Copy)]
pub struct Synthesizer<'c> {
    defaults: &'c DefaultsConfig,
}

impl<'c> Synthesizer<'c> {
    pub fn new(defaults: &'c DefaultsConfig) -> Self {
        Self { defaults }
    }

    /// Default scalar fields, as shown to the user for editing.
    pub fn default_fields(&self, graph: &ProcessGraph) -> BTreeMap<String, String> {
        let name = graph.properties().name().unwrap_or(UNTITLED);
        self.fields_named(graph, name)
    }

    /// Builds the full document context.
    ///
    /// Boilerplate is generated with the effective process name, so a user
    /// renaming the process also renames it in the default purpose, scope
    /// and policies.
    pub fn synthesize(
        &self,
        graph: &ProcessGraph,
        linearization: Linearization,
        edits: &UserEdits,
    ) -> DocumentContext {
        let name = edits
            .field(PROCESS_NAME)
            .filter(|name| !name.trim().is_empty())
            .or(graph.properties().name())
            .unwrap_or(UNTITLED)
            .to_string();

        let mut fields = self.fields_named(graph, &name);
        fields.extend(edits.fields().clone());

        let abbreviations = abbreviations(graph, edits);
        let references = match edits.references() {
            Some(references) => references.to_vec(),
            None => references(graph),
        };
        let policies = match (edits.policies(), graph.properties().policies()) {
            (Some(policies), _) => policies.to_vec(),
            (None, declared) if !declared.is_empty() => declared.to_vec(),
            (None, _) => default_policies(&name),
        };
        debug!(
            fields = fields.len(),
            abbreviations = abbreviations.len(),
            references = references.len(),
            policies = policies.len();
            "Sections synthesized"
        );

        let (steps, warnings) = linearization.into_parts();
        DocumentContext::new(fields, steps)
            .with_abbreviations(abbreviations)
            .with_references(references)
            .with_policies(policies)
            .with_warnings(warnings)
    }

    fn fields_named(&self, graph: &ProcessGraph, name: &str) -> BTreeMap<String, String> {
        let properties = graph.properties();
        let purpose = properties.purpose().map_or_else(
            || {
                format!(
                    "This document defines the {name} process, the roles involved and the \
                     activities each role performs."
                )
            },
            str::to_string,
        );
        let scope = properties.scope().map_or_else(
            || format!("This procedure applies to all parties taking part in the {name} process."),
            str::to_string,
        );

        BTreeMap::from([
            (PROCESS_NAME.to_string(), name.to_string()),
            (
                PROCESS_CODE.to_string(),
                properties.code().unwrap_or(NOT_APPLICABLE).to_string(),
            ),
            (ISSUED_BY.to_string(), self.defaults.issued_by().to_string()),
            (RELEASE_DATE.to_string(), self.defaults.release_date().to_string()),
            (PROCESS_OWNER.to_string(), self.defaults.process_owner().to_string()),
            (PURPOSE.to_string(), purpose),
            (SCOPE.to_string(), scope),
            (INPUTS.to_string(), numbered(graph.start_events())),
            (OUTPUTS.to_string(), numbered(graph.end_events())),
        ])
    }
}

/// `1. First\n2. Second`, or `N/A` when no element is labeled.
fn numbered<'a>(elements: impl Iterator<Item = &'a DiagramElement>) -> String {
    let lines: Vec<String> = elements
        .map(DiagramElement::label)
        .filter(|label| !label.is_empty())
        .enumerate()
        .map(|(n, label)| format!("{}. {label}", n + 1))
        .collect();
    if lines.is_empty() {
        NOT_APPLICABLE.to_string()
    } else {
        lines.join("\n")
    }
}

/// One entry per distinct lane name, sorted by lane name.
fn references(graph: &ProcessGraph) -> Vec<ReferencedDocument> {
    graph
        .lanes()
        .iter()
        .map(|lane| lane.name())
        .filter(|name| !name.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(|name| ReferencedDocument::new(NOT_APPLICABLE, format!("{name} Approval")).with_lane(name))
        .collect()
}

fn default_policies(name: &str) -> Vec<String> {
    vec![
        format!("All {name} activities shall be carried out in accordance with this procedure."),
        "Deviations from this procedure shall be approved by the Process Owner.".to_string(),
        "Records produced by this procedure shall be retained in line with the applicable retention policy."
            .to_string(),
    ]
}

/// Seeded, detected, declared and user terms; later sources win per term.
fn abbreviations(graph: &ProcessGraph, edits: &UserEdits) -> Vec<Abbreviation> {
    let mut terms: BTreeMap<String, Abbreviation> = BTreeMap::new();
    let mut define = |term: &str, definition: &str, replace: bool| {
        let key = term.to_uppercase();
        if replace || !terms.contains_key(&key) {
            terms.insert(key, Abbreviation::new(term, definition));
        }
    };

    for term in glossary::SEED_TERMS {
        define(term, glossary::definition(term).unwrap_or(glossary::DEFINITION_REQUIRED), false);
    }

    let labels = graph
        .elements()
        .map(DiagramElement::label)
        .chain(graph.lanes().iter().map(|lane| lane.name()));
    for label in labels {
        for term in glossary::detect(label) {
            define(term, glossary::definition(term).unwrap_or(glossary::DEFINITION_REQUIRED), false);
        }
    }

    for (term, definition) in graph.properties().abbreviations() {
        define(term, definition, true);
    }
    for abbreviation in edits.abbreviations() {
        define(abbreviation.term(), abbreviation.definition(), true);
    }

    terms.into_values().collect()
}

#[cfg(test)]
mod tests {
    use sopwright_core::{
        element::{ElementKind, Lane},
        graph::ProcessGraphBuilder,
        properties::ProcessProperties,
    };

    use super::*;
    use crate::linearize::Linearizer;

    fn graph(properties: ProcessProperties) -> ProcessGraph {
        let mut builder = ProcessGraphBuilder::new();
        builder
            .add_element(DiagramElement::new("s", ElementKind::StartEvent).with_label("PO Received"))
            .unwrap();
        builder
            .add_element(DiagramElement::new("t", ElementKind::Task).with_label("Post to ERP"))
            .unwrap();
        builder
            .add_element(DiagramElement::new("e", ElementKind::EndEvent).with_label("Order Closed"))
            .unwrap();
        builder
            .add_flow(sopwright_core::element::SequenceFlow::new("f1", "s", "t"))
            .unwrap();
        builder
            .add_flow(sopwright_core::element::SequenceFlow::new("f2", "t", "e"))
            .unwrap();
        builder.add_lane(Lane::new("l1", "Warehouse").with_member("s"));
        builder.add_lane(Lane::new("l2", "Finance").with_member("t"));
        builder.add_lane(Lane::new("l3", "Finance").with_member("e"));
        builder.set_properties(properties);
        builder.build().unwrap()
    }

    fn context(graph: &ProcessGraph, edits: &UserEdits) -> DocumentContext {
        let defaults = DefaultsConfig::default();
        let linearization = Linearizer::new(defaults.actor()).linearize(graph).unwrap();
        Synthesizer::new(&defaults).synthesize(graph, linearization, edits)
    }

    #[test]
    fn test_default_fields() {
        let defaults = DefaultsConfig::default();
        let graph = graph(ProcessProperties::default().with_name("Order Handling"));
        let fields = Synthesizer::new(&defaults).default_fields(&graph);

        assert_eq!(fields[PROCESS_NAME], "Order Handling");
        assert_eq!(fields[PROCESS_CODE], "N/A");
        assert_eq!(fields[ISSUED_BY], "Business Excellence");
        assert_eq!(fields[INPUTS], "1. PO Received");
        assert_eq!(fields[OUTPUTS], "1. Order Closed");
        assert!(fields[PURPOSE].contains("Order Handling"));
    }

    #[test]
    fn test_declared_values_beat_boilerplate() {
        let defaults = DefaultsConfig::default();
        let graph = graph(
            ProcessProperties::default()
                .with_purpose("Handle orders.")
                .with_code("OH-7"),
        );
        let fields = Synthesizer::new(&defaults).default_fields(&graph);

        assert_eq!(fields[PURPOSE], "Handle orders.");
        assert_eq!(fields[PROCESS_CODE], "OH-7");
        assert_eq!(fields[PROCESS_NAME], "Untitled Process");
    }

    #[test]
    fn test_user_edits_win_including_empty_values() {
        let graph = graph(ProcessProperties::default().with_purpose("Handle orders."));
        let edits = UserEdits::new()
            .with_field(PURPOSE, "")
            .with_field(PROCESS_NAME, "Order Fulfilment");
        let context = context(&graph, &edits);

        assert_eq!(context.field(PURPOSE), Some(""));
        assert_eq!(context.field(PROCESS_NAME), Some("Order Fulfilment"));
        assert!(context.field(SCOPE).unwrap().contains("Order Fulfilment"));
        assert!(context.policies()[0].contains("Order Fulfilment"));
    }

    #[test]
    fn test_references_are_distinct_and_sorted() {
        let context = context(&graph(ProcessProperties::default()), &UserEdits::new());
        let lanes: Vec<_> = context.references().iter().map(|r| r.lane().unwrap()).collect();

        assert_eq!(lanes, ["Finance", "Warehouse"]);
        assert_eq!(context.references()[0].title(), "Finance Approval");
        assert_eq!(context.references()[0].id(), "N/A");
    }

    #[test]
    fn test_user_references_replace_derived_ones() {
        let edits = UserEdits::new().with_references(Vec::new());
        let context = context(&graph(ProcessProperties::default()), &edits);

        assert!(context.references().is_empty());
    }

    #[test]
    fn test_abbreviation_precedence() {
        let graph = graph(ProcessProperties::default().with_abbreviation("ERP", "SAP S/4HANA"));
        let edits = UserEdits::new().with_abbreviation("PO", "Purchase Order (signed)");
        let context = context(&graph, &edits);

        let terms: Vec<_> = context
            .abbreviations()
            .iter()
            .map(|a| (a.term(), a.definition()))
            .collect();
        assert_eq!(
            terms,
            [
                ("ERP", "SAP S/4HANA"),
                ("PO", "Purchase Order (signed)"),
                ("RACI", "Responsible, Accountable, Consulted, Informed"),
                ("SLA", "Service Level Agreement"),
                ("SOP", "Standard Operating Procedure"),
            ]
        );
    }

    #[test]
    fn test_declared_policies_beat_boilerplate() {
        let graph = graph(ProcessProperties::default().with_policy("Two quotes are required."));
        let context = context(&graph, &UserEdits::new());

        assert_eq!(context.policies(), ["Two quotes are required."]);
    }

    #[test]
    fn test_edits_merge() {
        let mut edits = UserEdits::new().with_field(PURPOSE, "A").with_policies(vec!["x".into()]);
        edits.merge(UserEdits::new().with_field(PURPOSE, "B"));

        assert_eq!(edits.field(PURPOSE), Some("B"));
        assert_eq!(edits.policies().unwrap(), ["x"]);
    }
}
