//! Reads BPMN markup into a [`ProcessGraph`].
//!
//! The reader walks every `process` of a `definitions` document once,
//! resolving each child through [`kind::resolve`]. Problems are reported
//! through a [`DiagnosticCollector`] so that one run surfaces every broken
//! reference in the diagram.

use std::collections::HashMap;

use log::{debug, info, trace, warn};
use roxmltree::{Document, Node};

use sopwright_core::{
    element::{DiagramElement, ElementKind, GatewayKind, Lane, Raci, SequenceFlow, Sla},
    graph::{GraphError, ProcessGraph, ProcessGraphBuilder},
    properties::ProcessProperties,
};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    kind::{self, CAMUNDA, NodeKind, Role, ZEEBE},
    shapes::Layout,
    span::Span,
    text::{
        self, FORMAT_ACCOUNTABLE, FORMAT_CONSULTED, FORMAT_INFORMED, FORMAT_POLICY,
        FORMAT_RESPONSIBLE, FORMAT_SCOPE, FORMAT_SLA,
    },
};

/// Parses `source` and assembles the process graph.
pub(crate) fn read(source: &str) -> Result<ProcessGraph, ParseError> {
    let document = Document::parse(source).map_err(|err| malformed(source, &err))?;
    let root = document.root_element();

    if !kind::is_bpmn(root, "definitions") {
        return Err(Diagnostic::error(format!(
            "expected a BPMN `definitions` root element, found `{}`",
            kind::qualified_name(root)
        ))
        .with_code(ErrorCode::E002)
        .with_label(tag_span(root), "not a BPMN 2.0 definitions element")
        .with_help("export the diagram as BPMN 2.0 XML")
        .into());
    }

    let processes: Vec<Node<'_, '_>> = root
        .children()
        .filter(|n| kind::is_bpmn(*n, "process"))
        .collect();
    let Some(first_process) = processes.first() else {
        return Err(Diagnostic::error("the document declares no process")
            .with_code(ErrorCode::E100)
            .with_label(tag_span(root), "no `process` element inside")
            .into());
    };
    let anchor = tag_span(*first_process);

    let layout = Layout::read(root);
    let mut reader = Reader::new(&layout);
    for process in &processes {
        reader.read_process(*process);
    }
    reader.read_collaboration(root, &processes);
    reader.finish(anchor)
}

/// Diagram-declared metadata gathered across processes and pools.
#[derive(Debug, Default)]
struct PropertiesDraft {
    participant_name: Option<String>,
    participant_purpose: Option<String>,
    process_name: Option<String>,
    process_purpose: Option<String>,
    scope: Option<String>,
    code: Option<String>,
    policies: Vec<String>,
    abbreviations: Vec<(String, String)>,
}

impl PropertiesDraft {
    fn into_properties(self) -> ProcessProperties {
        let mut properties = ProcessProperties::default();
        if let Some(name) = self.participant_name.or(self.process_name) {
            properties = properties.with_name(name);
        }
        if let Some(purpose) = self.participant_purpose.or(self.process_purpose) {
            properties = properties.with_purpose(purpose);
        }
        if let Some(scope) = self.scope {
            properties = properties.with_scope(scope);
        }
        if let Some(code) = self.code {
            properties = properties.with_code(code);
        }
        for policy in self.policies {
            properties = properties.with_policy(policy);
        }
        for (term, definition) in self.abbreviations {
            properties = properties.with_abbreviation(term, definition);
        }
        properties
    }
}

#[derive(Debug)]
struct PendingFlow {
    flow: SequenceFlow,
    span: Span,
}

struct Reader<'l> {
    layout: &'l Layout,
    collector: DiagnosticCollector,
    spans: HashMap<String, Span>,
    elements: Vec<(DiagramElement, Span)>,
    flows: Vec<PendingFlow>,
    lanes: Vec<Lane>,
    draft: PropertiesDraft,
}

impl<'l> Reader<'l> {
    fn new(layout: &'l Layout) -> Self {
        Self {
            layout,
            collector: DiagnosticCollector::new(),
            spans: HashMap::new(),
            elements: Vec::new(),
            flows: Vec::new(),
            lanes: Vec::new(),
            draft: PropertiesDraft::default(),
        }
    }

    fn read_process(&mut self, process: Node<'_, '_>) {
        debug!(process = process.attribute("id").unwrap_or_default(); "Reading process");

        for child in process.children().filter(Node::is_element) {
            match kind::resolve(child) {
                Role::FlowNode(node_kind) => self.read_flow_node(child, node_kind),
                Role::SequenceFlow => self.read_flow(child),
                Role::LaneSet => self.read_lanes(child),
                Role::Artifact => {
                    trace!(tag = child.tag_name().name(); "Skipping artifact");
                }
                Role::Unknown => self.read_unsupported(child),
            }
        }

        self.read_process_properties(process);
    }

    fn read_flow_node(&mut self, node: Node<'_, '_>, node_kind: NodeKind) {
        let kind = match node_kind {
            NodeKind::Task => ElementKind::Task,
            NodeKind::StartEvent => ElementKind::StartEvent,
            NodeKind::EndEvent => ElementKind::EndEvent,
            NodeKind::IntermediateEvent => ElementKind::IntermediateEvent(kind::event_trigger(node)),
            NodeKind::BoundaryEvent => {
                let Some(host) = self.required(node, "attachedToRef") else {
                    return;
                };
                ElementKind::BoundaryEvent {
                    attached_to: host.to_string(),
                    interrupting: node.attribute("cancelActivity").map(str::trim) != Some("false"),
                    trigger: kind::event_trigger(node),
                }
            }
            NodeKind::SubProcess => ElementKind::SubProcess,
            NodeKind::Gateway(GatewayKind::Exclusive) => ElementKind::ExclusiveGateway,
            NodeKind::Gateway(GatewayKind::Parallel) => ElementKind::ParallelGateway,
            NodeKind::Gateway(GatewayKind::Inclusive) => ElementKind::InclusiveGateway,
        };
        let Some(id) = self.claim_id(node) else {
            return;
        };

        let mut element = DiagramElement::new(id, kind)
            .with_label(text::normalize_label(node.attribute("name").unwrap_or_default()));
        if let Some(documentation) = text::documentation(node, None) {
            element = element.with_documentation(documentation);
        }
        let sla = text::documentation(node, Some(FORMAT_SLA))
            .map(|value| Sla::new(text::collapse_whitespace(&value)))
            .or_else(|| self.layout.group_sla(id));
        if let Some(sla) = sla {
            element = element.with_sla(sla);
        }

        trace!(id = id, kind = element.kind().name(); "Read flow node");
        self.elements.push((element, tag_span(node)));
    }

    fn read_flow(&mut self, node: Node<'_, '_>) {
        let source = self.required(node, "sourceRef");
        let target = self.required(node, "targetRef");
        let Some(id) = self.claim_id(node) else {
            return;
        };
        let (Some(source), Some(target)) = (source, target) else {
            return;
        };

        let mut flow = SequenceFlow::new(id, source, target)
            .with_label(text::collapse_whitespace(node.attribute("name").unwrap_or_default()));
        if let Some(documentation) = text::documentation(node, None) {
            flow = flow.with_documentation(documentation);
        }
        self.flows.push(PendingFlow {
            flow,
            span: tag_span(node),
        });
    }

    fn read_lanes(&mut self, lane_set: Node<'_, '_>) {
        for node in lane_set.descendants().filter(|n| kind::is_bpmn(*n, "lane")) {
            let Some(id) = self.claim_id(node) else {
                continue;
            };
            let role = |format: &str| {
                text::documentation(node, Some(format))
                    .map(|value| text::collapse_whitespace(&value))
                    .unwrap_or_else(|| Raci::UNASSIGNED.to_string())
            };
            let raci = Raci::new(
                role(FORMAT_RESPONSIBLE),
                role(FORMAT_ACCOUNTABLE),
                role(FORMAT_CONSULTED),
                role(FORMAT_INFORMED),
            );

            let mut lane = Lane::new(
                id,
                text::normalize_lane_name(node.attribute("name").unwrap_or_default()),
            )
            .with_raci(raci);
            for member in node
                .children()
                .filter(|n| kind::is_bpmn(*n, "flowNodeRef"))
                .filter_map(|n| n.text())
                .map(str::trim)
                .filter(|member| !member.is_empty())
            {
                lane = lane.with_member(member);
            }
            debug!(lane = lane.name(), members = lane.members().len(); "Read lane");
            self.lanes.push(lane);
        }
    }

    fn read_unsupported(&mut self, node: Node<'_, '_>) {
        if node.attribute("id").map(str::trim).unwrap_or_default().is_empty() {
            trace!(tag = node.tag_name().name(); "Skipping unidentified element");
            return;
        }
        let Some(id) = self.claim_id(node) else {
            return;
        };
        let tag = kind::qualified_name(node);
        let span = tag_span(node);

        self.collector.emit(
            Diagnostic::warning(format!("unsupported element `{tag}`"))
                .with_code(ErrorCode::W300)
                .with_label(span, "kept as a pass-through step")
                .with_help("replace it with a task, event or gateway for a full description"),
        );

        let element = DiagramElement::new(id, ElementKind::Unsupported { tag })
            .with_label(text::normalize_label(node.attribute("name").unwrap_or_default()));
        self.elements.push((element, span));
    }

    fn read_process_properties(&mut self, process: Node<'_, '_>) {
        let draft = &mut self.draft;
        if draft.process_name.is_none() {
            draft.process_name = node_name(process);
        }
        if draft.process_purpose.is_none() {
            draft.process_purpose = text::documentation(process, None);
        }
        if draft.scope.is_none() {
            draft.scope = text::documentation(process, Some(FORMAT_SCOPE));
        }
        if let Some(policies) = text::documentation(process, Some(FORMAT_POLICY)) {
            draft.policies.extend(policies.lines().map(str::to_string));
        }
        if draft.code.is_none() {
            draft.code = process
                .attribute((CAMUNDA, "versionTag"))
                .map(str::to_string);
        }

        let extensions = process
            .children()
            .filter(|n| kind::is_bpmn(*n, "extensionElements"))
            .flat_map(|n| n.descendants())
            .filter(|n| n.is_element() && n.tag_name().namespace() == Some(ZEEBE));
        for extension in extensions {
            match extension.tag_name().name() {
                "versionTag" if draft.code.is_none() => {
                    draft.code = extension.attribute("value").map(str::to_string);
                }
                "property" => {
                    if let (Some(term), Some(definition)) =
                        (extension.attribute("name"), extension.attribute("value"))
                    {
                        draft
                            .abbreviations
                            .push((term.trim().to_string(), definition.trim().to_string()));
                    }
                }
                _ => {}
            }
        }
    }

    fn read_collaboration(&mut self, root: Node<'_, '_>, processes: &[Node<'_, '_>]) {
        let process_ids: Vec<&str> = processes.iter().filter_map(|p| p.attribute("id")).collect();

        let participants = root
            .children()
            .filter(|n| kind::is_bpmn(*n, "collaboration"))
            .flat_map(|n| n.children())
            .filter(|n| kind::is_bpmn(*n, "participant"))
            .filter(|n| {
                n.attribute("processRef")
                    .is_some_and(|process| process_ids.contains(&process))
            });
        for participant in participants {
            if self.draft.participant_name.is_none() {
                self.draft.participant_name = node_name(participant);
            }
            if self.draft.participant_purpose.is_none() {
                self.draft.participant_purpose = text::documentation(participant, None);
            }
        }
    }

    fn finish(self, anchor: Span) -> Result<ProcessGraph, ParseError> {
        let Reader {
            mut collector,
            spans,
            elements,
            flows,
            lanes,
            draft,
            ..
        } = self;

        if elements.is_empty() && !collector.has_errors() {
            collector.emit(
                Diagnostic::error("the diagram contains no flow elements")
                    .with_code(ErrorCode::E101)
                    .with_label(anchor, "empty process")
                    .with_help("add at least a start event to the process"),
            );
        }

        let mut builder = ProcessGraphBuilder::new();
        for (element, span) in elements {
            if let Err(err) = builder.add_element(element) {
                collector.emit(graph_diagnostic(&err, span));
            }
        }
        for pending in flows {
            if let Err(err) = builder.add_flow(pending.flow) {
                collector.emit(graph_diagnostic(&err, pending.span));
            }
        }

        let warnings = collector.finish()?;

        for lane in lanes {
            builder.add_lane(lane);
        }
        builder.set_properties(draft.into_properties());

        let graph = builder.build().map_err(|err| {
            let span = match &err {
                GraphError::UnknownAttachment { event, .. } => spans.get(event).copied(),
                _ => None,
            };
            ParseError::from(graph_diagnostic(&err, span.unwrap_or(anchor)))
        })?;

        if graph.start_events().next().is_none() {
            return Err(Diagnostic::error("no start event found")
                .with_code(ErrorCode::E203)
                .with_label(anchor, "process declared here")
                .with_help("add a start event where the procedure begins")
                .into());
        }

        for diagnostic in &warnings {
            warn!("{diagnostic}");
        }
        info!(
            elements = graph.elements_count(),
            flows = graph.flows_count(),
            lanes = graph.lanes().len(),
            warnings = warnings.len();
            "Diagram read"
        );

        Ok(graph)
    }

    /// Reads a required, non-blank attribute, reporting E202 when absent.
    fn required<'a>(&mut self, node: Node<'a, '_>, attribute: &str) -> Option<&'a str> {
        let value = node
            .attribute(attribute)
            .map(str::trim)
            .filter(|value| !value.is_empty());
        if value.is_none() {
            self.collector.emit(
                Diagnostic::error(format!(
                    "`{}` is missing required attribute `{attribute}`",
                    kind::qualified_name(node)
                ))
                .with_code(ErrorCode::E202)
                .with_label(tag_span(node), "declared here"),
            );
        }
        value
    }

    /// Registers the node's `id`, reporting E200 when it is already taken.
    fn claim_id<'a>(&mut self, node: Node<'a, '_>) -> Option<&'a str> {
        let id = self.required(node, "id")?;
        let span = tag_span(node);
        if let Some(first) = self.spans.get(id) {
            self.collector.emit(
                Diagnostic::error(format!("identifier `{id}` is defined multiple times"))
                    .with_code(ErrorCode::E200)
                    .with_label(span, "duplicate definition")
                    .with_secondary_label(*first, "first defined here")
                    .with_help("give every element and flow a unique `id`"),
            );
            return None;
        }
        self.spans.insert(id.to_string(), span);
        Some(id)
    }
}

fn graph_diagnostic(err: &GraphError, span: Span) -> Diagnostic {
    let diagnostic = Diagnostic::error(err.to_string());
    match err {
        GraphError::DuplicateId(_) => diagnostic
            .with_code(ErrorCode::E200)
            .with_label(span, "duplicate definition"),
        GraphError::UnknownFlowEndpoint { element, .. } => diagnostic
            .with_code(ErrorCode::E201)
            .with_label(span, format!("`{element}` is not defined"))
            .with_help("add the missing element or correct the flow's `sourceRef`/`targetRef`"),
        GraphError::UnknownAttachment { host, .. } => diagnostic
            .with_code(ErrorCode::E204)
            .with_label(span, format!("`{host}` is not defined")),
        GraphError::Empty => diagnostic
            .with_code(ErrorCode::E101)
            .with_label(span, "empty process"),
    }
}

fn node_name(node: Node<'_, '_>) -> Option<String> {
    node.attribute("name")
        .map(text::collapse_whitespace)
        .filter(|name| !name.is_empty())
}

/// Span of the element's start tag.
fn tag_span(node: Node<'_, '_>) -> Span {
    let range = node.range();
    let end = node
        .first_child()
        .map_or(range.end, |child| child.range().start);
    Span::new(range.start..end)
}

fn malformed(source: &str, err: &roxmltree::Error) -> ParseError {
    let pos = err.pos();
    let start = offset_at(source, pos.row as usize, pos.col as usize);
    let end = source[start..]
        .chars()
        .next()
        .map_or(start, |c| start + c.len_utf8());

    Diagnostic::error(format!("malformed XML: {err}"))
        .with_code(ErrorCode::E001)
        .with_label(Span::new(start..end), "parsing stopped here")
        .into()
}

/// Byte offset of a 1-based row and character column.
fn offset_at(source: &str, row: usize, col: usize) -> usize {
    let mut offset = 0;
    for (index, line) in source.split_inclusive('\n').enumerate() {
        if index + 1 == row {
            return offset
                + line
                    .char_indices()
                    .nth(col.saturating_sub(1))
                    .map_or(line.len(), |(i, _)| i);
        }
        offset += line.len();
    }
    source.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_at() {
        let source = "ab\ncdé\nf";
        assert_eq!(offset_at(source, 1, 1), 0);
        assert_eq!(offset_at(source, 2, 3), 5);
        assert_eq!(offset_at(source, 3, 1), 8);
        assert_eq!(offset_at(source, 9, 1), source.len());
    }
}
