//! Resolution of BPMN markup names to element kinds.
//!
//! Kind resolution is a prioritized table lookup over `(namespace, local
//! name)`. Elements outside the BPMN model namespace, and BPMN elements
//! with no entry in the table, resolve to [`Role::Unknown`]; the reader
//! keeps those as unsupported pass-through nodes when they carry an `id`.

use roxmltree::Node;

use sopwright_core::element::{EventTrigger, GatewayKind};

pub(crate) const BPMN_MODEL: &str = "http://www.omg.org/spec/BPMN/20100524/MODEL";
pub(crate) const BPMN_DI: &str = "http://www.omg.org/spec/BPMN/20100524/DI";
pub(crate) const DC: &str = "http://www.omg.org/spec/DD/20100524/DC";
pub(crate) const ZEEBE: &str = "http://camunda.org/schema/zeebe/1.0";
pub(crate) const CAMUNDA: &str = "http://camunda.org/schema/1.0/bpmn";

/// Flow node kinds recognized by the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NodeKind {
    Task,
    StartEvent,
    EndEvent,
    IntermediateEvent,
    BoundaryEvent,
    SubProcess,
    Gateway(GatewayKind),
}

/// What a child of a `process` element means to the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Role {
    FlowNode(NodeKind),
    SequenceFlow,
    LaneSet,
    /// Known non-node content (annotations, data, metadata).
    Artifact,
    Unknown,
}

const FLOW_NODES: &[(&str, NodeKind)] = &[
    ("task", NodeKind::Task),
    ("userTask", NodeKind::Task),
    ("serviceTask", NodeKind::Task),
    ("manualTask", NodeKind::Task),
    ("scriptTask", NodeKind::Task),
    ("sendTask", NodeKind::Task),
    ("receiveTask", NodeKind::Task),
    ("businessRuleTask", NodeKind::Task),
    ("callActivity", NodeKind::Task),
    ("startEvent", NodeKind::StartEvent),
    ("endEvent", NodeKind::EndEvent),
    ("intermediateCatchEvent", NodeKind::IntermediateEvent),
    ("intermediateThrowEvent", NodeKind::IntermediateEvent),
    ("boundaryEvent", NodeKind::BoundaryEvent),
    ("subProcess", NodeKind::SubProcess),
    ("transaction", NodeKind::SubProcess),
    ("adHocSubProcess", NodeKind::SubProcess),
    ("exclusiveGateway", NodeKind::Gateway(GatewayKind::Exclusive)),
    ("eventBasedGateway", NodeKind::Gateway(GatewayKind::Exclusive)),
    ("parallelGateway", NodeKind::Gateway(GatewayKind::Parallel)),
    ("inclusiveGateway", NodeKind::Gateway(GatewayKind::Inclusive)),
];

const ARTIFACTS: &[&str] = &[
    "association",
    "category",
    "dataInput",
    "dataInputAssociation",
    "dataObject",
    "dataObjectReference",
    "dataOutput",
    "dataOutputAssociation",
    "dataStoreReference",
    "documentation",
    "extensionElements",
    "group",
    "ioSpecification",
    "property",
    "textAnnotation",
];

const TRIGGERS: &[(&str, EventTrigger)] = &[
    ("timerEventDefinition", EventTrigger::Timer),
    ("messageEventDefinition", EventTrigger::Message),
    ("signalEventDefinition", EventTrigger::Signal),
    ("errorEventDefinition", EventTrigger::Error),
    ("conditionalEventDefinition", EventTrigger::Conditional),
    ("escalationEventDefinition", EventTrigger::Escalation),
];

/// Returns `true` if `node` is the BPMN model element `name`.
pub(crate) fn is_bpmn(node: Node<'_, '_>, name: &str) -> bool {
    node.is_element()
        && node.tag_name().namespace() == Some(BPMN_MODEL)
        && node.tag_name().name() == name
}

/// Resolves the role of a process child element.
pub(crate) fn resolve(node: Node<'_, '_>) -> Role {
    if node.tag_name().namespace() != Some(BPMN_MODEL) {
        return Role::Unknown;
    }
    let name = node.tag_name().name();
    if let Some((_, kind)) = FLOW_NODES.iter().find(|(n, _)| *n == name) {
        return Role::FlowNode(*kind);
    }
    match name {
        "sequenceFlow" => Role::SequenceFlow,
        "laneSet" => Role::LaneSet,
        _ if ARTIFACTS.contains(&name) => Role::Artifact,
        _ => Role::Unknown,
    }
}

/// The trigger declared by an event's first event definition.
pub(crate) fn event_trigger(node: Node<'_, '_>) -> EventTrigger {
    node.children()
        .filter(|child| child.is_element() && child.tag_name().namespace() == Some(BPMN_MODEL))
        .find_map(|child| {
            TRIGGERS
                .iter()
                .find(|(name, _)| *name == child.tag_name().name())
                .map(|(_, trigger)| *trigger)
        })
        .unwrap_or_default()
}

/// The element's tag as written, e.g. `bpmn:complexGateway`.
pub(crate) fn qualified_name(node: Node<'_, '_>) -> String {
    let name = node.tag_name().name();
    match node
        .tag_name()
        .namespace()
        .and_then(|ns| node.lookup_prefix(ns))
    {
        Some(prefix) if !prefix.is_empty() => format!("{prefix}:{name}"),
        _ => name.to_string(),
    }
}
