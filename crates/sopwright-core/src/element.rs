//! Diagram elements, sequence flows and lanes.
//!
//! These are the nodes, edges and groupings of a [`ProcessGraph`]. Each
//! type is a plain value; identity is the string identifier assigned by the
//! diagram author, which must be unique within one diagram.
//!
//! [`ProcessGraph`]: crate::graph::ProcessGraph

use std::fmt;

/// Branching behavior of a gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayKind {
    /// Exactly one outgoing path is taken.
    Exclusive,
    /// All outgoing paths are taken.
    Parallel,
    /// One or more outgoing paths are taken.
    Inclusive,
}

impl fmt::Display for GatewayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayKind::Exclusive => write!(f, "exclusive"),
            GatewayKind::Parallel => write!(f, "parallel"),
            GatewayKind::Inclusive => write!(f, "inclusive"),
        }
    }
}

/// The trigger of an intermediate or boundary event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum EventTrigger {
    #[default]
    None,
    Timer,
    Message,
    Signal,
    Error,
    Conditional,
    Escalation,
}

impl EventTrigger {
    /// Human-readable noun for the trigger, used when an event has no label.
    pub fn describe(&self) -> &'static str {
        match self {
            EventTrigger::None => "the event occurs",
            EventTrigger::Timer => "the timer expires",
            EventTrigger::Message => "the message is received",
            EventTrigger::Signal => "the signal is received",
            EventTrigger::Error => "an error occurs",
            EventTrigger::Conditional => "the condition is met",
            EventTrigger::Escalation => "the escalation is raised",
        }
    }
}

/// The resolved kind of a diagram element.
///
/// Every element of the source diagram maps to exactly one variant.
/// Elements whose notation is not recognized are kept as
/// [`ElementKind::Unsupported`] with their original tag name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementKind {
    Task,
    StartEvent,
    EndEvent,
    IntermediateEvent(EventTrigger),
    /// An event attached to the boundary of an activity.
    BoundaryEvent {
        attached_to: String,
        interrupting: bool,
        trigger: EventTrigger,
    },
    /// A collapsed sub-process, treated as a single node.
    SubProcess,
    ExclusiveGateway,
    ParallelGateway,
    InclusiveGateway,
    Unsupported {
        tag: String,
    },
}

impl ElementKind {
    /// Returns the gateway behavior if this kind is a gateway.
    pub fn gateway_kind(&self) -> Option<GatewayKind> {
        match self {
            ElementKind::ExclusiveGateway => Some(GatewayKind::Exclusive),
            ElementKind::ParallelGateway => Some(GatewayKind::Parallel),
            ElementKind::InclusiveGateway => Some(GatewayKind::Inclusive),
            _ => None,
        }
    }

    pub fn is_gateway(&self) -> bool {
        self.gateway_kind().is_some()
    }

    pub fn is_start(&self) -> bool {
        matches!(self, ElementKind::StartEvent)
    }

    pub fn is_end(&self) -> bool {
        matches!(self, ElementKind::EndEvent)
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, ElementKind::Unsupported { .. })
    }

    /// Short name used in log output and warnings.
    pub fn name(&self) -> &str {
        match self {
            ElementKind::Task => "task",
            ElementKind::StartEvent => "start event",
            ElementKind::EndEvent => "end event",
            ElementKind::IntermediateEvent(_) => "intermediate event",
            ElementKind::BoundaryEvent { .. } => "boundary event",
            ElementKind::SubProcess => "sub-process",
            ElementKind::ExclusiveGateway => "exclusive gateway",
            ElementKind::ParallelGateway => "parallel gateway",
            ElementKind::InclusiveGateway => "inclusive gateway",
            ElementKind::Unsupported { tag } => tag,
        }
    }
}

/// Service level agreement attached to an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sla {
    value: String,
    group: Option<String>,
}

impl Sla {
    /// An SLA declared on the element itself.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            group: None,
        }
    }

    /// An SLA inherited from an enclosing group.
    pub fn grouped(value: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            group: Some(group.into()),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// The group the SLA was inherited from, if any.
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }
}

/// A node of the process graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramElement {
    id: String,
    kind: ElementKind,
    label: String,
    lane: Option<String>,
    documentation: Option<String>,
    sla: Option<Sla>,
}

impl DiagramElement {
    /// Creates an unlabeled element with no lane.
    pub fn new(id: impl Into<String>, kind: ElementKind) -> Self {
        Self {
            id: id.into(),
            kind,
            label: String::new(),
            lane: None,
            documentation: None,
            sla: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Assigns the element to a lane by lane identifier.
    pub fn with_lane(mut self, lane: impl Into<String>) -> Self {
        self.lane = Some(lane.into());
        self
    }

    pub fn with_documentation(mut self, documentation: impl Into<String>) -> Self {
        let documentation = documentation.into();
        self.documentation = (!documentation.trim().is_empty()).then_some(documentation);
        self
    }

    pub fn with_sla(mut self, sla: Sla) -> Self {
        self.sla = Some(sla);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> &ElementKind {
        &self.kind
    }

    /// Display label, possibly empty.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Identifier of the lane this element belongs to.
    pub fn lane(&self) -> Option<&str> {
        self.lane.as_deref()
    }

    pub fn documentation(&self) -> Option<&str> {
        self.documentation.as_deref()
    }

    pub fn sla(&self) -> Option<&Sla> {
        self.sla.as_ref()
    }

    pub(crate) fn set_lane(&mut self, lane: &str) {
        self.lane = Some(lane.to_string());
    }
}

/// A directed edge between two elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceFlow {
    id: String,
    source: String,
    target: String,
    label: Option<String>,
    documentation: Option<String>,
}

impl SequenceFlow {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            label: None,
            documentation: None,
        }
    }

    /// Sets the condition label. Blank labels are treated as absent.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        let label = label.into();
        self.label = (!label.trim().is_empty()).then_some(label);
        self
    }

    /// Sets the text explaining the flow's condition.
    pub fn with_documentation(mut self, documentation: impl Into<String>) -> Self {
        let documentation = documentation.into();
        self.documentation = (!documentation.trim().is_empty()).then_some(documentation);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn documentation(&self) -> Option<&str> {
        self.documentation.as_deref()
    }
}

/// Responsible / accountable / consulted / informed assignment of a lane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raci {
    responsible: String,
    accountable: String,
    consulted: String,
    informed: String,
}

impl Default for Raci {
    fn default() -> Self {
        Self {
            responsible: Raci::UNASSIGNED.to_string(),
            accountable: Raci::UNASSIGNED.to_string(),
            consulted: Raci::UNASSIGNED.to_string(),
            informed: Raci::UNASSIGNED.to_string(),
        }
    }
}

impl Raci {
    /// Placeholder used for roles that were not declared.
    pub const UNASSIGNED: &'static str = "N/A";

    pub fn new(
        responsible: impl Into<String>,
        accountable: impl Into<String>,
        consulted: impl Into<String>,
        informed: impl Into<String>,
    ) -> Self {
        Self {
            responsible: responsible.into(),
            accountable: accountable.into(),
            consulted: consulted.into(),
            informed: informed.into(),
        }
    }

    pub fn responsible(&self) -> &str {
        &self.responsible
    }

    pub fn accountable(&self) -> &str {
        &self.accountable
    }

    pub fn consulted(&self) -> &str {
        &self.consulted
    }

    pub fn informed(&self) -> &str {
        &self.informed
    }
}

/// An organizational grouping of elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lane {
    id: String,
    name: String,
    members: Vec<String>,
    raci: Raci,
}

impl Lane {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            members: Vec::new(),
            raci: Raci::default(),
        }
    }

    /// Appends a member element id, keeping the first occurrence only.
    pub fn with_member(mut self, element: impl Into<String>) -> Self {
        let element = element.into();
        if !self.members.contains(&element) {
            self.members.push(element);
        }
        self
    }

    pub fn with_raci(mut self, raci: Raci) -> Self {
        self.raci = raci;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Member element ids in declaration order.
    pub fn members(&self) -> &[String] {
        &self.members
    }

    pub fn raci(&self) -> &Raci {
        &self.raci
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_kind_resolution() {
        assert_eq!(
            ElementKind::ExclusiveGateway.gateway_kind(),
            Some(GatewayKind::Exclusive)
        );
        assert_eq!(
            ElementKind::ParallelGateway.gateway_kind(),
            Some(GatewayKind::Parallel)
        );
        assert_eq!(ElementKind::Task.gateway_kind(), None);
        assert!(ElementKind::InclusiveGateway.is_gateway());
    }

    #[test]
    fn test_unsupported_kind_keeps_tag() {
        let kind = ElementKind::Unsupported {
            tag: "bpmn:complexGateway".to_string(),
        };

        assert!(kind.is_unsupported());
        assert_eq!(kind.name(), "bpmn:complexGateway");
    }

    #[test]
    fn test_blank_flow_label_is_absent() {
        let flow = SequenceFlow::new("f1", "a", "b").with_label("   ");
        assert_eq!(flow.label(), None);

        let flow = SequenceFlow::new("f1", "a", "b").with_label("Approved");
        assert_eq!(flow.label(), Some("Approved"));
    }

    #[test]
    fn test_lane_members_are_deduplicated() {
        let lane = Lane::new("l1", "Requester")
            .with_member("a")
            .with_member("b")
            .with_member("a");

        assert_eq!(lane.members(), &["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_raci_defaults_to_unassigned() {
        let raci = Raci::default();
        assert_eq!(raci.responsible(), "N/A");
        assert_eq!(raci.informed(), "N/A");
    }

    #[test]
    fn test_grouped_sla() {
        let sla = Sla::grouped("2 days", "group_1");
        assert_eq!(sla.value(), "2 days");
        assert_eq!(sla.group(), Some("group_1"));
        assert_eq!(Sla::new("1 day").group(), None);
    }
}
