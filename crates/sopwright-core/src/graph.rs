//! The process graph: an arena of elements and flows addressed by id.
//!
//! A [`ProcessGraph`] is assembled through [`ProcessGraphBuilder`], which
//! validates identifier uniqueness and flow endpoints, assigns lane
//! membership and derives the adjacency lists. Once built the graph is
//! immutable.
//!
//! # Example
//!
//! ```
//! # use sopwright_core::element::{DiagramElement, ElementKind, SequenceFlow};
//! # use sopwright_core::graph::ProcessGraphBuilder;
//! let mut builder = ProcessGraphBuilder::new();
//! builder.add_element(DiagramElement::new("start", ElementKind::StartEvent)).unwrap();
//! builder.add_element(DiagramElement::new("end", ElementKind::EndEvent)).unwrap();
//! builder.add_flow(SequenceFlow::new("f1", "start", "end")).unwrap();
//!
//! let graph = builder.build().unwrap();
//! assert_eq!(graph.outgoing("start").count(), 1);
//! ```

use std::collections::HashMap;

use indexmap::IndexMap;
use log::{debug, warn};
use thiserror::Error;

use crate::{
    element::{DiagramElement, ElementKind, Lane, SequenceFlow},
    properties::ProcessProperties,
};

/// Structural errors detected while assembling a [`ProcessGraph`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("identifier `{0}` is defined more than once")]
    DuplicateId(String),

    #[error("flow `{flow}` references unknown element `{element}`")]
    UnknownFlowEndpoint { flow: String, element: String },

    #[error("boundary event `{event}` is attached to unknown element `{host}`")]
    UnknownAttachment { event: String, host: String },

    #[error("diagram contains no elements")]
    Empty,
}

// =============================================================================
// Builder
// =============================================================================

/// Incremental builder for [`ProcessGraph`].
///
/// Elements must be added before the flows that reference them.
#[derive(Debug, Default)]
pub struct ProcessGraphBuilder {
    elements: IndexMap<String, DiagramElement>,
    flows: IndexMap<String, SequenceFlow>,
    lanes: Vec<Lane>,
    properties: ProcessProperties,
}

impl ProcessGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an element.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DuplicateId`] if an element or flow with the
    /// same identifier already exists.
    pub fn add_element(&mut self, element: DiagramElement) -> Result<(), GraphError> {
        if self.contains_id(element.id()) {
            return Err(GraphError::DuplicateId(element.id().to_string()));
        }
        self.elements.insert(element.id().to_string(), element);
        Ok(())
    }

    /// Adds a sequence flow between two existing elements.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DuplicateId`] for a reused identifier and
    /// [`GraphError::UnknownFlowEndpoint`] if either endpoint is missing.
    pub fn add_flow(&mut self, flow: SequenceFlow) -> Result<(), GraphError> {
        if self.contains_id(flow.id()) {
            return Err(GraphError::DuplicateId(flow.id().to_string()));
        }
        for endpoint in [flow.source(), flow.target()] {
            if !self.elements.contains_key(endpoint) {
                return Err(GraphError::UnknownFlowEndpoint {
                    flow: flow.id().to_string(),
                    element: endpoint.to_string(),
                });
            }
        }
        self.flows.insert(flow.id().to_string(), flow);
        Ok(())
    }

    /// Adds a lane. Members that do not name an element are ignored at build time.
    pub fn add_lane(&mut self, lane: Lane) {
        self.lanes.push(lane);
    }

    pub fn set_properties(&mut self, properties: ProcessProperties) {
        self.properties = properties;
    }

    /// Returns `true` if an element with this id has been added.
    pub fn contains_element(&self, id: &str) -> bool {
        self.elements.contains_key(id)
    }

    /// Validates the collected data and produces the immutable graph.
    ///
    /// Lane membership is applied in lane declaration order, so a nested
    /// lane declared after its parent takes precedence.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Empty`] if no element was added and
    /// [`GraphError::UnknownAttachment`] if a boundary event names a missing
    /// host.
    pub fn build(mut self) -> Result<ProcessGraph, GraphError> {
        if self.elements.is_empty() {
            return Err(GraphError::Empty);
        }

        for lane in &self.lanes {
            for member in lane.members() {
                match self.elements.get_mut(member) {
                    Some(element) => element.set_lane(lane.id()),
                    None => {
                        debug!(lane = lane.id(), member = member.as_str(); "Lane member is not a flow element");
                    }
                }
            }
        }

        let mut attachments: HashMap<String, Vec<usize>> = HashMap::new();
        for (index, element) in self.elements.values().enumerate() {
            if let ElementKind::BoundaryEvent { attached_to, .. } = element.kind() {
                if !self.elements.contains_key(attached_to) {
                    return Err(GraphError::UnknownAttachment {
                        event: element.id().to_string(),
                        host: attached_to.clone(),
                    });
                }
                attachments.entry(attached_to.clone()).or_default().push(index);
            }
        }

        let mut outgoing: HashMap<String, Vec<usize>> = HashMap::new();
        let mut incoming: HashMap<String, Vec<usize>> = HashMap::new();
        for (index, flow) in self.flows.values().enumerate() {
            outgoing.entry(flow.source().to_string()).or_default().push(index);
            incoming.entry(flow.target().to_string()).or_default().push(index);
        }

        let lanes_by_id = self
            .lanes
            .iter()
            .enumerate()
            .map(|(index, lane)| (lane.id().to_string(), index))
            .collect();

        if !self.elements.values().any(|e| e.kind().is_start()) {
            warn!("Process graph has no start event");
        }

        Ok(ProcessGraph {
            elements: self.elements,
            flows: self.flows,
            lanes: self.lanes,
            lanes_by_id,
            outgoing,
            incoming,
            attachments,
            properties: self.properties,
        })
    }

    fn contains_id(&self, id: &str) -> bool {
        self.elements.contains_key(id) || self.flows.contains_key(id)
    }
}

// =============================================================================
// Graph
// =============================================================================

/// Immutable process graph.
///
/// Elements and flows keep their document order; every iteration over the
/// graph is deterministic.
#[derive(Debug, Clone)]
pub struct ProcessGraph {
    elements: IndexMap<String, DiagramElement>,
    flows: IndexMap<String, SequenceFlow>,
    lanes: Vec<Lane>,
    lanes_by_id: HashMap<String, usize>,
    outgoing: HashMap<String, Vec<usize>>,
    incoming: HashMap<String, Vec<usize>>,
    attachments: HashMap<String, Vec<usize>>,
    properties: ProcessProperties,
}

impl ProcessGraph {
    pub fn element(&self, id: &str) -> Option<&DiagramElement> {
        self.elements.get(id)
    }

    /// Position of the element in document order.
    pub fn element_index(&self, id: &str) -> Option<usize> {
        self.elements.get_index_of(id)
    }

    pub fn element_at(&self, index: usize) -> Option<&DiagramElement> {
        self.elements.get_index(index).map(|(_, element)| element)
    }

    /// All elements in document order.
    pub fn elements(&self) -> impl Iterator<Item = &DiagramElement> {
        self.elements.values()
    }

    pub fn elements_count(&self) -> usize {
        self.elements.len()
    }

    pub fn flow(&self, id: &str) -> Option<&SequenceFlow> {
        self.flows.get(id)
    }

    /// All flows in document order.
    pub fn flows(&self) -> impl Iterator<Item = &SequenceFlow> {
        self.flows.values()
    }

    pub fn flows_count(&self) -> usize {
        self.flows.len()
    }

    /// Flows leaving the element, in document order.
    pub fn outgoing<'a>(&'a self, id: &str) -> impl Iterator<Item = &'a SequenceFlow> + use<'a> {
        let indices = self.outgoing.get(id).map(Vec::as_slice).unwrap_or(&[]);
        indices.iter().map(move |&index| &self.flows[index])
    }

    /// Flows entering the element, in document order.
    pub fn incoming<'a>(&'a self, id: &str) -> impl Iterator<Item = &'a SequenceFlow> + use<'a> {
        let indices = self.incoming.get(id).map(Vec::as_slice).unwrap_or(&[]);
        indices.iter().map(move |&index| &self.flows[index])
    }

    /// Boundary events attached to the element, in document order.
    pub fn boundary_events<'a>(
        &'a self,
        host: &str,
    ) -> impl Iterator<Item = &'a DiagramElement> + use<'a> {
        let indices = self.attachments.get(host).map(Vec::as_slice).unwrap_or(&[]);
        indices.iter().map(move |&index| &self.elements[index])
    }

    /// Start events in document order.
    pub fn start_events(&self) -> impl Iterator<Item = &DiagramElement> {
        self.elements.values().filter(|e| e.kind().is_start())
    }

    /// End events in document order.
    pub fn end_events(&self) -> impl Iterator<Item = &DiagramElement> {
        self.elements.values().filter(|e| e.kind().is_end())
    }

    pub fn lanes(&self) -> &[Lane] {
        &self.lanes
    }

    pub fn lane(&self, id: &str) -> Option<&Lane> {
        self.lanes_by_id.get(id).map(|&index| &self.lanes[index])
    }

    /// The lane the element belongs to, if any.
    pub fn lane_of(&self, element_id: &str) -> Option<&Lane> {
        self.element(element_id)
            .and_then(DiagramElement::lane)
            .and_then(|lane| self.lane(lane))
    }

    pub fn properties(&self) -> &ProcessProperties {
        &self.properties
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::element::EventTrigger;

    fn approval_builder() -> ProcessGraphBuilder {
        let mut builder = ProcessGraphBuilder::new();
        builder
            .add_element(DiagramElement::new("start", ElementKind::StartEvent))
            .unwrap();
        builder
            .add_element(DiagramElement::new("submit", ElementKind::Task).with_label("Submit Request"))
            .unwrap();
        builder
            .add_element(DiagramElement::new("gw", ElementKind::ExclusiveGateway))
            .unwrap();
        builder
            .add_element(DiagramElement::new("end_a", ElementKind::EndEvent))
            .unwrap();
        builder
            .add_element(DiagramElement::new("end_b", ElementKind::EndEvent))
            .unwrap();
        builder.add_flow(SequenceFlow::new("f1", "start", "submit")).unwrap();
        builder.add_flow(SequenceFlow::new("f2", "submit", "gw")).unwrap();
        builder
            .add_flow(SequenceFlow::new("f3", "gw", "end_a").with_label("Approved"))
            .unwrap();
        builder
            .add_flow(SequenceFlow::new("f4", "gw", "end_b").with_label("Rejected"))
            .unwrap();
        builder
    }

    #[test]
    fn test_build_derives_adjacency_in_document_order() {
        let graph = approval_builder().build().unwrap();

        let targets: Vec<_> = graph.outgoing("gw").map(SequenceFlow::target).collect();
        assert_eq!(targets, vec!["end_a", "end_b"]);
        assert_eq!(graph.incoming("gw").count(), 1);
        assert_eq!(graph.outgoing("end_a").count(), 0);
        assert_eq!(graph.outgoing("missing").count(), 0);
    }

    #[test]
    fn test_duplicate_element_id_rejected() {
        let mut builder = approval_builder();
        let result = builder.add_element(DiagramElement::new("submit", ElementKind::Task));

        assert_eq!(result, Err(GraphError::DuplicateId("submit".to_string())));
    }

    #[test]
    fn test_flow_id_clashing_with_element_rejected() {
        let mut builder = approval_builder();
        let result = builder.add_flow(SequenceFlow::new("gw", "start", "submit"));

        assert_eq!(result, Err(GraphError::DuplicateId("gw".to_string())));
    }

    #[test]
    fn test_unknown_flow_endpoint_rejected() {
        let mut builder = approval_builder();
        let result = builder.add_flow(SequenceFlow::new("f9", "submit", "ghost"));

        assert_eq!(
            result,
            Err(GraphError::UnknownFlowEndpoint {
                flow: "f9".to_string(),
                element: "ghost".to_string(),
            })
        );
    }

    #[test]
    fn test_empty_graph_rejected() {
        let result = ProcessGraphBuilder::new().build();
        assert!(matches!(result, Err(GraphError::Empty)));
    }

    #[test]
    fn test_lane_membership_assigned() {
        let mut builder = approval_builder();
        builder.add_lane(Lane::new("lane_req", "Requester").with_member("submit").with_member("ghost"));

        let graph = builder.build().unwrap();

        assert_eq!(graph.element("submit").unwrap().lane(), Some("lane_req"));
        assert_eq!(graph.lane_of("submit").unwrap().name(), "Requester");
        assert!(graph.lane_of("gw").is_none());
    }

    #[test]
    fn test_nested_lane_overrides_parent() {
        let mut builder = approval_builder();
        builder.add_lane(Lane::new("parent", "Finance").with_member("submit"));
        builder.add_lane(Lane::new("child", "Accounts Payable").with_member("submit"));

        let graph = builder.build().unwrap();

        assert_eq!(graph.lane_of("submit").unwrap().name(), "Accounts Payable");
    }

    #[test]
    fn test_boundary_events_indexed_by_host() {
        let mut builder = approval_builder();
        builder
            .add_element(DiagramElement::new(
                "timer",
                ElementKind::BoundaryEvent {
                    attached_to: "submit".to_string(),
                    interrupting: true,
                    trigger: EventTrigger::Timer,
                },
            ))
            .unwrap();

        let graph = builder.build().unwrap();
        let ids: Vec<_> = graph.boundary_events("submit").map(DiagramElement::id).collect();

        assert_eq!(ids, vec!["timer"]);
    }

    #[test]
    fn test_boundary_event_with_unknown_host_rejected() {
        let mut builder = approval_builder();
        builder
            .add_element(DiagramElement::new(
                "timer",
                ElementKind::BoundaryEvent {
                    attached_to: "ghost".to_string(),
                    interrupting: false,
                    trigger: EventTrigger::Timer,
                },
            ))
            .unwrap();

        assert!(matches!(
            builder.build(),
            Err(GraphError::UnknownAttachment { .. })
        ));
    }

    proptest! {
        #[test]
        fn test_adjacency_accounts_for_every_flow(
            edges in prop::collection::vec((0usize..8, 0usize..8), 0..24)
        ) {
            let mut builder = ProcessGraphBuilder::new();
            for i in 0..8 {
                builder.add_element(DiagramElement::new(format!("n{i}"), ElementKind::Task)).unwrap();
            }
            for (i, (s, t)) in edges.iter().enumerate() {
                builder.add_flow(SequenceFlow::new(format!("f{i}"), format!("n{s}"), format!("n{t}"))).unwrap();
            }
            let graph = builder.build().unwrap();

            let out_total: usize = graph.elements().map(|e| graph.outgoing(e.id()).count()).sum();
            let in_total: usize = graph.elements().map(|e| graph.incoming(e.id()).count()).sum();
            prop_assert_eq!(out_total, edges.len());
            prop_assert_eq!(in_total, edges.len());
        }
    }
}
