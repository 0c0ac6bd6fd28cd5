//! Linearization of a process graph into an ordered step sequence.
//!
//! The walk starts at each start event in document order and follows
//! outgoing flows in document order. Splits emit one labeled branch per
//! outgoing flow (and one exception branch per boundary event); branches
//! stop at the split's join, which is then emitted once in the main
//! sequence. Cycles and shared tails become routing markers instead of
//! repeated steps.
//!
//! # Example
//!
//! ```
//! # use sopwright::linearize::Linearizer;
//! let source = r#"<definitions xmlns="http://www.omg.org/spec/BPMN/20100524/MODEL">
//!   <process id="p">
//!     <startEvent id="s"/>
//!     <task id="t" name="Check Stock"/>
//!     <endEvent id="e"/>
//!     <sequenceFlow id="f1" sourceRef="s" targetRef="t"/>
//!     <sequenceFlow id="f2" sourceRef="t" targetRef="e"/>
//!   </process>
//! </definitions>"#;
//! let graph = sopwright_parser::parse(source).unwrap();
//!
//! let linearization = Linearizer::new("Warehouse").linearize(&graph).unwrap();
//! assert_eq!(linearization.steps().len(), 3);
//! assert!(linearization.warnings().is_empty());
//! ```

mod analysis;
mod narrative;
mod walker;

use log::{debug, info, warn};
use thiserror::Error;

use sopwright_core::{
    document::{Warning, WarningKind},
    element::ElementKind,
    graph::ProcessGraph,
    step::Step,
};

use analysis::FlowAnalysis;
use narrative::Narrator;
use walker::Walker;

/// Fatal linearization failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinearizeError {
    #[error("no start event found")]
    NoStartEvent,
}

/// The ordered steps of a process and the conditions found on the way.
#[derive(Debug, Clone)]
pub struct Linearization {
    steps: Vec<Step>,
    warnings: Vec<Warning>,
}

impl Linearization {
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Unreachable and unsupported elements.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn into_parts(self) -> (Vec<Step>, Vec<Warning>) {
        (self.steps, self.warnings)
    }
}

/// Turns a [`ProcessGraph`] into Guideline V2 steps.
#[derive(Debug, Clone)]
pub struct Linearizer {
    actor: String,
}

impl Linearizer {
    /// Creates a linearizer naming `actor` for elements outside any lane.
    pub fn new(actor: impl Into<String>) -> Self {
        Self {
            actor: actor.into(),
        }
    }

    /// Linearizes `graph`.
    ///
    /// # Errors
    ///
    /// Returns [`LinearizeError::NoStartEvent`] when the graph has no start
    /// event.
    pub fn linearize(&self, graph: &ProcessGraph) -> Result<Linearization, LinearizeError> {
        let starts: Vec<&str> = graph.start_events().map(|start| start.id()).collect();
        if starts.is_empty() {
            return Err(LinearizeError::NoStartEvent);
        }

        let analysis = FlowAnalysis::new(graph);
        let mut walker = Walker::new(graph, &analysis, Narrator::new(&self.actor));
        for start in starts {
            walker.walk_from(start);
        }
        let steps = walker.finish();
        debug!(steps = steps.len(); "Walk complete");

        let mut warnings = Vec::new();
        for (index, element) in graph.elements().enumerate() {
            let name = if element.label().is_empty() {
                element.id()
            } else {
                element.label()
            };
            if !analysis.is_reachable(index) {
                warn!(element = element.id(); "Element is unreachable from any start event");
                warnings.push(
                    Warning::new(
                        WarningKind::UnreachableElement,
                        format!("`{name}` cannot be reached from a start event and is left out"),
                    )
                    .with_element(element.id()),
                );
            }
            if let ElementKind::Unsupported { tag } = element.kind() {
                warnings.push(
                    Warning::new(
                        WarningKind::UnsupportedElement,
                        format!("`{name}` is an unsupported `{tag}` and is kept as a pass-through step"),
                    )
                    .with_element(element.id()),
                );
            }
        }

        info!(steps = steps.len(), warnings = warnings.len(); "Process linearized");
        Ok(Linearization { steps, warnings })
    }
}
