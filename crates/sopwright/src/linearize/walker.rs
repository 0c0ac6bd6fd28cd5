//! Depth-first walk that emits the step sequence.
//!
//! The walk keeps its own stack of frames instead of recursing, so nesting
//! depth is bounded by memory rather than by the thread's stack. The path
//! of elements between the walk's root and the current position is kept
//! alongside. Reaching an element on that path emits a loop-back marker;
//! reaching an element emitted on another path emits a jump marker. No
//! element is ever emitted twice.

use std::collections::HashMap;

use indexmap::IndexSet;
use log::trace;

use sopwright_core::{
    element::{DiagramElement, ElementKind, GatewayKind, SequenceFlow},
    graph::ProcessGraph,
    step::{BranchKind, GatewayRole, NarrativeParagraph, Step, StepKind},
};

use super::{analysis::FlowAnalysis, narrative::Narrator};

type Path<'g> = IndexSet<&'g str>;

/// One alternative of a split, headed by a branch step.
struct Branch<'g> {
    kind: BranchKind,
    label: String,
    documentation: Option<&'g str>,
    /// The split for flow branches, the boundary event for exceptions.
    element: &'g str,
    flow: Option<&'g str>,
    target: &'g str,
}

enum Frame<'g> {
    /// A sequence of elements followed from `current`.
    Sequence {
        current: Option<&'g str>,
        depth: usize,
        stop: Option<&'g str>,
        /// Path length when the sequence started.
        mark: usize,
    },
    /// The branches of a split still to be walked.
    Branches {
        reference: String,
        branches: Vec<Branch<'g>>,
        next: usize,
        depth: usize,
        stop: Option<&'g str>,
    },
}

pub(super) struct Walker<'g> {
    graph: &'g ProcessGraph,
    analysis: &'g FlowAnalysis,
    narrator: Narrator<'g>,
    steps: Vec<Step>,
    /// Element id to the index of its step.
    emitted: HashMap<&'g str, usize>,
    next_number: usize,
    /// Branch headers to route once every step is numbered.
    routes: Vec<(usize, &'g str)>,
}

impl<'g> Walker<'g> {
    pub(super) fn new(
        graph: &'g ProcessGraph,
        analysis: &'g FlowAnalysis,
        narrator: Narrator<'g>,
    ) -> Self {
        Self {
            graph,
            analysis,
            narrator,
            steps: Vec::new(),
            emitted: HashMap::new(),
            next_number: 1,
            routes: Vec::new(),
        }
    }

    /// Walks everything reachable from `start` that is not yet emitted.
    pub(super) fn walk_from(&mut self, start: &'g str) {
        if self.emitted.contains_key(start) {
            return;
        }
        let mut path = Path::new();
        let mut stack = vec![Frame::Sequence {
            current: Some(start),
            depth: 0,
            stop: None,
            mark: 0,
        }];

        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Sequence {
                    current,
                    depth,
                    stop,
                    mark,
                } => {
                    let Some(id) = self.advance(current, depth, stop, &path) else {
                        path.truncate(mark);
                        continue;
                    };
                    let Some(element) = self.graph.element(id) else {
                        path.truncate(mark);
                        continue;
                    };
                    path.insert(id);
                    let (next, branches) = self.visit(element, depth, stop);
                    stack.push(Frame::Sequence {
                        current: next,
                        depth,
                        stop,
                        mark,
                    });
                    if let Some(frame) = branches {
                        stack.push(frame);
                    }
                }
                Frame::Branches {
                    reference,
                    branches,
                    next,
                    depth,
                    stop,
                } => {
                    let Some(branch) = branches.get(next) else {
                        continue;
                    };
                    self.push_header(&reference, next, branch, depth, stop, &path);
                    let target = branch.target;
                    stack.push(Frame::Branches {
                        reference,
                        branches,
                        next: next + 1,
                        depth,
                        stop,
                    });
                    stack.push(Frame::Sequence {
                        current: Some(target),
                        depth: depth + 1,
                        stop,
                        mark: path.len(),
                    });
                }
            }
        }
    }

    /// Routes branch headers and returns the steps.
    pub(super) fn finish(mut self) -> Vec<Step> {
        for (header, target) in std::mem::take(&mut self.routes) {
            let Some(&at) = self.emitted.get(target) else {
                continue;
            };
            let reference = self.reference_at(at);
            let routing = self.narrator.jump(&reference);
            self.steps[header].push_paragraph(routing);
        }
        self.steps
    }

    /// Returns `current` if the sequence goes on there; emits a marker when
    /// it reaches the path or an emitted element.
    fn advance(
        &mut self,
        current: Option<&'g str>,
        depth: usize,
        stop: Option<&'g str>,
        path: &Path<'g>,
    ) -> Option<&'g str> {
        let id = current?;
        if Some(id) == stop {
            return None;
        }
        if path.contains(id) {
            self.push_marker(id, depth, true);
            return None;
        }
        if self.emitted.contains_key(id) {
            self.push_marker(id, depth, false);
            return None;
        }
        Some(id)
    }

    /// Emits `element`; returns where the sequence continues and the
    /// branches to walk first, if it splits.
    fn visit(
        &mut self,
        element: &'g DiagramElement,
        depth: usize,
        stop: Option<&'g str>,
    ) -> (Option<&'g str>, Option<Frame<'g>>) {
        let graph = self.graph;
        let id = element.id();
        let outgoing: Vec<&'g SequenceFlow> = graph.outgoing(id).collect();
        let exceptions: Vec<&'g DiagramElement> = graph.boundary_events(id).collect();

        let reference = self.emit_element(element, depth, outgoing.len());
        let first = outgoing.first().map(|&flow| flow.target());
        if outgoing.len() <= 1 && exceptions.is_empty() {
            return (first, None);
        }

        let join = graph
            .element_index(id)
            .and_then(|index| self.analysis.join_of(index))
            .and_then(|index| graph.element_at(index))
            .map(DiagramElement::id);
        trace!(split = id, join:?; "Walking branches");

        let mut branches = Vec::with_capacity(outgoing.len() + exceptions.len());
        if outgoing.len() > 1 {
            let kind = branch_kind(element.kind(), &outgoing);
            for (position, &flow) in outgoing.iter().enumerate() {
                branches.push(Branch {
                    kind,
                    label: flow
                        .label()
                        .map(str::to_string)
                        .unwrap_or_else(|| format!("Option {}", position + 1)),
                    documentation: flow.documentation(),
                    element: id,
                    flow: Some(flow.id()),
                    target: flow.target(),
                });
            }
        }
        for event in exceptions {
            branches.push(Branch {
                kind: BranchKind::Exception,
                label: self.narrator.exception_label(event),
                documentation: None,
                element: event.id(),
                flow: None,
                target: event.id(),
            });
        }

        let next = if outgoing.len() > 1 { join } else { first };
        let frame = Frame::Branches {
            reference,
            branches,
            next: 0,
            depth,
            stop: join.or(stop),
        };
        (next, Some(frame))
    }

    /// Emits the step of `element` and returns its reference.
    fn emit_element(&mut self, element: &'g DiagramElement, depth: usize, outgoing: usize) -> String {
        let graph = self.graph;
        let id = element.id();
        let incoming: Vec<&'g SequenceFlow> = graph.incoming(id).collect();
        let role = if outgoing > 1 {
            GatewayRole::Split
        } else if incoming.len() > 1 {
            GatewayRole::Join
        } else {
            GatewayRole::Pass
        };

        let lane = graph.lane_of(id);
        let actor = self.narrator.actor(lane.map(|lane| lane.name()));
        let mut narrative = self.narrator.element(element, actor, role);

        if incoming.len() > 1 {
            let mut inputs: Vec<String> = Vec::new();
            for flow in &incoming {
                if let Some(&at) = self.emitted.get(flow.source()) {
                    let input = self.reference_at(at);
                    if !inputs.contains(&input) {
                        inputs.push(input);
                    }
                }
            }
            if inputs.len() > 1 {
                let connector = match element.kind().gateway_kind() {
                    Some(GatewayKind::Parallel) => "and",
                    Some(GatewayKind::Inclusive) => "and/or",
                    _ => "or",
                };
                let inputs: Vec<&str> = inputs.iter().map(String::as_str).collect();
                narrative.push(self.narrator.step_input(connector, &inputs));
            }
        }

        let reference = self.next_number.to_string();
        self.next_number += 1;

        let mut step = Step::new(self.steps.len() + 1, step_kind(element.kind(), role), depth)
            .with_reference(reference.clone())
            .with_element(id)
            .with_actor(actor)
            .with_raci(lane.map(|lane| lane.raci().clone()).unwrap_or_default())
            .with_narrative(narrative);
        if let Some(sla) = element.sla() {
            step = step.with_sla(sla.clone());
        }

        self.emitted.insert(id, self.steps.len());
        self.steps.push(step);
        reference
    }

    /// Emits the header of the branch at `position`.
    ///
    /// A branch that goes straight to its stop gets no step of its own. If
    /// the stop is already emitted it is routed here, otherwise once the
    /// walk is complete.
    fn push_header(
        &mut self,
        reference: &str,
        position: usize,
        branch: &Branch<'g>,
        depth: usize,
        stop: Option<&'g str>,
        path: &Path<'g>,
    ) {
        let letter = branch_letter(position);
        let narrative = self
            .narrator
            .branch(branch.kind, &letter, &branch.label, branch.documentation);
        let kind = StepKind::Branch {
            kind: branch.kind,
            label: branch.label.clone(),
        };
        let mut header = Step::new(self.steps.len() + 1, kind, depth)
            .with_reference(format!("{reference}{letter}"))
            .with_element(branch.element)
            .with_narrative(narrative);
        if let Some(flow) = branch.flow {
            header = header.with_flow(flow);
        }

        let target = branch.target;
        match self.emitted.get(target) {
            Some(&at) if Some(target) == stop => {
                let reference = self.reference_at(at);
                let routing = if path.contains(target) {
                    self.narrator.loop_back(&reference)
                } else {
                    self.narrator.jump(&reference)
                };
                header.push_paragraph(routing);
            }
            // Routed by the marker the branch walk emits.
            Some(_) => {}
            None => self.routes.push((self.steps.len(), target)),
        }
        self.steps.push(header);
    }

    fn push_marker(&mut self, target: &'g str, depth: usize, loops_back: bool) {
        let reference = self
            .emitted
            .get(target)
            .map(|&at| self.reference_at(at))
            .unwrap_or_else(|| target.to_string());
        let (kind, routing): (StepKind, NarrativeParagraph) = if loops_back {
            (
                StepKind::LoopBack {
                    element: target.to_string(),
                    reference: reference.clone(),
                },
                self.narrator.loop_back(&reference),
            )
        } else {
            (
                StepKind::Jump {
                    element: target.to_string(),
                    reference: reference.clone(),
                },
                self.narrator.jump(&reference),
            )
        };
        trace!(element = target, reference = reference.as_str(), loops_back; "Routing marker");

        let marker = Step::new(self.steps.len() + 1, kind, depth)
            .with_element(target)
            .with_narrative(vec![routing]);
        self.steps.push(marker);
    }

    fn reference_at(&self, at: usize) -> String {
        self.steps[at].reference().unwrap_or_default().to_string()
    }
}

fn step_kind(kind: &ElementKind, role: GatewayRole) -> StepKind {
    match kind {
        ElementKind::StartEvent => StepKind::Start,
        ElementKind::EndEvent => StepKind::End,
        ElementKind::Task => StepKind::Task,
        ElementKind::IntermediateEvent(_) | ElementKind::BoundaryEvent { .. } => StepKind::Event,
        ElementKind::SubProcess => StepKind::SubProcess,
        ElementKind::Unsupported { .. } => StepKind::Unsupported,
        ElementKind::ExclusiveGateway | ElementKind::ParallelGateway | ElementKind::InclusiveGateway => {
            match kind.gateway_kind() {
                Some(kind) => StepKind::Gateway { kind, role },
                None => StepKind::Unsupported,
            }
        }
    }
}

/// Branch kind of a split. Non-gateway splits are parallel unless their
/// flows carry conditions.
fn branch_kind(kind: &ElementKind, outgoing: &[&SequenceFlow]) -> BranchKind {
    match kind.gateway_kind() {
        Some(GatewayKind::Exclusive) => BranchKind::Exclusive,
        Some(GatewayKind::Inclusive) => BranchKind::Inclusive,
        Some(GatewayKind::Parallel) => BranchKind::Parallel,
        None if outgoing.iter().any(|flow| flow.label().is_some()) => BranchKind::Inclusive,
        None => BranchKind::Parallel,
    }
}

/// `A`..`Z`, then `AA`, `AB`, ...
fn branch_letter(position: usize) -> String {
    let mut letters = Vec::new();
    let mut n = position + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(char::from(b'A' + rem as u8));
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}
