//! The linearized procedure: ordered steps with their narrative.

use crate::element::{GatewayKind, Raci, Sla};

/// What a gateway step does at its position in the procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayRole {
    /// More than one outgoing flow.
    Split,
    /// More than one incoming flow and a single outgoing flow.
    Join,
    /// Neither splits nor joins.
    Pass,
}

/// The kind of alternative a branch header introduces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchKind {
    Exclusive,
    Inclusive,
    /// Taken together with its sibling branches.
    Parallel,
    /// Raised by a boundary event.
    Exception,
}

/// Classification of a [`Step`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepKind {
    Start,
    Task,
    Event,
    SubProcess,
    Gateway {
        kind: GatewayKind,
        role: GatewayRole,
    },
    /// Header of one labeled alternative after a split.
    Branch {
        kind: BranchKind,
        label: String,
    },
    /// Back-edge to a step on the current path.
    LoopBack {
        element: String,
        reference: String,
    },
    /// Edge to a step that was already emitted on another path.
    Jump {
        element: String,
        reference: String,
    },
    End,
    Unsupported,
}

impl StepKind {
    /// Returns `true` for routing markers that do not describe an element.
    pub fn is_marker(&self) -> bool {
        matches!(self, StepKind::LoopBack { .. } | StepKind::Jump { .. })
    }

    pub fn is_branch(&self) -> bool {
        matches!(self, StepKind::Branch { .. })
    }

    /// Returns `true` for gateways that open alternatives.
    pub fn is_decision(&self) -> bool {
        matches!(
            self,
            StepKind::Gateway {
                role: GatewayRole::Split,
                ..
            }
        )
    }
}

/// Typographic role of a narrative paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emphasis {
    Title,
    Body,
    Routing,
}

/// One paragraph of a step's narrative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NarrativeParagraph {
    emphasis: Emphasis,
    text: String,
}

impl NarrativeParagraph {
    pub fn title(text: impl Into<String>) -> Self {
        Self::new(Emphasis::Title, text)
    }

    pub fn body(text: impl Into<String>) -> Self {
        Self::new(Emphasis::Body, text)
    }

    pub fn routing(text: impl Into<String>) -> Self {
        Self::new(Emphasis::Routing, text)
    }

    pub fn new(emphasis: Emphasis, text: impl Into<String>) -> Self {
        Self {
            emphasis,
            text: text.into(),
        }
    }

    pub fn emphasis(&self) -> Emphasis {
        self.emphasis
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// One ordered unit of the procedure.
///
/// The ordinal is the 1-based position in the step sequence. The reference
/// is the label shown in the document (`"4"`, `"3B"`) and is absent for
/// routing markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    ordinal: usize,
    reference: Option<String>,
    kind: StepKind,
    depth: usize,
    element: Option<String>,
    flow: Option<String>,
    actor: Option<String>,
    raci: Option<Raci>,
    sla: Option<Sla>,
    narrative: Vec<NarrativeParagraph>,
}

impl Step {
    pub fn new(ordinal: usize, kind: StepKind, depth: usize) -> Self {
        Self {
            ordinal,
            reference: None,
            kind,
            depth,
            element: None,
            flow: None,
            actor: None,
            raci: None,
            sla: None,
            narrative: Vec::new(),
        }
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    /// Records the originating element.
    pub fn with_element(mut self, element: impl Into<String>) -> Self {
        self.element = Some(element.into());
        self
    }

    /// Records the originating flow (branch headers).
    pub fn with_flow(mut self, flow: impl Into<String>) -> Self {
        self.flow = Some(flow.into());
        self
    }

    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    pub fn with_raci(mut self, raci: Raci) -> Self {
        self.raci = Some(raci);
        self
    }

    pub fn with_sla(mut self, sla: Sla) -> Self {
        self.sla = Some(sla);
        self
    }

    pub fn with_narrative(mut self, narrative: Vec<NarrativeParagraph>) -> Self {
        self.narrative = narrative;
        self
    }

    /// Appends a paragraph to the narrative.
    pub fn push_paragraph(&mut self, paragraph: NarrativeParagraph) {
        self.narrative.push(paragraph);
    }

    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    pub fn kind(&self) -> &StepKind {
        &self.kind
    }

    /// Branch nesting depth; 0 for the main sequence.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn element(&self) -> Option<&str> {
        self.element.as_deref()
    }

    pub fn flow(&self) -> Option<&str> {
        self.flow.as_deref()
    }

    pub fn actor(&self) -> Option<&str> {
        self.actor.as_deref()
    }

    pub fn raci(&self) -> Option<&Raci> {
        self.raci.as_ref()
    }

    pub fn sla(&self) -> Option<&Sla> {
        self.sla.as_ref()
    }

    pub fn narrative(&self) -> &[NarrativeParagraph] {
        &self.narrative
    }

    /// Narrative paragraphs joined by newlines.
    pub fn text(&self) -> String {
        self.narrative
            .iter()
            .map(NarrativeParagraph::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
