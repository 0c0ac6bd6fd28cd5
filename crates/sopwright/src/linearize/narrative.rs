//! Guideline V2 wording for steps.

use sopwright_core::{
    element::{DiagramElement, ElementKind, EventTrigger},
    step::{BranchKind, GatewayRole, NarrativeParagraph},
};

/// Builds the narrative paragraphs of each step kind.
#[derive(Debug, Clone, Copy)]
pub(super) struct Narrator<'a> {
    default_actor: &'a str,
}

impl<'a> Narrator<'a> {
    pub(super) fn new(default_actor: &'a str) -> Self {
        Self { default_actor }
    }

    /// The actor named in the narrative: the lane name, or the default actor.
    pub(super) fn actor<'l>(&self, lane: Option<&'l str>) -> &'l str
    where
        'a: 'l,
    {
        lane.filter(|name| !name.is_empty())
            .unwrap_or(self.default_actor)
    }

    pub(super) fn element(
        &self,
        element: &DiagramElement,
        actor: &str,
        role: GatewayRole,
    ) -> Vec<NarrativeParagraph> {
        let label = element.label();
        let mut paragraphs = Vec::new();
        let mut details = element
            .documentation()
            .map(|doc| doc.lines().collect::<Vec<_>>())
            .unwrap_or_default();

        match element.kind() {
            ElementKind::StartEvent => {
                paragraphs.push(NarrativeParagraph::title(parenthesized("Process Starts", label)));
            }
            ElementKind::EndEvent => {
                paragraphs.push(NarrativeParagraph::title(parenthesized("Process Ends", label)));
            }
            ElementKind::Task => {
                push_title(&mut paragraphs, label);
                let action = if details.is_empty() {
                    lowercase_words(label)
                } else {
                    details.remove(0).to_string()
                };
                paragraphs.push(NarrativeParagraph::body(shall(actor, &action)));
            }
            ElementKind::SubProcess => {
                let title = if label.is_empty() {
                    "Start Sub-Process".to_string()
                } else if label.ends_with("Process") {
                    format!("Start {label}")
                } else {
                    format!("Start {label} Process")
                };
                paragraphs.push(NarrativeParagraph::title(title));
            }
            ElementKind::IntermediateEvent(trigger) => {
                push_title(&mut paragraphs, label);
                paragraphs.push(NarrativeParagraph::body(format!(
                    "The {actor} shall wait until {}.",
                    event_condition(label, *trigger)
                )));
            }
            ElementKind::BoundaryEvent {
                interrupting,
                trigger,
                ..
            } => {
                push_title(&mut paragraphs, label);
                let condition = event_condition(label, *trigger);
                let body = if *interrupting {
                    format!("If {condition}, the {actor} shall stop the current activity and proceed as follows.")
                } else {
                    format!("If {condition}, the {actor} shall continue the current activity and also proceed as follows.")
                };
                paragraphs.push(NarrativeParagraph::body(body));
            }
            kind if kind.is_gateway() => {
                push_title(&mut paragraphs, label);
                let body = match (role, kind) {
                    (GatewayRole::Split, ElementKind::ParallelGateway) => {
                        format!("The {actor} shall carry out all of the following simultaneously:")
                    }
                    (GatewayRole::Split, _) => {
                        format!("The {actor} shall determine which of the following cases applies:")
                    }
                    _ => format!("The {actor} shall continue once the preceding steps are complete."),
                };
                paragraphs.push(NarrativeParagraph::body(body));
            }
            _ => {
                push_title(&mut paragraphs, label);
                let action = if label.is_empty() {
                    "complete this activity".to_string()
                } else {
                    lowercase_words(label)
                };
                paragraphs.push(NarrativeParagraph::body(shall(actor, &action)));
            }
        }

        paragraphs.extend(details.into_iter().map(NarrativeParagraph::body));
        paragraphs
    }

    /// Header of one alternative after a split.
    pub(super) fn branch(
        &self,
        kind: BranchKind,
        letter: &str,
        label: &str,
        documentation: Option<&str>,
    ) -> Vec<NarrativeParagraph> {
        let title = match kind {
            BranchKind::Exclusive | BranchKind::Inclusive => format!("Case {letter}: {label}"),
            BranchKind::Parallel => format!("Simultaneously: {label}"),
            BranchKind::Exception => format!("Exception: {label}"),
        };
        let mut paragraphs = vec![NarrativeParagraph::title(title)];
        match documentation {
            Some(doc) => paragraphs.extend(doc.lines().map(NarrativeParagraph::body)),
            None if matches!(kind, BranchKind::Exclusive | BranchKind::Inclusive) => {
                paragraphs.push(NarrativeParagraph::body(format!(
                    "This case applies when the outcome is \"{label}\"."
                )));
            }
            None => {}
        }
        paragraphs
    }

    /// Label of an exception branch raised by a boundary event.
    pub(super) fn exception_label(&self, event: &DiagramElement) -> String {
        match event.kind() {
            _ if !event.label().is_empty() => event.label().to_string(),
            ElementKind::BoundaryEvent { trigger, .. } => capitalize(trigger.describe()),
            _ => event.id().to_string(),
        }
    }

    pub(super) fn loop_back(&self, reference: &str) -> NarrativeParagraph {
        NarrativeParagraph::routing(format!("Return to Step {reference}"))
    }

    pub(super) fn jump(&self, reference: &str) -> NarrativeParagraph {
        NarrativeParagraph::routing(format!("Proceed to Step {reference}"))
    }

    /// `Step Input: Step 4 and Step 6`.
    pub(super) fn step_input(&self, connector: &str, references: &[&str]) -> NarrativeParagraph {
        let steps = references
            .iter()
            .map(|reference| format!("Step {reference}"))
            .collect::<Vec<_>>()
            .join(&format!(" {connector} "));
        NarrativeParagraph::body(format!("Step Input: {steps}"))
    }
}

fn push_title(paragraphs: &mut Vec<NarrativeParagraph>, label: &str) {
    if !label.is_empty() {
        paragraphs.push(NarrativeParagraph::title(label));
    }
}

fn parenthesized(prefix: &str, label: &str) -> String {
    if label.is_empty() {
        prefix.to_string()
    } else {
        format!("{prefix} ({label})")
    }
}

/// `The <actor> shall <action>.` without a doubled `shall` or final period.
fn shall(actor: &str, action: &str) -> String {
    let action = action.trim();
    let action = action
        .get(..6)
        .filter(|head| head.eq_ignore_ascii_case("shall "))
        .map_or(action, |_| action[6..].trim_start());
    let action = action.trim_end_matches(['.', ' ']);
    let action = if action.is_empty() {
        "complete this activity"
    } else {
        action
    };
    format!("The {actor} shall {action}.")
}

fn event_condition(label: &str, trigger: EventTrigger) -> String {
    if label.is_empty() {
        trigger.describe().to_string()
    } else {
        lowercase_words(label)
    }
}

/// Lowercases every word except acronyms such as `PO` or `HR`.
fn lowercase_words(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let letters = word.chars().filter(|c| c.is_alphabetic()).count();
            if letters > 1 && !word.chars().any(char::is_lowercase) {
                word.to_string()
            } else {
                word.to_lowercase()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    chars
        .next()
        .map(|first| first.to_uppercase().chain(chars).collect())
        .unwrap_or_default()
}
