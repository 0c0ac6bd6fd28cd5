//! Merge data: the document context flattened into template values.

use std::collections::BTreeMap;

use sopwright_core::{
    document::DocumentContext,
    step::{Emphasis, Step},
};

use super::properties::RunStyle;
use crate::config::StyleConfig;

/// A value substituted for a placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Value {
    /// Inline text; `style` is applied on top of the template run's own.
    Text { text: String, style: RunStyle },
    /// Paragraphs that replace the placeholder's paragraph.
    Rich(Vec<RichParagraph>),
}

impl Value {
    fn plain(text: impl Into<String>) -> Self {
        Value::Text {
            text: text.into(),
            style: RunStyle::default(),
        }
    }

    fn styled(text: impl Into<String>, style: RunStyle) -> Self {
        Value::Text {
            text: text.into(),
            style,
        }
    }

    pub(super) fn is_empty(&self) -> bool {
        match self {
            Value::Text { text, .. } => text.is_empty(),
            Value::Rich(paragraphs) => paragraphs.is_empty(),
        }
    }

    /// Single-line rendering used when the value shares a paragraph.
    pub(super) fn inline_text(&self) -> String {
        match self {
            Value::Text { text, .. } => text.clone(),
            Value::Rich(paragraphs) => paragraphs
                .iter()
                .map(|paragraph| paragraph.text.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct RichParagraph {
    pub(super) text: String,
    pub(super) style: RunStyle,
    /// Left indentation in twips.
    pub(super) indent: u32,
}

/// One element of a repeated list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(super) struct Item {
    pub(super) fields: BTreeMap<String, Value>,
    /// Fill of every cell of the item's row.
    pub(super) shading: Option<String>,
    /// Fill of the cell showing a field, over `shading`.
    pub(super) cell_shading: BTreeMap<String, String>,
    /// Consecutive items sharing a key for a field merge that field's cells.
    pub(super) merge_keys: BTreeMap<String, String>,
}

impl Item {
    fn with(mut self, field: &str, value: Value) -> Self {
        self.fields.insert(field.to_string(), value);
        self
    }
}

/// Scalar values and lists keyed by placeholder name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(super) struct MergeData {
    pub(super) scalars: BTreeMap<String, Value>,
    pub(super) lists: BTreeMap<String, Vec<Item>>,
}

impl MergeData {
    pub(super) fn from_context(context: &DocumentContext, style: &StyleConfig) -> Self {
        let scalars = context
            .fields()
            .iter()
            .map(|(name, value)| (name.clone(), Value::plain(value.as_str())))
            .collect();

        let abbreviations = context
            .abbreviations()
            .iter()
            .map(|abbreviation| {
                Item::default()
                    .with("term", Value::plain(abbreviation.term()))
                    .with("definition", Value::plain(abbreviation.definition()))
            })
            .collect();
        let references = context
            .references()
            .iter()
            .map(|reference| {
                Item::default()
                    .with("id", Value::plain(reference.id()))
                    .with("title", Value::plain(reference.title()))
            })
            .collect();
        let policies = context
            .policies()
            .iter()
            .enumerate()
            .map(|(n, policy)| {
                Item::default()
                    .with("number", Value::plain((n + 1).to_string()))
                    .with("text", Value::plain(policy.as_str()))
            })
            .collect();
        let steps = context.steps().iter().map(|step| step_item(step, style)).collect();

        Self {
            scalars,
            lists: BTreeMap::from([
                ("abbreviations".to_string(), abbreviations),
                ("references".to_string(), references),
                ("policies".to_string(), policies),
                ("steps".to_string(), steps),
            ]),
        }
    }
}

fn step_item(step: &Step, style: &StyleConfig) -> Item {
    let reference_style = RunStyle::default()
        .bold()
        .sized(style.reference_size())
        .colored(style.reference_color());
    let raci_style = RunStyle::default().sized(style.raci_size());
    let indent = u32::try_from(step.depth())
        .unwrap_or(u32::MAX)
        .saturating_mul(style.branch_indent());

    let description = step
        .narrative()
        .iter()
        .map(|paragraph| RichParagraph {
            text: paragraph.text().to_string(),
            style: match paragraph.emphasis() {
                Emphasis::Title => RunStyle::default().bold().sized(style.title_size()),
                Emphasis::Body => RunStyle::default().sized(style.body_size()),
                Emphasis::Routing => RunStyle::default().bold().italic().sized(style.body_size()),
            },
            indent,
        })
        .collect();

    let raci = step.raci();
    let role = |pick: fn(&sopwright_core::element::Raci) -> &str| {
        Value::styled(raci.map(pick).unwrap_or_default(), raci_style.clone())
    };

    let mut item = Item::default()
        .with(
            "ref",
            Value::styled(step.reference().unwrap_or_default(), reference_style),
        )
        .with("description", Value::Rich(description))
        .with("r", role(|raci| raci.responsible()))
        .with("a", role(|raci| raci.accountable()))
        .with("c", role(|raci| raci.consulted()))
        .with("i", role(|raci| raci.informed()))
        .with(
            "sla",
            Value::styled(
                step.sla().map(|sla| sla.value()).unwrap_or_default(),
                RunStyle::default().sized(style.body_size()),
            ),
        );

    if step.kind().is_decision() || step.kind().is_branch() {
        item.shading = Some(style.gateway_shading().to_string());
    }
    if let Some(sla) = step.sla() {
        item.cell_shading
            .insert("sla".to_string(), style.sla_shading().to_string());
        if let Some(group) = sla.group() {
            item.merge_keys.insert("sla".to_string(), group.to_string());
        }
    }
    item
}

#[cfg(test)]
mod tests {
    use sopwright_core::{
        element::{GatewayKind, Raci, Sla},
        step::{BranchKind, GatewayRole, NarrativeParagraph, StepKind},
    };

    use super::*;

    fn text(value: &Value) -> &str {
        match value {
            Value::Text { text, .. } => text,
            Value::Rich(_) => panic!("expected text"),
        }
    }

    #[test]
    fn test_decision_and_branch_rows_are_shaded() {
        let style = StyleConfig::default();
        let decision = Step::new(
            1,
            StepKind::Gateway {
                kind: GatewayKind::Exclusive,
                role: GatewayRole::Split,
            },
            0,
        );
        let branch = Step::new(
            2,
            StepKind::Branch {
                kind: BranchKind::Exclusive,
                label: "Yes".to_string(),
            },
            0,
        );
        let task = Step::new(3, StepKind::Task, 1);

        assert_eq!(step_item(&decision, &style).shading.as_deref(), Some("D9D9D9"));
        assert_eq!(step_item(&branch, &style).shading.as_deref(), Some("D9D9D9"));
        assert_eq!(step_item(&task, &style).shading, None);
    }

    #[test]
    fn test_step_fields() {
        let style = StyleConfig::default();
        let step = Step::new(4, StepKind::Task, 2)
            .with_reference("3A")
            .with_raci(Raci::new("Clerk", "Manager", "N/A", "Finance"))
            .with_sla(Sla::grouped("2 days", "Group_1"))
            .with_narrative(vec![
                NarrativeParagraph::title("Check Invoice"),
                NarrativeParagraph::body("The Clerk shall check the invoice."),
            ]);
        let item = step_item(&step, &style);

        assert_eq!(text(&item.fields["ref"]), "3A");
        assert_eq!(text(&item.fields["a"]), "Manager");
        assert_eq!(text(&item.fields["sla"]), "2 days");
        assert_eq!(item.cell_shading["sla"], "F2F2F2");
        assert_eq!(item.merge_keys["sla"], "Group_1");

        let Value::Rich(paragraphs) = &item.fields["description"] else {
            panic!("description is rich");
        };
        assert_eq!(paragraphs.len(), 2);
        assert!(paragraphs[0].style.bold);
        assert_eq!(paragraphs[1].indent, 720);
    }

    #[test]
    fn test_context_lists() {
        let context = DocumentContext::new(BTreeMap::new(), Vec::new())
            .with_policies(vec!["First.".to_string(), "Second.".to_string()]);
        let data = MergeData::from_context(&context, &StyleConfig::default());

        assert_eq!(data.lists.len(), 4);
        assert_eq!(text(&data.lists["policies"][1].fields["number"]), "2");
        assert!(data.lists["steps"].is_empty());
    }
}
