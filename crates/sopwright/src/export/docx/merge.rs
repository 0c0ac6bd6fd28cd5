//! Placeholder engine.
//!
//! Placeholders recognized in `word/document.xml`:
//!
//! | Form | Meaning |
//! |------|---------|
//! | `{{name}}` | scalar value |
//! | `{{list.field}}` | field of a list item; its table row (or its paragraph, outside tables) repeats per item |
//! | `{{#if name}}` ... `{{/if}}` | paragraphs on their own delimiting a section kept only when `name` is non-empty |
//!
//! A placeholder alone in its paragraph whose value is rich text expands into
//! one paragraph per value paragraph.

use std::{collections::BTreeSet, sync::OnceLock};

use log::{debug, trace};
use regex::Regex;

use sopwright_core::document::{Warning, WarningKind};

use super::{
    content::{Item, MergeData, RichParagraph, Value},
    document::{
        clear_cell, for_each_paragraph, normalize_paragraph, paragraph_text, run_text,
        set_run_text, text_run,
    },
    properties::{self, RunStyle, VerticalMerge},
    xml::{XmlElement, XmlNode},
};

type Scope<'a> = Option<(&'a str, &'a Item)>;

fn placeholder_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*)?)\s*\}\}")
            .expect("Placeholder pattern is valid")
    })
}

fn section_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\{\{\s*(?:#if\s+([A-Za-z_][A-Za-z0-9_]*)|(/if))\s*\}\}$")
            .expect("Section pattern is valid")
    })
}

enum Marker<'t> {
    Open(&'t str),
    Close,
}

fn section_marker(text: &str) -> Option<Marker<'_>> {
    let captures = section_pattern().captures(text.trim())?;
    match (captures.get(1), captures.get(2)) {
        (Some(name), _) => Some(Marker::Open(name.as_str())),
        (None, Some(_)) => Some(Marker::Close),
        (None, None) => None,
    }
}

/// Fills a document body from [`MergeData`].
pub(super) struct Merger<'a> {
    data: &'a MergeData,
    font: &'a str,
    used: BTreeSet<&'a str>,
    missing: BTreeSet<String>,
}

impl<'a> Merger<'a> {
    pub(super) fn new(data: &'a MergeData, font: &'a str) -> Self {
        Self {
            data,
            font,
            used: BTreeSet::new(),
            missing: BTreeSet::new(),
        }
    }

    /// Merges into `body` and returns the mismatches between template and data.
    pub(super) fn merge(mut self, body: &mut XmlElement) -> Vec<Warning> {
        for_each_paragraph(body, &mut |paragraph| {
            normalize_paragraph(paragraph, has_split_placeholder);
        });
        self.sections(&mut body.children);
        self.expand(&mut body.children, None);

        let mut warnings = Vec::new();
        for name in &self.missing {
            warnings.push(Warning::new(
                WarningKind::RenderMismatch,
                format!("template placeholder `{{{{{name}}}}}` has no value and renders empty"),
            ));
        }
        let unused = self
            .data
            .scalars
            .keys()
            .chain(self.data.lists.keys())
            .filter(|name| !self.used.contains(name.as_str()));
        for name in unused {
            warnings.push(Warning::new(
                WarningKind::RenderMismatch,
                format!("`{name}` is not used by the template"),
            ));
        }
        debug!(
            used = self.used.len(),
            missing = self.missing.len(),
            warnings = warnings.len();
            "Template merged"
        );
        warnings
    }

    /// Resolves conditional sections, innermost containers first.
    fn sections(&mut self, nodes: &mut Vec<XmlNode>) {
        for element in nodes.iter_mut().filter_map(XmlNode::as_element_mut) {
            if element.name != "w:p" {
                self.sections(&mut element.children);
            }
        }

        // One entry per open section: `true` when the section is dropped.
        let mut dropped: Vec<bool> = Vec::new();
        for node in std::mem::take(nodes) {
            if let Some(paragraph) = node.as_element().filter(|e| e.name == "w:p") {
                match section_marker(&paragraph.text()) {
                    Some(Marker::Open(name)) => {
                        let keep = !self.is_empty(name);
                        trace!(section = name, keep; "Conditional section");
                        dropped.push(!keep);
                        continue;
                    }
                    Some(Marker::Close) => {
                        dropped.pop();
                        continue;
                    }
                    None => {}
                }
            }
            if !dropped.iter().any(|drop| *drop) {
                nodes.push(node);
            }
        }
    }

    fn is_empty(&mut self, name: &str) -> bool {
        if let Some((key, items)) = self.data.lists.get_key_value(name) {
            self.used.insert(key.as_str());
            return items.is_empty();
        }
        if let Some((key, value)) = self.data.scalars.get_key_value(name) {
            self.used.insert(key.as_str());
            return value.is_empty();
        }
        self.missing.insert(format!("#if {name}"));
        true
    }

    fn expand(&mut self, nodes: &mut Vec<XmlNode>, scope: Scope<'a>) {
        for node in std::mem::take(nodes) {
            let mut element = match node {
                XmlNode::Element(element) => element,
                text => {
                    nodes.push(text);
                    continue;
                }
            };
            if element.name == "w:p" {
                let repeated = match scope {
                    None => self.repeated_list(&element.text()),
                    Some(_) => None,
                };
                match repeated {
                    Some((list, items)) => {
                        for item in items {
                            let filled = self.fill_paragraph(element.clone(), Some((list, item)));
                            nodes.extend(filled.into_iter().map(XmlNode::Element));
                        }
                    }
                    None => {
                        let filled = self.fill_paragraph(element, scope);
                        nodes.extend(filled.into_iter().map(XmlNode::Element));
                    }
                }
                continue;
            }
            if element.name == "w:tr" && scope.is_none() {
                if let Some((list, items)) = self.repeated_list(&element.text()) {
                    let rows = self.repeat_row(&element, list, items);
                    nodes.extend(rows.into_iter().map(XmlNode::Element));
                    continue;
                }
            }
            self.expand(&mut element.children, scope);
            nodes.push(XmlNode::Element(element));
        }
    }

    /// The list named by the first item placeholder in `text`, if any.
    fn repeated_list(&mut self, text: &str) -> Option<(&'a str, &'a [Item])> {
        let data = self.data;
        let (key, items) = placeholder_pattern()
            .captures_iter(text)
            .filter_map(|captures| captures.get(1))
            .filter_map(|name| name.as_str().split_once('.'))
            .find_map(|(list, _)| data.lists.get_key_value(list))?;
        self.used.insert(key.as_str());
        Some((key.as_str(), items.as_slice()))
    }

    fn repeat_row(&mut self, row: &XmlElement, list: &'a str, items: &'a [Item]) -> Vec<XmlElement> {
        let mut rows = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let mut copy = row.clone();
            for cell in copy.elements_mut().filter(|e| e.name == "w:tc") {
                let field = cell_field(cell, list);
                self.expand(&mut cell.children, Some((list, item)));

                if let Some(fill) = &item.shading {
                    properties::shade_cell(cell, fill);
                }
                let Some(field) = field else {
                    continue;
                };
                if let Some(fill) = item.cell_shading.get(&field) {
                    properties::shade_cell(cell, fill);
                }
                if let Some(key) = item.merge_keys.get(&field) {
                    let same = |other: Option<&Item>| {
                        other.and_then(|other| other.merge_keys.get(&field)) == Some(key)
                    };
                    let previous = index.checked_sub(1).and_then(|at| items.get(at));
                    if same(previous) {
                        properties::merge_cell(cell, VerticalMerge::Continue);
                        clear_cell(cell);
                    } else if same(items.get(index + 1)) {
                        properties::merge_cell(cell, VerticalMerge::Restart);
                    }
                }
            }
            rows.push(copy);
        }
        trace!(list, rows = rows.len(); "Row repeated");
        rows
    }

    /// Substitutes placeholders; returns the paragraphs replacing `paragraph`.
    fn fill_paragraph(&mut self, mut paragraph: XmlElement, scope: Scope<'a>) -> Vec<XmlElement> {
        let text = paragraph.text();
        let placeholders: Vec<String> = placeholder_pattern()
            .captures_iter(&text)
            .filter_map(|captures| captures.get(1))
            .map(|name| name.as_str().to_string())
            .collect();
        if placeholders.is_empty() {
            return vec![paragraph];
        }

        if let [name] = placeholders.as_slice() {
            let alone = placeholder_pattern()
                .find(text.trim())
                .is_some_and(|m| m.range() == (0..text.trim().len()));
            if alone {
                if let Some(Value::Rich(rich)) = self.resolve(name, scope) {
                    return self.rich_paragraphs(&paragraph, rich);
                }
            }
        }

        for run in paragraph.elements_mut().filter(|e| e.name == "w:r") {
            let text = run_text(run);
            if !placeholder_pattern().is_match(&text) {
                continue;
            }
            let mut style = RunStyle::default();
            let mut count = 0;
            let replaced = placeholder_pattern().replace_all(&text, |captures: &regex::Captures<'_>| {
                count += 1;
                match self.resolve(&captures[1], scope) {
                    Some(Value::Text { text, style: own }) => {
                        style = own.clone();
                        text.clone()
                    }
                    Some(rich) => rich.inline_text(),
                    None => String::new(),
                }
            });
            let replaced = replaced.into_owned();
            if count > 1 {
                style = RunStyle::default();
            }
            set_run_text(run, &replaced);
            properties::style_run(run, self.font, &style);
        }
        vec![paragraph]
    }

    fn rich_paragraphs(
        &self,
        template: &XmlElement,
        rich: &[RichParagraph],
    ) -> Vec<XmlElement> {
        let paragraph_properties = template.child("w:pPr");
        let run_properties = template
            .elements()
            .find(|e| e.name == "w:r")
            .and_then(|run| run.child("w:rPr"));

        let base = || {
            let mut paragraph = XmlElement::new("w:p");
            if let Some(properties) = paragraph_properties {
                paragraph = paragraph.with_child(properties.clone());
            }
            paragraph
        };
        if rich.is_empty() {
            return vec![base()];
        }

        rich.iter()
            .map(|line| {
                let mut paragraph = base();
                if line.indent > 0 {
                    properties::indent_paragraph(&mut paragraph, line.indent);
                }
                let mut run = text_run(run_properties, &line.text);
                properties::style_run(&mut run, self.font, &line.style);
                paragraph.with_child(run)
            })
            .collect()
    }

    fn resolve(&mut self, name: &str, scope: Scope<'a>) -> Option<&'a Value> {
        let found = match name.split_once('.') {
            Some((list, field)) => scope
                .filter(|(scoped, _)| *scoped == list)
                .and_then(|(_, item)| item.fields.get(field)),
            None => self.data.scalars.get_key_value(name).map(|(key, value)| {
                self.used.insert(key.as_str());
                value
            }),
        };
        if found.is_none() {
            self.missing.insert(name.to_string());
        }
        found
    }
}

/// Returns `true` if the paragraph holds a placeholder no single run holds.
fn has_split_placeholder(paragraph: &XmlElement) -> bool {
    let count = |text: &str| placeholder_pattern().find_iter(text).count();
    let whole = count(&paragraph_text(paragraph));
    let per_run: usize = paragraph
        .elements()
        .filter(|e| e.name == "w:r")
        .map(|run| count(&run_text(run)))
        .sum();
    whole > per_run
}

/// The field of the first `list.field` placeholder in a cell.
fn cell_field(cell: &XmlElement, list: &str) -> Option<String> {
    let text = cell.text();
    placeholder_pattern()
        .captures_iter(&text)
        .filter_map(|captures| captures.get(1))
        .filter_map(|name| name.as_str().split_once('.'))
        .find(|(owner, _)| *owner == list)
        .map(|(_, field)| field.to_string())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::export::docx::xml::XmlDocument;

    fn body(inner: &str) -> XmlElement {
        let source = format!(
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{inner}</w:body></w:document>"#
        );
        let mut document = XmlDocument::parse("word/document.xml", &source).unwrap();
        document.root.find_mut("w:body").unwrap().clone()
    }

    fn p(text: &str) -> String {
        format!("<w:p><w:r><w:t>{text}</w:t></w:r></w:p>")
    }

    fn texts(body: &XmlElement) -> Vec<String> {
        let mut out = Vec::new();
        let mut body = body.clone();
        for_each_paragraph(&mut body, &mut |paragraph| out.push(paragraph.text()));
        out
    }

    fn plain(text: &str) -> Value {
        Value::Text {
            text: text.to_string(),
            style: RunStyle::default(),
        }
    }

    fn item(fields: &[(&str, &str)]) -> Item {
        Item {
            fields: fields
                .iter()
                .map(|(name, value)| (name.to_string(), plain(value)))
                .collect(),
            ..Item::default()
        }
    }

    fn data() -> MergeData {
        MergeData {
            scalars: BTreeMap::from([("name".to_string(), plain("Purchase Request"))]),
            lists: BTreeMap::from([
                ("empty".to_string(), Vec::new()),
                (
                    "terms".to_string(),
                    vec![item(&[("term", "PO")]), item(&[("term", "SLA")])],
                ),
            ]),
        }
    }

    #[test]
    fn test_scalar_substitution_keeps_surrounding_text() {
        let data = data();
        let mut body = body(&p("Title: {{ name }}!"));
        let warnings = Merger::new(&data, "Arial").merge(&mut body);

        assert_eq!(texts(&body), ["Title: Purchase Request!"]);
        // Both lists are unused.
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn test_placeholder_split_by_editor_is_found() {
        let data = data();
        let mut body = body(
            "<w:p><w:r><w:rPr><w:b/></w:rPr><w:t>{{na</w:t></w:r><w:proofErr/><w:r><w:t>me}}</w:t></w:r></w:p>",
        );
        Merger::new(&data, "Arial").merge(&mut body);

        assert_eq!(texts(&body), ["Purchase Request"]);
    }

    #[test]
    fn test_paragraph_repeats_per_item() {
        let data = data();
        let mut body = body(&format!("{}{}", p("- {{terms.term}}"), p("{{empty.x}}")));
        Merger::new(&data, "Arial").merge(&mut body);

        assert_eq!(texts(&body), ["- PO", "- SLA"]);
    }

    #[test]
    fn test_row_repeats_per_item() {
        let data = data();
        let row = format!("<w:tr><w:tc>{}</w:tc></w:tr>", p("{{terms.term}}"));
        let header = format!("<w:tr><w:tc>{}</w:tc></w:tr>", p("Term"));
        let mut body = body(&format!("<w:tbl>{header}{row}</w:tbl>"));
        Merger::new(&data, "Arial").merge(&mut body);

        assert_eq!(texts(&body), ["Term", "PO", "SLA"]);
    }

    #[test]
    fn test_empty_section_is_removed() {
        let data = data();
        let inner = [
            p("{{#if empty}}"),
            p("Heading"),
            p("{{/if}}"),
            p("{{#if terms}}"),
            p("Kept"),
            p("{{/if}}"),
        ]
        .concat();
        let mut body = body(&inner);
        Merger::new(&data, "Arial").merge(&mut body);

        assert_eq!(texts(&body), ["Kept"]);
    }

    #[test]
    fn test_missing_placeholder_renders_empty_with_warning() {
        let data = data();
        let mut body = body(&format!("{}{}", p("[{{unknown}}]"), p("{{name}}")));
        let warnings = Merger::new(&data, "Arial").merge(&mut body);

        assert_eq!(texts(&body), ["[]", "Purchase Request"]);
        assert!(
            warnings
                .iter()
                .any(|w| w.kind() == WarningKind::RenderMismatch && w.message().contains("{{unknown}}"))
        );
    }

    #[test]
    fn test_rich_value_expands_into_paragraphs() {
        let mut data = data();
        data.lists.insert(
            "steps".to_string(),
            vec![Item {
                fields: BTreeMap::from([(
                    "description".to_string(),
                    Value::Rich(vec![
                        RichParagraph {
                            text: "Approve".to_string(),
                            style: RunStyle::default().bold(),
                            indent: 360,
                        },
                        RichParagraph {
                            text: "The Approver shall approve.".to_string(),
                            style: RunStyle::default(),
                            indent: 360,
                        },
                    ]),
                )]),
                ..Item::default()
            }],
        );
        let row = format!("<w:tr><w:tc>{}</w:tc></w:tr>", p("{{steps.description}}"));
        let mut body = body(&format!("<w:tbl>{row}</w:tbl>"));
        Merger::new(&data, "Arial").merge(&mut body);

        assert_eq!(texts(&body), ["Approve", "The Approver shall approve."]);
        let cell = body.find_mut("w:tc").unwrap();
        let first = cell.child("w:p").unwrap();
        let indent = first.child("w:pPr").unwrap().child("w:ind").unwrap();
        assert_eq!(indent.attribute("w:left"), Some("360"));
    }

    #[test]
    fn test_grouped_cells_merge_vertically() {
        let mut data = data();
        let grouped = |sla: &str| {
            let mut item = item(&[("sla", sla)]);
            item.merge_keys.insert("sla".to_string(), "g1".to_string());
            item
        };
        data.lists.insert(
            "steps".to_string(),
            vec![grouped("2 days"), grouped("2 days"), item(&[("sla", "")])],
        );
        let row = format!("<w:tr><w:tc>{}</w:tc></w:tr>", p("{{steps.sla}}"));
        let mut body = body(&format!("<w:tbl>{row}</w:tbl>"));
        Merger::new(&data, "Arial").merge(&mut body);

        let table = body.child("w:tbl").unwrap();
        let merges: Vec<_> = table
            .elements()
            .map(|row| {
                row.child("w:tc")
                    .and_then(|cell| cell.child("w:tcPr"))
                    .and_then(|properties| properties.child("w:vMerge"))
                    .map(|merge| merge.attribute("w:val").unwrap_or("continue"))
            })
            .collect();
        assert_eq!(merges, [Some("restart"), Some("continue"), None]);
        assert_eq!(texts(&body), ["2 days", "", ""]);
    }
}
