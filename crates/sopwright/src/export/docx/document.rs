//! Paragraph and run helpers over the WordprocessingML tree.

use super::xml::{XmlElement, XmlNode};

/// Returns `true` for a run holding only properties and plain text content.
fn is_text_run(run: &XmlElement) -> bool {
    run.name == "w:r"
        && run
            .elements()
            .all(|child| matches!(child.name.as_str(), "w:rPr" | "w:t" | "w:tab" | "w:br"))
}

/// The text of a run; tabs and line breaks map to `\t` and `\n`.
pub(super) fn run_text(run: &XmlElement) -> String {
    let mut text = String::new();
    for child in run.elements() {
        match child.name.as_str() {
            "w:t" => text.push_str(&child.text()),
            "w:tab" => text.push('\t'),
            "w:br" => text.push('\n'),
            _ => {}
        }
    }
    text
}

/// Replaces the content of `run`, keeping its properties.
pub(super) fn set_run_text(run: &mut XmlElement, text: &str) {
    run.children.retain(|child| child.is("w:rPr"));
    for (n, line) in text.split('\n').enumerate() {
        if n > 0 {
            run.children.push(XmlNode::Element(XmlElement::new("w:br")));
        }
        for (m, segment) in line.split('\t').enumerate() {
            if m > 0 {
                run.children.push(XmlNode::Element(XmlElement::new("w:tab")));
            }
            if !segment.is_empty() {
                run.children.push(XmlNode::Element(
                    XmlElement::new("w:t")
                        .with_attribute("xml:space", "preserve")
                        .with_text(segment),
                ));
            }
        }
    }
}

/// A run with optional properties and the given text.
pub(super) fn text_run(properties: Option<&XmlElement>, text: &str) -> XmlElement {
    let mut run = XmlElement::new("w:r");
    if let Some(properties) = properties {
        run.children.push(XmlNode::Element(properties.clone()));
    }
    set_run_text(&mut run, text);
    run
}

/// Merges runs so that placeholders are not split across them.
///
/// Proofing marks are dropped and adjacent text runs with identical
/// properties merged. If `split` still reports a placeholder spanning two
/// runs, the paragraph's text runs are collapsed into the first one.
pub(super) fn normalize_paragraph(paragraph: &mut XmlElement, split: impl Fn(&XmlElement) -> bool) {
    paragraph.children.retain(|child| !child.is("w:proofErr"));

    let mut merged: Vec<XmlNode> = Vec::with_capacity(paragraph.children.len());
    for node in std::mem::take(&mut paragraph.children) {
        if let XmlNode::Element(run) = &node {
            if let Some(previous) = merged.last_mut().and_then(XmlNode::as_element_mut) {
                if is_text_run(previous)
                    && is_text_run(run)
                    && previous.child("w:rPr") == run.child("w:rPr")
                {
                    let text = run_text(previous) + &run_text(run);
                    set_run_text(previous, &text);
                    continue;
                }
            }
        }
        merged.push(node);
    }
    paragraph.children = merged;

    if !split(paragraph) || !paragraph.elements().filter(|e| e.name == "w:r").all(is_text_run) {
        return;
    }
    let text = paragraph_text(paragraph);
    let mut first = true;
    paragraph.children.retain_mut(|child| {
        let Some(run) = child.as_element_mut().filter(|e| e.name == "w:r") else {
            return true;
        };
        if first {
            first = false;
            set_run_text(run, &text);
            true
        } else {
            false
        }
    });
}

/// The text of the direct runs of a paragraph.
pub(super) fn paragraph_text(paragraph: &XmlElement) -> String {
    paragraph
        .elements()
        .filter(|element| element.name == "w:r")
        .map(run_text)
        .collect()
}

/// Applies `f` to every paragraph below `element`, including table cells.
pub(super) fn for_each_paragraph(element: &mut XmlElement, f: &mut impl FnMut(&mut XmlElement)) {
    for child in element.elements_mut() {
        if child.name == "w:p" {
            f(child);
        } else {
            for_each_paragraph(child, f);
        }
    }
}

/// Removes the runs of every paragraph in a table cell.
pub(super) fn clear_cell(cell: &mut XmlElement) {
    for_each_paragraph(cell, &mut |paragraph| {
        paragraph.children.retain(|child| !child.is("w:r"));
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(bold: bool, text: &str) -> XmlElement {
        let mut properties = XmlElement::new("w:rPr");
        if bold {
            properties = properties.with_child(XmlElement::new("w:b"));
        }
        text_run(Some(&properties), text)
    }

    fn paragraph(runs: Vec<XmlElement>) -> XmlElement {
        let mut paragraph = XmlElement::new("w:p").with_child(XmlElement::new("w:proofErr"));
        for run in runs {
            paragraph = paragraph.with_child(run);
        }
        paragraph
    }

    #[test]
    fn test_run_text_maps_breaks_and_tabs() {
        let run = text_run(None, "1. A\n2.\tB");

        assert_eq!(run_text(&run), "1. A\n2.\tB");
        assert!(run.child("w:br").is_some());
        assert!(run.child("w:tab").is_some());
    }

    #[test]
    fn test_identical_runs_are_merged() {
        let mut p = paragraph(vec![run(false, "{{pro"), run(false, "cess_name}}"), run(true, "!")]);
        normalize_paragraph(&mut p, |_| false);

        let runs: Vec<_> = p.elements().filter(|e| e.name == "w:r").map(run_text).collect();
        assert_eq!(runs, ["{{process_name}}", "!"]);
        assert!(p.child("w:proofErr").is_none());
    }

    #[test]
    fn test_split_placeholder_collapses_runs() {
        let mut p = paragraph(vec![run(true, "{{pro"), run(false, "cess_name}}")]);
        normalize_paragraph(&mut p, |_| true);

        let runs: Vec<_> = p.elements().filter(|e| e.name == "w:r").collect();
        assert_eq!(runs.len(), 1);
        assert_eq!(run_text(runs[0]), "{{process_name}}");
        assert!(runs[0].child("w:rPr").unwrap().child("w:b").is_some());
    }

    #[test]
    fn test_clear_cell_keeps_paragraphs() {
        let mut cell = XmlElement::new("w:tc").with_child(paragraph(vec![run(false, "2 days")]));
        clear_cell(&mut cell);

        assert_eq!(cell.elements().count(), 1);
        assert_eq!(cell.text(), "");
    }
}
