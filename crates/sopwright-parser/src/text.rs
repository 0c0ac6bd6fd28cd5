//! Text normalization for labels and documentation.

use std::sync::OnceLock;

use regex::Regex;
use roxmltree::Node;

use crate::kind::BPMN_MODEL;

/// `textFormat` of documentation carrying an SLA.
pub(crate) const FORMAT_SLA: &str = "application/x-sla";
pub(crate) const FORMAT_SCOPE: &str = "application/x-scope";
pub(crate) const FORMAT_POLICY: &str = "application/x-policy";
pub(crate) const FORMAT_RESPONSIBLE: &str = "application/x-responsible";
pub(crate) const FORMAT_ACCOUNTABLE: &str = "application/x-accountable";
pub(crate) const FORMAT_CONSULTED: &str = "application/x-consulted";
pub(crate) const FORMAT_INFORMED: &str = "application/x-informed";

/// Leading step numbers such as `"3. "`, `"12) "` or `"4: "`.
fn step_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*\d+\s*[.:)\-](?:\s+|$)").expect("Step prefix pattern is valid"))
}

/// Collapses runs of whitespace (including line breaks) into single spaces.
pub(crate) fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalizes an element label: whitespace collapsed, step number removed.
pub(crate) fn normalize_label(raw: &str) -> String {
    let collapsed = collapse_whitespace(raw);
    step_prefix().replace(&collapsed, "").into_owned()
}

/// Normalizes a lane name: whitespace collapsed, combining marks removed.
pub(crate) fn normalize_lane_name(raw: &str) -> String {
    collapse_whitespace(&raw.chars().filter(|c| !is_combining_mark(*c)).collect::<String>())
}

fn is_combining_mark(c: char) -> bool {
    matches!(
        c,
        '\u{0300}'..='\u{036F}'
            | '\u{1AB0}'..='\u{1AFF}'
            | '\u{1DC0}'..='\u{1DFF}'
            | '\u{20D0}'..='\u{20FF}'
            | '\u{FE20}'..='\u{FE2F}'
    )
}

/// Trims every line and drops blank ones.
pub(crate) fn normalize_block(raw: &str) -> String {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Reads the `documentation` children of `node` with the given `textFormat`.
///
/// `None` selects plain documentation (no format, or `text/plain`). Multiple
/// matching entries are joined with newlines. Returns `None` when nothing
/// non-blank matches.
pub(crate) fn documentation(node: Node<'_, '_>, format: Option<&str>) -> Option<String> {
    let parts: Vec<String> = node
        .children()
        .filter(|child| {
            child.is_element()
                && child.tag_name().namespace() == Some(BPMN_MODEL)
                && child.tag_name().name() == "documentation"
        })
        .filter(|child| {
            let declared = child.attribute("textFormat").map(str::trim);
            match (format, declared) {
                (None, None | Some("") | Some("text/plain")) => true,
                (Some(wanted), Some(declared)) => wanted == declared,
                _ => false,
            }
        })
        .map(|child| {
            let text: String = child
                .descendants()
                .filter(|n| n.is_text())
                .filter_map(|n| n.text())
                .collect();
            normalize_block(&text)
        })
        .filter(|text| !text.is_empty())
        .collect();

    (!parts.is_empty()).then(|| parts.join("\n"))
}
