//! Schema-ordered edits of run, paragraph and cell properties.
//!
//! WordprocessingML requires the children of `w:rPr`, `w:pPr` and `w:tcPr`
//! to appear in a fixed order. Setters replace an existing child of the same
//! name or insert the new one at its schema position, leaving unknown
//! children untouched.

use super::xml::{XmlElement, XmlNode};

const RUN_ORDER: &[&str] = &[
    "w:rStyle", "w:rFonts", "w:b", "w:bCs", "w:i", "w:iCs", "w:caps", "w:smallCaps", "w:strike",
    "w:dstrike", "w:outline", "w:shadow", "w:emboss", "w:imprint", "w:noProof", "w:snapToGrid",
    "w:vanish", "w:webHidden", "w:color", "w:spacing", "w:w", "w:kern", "w:position", "w:sz",
    "w:szCs", "w:highlight", "w:u", "w:effect", "w:bdr", "w:shd", "w:fitText", "w:vertAlign",
    "w:rtl", "w:cs", "w:em", "w:lang", "w:eastAsianLayout", "w:specVanish", "w:oMath",
];

const PARAGRAPH_ORDER: &[&str] = &[
    "w:pStyle", "w:keepNext", "w:keepLines", "w:pageBreakBefore", "w:framePr", "w:widowControl",
    "w:numPr", "w:suppressLineNumbers", "w:pBdr", "w:shd", "w:tabs", "w:suppressAutoHyphens",
    "w:kinsoku", "w:wordWrap", "w:overflowPunct", "w:topLinePunct", "w:autoSpaceDE",
    "w:autoSpaceDN", "w:bidi", "w:adjustRightInd", "w:snapToGrid", "w:spacing", "w:ind",
    "w:contextualSpacing", "w:mirrorIndents", "w:suppressOverlap", "w:jc", "w:textDirection",
    "w:textAlignment", "w:textboxTightWrap", "w:outlineLvl", "w:divId", "w:cnfStyle", "w:rPr",
    "w:sectPr", "w:pPrChange",
];

const CELL_ORDER: &[&str] = &[
    "w:cnfStyle", "w:tcW", "w:gridSpan", "w:hMerge", "w:vMerge", "w:tcBorders", "w:shd",
    "w:noWrap", "w:tcMar", "w:textDirection", "w:tcFitText", "w:vAlign", "w:hideMark",
];

/// Direct formatting applied to a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(super) struct RunStyle {
    pub(super) bold: bool,
    pub(super) italic: bool,
    /// Size in points.
    pub(super) size: Option<u32>,
    /// Hex RGB, e.g. `FF0000`.
    pub(super) color: Option<String>,
}

impl RunStyle {
    pub(super) fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub(super) fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub(super) fn sized(mut self, points: u32) -> Self {
        self.size = Some(points);
        self
    }

    pub(super) fn colored(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// Applies the font family and `style` to the properties of `run`.
pub(super) fn style_run(run: &mut XmlElement, font: &str, style: &RunStyle) {
    let properties = properties_of(run, "w:rPr");
    set_ordered(
        properties,
        RUN_ORDER,
        XmlElement::new("w:rFonts")
            .with_attribute("w:ascii", font)
            .with_attribute("w:hAnsi", font)
            .with_attribute("w:eastAsia", font)
            .with_attribute("w:cs", font),
    );
    if style.bold {
        set_ordered(properties, RUN_ORDER, XmlElement::new("w:b"));
        set_ordered(properties, RUN_ORDER, XmlElement::new("w:bCs"));
    }
    if style.italic {
        set_ordered(properties, RUN_ORDER, XmlElement::new("w:i"));
    }
    if let Some(color) = &style.color {
        set_ordered(
            properties,
            RUN_ORDER,
            XmlElement::new("w:color").with_attribute("w:val", color.as_str()),
        );
    }
    if let Some(points) = style.size {
        // Half-points.
        let size = (points * 2).to_string();
        set_ordered(
            properties,
            RUN_ORDER,
            XmlElement::new("w:sz").with_attribute("w:val", size.as_str()),
        );
        set_ordered(
            properties,
            RUN_ORDER,
            XmlElement::new("w:szCs").with_attribute("w:val", size),
        );
    }
}

/// Sets the left indentation of `paragraph` in twips.
pub(super) fn indent_paragraph(paragraph: &mut XmlElement, twips: u32) {
    let properties = properties_of(paragraph, "w:pPr");
    set_ordered(
        properties,
        PARAGRAPH_ORDER,
        XmlElement::new("w:ind").with_attribute("w:left", twips.to_string()),
    );
}

/// Fills the background of `cell` with a hex RGB color.
pub(super) fn shade_cell(cell: &mut XmlElement, fill: &str) {
    let properties = properties_of(cell, "w:tcPr");
    set_ordered(
        properties,
        CELL_ORDER,
        XmlElement::new("w:shd")
            .with_attribute("w:val", "clear")
            .with_attribute("w:color", "auto")
            .with_attribute("w:fill", fill),
    );
}

/// Vertical merge state of a table cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum VerticalMerge {
    /// First cell of a merged range.
    Restart,
    /// Covered by the cell above.
    Continue,
}

pub(super) fn merge_cell(cell: &mut XmlElement, merge: VerticalMerge) {
    let properties = properties_of(cell, "w:tcPr");
    let element = match merge {
        VerticalMerge::Restart => XmlElement::new("w:vMerge").with_attribute("w:val", "restart"),
        VerticalMerge::Continue => XmlElement::new("w:vMerge"),
    };
    set_ordered(properties, CELL_ORDER, element);
}

/// Returns the properties child of `element`, creating it as the first child.
fn properties_of<'a>(element: &'a mut XmlElement, name: &str) -> &'a mut XmlElement {
    let position = match element.children.iter().position(|child| child.is(name)) {
        Some(position) => position,
        None => {
            element.children.insert(0, XmlNode::Element(XmlElement::new(name)));
            0
        }
    };
    match &mut element.children[position] {
        XmlNode::Element(properties) => properties,
        XmlNode::Text(_) => unreachable!("position points at an element"),
    }
}

fn set_ordered(properties: &mut XmlElement, order: &[&str], element: XmlElement) {
    if let Some(existing) = properties.child_mut(&element.name) {
        *existing = element;
        return;
    }
    let rank = |name: &str| order.iter().position(|known| *known == name);
    let Some(own) = rank(&element.name) else {
        properties.children.push(XmlNode::Element(element));
        return;
    };
    let position = properties
        .children
        .iter()
        .position(|child| {
            child
                .as_element()
                .and_then(|child| rank(&child.name))
                .is_some_and(|other| other > own)
        })
        .unwrap_or(properties.children.len());
    properties.children.insert(position, XmlNode::Element(element));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(element: &XmlElement) -> Vec<&str> {
        element.elements().map(|child| child.name.as_str()).collect()
    }

    #[test]
    fn test_run_properties_follow_schema_order() {
        let mut run = XmlElement::new("w:r")
            .with_child(XmlElement::new("w:rPr").with_child(XmlElement::new("w:u")))
            .with_child(XmlElement::new("w:t").with_text("x"));
        style_run(
            &mut run,
            "Arial",
            &RunStyle::default().bold().sized(14).colored("FF0000"),
        );

        let properties = run.child("w:rPr").unwrap();
        assert_eq!(
            names(properties),
            ["w:rFonts", "w:b", "w:bCs", "w:color", "w:sz", "w:szCs", "w:u"]
        );
        assert_eq!(properties.child("w:sz").unwrap().attribute("w:val"), Some("28"));
        assert_eq!(names(&run), ["w:rPr", "w:t"]);
    }

    #[test]
    fn test_existing_property_is_replaced() {
        let mut cell = XmlElement::new("w:tc");
        shade_cell(&mut cell, "D9D9D9");
        shade_cell(&mut cell, "F2F2F2");
        merge_cell(&mut cell, VerticalMerge::Restart);

        let properties = cell.child("w:tcPr").unwrap();
        assert_eq!(names(properties), ["w:vMerge", "w:shd"]);
        assert_eq!(properties.child("w:shd").unwrap().attribute("w:fill"), Some("F2F2F2"));
    }

    #[test]
    fn test_indent_lands_between_style_and_justification() {
        let mut paragraph = XmlElement::new("w:p").with_child(
            XmlElement::new("w:pPr")
                .with_child(XmlElement::new("w:pStyle"))
                .with_child(XmlElement::new("w:jc")),
        );
        indent_paragraph(&mut paragraph, 720);

        let properties = paragraph.child("w:pPr").unwrap();
        assert_eq!(names(properties), ["w:pStyle", "w:ind", "w:jc"]);
        assert_eq!(properties.child("w:ind").unwrap().attribute("w:left"), Some("720"));
    }
}
