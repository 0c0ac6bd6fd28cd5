//! Diagram interchange bounds and group-level SLAs.
//!
//! A group carries an SLA for every element drawn inside it. Containment
//! is decided on the element's centre point, using the shapes of the BPMN
//! diagram interchange section.

use std::collections::HashMap;

use log::debug;
use roxmltree::Node;

use sopwright_core::element::Sla;

use crate::{
    kind::{BPMN_DI, DC, is_bpmn},
    text::{self, FORMAT_SLA},
};

/// Axis-aligned bounds of a shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Bounds {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

impl Bounds {
    pub(crate) fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    fn contains(&self, (px, py): (f64, f64)) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }
}

/// A group that declares an SLA.
#[derive(Debug, Clone)]
pub(crate) struct SlaGroup {
    id: String,
    value: String,
    bounds: Bounds,
}

/// Shape bounds and SLA groups of one document.
#[derive(Debug, Default)]
pub(crate) struct Layout {
    shapes: HashMap<String, Bounds>,
    groups: Vec<SlaGroup>,
}

impl Layout {
    /// Collects every `BPMNShape` and every group with an SLA.
    pub(crate) fn read(root: Node<'_, '_>) -> Self {
        let shapes: HashMap<String, Bounds> = root
            .descendants()
            .filter(|n| {
                n.is_element()
                    && n.tag_name().namespace() == Some(BPMN_DI)
                    && n.tag_name().name() == "BPMNShape"
            })
            .filter_map(|shape| {
                let element = shape.attribute("bpmnElement")?;
                let bounds = shape.children().find(|n| {
                    n.is_element()
                        && n.tag_name().namespace() == Some(DC)
                        && n.tag_name().name() == "Bounds"
                })?;
                Some((element.to_string(), parse_bounds(bounds)?))
            })
            .collect();

        let groups = root
            .descendants()
            .filter(|n| is_bpmn(*n, "group"))
            .filter_map(|group| {
                let id = group.attribute("id")?;
                let value = text::documentation(group, Some(FORMAT_SLA))?;
                let Some(bounds) = shapes.get(id) else {
                    debug!(group = id; "SLA group has no diagram shape");
                    return None;
                };
                Some(SlaGroup {
                    id: id.to_string(),
                    value: text::collapse_whitespace(&value),
                    bounds: *bounds,
                })
            })
            .collect();

        Self { shapes, groups }
    }

    /// The SLA of the first group whose bounds contain the element's centre.
    pub(crate) fn group_sla(&self, element_id: &str) -> Option<Sla> {
        let center = self.shapes.get(element_id)?.center();
        self.groups
            .iter()
            .find(|group| group.bounds.contains(center))
            .map(|group| Sla::grouped(group.value.clone(), group.id.clone()))
    }
}

fn parse_bounds(node: Node<'_, '_>) -> Option<Bounds> {
    let number = |name: &str| node.attribute(name)?.trim().parse::<f64>().ok();
    Some(Bounds::new(
        number("x")?,
        number("y")?,
        number("width")?,
        number("height")?,
    ))
}

#[cfg(test)]
mod tests {
    use roxmltree::Document;

    use super::*;

    const XML: &str = r#"<definitions xmlns="http://www.omg.org/spec/BPMN/20100524/MODEL"
        xmlns:bpmndi="http://www.omg.org/spec/BPMN/20100524/DI"
        xmlns:dc="http://www.omg.org/spec/DD/20100524/DC">
      <process id="p">
        <task id="inside"/>
        <task id="outside"/>
        <group id="g1"><documentation textFormat="application/x-sla">3 days</documentation></group>
      </process>
      <bpmndi:BPMNDiagram><bpmndi:BPMNPlane bpmnElement="p">
        <bpmndi:BPMNShape bpmnElement="inside"><dc:Bounds x="120" y="100" width="100" height="80"/></bpmndi:BPMNShape>
        <bpmndi:BPMNShape bpmnElement="outside"><dc:Bounds x="600" y="100" width="100" height="80"/></bpmndi:BPMNShape>
        <bpmndi:BPMNShape bpmnElement="g1"><dc:Bounds x="100" y="80" width="300" height="200"/></bpmndi:BPMNShape>
      </bpmndi:BPMNPlane></bpmndi:BPMNDiagram>
    </definitions>"#;

    #[test]
    fn test_group_sla_by_centre_containment() {
        let doc = Document::parse(XML).unwrap();
        let layout = Layout::read(doc.root_element());

        let sla = layout.group_sla("inside").unwrap();
        assert_eq!(sla.value(), "3 days");
        assert_eq!(sla.group(), Some("g1"));
        assert!(layout.group_sla("outside").is_none());
        assert!(layout.group_sla("missing").is_none());
    }

    #[test]
    fn test_bounds_contains_edges() {
        let bounds = Bounds::new(0.0, 0.0, 10.0, 10.0);
        assert!(bounds.contains((10.0, 0.0)));
        assert!(!bounds.contains((10.5, 5.0)));
    }
}
