//! Owned XML tree for template parts.
//!
//! Names are kept qualified (`w:p`) exactly as the part spells them, and
//! namespace declarations are kept as ordinary attributes, so serializing an
//! unmodified tree reproduces the part's content. Comments and processing
//! instructions are dropped.

use std::fmt::Write;

use super::super::Error;

const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum XmlNode {
    Element(XmlElement),
    Text(String),
}

impl XmlNode {
    pub(super) fn as_element(&self) -> Option<&XmlElement> {
        match self {
            XmlNode::Element(element) => Some(element),
            XmlNode::Text(_) => None,
        }
    }

    pub(super) fn as_element_mut(&mut self) -> Option<&mut XmlElement> {
        match self {
            XmlNode::Element(element) => Some(element),
            XmlNode::Text(_) => None,
        }
    }

    /// Returns `true` for an element with the qualified `name`.
    pub(super) fn is(&self, name: &str) -> bool {
        self.as_element().is_some_and(|element| element.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct XmlElement {
    pub(super) name: String,
    pub(super) attributes: Vec<(String, String)>,
    pub(super) children: Vec<XmlNode>,
}

impl XmlElement {
    pub(super) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub(super) fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub(super) fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(XmlNode::Element(child));
        self
    }

    pub(super) fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(XmlNode::Text(text.into()));
        self
    }

    #[cfg(test)]
    pub(super) fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub(super) fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub(super) fn child(&self, name: &str) -> Option<&XmlElement> {
        self.elements().find(|element| element.name == name)
    }

    pub(super) fn child_mut(&mut self, name: &str) -> Option<&mut XmlElement> {
        self.elements_mut().find(|element| element.name == name)
    }

    pub(super) fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(XmlNode::as_element)
    }

    pub(super) fn elements_mut(&mut self) -> impl Iterator<Item = &mut XmlElement> {
        self.children.iter_mut().filter_map(XmlNode::as_element_mut)
    }

    /// Concatenated character data of this element and its descendants.
    pub(super) fn text(&self) -> String {
        let mut text = String::new();
        self.collect_text(&mut text);
        text
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                XmlNode::Text(text) => out.push_str(text),
                XmlNode::Element(element) => element.collect_text(out),
            }
        }
    }

    /// Depth-first search for the first descendant named `name`.
    #[cfg(test)]
    pub(super) fn find_mut(&mut self, name: &str) -> Option<&mut XmlElement> {
        for element in self.elements_mut() {
            if element.name == name {
                return Some(element);
            }
            if let Some(found) = element.find_mut(name) {
                return Some(found);
            }
        }
        None
    }

    fn write_to(&self, out: &mut String) {
        let _ = write!(out, "<{}", self.name);
        for (name, value) in &self.attributes {
            let _ = write!(out, " {name}=\"{}\"", escape(value, true));
        }
        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for child in &self.children {
            match child {
                XmlNode::Text(text) => out.push_str(&escape(text, false)),
                XmlNode::Element(element) => element.write_to(out),
            }
        }
        let _ = write!(out, "</{}>", self.name);
    }
}

/// A parsed XML part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct XmlDocument {
    pub(super) root: XmlElement,
}

impl XmlDocument {
    /// Parses a part into an owned tree.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Xml`] if the part is not well-formed.
    pub(super) fn parse(part: &str, source: &str) -> Result<Self, Error> {
        let document = roxmltree::Document::parse(source)
            .map_err(|err| Error::Xml(format!("`{part}`: {err}")))?;
        let root = convert(document.root_element(), None);
        Ok(Self { root })
    }

    /// Serializes the tree with a standalone XML declaration.
    pub(super) fn to_xml(&self) -> String {
        let mut out =
            String::from("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\r\n");
        self.root.write_to(&mut out);
        out
    }
}

fn convert(node: roxmltree::Node<'_, '_>, parent: Option<roxmltree::Node<'_, '_>>) -> XmlElement {
    let mut element = XmlElement::new(qualified(node, node.tag_name().namespace(), node.tag_name().name()));

    for namespace in node.namespaces() {
        let inherited = parent.is_some_and(|parent| {
            parent
                .namespaces()
                .any(|outer| outer.name() == namespace.name() && outer.uri() == namespace.uri())
        });
        if inherited || namespace.uri() == XML_NAMESPACE {
            continue;
        }
        let declaration = match namespace.name() {
            Some(prefix) => format!("xmlns:{prefix}"),
            None => "xmlns".to_string(),
        };
        element.attributes.push((declaration, namespace.uri().to_string()));
    }
    for attribute in node.attributes() {
        let name = qualified(node, attribute.namespace(), attribute.name());
        element.attributes.push((name, attribute.value().to_string()));
    }

    for child in node.children() {
        if child.is_element() {
            element.children.push(XmlNode::Element(convert(child, Some(node))));
        } else if child.is_text() {
            if let Some(text) = child.text() {
                element.children.push(XmlNode::Text(text.to_string()));
            }
        }
    }
    element
}

fn qualified(node: roxmltree::Node<'_, '_>, namespace: Option<&str>, local: &str) -> String {
    let Some(uri) = namespace else {
        return local.to_string();
    };
    if uri == XML_NAMESPACE {
        return format!("xml:{local}");
    }
    let prefix = node
        .namespaces()
        .filter(|candidate| candidate.uri() == uri)
        .find_map(|candidate| candidate.name());
    match prefix {
        Some(prefix) => format!("{prefix}:{local}"),
        None => local.to_string(),
    }
}

fn escape(text: &str, attribute: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
