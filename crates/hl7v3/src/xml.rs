//! Labeled XML trees.
//!
//! [`XmlElement`] is a small owned element tree. Documents are read into it with
//! `quick-xml`, inspected with slash-separated paths that ignore namespace
//! prefixes, and written back out with the `quick-xml` writer. It keeps element
//! names, attributes, character data and child order; comments and processing
//! instructions are discarded.

use std::borrow::Cow;

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::error::{Hl7v3Error, Result};

/// Deepest element nesting [`XmlElement::parse`] accepts. Trees are walked
/// recursively, so depth is bounded at the input.
pub const MAX_DEPTH: usize = 256;

/// Namespace bound to the `xsi` prefix.
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// An XML element with its attributes, text and children.
///
/// # Examples
///
/// ```
/// use patient_index_hl7v3::xml::XmlElement;
///
/// let doc = XmlElement::parse(
///     r#"<hl7:a xmlns:hl7="urn:hl7-org:v3"><hl7:b><hl7:c root="1.2"/></hl7:b></hl7:a>"#,
/// )
/// .unwrap();
///
/// let c = doc.find("b/c").unwrap();
/// assert_eq!(c.attr("root"), Some("1.2"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<XmlElement>,
}

impl XmlElement {
    /// Creates an empty element. `name` may carry a namespace prefix.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            text: String::new(),
            children: Vec::new(),
        }
    }

    /// Adds an attribute.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Adds a child element.
    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(child);
        self
    }

    /// Adds child elements.
    pub fn with_children(mut self, children: impl IntoIterator<Item = XmlElement>) -> Self {
        self.children.extend(children);
        self
    }

    /// Sets the character data.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Sets an attribute, replacing any previous value.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some(existing) => existing.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// Appends a child element.
    pub fn push_child(&mut self, child: XmlElement) {
        self.children.push(child);
    }

    /// Returns the qualified name as written.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the name without its namespace prefix.
    pub fn local_name(&self) -> &str {
        local_part(&self.name)
    }

    /// Returns the value of the attribute whose local name is `name`.
    ///
    /// Namespace declarations are never matched.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .filter(|(key, _)| !is_namespace_declaration(key))
            .find(|(key, _)| local_part(key) == name)
            .map(|(_, value)| value.as_str())
    }

    /// Returns all attributes as written.
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// Returns the character data.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the child elements in document order.
    pub fn children(&self) -> &[XmlElement] {
        &self.children
    }

    /// Returns the first child with local name `name`.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children_named(name).next()
    }

    /// Returns the children with local name `name`.
    pub fn children_named<'a, 'n>(
        &'a self,
        name: &'n str,
    ) -> impl Iterator<Item = &'a XmlElement> + use<'a, 'n> {
        self.children
            .iter()
            .filter(move |child| child.local_name() == name)
    }

    /// Returns the first element at `path` below this one.
    ///
    /// `path` is a `/`-separated list of local names; prefixes on the document
    /// side are ignored.
    pub fn find(&self, path: &str) -> Option<&XmlElement> {
        self.find_all(path).into_iter().next()
    }

    /// Returns every element at `path` below this one, in document order.
    pub fn find_all(&self, path: &str) -> Vec<&XmlElement> {
        let mut current = vec![self];
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            current = current
                .into_iter()
                .flat_map(|element| element.children_named(segment))
                .collect();
        }
        current
    }

    /// Returns a copy of this tree with namespace prefixes removed from element
    /// names. Namespace declarations and prefixed attributes are dropped, except
    /// `xsi:*` attributes, whose namespace is re-declared on the returned root.
    ///
    /// Used to re-home a fragment of one document inside another whose default
    /// namespace is the same.
    pub fn without_prefixes(&self) -> XmlElement {
        let mut stripped = self.strip_prefixes();
        if stripped.uses_xsi() {
            stripped.set_attr("xmlns:xsi", XSI_NAMESPACE);
        }
        stripped
    }

    fn strip_prefixes(&self) -> XmlElement {
        XmlElement {
            name: self.local_name().to_string(),
            attributes: self
                .attributes
                .iter()
                .filter(|(key, _)| key.starts_with("xsi:") || (!key.contains(':') && key != "xmlns"))
                .cloned()
                .collect(),
            text: self.text.clone(),
            children: self.children.iter().map(XmlElement::strip_prefixes).collect(),
        }
    }

    fn uses_xsi(&self) -> bool {
        self.attributes.iter().any(|(key, _)| key.starts_with("xsi:"))
            || self.children.iter().any(XmlElement::uses_xsi)
    }

    /// Parses a document and returns its root element.
    ///
    /// # Errors
    ///
    /// * `Hl7v3Error::Xml` - If the input is not well-formed
    /// * `Hl7v3Error::Malformed` - If there is no root, more than one root, an
    ///   unknown entity, or elements nested deeper than [`MAX_DEPTH`]
    pub fn parse(xml: &str) -> Result<XmlElement> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            match reader.read_event()? {
                Event::Start(start) => {
                    if stack.len() >= MAX_DEPTH {
                        return Err(Hl7v3Error::Malformed("element nesting too deep".to_string()));
                    }
                    stack.push(element_from_start(&start)?);
                }
                Event::Empty(start) => {
                    if stack.len() >= MAX_DEPTH {
                        return Err(Hl7v3Error::Malformed("element nesting too deep".to_string()));
                    }
                    let element = element_from_start(&start)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| Hl7v3Error::Malformed("unexpected end tag".to_string()))?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(text) => {
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&String::from_utf8_lossy(text.as_ref()));
                    }
                }
                Event::CData(data) => {
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&String::from_utf8_lossy(data.as_ref()));
                    }
                }
                Event::GeneralRef(reference) => {
                    let name = String::from_utf8_lossy(&reference).to_string();
                    let resolved = resolve_reference(&name)?;
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&resolved);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(Hl7v3Error::Malformed("unclosed element".to_string()));
        }
        root.ok_or_else(|| Hl7v3Error::Malformed("document has no root element".to_string()))
    }

    /// Serializes this element as a document with an XML declaration.
    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new(Vec::new());
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        self.write_to(&mut writer)?;
        String::from_utf8(writer.into_inner()).map_err(|e| Hl7v3Error::Malformed(e.to_string()))
    }

    /// Writes this element and its subtree.
    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.children.is_empty() && self.text.is_empty() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        writer.write_event(Event::Start(start))?;
        if !self.text.is_empty() {
            writer.write_event(Event::Text(BytesText::new(&self.text)))?;
        }
        for child in &self.children {
            child.write_to(writer)?;
        }
        writer.write_event(Event::End(BytesEnd::new(self.name.as_str())))?;
        Ok(())
    }
}

fn local_part(name: &str) -> &str {
    name.rsplit(':').next().unwrap_or(name)
}

fn is_namespace_declaration(key: &str) -> bool {
    key == "xmlns" || key.starts_with("xmlns:")
}

fn element_from_start(start: &BytesStart<'_>) -> Result<XmlElement> {
    let mut element = XmlElement::new(String::from_utf8_lossy(start.name().as_ref()).to_string());
    for attr in start.attributes() {
        let attr = attr.map_err(|e| Hl7v3Error::Malformed(format!("bad attribute: {}", e)))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let raw = String::from_utf8_lossy(&attr.value).to_string();
        let value = quick_xml::escape::unescape(&raw)
            .map_err(|e| Hl7v3Error::Malformed(format!("bad attribute value: {}", e)))?;
        element.attributes.push((key, value.into_owned()));
    }
    Ok(element)
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(Hl7v3Error::Malformed("multiple root elements".to_string())),
    }
    Ok(())
}

/// Resolves a predefined entity (`amp`) or character reference (`#38`, `#x26`).
fn resolve_reference(name: &str) -> Result<Cow<'static, str>> {
    if let Some(resolved) = quick_xml::escape::resolve_predefined_entity(name) {
        return Ok(Cow::Borrowed(resolved));
    }

    let code = match name.strip_prefix('#') {
        Some(hex) if hex.starts_with('x') || hex.starts_with('X') => {
            u32::from_str_radix(&hex[1..], 16).ok()
        }
        Some(decimal) => decimal.parse::<u32>().ok(),
        None => None,
    };

    code.and_then(char::from_u32)
        .map(|c| Cow::Owned(c.to_string()))
        .ok_or_else(|| Hl7v3Error::Malformed(format!("unknown entity &{};", name)))
}
