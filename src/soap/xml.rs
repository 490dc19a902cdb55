//! Namespace-aware XML element tree.
//!
//! The SOAP layer only needs two things from XML: parse a response document
//! into a tree it can walk, and serialize a tree it built. Everything else
//! about the underlying reader/writer stays inside this module.

use std::collections::BTreeMap;
use std::fmt::Display;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::{PrefixDeclaration, ResolveResult};
use quick_xml::reader::NsReader;
use quick_xml::writer::Writer;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum XmlError {
    #[error("Malformed XML: {0}")]
    Malformed(String),

    #[error("Unbound namespace prefix: {0}")]
    UnboundPrefix(String),

    #[error("No prefix declared for namespace: {0}")]
    UndeclaredNamespace(String),

    #[error("Document has no root element")]
    Empty,

    #[error("Cannot write XML: {0}")]
    Write(String),
}

fn malformed<E: Display>(e: E) -> XmlError {
    XmlError::Malformed(e.to_string())
}

fn write_err<E: Display>(e: E) -> XmlError {
    XmlError::Write(e.to_string())
}

/// An expanded name: namespace URI plus local part.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QName {
    pub namespace: Option<String>,
    pub local: String,
}

impl QName {
    pub fn new(namespace: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            local: local.into(),
        }
    }

    pub fn unqualified(local: impl Into<String>) -> Self {
        Self {
            namespace: None,
            local: local.into(),
        }
    }

    pub fn is(&self, namespace: Option<&str>, local: &str) -> bool {
        self.namespace.as_deref() == namespace && self.local == local
    }
}

impl Display for QName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{ns}}}{}", self.local),
            None => write!(f, "{}", self.local),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub name: QName,
    pub attributes: Vec<(QName, String)>,
    pub children: Vec<Element>,
    pub text: Option<String>,
    /// Prefix → URI. After parsing this holds every binding in scope at the
    /// element; when serializing it holds the declarations to emit on it.
    /// The empty prefix is the default namespace.
    pub namespaces: BTreeMap<String, String>,
}

impl Element {
    pub fn new(name: QName) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }

    pub fn declare(mut self, prefix: &str, uri: &str) -> Self {
        self.namespaces.insert(prefix.to_string(), uri.to_string());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn set_attribute(&mut self, name: QName, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some((_, v)) => *v = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(child);
    }

    pub fn attribute(&self, namespace: Option<&str>, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n.is(namespace, local))
            .map(|(_, v)| v.as_str())
    }

    /// First direct child with the given unqualified name.
    pub fn child(&self, local: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name.is(None, local))
    }

    /// This element and all of its descendants, in document order.
    pub fn iter(&self) -> Vec<&Element> {
        let mut out = vec![self];
        for child in &self.children {
            out.extend(child.iter());
        }
        out
    }

    /// Splits a `prefix:local` text value (as used in `xsi:type` and
    /// `faultcode`) and resolves the prefix against the bindings in scope.
    /// Text without a prefix yields no namespace.
    pub fn resolve_prefixed<'a>(&self, text: &'a str) -> (&'a str, Option<&str>) {
        match text.split_once(':') {
            Some((prefix, local)) => (local, self.namespaces.get(prefix).map(String::as_str)),
            None => (text, None),
        }
    }

    pub fn parse(input: &str) -> Result<Element, XmlError> {
        let mut reader = NsReader::from_str(input);
        let mut stack: Vec<Element> = Vec::new();
        let mut root = None;

        loop {
            let (resolved, event) = reader.read_resolved_event().map_err(malformed)?;
            let namespace = owned_namespace(resolved)?;
            match event {
                Event::Start(start) => {
                    let element = open_element(&reader, namespace, &start, stack.last())?;
                    stack.push(element);
                }
                Event::Empty(start) => {
                    let element = open_element(&reader, namespace, &start, stack.last())?;
                    close_element(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let element = stack.pop().ok_or_else(|| malformed("unbalanced end tag"))?;
                    close_element(&mut stack, &mut root, element)?;
                }
                Event::Text(text) => {
                    if let Some(current) = stack.last_mut() {
                        let text = text.unescape().map_err(malformed)?;
                        current.text.get_or_insert_with(String::new).push_str(&text);
                    }
                }
                Event::CData(data) => {
                    if let Some(current) = stack.last_mut() {
                        let text = std::str::from_utf8(&data).map_err(malformed)?;
                        current.text.get_or_insert_with(String::new).push_str(text);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(malformed("unexpected end of document"));
        }
        root.ok_or(XmlError::Empty)
    }

    pub fn to_xml(&self) -> Result<String, XmlError> {
        let mut writer = Writer::new(Vec::new());
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
            .map_err(write_err)?;
        writer.get_mut().push(b'\n');
        self.write_to(&mut writer, &BTreeMap::new())?;
        String::from_utf8(writer.into_inner()).map_err(write_err)
    }

    fn write_to(
        &self,
        writer: &mut Writer<Vec<u8>>,
        parent_scope: &BTreeMap<String, String>,
    ) -> Result<(), XmlError> {
        let mut scope = parent_scope.clone();
        scope.extend(self.namespaces.clone());

        let name = qualify(&scope, &self.name)?;
        let mut start = BytesStart::new(name.as_str());
        for (prefix, uri) in &self.namespaces {
            let key = if prefix.is_empty() {
                "xmlns".to_string()
            } else {
                format!("xmlns:{prefix}")
            };
            start.push_attribute((key.as_str(), uri.as_str()));
        }
        for (attr, value) in &self.attributes {
            let key = qualify(&scope, attr)?;
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.children.is_empty() && self.text.is_none() {
            writer.write_event(Event::Empty(start)).map_err(write_err)?;
            return Ok(());
        }

        writer.write_event(Event::Start(start)).map_err(write_err)?;
        if let Some(text) = &self.text {
            writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(write_err)?;
        }
        for child in &self.children {
            child.write_to(writer, &scope)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new(name.as_str())))
            .map_err(write_err)?;
        Ok(())
    }
}

fn owned_namespace(resolved: ResolveResult) -> Result<Option<String>, XmlError> {
    match resolved {
        ResolveResult::Bound(ns) => Ok(Some(
            std::str::from_utf8(ns.as_ref()).map_err(malformed)?.to_string(),
        )),
        ResolveResult::Unbound => Ok(None),
        ResolveResult::Unknown(prefix) => Err(XmlError::UnboundPrefix(
            String::from_utf8_lossy(&prefix).into_owned(),
        )),
    }
}

fn open_element(
    reader: &NsReader<&[u8]>,
    namespace: Option<String>,
    start: &BytesStart,
    parent: Option<&Element>,
) -> Result<Element, XmlError> {
    let local = std::str::from_utf8(start.local_name().as_ref())
        .map_err(malformed)?
        .to_string();
    let mut element = Element::new(QName { namespace, local });
    if let Some(parent) = parent {
        element.namespaces = parent.namespaces.clone();
    }

    for attr in start.attributes() {
        let attr = attr.map_err(malformed)?;
        let value = attr.unescape_value().map_err(malformed)?.into_owned();
        if let Some(binding) = attr.key.as_namespace_binding() {
            let prefix = match binding {
                PrefixDeclaration::Default => String::new(),
                PrefixDeclaration::Named(p) => {
                    std::str::from_utf8(p).map_err(malformed)?.to_string()
                }
            };
            element.namespaces.insert(prefix, value);
            continue;
        }
        let (resolved, local) = reader.resolve_attribute(attr.key);
        let namespace = owned_namespace(resolved)?;
        let local = std::str::from_utf8(local.as_ref())
            .map_err(malformed)?
            .to_string();
        element.attributes.push((QName { namespace, local }, value));
    }
    Ok(element)
}

fn close_element(
    stack: &mut Vec<Element>,
    root: &mut Option<Element>,
    mut element: Element,
) -> Result<(), XmlError> {
    // Indentation between child elements is not content.
    if !element.children.is_empty()
        && element
            .text
            .as_deref()
            .is_some_and(|t| t.trim().is_empty())
    {
        element.text = None;
    }
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(malformed("multiple root elements")),
    }
    Ok(())
}

fn qualify(scope: &BTreeMap<String, String>, name: &QName) -> Result<String, XmlError> {
    let Some(namespace) = &name.namespace else {
        return Ok(name.local.clone());
    };
    let prefix = scope
        .iter()
        .find(|(_, uri)| *uri == namespace)
        .map(|(prefix, _)| prefix)
        .ok_or_else(|| XmlError::UndeclaredNamespace(namespace.clone()))?;
    if prefix.is_empty() {
        Ok(name.local.clone())
    } else {
        Ok(format!("{prefix}:{}", name.local))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const NS: &str = "urn:test";

    #[test]
    fn test_parse_resolves_namespaces() {
        let xml = r#"<?xml version="1.0"?>
            <t:root xmlns:t="urn:test" xmlns:x="urn:other">
              <t:child x:kind="x:thing">hello &amp; bye</t:child>
              <plain/>
            </t:root>"#;
        let root = Element::parse(xml).unwrap();
        assert!(root.name.is(Some(NS), "root"));
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.text, None);

        let child = &root.children[0];
        assert!(child.name.is(Some(NS), "child"));
        assert_eq!(child.text.as_deref(), Some("hello & bye"));
        let kind = child.attribute(Some("urn:other"), "kind").unwrap();
        assert_eq!(child.resolve_prefixed(kind), ("thing", Some("urn:other")));

        assert!(root.child("plain").is_some());
        assert_eq!(root.iter().len(), 3);
    }

    #[test]
    fn test_parse_keeps_significant_whitespace() {
        let root = Element::parse("<a><b>  padded  </b></a>").unwrap();
        assert_eq!(root.children[0].text.as_deref(), Some("  padded  "));
    }

    #[test]
    fn test_parse_rejects_unbound_prefix() {
        assert_matches!(Element::parse("<x:a/>"), Err(XmlError::UnboundPrefix(p)) if p == "x");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Element::parse("<a><b></a>").is_err());
        assert_matches!(Element::parse(""), Err(XmlError::Empty));
        assert!(Element::parse("not xml at all").is_err());
    }

    #[test]
    fn test_serialize_then_parse() {
        let mut root = Element::new(QName::new(NS, "root")).declare("t", NS);
        let mut child = Element::new(QName::unqualified("item")).with_text("a < b");
        child.set_attribute(QName::new(NS, "flag"), "yes");
        root.push(child);
        root.push(Element::new(QName::unqualified("empty")));

        let xml = root.to_xml().unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n"));
        assert!(xml.contains("<t:root xmlns:t=\"urn:test\">"));
        assert!(xml.contains("<item t:flag=\"yes\">a &lt; b</item>"));
        assert!(xml.contains("<empty/>"));

        let parsed = Element::parse(&xml).unwrap();
        assert_eq!(parsed.children[0].text.as_deref(), Some("a < b"));
        assert_eq!(parsed.children[0].attribute(Some(NS), "flag"), Some("yes"));
    }

    #[test]
    fn test_serialize_requires_declared_namespace() {
        let root = Element::new(QName::new("urn:nowhere", "root"));
        assert_matches!(root.to_xml(), Err(XmlError::UndeclaredNamespace(_)));
    }
}
