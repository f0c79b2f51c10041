//! Small XML tree for editing package parts.
//!
//! Attribute values are stored exactly as they appear in the source (still
//! escaped), and everything that is not an element is kept as raw markup, so a
//! part that is parsed and serialised without edits keeps its content.

use crate::error::{FormatError, FormatResult};
use quick_xml::escape::{escape, unescape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    /// Text, comments, declarations; written back verbatim.
    Raw(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Qualified name, prefix included (`x:row`).
    pub name: String,
    attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
    self_closing: bool,
}

/// Name without its namespace prefix.
pub fn local_name(name: &str) -> &str {
    name.rsplit_once(':').map_or(name, |(_, local)| local)
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
            self_closing: true,
        }
    }

    pub fn with_attr(mut self, key: &str, value: &str) -> Self {
        self.set_attr(key, value);
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.push(child);
        self
    }

    /// Text content; `text` is escaped on the way in.
    pub fn with_text(mut self, text: &str) -> Self {
        self.children
            .push(Node::Raw(escape(text).into_owned().into_bytes()));
        self
    }

    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    /// `local` qualified with this element's namespace prefix.
    pub fn sibling_name(&self, local: &str) -> String {
        match self.name.rsplit_once(':') {
            Some((prefix, _)) => format!("{}:{}", prefix, local),
            None => local.to_string(),
        }
    }

    /// Raw (escaped) attribute value by exact key.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Raw attribute value matched by local name, so `r:id` is found as `id`.
    pub fn attr_local(&self, local: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| local_name(k) == local && !k.starts_with("xmlns"))
            .map(|(_, v)| v.as_str())
    }

    /// Unescaped attribute value.
    pub fn attr_value(&self, key: &str) -> Option<String> {
        self.attr(key).map(unescape_lossy)
    }

    pub fn set_attr(&mut self, key: &str, value: &str) {
        let escaped = escape(value).into_owned();
        match self.attrs.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = escaped,
            None => self.attrs.push((key.to_string(), escaped)),
        }
    }

    pub fn remove_attr(&mut self, key: &str) {
        self.attrs.retain(|(k, _)| k != key);
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            Node::Raw(_) => None,
        })
    }

    pub fn children_named<'a, 'b>(&'a self, local: &'b str) -> impl Iterator<Item = &'a Element> + 'b
    where
        'a: 'b,
    {
        self.elements().filter(move |e| e.local_name() == local)
    }

    pub fn child(&self, local: &str) -> Option<&Element> {
        self.elements().find(|e| e.local_name() == local)
    }

    pub fn child_mut(&mut self, local: &str) -> Option<&mut Element> {
        self.children.iter_mut().find_map(|n| match n {
            Node::Element(e) if e.local_name() == local => Some(e),
            _ => None,
        })
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    /// Insert `child` before the first child element whose local name is in
    /// `before`, or at the end when there is none.
    pub fn insert_before(&mut self, child: Element, before: &[&str]) {
        let index = self
            .children
            .iter()
            .position(|n| matches!(n, Node::Element(e) if before.contains(&e.local_name())))
            .unwrap_or(self.children.len());
        self.children.insert(index, Node::Element(child));
    }

    /// Unescaped concatenation of the direct text children.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|n| match n {
                Node::Raw(raw) if !raw.starts_with(b"<") => {
                    Some(unescape_lossy(&String::from_utf8_lossy(raw)))
                }
                _ => None,
            })
            .collect()
    }

    fn from_start(start: &BytesStart<'_>, self_closing: bool, part: &str) -> FormatResult<Self> {
        let mut attrs = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| FormatError::xml(part, e))?;
            attrs.push((
                String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
                String::from_utf8_lossy(&attr.value).into_owned(),
            ));
        }
        Ok(Self {
            name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            attrs,
            children: Vec::new(),
            self_closing,
        })
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        out.push(b'<');
        out.extend_from_slice(self.name.as_bytes());
        for (key, value) in &self.attrs {
            let quote = if value.contains('"') { b'\'' } else { b'"' };
            out.push(b' ');
            out.extend_from_slice(key.as_bytes());
            out.push(b'=');
            out.push(quote);
            out.extend_from_slice(value.as_bytes());
            out.push(quote);
        }
        if self.children.is_empty() && self.self_closing {
            out.extend_from_slice(b"/>");
            return;
        }
        out.push(b'>');
        for child in &self.children {
            child.write_to(out);
        }
        out.extend_from_slice(b"</");
        out.extend_from_slice(self.name.as_bytes());
        out.push(b'>');
    }
}

impl Node {
    fn write_to(&self, out: &mut Vec<u8>) {
        match self {
            Node::Element(e) => e.write_to(out),
            Node::Raw(raw) => out.extend_from_slice(raw),
        }
    }
}

fn unescape_lossy(raw: &str) -> String {
    unescape(raw)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

fn attach(stack: &mut [Element], nodes: &mut Vec<Node>, node: Node) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => nodes.push(node),
    }
}

fn wrap(open: &[u8], body: &[u8], close: &[u8]) -> Node {
    let mut raw = Vec::with_capacity(open.len() + body.len() + close.len());
    raw.extend_from_slice(open);
    raw.extend_from_slice(body);
    raw.extend_from_slice(close);
    Node::Raw(raw)
}

/// A parsed part: prolog, root element and anything trailing it.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Document {
    pub fn parse(bytes: &[u8], part: &str) -> FormatResult<Self> {
        let mut reader = Reader::from_reader(bytes);
        let mut stack: Vec<Element> = Vec::new();
        let mut nodes: Vec<Node> = Vec::new();

        loop {
            let event = reader.read_event().map_err(|e| FormatError::xml(part, e))?;
            match event {
                Event::Start(e) => stack.push(Element::from_start(&e, false, part)?),
                Event::Empty(e) => {
                    let element = Element::from_start(&e, true, part)?;
                    attach(&mut stack, &mut nodes, Node::Element(element));
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| FormatError::xml(part, "unexpected closing tag"))?;
                    attach(&mut stack, &mut nodes, Node::Element(element));
                }
                Event::Text(e) => attach(&mut stack, &mut nodes, Node::Raw(e.to_vec())),
                Event::CData(e) => attach(&mut stack, &mut nodes, wrap(b"<![CDATA[", &e, b"]]>")),
                Event::Comment(e) => attach(&mut stack, &mut nodes, wrap(b"<!--", &e, b"-->")),
                Event::Decl(e) => attach(&mut stack, &mut nodes, wrap(b"<?", &e, b"?>")),
                Event::PI(e) => attach(&mut stack, &mut nodes, wrap(b"<?", &e, b"?>")),
                Event::DocType(e) => attach(&mut stack, &mut nodes, wrap(b"<!DOCTYPE ", &e, b">")),
                Event::Eof => break,
                #[allow(unreachable_patterns)]
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(FormatError::xml(part, format!("unclosed element <{}>", open.name)));
        }
        let document = Self { nodes };
        if document.root().is_none() {
            return Err(FormatError::xml(part, "no root element"));
        }
        Ok(document)
    }

    pub fn root(&self) -> Option<&Element> {
        self.nodes.iter().find_map(|n| match n {
            Node::Element(e) => Some(e),
            Node::Raw(_) => None,
        })
    }

    pub fn root_mut(&mut self) -> Option<&mut Element> {
        self.nodes.iter_mut().find_map(|n| match n {
            Node::Element(e) => Some(e),
            Node::Raw(_) => None,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for node in &self.nodes {
            node.write_to(&mut out);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHEET: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><dimension ref="A1:B2"/><sheetData><row r="1" spans="1:2"><c r="A1" t="s"><v>0</v></c><c r="B1" s="1"/></row></sheetData><!-- note --></worksheet>"#;

    #[test]
    fn test_roundtrip_without_edits() {
        let doc = Document::parse(SHEET.as_bytes(), "sheet1.xml").unwrap();
        assert_eq!(String::from_utf8(doc.to_bytes()).unwrap(), SHEET);
    }

    #[test]
    fn test_navigation() {
        let doc = Document::parse(SHEET.as_bytes(), "sheet1.xml").unwrap();
        let root = doc.root().unwrap();
        assert_eq!(root.local_name(), "worksheet");

        let row = root.child("sheetData").unwrap().child("row").unwrap();
        assert_eq!(row.attr("spans"), Some("1:2"));
        let cells: Vec<_> = row.children_named("c").collect();
        assert_eq!(cells.len(), 2);
        assert_eq!(cells[0].child("v").unwrap().text(), "0");
        assert_eq!(cells[1].attr("s"), Some("1"));
    }

    #[test]
    fn test_prefixed_names() {
        let xml = r#"<x:worksheet xmlns:x="urn:x" xmlns:r="urn:r"><x:sheet r:id="rId3"/></x:worksheet>"#;
        let doc = Document::parse(xml.as_bytes(), "p").unwrap();
        let root = doc.root().unwrap();
        let sheet = root.child("sheet").unwrap();
        assert_eq!(sheet.attr_local("id"), Some("rId3"));
        assert_eq!(root.sibling_name("row"), "x:row");
        assert_eq!(doc.to_bytes(), xml.as_bytes());
    }

    /// The returned child borrows from the tree, not from the lookup name.
    #[test]
    fn test_child_outlives_name() {
        let doc = Document::parse(SHEET.as_bytes(), "sheet1.xml").unwrap();
        let root = doc.root().unwrap();
        let found = {
            let name = String::from("sheetData");
            root.child(&name)
        };
        assert_eq!(found.map(|e| e.local_name()), Some("sheetData"));
    }

    #[test]
    fn test_insert_before() {
        let xml = r#"<styleSheet><fonts/><cellStyles/></styleSheet>"#;
        let mut doc = Document::parse(xml.as_bytes(), "styles.xml").unwrap();
        let root = doc.root_mut().unwrap();
        root.insert_before(Element::new("fills"), &["borders", "cellXfs", "cellStyles"]);
        root.insert_before(Element::new("extLst"), &["nothing"]);
        assert_eq!(
            String::from_utf8(doc.to_bytes()).unwrap(),
            "<styleSheet><fonts/><fills/><cellStyles/><extLst/></styleSheet>"
        );
    }

    #[test]
    fn test_escaping() {
        let mut el = Element::new("t").with_text("Tom & Jerry <2>");
        el.set_attr("title", "a \"quoted\" value");
        let mut out = Vec::new();
        el.write_to(&mut out);
        let parsed = Document::parse(&out, "t").unwrap();
        let root = parsed.root().unwrap();
        assert_eq!(root.text(), "Tom & Jerry <2>");
        assert_eq!(root.attr_value("title").unwrap(), "a \"quoted\" value");
    }

    #[test]
    fn test_empty_element_gains_children() {
        let mut row = Element::new("row").with_attr("r", "3");
        let mut out = Vec::new();
        row.write_to(&mut out);
        assert_eq!(out, b"<row r=\"3\"/>");

        row.push(Element::new("c").with_attr("r", "A3"));
        out.clear();
        row.write_to(&mut out);
        assert_eq!(out, b"<row r=\"3\"><c r=\"A3\"/></row>");
    }

    #[test]
    fn test_malformed() {
        assert!(matches!(
            Document::parse(b"<a><b></a>", "bad.xml"),
            Err(FormatError::Xml { .. })
        ));
        assert!(Document::parse(b"<a>", "bad.xml").is_err());
        assert!(Document::parse(b"", "bad.xml").is_err());
    }
}
