//! Parsing and serialization of whole layout documents.

use crate::error::{LayoutError, Result};
use crate::node::{Child, Node};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fmt::Write as _;

const INDENT: &str = "\t";

/// A parsed layout document with exactly one root node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutDocument {
    root: Node,
}

impl LayoutDocument {
    /// Create a document around an existing root node.
    pub fn new(root: Node) -> Self {
        Self { root }
    }

    /// Parse a document from raw archive bytes.
    ///
    /// UTF-8 input may carry a BOM. UTF-16 input is accepted only when it is
    /// BOM-marked, which is how editors on Windows tend to save it.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let text = decode_text(bytes)?;
        Self::parse(&text)
    }

    /// Parse a document from text. A leading BOM character is ignored.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim_start_matches('\u{feff}');
        let mut reader = Reader::from_str(text);

        let mut stack: Vec<Node> = Vec::new();
        let mut root: Option<Node> = None;

        loop {
            let event = reader.read_event().map_err(|source| LayoutError::Xml {
                position: reader.buffer_position() as u64,
                source,
            })?;

            match event {
                Event::Start(start) => {
                    let node = node_from_start(&start).map_err(|source| LayoutError::Xml {
                        position: reader.buffer_position() as u64,
                        source,
                    })?;
                    stack.push(node);
                }
                Event::Empty(start) => {
                    let node = node_from_start(&start).map_err(|source| LayoutError::Xml {
                        position: reader.buffer_position() as u64,
                        source,
                    })?;
                    attach(&mut stack, &mut root, node)?;
                }
                Event::End(_) => {
                    // quick-xml already verified the closing name matches
                    if let Some(node) = stack.pop() {
                        attach(&mut stack, &mut root, node)?;
                    }
                }
                Event::Text(text) => {
                    let value = text.unescape().map_err(|source| LayoutError::Xml {
                        position: reader.buffer_position() as u64,
                        source,
                    })?;
                    if value.trim().is_empty() {
                        continue;
                    }
                    match stack.last_mut() {
                        Some(parent) => parent.push_child(Child::Text(value.trim().to_string())),
                        None => return Err(LayoutError::StrayText),
                    }
                }
                Event::CData(data) => {
                    let value = String::from_utf8_lossy(&data).into_owned();
                    match stack.last_mut() {
                        Some(parent) => parent.push_child(Child::Text(value)),
                        None => return Err(LayoutError::StrayText),
                    }
                }
                Event::Comment(comment) => {
                    // Comments outside the root are dropped
                    if let Some(parent) = stack.last_mut() {
                        let value = String::from_utf8_lossy(&comment).into_owned();
                        parent.push_child(Child::Comment(value));
                    }
                }
                Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
                Event::Eof => break,
            }
        }

        if let Some(open) = stack.pop() {
            return Err(LayoutError::Unclosed(open.tag().to_string()));
        }

        root.map(Self::new).ok_or(LayoutError::MissingRoot)
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Node {
        &mut self.root
    }

    /// All nodes with the given tag anywhere in the tree, root included.
    pub fn find_all(&self, tag: &str) -> Vec<&Node> {
        self.root.find_all(tag)
    }

    /// Import a node (deep copy) from another document as the last child of
    /// this document's root.
    pub fn import(&mut self, node: &Node) {
        self.root.push_child(Child::Node(node.clone()));
    }

    /// Serialize the document with a declaration line and tab indentation.
    ///
    /// Output depends only on the tree, so equal trees serialize identically.
    pub fn to_xml_string(&self) -> String {
        let mut out = String::from("<?xml version=\"1.0\"?>\n");
        write_node(&mut out, &self.root, 0);
        out
    }
}

impl Node {
    /// Serialize this node and its subtree as a standalone fragment.
    pub fn to_xml_string(&self) -> String {
        let mut out = String::new();
        write_node(&mut out, self, 0);
        out
    }
}

/// Collapse every whitespace run to a single space and trim both ends.
///
/// Two fragments that differ only in indentation or line breaks collapse to
/// the same string.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn decode_text(bytes: &[u8]) -> Result<String> {
    match bytes {
        [0xEF, 0xBB, 0xBF, rest @ ..] => {
            String::from_utf8(rest.to_vec()).map_err(|_| LayoutError::Encoding)
        }
        [0xFF, 0xFE, rest @ ..] => decode_utf16(rest, u16::from_le_bytes),
        [0xFE, 0xFF, rest @ ..] => decode_utf16(rest, u16::from_be_bytes),
        _ => String::from_utf8(bytes.to_vec()).map_err(|_| LayoutError::Encoding),
    }
}

fn decode_utf16(bytes: &[u8], to_unit: fn([u8; 2]) -> u16) -> Result<String> {
    if bytes.len() % 2 != 0 {
        return Err(LayoutError::Encoding);
    }
    let units = bytes.chunks_exact(2).map(|pair| to_unit([pair[0], pair[1]]));
    char::decode_utf16(units)
        .collect::<std::result::Result<String, _>>()
        .map_err(|_| LayoutError::Encoding)
}

fn node_from_start(start: &BytesStart<'_>) -> std::result::Result<Node, quick_xml::Error> {
    let tag = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut node = Node::new(tag);
    for attribute in start.attributes() {
        let attribute = attribute?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute.unescape_value()?.into_owned();
        node.set_attr(key, value);
    }
    Ok(node)
}

fn attach(stack: &mut [Node], root: &mut Option<Node>, node: Node) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.push_child(Child::Node(node));
        return Ok(());
    }
    if root.is_some() {
        return Err(LayoutError::MultipleRoots(node.tag().to_string()));
    }
    *root = Some(node);
    Ok(())
}

fn write_node(out: &mut String, node: &Node, depth: usize) {
    let indent = INDENT.repeat(depth);
    let _ = write!(out, "{}<{}", indent, node.tag());
    for (key, value) in node.attributes() {
        let _ = write!(out, " {}=\"{}\"", key, quick_xml::escape::escape(value));
    }

    let children = node.children();
    if children.is_empty() {
        out.push_str(" />\n");
        return;
    }

    // Text-only content stays on one line so it round-trips unchanged
    if children.iter().all(|child| matches!(child, Child::Text(_))) {
        out.push('>');
        for text in node.texts() {
            out.push_str(&quick_xml::escape::escape(text));
        }
        let _ = writeln!(out, "</{}>", node.tag());
        return;
    }

    out.push_str(">\n");
    let inner = INDENT.repeat(depth + 1);
    for child in children {
        match child {
            Child::Node(child) => write_node(out, child, depth + 1),
            Child::Text(text) => {
                let _ = writeln!(out, "{}{}", inner, quick_xml::escape::escape(text));
            }
            Child::Comment(comment) => {
                let _ = writeln!(out, "{}<!--{}-->", inner, comment);
            }
        }
    }
    let _ = writeln!(out, "{}</{}>", indent, node.tag());
}
