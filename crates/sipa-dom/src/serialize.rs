//! HTML serialization
//!
//! Follows the HTML fragment serialization algorithm closely enough that
//! parse -> serialize -> parse is stable, which the component engine relies
//! on for byte-identical re-renders.

use crate::{DomTree, NodeData, NodeId};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &[
    "style", "script", "xmp", "iframe", "noembed", "noframes", "plaintext",
];

/// Escape text node content
pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    out
}

/// Escape an attribute value for use inside double quotes
pub fn escape_attribute(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}

/// Serialize a node including its own tag
pub fn outer_html(tree: &DomTree, id: NodeId) -> String {
    let mut out = String::new();
    write_node(tree, id, false, &mut out);
    out
}

/// Serialize the children of a node
pub fn inner_html(tree: &DomTree, id: NodeId) -> String {
    let raw = tree
        .tag_name(id)
        .map(|t| RAW_TEXT_ELEMENTS.contains(&t))
        .unwrap_or(false);
    let mut out = String::new();
    for child in tree.child_ids(id) {
        write_node(tree, child, raw, &mut out);
    }
    out
}

fn write_node(tree: &DomTree, id: NodeId, raw_parent: bool, out: &mut String) {
    let Some(node) = tree.get(id) else {
        return;
    };
    match &node.data {
        NodeData::Document => {
            for child in tree.child_ids(id) {
                write_node(tree, child, false, out);
            }
        }
        NodeData::Doctype { name, .. } => {
            out.push_str("<!DOCTYPE ");
            out.push_str(name);
            out.push('>');
        }
        NodeData::Text(text) => {
            if raw_parent {
                out.push_str(text);
            } else {
                out.push_str(&escape_text(text));
            }
        }
        NodeData::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        NodeData::Element(elem) => {
            out.push('<');
            out.push_str(&elem.name);
            for attr in &elem.attrs {
                out.push(' ');
                out.push_str(&attr.name);
                out.push_str("=\"");
                out.push_str(&escape_attribute(&attr.value));
                out.push('"');
            }
            out.push('>');
            if VOID_ELEMENTS.contains(&elem.name.as_str()) {
                return;
            }
            let raw = RAW_TEXT_ELEMENTS.contains(&elem.name.as_str());
            for child in tree.child_ids(id) {
                write_node(tree, child, raw, out);
            }
            out.push_str("</");
            out.push_str(&elem.name);
            out.push('>');
        }
    }
}
