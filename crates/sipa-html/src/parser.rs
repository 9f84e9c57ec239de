//! HTML5 Parser implementation
//!
//! Uses html5ever's built-in RcDom and converts to our DOM format.
//! Fragments are parsed with a `<template>` context element, which accepts
//! any content: table rows, head-only tags and leading whitespace stay
//! where the template author put them.

use html5ever::tendril::TendrilSink;
use html5ever::{local_name, ns, parse_document, parse_fragment, QualName};
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};
use sipa_dom::{Attribute, Document, DomError, DomTree, ElementData, Fragment, NodeData, NodeId};

use crate::HtmlError;

/// HTML5 parser
pub struct HtmlParser;

impl HtmlParser {
    /// Create a new HTML parser
    pub fn new() -> Self {
        Self
    }

    /// Parse HTML string into a Document
    pub fn parse(&self, html: &str) -> Result<Document, HtmlError> {
        self.parse_with_url(html, "about:blank")
    }

    /// Parse HTML with a base URL
    pub fn parse_with_url(&self, html: &str, url: &str) -> Result<Document, HtmlError> {
        tracing::debug!("Parsing HTML document: {}", url);

        let dom = self.read(html)?;
        let mut tree = DomTree::new();
        let root = tree.root();
        self.convert_node(&dom.document, &mut tree, root)?;

        let document = Document::from_tree(url, tree);
        tracing::debug!("Parsed {} nodes", document.tree().len());
        Ok(document)
    }

    /// Parse markup as the content of a `<template>` element
    pub fn parse_fragment(&self, markup: &str) -> Result<Fragment, HtmlError> {
        let context = QualName::new(None, ns!(html), local_name!("template"));
        let dom = parse_fragment(RcDom::default(), Default::default(), context, Vec::new(), false)
            .from_utf8()
            .read_from(&mut markup.as_bytes())?;
        // The fragment parser puts everything under a synthetic <html> root
        let container = find_element(&dom.document, "html").ok_or(HtmlError::MissingRoot)?;

        let mut fragment = Fragment::new();
        let root = fragment.root();
        for child in container.children.borrow().iter() {
            self.convert_node(child, fragment.tree_mut(), root)?;
        }
        tracing::trace!("Parsed fragment with {} top-level node(s)", fragment.top_level().len());
        Ok(fragment)
    }

    fn read(&self, html: &str) -> Result<RcDom, HtmlError> {
        let dom = parse_document(RcDom::default(), Default::default())
            .from_utf8()
            .read_from(&mut html.as_bytes())?;
        Ok(dom)
    }

    /// Convert an RcDom node to our DOM format
    fn convert_node(&self, handle: &Handle, tree: &mut DomTree, parent: NodeId) -> Result<(), DomError> {
        match &handle.data {
            RcNodeData::Document => {
                for child in handle.children.borrow().iter() {
                    self.convert_node(child, tree, parent)?;
                }
            }
            RcNodeData::Doctype { name, public_id, system_id } => {
                let id = tree.create_node(NodeData::Doctype {
                    name: name.to_string(),
                    public_id: public_id.to_string(),
                    system_id: system_id.to_string(),
                });
                tree.append_child(parent, id)?;
            }
            RcNodeData::Text { contents } => {
                let id = tree.create_text(&contents.borrow());
                tree.append_child(parent, id)?;
            }
            RcNodeData::Comment { contents } => {
                let id = tree.create_comment(contents);
                tree.append_child(parent, id)?;
            }
            RcNodeData::Element { name, attrs, .. } => {
                let mut elem = ElementData::new(name.local.as_ref());
                for attr in attrs.borrow().iter() {
                    elem.attrs.push(Attribute::new(
                        attr.name.local.to_string(),
                        attr.value.to_string(),
                    ));
                }
                let id = tree.create_node(NodeData::Element(elem));
                tree.append_child(parent, id)?;

                for child in handle.children.borrow().iter() {
                    self.convert_node(child, tree, id)?;
                }
            }
            RcNodeData::ProcessingInstruction { .. } => {
                // Not representable in HTML documents
            }
        }
        Ok(())
    }
}

impl Default for HtmlParser {
    fn default() -> Self {
        Self::new()
    }
}

fn find_element(parent: &Handle, tag: &str) -> Option<Handle> {
    parent
        .children
        .borrow()
        .iter()
        .find(|child| match &child.data {
            RcNodeData::Element { name, .. } => name.local.as_ref() == tag,
            _ => false,
        })
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fragment_custom_root() {
        let fragment = HtmlParser::new()
            .parse_fragment(r#"<x-card>Spaghetti<slot name="header"></slot></x-card>"#)
            .unwrap();

        let root = fragment.first_element().unwrap();
        assert_eq!(fragment.tree().tag_name(root), Some("x-card"));
        assert_eq!(fragment.top_level().len(), 1);
        assert_eq!(
            fragment.to_html(),
            r#"<x-card>Spaghetti<slot name="header"></slot></x-card>"#
        );
    }

    #[test]
    fn test_parse_fragment_table_cell() {
        let fragment = HtmlParser::new()
            .parse_fragment(r#"<td slot="price">4.50</td>"#)
            .unwrap();

        let cell = fragment.first_element().unwrap();
        assert_eq!(fragment.tree().tag_name(cell), Some("td"));
        assert_eq!(fragment.tree().attr(cell, "slot"), Some("price"));
    }

    #[test]
    fn test_parse_fragment_keeps_text_and_order() {
        let fragment = HtmlParser::new()
            .parse_fragment(r#"Banana<div slot="header">Header</div>"#)
            .unwrap();

        assert_eq!(fragment.top_level().len(), 2);
        assert_eq!(fragment.to_html(), r#"Banana<div slot="header">Header</div>"#);
    }

    #[test]
    fn test_parse_fragment_keeps_head_tags_in_place() {
        let fragment = HtmlParser::new()
            .parse_fragment("<style>p { color: red }</style><p>x</p>")
            .unwrap();

        assert_eq!(fragment.to_html(), "<style>p { color: red }</style><p>x</p>");
    }
}
