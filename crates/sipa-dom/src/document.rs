//! Document - High-level document API

use crate::{outer_html, DomError, DomTree, Fragment, NodeId};

/// HTML Document
#[derive(Debug, Clone)]
pub struct Document {
    /// The DOM tree
    pub tree: DomTree,
    /// Document URL
    url: String,
    /// Cached reference to <html> element
    html_element: NodeId,
    /// Cached reference to <head> element
    head_element: NodeId,
    /// Cached reference to <body> element
    body_element: NodeId,
}

impl Document {
    /// Create a new document with an html/head/body skeleton
    pub fn new(url: &str) -> Self {
        let mut tree = DomTree::new();
        let html = tree.create_element("html");
        let head = tree.create_element("head");
        let body = tree.create_element("body");

        // Freshly created nodes cannot violate the hierarchy
        let _ = tree.append_child(tree.root(), html);
        let _ = tree.append_child(html, head);
        let _ = tree.append_child(html, body);

        Self {
            tree,
            url: url.to_string(),
            html_element: html,
            head_element: head,
            body_element: body,
        }
    }

    /// Adopt an already built tree, locating html/head/body
    pub fn from_tree(url: &str, tree: DomTree) -> Self {
        let mut document = Self {
            tree,
            url: url.to_string(),
            html_element: NodeId::NONE,
            head_element: NodeId::NONE,
            body_element: NodeId::NONE,
        };
        document.finalize();
        document
    }

    /// Re-locate the html/head/body elements
    pub fn finalize(&mut self) {
        let root = self.tree.root();
        self.html_element = self.find_child_element(root, "html").unwrap_or(NodeId::NONE);
        if self.html_element.is_valid() {
            self.head_element = self
                .find_child_element(self.html_element, "head")
                .unwrap_or(NodeId::NONE);
            self.body_element = self
                .find_child_element(self.html_element, "body")
                .unwrap_or(NodeId::NONE);
        }
    }

    fn find_child_element(&self, parent: NodeId, tag: &str) -> Option<NodeId> {
        self.tree
            .children(parent)
            .find(|(_, n)| n.as_element().map(|e| e.name == tag).unwrap_or(false))
            .map(|(id, _)| id)
    }

    /// Get document URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get document title
    pub fn title(&self) -> String {
        if !self.head_element.is_valid() {
            return String::new();
        }
        self.find_child_element(self.head_element, "title")
            .map(|title| self.tree.text_content(title))
            .unwrap_or_default()
    }

    /// Get <html> element
    pub fn document_element(&self) -> NodeId {
        self.html_element
    }

    /// Get <head> element
    pub fn head(&self) -> NodeId {
        self.head_element
    }

    /// Get <body> element
    pub fn body(&self) -> NodeId {
        self.body_element
    }

    /// All connected elements in document order
    pub fn elements(&self) -> Vec<NodeId> {
        self.tree
            .descendants(self.tree.root())
            .into_iter()
            .filter(|&id| self.tree.get(id).map(|n| n.is_element()).unwrap_or(false))
            .collect()
    }

    /// Get element by ID
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.elements()
            .into_iter()
            .find(|&node| self.tree.attr(node, "id") == Some(id))
    }

    /// Connected elements carrying `name="value"`
    pub fn elements_with_attribute(&self, name: &str, value: &str) -> Vec<NodeId> {
        self.elements()
            .into_iter()
            .filter(|&node| self.tree.attr(node, name) == Some(value))
            .collect()
    }

    /// Connected elements with the given tag name
    pub fn get_elements_by_tag_name(&self, tag: &str) -> Vec<NodeId> {
        let tag = tag.to_ascii_lowercase();
        self.elements()
            .into_iter()
            .filter(|&node| self.tree.tag_name(node) == Some(tag.as_str()))
            .collect()
    }

    /// Copy a fragment's nodes into the document as the last children of `parent`
    pub fn append_fragment(&mut self, parent: NodeId, fragment: &Fragment) -> Result<Vec<NodeId>, DomError> {
        self.insert_fragment(parent, fragment, NodeId::NONE)
    }

    /// Copy a fragment's nodes into the document as the first children of `parent`
    pub fn prepend_fragment(&mut self, parent: NodeId, fragment: &Fragment) -> Result<Vec<NodeId>, DomError> {
        let first = self.tree.get(parent).ok_or(DomError::UnknownNode(parent))?.first_child;
        self.insert_fragment(parent, fragment, first)
    }

    /// Replace `node` with a copy of the fragment's nodes
    pub fn replace_with_fragment(&mut self, node: NodeId, fragment: &Fragment) -> Result<Vec<NodeId>, DomError> {
        let parent = self.tree.parent(node).ok_or(DomError::Detached(node))?;
        let inserted = self.insert_fragment(parent, fragment, node)?;
        self.tree.detach(node)?;
        Ok(inserted)
    }

    fn insert_fragment(
        &mut self,
        parent: NodeId,
        fragment: &Fragment,
        reference: NodeId,
    ) -> Result<Vec<NodeId>, DomError> {
        let mut inserted = Vec::new();
        for top in fragment.top_level() {
            let copy = self.tree.import(fragment.tree(), top)?;
            self.tree.insert_before(parent, copy, reference)?;
            inserted.push(copy);
        }
        tracing::trace!("inserted {} node(s) under {:?}", inserted.len(), parent);
        Ok(inserted)
    }

    /// Detach a node from the document
    pub fn remove(&mut self, node: NodeId) -> Result<(), DomError> {
        self.tree.detach(node)
    }

    /// Serialize the whole document
    pub fn to_html(&self) -> String {
        outer_html(&self.tree, self.tree.root())
    }

    /// Access the DOM tree
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Access the DOM tree mutably
    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("about:blank")
    }
}
