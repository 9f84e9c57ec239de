//! Render targets
//!
//! Components never own a document. They render into whatever the app was
//! given as its target; [`Document`] is the headless implementation.

use sipa_dom::{inner_html, outer_html, Document, Fragment, NodeId};

use crate::ComponentError;

/// Where inserted nodes go relative to the anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Last children of the anchor
    Append,
    /// First children of the anchor
    Prepend,
    /// In place of the anchor
    Replace,
}

/// DOM operations the component layer needs
pub trait RenderTarget {
    /// Default mount point
    fn body(&self) -> Option<NodeId>;

    /// Connected elements in document order
    fn elements(&self) -> Vec<NodeId>;

    fn element_by_id(&self, id: &str) -> Option<NodeId>;

    /// Connected elements carrying `name="value"`
    fn elements_with_attribute(&self, name: &str, value: &str) -> Vec<NodeId>;

    /// Element children of `node`
    fn children(&self, node: NodeId) -> Vec<NodeId>;

    fn tag_name(&self, node: NodeId) -> Option<String>;

    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;

    /// Attributes in source order
    fn attributes(&self, node: NodeId) -> Vec<(String, String)>;

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), ComponentError>;

    fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<(), ComponentError>;

    fn inner_html(&self, node: NodeId) -> String;

    fn outer_html(&self, node: NodeId) -> String;

    /// Copy a fragment's nodes into the target, returning the new nodes
    fn insert(
        &mut self,
        anchor: NodeId,
        placement: Placement,
        fragment: &Fragment,
    ) -> Result<Vec<NodeId>, ComponentError>;

    fn remove(&mut self, node: NodeId) -> Result<(), ComponentError>;

    /// Serialize the whole target
    fn to_html(&self) -> String;
}

impl RenderTarget for Document {
    fn body(&self) -> Option<NodeId> {
        Some(Document::body(self))
    }

    fn elements(&self) -> Vec<NodeId> {
        Document::elements(self)
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.get_element_by_id(id)
    }

    fn elements_with_attribute(&self, name: &str, value: &str) -> Vec<NodeId> {
        Document::elements_with_attribute(self, name, value)
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.tree
            .children(node)
            .filter(|(_, n)| n.is_element())
            .map(|(id, _)| id)
            .collect()
    }

    fn tag_name(&self, node: NodeId) -> Option<String> {
        self.tree.tag_name(node).map(str::to_string)
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.tree.attr(node, name).map(str::to_string)
    }

    fn attributes(&self, node: NodeId) -> Vec<(String, String)> {
        self.tree
            .get(node)
            .and_then(|n| n.as_element())
            .map(|el| el.attrs.iter().map(|a| (a.name.clone(), a.value.clone())).collect())
            .unwrap_or_default()
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), ComponentError> {
        Ok(self.tree.set_attr(node, name, value)?)
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<(), ComponentError> {
        self.tree.remove_attr(node, name)?;
        Ok(())
    }

    fn inner_html(&self, node: NodeId) -> String {
        inner_html(&self.tree, node)
    }

    fn outer_html(&self, node: NodeId) -> String {
        outer_html(&self.tree, node)
    }

    fn insert(
        &mut self,
        anchor: NodeId,
        placement: Placement,
        fragment: &Fragment,
    ) -> Result<Vec<NodeId>, ComponentError> {
        let inserted = match placement {
            Placement::Append => self.append_fragment(anchor, fragment)?,
            Placement::Prepend => self.prepend_fragment(anchor, fragment)?,
            Placement::Replace => self.replace_with_fragment(anchor, fragment)?,
        };
        Ok(inserted)
    }

    fn remove(&mut self, node: NodeId) -> Result<(), ComponentError> {
        Ok(Document::remove(self, node)?)
    }

    fn to_html(&self) -> String {
        Document::to_html(self)
    }
}
