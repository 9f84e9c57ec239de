//! Detached markup fragments
//!
//! A fragment is a `DomTree` whose root plays the role of a
//! `DocumentFragment`: its top-level children are the fragment's nodes.

use crate::{inner_html, DomError, DomTree, NodeId};

/// Detached list of top-level nodes
#[derive(Debug, Clone, Default)]
pub struct Fragment {
    tree: DomTree,
}

impl Fragment {
    /// Create an empty fragment
    pub fn new() -> Self {
        Self { tree: DomTree::new() }
    }

    /// Wrap an existing tree; the tree root's children are the fragment
    pub fn from_tree(tree: DomTree) -> Self {
        Self { tree }
    }

    /// Fragment container node
    #[inline]
    pub fn root(&self) -> NodeId {
        self.tree.root()
    }

    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }

    /// Top-level nodes in order
    pub fn top_level(&self) -> Vec<NodeId> {
        self.tree.child_ids(self.root())
    }

    /// First top-level element
    pub fn first_element(&self) -> Option<NodeId> {
        self.tree.first_element_child(self.root())
    }

    /// Whether the fragment holds no nodes
    pub fn is_empty(&self) -> bool {
        self.top_level().is_empty()
    }

    /// Replace `node` with the top-level nodes of another fragment
    pub fn splice(&mut self, node: NodeId, other: &Fragment) -> Result<Vec<NodeId>, DomError> {
        self.tree
            .replace_with_imports(node, other.tree(), &other.top_level())
    }

    /// Serialize all top-level nodes
    pub fn to_html(&self) -> String {
        inner_html(&self.tree, self.root())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_html() {
        let mut fragment = Fragment::new();
        let root = fragment.root();
        let tree = fragment.tree_mut();
        let text = tree.create_text("Banana");
        let div = tree.create_element("div");
        tree.set_attr(div, "slot", "header").unwrap();
        tree.append_child(root, text).unwrap();
        tree.append_child(root, div).unwrap();

        assert_eq!(fragment.first_element(), Some(div));
        assert_eq!(fragment.to_html(), r#"Banana<div slot="header"></div>"#);
    }
}
